//! Error types for keysafe.
//!
//! Each layer has its own error enum; [`Error`] wraps them so callers can
//! match on the domain they care about and `?` works across layers.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Custody(#[from] CustodyError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    Guard(#[from] GuardError),

    #[error(transparent)]
    File(#[from] FileError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key custody state machine errors.
#[derive(Error, Debug)]
pub enum CustodyError {
    /// Both the ciphertext and the plaintext file exist.
    #[error(
        "both {cipher} and {plain} exist: copy {plain} to a safe place and remove it from this machine"
    )]
    ConflictingKeyFiles { cipher: PathBuf, plain: PathBuf },

    /// An operation needed the key in memory but none is loaded.
    #[error("key not loaded into memory")]
    KeyNotLoaded,

    /// The plaintext key file does not hold a valid representation.
    #[error("invalid plaintext key file {path}: {source}")]
    InvalidPlaintext {
        path: PathBuf,
        #[source]
        source: EncodingError,
    },
}

/// Secret representation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EncodingError {
    #[error("invalid representation: {0}")]
    InvalidRepresentation(String),
}

/// Platform protection primitive errors.
///
/// Wrong machine, wrong principal, tampering and truncation all surface as
/// `Unprotect`; the platform does not let us tell them apart.
#[derive(Error, Debug)]
pub enum CipherError {
    #[error("{backend} failed to protect data: {status}")]
    Protect {
        backend: &'static str,
        status: String,
    },

    #[error("{backend} failed to unprotect data: {status}")]
    Unprotect {
        backend: &'static str,
        status: String,
    },

    #[error("no platform protection primitive on this target")]
    Unsupported,

    #[error("unable to read machine id: {0}")]
    MachineId(String),
}

/// Secure memory guard errors.
#[derive(Error, Debug)]
pub enum GuardError {
    #[error("refusing to guard an empty buffer")]
    Empty,

    #[error("failed to allocate guarded memory: {0}")]
    Allocate(std::io::Error),

    #[error("failed to change guarded memory protection: {0}")]
    Protect(std::io::Error),
}

/// Key file I/O errors, always carrying the path involved.
#[derive(Error, Debug)]
pub enum FileError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("invalid dictionary: {0}")]
    InvalidDictionary(String),

    #[error("invalid alphabet: {0}")]
    InvalidAlphabet(String),
}

pub type Result<T> = std::result::Result<T, Error>;
