//! Platform protection primitives.
//!
//! A [`PlatformCipher`] seals bytes so that only the same machine (and, with
//! [`Scope::User`], the same principal) can open them again. No key material
//! is ever exposed to the caller.
//!
//! ## Backends
//!
//! - **DPAPI** (Windows): `CryptProtectData` / `CryptUnprotectData`.
//! - **Machine-bound** (Unix): XChaCha20-Poly1305 under a key derived from
//!   the host's machine id. Weaker than DPAPI: any local principal able to
//!   read the machine id can open machine-scoped blobs.
//!
//! ## Adding a New Backend
//!
//! 1. Implement the `PlatformCipher` trait
//! 2. Add the implementation in a new file (e.g., `keychain.rs`, `tpm.rs`)
//! 3. Select it in `backend::default_cipher`

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::Result;

mod backend;
mod machine;

#[cfg(windows)]
mod dpapi;

#[cfg(test)]
pub(crate) mod stub;

pub use backend::default_cipher;
pub use machine::MachineBound;

#[cfg(windows)]
pub use dpapi::Dpapi;

/// Who may open a sealed blob.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Any principal on this machine.
    #[default]
    Machine,
    /// Only the principal that sealed it, on this machine.
    User,
}

impl Scope {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Machine => "machine",
            Self::User => "user",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Machine-bound encrypt/decrypt primitive.
///
/// Implementations must not keep any copy of the plaintext they consume or
/// produce once a call returns.
pub trait PlatformCipher: Send {
    /// Seal `secret` into an opaque blob.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::Protect` carrying the platform status.
    fn protect(&self, secret: &[u8]) -> Result<Vec<u8>>;

    /// Open a blob produced by [`protect`](Self::protect).
    ///
    /// # Errors
    ///
    /// Returns `CipherError::Unprotect` when the blob is rejected. Wrong
    /// machine, wrong principal, tampering and truncation are not
    /// distinguished.
    fn unprotect(&self, blob: &[u8]) -> Result<Zeroizing<Vec<u8>>>;

    /// Backend name for display and logs.
    fn name(&self) -> &'static str;

    /// Scope blobs are bound to.
    fn scope(&self) -> Scope;
}

impl<C: PlatformCipher + ?Sized> PlatformCipher for Box<C> {
    fn protect(&self, secret: &[u8]) -> Result<Vec<u8>> {
        (**self).protect(secret)
    }

    fn unprotect(&self, blob: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        (**self).unprotect(blob)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn scope(&self) -> Scope {
        (**self).scope()
    }
}
