//! The key custody state machine.
//!
//! [`KeyCustody`] decides, from which key files exist, whether to generate a
//! new key, seal an operator-supplied plaintext key, load the sealed key into
//! guarded memory, or refuse. It is the only owner of the loaded secret.
//!
//! | on disk         | action                              | result                  |
//! |-----------------|-------------------------------------|-------------------------|
//! | both            | refuse, read nothing                | `ConflictingKeyFiles`   |
//! | ciphertext only | read, unprotect, guard              | `Loaded`                |
//! | plaintext only  | read, decode, protect, write cipher | `PlaintextStillPresent` |
//! | neither         | generate, write plain, write cipher | `Generated`             |
//!
//! The plaintext file is never deleted here. Both files present is an error
//! until the operator moves the plaintext file away.
//!
//! There is no cross-process locking. Two processes generating at once race;
//! the loser's write fails with `AlreadyExists` instead of clobbering.

use std::path::PathBuf;

use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::core::cipher::{self, PlatformCipher};
use crate::core::config::Config;
use crate::core::encoding::{Representation, SecretEncoder};
use crate::core::files::{self, KeyFiles};
use crate::core::guard::Guarded;
use crate::error::{CustodyError, Result};

/// Which key files exist. Derived from the filesystem, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustodyState {
    Empty,
    PlaintextOnly,
    CiphertextOnly,
    Both,
}

impl CustodyState {
    /// Classify `files` by presence alone. Contents are not read.
    pub fn probe(files: &KeyFiles) -> Result<Self> {
        let cipher = files::is_present(files.cipher())?;
        let plain = files::is_present(files.plain())?;
        Ok(match (cipher, plain) {
            (false, false) => Self::Empty,
            (false, true) => Self::PlaintextOnly,
            (true, false) => Self::CiphertextOnly,
            (true, true) => Self::Both,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::PlaintextOnly => "plaintext-only",
            Self::CiphertextOnly => "ciphertext-only",
            Self::Both => "both",
        }
    }
}

impl std::fmt::Display for CustodyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of a successful [`KeyCustody::materialize`].
#[derive(Debug)]
#[must_use]
pub enum Materialized {
    /// A new key was generated and written to both files. This is the only
    /// time the plaintext is handed out; the key is not loaded.
    Generated(Representation),
    /// The sealed key is now in guarded memory.
    Loaded,
    /// The plaintext key was sealed. The plaintext file is still on disk and
    /// must be removed by the operator; the key is not loaded.
    PlaintextStillPresent { plain: PathBuf },
}

/// Owner of the machine's master key.
///
/// One instance per key; there is no process-wide state. Operations block.
/// To share across threads, wrap in a `Mutex`.
pub struct KeyCustody<C = Box<dyn PlatformCipher>> {
    encoder: SecretEncoder,
    cipher: C,
    handle: Option<Guarded>,
}

impl KeyCustody {
    /// Build a manager from configuration with this platform's cipher.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for a bad encoding section, or `CipherError`
    /// when no platform cipher is available.
    pub fn from_config(config: &Config) -> Result<Self> {
        let encoder = config.encoder()?;
        let cipher = cipher::default_cipher(&config.cipher_config())?;
        Ok(Self::new(encoder, cipher))
    }
}

impl<C: PlatformCipher> KeyCustody<C> {
    pub fn new(encoder: SecretEncoder, cipher: C) -> Self {
        Self {
            encoder,
            cipher,
            handle: None,
        }
    }

    pub fn encoder(&self) -> &SecretEncoder {
        &self.encoder
    }

    pub fn cipher(&self) -> &C {
        &self.cipher
    }

    /// Current disk state of `files`.
    pub fn state(&self, files: &KeyFiles) -> Result<CustodyState> {
        CustodyState::probe(files)
    }

    /// Bring the key into a usable state.
    ///
    /// # Errors
    ///
    /// - `CustodyError::ConflictingKeyFiles` if both files exist
    /// - `CustodyError::InvalidPlaintext` if the plaintext file is malformed
    /// - `CipherError` if sealing or opening fails
    /// - `FileError` for I/O failures, with the path
    ///
    /// A failed call never leaves a partially written file, and a failed
    /// load keeps whatever key was loaded before.
    pub fn materialize(&mut self, files: &KeyFiles) -> Result<Materialized> {
        let state = CustodyState::probe(files)?;
        debug!(state = %state, cipher = %files.cipher().display(), "materializing key");

        match state {
            CustodyState::Both => Err(CustodyError::ConflictingKeyFiles {
                cipher: files.cipher().to_path_buf(),
                plain: files.plain().to_path_buf(),
            }
            .into()),
            CustodyState::CiphertextOnly => {
                self.load(files)?;
                Ok(Materialized::Loaded)
            }
            CustodyState::PlaintextOnly => {
                self.seal_plaintext(files)?;
                Ok(Materialized::PlaintextStillPresent {
                    plain: files.plain().to_path_buf(),
                })
            }
            CustodyState::Empty => self.generate(files).map(Materialized::Generated),
        }
    }

    fn load(&mut self, files: &KeyFiles) -> Result<()> {
        files::warn_if_exposed(files.cipher());

        let blob = files::read(files.cipher())?;
        let mut secret = self.cipher.unprotect(&blob)?;
        let handle = Guarded::from_bytes(&mut secret)?;

        if let Some(previous) = self.handle.replace(handle) {
            previous.destroy();
        }
        info!(backend = self.cipher.name(), "key loaded");
        Ok(())
    }

    fn seal_plaintext(&self, files: &KeyFiles) -> Result<()> {
        let text = files::read(files.plain())?;
        let representation =
            self.encoder
                .decode_bytes(&text)
                .map_err(|source| CustodyError::InvalidPlaintext {
                    path: files.plain().to_path_buf(),
                    source,
                })?;

        self.seal(&representation, files)?;
        info!(
            plain = %files.plain().display(),
            "plaintext key sealed; the plaintext file must be removed"
        );
        Ok(())
    }

    fn generate(&self, files: &KeyFiles) -> Result<Representation> {
        let representation = self.encoder.generate();

        // Plaintext first: if sealing fails, the next run migrates this key
        // instead of generating another one.
        let mut text = representation.wrapped();
        text.push('\n');
        files::write_new(files.plain(), text.as_bytes())?;

        self.seal(&representation, files)?;
        info!(
            tokens = representation.token_count(),
            backend = self.cipher.name(),
            "generated new key"
        );
        Ok(representation)
    }

    fn seal(&self, representation: &Representation, files: &KeyFiles) -> Result<()> {
        let blob = self.cipher.protect(representation.secret_bytes())?;
        files::write_new(files.cipher(), &blob)
    }

    /// Whether a key is in guarded memory.
    pub fn is_loaded(&self) -> bool {
        self.handle.is_some()
    }

    /// Copy the loaded key out of guarded memory.
    ///
    /// The copy is wiped when dropped. Prefer [`with_key`](Self::with_key)
    /// when a borrow is enough.
    ///
    /// # Errors
    ///
    /// Returns `CustodyError::KeyNotLoaded` if nothing is loaded.
    pub fn retrieve(&self) -> Result<Zeroizing<Vec<u8>>> {
        self.with_key(|key| Zeroizing::new(key.to_vec()))
    }

    /// Run `f` with a borrow of the loaded key.
    pub fn with_key<R>(&self, f: impl FnOnce(&[u8]) -> R) -> Result<R> {
        let handle = self.handle.as_ref().ok_or(CustodyError::KeyNotLoaded)?;
        handle.with_exposed(f)
    }

    /// Wipe the loaded key. Does nothing if none is loaded.
    pub fn destroy(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.destroy();
            info!("key destroyed");
        }
    }
}

impl<C> std::fmt::Debug for KeyCustody<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyCustody")
            .field("encoder", &self.encoder.describe())
            .field("loaded", &self.handle.is_some())
            .finish()
    }
}
