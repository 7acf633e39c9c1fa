//! Machine-bound sealing keyed from the host's machine id.
//!
//! Blob layout:
//!
//! ```text
//! "KSMB" | version (1) | scope (1) | nonce (24) | ciphertext + tag (16)
//! ```
//!
//! The 6-byte header is authenticated as associated data.

use std::fs;
use std::path::Path;

use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use hkdf::Hkdf;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use tracing::{debug, trace};
use zeroize::Zeroizing;

use super::{PlatformCipher, Scope};
use crate::core::constants;
use crate::error::{CipherError, Result};

const NAME: &str = "machine-id";
const MAGIC: &[u8; 4] = b"KSMB";
const VERSION: u8 = 1;
const HEADER_LEN: usize = 6;
const NONCE_LEN: usize = 24;
const TAG_LEN: usize = 16;
const KEY_LEN: usize = 32;
const SALT: &[u8] = b"keysafe-machine-bound-v1";

/// Seals blobs under a key derived from the machine id.
pub struct MachineBound {
    key: Zeroizing<[u8; KEY_LEN]>,
    scope: Scope,
}

impl MachineBound {
    /// Use the host's machine id from the standard locations.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::MachineId` if no readable, non-empty machine id
    /// exists.
    pub fn new(scope: Scope) -> Result<Self> {
        for candidate in constants::MACHINE_ID_PATHS {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::from_file(path, scope);
            }
        }
        Err(CipherError::MachineId(format!(
            "none of {} exist",
            constants::MACHINE_ID_PATHS.join(", ")
        ))
        .into())
    }

    /// Use the machine id stored in `path`.
    pub fn from_file(path: &Path, scope: Scope) -> Result<Self> {
        debug!(path = %path.display(), scope = %scope, "reading machine id");
        let contents = Zeroizing::new(
            fs::read(path)
                .map_err(|e| CipherError::MachineId(format!("{}: {}", path.display(), e)))?,
        );
        let id = trim_whitespace(&contents);
        if id.is_empty() {
            return Err(
                CipherError::MachineId(format!("{} is empty", path.display())).into(),
            );
        }
        Self::from_machine_id(id, scope)
    }

    /// Derive the sealing key from raw machine id bytes.
    pub fn from_machine_id(machine_id: &[u8], scope: Scope) -> Result<Self> {
        let info = match scope {
            Scope::Machine => b"keysafe/machine".to_vec(),
            Scope::User => format!("keysafe/user/{}", principal()?).into_bytes(),
        };

        let hkdf = Hkdf::<Sha256>::new(Some(SALT), machine_id);
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        hkdf.expand(&info, &mut key[..])
            .map_err(|e| CipherError::MachineId(format!("key derivation failed: {}", e)))?;

        Ok(Self { key, scope })
    }

    fn header(&self) -> [u8; HEADER_LEN] {
        let scope = match self.scope {
            Scope::Machine => 0,
            Scope::User => 1,
        };
        [MAGIC[0], MAGIC[1], MAGIC[2], MAGIC[3], VERSION, scope]
    }

    fn rejected(status: impl Into<String>) -> crate::error::Error {
        CipherError::Unprotect {
            backend: NAME,
            status: status.into(),
        }
        .into()
    }
}

fn trim_whitespace(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &bytes[start..end]
}

#[cfg(unix)]
fn principal() -> Result<String> {
    // SAFETY: geteuid cannot fail and has no preconditions.
    Ok(unsafe { libc::geteuid() }.to_string())
}

#[cfg(not(unix))]
fn principal() -> Result<String> {
    Err(CipherError::Unsupported.into())
}

impl PlatformCipher for MachineBound {
    fn protect(&self, secret: &[u8]) -> Result<Vec<u8>> {
        trace!(len = secret.len(), "sealing");

        let header = self.header();
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let cipher = XChaCha20Poly1305::new(Key::from_slice(self.key.as_slice()));
        let sealed = cipher
            .encrypt(
                XNonce::from_slice(&nonce),
                Payload {
                    msg: secret,
                    aad: &header,
                },
            )
            .map_err(|e| CipherError::Protect {
                backend: NAME,
                status: e.to_string(),
            })?;

        let mut blob = Vec::with_capacity(HEADER_LEN + NONCE_LEN + sealed.len());
        blob.extend_from_slice(&header);
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&sealed);
        Ok(blob)
    }

    fn unprotect(&self, blob: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        trace!(len = blob.len(), "opening");

        if blob.len() < HEADER_LEN + NONCE_LEN + TAG_LEN {
            return Err(Self::rejected(format!(
                "blob too short: {} bytes (expected at least {})",
                blob.len(),
                HEADER_LEN + NONCE_LEN + TAG_LEN
            )));
        }

        let (header, rest) = blob.split_at(HEADER_LEN);
        if &header[..4] != MAGIC || header[4] != VERSION {
            return Err(Self::rejected("not a keysafe machine-bound blob"));
        }
        if header != self.header() {
            return Err(Self::rejected("blob was sealed for a different scope"));
        }

        let (nonce, sealed) = rest.split_at(NONCE_LEN);
        let cipher = XChaCha20Poly1305::new(Key::from_slice(self.key.as_slice()));
        let opened = cipher
            .decrypt(
                XNonce::from_slice(nonce),
                Payload {
                    msg: sealed,
                    aad: header,
                },
            )
            .map_err(|_| Self::rejected("authentication failed: wrong machine or corrupted data"))?;

        Ok(Zeroizing::new(opened))
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn scope(&self) -> Scope {
        self.scope
    }
}
