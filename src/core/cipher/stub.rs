//! Test cipher with failure injection.
//!
//! Reversible XOR with a prefix, NOT a protection mechanism.

use std::cell::Cell;

use zeroize::Zeroizing;

use super::{PlatformCipher, Scope};
use crate::error::{CipherError, Result};

const PREFIX: &[u8] = b"stub:";

#[derive(Default)]
pub(crate) struct Stub {
    pub fail_protect: bool,
    pub fail_unprotect: bool,
    pub protect_calls: Cell<usize>,
    pub unprotect_calls: Cell<usize>,
}

impl Stub {
    pub fn failing_protect() -> Self {
        Self {
            fail_protect: true,
            ..Self::default()
        }
    }

    pub fn failing_unprotect() -> Self {
        Self {
            fail_unprotect: true,
            ..Self::default()
        }
    }
}

impl PlatformCipher for Stub {
    fn protect(&self, secret: &[u8]) -> Result<Vec<u8>> {
        self.protect_calls.set(self.protect_calls.get() + 1);
        if self.fail_protect {
            return Err(CipherError::Protect {
                backend: "stub",
                status: "injected failure".to_string(),
            }
            .into());
        }
        let mut blob = PREFIX.to_vec();
        blob.extend(secret.iter().map(|b| b ^ 0x5a));
        Ok(blob)
    }

    fn unprotect(&self, blob: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        self.unprotect_calls.set(self.unprotect_calls.get() + 1);
        let body = blob
            .strip_prefix(PREFIX)
            .filter(|body| !body.is_empty() && !self.fail_unprotect)
            .ok_or_else(|| CipherError::Unprotect {
                backend: "stub",
                status: "rejected".to_string(),
            })?;
        Ok(Zeroizing::new(body.iter().map(|b| b ^ 0x5a).collect()))
    }

    fn name(&self) -> &'static str {
        "stub"
    }

    fn scope(&self) -> Scope {
        Scope::Machine
    }
}
