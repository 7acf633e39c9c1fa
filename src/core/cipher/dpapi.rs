//! Windows Data Protection API backend.

use std::ffi::c_void;

use tracing::trace;
use windows::core::PCWSTR;
use windows::Win32::Foundation::{LocalFree, HLOCAL};
use windows::Win32::Security::Cryptography::{
    CryptProtectData, CryptUnprotectData, CRYPTPROTECT_LOCAL_MACHINE, CRYPTPROTECT_UI_FORBIDDEN,
    CRYPT_INTEGER_BLOB,
};
use zeroize::{Zeroize, Zeroizing};

use super::{PlatformCipher, Scope};
use crate::error::{CipherError, Result};

const NAME: &str = "dpapi";

/// DPAPI-backed cipher. Machine scope uses `CRYPTPROTECT_LOCAL_MACHINE`.
pub struct Dpapi {
    scope: Scope,
}

impl Dpapi {
    pub fn new(scope: Scope) -> Self {
        Self { scope }
    }

    fn flags(&self) -> u32 {
        match self.scope {
            Scope::Machine => CRYPTPROTECT_UI_FORBIDDEN | CRYPTPROTECT_LOCAL_MACHINE,
            Scope::User => CRYPTPROTECT_UI_FORBIDDEN,
        }
    }
}

fn status(e: &windows::core::Error) -> String {
    format!("{} (HRESULT {:#010x})", e.message(), e.code().0)
}

fn input_blob(data: &[u8]) -> CRYPT_INTEGER_BLOB {
    CRYPT_INTEGER_BLOB {
        cbData: data.len() as u32,
        pbData: data.as_ptr() as *mut u8,
    }
}

/// Copy a DPAPI output blob into owned memory, wipe it, and free it.
///
/// # Safety
///
/// `blob` must have been filled in by a successful DPAPI call.
unsafe fn take_output(blob: &mut CRYPT_INTEGER_BLOB) -> Zeroizing<Vec<u8>> {
    if blob.pbData.is_null() {
        return Zeroizing::new(Vec::new());
    }
    let platform = std::slice::from_raw_parts_mut(blob.pbData, blob.cbData as usize);
    let owned = Zeroizing::new(platform.to_vec());
    platform.zeroize();
    let _ = LocalFree(Some(HLOCAL(blob.pbData as *mut c_void)));
    blob.pbData = std::ptr::null_mut();
    blob.cbData = 0;
    owned
}

impl PlatformCipher for Dpapi {
    fn protect(&self, secret: &[u8]) -> Result<Vec<u8>> {
        trace!(len = secret.len(), scope = %self.scope, "CryptProtectData");
        if secret.is_empty() {
            return Err(CipherError::Protect {
                backend: NAME,
                status: "empty input".to_string(),
            }
            .into());
        }

        let input = input_blob(secret);
        let mut output = CRYPT_INTEGER_BLOB::default();
        // SAFETY: input points at `secret`, which outlives the call; DPAPI
        // only reads it. Output is allocated by DPAPI and freed below.
        unsafe {
            CryptProtectData(
                &input,
                PCWSTR::null(),
                None,
                None,
                None,
                self.flags(),
                &mut output,
            )
        }
        .map_err(|e| CipherError::Protect {
            backend: NAME,
            status: status(&e),
        })?;

        // SAFETY: the call above succeeded and filled `output`.
        let blob = unsafe { take_output(&mut output) };
        Ok(blob.to_vec())
    }

    fn unprotect(&self, blob: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        trace!(len = blob.len(), scope = %self.scope, "CryptUnprotectData");
        if blob.is_empty() {
            return Err(CipherError::Unprotect {
                backend: NAME,
                status: "empty blob".to_string(),
            }
            .into());
        }

        let input = input_blob(blob);
        let mut output = CRYPT_INTEGER_BLOB::default();
        // SAFETY: as in `protect`.
        unsafe {
            CryptUnprotectData(
                &input,
                None,
                None,
                None,
                None,
                self.flags(),
                &mut output,
            )
        }
        .map_err(|e| CipherError::Unprotect {
            backend: NAME,
            status: status(&e),
        })?;

        // SAFETY: the call above succeeded and filled `output`.
        Ok(unsafe { take_output(&mut output) })
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn scope(&self) -> Scope {
        self.scope
    }
}
