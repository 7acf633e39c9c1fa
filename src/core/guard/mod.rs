//! Guarded in-memory storage for the decrypted key.
//!
//! A [`Guarded`] buffer lives in its own page-aligned mapping that is locked
//! in RAM (best-effort) and kept inaccessible except while a caller holds a
//! scoped view through [`Guarded::with_exposed`]. Dropping or destroying it
//! wipes the pages before they are returned to the OS.
//!
//! ## Platforms
//!
//! - **Unix**: `mmap` + `mlock` + `mprotect`
//! - **Windows**: `VirtualAlloc` + `VirtualLock` + `VirtualProtect`
//! - **Other**: zeroize-on-drop heap buffer, no page protection

use std::cell::Cell;

use tracing::{debug, error, warn};
use zeroize::Zeroize;

use crate::error::{GuardError, Result};

#[cfg(unix)]
#[path = "unix.rs"]
mod sys;

#[cfg(windows)]
#[path = "windows.rs"]
mod sys;

#[cfg(not(any(unix, windows)))]
#[path = "heap.rs"]
mod sys;

/// Page access modes used by the platform regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    None,
    ReadOnly,
    ReadWrite,
}

/// Owned, protected copy of a secret.
///
/// Not `Sync`: exposure windows are not meant to overlap. Wrap the owner in a
/// `Mutex` to share it across threads. Nested exposures on one thread are
/// fine; the region stays readable until the outermost one ends.
pub struct Guarded {
    region: sys::Region,
    len: usize,
    exposed: Cell<usize>,
}

impl Guarded {
    /// Move `bytes` into guarded memory.
    ///
    /// The source slice is wiped before this returns, whether or not the
    /// allocation succeeded.
    ///
    /// # Errors
    ///
    /// Returns `GuardError::Empty` for an empty slice, or
    /// `GuardError::Allocate`/`Protect` if the OS refuses the mapping.
    pub fn from_bytes(bytes: &mut [u8]) -> Result<Self> {
        let result = Self::copy_from(bytes);
        bytes.zeroize();
        result
    }

    fn copy_from(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(GuardError::Empty.into());
        }

        let mut region = sys::Region::allocate(bytes.len()).map_err(GuardError::Allocate)?;
        if let Err(e) = region.lock() {
            warn!(error = %e, "unable to lock guarded memory; it may be swapped to disk");
        }

        // SAFETY: the region was just allocated read/write with room for
        // `bytes.len()` bytes and is exclusively owned here.
        unsafe { region.bytes_mut(bytes.len()) }.copy_from_slice(bytes);

        let guarded = Self {
            region,
            len: bytes.len(),
            exposed: Cell::new(0),
        };
        guarded
            .region
            .protect(Access::None)
            .map_err(GuardError::Protect)?;

        debug!(len = guarded.len, "secret moved into guarded memory");
        Ok(guarded)
    }

    /// Length of the guarded secret in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Run `f` with read-only access to the secret.
    ///
    /// The region is made inaccessible again when `f` returns or unwinds.
    /// `f` must not keep the slice (the borrow checker enforces this) nor
    /// copy it into unmanaged memory.
    ///
    /// # Errors
    ///
    /// Returns `GuardError::Protect` if the region cannot be made readable.
    pub fn with_exposed<R>(&self, f: impl FnOnce(&[u8]) -> R) -> Result<R> {
        let depth = self.exposed.get();
        if depth == 0 {
            self.region
                .protect(Access::ReadOnly)
                .map_err(GuardError::Protect)?;
        }
        self.exposed.set(depth + 1);
        let _freeze = Freeze(self);

        // SAFETY: the region is readable while `exposed` is non-zero, and
        // this call's `_freeze` keeps it so until `f` is done with the borrow.
        let bytes = unsafe { self.region.bytes(self.len) };
        Ok(f(bytes))
    }

    /// Wipe the secret and release its memory.
    pub fn destroy(self) {
        drop(self);
    }
}

impl Drop for Guarded {
    fn drop(&mut self) {
        self.region.release();
        debug!("guarded memory wiped and released");
    }
}

impl std::fmt::Debug for Guarded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Guarded")
            .field("len", &self.len)
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Ends one exposure; re-protects the region when the outermost one ends.
struct Freeze<'a>(&'a Guarded);

impl Drop for Freeze<'_> {
    fn drop(&mut self) {
        let depth = self.0.exposed.get() - 1;
        self.0.exposed.set(depth);
        if depth > 0 {
            return;
        }
        if let Err(e) = self.0.region.protect(Access::None) {
            error!(error = %e, "failed to re-protect guarded memory");
        }
    }
}
