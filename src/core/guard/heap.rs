//! Fallback region for targets without page protection: a zeroize-on-drop heap buffer.

use std::cell::UnsafeCell;
use std::io;

use zeroize::Zeroize;

use super::Access;

pub(crate) struct Region {
    buf: UnsafeCell<Vec<u8>>,
}

impl Region {
    pub(crate) fn allocate(len: usize) -> io::Result<Self> {
        Ok(Self {
            buf: UnsafeCell::new(vec![0u8; len]),
        })
    }

    pub(crate) fn lock(&mut self) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "memory locking unavailable on this target",
        ))
    }

    pub(crate) fn protect(&self, _access: Access) -> io::Result<()> {
        Ok(())
    }

    /// # Safety
    ///
    /// `len` must not exceed the allocated length.
    pub(crate) unsafe fn bytes(&self, len: usize) -> &[u8] {
        &(*self.buf.get())[..len]
    }

    /// # Safety
    ///
    /// `len` must not exceed the allocated length.
    pub(crate) unsafe fn bytes_mut(&mut self, len: usize) -> &mut [u8] {
        &mut self.buf.get_mut()[..len]
    }

    pub(crate) fn release(&mut self) {
        self.buf.get_mut().zeroize();
    }
}
