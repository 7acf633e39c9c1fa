//! Unix guarded region: anonymous private mapping, locked and mprotect'ed.

use std::io;
use std::ptr::{self, NonNull};

use zeroize::Zeroize;

use super::Access;

pub(crate) struct Region {
    ptr: NonNull<u8>,
    size: usize,
}

// SAFETY: the mapping is exclusively owned by this value.
unsafe impl Send for Region {}

fn page_size() -> usize {
    // SAFETY: sysconf has no memory-safety preconditions.
    let page = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if page <= 0 {
        4096
    } else {
        page as usize
    }
}

impl Region {
    pub(crate) fn allocate(len: usize) -> io::Result<Self> {
        let page = page_size();
        let size = len.div_ceil(page) * page;

        // SAFETY: anonymous mapping with no address hint; the result is
        // checked against MAP_FAILED before use.
        let addr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                size,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANON,
                -1,
                0,
            )
        };
        if addr == libc::MAP_FAILED {
            return Err(io::Error::last_os_error());
        }
        let ptr = NonNull::new(addr.cast::<u8>())
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "mmap returned null"))?;

        #[cfg(target_os = "linux")]
        // SAFETY: advisory call on a mapping we own; failure is harmless.
        unsafe {
            libc::madvise(addr, size, libc::MADV_DONTDUMP);
        }

        Ok(Self { ptr, size })
    }

    pub(crate) fn lock(&mut self) -> io::Result<()> {
        // SAFETY: ptr/size describe a live mapping owned by self.
        if unsafe { libc::mlock(self.ptr.as_ptr().cast(), self.size) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    pub(crate) fn protect(&self, access: Access) -> io::Result<()> {
        let prot = match access {
            Access::None => libc::PROT_NONE,
            Access::ReadOnly => libc::PROT_READ,
            Access::ReadWrite => libc::PROT_READ | libc::PROT_WRITE,
        };
        // SAFETY: ptr/size describe a live, page-aligned mapping owned by self.
        if unsafe { libc::mprotect(self.ptr.as_ptr().cast(), self.size, prot) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    /// # Safety
    ///
    /// The region must currently be readable and `len <= size`.
    pub(crate) unsafe fn bytes(&self, len: usize) -> &[u8] {
        std::slice::from_raw_parts(self.ptr.as_ptr(), len)
    }

    /// # Safety
    ///
    /// The region must currently be writable and `len <= size`.
    pub(crate) unsafe fn bytes_mut(&mut self, len: usize) -> &mut [u8] {
        std::slice::from_raw_parts_mut(self.ptr.as_ptr(), len)
    }

    pub(crate) fn release(&mut self) {
        if self.protect(Access::ReadWrite).is_ok() {
            // SAFETY: the whole mapping is writable again.
            unsafe { self.bytes_mut(self.size) }.zeroize();
        }
        // SAFETY: ptr/size came from mmap; unlocking an unlocked range is a no-op.
        unsafe {
            libc::munlock(self.ptr.as_ptr().cast(), self.size);
            libc::munmap(self.ptr.as_ptr().cast(), self.size);
        }
    }
}
