//! Windows guarded region: VirtualAlloc'ed pages, locked and VirtualProtect'ed.

use std::ffi::c_void;
use std::io;
use std::ptr::NonNull;

use windows::Win32::System::Memory::{
    VirtualAlloc, VirtualFree, VirtualLock, VirtualProtect, VirtualUnlock, MEM_COMMIT,
    MEM_RELEASE, MEM_RESERVE, PAGE_NOACCESS, PAGE_PROTECTION_FLAGS, PAGE_READONLY,
    PAGE_READWRITE,
};
use windows::Win32::System::SystemInformation::{GetSystemInfo, SYSTEM_INFO};
use zeroize::Zeroize;

use super::Access;

pub(crate) struct Region {
    ptr: NonNull<u8>,
    size: usize,
}

// SAFETY: the allocation is exclusively owned by this value.
unsafe impl Send for Region {}

fn page_size() -> usize {
    let mut info = SYSTEM_INFO::default();
    // SAFETY: GetSystemInfo only writes into the provided struct.
    unsafe { GetSystemInfo(&mut info) };
    if info.dwPageSize == 0 {
        4096
    } else {
        info.dwPageSize as usize
    }
}

fn os_error(e: windows::core::Error) -> io::Error {
    io::Error::other(e)
}

impl Region {
    pub(crate) fn allocate(len: usize) -> io::Result<Self> {
        let page = page_size();
        let size = len.div_ceil(page) * page;

        // SAFETY: fresh committed allocation with no address hint.
        let addr = unsafe { VirtualAlloc(None, size, MEM_COMMIT | MEM_RESERVE, PAGE_READWRITE) };
        let ptr = NonNull::new(addr.cast::<u8>()).ok_or_else(io::Error::last_os_error)?;
        Ok(Self { ptr, size })
    }

    pub(crate) fn lock(&mut self) -> io::Result<()> {
        // SAFETY: ptr/size describe a live allocation owned by self.
        unsafe { VirtualLock(self.ptr.as_ptr() as *const c_void, self.size) }.map_err(os_error)
    }

    pub(crate) fn protect(&self, access: Access) -> io::Result<()> {
        let flags = match access {
            Access::None => PAGE_NOACCESS,
            Access::ReadOnly => PAGE_READONLY,
            Access::ReadWrite => PAGE_READWRITE,
        };
        let mut old = PAGE_PROTECTION_FLAGS::default();
        // SAFETY: ptr/size describe a live allocation owned by self.
        unsafe { VirtualProtect(self.ptr.as_ptr() as *const c_void, self.size, flags, &mut old) }
            .map_err(os_error)
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
            // SAFETY: the whole allocation is writable again.
            unsafe { self.bytes_mut(self.size) }.zeroize();
        }
        // SAFETY: ptr came from VirtualAlloc; size must be 0 with MEM_RELEASE.
        unsafe {
            let _ = VirtualUnlock(self.ptr.as_ptr() as *const c_void, self.size);
            let _ = VirtualFree(self.ptr.as_ptr() as *mut c_void, 0, MEM_RELEASE);
        }
    }
}
