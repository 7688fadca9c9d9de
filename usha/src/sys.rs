//! Thin wrappers over the raw syscalls the allocator is built on.
//!
//! Kept separate from the allocation policy so the policy code reads like
//! the pseudocode in the spec rather than being tangled with `libc` FFI.

#[cfg(unix)]
pub(crate) fn sbrk(increment: isize) -> Option<*mut u8> {
    // SAFETY: `sbrk` is inherently racy with any other heap user in the
    // process (shared contract with the rest of this single-threaded-only
    // crate); the increment is caller-checked before this is reached.
    let prev = unsafe { libc::sbrk(increment) };
    if prev == (-1isize as *mut libc::c_void) {
        None
    } else {
        Some(prev as *mut u8)
    }
}

#[cfg(unix)]
pub(crate) fn current_break() -> *mut u8 {
    // SAFETY: `sbrk(0)` only reads the current break, no allocation occurs.
    unsafe { libc::sbrk(0) as *mut u8 }
}

#[cfg(unix)]
pub(crate) fn map_anonymous(len: usize) -> Option<*mut u8> {
    // SAFETY: requesting a fresh anonymous, process-private mapping; no
    // aliasing with existing memory is possible.
    let ptr = unsafe {
        libc::mmap(
            std::ptr::null_mut(),
            len,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_ANONYMOUS | libc::MAP_PRIVATE,
            -1,
            0,
        )
    };
    if ptr == libc::MAP_FAILED {
        None
    } else {
        Some(ptr as *mut u8)
    }
}

#[cfg(unix)]
pub(crate) unsafe fn unmap(ptr: *mut u8, len: usize) {
    libc::munmap(ptr as *mut libc::c_void, len);
}

#[cfg(not(unix))]
compile_error!("usha relies on POSIX sbrk/mmap and is only supported on unix targets");
