//! Block header and the typed address-arithmetic helpers built on top of it.
//!
//! Every allocation — heap or mapped — is prefixed by one [`Header`]. Payload
//! pointers handed out to callers always point one `Header` past the start of
//! the underlying allocation; these helpers are the only place that crosses
//! between the two.

use crate::sys;
use std::mem::size_of;
use std::process;

/// Per-block metadata. Lives immediately before the payload in memory.
#[repr(C)]
pub(crate) struct Header {
    pub(crate) cookie: u32,
    pub(crate) size: usize,
    pub(crate) is_free: bool,
    pub(crate) prev: *mut Header,
    pub(crate) next: *mut Header,
}

/// Exit code used when a cookie mismatch is detected. Chosen so it survives
/// truncation to the single byte POSIX process exit codes are limited to.
pub(crate) const CORRUPTION_EXIT_CODE: i32 = 0xef;

/// Cookie shared by every block for the lifetime of the process. Seeded once
/// from the process id and wall clock via libc's `rand`, matching the
/// original `MAIN_COOKIE` global in `malloc_3.cpp`.
pub(crate) fn process_cookie() -> u32 {
    use std::sync::OnceLock;
    static COOKIE: OnceLock<u32> = OnceLock::new();
    *COOKIE.get_or_init(|| {
        #[cfg(unix)]
        unsafe {
            let seed = (libc::time(std::ptr::null_mut()) as u32) ^ (libc::getpid() as u32);
            libc::srand(seed);
            libc::rand() as u32
        }
        #[cfg(not(unix))]
        {
            0x5eed_5eed
        }
    })
}

/// `size_of::<Header>()`, exposed as the `_size_meta_data` query.
#[inline]
pub(crate) const fn header_size() -> usize {
    size_of::<Header>()
}

/// Validate a header's cookie before any field of it is read or written.
///
/// A null header is a legal "no neighbor" sentinel and is not validated.
/// A mismatched cookie means the heap has been corrupted by an overflow in
/// some other block; per the integrity contract, the process terminates
/// immediately with no further cleanup.
#[inline]
pub(crate) unsafe fn validate(header: *mut Header) {
    if header.is_null() {
        return;
    }
    if (*header).cookie != process_cookie() {
        log::error!(
            "usha: corrupted block header at {:p} (cookie mismatch) — terminating",
            header
        );
        process::exit(CORRUPTION_EXIT_CODE);
    }
}

/// Payload pointer for a (already-validated) header.
#[inline]
pub(crate) unsafe fn payload_of(header: *mut Header) -> *mut u8 {
    header.add(1) as *mut u8
}

/// Header pointer for a payload previously returned by `payload_of`.
#[inline]
pub(crate) unsafe fn header_of(payload: *mut u8) -> *mut Header {
    (payload as *mut Header).sub(1)
}

/// The heap block immediately following `header` in address order.
///
/// Only meaningful for heap blocks, which are contiguous; callers must stop
/// once the result reaches the current program break.
#[inline]
pub(crate) unsafe fn next_by_address(header: *mut Header) -> *mut Header {
    validate(header);
    (header as *mut u8).add(header_size() + (*header).size) as *mut Header
}

/// A block belongs to the mmap list, not the heap arena, if it falls outside
/// `[first_heap, sbrk(0))`. There is no stored flag distinguishing the two;
/// membership is inferred from this address range, which holds for every
/// mmap implementation this allocator runs against (anonymous mappings land
/// outside the brk-managed arena) but is an OS convention, not something
/// POSIX itself guarantees.
#[inline]
pub(crate) unsafe fn is_mmap_block(block: *mut Header, first_heap: *mut Header) -> bool {
    if first_heap.is_null() {
        return true;
    }
    let addr = block as usize;
    addr < first_heap as usize || addr >= sys::current_break() as usize
}
