//! Process-wide heap state.
//!
//! USHA is single-threaded by contract (see crate docs): there is no lock
//! here, only an `UnsafeCell` wrapper so the `static` compiles. Concurrent
//! callers are undefined behavior, same as calling `malloc` from two threads
//! without a lock around it — this mirrors the `static MemoryList Heap` global
//! in the original allocator and the `static mut HEAP_POS`-style singletons in
//! `examples/brianmayclone-anyos/libs/stdlib/src/heap.rs`.

use crate::header::Header;
use std::cell::UnsafeCell;
use std::ptr;

pub(crate) struct HeapState {
    /// Head of the size-then-address ordered list of every heap block.
    pub(crate) list_head: *mut Header,
    /// Lowest-address heap block; anchor for address-order traversal.
    pub(crate) first_heap: *mut Header,
    /// Highest-address heap block; the only one `sbrk` can extend.
    pub(crate) wilderness: *mut Header,
    /// Head of the (unordered) list of blocks served via `mmap`.
    pub(crate) mmap_head: *mut Header,

    pub(crate) free_blocks: usize,
    pub(crate) free_bytes: usize,
    pub(crate) alloc_blocks: usize,
    pub(crate) alloc_bytes: usize,
    pub(crate) meta_bytes: usize,
}

impl HeapState {
    const fn new() -> Self {
        Self {
            list_head: ptr::null_mut(),
            first_heap: ptr::null_mut(),
            wilderness: ptr::null_mut(),
            mmap_head: ptr::null_mut(),
            free_blocks: 0,
            free_bytes: 0,
            alloc_blocks: 0,
            alloc_bytes: 0,
            meta_bytes: 0,
        }
    }
}

struct HeapCell(UnsafeCell<HeapState>);

// Safety: USHA's single-threaded contract means the crate never accesses
// `HEAP` from two threads concurrently; the `Sync` bound only exists so the
// `static` below type-checks.
unsafe impl Sync for HeapCell {}

static HEAP: HeapCell = HeapCell(UnsafeCell::new(HeapState::new()));

/// Borrow the process-wide heap state mutably.
///
/// # Safety
/// The caller must uphold USHA's single-threaded contract: no other call
/// into this crate may be in progress concurrently.
#[inline]
#[allow(clippy::mut_from_ref)]
pub(crate) unsafe fn heap() -> &'static mut HeapState {
    &mut *HEAP.0.get()
}
