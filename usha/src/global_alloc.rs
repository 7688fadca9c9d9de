//! Optional `GlobalAlloc` adapter over the core allocator.
//!
//! Not part of the allocator's own contract — provided so a binary can
//! opt in to routing its entire heap through USHA with `#[global_allocator]`,
//! the same shape `FreeListAlloc` takes in
//! `examples/brianmayclone-anyos/libs/stdlib/src/heap.rs`.

use crate::{alloc, free};
use std::alloc::{GlobalAlloc, Layout};

/// Wraps the crate's single-threaded allocator for use as a process-wide
/// `#[global_allocator]`.
///
/// # Safety contract
/// Inherits USHA's single-threaded-by-contract restriction: a program that
/// installs this as its global allocator and then allocates from more than
/// one thread invokes undefined behavior. Suitable only for the same
/// single-threaded callers the rest of this crate targets.
pub struct GlobalUsha;

unsafe impl GlobalAlloc for GlobalUsha {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        alloc(layout.size()).unwrap_or(std::ptr::null_mut())
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        free(ptr);
    }
}
