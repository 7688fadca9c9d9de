//! `alloc()` / `calloc()`.
//!
//! Six-step ladder straight out of `smalloc()` in `malloc_3.cpp`: reject,
//! mmap fast path, first allocation ever, first-fit reuse, wilderness grow,
//! fresh wilderness.

use crate::constants::{MMAP_THRESHOLD, SIZE_LIMIT};
use crate::header::{header_size, payload_of, process_cookie, validate, Header};
use crate::heap::heap;
use crate::list::{append_mmap, insert_ordered, remove_ordered};
use crate::split::split;
use crate::sys;

/// Allocate `size` bytes, returning a payload pointer or `None` on failure.
///
/// `size == 0` or `size > SIZE_LIMIT` is rejected outright, mirroring the
/// original's `(size == 0 || size > SIZE_LIMIT)` guard.
pub(crate) unsafe fn alloc(size: usize) -> Option<*mut u8> {
    if size == 0 || size > SIZE_LIMIT {
        return None;
    }

    if size >= MMAP_THRESHOLD {
        return mmap_alloc(size);
    }

    let h = heap();

    if h.first_heap.is_null() {
        return first_allocation(size);
    }

    if let Some(block) = first_fit(size) {
        split(block, size);
        return Some(payload_of(block));
    }

    let wilderness = h.wilderness;
    validate(wilderness);
    if !wilderness.is_null() && (*wilderness).is_free {
        return grow_wilderness(wilderness, size);
    }

    fresh_wilderness(size)
}

/// `calloc(num, size)`: allocate `num * size` bytes, zeroed.
pub(crate) unsafe fn calloc(num: usize, size: usize) -> Option<*mut u8> {
    let total = num.checked_mul(size)?;
    let ptr = alloc(total)?;
    std::ptr::write_bytes(ptr, 0, total);
    Some(ptr)
}

/// First-fit scan of the size-ordered list (which holds every heap block,
/// free and used — see the heap state docs).
unsafe fn first_fit(size: usize) -> Option<*mut Header> {
    let h = heap();
    let mut cursor = h.list_head;
    while !cursor.is_null() {
        validate(cursor);
        if (*cursor).is_free && (*cursor).size >= size {
            return Some(cursor);
        }
        cursor = (*cursor).next;
    }
    None
}

/// The very first `sbrk` call the allocator ever makes: lay down one block
/// exactly `size` bytes long and make it both `first_heap` and `wilderness`.
unsafe fn first_allocation(size: usize) -> Option<*mut u8> {
    let total = header_size() + size;
    let base = sys::sbrk(total as isize)?;
    let block = base as *mut Header;

    (*block).cookie = process_cookie();
    (*block).size = size;
    (*block).is_free = false;
    (*block).prev = std::ptr::null_mut();
    (*block).next = std::ptr::null_mut();

    let h = heap();
    h.first_heap = block;
    h.wilderness = block;
    h.alloc_blocks += 1;
    h.alloc_bytes += size;
    h.meta_bytes += header_size();

    insert_ordered(block);

    Some(payload_of(block))
}

/// Grow the (free) wilderness block in place by exactly the shortfall, then
/// claim the whole thing. The block already exists — `alloc_blocks` already
/// counts it — so only the shortfall is new payload.
unsafe fn grow_wilderness(wilderness: *mut Header, size: usize) -> Option<*mut u8> {
    let old_size = (*wilderness).size;
    let shortfall = size - old_size;
    sys::sbrk(shortfall as isize)?;

    remove_ordered(wilderness);
    let h = heap();
    h.free_blocks -= 1;
    h.free_bytes -= old_size;
    h.alloc_bytes += shortfall;
    (*wilderness).size = size;
    (*wilderness).is_free = false;
    insert_ordered(wilderness);

    Some(payload_of(wilderness))
}

/// No reusable block and the wilderness is already fully claimed: push the
/// break out by a brand new block and make it the new wilderness.
unsafe fn fresh_wilderness(size: usize) -> Option<*mut u8> {
    let total = header_size() + size;
    let base = sys::sbrk(total as isize)?;
    let block = base as *mut Header;

    (*block).cookie = process_cookie();
    (*block).size = size;
    (*block).is_free = false;
    (*block).prev = std::ptr::null_mut();
    (*block).next = std::ptr::null_mut();

    let h = heap();
    h.wilderness = block;
    h.alloc_blocks += 1;
    h.alloc_bytes += size;
    h.meta_bytes += header_size();

    insert_ordered(block);

    Some(payload_of(block))
}

/// Large requests bypass the heap: one anonymous mapping per allocation,
/// tracked on the unordered mmap list instead of the size-ordered one.
unsafe fn mmap_alloc(size: usize) -> Option<*mut u8> {
    let total = header_size() + size;
    let base = sys::map_anonymous(total)?;
    let block = base as *mut Header;

    (*block).cookie = process_cookie();
    (*block).size = size;
    (*block).is_free = false;
    (*block).prev = std::ptr::null_mut();
    (*block).next = std::ptr::null_mut();

    append_mmap(block);

    let h = heap();
    h.alloc_blocks += 1;
    h.alloc_bytes += size;
    h.meta_bytes += header_size();

    Some(payload_of(block))
}
