//! Splitting a block down to the size a request actually needs.
//!
//! Direct port of `split()` in `malloc_3.cpp`. Used both when `alloc`
//! claims a block out of the free list (entry `is_free == true`) and when
//! `realloc` shrinks an already-used block in place (entry
//! `is_free == false`) — the original's `split` handles both callers with
//! the same counter logic, keyed off the block's `is_free` on entry.

use crate::constants::SPLIT_THRESHOLD;
use crate::header::{header_size, Header};
use crate::heap::heap;
use crate::list::{insert_ordered, remove_ordered};

/// Shrink `block` down to `wanted` payload bytes, carving the leftover tail
/// off as a new free block when there's enough of it to be worth a header.
///
/// `block` must have `size >= wanted`. If the leftover is too small to
/// split off, the whole block is simply claimed (or, if it was already
/// used, left untouched) — no new block is created.
pub(crate) unsafe fn split(block: *mut Header, wanted: usize) {
    let old_size = (*block).size;
    let was_free = (*block).is_free;
    let h = heap();

    let big_enough = old_size >= wanted
        && old_size - wanted >= header_size() + SPLIT_THRESHOLD;

    if !big_enough {
        if was_free {
            (*block).is_free = false;
            h.free_blocks -= 1;
            h.free_bytes -= old_size;
        }
        return;
    }

    let remainder = (block as *mut u8).add(header_size() + wanted) as *mut Header;
    (*remainder).cookie = (*block).cookie;
    (*remainder).is_free = true;
    (*remainder).size = old_size - wanted - header_size();
    (*remainder).prev = std::ptr::null_mut();
    (*remainder).next = std::ptr::null_mut();

    if was_free {
        h.free_bytes -= wanted + header_size();
    } else {
        h.free_blocks += 1;
        h.free_bytes += (*remainder).size;
    }

    (*block).is_free = false;
    (*block).size = wanted;

    h.alloc_blocks += 1;
    h.alloc_bytes -= header_size();
    h.meta_bytes += header_size();

    if h.wilderness == block {
        h.wilderness = remainder;
    }

    remove_ordered(block);
    insert_ordered(block);
    insert_ordered(remainder);
}
