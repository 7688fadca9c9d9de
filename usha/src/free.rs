//! `free()` and the coalescing sweep that follows it.
//!
//! The original `sfree`/`smerge` coalesces recursively outward from the
//! freed block. Here the sweep is flattened into an iteration bounded by the
//! current program break (`sbrk(0)`), so freeing a block at the bottom of a
//! long, fully-free heap cannot blow the stack — see the recursion→iteration
//! redesign note in the design ledger.

use crate::header::{header_of, header_size, is_mmap_block, next_by_address, validate, Header};
use crate::heap::heap;
use crate::list::{insert_ordered, remove_mmap, remove_ordered};
use crate::sys;

/// Free a previously allocated payload pointer. A null pointer is a no-op,
/// matching `free(NULL)` semantics the original allocator also honors.
pub(crate) unsafe fn free(ptr: *mut u8) {
    if ptr.is_null() {
        return;
    }

    let block = header_of(ptr);
    validate(block);

    if is_mmap_block(block, heap().first_heap) {
        free_mmap(block);
        return;
    }

    if (*block).is_free {
        return;
    }

    mark_free(block);
    coalesce_sweep();
}

/// Mark an in-use heap block free, adjusting only the free counters — the
/// block already exists and was already counted in `alloc_blocks`/
/// `alloc_bytes`, matching the original's `sfree`, which leaves those two
/// untouched on a plain (non-mmap) free.
pub(crate) unsafe fn mark_free(block: *mut Header) {
    let h = heap();
    (*block).is_free = true;
    h.free_blocks += 1;
    h.free_bytes += (*block).size;
}

unsafe fn free_mmap(block: *mut Header) {
    let h = heap();
    let total = header_size() + (*block).size;
    h.alloc_blocks -= 1;
    h.alloc_bytes -= (*block).size;
    h.meta_bytes -= header_size();
    remove_mmap(block);
    sys::unmap(block as *mut u8, total);
}

/// Sweep the heap once from `first_heap` to the current break, merging every
/// adjacent pair of free blocks it finds. Repeats until a full pass performs
/// no merge, so triple-and-beyond runs of free blocks fully collapse.
pub(crate) unsafe fn coalesce_sweep() {
    loop {
        let h = heap();
        if h.first_heap.is_null() {
            return;
        }
        let brk = sys::current_break();
        let mut cursor = h.first_heap;
        let mut merged_any = false;

        while (cursor as *mut u8) < brk {
            validate(cursor);
            let neighbor = next_by_address(cursor);
            if (neighbor as *mut u8) >= brk {
                break;
            }
            validate(neighbor);

            if (*cursor).is_free && (*neighbor).is_free {
                merge_pair(cursor, neighbor);
                merged_any = true;
                // restart the scan from the same cursor: it may now be
                // adjacent to a third free block.
                continue;
            }

            cursor = neighbor;
        }

        if !merged_any {
            return;
        }
    }
}

/// Absorb `right` into `left`; both must already be free and adjacent.
/// One fewer block exists afterward, so `alloc_blocks` drops by one and the
/// header it used to need becomes reclaimed payload.
unsafe fn merge_pair(left: *mut Header, right: *mut Header) {
    remove_ordered(left);
    remove_ordered(right);

    let combined = (*left).size + header_size() + (*right).size;

    let h = heap();
    h.free_blocks -= 1;
    h.free_bytes += header_size();
    h.alloc_blocks -= 1;
    h.alloc_bytes += header_size();
    h.meta_bytes -= header_size();

    if h.wilderness == right {
        h.wilderness = left;
    }

    (*left).size = combined;
    insert_ordered(left);
}
