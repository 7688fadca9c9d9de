//! `realloc()` — the seven-step (a–h) ladder.
//!
//! Ported from `srealloc` in `malloc_3.cpp`, including its "protect trick":
//! to coalesce only one side of a block, the other neighbor's `is_free` is
//! cleared for the duration of the sweep so the (address-global) coalescer
//! can't also pull it in. Each branch below drives the same `mark_free` +
//! `coalesce_sweep` + `split` primitives `free`/`alloc` use internally,
//! exactly as the original drives its own `merge()`/`split()` from `srealloc`.

use crate::alloc::alloc;
use crate::constants::{MMAP_THRESHOLD, SIZE_LIMIT};
use crate::free::{coalesce_sweep, free, mark_free};
use crate::header::{
    header_of, header_size, is_mmap_block, next_by_address, payload_of, validate, Header,
};
use crate::heap::heap;
use crate::list::{insert_ordered, remove_ordered};
use crate::split::split;
use crate::sys;

/// Resize the allocation at `ptr` to `new_size` bytes, returning the
/// (possibly moved) new payload pointer.
///
/// `size == 0` or `size > SIZE_LIMIT` is rejected outright with no side
/// effects, mirroring the original `srealloc`'s `(size == 0 || size >
/// SIZE_LIMIT) return NULL` guard — it does not free `ptr` on a zero size.
pub(crate) unsafe fn realloc(ptr: *mut u8, new_size: usize) -> Option<*mut u8> {
    if ptr.is_null() {
        return alloc(new_size);
    }
    if new_size == 0 || new_size > SIZE_LIMIT {
        return None;
    }

    let block = header_of(ptr);
    validate(block);

    if is_mmap_block(block, heap().first_heap) {
        return realloc_mmap(block, new_size);
    }

    // (a) already big enough: shrink in place, no merge needed.
    if (*block).size >= new_size {
        split(block, new_size);
        return Some(ptr);
    }

    let is_wild = block == heap().wilderness;
    let is_first = block == heap().first_heap;
    let next_blk = if is_wild { None } else { Some(next_by_address(block)) };
    let prev = if is_first {
        None
    } else {
        Some(address_predecessor(block))
    };
    if let Some(p) = prev {
        validate(p);
    }
    if let Some(n) = next_blk {
        validate(n);
    }

    // (b) lower neighbor free: merge down, possibly extend into wilderness.
    if let Some(prev) = prev {
        if (*prev).is_free {
            let old_payload_len = (*block).size;

            if (*prev).size + (*block).size + header_size() >= new_size {
                mark_free(block);
                let saved_next_free = next_blk.map(|n| (*n).is_free);
                if let Some(n) = next_blk {
                    (*n).is_free = false;
                }
                coalesce_sweep();
                if let (Some(n), Some(was_free)) = (next_blk, saved_next_free) {
                    (*n).is_free = was_free;
                }
                split(prev, new_size);
                coalesce_sweep();
                let dst = payload_of(prev);
                std::ptr::copy(ptr, dst, old_payload_len.min(new_size));
                return Some(dst);
            }

            if is_wild {
                // Merging prev+block yields exactly this size; anything
                // beyond it must come from `sbrk`. Grow the break first —
                // before the merge — so a failed `sbrk` leaves `ptr` and
                // the block graph untouched.
                let merged_size = (*prev).size + (*block).size + header_size();
                let shortfall = new_size - merged_size;
                probe_sbrk_room(shortfall)?;
                extend_wilderness(block, shortfall);

                mark_free(block);
                coalesce_sweep();
                let dst = payload_of(prev);
                std::ptr::copy(ptr, dst, old_payload_len.min(new_size));
                return Some(dst);
            }
        }
    }

    // (c) block itself is the wilderness: grow in place, no copy.
    if is_wild {
        let shortfall = new_size - (*block).size;
        probe_sbrk_room(shortfall)?;
        extend_wilderness(block, shortfall);
        return Some(payload_of(block));
    }

    // (d) upper neighbor free: merge up, no copy (payload already in place).
    if let Some(next_b) = next_blk {
        if (*next_b).is_free && (*block).size + (*next_b).size + header_size() >= new_size {
            mark_free(block);
            let saved_prev_free = prev.map(|p| (*p).is_free);
            if let Some(p) = prev {
                (*p).is_free = false;
            }
            coalesce_sweep();
            if let (Some(p), Some(was_free)) = (prev, saved_prev_free) {
                (*p).is_free = was_free;
            }
            split(block, new_size);
            return Some(payload_of(block));
        }
    }

    // (e) both neighbors free and sufficient together: three-way coalesce.
    if let (Some(prev), Some(next_b)) = (prev, next_blk) {
        if (*prev).is_free
            && (*next_b).is_free
            && (*prev).size + (*block).size + (*next_b).size + 2 * header_size() >= new_size
        {
            let old_payload_len = (*block).size;
            mark_free(block);
            coalesce_sweep();
            split(prev, new_size);
            let dst = payload_of(prev);
            std::ptr::copy(ptr, dst, old_payload_len.min(new_size));
            return Some(dst);
        }
    }

    // (f) upper neighbor is the (free) wilderness: merge what we can, then
    // grow via `sbrk` to cover whatever shortfall remains. As in (b), the
    // break is grown — via `extend_wilderness` — before any merge is
    // committed: a failed probe leaves `ptr` and the block graph exactly
    // as they were on entry.
    if let Some(next_b) = next_blk {
        if next_b == heap().wilderness && (*next_b).is_free {
            let old_payload_len = (*block).size;
            if let Some(prev) = prev {
                if (*prev).is_free {
                    let merged_size =
                        (*prev).size + (*block).size + (*next_b).size + 2 * header_size();
                    let shortfall = new_size - merged_size;
                    probe_sbrk_room(shortfall)?;
                    extend_wilderness(next_b, shortfall);

                    mark_free(block);
                    coalesce_sweep();
                    // `prev` absorbed block and next_b; un-free it so the
                    // merged block is claimed rather than left free.
                    let h = heap();
                    h.free_blocks -= 1;
                    h.free_bytes -= (*prev).size;
                    (*prev).is_free = false;
                    let dst = payload_of(prev);
                    std::ptr::copy(ptr, dst, old_payload_len.min(new_size));
                    return Some(dst);
                }
            }

            let merged_size = (*block).size + (*next_b).size + header_size();
            let shortfall = new_size - merged_size;
            probe_sbrk_room(shortfall)?;
            extend_wilderness(next_b, shortfall);

            mark_free(block);
            coalesce_sweep();
            let h = heap();
            h.free_blocks -= 1;
            h.free_bytes -= (*block).size;
            (*block).is_free = false;
            return Some(payload_of(block));
        }
    }

    // (g)/(h) fallback: fresh allocation, copy, free the old block.
    let new_ptr = alloc(new_size)?;
    let copy_len = (*block).size.min(new_size);
    std::ptr::copy_nonoverlapping(ptr, new_ptr, copy_len);
    free(ptr);
    Some(new_ptr)
}

/// mmap blocks have no splitting or coalescing: a resize always means a
/// fresh mapping, copy, and unmap of the old one, unless the request
/// happens to ask for the exact size already mapped.
unsafe fn realloc_mmap(block: *mut Header, new_size: usize) -> Option<*mut u8> {
    if new_size >= MMAP_THRESHOLD && (*block).size == new_size {
        return Some(payload_of(block));
    }
    let old_ptr = payload_of(block);
    let new_ptr = alloc(new_size)?;
    let copy_len = (*block).size.min(new_size);
    std::ptr::copy_nonoverlapping(old_ptr, new_ptr, copy_len);
    free(old_ptr);
    Some(new_ptr)
}

/// Walk from `first_heap` to find the block immediately preceding `target`
/// in address order. Mirrors the linear scan `srealloc` performs in the
/// original allocator.
unsafe fn address_predecessor(target: *mut Header) -> *mut Header {
    let h = heap();
    let mut cursor = h.first_heap;
    loop {
        validate(cursor);
        let nxt = next_by_address(cursor);
        if nxt == target {
            return cursor;
        }
        cursor = nxt;
    }
}

/// Grow the break by `shortfall` bytes, without touching any block state.
/// Callers that need to merge free neighbors before growing the result must
/// call this *first*, before `mark_free`/`coalesce_sweep`: per §5, a failed
/// `sbrk` must leave the block graph exactly as it was on entry, and a merge
/// is not reversible once `coalesce_sweep` has run.
unsafe fn probe_sbrk_room(shortfall: usize) -> Option<()> {
    if shortfall == 0 {
        return Some(());
    }
    sys::sbrk(shortfall as isize)?;
    Some(())
}

/// Fold `shortfall` bytes a prior `probe_sbrk_room` call already secured
/// into `wilderness`'s own size, re-sorting it in the ordered list. Must run
/// before any `coalesce_sweep`: the sweep walks the header chain up to the
/// current break, and without this the space `sbrk` just added has no
/// header describing it yet.
unsafe fn extend_wilderness(wilderness: *mut Header, shortfall: usize) {
    if shortfall == 0 {
        return;
    }
    remove_ordered(wilderness);
    let h = heap();
    h.alloc_bytes += shortfall;
    (*wilderness).size += shortfall;
    insert_ordered(wilderness);
}
