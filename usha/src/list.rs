//! Ordered insert/remove for the size-then-address heap list, and plain
//! insert/remove for the unordered mmap list.
//!
//! Direct translation of `HeapListInsert`/`HeapListRemove` from
//! `malloc_3.cpp`, restructured around a single insertion-point search
//! instead of the original's duplicated head/middle/tail branches.

use crate::header::{validate, Header};
use crate::heap::heap;

/// `true` if `a` sorts strictly before `b` under the heap's ordering:
/// size ascending, ties broken by address ascending.
#[inline]
unsafe fn sorts_before(a: *mut Header, b: *mut Header) -> bool {
    let (sa, sb) = ((*a).size, (*b).size);
    sa < sb || (sa == sb && (a as usize) < (b as usize))
}

/// Insert `node` into the size-ordered heap list, preserving order.
pub(crate) unsafe fn insert_ordered(node: *mut Header) {
    let h = heap();
    (*node).prev = std::ptr::null_mut();
    (*node).next = std::ptr::null_mut();

    if h.list_head.is_null() {
        h.list_head = node;
        return;
    }

    let mut cursor = h.list_head;
    loop {
        validate(cursor);
        if sorts_before(node, cursor) {
            let prev = (*cursor).prev;
            (*node).next = cursor;
            (*node).prev = prev;
            (*cursor).prev = node;
            if prev.is_null() {
                h.list_head = node;
            } else {
                (*prev).next = node;
            }
            return;
        }
        if (*cursor).next.is_null() {
            (*cursor).next = node;
            (*node).prev = cursor;
            return;
        }
        cursor = (*cursor).next;
    }
}

/// Remove `node` from the size-ordered heap list.
pub(crate) unsafe fn remove_ordered(node: *mut Header) {
    validate(node);
    let h = heap();

    let prev = (*node).prev;
    let next = (*node).next;

    if prev.is_null() {
        h.list_head = next;
    } else {
        validate(prev);
        (*prev).next = next;
    }
    if !next.is_null() {
        validate(next);
        (*next).prev = prev;
    }

    (*node).prev = std::ptr::null_mut();
    (*node).next = std::ptr::null_mut();
}

/// Append `node` to the tail of the (unordered) mmap block list.
pub(crate) unsafe fn append_mmap(node: *mut Header) {
    let h = heap();
    (*node).next = std::ptr::null_mut();

    if h.mmap_head.is_null() {
        (*node).prev = std::ptr::null_mut();
        h.mmap_head = node;
        return;
    }

    let mut cursor = h.mmap_head;
    validate(cursor);
    while !(*cursor).next.is_null() {
        cursor = (*cursor).next;
        validate(cursor);
    }
    (*cursor).next = node;
    (*node).prev = cursor;
}

/// Unlink `node` from the mmap block list.
pub(crate) unsafe fn remove_mmap(node: *mut Header) {
    validate(node);
    let h = heap();

    let prev = (*node).prev;
    let next = (*node).next;

    if prev.is_null() {
        h.mmap_head = next;
    } else {
        validate(prev);
        (*prev).next = next;
    }
    if !next.is_null() {
        validate(next);
        (*next).prev = prev;
    }
}
