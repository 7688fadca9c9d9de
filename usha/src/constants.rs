//! Fixed thresholds from the allocator contract. Not configurable — the
//! original allocator hard-codes them and nothing in the spec makes them
//! tunable.

/// Largest single request `alloc` will honor.
pub const SIZE_LIMIT: usize = 100_000_000;
/// Minimum leftover payload (in bytes, excluding the new header) required
/// to carve a free block off the tail of a larger one.
pub const SPLIT_THRESHOLD: usize = 128;
/// Requests at or above this size bypass the heap entirely and go straight
/// to an anonymous mapping.
pub const MMAP_THRESHOLD: usize = 128 * 1024;
