//! Key hashing and table-index mapping shared by `ConcurrentDict` and `LockManager`.
//!
//! Both structures place a key with `spread(fnv32(key), len)`. They do not share
//! a table, only this mapping, so two tables of equal length always agree on
//! which slot a key belongs to.

/// FNV offset basis; also the hash of the empty key.
pub const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
/// FNV 32-bit prime.
pub const FNV_PRIME: u32 = 16_777_619;

/// Smallest table length handed out by `next_power_of_two_capacity`.
pub const MIN_CAPACITY: usize = 16;
/// Upper bound for `next_power_of_two_capacity` (largest positive `i32`).
pub const MAX_CAPACITY: usize = i32::MAX as usize;

/// 32-bit FNV hash of `key`: multiply by the prime, then xor in the byte.
///
/// Overflow in the multiplication is discarded.
#[inline]
pub fn fnv32(key: &[u8]) -> u32 {
    let mut hash = FNV_OFFSET_BASIS;
    for &b in key {
        hash = hash.wrapping_mul(FNV_PRIME);
        hash ^= b as u32;
    }
    hash
}

/// Map `hash` into `[0, table_size)` with a mask.
///
/// Equivalent to `hash % table_size` only when `table_size` is a power of two.
/// For other sizes the result is still below `table_size` but some indices
/// are never produced. `table_size` must be non-zero.
#[inline]
pub fn spread(hash: u32, table_size: u32) -> u32 {
    debug_assert!(table_size > 0, "spread over an empty table");
    table_size.wrapping_sub(1) & hash
}

/// Round `requested` up to a power of two, never below `MIN_CAPACITY`.
///
/// Saturates at `MAX_CAPACITY` when the next power of two would not fit in a
/// positive `i32`.
pub fn next_power_of_two_capacity(requested: usize) -> usize {
    if requested <= MIN_CAPACITY {
        return MIN_CAPACITY;
    }
    match requested.checked_next_power_of_two() {
        Some(n) if n <= MAX_CAPACITY => n,
        _ => MAX_CAPACITY,
    }
}
