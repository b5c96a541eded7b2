//! Stable double hashing for probe positions.
//!
//! Goals:
//! - Use a stable, explicit hash (not std::DefaultHasher) to keep bit
//!   positions invariant across toolchains/platforms — persisted filters
//!   must probe the same bits after a reload on any machine.
//! - Derive k positions from two base hashes (Kirsch–Mitzenmacher) instead
//!   of k independent hash computations.

use std::io::Cursor;

use murmur3::murmur3_32;

/// 32-bit murmur3 of a key with an explicit seed.
#[inline]
pub fn hash32(key: &[u8], seed: u32) -> u32 {
    // murmur3_32 reads from an in-memory cursor; that read cannot fail.
    murmur3_32(&mut Cursor::new(key), seed).unwrap_or(0)
}

/// The two base hashes: h2 is seeded with h1, which decorrelates the pair
/// without needing a second hash function.
#[inline]
pub fn base_pair(key: &[u8]) -> (u32, u32) {
    let h1 = hash32(key, 0);
    let h2 = hash32(key, h1);
    (h1, h2)
}

/// i-th probe position in [0, m). The linear combination is computed in
/// u64 so it never wraps and the residue is always non-negative.
#[inline]
pub fn probe_position(h1: u32, h2: u32, i: u32, m: u32) -> u32 {
    debug_assert!(m > 0, "capacity_bits must be > 0");
    ((h1 as u64 + (i as u64) * (h2 as u64)) % (m as u64)) as u32
}

/// All k probe positions for a key. Duplicates are possible and tolerated
/// (they reduce effective k slightly).
pub fn probe_positions(key: &[u8], k: u32, m: u32) -> impl Iterator<Item = u32> {
    let (h1, h2) = base_pair(key);
    (0..k).map(move |i| probe_position(h1, h2, i, m))
}
