//! Shared constants: on-disk naming convention, block layout, defaults.

// -------- File naming --------
// Cascade files: cascade_<millisecond-timestamp>.bin
// Single-filter files: any other name with the .bin extension.
pub const CASCADE_PREFIX: &str = "cascade_";
pub const FILTER_EXT: &str = "bin";

// -------- Filter block (big-endian) --------
// [capacity_bits u32][hash_count u32][inserted u32] + ceil(capacity_bits/8) bytes
pub const FILTER_HDR_SIZE: usize = 12;

// -------- Configuration defaults --------
pub const DEFAULT_EXPECTED_ITEMS: u32 = 10_000;
pub const DEFAULT_TARGET_FPR: f64 = 0.01;
pub const DEFAULT_GROWTH_FACTOR: f64 = 2.0;
