//! Packed-bit Bloom filter: the unit of hashing, insertion, query and
//! serialization.
//!
//! Bits, once set, are never cleared (no deletion), and `inserted` only
//! ever grows. Both invariants are what make frozen cascade generations
//! safe to read without locks.

use crate::error::{Error, Result};
use crate::hash::{base_pair, probe_position};

/// A single fixed-capacity Bloom filter over a packed byte buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BloomFilter {
    capacity_bits: u32,
    hash_count: u32,
    bits: Vec<u8>,
    inserted: u32,
}

impl BloomFilter {
    /// Create an empty filter with explicit geometry.
    pub fn new(capacity_bits: u32, hash_count: u32) -> Result<Self> {
        if capacity_bits == 0 {
            return Err(Error::Config("capacity_bits must be > 0".into()));
        }
        if hash_count == 0 {
            return Err(Error::Config("hash_count must be > 0".into()));
        }
        let byte_len = byte_len_for_bits(capacity_bits);
        Ok(Self {
            capacity_bits,
            hash_count,
            bits: vec![0u8; byte_len],
            inserted: 0,
        })
    }

    /// Create an empty filter sized for `expected_items` at `target_rate`
    /// using the standard optimal-size formulas.
    pub fn with_rate(expected_items: u32, target_rate: f64) -> Result<Self> {
        if expected_items == 0 {
            return Err(Error::Config("expected_items must be > 0".into()));
        }
        if !(target_rate > 0.0 && target_rate < 1.0) {
            return Err(Error::Config(format!(
                "target_rate must be in (0, 1), got {}",
                target_rate
            )));
        }
        let m = optimal_bits(expected_items, target_rate);
        let k = optimal_hashes(m, expected_items);
        Self::new(m, k)
    }

    /// Reassemble a filter from decoded parts. The buffer length must match
    /// the declared capacity exactly.
    pub(crate) fn from_parts(
        capacity_bits: u32,
        hash_count: u32,
        inserted: u32,
        bits: Vec<u8>,
    ) -> Result<Self> {
        if capacity_bits == 0 || hash_count == 0 {
            return Err(Error::Corrupt(format!(
                "zero geometry in filter block (m={}, k={})",
                capacity_bits, hash_count
            )));
        }
        let expect = byte_len_for_bits(capacity_bits);
        if bits.len() != expect {
            return Err(Error::Corrupt(format!(
                "bit buffer length mismatch: {} bytes for m={} (expected {})",
                bits.len(),
                capacity_bits,
                expect
            )));
        }
        Ok(Self {
            capacity_bits,
            hash_count,
            bits,
            inserted,
        })
    }

    pub fn capacity_bits(&self) -> u32 {
        self.capacity_bits
    }

    pub fn hash_count(&self) -> u32 {
        self.hash_count
    }

    /// Number of `add` calls so far (not distinct keys).
    pub fn inserted(&self) -> u32 {
        self.inserted
    }

    /// Raw packed bit buffer, ceil(capacity_bits/8) bytes.
    pub fn bit_bytes(&self) -> &[u8] {
        &self.bits
    }

    /// Set the k probed bits for `key` and bump the insert counter.
    /// Idempotent on the bits (OR semantics).
    pub fn add(&mut self, key: &[u8]) {
        let (h1, h2) = base_pair(key);
        for i in 0..self.hash_count {
            let pos = probe_position(h1, h2, i, self.capacity_bits);
            set_bit(&mut self.bits, pos as usize);
        }
        self.inserted = self.inserted.saturating_add(1);
    }

    /// True iff all k probed bits are set. Total over all inputs; never a
    /// false negative for a previously added key.
    pub fn contains(&self, key: &[u8]) -> bool {
        let (h1, h2) = base_pair(key);
        for i in 0..self.hash_count {
            let pos = probe_position(h1, h2, i, self.capacity_bits);
            if !get_bit(&self.bits, pos as usize) {
                return false;
            }
        }
        true
    }

    /// Estimated false-positive rate at the current fill: (1 - e^{-kn/m})^k.
    pub fn estimate_fpr(&self) -> f64 {
        let m = self.capacity_bits as f64;
        let k = self.hash_count as f64;
        let n = self.inserted as f64;
        let prob_bit_set = 1.0 - (-k * n / m).exp();
        prob_bit_set.powf(k)
    }
}

/// Optimal bit count for n expected items at rate p: ceil(-n·ln(p)/ln(2)^2).
pub fn optimal_bits(expected_items: u32, target_rate: f64) -> u32 {
    let n = expected_items as f64;
    let m = (-n * target_rate.ln() / std::f64::consts::LN_2.powi(2)).ceil();
    m.min(u32::MAX as f64).max(1.0) as u32
}

/// Optimal hash count for m bits and n expected items: round((m/n)·ln 2),
/// never below 1.
pub fn optimal_hashes(capacity_bits: u32, expected_items: u32) -> u32 {
    let m = capacity_bits as f64;
    let n = (expected_items as f64).max(1.0);
    let k = (m / n * std::f64::consts::LN_2).round();
    k.min(u32::MAX as f64).max(1.0) as u32
}

#[inline]
pub(crate) fn byte_len_for_bits(bits: u32) -> usize {
    (bits as usize + 7) / 8
}

// LSB-first within a byte; matches the persisted layout.
#[inline]
fn set_bit(bytes: &mut [u8], bit: usize) {
    bytes[bit / 8] |= 1u8 << (bit % 8);
}

#[inline]
fn get_bit(bytes: &[u8], bit: usize) -> bool {
    (bytes[bit / 8] & (1u8 << (bit % 8))) != 0
}
