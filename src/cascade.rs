//! Filter cascade: an append-only sequence of Bloom filter generations.
//!
//! Only the newest generation accepts inserts; queries OR across all of
//! them. When the newest generation's estimated FPR crosses the target,
//! one larger generation is appended and the previous one is frozen.
//! Growing by appending (instead of resizing a live bit buffer) is what
//! keeps concurrent readers safe and preserves the no-false-negative
//! guarantee: a key's bits live forever in the generation that was active
//! when it was recorded.

use crate::error::{Error, Result};
use crate::filter::{optimal_hashes, BloomFilter};

/// Ordered sequence of generations, oldest first.
#[derive(Debug, Clone)]
pub struct FilterCascade {
    target_rate: f64,
    growth_factor: f64,
    generations: Vec<BloomFilter>,
}

impl FilterCascade {
    /// Fresh cascade with a single generation sized for `expected_items`
    /// at `target_rate`.
    pub fn new(expected_items: u32, target_rate: f64, growth_factor: f64) -> Result<Self> {
        validate_params(target_rate, growth_factor)?;
        let first = BloomFilter::with_rate(expected_items, target_rate)?;
        Ok(Self {
            target_rate,
            growth_factor,
            generations: vec![first],
        })
    }

    /// Reconstruct a cascade from decoded generations (oldest first), e.g.
    /// after a file load. The persisted format carries no tuning
    /// parameters, so the runtime configuration supplies them.
    pub fn from_generations(
        generations: Vec<BloomFilter>,
        target_rate: f64,
        growth_factor: f64,
    ) -> Result<Self> {
        validate_params(target_rate, growth_factor)?;
        if generations.is_empty() {
            return Err(Error::Corrupt("cascade has no generations".into()));
        }
        Ok(Self {
            target_rate,
            growth_factor,
            generations,
        })
    }

    /// Insert a key into the newest generation, then grow the cascade if
    /// that generation's estimated FPR now exceeds the target. Returns
    /// whether a new generation was appended. At most one generation is
    /// appended per call.
    pub fn add(&mut self, key: &[u8]) -> Result<bool> {
        let tail = self.generations.len() - 1;
        self.generations[tail].add(key);

        let fpr = self.generations[tail].estimate_fpr();
        if fpr <= self.target_rate {
            return Ok(false);
        }

        let cur = &self.generations[tail];
        let new_m = scale_u32(cur.capacity_bits(), self.growth_factor);
        let new_n = scale_u32(cur.inserted().max(1), self.growth_factor);
        let new_k = optimal_hashes(new_m, new_n);
        let next = BloomFilter::new(new_m, new_k)?;

        log::info!(
            "cascade FPR {:.5} over target {:.5}; appending generation {} (m={}, k={})",
            fpr,
            self.target_rate,
            self.generations.len(),
            new_m,
            new_k
        );
        self.generations.push(next);
        Ok(true)
    }

    /// True iff any generation reports the key, short-circuiting on the
    /// first hit. Total over all inputs.
    pub fn contains(&self, key: &[u8]) -> bool {
        self.generations.iter().any(|f| f.contains(key))
    }

    /// All generations, oldest first. Never empty.
    pub fn generations(&self) -> &[BloomFilter] {
        &self.generations
    }

    /// The insertion target (newest generation).
    pub fn active(&self) -> &BloomFilter {
        &self.generations[self.generations.len() - 1]
    }

    pub fn target_rate(&self) -> f64 {
        self.target_rate
    }

    pub fn growth_factor(&self) -> f64 {
        self.growth_factor
    }

    /// Total `add` calls across all generations.
    pub fn inserted(&self) -> u64 {
        self.generations.iter().map(|f| f.inserted() as u64).sum()
    }
}

fn validate_params(target_rate: f64, growth_factor: f64) -> Result<()> {
    if !(target_rate > 0.0 && target_rate < 1.0) {
        return Err(Error::Config(format!(
            "target_rate must be in (0, 1), got {}",
            target_rate
        )));
    }
    if !(growth_factor > 1.0) {
        return Err(Error::Config(format!(
            "growth_factor must be > 1, got {}",
            growth_factor
        )));
    }
    Ok(())
}

/// Scale a counter by the growth factor, rounding up and clamping to u32.
#[inline]
fn scale_u32(v: u32, factor: f64) -> u32 {
    ((v as f64) * factor).ceil().min(u32::MAX as f64).max(1.0) as u32
}
