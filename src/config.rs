//! Centralized configuration for a store.
//!
//! Goals:
//! - Single place to collect tunables instead of scattering env lookups.
//! - StoreConfig::from_env() reads BLOOMSTORE_* variables; fluent with_*
//!   setters allow programmatic overrides on top.
//!
//! Flush policy is a configuration choice, not a silent behavior change:
//! `EveryMutation` (default) rewrites the cascade file after every record,
//! matching the durability of the original low-throughput deployment;
//! `Manual` batches writes behind an explicit `Store::flush()`.

use std::fmt;

use crate::consts::{DEFAULT_EXPECTED_ITEMS, DEFAULT_GROWTH_FACTOR, DEFAULT_TARGET_FPR};
use crate::error::{Error, Result};

/// When the cascade file is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushMode {
    /// Persist after every successful `record` (default).
    EveryMutation,
    /// Persist only on `Store::flush()`. The in-memory cascade is the
    /// source of truth between flushes; a crash loses unflushed records.
    Manual,
}

/// Tunables for opening a store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Expected item count used to size a fresh cascade's first generation.
    /// Env: BLOOMSTORE_EXPECTED_ITEMS (default 10000)
    pub expected_items: u32,

    /// Target false-positive rate, exclusive (0, 1).
    /// Env: BLOOMSTORE_TARGET_FPR (default 0.01)
    pub target_rate: f64,

    /// Capacity/estimate multiplier applied when appending a generation.
    /// Env: BLOOMSTORE_GROWTH_FACTOR (default 2.0)
    pub growth_factor: f64,

    /// Flush policy. Env: BLOOMSTORE_FLUSH = "every" | "manual"
    pub flush: FlushMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            expected_items: DEFAULT_EXPECTED_ITEMS,
            target_rate: DEFAULT_TARGET_FPR,
            growth_factor: DEFAULT_GROWTH_FACTOR,
            flush: FlushMode::EveryMutation,
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables; unset or unparsable
    /// values keep their defaults.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("BLOOMSTORE_EXPECTED_ITEMS") {
            if let Ok(n) = v.trim().parse::<u32>() {
                cfg.expected_items = n;
            }
        }
        if let Ok(v) = std::env::var("BLOOMSTORE_TARGET_FPR") {
            if let Ok(p) = v.trim().parse::<f64>() {
                cfg.target_rate = p;
            }
        }
        if let Ok(v) = std::env::var("BLOOMSTORE_GROWTH_FACTOR") {
            if let Ok(g) = v.trim().parse::<f64>() {
                cfg.growth_factor = g;
            }
        }
        if let Ok(v) = std::env::var("BLOOMSTORE_FLUSH") {
            match v.trim().to_ascii_lowercase().as_str() {
                "manual" => cfg.flush = FlushMode::Manual,
                "every" | "everymutation" => cfg.flush = FlushMode::EveryMutation,
                _ => {}
            }
        }

        cfg
    }

    // Fluent setters (builder-style) to override specific fields.

    pub fn with_expected_items(mut self, n: u32) -> Self {
        self.expected_items = n;
        self
    }

    pub fn with_target_rate(mut self, p: f64) -> Self {
        self.target_rate = p;
        self
    }

    pub fn with_growth_factor(mut self, g: f64) -> Self {
        self.growth_factor = g;
        self
    }

    pub fn with_flush(mut self, mode: FlushMode) -> Self {
        self.flush = mode;
        self
    }

    /// Fail fast on parameters the cascade would reject anyway.
    pub fn validate(&self) -> Result<()> {
        if self.expected_items == 0 {
            return Err(Error::Config("expected_items must be > 0".into()));
        }
        if !(self.target_rate > 0.0 && self.target_rate < 1.0) {
            return Err(Error::Config(format!(
                "target_rate must be in (0, 1), got {}",
                self.target_rate
            )));
        }
        if !(self.growth_factor > 1.0) {
            return Err(Error::Config(format!(
                "growth_factor must be > 1, got {}",
                self.growth_factor
            )));
        }
        Ok(())
    }
}

impl fmt::Display for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StoreConfig {{ expected_items: {}, target_rate: {}, growth_factor: {}, flush: {:?} }}",
            self.expected_items, self.target_rate, self.growth_factor, self.flush
        )
    }
}
