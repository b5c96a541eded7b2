//! bloomstore — durable scaling Bloom filter store.
//!
//! Approximate membership testing with no false negatives, a tunable
//! false-positive target, and disk-backed state that survives restarts.
//! Accuracy is kept bounded as the key set grows by appending filter
//! generations (a cascade) instead of rebuilding.

// Core modules
pub mod consts;
pub mod error;
pub mod hash;

pub mod filter; // packed-bit Bloom filter
pub mod cascade; // append-only generation sequence
pub mod codec; // binary block encode/decode
pub mod registry; // startup directory scan
pub mod store; // query surface + persistence

pub mod config;
pub mod util;

// Convenience re-exports
pub use cascade::FilterCascade;
pub use config::{FlushMode, StoreConfig};
pub use error::{Error, Result};
pub use filter::BloomFilter;
pub use registry::{load_all, DirectoryEntry, FileKind, Inventory, Payload};
pub use store::Store;
