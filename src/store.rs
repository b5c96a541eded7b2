//! Store: the query surface collaborators use (`record` / `probably_exists`)
//! plus durable persistence of the cascade behind it.
//!
//! An explicit, owned handle — constructed once at startup and passed by
//! reference to the serving component; no global singleton.
//!
//! Identity: a store owns exactly one cascade file. On open it adopts the
//! newest cascade the directory registry found, so a load never silently
//! targets a freshly timestamped file that differs from the one just read.
//!
//! Concurrency: single writer, many readers. `probably_exists` takes a
//! read lock; `record` takes the write lock only for the in-memory
//! mutation and snapshot encode, then writes to disk with the lock
//! released. On-disk writes go through tmp+rename under an exclusive
//! lock file, so an external reader never sees a half-written file.

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use fs2::FileExt;

use crate::cascade::FilterCascade;
use crate::codec::encode_cascade;
use crate::config::{FlushMode, StoreConfig};
use crate::consts::{CASCADE_PREFIX, FILTER_EXT};
use crate::error::Result;
use crate::registry::{self, FileKind, Payload};
use crate::util::{atomic_write, now_millis};

pub struct Store {
    root: PathBuf,
    path: PathBuf,
    cascade: RwLock<FilterCascade>,
    flush_mode: FlushMode,
}

impl Store {
    /// Open a store rooted at `root`, recovering state from disk first.
    ///
    /// If the registry finds cascade files, the newest (by filename
    /// timestamp) becomes this store's cascade and file identity. Otherwise
    /// a fresh cascade is sized from the config, written to
    /// `cascade_<now_ms>.bin`, and adopted.
    pub fn open(root: &Path, cfg: &StoreConfig) -> Result<Self> {
        cfg.validate()?;
        let inv = registry::load_all(root, cfg.target_rate, cfg.growth_factor)?;

        let newest = inv
            .entries
            .into_iter()
            .filter_map(|e| match (e.kind, e.payload) {
                (FileKind::Cascade { timestamp_ms }, Payload::Cascade(c)) => {
                    Some((timestamp_ms, e.path, c))
                }
                _ => None,
            })
            .max_by_key(|(ts, _, _)| *ts);

        let store = match newest {
            Some((ts, path, cascade)) => {
                log::info!(
                    "adopted cascade {} (timestamp {}, {} generation(s))",
                    path.display(),
                    ts,
                    cascade.generations().len()
                );
                Self {
                    root: root.to_path_buf(),
                    path,
                    cascade: RwLock::new(cascade),
                    flush_mode: cfg.flush,
                }
            }
            None => {
                let cascade =
                    FilterCascade::new(cfg.expected_items, cfg.target_rate, cfg.growth_factor)?;
                let path = root.join(format!("{}{}.{}", CASCADE_PREFIX, now_millis(), FILTER_EXT));
                log::info!("creating fresh cascade at {}", path.display());
                let store = Self {
                    root: root.to_path_buf(),
                    path,
                    cascade: RwLock::new(cascade),
                    flush_mode: cfg.flush,
                };
                store.flush()?;
                store
            }
        };
        Ok(store)
    }

    /// Mark `key` present for all future queries. Repeated calls are safe;
    /// they inflate the insert counter, which only nudges the growth
    /// estimate (accepted approximation).
    ///
    /// With `FlushMode::EveryMutation` the cascade file is rewritten before
    /// this returns. An I/O failure leaves the in-memory cascade valid but
    /// the durable copy stale; the error tells the caller which.
    pub fn record(&self, key: &str) -> Result<()> {
        let snapshot = {
            let mut cascade = self
                .cascade
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            cascade.add(key.as_bytes())?;
            match self.flush_mode {
                FlushMode::EveryMutation => Some(encode_cascade(cascade.generations())),
                FlushMode::Manual => None,
            }
        };
        match snapshot {
            Some(bytes) => self.persist_bytes(&bytes),
            None => Ok(()),
        }
    }

    /// True: possibly present, perform the authoritative check.
    /// False: definitely absent, skip it. Total over all inputs.
    pub fn probably_exists(&self, key: &str) -> bool {
        // A poisoned lock still guards a structurally valid cascade (bits
        // only ever gain), so recover rather than propagate.
        let cascade = self.cascade.read().unwrap_or_else(PoisonError::into_inner);
        cascade.contains(key.as_bytes())
    }

    /// Persist the current cascade now. The snapshot is encoded under the
    /// read lock; the disk write happens with the lock released.
    pub fn flush(&self) -> Result<()> {
        let bytes = {
            let cascade = self.cascade.read().unwrap_or_else(PoisonError::into_inner);
            encode_cascade(cascade.generations())
        };
        self.persist_bytes(&bytes)
    }

    /// The cascade file this store owns.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn generation_count(&self) -> usize {
        let cascade = self.cascade.read().unwrap_or_else(PoisonError::into_inner);
        cascade.generations().len()
    }

    /// Total recorded keys (counting repeats) across all generations.
    pub fn recorded(&self) -> u64 {
        let cascade = self.cascade.read().unwrap_or_else(PoisonError::into_inner);
        cascade.inserted()
    }

    /// Estimated FPR of the active generation (the growth trigger signal).
    pub fn estimated_rate(&self) -> f64 {
        let cascade = self.cascade.read().unwrap_or_else(PoisonError::into_inner);
        cascade.active().estimate_fpr()
    }

    // Serialize writers across processes with an exclusive lock file, then
    // replace the cascade file atomically.
    fn persist_bytes(&self, bytes: &[u8]) -> Result<()> {
        let lock_path = self
            .path
            .with_file_name(format!("{}.lock", file_name_of(&self.path)));
        let lock = std::fs::OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&lock_path)?;
        lock.lock_exclusive()?;
        let res = atomic_write(&self.path, bytes);
        let _ = fs2::FileExt::unlock(&lock);
        res
    }
}

fn file_name_of(p: &Path) -> String {
    p.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "cascade".to_string())
}
