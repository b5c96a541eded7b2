//! Directory registry: startup-time recovery of persisted filter state.
//!
//! Scans a storage directory once at process start, classifies each `.bin`
//! file by its name and decodes it. Individual corrupt files are logged
//! and skipped so one bad file never blocks recovery of the rest; the
//! inventory reports what loaded plus the skip count. Not used on the hot
//! query/insert path.

use std::fs;
use std::path::{Path, PathBuf};

use crate::cascade::FilterCascade;
use crate::codec::{decode_cascade, decode_filter};
use crate::consts::{CASCADE_PREFIX, FILTER_EXT};
use crate::error::Result;
use crate::filter::BloomFilter;

/// What a file name says the file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// `cascade_<millisecond-timestamp>.bin`
    Cascade { timestamp_ms: u64 },
    /// Any other name with the recognized extension.
    Single,
}

/// Decoded contents of one recognized file.
#[derive(Debug, Clone)]
pub enum Payload {
    Single(BloomFilter),
    Cascade(FilterCascade),
}

/// One successfully loaded file. Read-only after load.
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    pub path: PathBuf,
    pub kind: FileKind,
    pub payload: Payload,
}

/// Everything the scan recovered.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    pub entries: Vec<DirectoryEntry>,
    /// Files with the recognized extension that failed to read or decode.
    pub skipped: usize,
}

/// Classify a file name against the naming convention. Returns None for
/// names without the recognized extension. A `cascade_` prefix with a
/// malformed timestamp does not match the convention and falls back to
/// `Single` (arbitrary names are legal for single-filter files).
pub fn classify_file_name(name: &str) -> Option<FileKind> {
    let stem = name.strip_suffix(&format!(".{}", FILTER_EXT))?;
    if let Some(ts) = stem.strip_prefix(CASCADE_PREFIX) {
        if !ts.is_empty() && ts.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(timestamp_ms) = ts.parse::<u64>() {
                return Some(FileKind::Cascade { timestamp_ms });
            }
        }
    }
    Some(FileKind::Single)
}

/// Scan `dir` and decode every recognized file. Creates the directory if
/// absent (empty inventory). Per-file failures are logged and counted in
/// `skipped`; only a failure to read the directory itself is an error.
///
/// `target_rate`/`growth_factor` parameterize reconstructed cascades: the
/// persisted format carries filter geometry but no tuning parameters.
pub fn load_all(dir: &Path, target_rate: f64, growth_factor: f64) -> Result<Inventory> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
        return Ok(Inventory::default());
    }

    let mut inv = Inventory::default();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n.to_string(),
            None => continue,
        };
        let kind = match classify_file_name(&name) {
            Some(k) => k,
            None => continue, // unrecognized extension, not ours
        };

        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) => {
                log::warn!("skipping {}: read failed: {}", path.display(), e);
                inv.skipped += 1;
                continue;
            }
        };

        let payload = match kind {
            FileKind::Cascade { .. } => decode_cascade(&bytes).and_then(|gens| {
                FilterCascade::from_generations(gens, target_rate, growth_factor)
                    .map(Payload::Cascade)
            }),
            FileKind::Single => decode_filter(&bytes).map(Payload::Single),
        };

        match payload {
            Ok(payload) => inv.entries.push(DirectoryEntry { path, kind, payload }),
            Err(e) => {
                log::warn!("skipping {}: {}", path.display(), e);
                inv.skipped += 1;
            }
        }
    }

    log::info!(
        "loaded {} filter file(s) from {} ({} skipped)",
        inv.entries.len(),
        dir.display(),
        inv.skipped
    );
    Ok(inv)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_follows_convention() {
        assert_eq!(
            classify_file_name("cascade_1712345678901.bin"),
            Some(FileKind::Cascade {
                timestamp_ms: 1_712_345_678_901
            })
        );
        assert_eq!(classify_file_name("users.bin"), Some(FileKind::Single));
        // prefix with a malformed timestamp is just an arbitrary name
        assert_eq!(classify_file_name("cascade_abc.bin"), Some(FileKind::Single));
        assert_eq!(classify_file_name("cascade_.bin"), Some(FileKind::Single));
        // wrong extension is not ours at all
        assert_eq!(classify_file_name("cascade_123.txt"), None);
        assert_eq!(classify_file_name("notes.md"), None);
    }
}
