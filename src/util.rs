//! util — small shared helpers (time, atomic file replacement).

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::error::Result;

/// Current Unix time in milliseconds (saturating).
#[inline]
pub fn now_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    now.as_millis().min(u64::MAX as u128) as u64
}

/// Replace `path` atomically: write a sibling tmp file, fsync it, rename it
/// into place, then fsync the parent directory (best-effort; no-op on
/// non-Unix). An external reader never observes a half-written file.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = match path.file_name() {
        Some(name) => path.with_file_name(format!("{}.tmp", name.to_string_lossy())),
        None => path.with_file_name("out.tmp"),
    };
    let _ = fs::remove_file(&tmp); // stale tmp from a crashed writer

    let mut f = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&tmp)?;
    f.write_all(bytes)?;
    f.sync_all()?;

    fs::rename(&tmp, path)?;
    let _ = fsync_parent_dir(path);
    Ok(())
}

#[cfg(unix)]
fn fsync_parent_dir(p: &Path) -> std::io::Result<()> {
    if let Some(parent) = p.parent() {
        if !parent.as_os_str().is_empty() {
            let dir = File::open(parent)?;
            dir.sync_all()?;
        }
    }
    Ok(())
}
#[cfg(not(unix))]
fn fsync_parent_dir(_p: &Path) -> std::io::Result<()> {
    Ok(())
}
