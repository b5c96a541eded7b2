use std::fs;

use anyhow::Result;

use bloomstore::codec::{encode_cascade, encode_filter};
use bloomstore::registry::{load_all, FileKind, Payload};
use bloomstore::{BloomFilter, FilterCascade};

#[test]
fn absent_directory_is_created_empty() -> Result<()> {
    let root = unique_root("absent");
    assert!(!root.exists());
    let inv = load_all(&root, 0.01, 2.0)?;
    assert!(root.is_dir());
    assert!(inv.entries.is_empty());
    assert_eq!(inv.skipped, 0);
    Ok(())
}

/// Five valid files plus one truncated one: the scan returns the five and
/// reports one skip without raising.
#[test]
fn corrupt_file_is_skipped_not_fatal() -> Result<()> {
    let root = unique_root("mixed");
    fs::create_dir_all(&root)?;

    // three single-filter files with arbitrary names
    for (name, key) in [("users.bin", "alice"), ("emails.bin", "a@b"), ("x.bin", "z")] {
        let mut f = BloomFilter::new(160, 4)?;
        f.add(key.as_bytes());
        fs::write(root.join(name), encode_filter(&f))?;
    }

    // two cascade files with embedded timestamps
    for ts in [1_700_000_000_001u64, 1_700_000_000_002] {
        let mut c = FilterCascade::new(10, 0.01, 2.0)?;
        for i in 0..30 {
            c.add(format!("k{}-{}", ts, i).as_bytes())?;
        }
        fs::write(
            root.join(format!("cascade_{}.bin", ts)),
            encode_cascade(c.generations()),
        )?;
    }

    // one truncated file and one unrelated file
    fs::write(root.join("broken.bin"), [0u8; 7])?;
    fs::write(root.join("notes.txt"), b"not a filter")?;

    let inv = load_all(&root, 0.01, 2.0)?;
    assert_eq!(inv.entries.len(), 5);
    assert_eq!(inv.skipped, 1);

    let cascades = inv
        .entries
        .iter()
        .filter(|e| matches!(e.kind, FileKind::Cascade { .. }))
        .count();
    assert_eq!(cascades, 2);
    Ok(())
}

#[test]
fn entries_decode_usable_payloads() -> Result<()> {
    let root = unique_root("payload");
    fs::create_dir_all(&root)?;

    let mut f = BloomFilter::new(80, 3)?;
    f.add(b"alice");
    fs::write(root.join("single.bin"), encode_filter(&f))?;

    let mut c = FilterCascade::new(10, 0.01, 2.0)?;
    for i in 0..20 {
        c.add(format!("user-{}", i).as_bytes())?;
    }
    fs::write(root.join("cascade_42.bin"), encode_cascade(c.generations()))?;

    let inv = load_all(&root, 0.01, 2.0)?;
    assert_eq!(inv.entries.len(), 2);
    for entry in &inv.entries {
        match (&entry.kind, &entry.payload) {
            (FileKind::Single, Payload::Single(f)) => {
                assert!(f.contains(b"alice"));
            }
            (FileKind::Cascade { timestamp_ms }, Payload::Cascade(c)) => {
                assert_eq!(*timestamp_ms, 42);
                assert!(c.contains(b"user-7"));
            }
            other => panic!("kind/payload mismatch: {:?}", other),
        }
    }
    Ok(())
}

/// A `cascade_` prefix with a malformed timestamp is just an arbitrary
/// single-filter name; it must decode as a single block.
#[test]
fn malformed_timestamp_falls_back_to_single() -> Result<()> {
    let root = unique_root("fallback");
    fs::create_dir_all(&root)?;

    let mut f = BloomFilter::new(80, 3)?;
    f.add(b"alice");
    fs::write(root.join("cascade_not-a-ts.bin"), encode_filter(&f))?;

    let inv = load_all(&root, 0.01, 2.0)?;
    assert_eq!(inv.entries.len(), 1);
    assert_eq!(inv.entries[0].kind, FileKind::Single);
    assert_eq!(inv.skipped, 0);
    Ok(())
}

// ---------- helpers ----------

fn unique_root(prefix: &str) -> std::path::PathBuf {
    let pid = std::process::id();
    let t = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("bloomstore-reg-{}-{}-{}", prefix, pid, t))
}
