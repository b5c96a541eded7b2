use std::fs;

use anyhow::Result;

use bloomstore::consts::{CASCADE_PREFIX, FILTER_EXT};
use bloomstore::{FlushMode, Store, StoreConfig};

#[test]
fn survives_reopen() -> Result<()> {
    let root = unique_root("reopen");
    let cfg = StoreConfig::default().with_expected_items(100);

    let keys: Vec<String> = (0..250).map(|i| format!("user-{}", i)).collect();
    {
        let store = Store::open(&root, &cfg)?;
        for k in &keys {
            store.record(k)?;
        }
        for k in &keys {
            assert!(store.probably_exists(k));
        }
    }

    let store = Store::open(&root, &cfg)?;
    for k in &keys {
        assert!(store.probably_exists(k), "false negative after reload: {}", k);
    }
    assert_eq!(store.recorded(), 250);
    Ok(())
}

/// A store's identity is the registry-assigned file: reopening adopts the
/// existing cascade instead of minting a new timestamped file.
#[test]
fn reopen_adopts_existing_file() -> Result<()> {
    let root = unique_root("identity");
    let cfg = StoreConfig::default();

    let first_path = {
        let store = Store::open(&root, &cfg)?;
        store.record("alice")?;
        store.path().to_path_buf()
    };
    let name = first_path.file_name().unwrap().to_str().unwrap().to_string();
    assert!(name.starts_with(CASCADE_PREFIX) && name.ends_with(FILTER_EXT));

    let store = Store::open(&root, &cfg)?;
    assert_eq!(store.path(), first_path);
    store.record("bob")?;

    // still exactly one cascade file (no lock/tmp residue counted)
    let cascade_files = fs::read_dir(&root)?
        .filter_map(|e| e.ok())
        .filter(|e| {
            let n = e.file_name().to_string_lossy().into_owned();
            n.starts_with(CASCADE_PREFIX) && n.ends_with(&format!(".{}", FILTER_EXT))
        })
        .count();
    assert_eq!(cascade_files, 1);
    Ok(())
}

/// Manual flush mode: records are not durable until flush() is called.
#[test]
fn manual_flush_batches_writes() -> Result<()> {
    let root = unique_root("manual");
    let cfg = StoreConfig::default().with_flush(FlushMode::Manual);

    let store = Store::open(&root, &cfg)?;
    store.record("alice")?;
    assert!(store.probably_exists("alice"));

    // the durable copy is still the initial empty cascade
    let reread = Store::open(&root, &cfg)?;
    assert!(!reread.probably_exists("alice"));

    store.flush()?;
    let reread = Store::open(&root, &cfg)?;
    assert!(reread.probably_exists("alice"));
    Ok(())
}

#[test]
fn growth_survives_reload() -> Result<()> {
    let root = unique_root("grow");
    let cfg = StoreConfig::default().with_expected_items(10);

    let keys: Vec<String> = (0..100).map(|i| format!("user-{}", i)).collect();
    let gen_count = {
        let store = Store::open(&root, &cfg)?;
        for k in &keys {
            store.record(k)?;
        }
        let n = store.generation_count();
        assert!(n >= 2, "store sized for 10 items should have grown");
        n
    };

    let store = Store::open(&root, &cfg)?;
    assert_eq!(store.generation_count(), gen_count);
    for k in &keys {
        assert!(store.probably_exists(k));
    }
    Ok(())
}

#[test]
fn rejects_invalid_config() {
    let root = unique_root("badcfg");
    let cfg = StoreConfig::default().with_growth_factor(0.5);
    assert!(Store::open(&root, &cfg).is_err());
}

// ---------- helpers ----------

fn unique_root(prefix: &str) -> std::path::PathBuf {
    let pid = std::process::id();
    let t = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("bloomstore-{}-{}-{}", prefix, pid, t))
}
