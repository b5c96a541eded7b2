use std::path::Path;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde::Serialize;

use bloomstore::codec::{decode_cascade, decode_filter};
use bloomstore::registry::{classify_file_name, load_all, FileKind, Payload};
use bloomstore::{BloomFilter, Store, StoreConfig};

mod cli;

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::Cli::parse();
    match cli.cmd {
        cli::Cmd::Ls { dir, json } => cmd_ls(&dir, json),
        cli::Cmd::Stat { file, json } => cmd_stat(&file, json),
        cli::Cmd::Query { dir, key } => cmd_query(&dir, &key),
        cli::Cmd::Record { dir, key } => cmd_record(&dir, &key),
    }
}

#[derive(Serialize)]
struct BlockStat {
    capacity_bits: u32,
    hash_count: u32,
    inserted: u32,
    estimated_fpr: f64,
}

impl BlockStat {
    fn of(f: &BloomFilter) -> Self {
        Self {
            capacity_bits: f.capacity_bits(),
            hash_count: f.hash_count(),
            inserted: f.inserted(),
            estimated_fpr: f.estimate_fpr(),
        }
    }
}

#[derive(Serialize)]
struct FileStat {
    file: String,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp_ms: Option<u64>,
    blocks: Vec<BlockStat>,
}

fn cmd_ls(dir: &Path, json: bool) -> Result<()> {
    let cfg = StoreConfig::from_env();
    let inv = load_all(dir, cfg.target_rate, cfg.growth_factor)
        .with_context(|| format!("scan {}", dir.display()))?;

    let stats: Vec<FileStat> = inv.entries.iter().map(entry_stat).collect();
    if json {
        #[derive(Serialize)]
        struct LsReport {
            loaded: usize,
            skipped: usize,
            files: Vec<FileStat>,
        }
        let report = LsReport {
            loaded: stats.len(),
            skipped: inv.skipped,
            files: stats,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for s in &stats {
            let blocks = s.blocks.len();
            let inserted: u64 = s.blocks.iter().map(|b| b.inserted as u64).sum();
            println!(
                "{:<10} {:>3} block(s) {:>9} insert(s)  {}",
                s.kind, blocks, inserted, s.file
            );
        }
        println!("{} loaded, {} skipped", stats.len(), inv.skipped);
    }
    Ok(())
}

fn entry_stat(e: &bloomstore::DirectoryEntry) -> FileStat {
    let (kind, timestamp_ms, blocks) = match (&e.kind, &e.payload) {
        (FileKind::Cascade { timestamp_ms }, Payload::Cascade(c)) => (
            "cascade",
            Some(*timestamp_ms),
            c.generations().iter().map(BlockStat::of).collect(),
        ),
        (_, Payload::Cascade(c)) => (
            "cascade",
            None,
            c.generations().iter().map(BlockStat::of).collect(),
        ),
        (_, Payload::Single(f)) => ("single", None, vec![BlockStat::of(f)]),
    };
    FileStat {
        file: e.path.display().to_string(),
        kind,
        timestamp_ms,
        blocks,
    }
}

fn cmd_stat(file: &Path, json: bool) -> Result<()> {
    let name = file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("bad file name: {}", file.display()))?;
    let kind = classify_file_name(name)
        .ok_or_else(|| anyhow!("unrecognized extension: {}", file.display()))?;

    let bytes = std::fs::read(file).with_context(|| format!("read {}", file.display()))?;
    let stat = match kind {
        FileKind::Cascade { timestamp_ms } => {
            let gens = decode_cascade(&bytes)?;
            FileStat {
                file: file.display().to_string(),
                kind: "cascade",
                timestamp_ms: Some(timestamp_ms),
                blocks: gens.iter().map(BlockStat::of).collect(),
            }
        }
        FileKind::Single => {
            let f = decode_filter(&bytes)?;
            FileStat {
                file: file.display().to_string(),
                kind: "single",
                timestamp_ms: None,
                blocks: vec![BlockStat::of(&f)],
            }
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&stat)?);
    } else {
        println!("{} ({})", stat.file, stat.kind);
        if let Some(ts) = stat.timestamp_ms {
            println!("timestamp_ms: {}", ts);
        }
        for (i, b) in stat.blocks.iter().enumerate() {
            println!(
                "  block {}: m={} k={} n={} est_fpr={:.6}",
                i, b.capacity_bits, b.hash_count, b.inserted, b.estimated_fpr
            );
        }
    }
    Ok(())
}

fn cmd_query(dir: &Path, key: &str) -> Result<()> {
    let store = Store::open(dir, &StoreConfig::from_env())?;
    if store.probably_exists(key) {
        println!("maybe");
    } else {
        println!("absent");
    }
    Ok(())
}

fn cmd_record(dir: &Path, key: &str) -> Result<()> {
    let store = Store::open(dir, &StoreConfig::from_env())?;
    store.record(key)?;
    println!(
        "recorded ({} generation(s), {} insert(s), est_fpr={:.6})",
        store.generation_count(),
        store.recorded(),
        store.estimated_rate()
    );
    Ok(())
}
