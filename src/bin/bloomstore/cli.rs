use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "bloomstore",
    version,
    about = "Durable scaling Bloom filter store",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Scan a storage directory and list everything that loads
    Ls {
        dir: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Inspect one filter or cascade file block by block
    Stat {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Membership query: prints "maybe" or "absent"
    Query { dir: PathBuf, key: String },
    /// Record a key as present
    Record { dir: PathBuf, key: String },
}
