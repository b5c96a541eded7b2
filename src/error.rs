//! Crate error type.
//!
//! Three failure classes, kept distinguishable so callers can react
//! differently:
//! - `Config`: invalid construction parameters; raised before any state
//!   is built.
//! - `Corrupt`: a persisted block whose header implies an impossible or
//!   truncated byte layout. The directory registry converts this into a
//!   skip-and-log; direct codec callers get the hard failure.
//! - `Io`: underlying read/write/rename failure. In-memory state stays
//!   valid; retry policy belongs to the caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("corrupt filter file: {0}")]
    Corrupt(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
