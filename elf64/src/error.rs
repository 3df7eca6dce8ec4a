//! Error type for the elf64 library.
//!
//! Every parse-time error here is fatal to the operation that hit it:
//! recovering from a truncated header region by assuming zero-fill would
//! silently corrupt the round-trip guarantee the writer depends on.

use std::path::PathBuf;

/// Convenience alias used throughout the crate.
pub type Elf64Result<T> = Result<T, Elf64Error>;

/// All errors produced by the elf64 library.
#[derive(thiserror::Error, Debug)]
pub enum Elf64Error {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not a 64-bit ELF file")]
    NotElf64 { path: PathBuf },

    #[error("truncated ELF file {path}: failed to read {region}")]
    Truncated { path: PathBuf, region: String },

    #[error("inconsistent section layout: {detail}")]
    InvalidLayout { detail: String },

    #[error("failed to create {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {len} bytes: {source}")]
    Write {
        len: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
