//! Error types for index building and identification.
//!
//! All fallible functions in this crate return [`Result<T>`], which uses [`Error`]
//! as the error type. `std::io::Error` and `serde_json::Error` are converted via
//! `From` impls.
//!
//! Only [`Error::MissingSource`] and [`Error::Undersized`] are recoverable during
//! a build: the builder records the game and moves on. Everything else aborts.

use camino::Utf8PathBuf;
use nes_catalog::Crc32;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or querying an index.
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem I/O failed (opening or reading a ROM, writing the index).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse or serialize the persisted index.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The backing file for a catalog entry does not exist.
    #[error("ROM file missing for {crc32}: {path}")]
    MissingSource {
        crc32: Crc32,
        filename: String,
        path: Utf8PathBuf,
    },

    /// A backing file is shorter than the byte range being hashed.
    ///
    /// Games are inserted smallest first, so this means either the catalog sizes
    /// are wrong for this file or the insertion order was not respected.
    #[error("Read incorrect byte length from {path}: {actual} instead of {expected}")]
    ShortRead {
        path: Utf8PathBuf,
        expected: u64,
        actual: u64,
    },

    /// A game is smaller than the byte range of a branch it has to pass through.
    ///
    /// Recovered per game like [`Error::MissingSource`].
    #[error("ROM {crc32} is {size} bytes, branch hashes {required}")]
    Undersized { crc32: Crc32, size: u64, required: u64 },

    /// The file of a game already in the tree could not be found again while
    /// its leaf was being split.
    #[error("ROM file for indexed game {crc32} disappeared: {path}")]
    SourceVanished { crc32: Crc32, path: Utf8PathBuf },
}
