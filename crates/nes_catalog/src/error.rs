//! Error types for catalog loading and filtering.

use crate::Crc32;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors that can occur while loading or filtering a game catalog.
///
/// Catalog loading is strict: a malformed record aborts the whole load rather
/// than being coerced into something that looks valid.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Reading the catalog file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The catalog is not valid JSON, or a field has the wrong type.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The catalog is not valid TOML, or a field has the wrong type.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A checksum string is not exactly 8 hexadecimal digits.
    #[error("Invalid CRC32 '{0}': expected 8 hexadecimal digits")]
    InvalidChecksum(String),

    /// Two records share the same full-file checksum.
    #[error("Duplicate catalog entry for ROM CRC32 {0}")]
    DuplicateGame(Crc32),

    /// A record parsed but its fields contradict each other.
    #[error("Invalid catalog entry {crc32}: {reason}")]
    InvalidRecord { crc32: Crc32, reason: String },

    /// A filter rule is not a valid regular expression.
    #[error("Invalid filter pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
