//! Discriminating partial-checksum index for headerless NES ROMs.
//!
//! Identifying a ROM by hashing the whole file is slow and fails on overdumps.
//! This crate builds a tree that identifies a headerless image by hashing as
//! few bytes from its start as possible:
//!
//! - **Root probe**: Every lookup starts with the CRC32 of the first 512 bytes
//! - **Widening on collision**: Games sharing a prefix move to a branch that hashes more PRG-ROM, then CHR-ROM
//! - **Ambiguity reporting**: Games no byte range can separate are kept together and reported, never guessed
//! - **Portable format**: The finished tree serializes to the JSON consumed by identification tools
//!
//! # Example
//!
//! ```no_run
//! use camino::Utf8Path;
//! use nes_catalog::Catalog;
//! use nes_index::{build_index, AmbiguityReport, DirectoryRomSource};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Catalog::load(Utf8Path::new("nes20db.json"))?;
//! let source = DirectoryRomSource::new("roms");
//!
//! let (tree, report) = build_index(catalog.iter(), &source)?;
//! println!("Indexed {}/{}", report.placed, report.total);
//!
//! for group in AmbiguityReport::collect(&tree).groups() {
//!     println!("{} games share {}", group.games.len(), group.key);
//! }
//!
//! tree.to_serialized().save(Utf8Path::new("dist/nesIndex.json"))?;
//! # Ok(())
//! # }
//! ```

pub mod ambiguity;
pub mod builder;
pub mod error;
pub mod serialize;
pub mod source;
pub mod tree;

// Re-export main types
pub use ambiguity::{Ambiguity, AmbiguityReport};
pub use builder::{
    build_index, build_index_with, BuildProgress, BuildReport, IndexBuilder, MissingGame,
    UndersizedGame,
};
pub use error::{Error, Result};
pub use serialize::{Identification, SerializedBranch, SerializedLeaf};
pub use source::{DirectoryRomSource, MemoryRomSource, RomSource};
pub use tree::{ByteRange, IndexBranch, IndexLeaf, IndexNode, IndexTree, HEADER_PROBE_LENGTH};
