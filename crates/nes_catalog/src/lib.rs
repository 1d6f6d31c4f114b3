//! Game catalog for headerless NES ROM identification.
//!
//! A catalog is the merged list of known cartridge dumps: each [`Game`] has a
//! full-file CRC32, the sizes of its PRG-ROM and CHR-ROM regions, and a
//! [`HeaderData`] bundle with the NES 2.0 header fields needed to run it.
//!
//! This crate provides:
//!
//! - **Strict loading** ([`Catalog::load`]) from JSON or TOML files
//! - **Filter rules** ([`FilterRules`]) for excluding categories, names and checksums
//! - **Lookup tables** ([`build_lookup_table`]) mapping checksums to cartridge families

use serde::{Deserialize, Serialize};

mod catalog;
mod crc;
pub mod error;
mod filter;
mod lookup;

pub use catalog::{Catalog, CatalogFile};
pub use crc::Crc32;
pub use error::{CatalogError, Result};
pub use filter::{FilterRules, GameFilter, Selection};
pub use lookup::{build_lookup_table, mapper_type, LookupEntry};

/// A cataloged cartridge dump.
///
/// Games are immutable once loaded. The `header` bundle is never interpreted by
/// the indexer; it is carried through to the persisted index unmodified.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Game {
    /// CRC32 of the whole headerless file. Unique within a catalog.
    #[serde(rename = "romCRC32")]
    pub rom_crc32: Crc32,

    /// Display name.
    ///
    /// Example: `Super Mario Bros. (World)`
    pub name: String,

    /// Filename of the dump as listed by the source database.
    ///
    /// Example: `Super Mario Bros. (World).nes`
    pub filename: String,

    /// Database category path the record was filed under.
    ///
    /// Example: `Licensed\Nintendo\Super Mario Bros.`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Size of the PRG-ROM region in bytes.
    #[serde(rename = "prgROMSizeBytes")]
    pub prg_rom_size: u64,

    /// Size of the CHR-ROM region in bytes, 0 for CHR-RAM boards.
    #[serde(rename = "chrROMSizeBytes", default)]
    pub chr_rom_size: u64,

    /// NES 2.0 header data for this dump.
    #[serde(rename = "nes2HeaderData")]
    pub header: HeaderData,
}

impl Game {
    /// Total size of the headerless file (PRG-ROM followed by CHR-ROM).
    pub fn rom_size(&self) -> u64 {
        self.prg_rom_size + self.chr_rom_size
    }
}

/// NES 2.0 header fields for a dump.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct HeaderData {
    pub rom: RomChunk,
    pub pcb: Pcb,
    pub prgrom: RomChunk,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chrrom: Option<RomChunk>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub miscrom: Option<MiscRom>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trainer: Option<RomChunk>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prgram: Option<RamChunk>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prgnvram: Option<RamChunk>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chrram: Option<RamChunk>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chrnvram: Option<RamChunk>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub console: Option<Console>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expansion: Option<Expansion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vs: Option<VsSystem>,
}

/// A ROM region with its size and checksum.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct RomChunk {
    pub size: u64,
    pub crc32: Crc32,
}

/// Miscellaneous ROM area following CHR-ROM.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct MiscRom {
    pub size: u64,
    pub crc32: Crc32,
    pub number: u8,
}

/// A RAM area, described by size only.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct RamChunk {
    pub size: u64,
}

/// Board description.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Pcb {
    /// iNES mapper number.
    pub mapper: u16,
    /// NES 2.0 submapper, 0-15.
    pub submapper: u8,
    /// Nametable mirroring code as written by the database (`H`, `V`, `4`, ...).
    pub mirroring: String,
    /// Whether the board has battery-backed memory.
    pub battery: bool,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Console {
    #[serde(rename = "type")]
    pub kind: u8,
    pub region: u8,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Expansion {
    #[serde(rename = "type")]
    pub kind: u8,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct VsSystem {
    pub hardware: u8,
    pub ppu: u8,
}
