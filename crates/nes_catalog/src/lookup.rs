//! Checksum → cartridge family lookup table.
//!
//! Flash cartridges need to know which board family a dump targets. The
//! lookup table flattens every catalog entry into a small record keyed by its
//! full-file checksum, with the iNES mapper folded into a family name.

use crate::{Crc32, Game};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// iNES mapper numbers grouped by the cartridge family that implements them.
const MAPPER_FAMILIES: &[(&str, &[u16])] = &[
    ("NROM", &[0]),
    ("CNROM", &[3, 185]),
    ("UxROM", &[2, 94, 180]),
    ("AxROM", &[7]),
    ("MMC1", &[1, 105, 155]),
    ("MMC2", &[9]),
    ("MMC3", &[4, 118, 119]),
    ("MMC4", &[10]),
    ("MMC5", &[5]),
    ("ColorDreams/Wisdom Tree", &[11]),
    ("Camerica", &[71]),
    ("BNROM", &[34]),
    ("GNROM/MHROM", &[66]),
    ("Mapper 206", &[206, 76, 88, 154, 95]),
];

/// Cartridge family for an iNES mapper number, if it is a supported one.
pub fn mapper_type(mapper: u16) -> Option<&'static str> {
    MAPPER_FAMILIES
        .iter()
        .find(|(_, mappers)| mappers.contains(&mapper))
        .map(|(family, _)| *family)
}

/// One row of the exported lookup table.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LookupEntry {
    #[serde(rename = "romCRC32")]
    pub rom_crc32: Crc32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "mapperType", skip_serializing_if = "Option::is_none")]
    pub mapper_type: Option<String>,
    #[serde(rename = "prgROMSizeKB", skip_serializing_if = "Option::is_none")]
    pub prg_rom_size_kb: Option<f64>,
    #[serde(rename = "chrROMSizeKB", skip_serializing_if = "Option::is_none")]
    pub chr_rom_size_kb: Option<f64>,
    pub mirroring: String,
    #[serde(rename = "usesBattery")]
    pub uses_battery: bool,
}

impl LookupEntry {
    pub fn from_game(game: &Game) -> Self {
        let kb = |bytes: u64| bytes as f64 / 1024.0;

        Self {
            rom_crc32: game.rom_crc32,
            name: (!game.name.is_empty()).then(|| game.name.clone()),
            mapper_type: mapper_type(game.header.pcb.mapper).map(String::from),
            prg_rom_size_kb: Some(kb(game.prg_rom_size)),
            chr_rom_size_kb: game.header.chrrom.as_ref().map(|c| kb(c.size)),
            mirroring: game.header.pcb.mirroring.clone(),
            uses_battery: game.header.pcb.battery,
        }
    }
}

/// Build the lookup table for `games`.
///
/// Named entries come first, ordered case-insensitively by name; nameless
/// entries keep their relative input order at the end.
pub fn build_lookup_table<'a>(games: impl IntoIterator<Item = &'a Game>) -> Vec<LookupEntry> {
    let mut entries: Vec<_> = games.into_iter().map(LookupEntry::from_game).collect();
    entries.sort_by(|a, b| compare_names(a.name.as_deref(), b.name.as_deref()));
    entries
}

fn compare_names(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a
            .to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
