//! Strict catalog loading and validation.

use crate::error::{CatalogError, Result};
use crate::{Crc32, Game};
use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// On-disk catalog document.
#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CatalogFile {
    pub games: Vec<Game>,
}

/// A validated, ordered collection of games.
///
/// Built through [`Catalog::from_games`] (or one of the loaders that call it),
/// which rejects duplicate checksums and self-contradicting records. Records
/// without a PRG-ROM size are dropped with a warning and counted in
/// [`skipped`](Catalog::skipped).
#[derive(Debug, Default)]
pub struct Catalog {
    games: Vec<Game>,
    skipped: usize,
}

impl Catalog {
    /// Load a catalog from a `.json` or `.toml` file.
    ///
    /// The format is chosen by extension; anything other than `.toml` is read as JSON.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_std_path())?;
        let catalog = match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::from_toml_str(&contents)?,
            _ => Self::from_json_str(&contents)?,
        };

        tracing::info!(
            "Loaded catalog {}: {} games, {} skipped",
            path,
            catalog.len(),
            catalog.skipped
        );

        Ok(catalog)
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(contents)?;
        Self::from_games(file.games)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(contents)?;
        Self::from_games(file.games)
    }

    /// Validate `games` and build a catalog, preserving their order.
    pub fn from_games(games: Vec<Game>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(games.len());
        let mut kept = Vec::with_capacity(games.len());
        let mut skipped = 0;

        for game in games {
            if !seen.insert(game.rom_crc32) {
                return Err(CatalogError::DuplicateGame(game.rom_crc32));
            }

            if game.prg_rom_size == 0 {
                tracing::warn!("{} {} - Missing PRG ROM size.", game.rom_crc32, game.name);
                skipped += 1;
                continue;
            }

            validate_game(&game)?;
            kept.push(game);
        }

        Ok(Self {
            games: kept,
            skipped,
        })
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Game> {
        self.games.iter()
    }

    /// Find a game by its full-file checksum.
    pub fn get(&self, rom_crc32: Crc32) -> Option<&Game> {
        self.games.iter().find(|g| g.rom_crc32 == rom_crc32)
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Number of records dropped during loading because they had no PRG-ROM.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Game;
    type IntoIter = std::slice::Iter<'a, Game>;

    fn into_iter(self) -> Self::IntoIter {
        self.games.iter()
    }
}

/// Cross-field checks that serde cannot express.
fn validate_game(game: &Game) -> Result<()> {
    let invalid = |reason: String| CatalogError::InvalidRecord {
        crc32: game.rom_crc32,
        reason,
    };

    let header = &game.header;
    if header.prgrom.size != game.prg_rom_size {
        return Err(invalid(format!(
            "PRG ROM size {} does not match header size {}",
            game.prg_rom_size, header.prgrom.size
        )));
    }

    let header_chr = header.chrrom.as_ref().map_or(0, |c| c.size);
    if header_chr != game.chr_rom_size {
        return Err(invalid(format!(
            "CHR ROM size {} does not match header size {}",
            game.chr_rom_size, header_chr
        )));
    }

    if header.pcb.submapper > 15 {
        return Err(invalid(format!(
            "submapper {} is out of range",
            header.pcb.submapper
        )));
    }

    if header.pcb.mirroring.is_empty() {
        return Err(invalid("mirroring is empty".to_string()));
    }

    if game.filename.is_empty() {
        return Err(invalid("filename is empty".to_string()));
    }

    Ok(())
}
