//! Exclusion rules applied to a catalog before indexing or export.

use crate::error::{CatalogError, Result};
use crate::{Catalog, Crc32, Game};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Serializable filter configuration.
///
/// Patterns are regular expressions. Category patterns are matched against
/// [`Game::category`] and name patterns against [`Game::name`].
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct FilterRules {
    pub ignore_categories: Vec<String>,
    pub ignore_names: Vec<String>,
    pub ignore_crc32: Vec<Crc32>,
    /// Drop games whose name is empty.
    pub ignore_nameless: bool,
}

impl FilterRules {
    /// Rules used when building the identification index.
    ///
    /// These dumps have a known twin in the catalog that would otherwise make
    /// both entries ambiguous.
    pub fn index_defaults() -> Self {
        Self {
            ignore_crc32: vec![
                Crc32(0x3413E33B), // Seicross (Japan) (Virtual Console)
                Crc32(0xCAA76927), // Yoshi's Cookie (Europe) (Virtual Console)
                Crc32(0x4B6EF399), // Karaoke Studio Senyou Cassette - Top Hit 20 Vol. 1 (Japan)
                Crc32(0x50F3E338), // Karaoke Studio Senyou Cassette - Top Hit 20 Vol. 2 (Japan)
            ],
            ..Self::default()
        }
    }

    /// Rules used when exporting the mapper lookup table.
    pub fn lookup_defaults() -> Self {
        Self {
            ignore_categories: [
                r"^Bootleg Singles\\",
                r"^Bootleg Hacks\\",
                r"^Homebrew\\",
                r"^Compatibility Hacks\\",
                r"^Modern\\",
                r"^Bad Dumps\\",
                r"^BIOS\\",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            ignore_names: vec![r"\(Virtual Console\)".to_string()],
            ignore_crc32: Vec::new(),
            ignore_nameless: true,
        }
    }

    /// Compile the patterns. Fails on the first invalid regular expression.
    pub fn compile(&self) -> Result<GameFilter> {
        Ok(GameFilter {
            categories: compile_patterns(&self.ignore_categories)?,
            names: compile_patterns(&self.ignore_names)?,
            crc32: self.ignore_crc32.iter().copied().collect(),
            ignore_nameless: self.ignore_nameless,
        })
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|source| CatalogError::InvalidPattern {
                pattern: p.clone(),
                source,
            })
        })
        .collect()
}

/// Compiled form of [`FilterRules`].
#[derive(Debug, Clone)]
pub struct GameFilter {
    categories: Vec<Regex>,
    names: Vec<Regex>,
    crc32: HashSet<Crc32>,
    ignore_nameless: bool,
}

/// Games that passed a filter, in catalog order.
#[derive(Debug)]
pub struct Selection<'a> {
    pub included: Vec<&'a Game>,
    pub ignored: usize,
}

impl GameFilter {
    pub fn is_ignored(&self, game: &Game) -> bool {
        if let Some(category) = game.category.as_deref() {
            let category = category.trim();
            if self.categories.iter().any(|r| r.is_match(category)) {
                return true;
            }
        }

        if game.name.is_empty() {
            if self.ignore_nameless {
                return true;
            }
        } else if self.names.iter().any(|r| r.is_match(&game.name)) {
            return true;
        }

        self.crc32.contains(&game.rom_crc32)
    }

    /// Split a catalog into included games and an ignored count.
    pub fn select<'a>(&self, catalog: &'a Catalog) -> Selection<'a> {
        let mut included = Vec::with_capacity(catalog.len());
        let mut ignored = 0;

        for game in catalog {
            if self.is_ignored(game) {
                tracing::debug!("{} {} - Ignoring.", game.rom_crc32, game.name);
                ignored += 1;
            } else {
                included.push(game);
            }
        }

        Selection { included, ignored }
    }
}
