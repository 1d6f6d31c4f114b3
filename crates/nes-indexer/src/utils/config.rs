//! Application configuration management utilities.

use camino::{Utf8Path, Utf8PathBuf};
use nes_catalog::FilterRules;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;

/// Environment variable that overrides the configured ROM directory.
pub const ROM_DIR_ENV: &str = "HEADERLESS_ROM_DIR";

/// Application-wide configuration stored in config.toml.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the headerless ROM files.
    pub rom_dir: Option<Utf8PathBuf>,
    /// Extension of the headerless ROM files, without the dot.
    pub rom_extension: Option<String>,
    /// Games left out of the identification index.
    pub index: FilterRules,
    /// Games left out of the mapper lookup table.
    pub lookup: FilterRules,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rom_dir: None,
            rom_extension: None,
            index: FilterRules::index_defaults(),
            lookup: FilterRules::lookup_defaults(),
        }
    }
}

impl AppConfig {
    /// ROM directory to use: the CLI flag, then `HEADERLESS_ROM_DIR`, then config.toml.
    pub fn resolve_rom_dir(&self, cli: Option<Utf8PathBuf>) -> Option<Utf8PathBuf> {
        self.resolve_rom_dir_with(cli, env::var(ROM_DIR_ENV).ok())
    }

    fn resolve_rom_dir_with(
        &self,
        cli: Option<Utf8PathBuf>,
        env_value: Option<String>,
    ) -> Option<Utf8PathBuf> {
        cli.or_else(|| {
            env_value
                .filter(|v| !v.trim().is_empty())
                .map(Utf8PathBuf::from)
        })
        .or_else(|| self.rom_dir.clone())
    }
}

/// Returns the directory where the current executable resides.
pub fn install_dir() -> Option<Utf8PathBuf> {
    let exe = env::current_exe().ok()?;
    let parent = exe.parent()?;
    Utf8PathBuf::from_path_buf(parent.to_path_buf()).ok()
}

/// Returns the default configuration file path (config.toml next to the executable).
pub fn default_config_path() -> Option<Utf8PathBuf> {
    install_dir().map(|dir| dir.join("config.toml"))
}

/// Loads the application configuration from config.toml.
/// Returns default configuration if the file doesn't exist, and logs a warning
/// before doing the same if it cannot be read or parsed.
pub fn load_config() -> AppConfig {
    default_config_path()
        .map(|path| load_config_or_default(&path))
        .unwrap_or_default()
}

/// Like [`load_config_from`], but falls back to the defaults with a warning.
pub fn load_config_or_default(path: &Utf8Path) -> AppConfig {
    load_config_from(path).unwrap_or_else(|e| {
        tracing::warn!("Ignoring {}: {}. Using default configuration.", path, e);
        AppConfig::default()
    })
}

/// Loads configuration from `path`. A missing file yields the defaults.
pub fn load_config_from(path: &Utf8Path) -> io::Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(path)?;
    let cfg = toml::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    tracing::debug!("Loaded config from {}", path);
    Ok(cfg)
}

/// Saves the application configuration to config.toml.
pub fn save_config(cfg: &AppConfig) -> io::Result<()> {
    match default_config_path() {
        Some(path) => save_config_to(cfg, &path),
        None => Err(io::Error::new(
            io::ErrorKind::NotFound,
            "Could not determine config path",
        )),
    }
}

pub fn save_config_to(cfg: &AppConfig, path: &Utf8Path) -> io::Result<()> {
    let content = toml::to_string_pretty(cfg).map_err(io::Error::other)?;
    fs::write(path, content)
}
