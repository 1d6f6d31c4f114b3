use crate::errors::CliError;
use camino::Utf8Path;
use miette::Result;
use nes_catalog::Catalog;

mod build;
mod config;
mod identify;
mod lookup;

pub use build::{build_index, BuildIndexArgs};
pub use config::{reset_config, set_rom_dir, show_config};
pub use identify::{identify_roms, IdentifyRomsArgs};
pub use lookup::{export_lookup_table, ExportLookupTableArgs};

/// Loads a catalog, mapping failures to diagnostics.
fn load_catalog(path: &Utf8Path) -> Result<Catalog> {
    if !path.exists() {
        return Err(CliError::file_not_found(path.to_path_buf()).into());
    }

    Catalog::load(path).map_err(|source| CliError::catalog_load(path.to_path_buf(), source).into())
}
