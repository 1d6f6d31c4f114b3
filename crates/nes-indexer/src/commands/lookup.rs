use crate::{
    errors::CliError,
    println_pad,
    utils::{config, config::AppConfig},
};
use camino::Utf8PathBuf;
use colored::Colorize;
use miette::{IntoDiagnostic, Result, WrapErr};
use nes_catalog::{build_lookup_table, FilterRules};

#[derive(Debug)]
pub struct ExportLookupTableArgs {
    pub catalog_path: Utf8PathBuf,
    pub output_path: Utf8PathBuf,
    pub no_filters: bool,
}

pub fn export_lookup_table(args: ExportLookupTableArgs) -> Result<()> {
    let cfg = config::load_config();
    run_export(&args, &cfg)?;
    Ok(())
}

/// Writes the lookup table and returns the number of entries written.
fn run_export(args: &ExportLookupTableArgs, cfg: &AppConfig) -> Result<usize> {
    let catalog = super::load_catalog(&args.catalog_path)?;

    let rules = if args.no_filters {
        FilterRules::default()
    } else {
        cfg.lookup.clone()
    };
    let filter = rules
        .compile()
        .map_err(|source| CliError::InvalidFilter { source })?;
    let selection = filter.select(&catalog);

    let table = build_lookup_table(selection.included.iter().copied());
    let json = serde_json::to_string(&table).into_diagnostic()?;

    if let Some(parent) = args.output_path.parent() {
        std::fs::create_dir_all(parent).map_err(CliError::from)?;
    }
    std::fs::write(&args.output_path, json)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to write lookup table to {}", args.output_path))?;

    println!(
        "{} {}",
        "✓ Lookup table written:".bright_green().bold(),
        args.output_path.as_str().bright_cyan()
    );
    println_pad!("{} entries, {} ignored", table.len(), selection.ignored);

    Ok(table.len())
}
