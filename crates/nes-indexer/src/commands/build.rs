use crate::{
    errors::CliError,
    println_pad,
    utils::{self, config, config::AppConfig},
};
use camino::Utf8PathBuf;
use colored::Colorize;
use miette::{IntoDiagnostic, Result, WrapErr};
use nes_catalog::FilterRules;
use nes_index::{build_index_with, AmbiguityReport, DirectoryRomSource, IndexBuilder};

#[derive(Debug)]
pub struct BuildIndexArgs {
    pub catalog_path: Utf8PathBuf,
    pub output_path: Utf8PathBuf,
    pub rom_dir: Option<Utf8PathBuf>,
    pub rom_extension: Option<String>,
    pub no_filters: bool,
}

/// Counts reported at the end of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    pub included: usize,
    pub ignored: usize,
    pub missing: usize,
    pub undersized: usize,
    pub ambiguous: usize,
    pub indexed: usize,
}

pub fn build_index(args: BuildIndexArgs) -> Result<()> {
    let cfg = config::load_config();
    run_build(&args, &cfg)?;
    Ok(())
}

fn run_build(args: &BuildIndexArgs, cfg: &AppConfig) -> Result<BuildSummary> {
    let rom_dir = cfg
        .resolve_rom_dir(args.rom_dir.clone())
        .ok_or(CliError::RomDirNotSet)?;
    if !rom_dir.is_dir() {
        return Err(CliError::rom_dir_not_found(rom_dir).into());
    }

    println!("{}", "Reading catalog...".bright_cyan());
    let catalog = super::load_catalog(&args.catalog_path)?;

    let rules = if args.no_filters {
        FilterRules::default()
    } else {
        cfg.index.clone()
    };
    let filter = rules
        .compile()
        .map_err(|source| CliError::InvalidFilter { source })?;
    let selection = filter.select(&catalog);

    println_pad!(
        "Including {}/{}",
        selection.included.len(),
        catalog.len() + catalog.skipped()
    );
    println_pad!("{} ignored", selection.ignored);
    println_pad!("{} other", catalog.skipped());

    let mut source = DirectoryRomSource::new(rom_dir);
    if let Some(extension) = args.rom_extension.clone().or_else(|| cfg.rom_extension.clone()) {
        source = source.with_extension(extension);
    }

    println!("{}", "Building index...".bright_cyan());
    let builder = IndexBuilder::new(&source).with_progress(|progress| {
        tracing::trace!(
            "{}/{} {}",
            progress.current,
            progress.total.unwrap_or_default(),
            progress.name
        );
    });
    let (tree, report) = build_index_with(selection.included.iter().copied(), builder)
        .map_err(|source| CliError::IndexBuild { source })?;
    println!("{}", "Done building.".bright_cyan());

    if !report.missing.is_empty() {
        println!(
            "{} {}",
            "Missing files:".bright_yellow().bold(),
            report.missing.len()
        );
        for missing in &report.missing {
            println_pad!("{} {}", missing.game.rom_crc32, missing.filename);
        }
    }

    if !report.undersized.is_empty() {
        println!(
            "{} {}",
            "Too small to differentiate:".bright_yellow().bold(),
            report.undersized.len()
        );
        for undersized in &report.undersized {
            println_pad!(
                "{} {} - {} bytes, needs {}",
                undersized.game.rom_crc32,
                undersized.game.name,
                undersized.game.rom_size(),
                undersized.required
            );
        }
    }

    let ambiguities = AmbiguityReport::collect(&tree);
    if !ambiguities.is_empty() {
        println!(
            "{} {}",
            "Failed to differentiate:".bright_yellow().bold(),
            ambiguities.game_count()
        );
        for line in render_ambiguities(&ambiguities) {
            println_pad!("{}", line);
        }
    }

    let serialized = tree.to_serialized();
    serialized
        .save(&args.output_path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to write index to {}", args.output_path))?;

    let summary = BuildSummary {
        included: selection.included.len(),
        ignored: selection.ignored,
        missing: report.missing.len(),
        undersized: report.undersized.len(),
        ambiguous: ambiguities.game_count(),
        indexed: report.placed - ambiguities.game_count(),
    };

    println!();
    utils::print_ansi_boxed_lines(&[
        format!(
            "{} {}/{}",
            "Indexed".bright_green().bold(),
            summary.indexed,
            summary.included
        ),
        format!("{} files missing", summary.missing),
        format!("{} too small", summary.undersized),
        format!("{} ambiguous", summary.ambiguous),
        format!("{} {}", "Output:".bright_white(), args.output_path),
    ]);

    Ok(summary)
}

/// One header line per ambiguous leaf, then one line per game in it.
fn render_ambiguities(report: &AmbiguityReport<'_>) -> Vec<String> {
    let mut lines = Vec::new();
    for group in report.groups() {
        lines.push(format!(
            "{} PRG:{} CHR:{}",
            group.key, group.range.prg_bytes, group.range.chr_bytes
        ));
        for (i, game) in group.games.iter().enumerate() {
            let marker = if i + 1 == group.games.len() { '└' } else { '├' };
            lines.push(format!(
                "  {}─ {} {} - PRG:{} CHR:{}",
                marker, game.rom_crc32, game.name, game.prg_rom_size, game.chr_rom_size
            ));
        }
    }
    lines
}
