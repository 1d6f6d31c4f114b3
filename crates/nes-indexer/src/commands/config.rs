use crate::errors::CliError;
use crate::utils::config::{self, AppConfig, ROM_DIR_ENV};
use camino::Utf8PathBuf;
use colored::Colorize;
use miette::Result;
use std::env;

fn update_rom_dir_in_config(path: Utf8PathBuf) -> Result<()> {
    let mut cfg = config::load_config();
    cfg.rom_dir = Some(path);
    config::save_config(&cfg).map_err(|e| miette::miette!("Failed to save config: {}", e))
}

/// Print a config path entry with status indicator
fn print_path_config(name: &str, path: Option<&Utf8PathBuf>) {
    match path {
        Some(p) => {
            let status = if p.is_dir() {
                "✓".bright_green()
            } else {
                "✗".bright_red()
            };
            println!("  {} {} {}", format!("{}:", name).bright_white(), p, status);
        }
        None => {
            println!(
                "  {} {}",
                format!("{}:", name).bright_white(),
                "(not set)".bright_yellow()
            );
        }
    }
}

fn print_patterns(name: &str, patterns: &[String]) {
    if patterns.is_empty() {
        println!("    {} {}", format!("{}:", name).bright_white(), "(none)".dimmed());
        return;
    }

    println!("    {}", format!("{}:", name).bright_white());
    for pattern in patterns {
        println!("      {} {}", "•".bright_cyan(), pattern);
    }
}

fn print_filters(section: &str, rules: &nes_catalog::FilterRules) {
    println!("  {}", format!("[{}]", section).bright_magenta().bold());
    print_patterns("ignore_categories", &rules.ignore_categories);
    print_patterns("ignore_names", &rules.ignore_names);
    let crcs: Vec<String> = rules.ignore_crc32.iter().map(|c| c.to_string()).collect();
    print_patterns("ignore_crc32", &crcs);
    println!(
        "    {} {}",
        "ignore_nameless:".bright_white(),
        rules.ignore_nameless
    );
}

pub fn show_config() -> Result<()> {
    let cfg = config::load_config();
    let config_path = config::default_config_path()
        .map(|p| p.to_string())
        .unwrap_or_else(|| "Unknown".to_string());

    println!();
    println!("  {} {}", "config_file:".bright_white(), config_path);

    print_path_config("rom_dir", cfg.rom_dir.as_ref());
    if let Ok(value) = env::var(ROM_DIR_ENV) {
        println!(
            "  {} {} {}",
            format!("{}:", ROM_DIR_ENV).bright_white(),
            value,
            "(overrides rom_dir)".dimmed()
        );
    }
    println!(
        "  {} {}",
        "rom_extension:".bright_white(),
        cfg.rom_extension
            .as_deref()
            .unwrap_or(nes_index::DirectoryRomSource::DEFAULT_EXTENSION)
    );

    println!();
    print_filters("index", &cfg.index);
    print_filters("lookup", &cfg.lookup);

    println!();
    Ok(())
}

pub fn set_rom_dir(path: String) -> Result<()> {
    let path = Utf8PathBuf::from(&path);
    if !path.is_dir() {
        return Err(CliError::rom_dir_not_found(path).into());
    }

    update_rom_dir_in_config(path.clone())?;

    println!("{}", "✓ ROM directory set successfully!".bright_green().bold());
    println!();
    println!(
        "  {} {}",
        "Path:".bright_white().bold(),
        path.as_str().bright_green()
    );

    Ok(())
}

pub fn reset_config() -> Result<()> {
    let config_path = config::default_config_path()
        .map(|p| p.to_string())
        .unwrap_or_else(|| "Unknown".to_string());

    let default_cfg = AppConfig::default();
    config::save_config(&default_cfg)
        .map_err(|e| miette::miette!("Failed to reset config: {}", e))?;

    println!(
        "{}",
        "✓ Configuration reset to defaults".bright_green().bold()
    );
    println!();
    println!("  {} {}", "Config file:".bright_white().bold(), config_path);
    println!();
    println!(
        "  {}",
        "Run 'nes-indexer config set-rom-dir <path>' to point at your headerless ROMs".bright_cyan()
    );

    Ok(())
}
