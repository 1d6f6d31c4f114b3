use camino::Utf8PathBuf;
use clap::builder::{styling::AnsiColor, Styles};
use clap::ColorChoice;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use commands::{
    build_index, export_lookup_table, identify_roms, reset_config, set_rom_dir, show_config,
    BuildIndexArgs, ExportLookupTableArgs, IdentifyRomsArgs,
};
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod errors;
mod utils;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the identification index from a catalog and a directory of headerless ROMs
    Build {
        /// The path to the catalog file (.json or .toml)
        #[arg(short, long)]
        catalog: Utf8PathBuf,

        /// Where to write the index
        #[arg(short, long, default_value = "dist/nesIndex.json")]
        output: Utf8PathBuf,

        /// Directory holding the headerless ROM files
        #[arg(short, long)]
        rom_dir: Option<Utf8PathBuf>,

        /// Extension of the headerless ROM files
        #[arg(short = 'e', long)]
        rom_extension: Option<String>,

        /// Index every game in the catalog, ignoring the configured filters
        #[arg(long)]
        no_filters: bool,
    },
    /// Identify headerless ROM files using a built index
    Identify {
        /// The path to the index file
        #[arg(short, long, default_value = "dist/nesIndex.json")]
        index: Utf8PathBuf,

        /// Headerless ROM files to identify
        #[arg(required = true)]
        files: Vec<Utf8PathBuf>,
    },
    /// Export the mapper lookup table for a catalog
    Lookup {
        /// The path to the catalog file (.json or .toml)
        #[arg(short, long)]
        catalog: Utf8PathBuf,

        /// Where to write the lookup table
        #[arg(short, long, default_value = "dist/lookupTable.json")]
        output: Utf8PathBuf,

        /// Export every game in the catalog, ignoring the configured filters
        #[arg(long)]
        no_filters: bool,
    },
    /// Show or change the configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the current configuration
    Show,
    /// Set the directory holding the headerless ROM files
    SetRomDir {
        /// Path to the directory
        path: String,
    },
    /// Reset the configuration to defaults
    Reset,
}

fn parse_args() -> Result<Args> {
    // Configure colored/styled help output
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default())
        .placeholder(AnsiColor::Blue.on_default());

    let matches = Args::command()
        .styles(styles)
        .color(ColorChoice::Auto)
        .get_matches();

    Args::from_arg_matches(&matches).map_err(|e| miette::miette!("Failed to parse arguments: {}", e))
}

fn init_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "nes_indexer=info,nes_index=info,nes_catalog=info".into());

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();
}

fn main() -> Result<()> {
    init_logging();

    let args = parse_args()?;

    match args.command {
        Commands::Build {
            catalog,
            output,
            rom_dir,
            rom_extension,
            no_filters,
        } => build_index(BuildIndexArgs {
            catalog_path: catalog,
            output_path: output,
            rom_dir,
            rom_extension,
            no_filters,
        }),
        Commands::Identify { index, files } => identify_roms(IdentifyRomsArgs {
            index_path: index,
            files,
        }),
        Commands::Lookup {
            catalog,
            output,
            no_filters,
        } => export_lookup_table(ExportLookupTableArgs {
            catalog_path: catalog,
            output_path: output,
            no_filters,
        }),
        Commands::Config { action } => match action {
            ConfigCommands::Show => show_config(),
            ConfigCommands::SetRomDir { path } => set_rom_dir(path),
            ConfigCommands::Reset => reset_config(),
        },
    }
}
