use camino::Utf8PathBuf;
use miette::Diagnostic;
use nes_catalog::CatalogError;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("ROM directory not set")]
    #[diagnostic(
        code(config::rom_dir_not_set),
        help("Pass --rom-dir, set HEADERLESS_ROM_DIR, or run 'nes-indexer config set-rom-dir <path>'")
    )]
    RomDirNotSet,

    #[error("ROM directory not found: {path}")]
    #[diagnostic(
        code(config::rom_dir_missing),
        help("The directory must contain the headerless ROM files, one per catalog entry")
    )]
    RomDirNotFound { path: Utf8PathBuf },

    #[error("Failed to load catalog: {path}")]
    #[diagnostic(
        code(catalog::load_failed),
        help("The catalog must be a JSON or TOML file with a 'games' list. Unknown fields, malformed checksums and duplicate entries are rejected")
    )]
    CatalogLoad {
        path: Utf8PathBuf,
        #[source]
        source: CatalogError,
    },

    #[error("Invalid filter rules")]
    #[diagnostic(
        code(config::invalid_filter),
        help("Check the ignore_categories and ignore_names patterns in config.toml")
    )]
    InvalidFilter {
        #[source]
        source: CatalogError,
    },

    #[error("Index build failed")]
    #[diagnostic(
        code(index::build_failed),
        help("A ROM file shorter than its catalog entry stops the build. Check the file against the catalog's PRG and CHR sizes")
    )]
    IndexBuild {
        #[source]
        source: nes_index::Error,
    },

    #[error("Failed to load index: {path}")]
    #[diagnostic(
        code(index::load_failed),
        help("Build the index first with 'nes-indexer build'")
    )]
    IndexLoad {
        path: Utf8PathBuf,
        #[source]
        source: nes_index::Error,
    },

    #[error("File not found: {path}")]
    #[diagnostic(
        code(file::not_found),
        help("Make sure the file exists and the path is correct")
    )]
    FileNotFound { path: Utf8PathBuf },

    #[error("IO operation failed")]
    #[diagnostic(code(io::operation_failed))]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl CliError {
    pub fn rom_dir_not_found(path: Utf8PathBuf) -> Self {
        Self::RomDirNotFound { path }
    }

    pub fn catalog_load(path: Utf8PathBuf, source: CatalogError) -> Self {
        Self::CatalogLoad { path, source }
    }

    pub fn index_load(path: Utf8PathBuf, source: nes_index::Error) -> Self {
        Self::IndexLoad { path, source }
    }

    pub fn file_not_found(path: Utf8PathBuf) -> Self {
        Self::FileNotFound { path }
    }
}
