use crate::{errors::CliError, println_pad, utils::format_size};
use camino::{Utf8Path, Utf8PathBuf};
use colored::Colorize;
use miette::{IntoDiagnostic, Result, WrapErr};
use nes_catalog::mapper_type;
use nes_index::{Identification, SerializedBranch, SerializedLeaf};

#[derive(Debug)]
pub struct IdentifyRomsArgs {
    pub index_path: Utf8PathBuf,
    pub files: Vec<Utf8PathBuf>,
}

pub fn identify_roms(args: IdentifyRomsArgs) -> Result<()> {
    if !args.index_path.exists() {
        return Err(CliError::file_not_found(args.index_path).into());
    }
    let index = SerializedBranch::load(&args.index_path)
        .map_err(|source| CliError::index_load(args.index_path.clone(), source))?;
    tracing::debug!(
        "Loaded index with {} games, depth {}",
        index.leaf_count(),
        index.depth()
    );

    for (path, identification) in identify_all(&index, &args.files)? {
        match identification {
            Identification::Match { leaf, bytes_read } => print_match(path, leaf, bytes_read),
            Identification::Unknown => {
                println!("{} {}", "✗".bright_red(), path.as_str().bright_white().bold());
                println_pad!("{}", "Not in index".bright_yellow());
            }
        }
    }

    Ok(())
}

fn identify_all<'i, 'p>(
    index: &'i SerializedBranch,
    files: &'p [Utf8PathBuf],
) -> Result<Vec<(&'p Utf8Path, Identification<'i>)>> {
    files
        .iter()
        .map(|path| {
            if !path.is_file() {
                return Err(CliError::file_not_found(path.clone()).into());
            }
            let identification = index
                .identify_file(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to read {}", path))?;
            Ok((path.as_path(), identification))
        })
        .collect()
}

fn print_match(path: &Utf8Path, leaf: &SerializedLeaf, bytes_read: u64) {
    let pcb = &leaf.header.pcb;

    println!("{} {}", "✓".bright_green(), path.as_str().bright_white().bold());
    println_pad!("{} {}", "Name:".bright_white(), leaf.name.bright_cyan().bold());
    println_pad!("{} {}", "CRC32:".bright_white(), leaf.rom_crc32);
    println_pad!(
        "{} {}{}",
        "Mapper:".bright_white(),
        pcb.mapper,
        mapper_type(pcb.mapper)
            .map(|family| format!(" ({family})"))
            .unwrap_or_default()
    );
    println_pad!(
        "{} PRG {}, CHR {}",
        "ROM:".bright_white(),
        format_size(leaf.header.prgrom.size),
        format_size(leaf.header.chrrom.as_ref().map_or(0, |c| c.size))
    );
    println_pad!("{} {}", "Mirroring:".bright_white(), pcb.mirroring);
    println_pad!(
        "{} {}",
        "Battery:".bright_white(),
        if pcb.battery { "yes" } else { "no" }
    );
    println_pad!(
        "{}",
        format!("Identified after reading {} bytes", bytes_read).dimmed()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{filler, game_for};
    use nes_catalog::Catalog;
    use nes_index::{build_index, MemoryRomSource};
    use tempfile::TempDir;

    #[test]
    fn test_identify_all() {
        let known = filler(1, 2048);
        let games = vec![
            game_for("known", &known, 1024, 0),
            game_for("other", &filler(2, 1024), 1024, 0),
        ];
        let catalog = Catalog::from_games(games).unwrap();
        let source = MemoryRomSource::new()
            .with_image(catalog.games()[0].rom_crc32, known.clone())
            .with_image(catalog.games()[1].rom_crc32, filler(2, 1024));
        let (tree, _) = build_index(&catalog, &source).unwrap();
        let index = tree.to_serialized();

        let dir = TempDir::new().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        let known_path = root.join("known.unh");
        let stranger_path = root.join("stranger.unh");
        std::fs::write(&known_path, &known).unwrap();
        std::fs::write(&stranger_path, filler(3, 4096)).unwrap();

        let files = vec![known_path, stranger_path];
        let results = identify_all(&index, &files).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].1.leaf().map(|l| l.name.as_str()), Some("known"));
        assert_eq!(results[1].1, Identification::Unknown);

        let missing = vec![root.join("missing.unh")];
        assert!(identify_all(&index, &missing).is_err());
    }
}
