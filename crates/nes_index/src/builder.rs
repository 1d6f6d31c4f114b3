//! Discriminating index construction.
//!
//! The [`IndexBuilder`] grows an [`IndexTree`] one game at a time, hashing the
//! smallest byte range that still tells games apart.
//!
//! # Insertion Algorithm
//!
//! Inserting a game into a branch at range `(prg, chr)`:
//!
//! 1. Hash the first `prg + chr` bytes of the game's image.
//! 2. If the key leads to a child branch, insert into that branch.
//! 3. If the key leads to a leaf (a collision with its occupant `other`):
//!    - The widest range both images can supply is
//!      `new_prg = min(game.prg, other.prg)`. If that extends past `prg`, hash
//!      more PRG-ROM (`new_chr = 0`); otherwise PRG-ROM is used up for both and
//!      `new_chr = min(game.chr, other.chr)`.
//!    - If `(new_prg, new_chr)` equals the current range there is nothing left to
//!      compare: the images are identical or one is a prefix of the other. The
//!      game joins the leaf, which is now ambiguous and stays a leaf forever.
//!    - Otherwise the leaf becomes a branch at the new range and both games are
//!      inserted into it.
//! 4. If the key is unused, the game gets a new leaf.
//!
//! # Ordering
//!
//! Games must be inserted in ascending `(prg_rom_size, chr_rom_size)` order.
//! [`build_index`] sorts for you; callers of [`IndexBuilder::insert`] must do it
//! themselves. Sorting keeps the PRG part of every range within the images
//! still to come, but not the total: once a split widens into CHR-ROM, a branch
//! such as `(512, 1024)` hashes 1536 bytes, and a later `(1024, 0)` game that
//! reaches it has only 1024. Such a game cannot be told apart below that branch.
//! It is left out and recorded in [`BuildReport::undersized`] before any bytes
//! are read, so [`Error::ShortRead`] only ever means a file is shorter than its
//! catalog entry.

use crate::error::{Error, Result};
use crate::source::RomSource;
use crate::tree::{ByteRange, IndexBranch, IndexLeaf, IndexNode, IndexTree};
use camino::Utf8PathBuf;
use nes_catalog::Game;
use std::collections::btree_map::Entry;
use std::sync::Arc;

/// A game that could not be indexed because its ROM file was not found.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingGame<'a> {
    pub game: &'a Game,
    /// Filename the source expected, relative to its ROM directory.
    pub filename: String,
    pub path: Utf8PathBuf,
}

/// A game left out because a branch on its path hashes more bytes than it has.
#[derive(Debug, Clone, PartialEq)]
pub struct UndersizedGame<'a> {
    pub game: &'a Game,
    /// Bytes hashed by the branch the game could not enter.
    pub required: u64,
}

/// Summary of a build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport<'a> {
    /// Games offered to the builder.
    pub total: usize,
    /// Games placed in the tree, ambiguous ones included.
    pub placed: usize,
    /// Games skipped because their backing file is missing.
    pub missing: Vec<MissingGame<'a>>,
    /// Games skipped because they are smaller than a branch on their path.
    pub undersized: Vec<UndersizedGame<'a>>,
}

/// Progress information emitted after each insertion attempt.
#[derive(Debug, Clone)]
pub struct BuildProgress {
    /// 1-based position of the game in processing order.
    pub current: usize,
    /// Number of games to process, when known.
    pub total: Option<usize>,
    pub name: String,
}

type ProgressCallback = Arc<dyn Fn(BuildProgress) + Send + Sync>;

/// Incremental index builder.
///
/// Create with [`new`](Self::new), feed games in size order with
/// [`insert`](Self::insert), then call [`finish`](Self::finish). Most callers
/// want [`build_index`], which does all three.
pub struct IndexBuilder<'a, S> {
    source: S,
    root: IndexBranch<'a>,
    report: BuildReport<'a>,
    expected_total: Option<usize>,
    progress: Option<ProgressCallback>,
}

impl<'a, S: RomSource> IndexBuilder<'a, S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            root: IndexBranch::new(ByteRange::ROOT),
            report: BuildReport::default(),
            expected_total: None,
            progress: None,
        }
    }

    /// Set a progress callback, invoked once per game.
    pub fn with_progress(mut self, callback: impl Fn(BuildProgress) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(callback));
        self
    }

    /// Insert one game.
    ///
    /// A missing backing file, or a game too small for a branch on its path, is
    /// recorded in the report and is not an error; the tree is left as it was.
    /// Any other failure is returned and the build should be abandoned.
    pub fn insert(&mut self, game: &'a Game) -> Result<()> {
        self.report.total += 1;

        let outcome = insert_into(&self.source, &mut self.root, game);
        self.emit_progress(game);

        match outcome {
            Ok(()) => {
                self.report.placed += 1;
                Ok(())
            }
            Err(Error::MissingSource { filename, path, .. }) => {
                tracing::warn!("{} {} - ROM file missing.", game.rom_crc32, filename);
                self.report.missing.push(MissingGame {
                    game,
                    filename,
                    path,
                });
                Ok(())
            }
            Err(Error::Undersized { size, required, .. }) => {
                tracing::warn!(
                    "{} {} - {} bytes, branch hashes {}.",
                    game.rom_crc32,
                    game.name,
                    size,
                    required
                );
                self.report.undersized.push(UndersizedGame { game, required });
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub fn report(&self) -> &BuildReport<'a> {
        &self.report
    }

    pub fn finish(self) -> (IndexTree<'a>, BuildReport<'a>) {
        (IndexTree::from_root(self.root), self.report)
    }

    fn emit_progress(&self, game: &Game) {
        if let Some(progress) = &self.progress {
            progress(BuildProgress {
                current: self.report.total,
                total: self.expected_total,
                name: game.name.clone(),
            });
        }
    }
}

/// Build an index over `games`.
///
/// Games are stably sorted by `(prg_rom_size, chr_rom_size)` and inserted in that
/// order, so two runs over the same catalog produce identical trees.
pub fn build_index<'a, S: RomSource>(
    games: impl IntoIterator<Item = &'a Game>,
    source: S,
) -> Result<(IndexTree<'a>, BuildReport<'a>)> {
    build_index_with(games, IndexBuilder::new(source))
}

/// Like [`build_index`], starting from a preconfigured builder.
pub fn build_index_with<'a, S: RomSource>(
    games: impl IntoIterator<Item = &'a Game>,
    mut builder: IndexBuilder<'a, S>,
) -> Result<(IndexTree<'a>, BuildReport<'a>)> {
    let mut games: Vec<&'a Game> = games.into_iter().collect();
    games.sort_by_key(|g| (g.prg_rom_size, g.chr_rom_size));
    builder.expected_total = Some(games.len());

    tracing::info!("Building index over {} games", games.len());

    for game in games {
        builder.insert(game)?;
    }

    let (tree, report) = builder.finish();

    tracing::info!(
        "Index built: {} placed, {} missing, {} undersized",
        report.placed,
        report.missing.len(),
        report.undersized.len()
    );

    Ok((tree, report))
}

/// Range that could still separate `game` from `other` below a branch at `range`.
fn widen_range(range: ByteRange, game: &Game, other: &Game) -> ByteRange {
    let prg_bytes = game.prg_rom_size.min(other.prg_rom_size);
    let chr_bytes = if prg_bytes > range.prg_bytes {
        0
    } else {
        game.chr_rom_size.min(other.chr_rom_size)
    };

    ByteRange::new(prg_bytes, chr_bytes)
}

fn insert_into<'a>(
    source: &impl RomSource,
    branch: &mut IndexBranch<'a>,
    game: &'a Game,
) -> Result<()> {
    let range = branch.range();
    if game.rom_size() < range.len() {
        return Err(Error::Undersized {
            crc32: game.rom_crc32,
            size: game.rom_size(),
            required: range.len(),
        });
    }
    let key = source.partial_checksum(game, range.len())?;

    let node = match branch.children_mut().entry(key) {
        Entry::Vacant(entry) => {
            tracing::trace!(
                "{} placed at {} (PRG:{} CHR:{})",
                game.rom_crc32,
                key,
                range.prg_bytes,
                range.chr_bytes
            );
            entry.insert(IndexNode::Leaf(IndexLeaf::new(range, game)));
            return Ok(());
        }
        Entry::Occupied(entry) => entry.into_mut(),
    };

    let (other, new_range) = match &mut *node {
        IndexNode::Branch(child) => return insert_into(source, child, game),
        IndexNode::Leaf(leaf) => {
            if leaf.is_ambiguous() {
                tracing::debug!("{} {} joins ambiguous leaf {}", game.rom_crc32, game.name, key);
                leaf.push(game);
                return Ok(());
            }

            let other = leaf.games()[0];
            let new_range = widen_range(range, game, other);

            if new_range == range {
                tracing::debug!(
                    "{} {} is indistinguishable from {} {} at {}",
                    game.rom_crc32,
                    game.name,
                    other.rom_crc32,
                    other.name,
                    key
                );
                leaf.push(game);
                return Ok(());
            }

            (other, new_range)
        }
    };

    tracing::trace!(
        "Splitting {} into branch (PRG:{} CHR:{})",
        key,
        new_range.prg_bytes,
        new_range.chr_bytes
    );

    // Build the replacement off to the side so a failure keeps the old leaf.
    let mut child = IndexBranch::new(new_range);
    insert_into(source, &mut child, other).map_err(|e| match e {
        // `other` was hashed when it was placed, so this is not `game`'s fault.
        Error::MissingSource { crc32, path, .. } => Error::SourceVanished { crc32, path },
        e => e,
    })?;
    insert_into(source, &mut child, game)?;
    *node = IndexNode::Branch(child);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ambiguity::AmbiguityReport;
    use crate::serialize::SerializedBranch;
    use crate::source::MemoryRomSource;
    use crate::test_support::{game, image};
    use nes_catalog::Crc32;
    use proptest::prelude::*;
    use std::sync::Mutex;

    /// Catalog plus matching in-memory images.
    fn fixture(entries: &[(u32, u64, u64, Vec<u8>)]) -> (Vec<Game>, MemoryRomSource) {
        let mut source = MemoryRomSource::new();
        let games = entries
            .iter()
            .map(|(crc, prg, chr, bytes)| {
                assert_eq!(bytes.len() as u64, prg + chr);
                source.insert(Crc32(*crc), bytes.clone());
                game(*crc, &format!("game-{crc:x}"), *prg, *chr)
            })
            .collect();
        (games, source)
    }

    fn leaf_names(leaf: &IndexLeaf<'_>) -> Vec<String> {
        leaf.games().iter().map(|g| g.name.clone()).collect()
    }

    #[test]
    fn test_distinct_headers_become_root_leaves() {
        let (games, source) = fixture(&[
            (1, 1024, 0, image(1, 1024)),
            (2, 1024, 0, image(2, 1024)),
        ]);

        let (tree, report) = build_index(&games, &source).unwrap();

        assert_eq!(report.placed, 2);
        assert_eq!(tree.root().children().len(), 2);
        assert_eq!(tree.root().leaves().count(), 2);
        for g in &games {
            let leaf = tree.locate(source.get(g.rom_crc32).unwrap()).unwrap();
            assert_eq!(leaf.game(), Some(g));
            assert_eq!(leaf.range(), ByteRange::ROOT);
        }
    }

    #[test]
    fn test_same_header_split_within_prg() {
        // Same first 512 bytes, different afterwards.
        let shared = image(7, 512);
        let mut a = shared.clone();
        a.extend(image(1, 512));
        let mut b = shared.clone();
        b.extend(image(2, 512));

        let (games, source) = fixture(&[(1, 1024, 0, a), (2, 1024, 0, b)]);
        let (tree, _) = build_index(&games, &source).unwrap();

        let root_key = Crc32::of(&shared);
        let Some(IndexNode::Branch(branch)) = tree.root().get(root_key) else {
            panic!("expected a branch at {root_key}");
        };
        assert_eq!(branch.range(), ByteRange::new(1024, 0));
        assert_eq!(branch.leaves().count(), 2);
    }

    #[test]
    fn test_prefix_extension_continues_in_prg() {
        // A is 1 KiB, B is 2 KiB and starts with all of A.
        let a = image(1, 1024);
        let mut b = a.clone();
        b.extend(image(2, 1024));

        let (games, source) = fixture(&[(2, 2048, 0, b.clone()), (1, 1024, 0, a.clone())]);
        let (tree, report) = build_index(&games, &source).unwrap();

        assert_eq!(report.placed, 2);
        let Some(IndexNode::Branch(branch)) = tree.root().get(Crc32::of(&a[..512])) else {
            panic!("expected a branch at the root");
        };
        // The split range is bounded by the smaller game. Both still hash the same
        // 1024 bytes there, and A has nothing more to offer: ambiguous.
        assert_eq!(branch.range(), ByteRange::new(1024, 0));
        let leaf = tree.locate(&a).unwrap();
        assert!(leaf.is_ambiguous());
        assert_eq!(leaf_names(leaf), ["game-1", "game-2"]);
        assert_eq!(tree.locate(&b), Some(leaf));
    }

    #[test]
    fn test_prg_exhausted_continues_into_chr() {
        let prg = image(3, 1024);
        let mut a = prg.clone();
        a.extend(image(10, 512));
        let mut b = prg.clone();
        b.extend(image(11, 512));

        let (games, source) = fixture(&[(1, 1024, 512, a.clone()), (2, 1024, 512, b.clone())]);
        let (tree, _) = build_index(&games, &source).unwrap();

        // Root (512) -> PRG branch (1024, 0) -> CHR branch (1024, 512).
        let Some(IndexNode::Branch(prg_branch)) = tree.root().get(Crc32::of(&prg[..512])) else {
            panic!("expected PRG branch");
        };
        assert_eq!(prg_branch.range(), ByteRange::new(1024, 0));
        let Some(IndexNode::Branch(chr_branch)) = prg_branch.get(Crc32::of(&prg)) else {
            panic!("expected CHR branch");
        };
        assert_eq!(chr_branch.range(), ByteRange::new(1024, 512));

        assert_eq!(tree.locate(&a).unwrap().game().map(|g| g.rom_crc32), Some(Crc32(1)));
        assert_eq!(tree.locate(&b).unwrap().game().map(|g| g.rom_crc32), Some(Crc32(2)));
    }

    #[test]
    fn test_identical_images_are_ambiguous() {
        let bytes = image(5, 1024);
        let (games, source) = fixture(&[(1, 1024, 0, bytes.clone()), (2, 1024, 0, bytes.clone())]);

        let (tree, report) = build_index(&games, &source).unwrap();
        assert_eq!(report.placed, 2);

        let leaf = tree.locate(&bytes).unwrap();
        assert!(leaf.is_ambiguous());
        assert_eq!(leaf.range(), ByteRange::new(1024, 0));

        let ambiguities = AmbiguityReport::collect(&tree);
        assert_eq!(ambiguities.groups().len(), 1);
        assert_eq!(ambiguities.game_count(), 2);
    }

    #[test]
    fn test_ambiguous_leaf_stays_terminal() {
        let bytes = image(5, 1024);
        let mut longer = bytes.clone();
        longer.extend(image(6, 1024));

        let (games, source) = fixture(&[
            (1, 1024, 0, bytes.clone()),
            (2, 1024, 0, bytes.clone()),
            (3, 2048, 0, longer.clone()),
        ]);
        let (tree, _) = build_index(&games, &source).unwrap();

        let leaf = tree.locate(&longer).unwrap();
        assert_eq!(leaf_names(leaf), ["game-1", "game-2", "game-3"]);
        assert_eq!(tree.locate(&bytes), Some(leaf));
    }

    #[test]
    fn test_missing_source_skipped() {
        let (mut games, source) = fixture(&[
            (1, 1024, 0, image(1, 1024)),
            (2, 1024, 0, image(2, 1024)),
        ]);
        games.push(game(3, "absent", 1024, 0));

        let (tree, report) = build_index(&games, &source).unwrap();

        assert_eq!(report.total, 3);
        assert_eq!(report.placed, 2);
        assert_eq!(report.missing.len(), 1);
        assert_eq!(report.missing[0].game.rom_crc32, Crc32(3));
        assert_eq!(tree.game_count(), 2);
    }

    #[test]
    fn test_short_read_is_fatal() {
        // The catalog says 1 KiB, the file has 100 bytes.
        let games = [game(1, "truncated", 1024, 0)];
        let source = MemoryRomSource::new().with_image(Crc32(1), image(1, 100));

        let err = build_index(&games, &source).unwrap_err();
        assert!(matches!(err, Error::ShortRead { expected: 512, actual: 100, .. }));
    }

    #[test]
    fn test_game_smaller_than_chr_branch_is_skipped() {
        // A and B share all of PRG and split on CHR-ROM into a (512, 1024)
        // branch of 1536 bytes. C sorts after them, shares the first 512 bytes
        // and has only 1024 bytes in total.
        let prg = image(1, 512);
        let mut a = prg.clone();
        a.extend(image(2, 1024));
        let mut b = prg.clone();
        b.extend(image(3, 1024));
        let mut c = prg.clone();
        c.extend(image(4, 512));

        let (games, source) = fixture(&[
            (3, 1024, 0, c.clone()),
            (1, 512, 1024, a.clone()),
            (2, 512, 1024, b.clone()),
        ]);
        let (tree, report) = build_index(&games, &source).unwrap();

        assert_eq!(report.total, 3);
        assert_eq!(report.placed, 2);
        assert!(report.missing.is_empty());
        assert_eq!(report.undersized.len(), 1);
        assert_eq!(report.undersized[0].game.rom_crc32, Crc32(3));
        assert_eq!(report.undersized[0].required, 1536);

        let Some(IndexNode::Branch(branch)) = tree.root().get(Crc32::of(&prg)) else {
            panic!("expected a branch at the root");
        };
        assert_eq!(branch.range(), ByteRange::new(512, 1024));
        assert_eq!(tree.locate(&a).unwrap().game().map(|g| g.rom_crc32), Some(Crc32(1)));
        assert_eq!(tree.locate(&b).unwrap().game().map(|g| g.rom_crc32), Some(Crc32(2)));
        assert_eq!(tree.locate(&c), None);
    }

    /// Serves images from memory but loses one after it has been read once.
    struct ForgetfulSource {
        inner: MemoryRomSource,
        forget: Crc32,
        read: std::cell::Cell<bool>,
    }

    impl RomSource for ForgetfulSource {
        fn partial_checksum(&self, game: &Game, byte_length: u64) -> Result<Crc32> {
            if game.rom_crc32 == self.forget && self.read.replace(true) {
                return Err(Error::MissingSource {
                    crc32: game.rom_crc32,
                    filename: game.filename.clone(),
                    path: Utf8PathBuf::from(&game.filename),
                });
            }
            self.inner.partial_checksum(game, byte_length)
        }
    }

    #[test]
    fn test_vanished_occupant_is_not_blamed_on_newcomer() {
        let shared = image(7, 512);
        let mut first = shared.clone();
        first.extend(image(1, 512));
        let mut second = shared.clone();
        second.extend(image(2, 512));

        let source = ForgetfulSource {
            inner: MemoryRomSource::new()
                .with_image(Crc32(1), first)
                .with_image(Crc32(2), second),
            forget: Crc32(1),
            read: std::cell::Cell::new(false),
        };
        let placed = game(1, "placed", 1024, 0);
        let newcomer = game(2, "newcomer", 1024, 0);

        let mut builder = IndexBuilder::new(&source);
        builder.insert(&placed).unwrap();
        let err = builder.insert(&newcomer).unwrap_err();
        assert!(matches!(err, Error::SourceVanished { crc32: Crc32(1), .. }));

        let (tree, report) = builder.finish();
        assert!(report.missing.is_empty());
        assert_eq!(report.placed, 1);
        assert_eq!(tree.game_count(), 1);
    }

    #[test]
    fn test_ambiguous_leaf_never_splits() {
        // A and B tie at (1024, 0) because B has no CHR-ROM. C could be compared
        // with A over CHR-ROM, but the leaf is already ambiguous and must not split.
        let prg = image(4, 1024);
        let mut a = prg.clone();
        a.extend(image(20, 512));
        let mut b = prg.clone();
        b.extend(image(21, 1024));
        let mut c = prg.clone();
        c.extend(image(22, 1536));

        let (games, source) = fixture(&[
            (1, 1024, 512, a.clone()),
            (2, 2048, 0, b.clone()),
            (3, 2048, 512, c.clone()),
        ]);
        let (tree, report) = build_index(&games, &source).unwrap();

        assert_eq!(report.placed, 3);
        let leaf = tree.locate(&c).unwrap();
        assert_eq!(leaf.range(), ByteRange::new(1024, 0));
        assert_eq!(leaf_names(leaf), ["game-1", "game-2", "game-3"]);
        assert_eq!(tree.game_count(), 3);
    }

    #[test]
    fn test_failed_split_keeps_existing_leaf() {
        let shared = image(7, 1024);
        let source = MemoryRomSource::new()
            .with_image(Crc32(1), shared.clone())
            // Claims 1 KiB but only has 600 bytes: fails once the split needs 1024.
            .with_image(Crc32(2), shared[..600].to_vec());
        let first = game(1, "first", 1024, 0);
        let liar = game(2, "liar", 1024, 0);

        let mut builder = IndexBuilder::new(&source);
        builder.insert(&first).unwrap();
        assert!(matches!(
            builder.insert(&liar),
            Err(Error::ShortRead { expected: 1024, actual: 600, .. })
        ));

        let (tree, report) = builder.finish();
        assert_eq!(report.placed, 1);
        let leaf = tree.locate(&shared).unwrap();
        assert_eq!(leaf.range(), ByteRange::ROOT);
        assert_eq!(leaf.game().map(|g| g.rom_crc32), Some(Crc32(1)));
    }

    #[test]
    fn test_progress_callback() {
        let (games, source) = fixture(&[
            (1, 1024, 0, image(1, 1024)),
            (2, 512, 0, image(2, 512)),
        ]);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let builder = IndexBuilder::new(&source).with_progress(move |p| {
            sink.lock().unwrap().push((p.current, p.total, p.name));
        });
        build_index_with(&games, builder).unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            [
                (1, Some(2), "game-2".to_string()),
                (2, Some(2), "game-1".to_string()),
            ]
        );
    }

    /// Generated catalogs: random sizes and contents drawn from a small alphabet
    /// so shared prefixes and exact duplicates actually occur.
    fn catalog_strategy() -> impl Strategy<Value = Vec<(u64, u64, u8, u8)>> {
        prop::collection::vec(
            (
                prop::sample::select(vec![512u64, 1024, 2048]),
                prop::sample::select(vec![0u64, 512, 1024]),
                0u8..3,
                0u8..3,
            ),
            1..12,
        )
    }

    fn generated_fixture(shape: &[(u64, u64, u8, u8)]) -> (Vec<Game>, MemoryRomSource) {
        let entries: Vec<_> = shape
            .iter()
            .enumerate()
            .map(|(i, (prg, chr, head, tail))| {
                // First 512 bytes depend on `head` only, the rest on `tail`.
                let mut bytes = image(u32::from(*head), 512);
                bytes.extend(image(100 + u32::from(*tail), (prg + chr - 512) as usize));
                (i as u32 + 1, *prg, *chr, bytes)
            })
            .collect();
        fixture(&entries)
    }

    /// No key names both a leaf and a branch, at any level.
    fn keys_disjoint(branch: &SerializedBranch) -> bool {
        branch
            .leaf_dict
            .keys()
            .all(|key| !branch.branch_dict.contains_key(key))
            && branch.branch_dict.values().all(keys_disjoint)
    }

    proptest! {
        #[test]
        fn test_every_placed_game_is_found(shape in catalog_strategy()) {
            let (games, source) = generated_fixture(&shape);
            let (tree, report) = build_index(&games, &source).unwrap();

            prop_assert!(report.missing.is_empty());
            prop_assert_eq!(report.placed + report.undersized.len(), games.len());
            prop_assert_eq!(tree.game_count(), report.placed);
            for g in &games {
                if report.undersized.iter().any(|u| u.game == g) {
                    continue;
                }
                let leaf = tree.locate(source.get(g.rom_crc32).unwrap());
                prop_assert!(leaf.is_some());
                prop_assert!(leaf.unwrap().games().contains(&g));
            }

            prop_assert!(keys_disjoint(&tree.to_serialized()));
        }

        #[test]
        fn test_build_is_deterministic(shape in catalog_strategy()) {
            let (games, source) = generated_fixture(&shape);
            let (first, _) = build_index(&games, &source).unwrap();
            let (second, _) = build_index(&games, &source).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn test_ambiguous_games_share_content(shape in catalog_strategy()) {
            let (games, source) = generated_fixture(&shape);
            let (tree, _) = build_index(&games, &source).unwrap();

            for group in AmbiguityReport::collect(&tree).groups() {
                // Every member must be a prefix of the longest member.
                let longest = group
                    .games
                    .iter()
                    .map(|g| source.get(g.rom_crc32).unwrap())
                    .max_by_key(|bytes| bytes.len())
                    .unwrap();
                for g in &group.games {
                    let bytes = source.get(g.rom_crc32).unwrap();
                    prop_assert_eq!(bytes, &longest[..bytes.len()]);
                }
            }
        }
    }
}
