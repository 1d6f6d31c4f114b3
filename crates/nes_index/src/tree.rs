//! In-memory discriminating index tree.
//!
//! Every [`IndexBranch`] stands for "all games not yet told apart by the first
//! `prg_bytes` bytes of PRG-ROM followed by the first `chr_bytes` bytes of
//! CHR-ROM". Its children are keyed by the CRC32 of exactly that byte range.
//! A key resolves to exactly one child, either a deeper branch or a leaf:
//!
//! ```text
//! root (PRG 512, CHR 0)
//! ├── 1A2B3C4D -> leaf [Game A]
//! └── 5E6F7A8B -> branch (PRG 16384, CHR 0)
//!     ├── 0F1E2D3C -> leaf [Game B]
//!     └── 4B5A6978 -> leaf [Game C, Game D]   (ambiguous)
//! ```
//!
//! Leaves hold references into the catalog, so a tree cannot outlive the games
//! it was built from. Use [`IndexTree::to_serialized`](crate::IndexTree::to_serialized)
//! for an owned, persistable copy.

use nes_catalog::{Crc32, Game};
use std::collections::BTreeMap;

/// PRG-ROM bytes hashed at the root. Covers the largest iNES header variant.
pub const HEADER_PROBE_LENGTH: u64 = 512;

/// Cumulative byte range hashed to reach a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByteRange {
    pub prg_bytes: u64,
    pub chr_bytes: u64,
}

impl ByteRange {
    pub const ROOT: Self = Self {
        prg_bytes: HEADER_PROBE_LENGTH,
        chr_bytes: 0,
    };

    pub fn new(prg_bytes: u64, chr_bytes: u64) -> Self {
        Self {
            prg_bytes,
            chr_bytes,
        }
    }

    /// Number of bytes read from the start of the image.
    pub fn len(&self) -> u64 {
        self.prg_bytes + self.chr_bytes
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A child of a branch.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexNode<'a> {
    Leaf(IndexLeaf<'a>),
    Branch(IndexBranch<'a>),
}

/// Terminal bucket of games whose checksums collided at the parent's range.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexLeaf<'a> {
    range: ByteRange,
    games: Vec<&'a Game>,
}

impl<'a> IndexLeaf<'a> {
    pub(crate) fn new(range: ByteRange, game: &'a Game) -> Self {
        Self {
            range,
            games: vec![game],
        }
    }

    pub(crate) fn push(&mut self, game: &'a Game) {
        self.games.push(game);
    }

    pub fn range(&self) -> ByteRange {
        self.range
    }

    pub fn games(&self) -> &[&'a Game] {
        &self.games
    }

    /// The single game of a resolved leaf.
    pub fn game(&self) -> Option<&'a Game> {
        match self.games.as_slice() {
            [game] => Some(*game),
            _ => None,
        }
    }

    /// More than one game ended up here and no further bytes can separate them.
    pub fn is_ambiguous(&self) -> bool {
        self.games.len() > 1
    }
}

/// Interior node of the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexBranch<'a> {
    range: ByteRange,
    children: BTreeMap<Crc32, IndexNode<'a>>,
}

impl<'a> IndexBranch<'a> {
    pub fn new(range: ByteRange) -> Self {
        Self {
            range,
            children: BTreeMap::new(),
        }
    }

    pub fn range(&self) -> ByteRange {
        self.range
    }

    pub fn get(&self, key: Crc32) -> Option<&IndexNode<'a>> {
        self.children.get(&key)
    }

    pub fn children(&self) -> &BTreeMap<Crc32, IndexNode<'a>> {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut BTreeMap<Crc32, IndexNode<'a>> {
        &mut self.children
    }

    /// Leaf children in key order.
    pub fn leaves(&self) -> impl Iterator<Item = (Crc32, &IndexLeaf<'a>)> {
        self.children.iter().filter_map(|(k, node)| match node {
            IndexNode::Leaf(leaf) => Some((*k, leaf)),
            IndexNode::Branch(_) => None,
        })
    }

    /// Branch children in key order.
    pub fn branches(&self) -> impl Iterator<Item = (Crc32, &IndexBranch<'a>)> {
        self.children.iter().filter_map(|(k, node)| match node {
            IndexNode::Branch(branch) => Some((*k, branch)),
            IndexNode::Leaf(_) => None,
        })
    }

    /// Depth-first walk: `visit` sees this branch, then each branch child in key order.
    pub fn for_each_branch<'s>(&'s self, visit: &mut impl FnMut(&'s IndexBranch<'a>)) {
        visit(self);
        for (_, child) in self.branches() {
            child.for_each_branch(visit);
        }
    }
}

/// A finished index, rooted at a [`ByteRange::ROOT`] branch.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexTree<'a> {
    root: IndexBranch<'a>,
}

impl<'a> IndexTree<'a> {
    pub(crate) fn from_root(root: IndexBranch<'a>) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &IndexBranch<'a> {
        &self.root
    }

    /// Follow the tree with the checksums of `image` and return the leaf reached.
    ///
    /// Uses the same byte ranges as the builder did. Returns `None` if a key is
    /// not present or `image` is shorter than the range a branch requires.
    pub fn locate(&self, image: &[u8]) -> Option<&IndexLeaf<'a>> {
        let mut branch = &self.root;
        loop {
            let len = usize::try_from(branch.range.len()).ok()?;
            let key = Crc32::of(image.get(..len)?);
            match branch.get(key)? {
                IndexNode::Branch(child) => branch = child,
                IndexNode::Leaf(leaf) => return Some(leaf),
            }
        }
    }

    /// Total number of games held by leaves, ambiguous ones included.
    pub fn game_count(&self) -> usize {
        let mut count = 0;
        self.root.for_each_branch(&mut |branch| {
            count += branch.leaves().map(|(_, leaf)| leaf.games().len()).sum::<usize>();
        });
        count
    }
}
