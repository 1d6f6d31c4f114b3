//! Reporting of games the index cannot tell apart.
//!
//! A leaf with more than one game means the catalog holds dumps that are
//! byte-identical, or where one is a prefix of another. These are catalog
//! defects for a human to look at; the builder keeps them out of the way but
//! never guesses between them.

use crate::tree::{ByteRange, IndexTree};
use nes_catalog::{Crc32, Game};

/// One ambiguous leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct Ambiguity<'a> {
    /// Range of the branch holding the leaf.
    pub range: ByteRange,
    /// Partial checksum shared by every game in the group.
    pub key: Crc32,
    pub games: Vec<&'a Game>,
}

/// All ambiguous leaves of a tree, in depth-first order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AmbiguityReport<'a> {
    groups: Vec<Ambiguity<'a>>,
}

impl<'a> AmbiguityReport<'a> {
    /// Walk `tree` depth-first, visiting each branch's leaves (in key order)
    /// before recursing into its branch children.
    pub fn collect(tree: &IndexTree<'a>) -> Self {
        let mut groups = Vec::new();

        tree.root().for_each_branch(&mut |branch| {
            for (key, leaf) in branch.leaves() {
                if leaf.is_ambiguous() {
                    groups.push(Ambiguity {
                        range: branch.range(),
                        key,
                        games: leaf.games().to_vec(),
                    });
                }
            }
        });

        Self { groups }
    }

    pub fn groups(&self) -> &[Ambiguity<'a>] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of games across all groups.
    pub fn game_count(&self) -> usize {
        self.groups.iter().map(|g| g.games.len()).sum()
    }
}
