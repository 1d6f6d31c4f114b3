//! Persisted index format and identification.
//!
//! [`IndexTree::to_serialized`] turns the build-time tree into an owned
//! [`SerializedBranch`], which is what gets written to `nesIndex.json` and what
//! identification tools walk. Ambiguous leaves are dropped: a game that cannot
//! be told apart from another must not be reported as a positive match.
//!
//! # JSON format
//!
//! ```json
//! {
//!   "prgROMByteLength": 512,
//!   "chrROMByteLength": 0,
//!   "leafDict": {
//!     "1A2B3C4D": {
//!       "romCRC32": "3337EC46",
//!       "name": "Super Mario Bros. (World)",
//!       "filename": "Super Mario Bros. (World).nes",
//!       "nes2HeaderData": { "pcb": { "mapper": 0, ... }, ... }
//!     }
//!   },
//!   "branchDict": {
//!     "5E6F7A8B": { "prgROMByteLength": 16384, "chrROMByteLength": 0, "leafDict": {}, "branchDict": {} }
//!   }
//! }
//! ```
//!
//! # Identification
//!
//! Starting at the root, read `prgROMByteLength + chrROMByteLength` bytes from
//! the start of the unknown file and look up their CRC32. A `branchDict` hit
//! repeats the process one level down, a `leafDict` hit is the answer, and a
//! miss means the file is not in the index.

use crate::error::Result;
use crate::source::read_prefix;
use crate::tree::{IndexBranch, IndexNode, IndexTree};
use camino::Utf8Path;
use nes_catalog::{Crc32, HeaderData};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom};

/// A resolved identification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SerializedLeaf {
    #[serde(rename = "romCRC32")]
    pub rom_crc32: Crc32,
    pub name: String,
    pub filename: String,
    #[serde(rename = "nes2HeaderData")]
    pub header: HeaderData,
}

/// Persistable mirror of an [`IndexBranch`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SerializedBranch {
    #[serde(rename = "prgROMByteLength")]
    pub prg_rom_byte_length: u64,
    #[serde(rename = "chrROMByteLength")]
    pub chr_rom_byte_length: u64,
    #[serde(rename = "leafDict")]
    pub leaf_dict: BTreeMap<Crc32, SerializedLeaf>,
    #[serde(rename = "branchDict")]
    pub branch_dict: BTreeMap<Crc32, SerializedBranch>,
}

/// Result of walking the index with an unknown file.
#[derive(Debug, Clone, PartialEq)]
pub enum Identification<'t> {
    Match {
        leaf: &'t SerializedLeaf,
        /// Bytes read from the start of the file to reach the match.
        bytes_read: u64,
    },
    Unknown,
}

impl<'t> Identification<'t> {
    pub fn leaf(&self) -> Option<&'t SerializedLeaf> {
        match self {
            Identification::Match { leaf, .. } => Some(leaf),
            Identification::Unknown => None,
        }
    }
}

impl From<&IndexBranch<'_>> for SerializedBranch {
    fn from(branch: &IndexBranch<'_>) -> Self {
        let mut leaf_dict = BTreeMap::new();
        let mut branch_dict = BTreeMap::new();

        for (key, node) in branch.children() {
            match node {
                IndexNode::Leaf(leaf) => {
                    // Ambiguous leaves have no single game and are skipped.
                    if let Some(game) = leaf.game() {
                        leaf_dict.insert(
                            *key,
                            SerializedLeaf {
                                rom_crc32: game.rom_crc32,
                                name: game.name.clone(),
                                filename: game.filename.clone(),
                                header: game.header.clone(),
                            },
                        );
                    }
                }
                IndexNode::Branch(child) => {
                    branch_dict.insert(*key, SerializedBranch::from(child));
                }
            }
        }

        let range = branch.range();
        Self {
            prg_rom_byte_length: range.prg_bytes,
            chr_rom_byte_length: range.chr_bytes,
            leaf_dict,
            branch_dict,
        }
    }
}

impl IndexTree<'_> {
    /// Owned, persistable copy of this tree without its ambiguous leaves.
    pub fn to_serialized(&self) -> SerializedBranch {
        SerializedBranch::from(self.root())
    }
}

impl SerializedBranch {
    /// Load a persisted index.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_std_path())?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Write the index as compact JSON, creating parent directories if needed.
    pub fn save(&self, path: &Utf8Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent.as_std_path())?;
        }

        let contents = serde_json::to_string(self)?;
        std::fs::write(path.as_std_path(), contents)?;
        Ok(())
    }

    /// Bytes hashed at this branch.
    pub fn byte_length(&self) -> u64 {
        self.prg_rom_byte_length + self.chr_rom_byte_length
    }

    /// Number of identifiable games below this branch.
    pub fn leaf_count(&self) -> usize {
        self.leaf_dict.len()
            + self
                .branch_dict
                .values()
                .map(SerializedBranch::leaf_count)
                .sum::<usize>()
    }

    /// Deepest branch level below this one, counting this one as 1.
    pub fn depth(&self) -> usize {
        1 + self
            .branch_dict
            .values()
            .map(SerializedBranch::depth)
            .max()
            .unwrap_or(0)
    }

    /// Identify the headerless image read from `reader`.
    ///
    /// Every step seeks back to the start and reads the branch's byte range.
    /// A file too short for a branch's range cannot match anything below it.
    pub fn identify<R: Read + Seek>(&self, reader: &mut R) -> Result<Identification<'_>> {
        let mut branch = self;
        loop {
            let byte_length = branch.byte_length();
            reader.seek(SeekFrom::Start(0))?;
            let bytes = read_prefix(&mut *reader, byte_length)?;
            if (bytes.len() as u64) < byte_length {
                return Ok(Identification::Unknown);
            }

            let key = Crc32::of(&bytes);
            if let Some(child) = branch.branch_dict.get(&key) {
                branch = child;
            } else if let Some(leaf) = branch.leaf_dict.get(&key) {
                return Ok(Identification::Match {
                    leaf,
                    bytes_read: byte_length,
                });
            } else {
                return Ok(Identification::Unknown);
            }
        }
    }

    pub fn identify_bytes(&self, image: &[u8]) -> Identification<'_> {
        match self.identify(&mut Cursor::new(image)) {
            Ok(identification) => identification,
            // Reads from memory do not fail.
            Err(_) => Identification::Unknown,
        }
    }

    /// Identify a headerless file on disk.
    pub fn identify_file(&self, path: &Utf8Path) -> Result<Identification<'_>> {
        let mut file = File::open(path.as_std_path())?;
        self.identify(&mut file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_index;
    use crate::source::MemoryRomSource;
    use crate::test_support::{game, image};
    use tempfile::TempDir;

    fn two_pair_fixture() -> (Vec<nes_catalog::Game>, MemoryRomSource) {
        let same = image(9, 1024);
        let head = image(2, 512);
        let mut a = head.clone();
        a.extend(image(3, 512));
        let mut b = head.clone();
        b.extend(image(4, 512));

        let games = vec![
            game(1, "dup-1", 1024, 0),
            game(2, "dup-2", 1024, 0),
            game(3, "a", 1024, 0),
            game(4, "b", 1024, 0),
        ];
        let source = MemoryRomSource::new()
            .with_image(Crc32(1), same.clone())
            .with_image(Crc32(2), same)
            .with_image(Crc32(3), a)
            .with_image(Crc32(4), b);
        (games, source)
    }

    #[test]
    fn test_ambiguous_leaves_omitted() {
        let (games, source) = two_pair_fixture();
        let (tree, _) = build_index(&games, &source).unwrap();
        let serialized = tree.to_serialized();

        assert_eq!(tree.game_count(), 4);
        assert_eq!(serialized.leaf_count(), 2);
        assert!(serialized.identify_bytes(source.get(Crc32(1)).unwrap()) == Identification::Unknown);
        assert!(serialized.identify_bytes(source.get(Crc32(2)).unwrap()) == Identification::Unknown);
    }

    #[test]
    fn test_resolved_games_identified() {
        let (games, source) = two_pair_fixture();
        let (tree, _) = build_index(&games, &source).unwrap();
        let serialized = tree.to_serialized();

        for crc in [Crc32(3), Crc32(4)] {
            match serialized.identify_bytes(source.get(crc).unwrap()) {
                Identification::Match { leaf, bytes_read } => {
                    assert_eq!(leaf.rom_crc32, crc);
                    assert_eq!(bytes_read, 1024);
                }
                Identification::Unknown => panic!("{crc} not identified"),
            }
        }

        assert_eq!(serialized.identify_bytes(&image(77, 4096)), Identification::Unknown);
        assert_eq!(serialized.identify_bytes(&[0u8; 16]), Identification::Unknown);
    }

    #[test]
    fn test_json_shape() {
        let (games, source) = two_pair_fixture();
        let (tree, _) = build_index(&games, &source).unwrap();
        let value = serde_json::to_value(tree.to_serialized()).unwrap();

        assert_eq!(value["prgROMByteLength"], 512);
        assert_eq!(value["chrROMByteLength"], 0);

        // Both pairs collided at the root and were widened to the full PRG.
        assert!(value["leafDict"].as_object().unwrap().is_empty());
        let branch_dict = value["branchDict"].as_object().unwrap();
        assert_eq!(branch_dict.len(), 2);

        let mut leaf_counts = Vec::new();
        for (key, branch) in branch_dict {
            assert_eq!(key.len(), 8);
            assert!(key.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
            assert_eq!(branch["prgROMByteLength"], 1024);
            assert_eq!(branch["chrROMByteLength"], 0);

            let leaves = branch["leafDict"].as_object().unwrap();
            for leaf in leaves.values() {
                assert!(leaf["romCRC32"].is_string());
                assert!(leaf["nes2HeaderData"]["pcb"]["mapper"].is_number());
            }
            leaf_counts.push(leaves.len());
        }

        // The identical pair leaves an empty branch behind.
        leaf_counts.sort();
        assert_eq!(leaf_counts, [0, 2]);
    }

    #[test]
    fn test_save_load_and_identify_file() {
        let (games, source) = two_pair_fixture();
        let (tree, _) = build_index(&games, &source).unwrap();
        let serialized = tree.to_serialized();

        let dir = TempDir::new().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        let index_path = root.join("dist").join("nesIndex.json");

        serialized.save(&index_path).unwrap();
        let loaded = SerializedBranch::load(&index_path).unwrap();
        assert_eq!(loaded, serialized);
        assert_eq!(loaded.depth(), 2);

        let rom_path = root.join("b.unh");
        std::fs::write(&rom_path, source.get(Crc32(4)).unwrap()).unwrap();
        let found = loaded.identify_file(&rom_path).unwrap();
        assert_eq!(found.leaf().map(|l| l.name.as_str()), Some("b"));
    }
}
