//! ROM byte sources used for partial checksums.
//!
//! The builder never reads files itself. It asks a [`RomSource`] for the CRC32 of
//! the first N bytes of a game's headerless image, where N is the byte range of
//! the branch the game is being inserted into. The image is PRG-ROM followed
//! directly by CHR-ROM, so a range of `prg_bytes + chr_bytes` covers the PRG
//! prefix and then the CHR prefix.
//!
//! The crate ships [`DirectoryRomSource`] for headerless files on disk and
//! [`MemoryRomSource`] for images that are already loaded.

use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use nes_catalog::{Crc32, Game};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};

/// Computes partial checksums over a game's headerless image.
///
/// # Implementing
///
/// Implementations must read from offset 0 on every call and must not cache:
/// the builder relies on each call reflecting exactly `byte_length` bytes.
///
/// - Return [`Error::MissingSource`] when the game has no backing data at all.
/// - Return [`Error::ShortRead`] when fewer than `byte_length` bytes exist.
pub trait RomSource {
    fn partial_checksum(&self, game: &Game, byte_length: u64) -> Result<Crc32>;
}

impl<T: RomSource + ?Sized> RomSource for &T {
    fn partial_checksum(&self, game: &Game, byte_length: u64) -> Result<Crc32> {
        (**self).partial_checksum(game, byte_length)
    }
}

/// Reads up to `byte_length` bytes from the start of `reader`.
///
/// Returns fewer bytes only if the reader hits end of file first.
pub(crate) fn read_prefix(reader: impl Read, byte_length: u64) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::with_capacity(usize::try_from(byte_length).unwrap_or(0));
    reader.take(byte_length).read_to_end(&mut buffer)?;
    Ok(buffer)
}

/// Headerless ROM files stored flat in one directory.
///
/// A game's file is its catalog filename with the extension swapped, so
/// `Super Mario Bros. (World).nes` is read from
/// `rom_dir/Super Mario Bros. (World).unh` by default.
#[derive(Debug, Clone)]
pub struct DirectoryRomSource {
    rom_dir: Utf8PathBuf,
    extension: String,
}

impl DirectoryRomSource {
    pub const DEFAULT_EXTENSION: &'static str = "unh";

    pub fn new(rom_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            rom_dir: rom_dir.into(),
            extension: Self::DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Use a different extension for the headerless files.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn rom_dir(&self) -> &Utf8Path {
        &self.rom_dir
    }

    /// Filename of the headerless file for `game`, relative to the ROM directory.
    pub fn rom_filename(&self, game: &Game) -> String {
        Utf8Path::new(&game.filename)
            .with_extension(&self.extension)
            .into_string()
    }

    /// Full path of the headerless file for `game`.
    pub fn rom_path(&self, game: &Game) -> Utf8PathBuf {
        self.rom_dir.join(self.rom_filename(game))
    }
}

impl RomSource for DirectoryRomSource {
    fn partial_checksum(&self, game: &Game, byte_length: u64) -> Result<Crc32> {
        let path = self.rom_path(game);

        // The handle is dropped on every return path below.
        let file = match File::open(path.as_std_path()) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::MissingSource {
                    crc32: game.rom_crc32,
                    filename: self.rom_filename(game),
                    path,
                });
            }
            Err(e) => return Err(e.into()),
        };

        let bytes = read_prefix(file, byte_length)?;
        if (bytes.len() as u64) != byte_length {
            return Err(Error::ShortRead {
                path,
                expected: byte_length,
                actual: bytes.len() as u64,
            });
        }

        Ok(Crc32::of(&bytes))
    }
}

/// In-memory headerless images keyed by full-file checksum.
#[derive(Debug, Clone, Default)]
pub struct MemoryRomSource {
    images: HashMap<Crc32, Vec<u8>>,
}

impl MemoryRomSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, rom_crc32: Crc32, image: Vec<u8>) -> Option<Vec<u8>> {
        self.images.insert(rom_crc32, image)
    }

    pub fn with_image(mut self, rom_crc32: Crc32, image: Vec<u8>) -> Self {
        self.insert(rom_crc32, image);
        self
    }

    pub fn get(&self, rom_crc32: Crc32) -> Option<&[u8]> {
        self.images.get(&rom_crc32).map(Vec::as_slice)
    }
}

impl RomSource for MemoryRomSource {
    fn partial_checksum(&self, game: &Game, byte_length: u64) -> Result<Crc32> {
        let Some(image) = self.images.get(&game.rom_crc32) else {
            return Err(Error::MissingSource {
                crc32: game.rom_crc32,
                filename: game.filename.clone(),
                path: Utf8PathBuf::from(&game.filename),
            });
        };

        let available = image.len() as u64;
        if available < byte_length {
            return Err(Error::ShortRead {
                path: Utf8PathBuf::from(&game.filename),
                expected: byte_length,
                actual: available,
            });
        }

        Ok(Crc32::of(&image[..byte_length as usize]))
    }
}
