//! CRC32 checksum values and their canonical text form.

use crate::error::CatalogError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A 32-bit CRC checksum.
///
/// The canonical text form is 8 uppercase hexadecimal digits (`"0A1B2C3D"`).
/// This is the form used for catalog keys, for partial-checksum keys in the
/// index tree, and for every serialized representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Crc32(pub u32);

impl Crc32 {
    /// Computes the CRC32 of `bytes`.
    pub fn of(bytes: &[u8]) -> Self {
        Self(crc32fast::hash(bytes))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl From<u32> for Crc32 {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for Crc32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}

impl FromStr for Crc32 {
    type Err = CatalogError;

    /// Parses exactly 8 hex digits. Lowercase input is accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 8 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CatalogError::InvalidChecksum(s.to_string()));
        }

        u32::from_str_radix(s, 16)
            .map(Self)
            .map_err(|_| CatalogError::InvalidChecksum(s.to_string()))
    }
}

impl Serialize for Crc32 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Crc32 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct Crc32Visitor;

        impl de::Visitor<'_> for Crc32Visitor {
            type Value = Crc32;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a CRC32 as 8 hexadecimal digits")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(Crc32Visitor)
    }
}
