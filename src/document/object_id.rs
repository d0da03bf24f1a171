//! 12-byte document identifiers with a hex string representation.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

use super::DocumentError;
use crate::constants::object_id::{BYTE_LEN, HEX_LEN};

/// Opaque 12-byte identifier assigned to documents at creation.
///
/// Stored and displayed as a 24-character lowercase hex string; parsing and
/// rendering round-trip exactly.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ObjectId([u8; BYTE_LEN]);

impl ObjectId {
    /// Mints a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        use rand::Rng;

        let mut rng = rand::rng();
        Self(rng.random())
    }

    #[must_use]
    pub const fn from_bytes(bytes: [u8; BYTE_LEN]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn bytes(&self) -> &[u8; BYTE_LEN] {
        &self.0
    }

    /// Parses the 24-character hex form.
    pub fn parse_str(hex: &str) -> Result<Self, DocumentError> {
        if hex.len() != HEX_LEN || !hex.is_ascii() {
            return Err(DocumentError::InvalidId(hex.to_string()));
        }

        let mut bytes = [0u8; BYTE_LEN];
        for (i, chunk) in hex.as_bytes().chunks_exact(2).enumerate() {
            let pair = std::str::from_utf8(chunk)
                .map_err(|_| DocumentError::InvalidId(hex.to_string()))?;
            bytes[i] = u8::from_str_radix(pair, 16)
                .map_err(|_| DocumentError::InvalidId(hex.to_string()))?;
        }

        Ok(Self(bytes))
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        self.0.iter().fold(String::with_capacity(HEX_LEN), |mut acc, b| {
            use std::fmt::Write;
            let _ = write!(acc, "{b:02x}");
            acc
        })
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::parse_str(&hex).map_err(de::Error::custom)
    }
}
