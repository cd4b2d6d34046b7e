//! Entry hash newtype
//!
//! 32-byte SHA-256 digest rendered as lowercase hex on every serialized
//! surface. The genesis constant (all zeroes) anchors the first entry.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA-256 digest linking audit entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryHash([u8; 32]);

impl EntryHash {
    /// Previous hash of the first entry in every chain.
    pub const GENESIS: EntryHash = EntryHash([0u8; 32]);

    /// Digest arbitrary bytes.
    pub fn digest(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        EntryHash(hasher.finalize().into())
    }

    /// Wrap an existing 32-byte digest.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        EntryHash(bytes)
    }

    /// Parse a 64-character lowercase hex string.
    pub fn from_hex(s: &str) -> Option<Self> {
        let decoded = hex::decode(s).ok()?;
        let bytes: [u8; 32] = decoded.try_into().ok()?;
        Some(EntryHash(bytes))
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for EntryHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for EntryHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for EntryHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        EntryHash::from_hex(&s).ok_or_else(|| D::Error::custom("invalid entry hash"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genesis_is_all_zeroes() {
        assert_eq!(EntryHash::GENESIS.as_bytes(), &[0u8; 32]);
        assert_eq!(EntryHash::GENESIS.to_hex(), "0".repeat(64));
    }

    #[test]
    fn test_digest_is_deterministic() {
        let a = EntryHash::digest(b"observation");
        let b = EntryHash::digest(b"observation");
        assert_eq!(a, b);
        assert_ne!(a, EntryHash::digest(b"observation!"));
    }

    #[test]
    fn test_hex_round_trip() {
        let h = EntryHash::digest(b"round trip");
        let parsed = EntryHash::from_hex(&h.to_hex()).unwrap();
        assert_eq!(h, parsed);
        assert!(EntryHash::from_hex("zz").is_none());
    }

    #[test]
    fn test_serde_round_trip() {
        let h = EntryHash::digest(b"serde");
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, format!("\"{}\"", h.to_hex()));
        let back: EntryHash = serde_json::from_str(&json).unwrap();
        assert_eq!(h, back);
    }
}
