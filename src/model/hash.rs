//! 256-bit node identifier

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A 32-byte hash identifying a tree node by its content
///
/// Equal hashes imply equal nodes and, for inner nodes, equal subtrees. The
/// diff engine relies on nothing else when it prunes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Hash256([u8; 32]);

impl Hash256 {
    /// The zero hash, used for empty child slots when hashing inner nodes
    pub const ZERO: Hash256 = Hash256([0u8; 32]);

    /// Create a hash from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Hash256(bytes)
    }

    /// Hash arbitrary data
    pub fn digest(data: &[u8]) -> Self {
        Hash256(*blake3::hash(data).as_bytes())
    }

    /// Hash multiple pieces of data
    pub fn digest_many(parts: &[&[u8]]) -> Self {
        let mut hasher = blake3::Hasher::new();
        for part in parts {
            hasher.update(part);
        }
        Hash256(*hasher.finalize().as_bytes())
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Uppercase hex, no prefix. This is the form used in rendered diffs.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }

    /// Parse from hex string (either case)
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut arr = [0u8; 32];
        hex::decode_to_slice(s.trim(), &mut arr)?;
        Ok(Hash256(arr))
    }

    /// The 4-bit branch index at `depth` (high nibble first)
    pub fn nibble(&self, depth: usize) -> usize {
        let byte = self.0[depth / 2];
        if depth % 2 == 0 {
            (byte >> 4) as usize
        } else {
            (byte & 0x0f) as usize
        }
    }

    /// First 8 hex chars, for log lines
    pub fn short(&self) -> String {
        self.to_hex()[..8].to_string()
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash256({})", self.short())
    }
}

impl Default for Hash256 {
    fn default() -> Self {
        Hash256::ZERO
    }
}

impl AsRef<[u8]> for Hash256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for Hash256 {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hash256::from_hex(s).map_err(|e| crate::Error::InvalidHash(format!("{}: {}", s, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_is_uppercase() {
        let h = Hash256::digest(b"ledger");
        let hex = h.to_hex();
        assert_eq!(hex.len(), 64);
        assert_eq!(hex, hex.to_uppercase());
    }

    #[test]
    fn test_parse_accepts_lowercase() {
        let text = "2c23d15b6b549123fb351e4b5cde81c564318eb845449cd43c3ea7953c4db452";
        let h: Hash256 = text.parse().unwrap();
        assert_eq!(h.to_hex(), text.to_uppercase());
    }

    #[test]
    fn test_parse_rejects_short_input() {
        let err = "2C23D15B".parse::<Hash256>().unwrap_err();
        assert!(matches!(err, crate::Error::InvalidHash(_)));
    }

    #[test]
    fn test_nibbles() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0xAB;
        bytes[1] = 0x3F;
        let h = Hash256::from_bytes(bytes);
        assert_eq!(h.nibble(0), 0xA);
        assert_eq!(h.nibble(1), 0xB);
        assert_eq!(h.nibble(2), 0x3);
        assert_eq!(h.nibble(3), 0xF);
        assert_eq!(h.nibble(63), 0);
    }
}
