//! Transaction hash type.
//!
//! Hashes are held in display byte order, the order the node prints them in
//! RPC responses. Scripts embed them reversed; see [`TxHash::reversed`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// A 32-byte transaction hash in display byte order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TxHash([u8; 32]);

impl TxHash {
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// The hash with its byte order flipped (internal/script order).
    pub fn reversed(&self) -> [u8; 32] {
        let mut bytes = self.0;
        bytes.reverse();
        bytes
    }

    /// Lowercase hex in display order.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for TxHash {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| TypesError::InvalidHash(format!("{s}: {e}")))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| TypesError::InvalidHash(format!("{s}: expected 32 bytes")))?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "403ba38d8b5c4ad8c1bc1c4c1ecbb5e7d0e6ff0d5d4a91c70b3cfd7b88d3a2d1";

    #[test]
    fn parses_and_displays_lowercase_hex() {
        let hash: TxHash = HASH.to_uppercase().parse().unwrap();
        assert_eq!(hash.to_string(), HASH);
    }

    #[test]
    fn reversed_flips_byte_order() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0xaa;
        bytes[31] = 0x01;
        let reversed = TxHash::new(bytes).reversed();
        assert_eq!(reversed[0], 0x01);
        assert_eq!(reversed[31], 0xaa);
    }

    #[test]
    fn rejects_wrong_length() {
        let err = "abcd".parse::<TxHash>().unwrap_err();
        assert!(matches!(err, TypesError::InvalidHash(_)));
    }

    #[test]
    fn rejects_non_hex() {
        assert!("zz".repeat(32).parse::<TxHash>().is_err());
    }

    #[test]
    fn serializes_as_hex_string() {
        let hash: TxHash = HASH.parse().unwrap();
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{HASH}\""));
    }
}
