//! Fixed-width primitives and the raw little-endian helpers every layout uses.
//!
//! Molecule primitives are byte arrays: `byte`, `Uint32` (4 bytes),
//! `Uint64` (8), `Uint128` (16), `Uint256` (32) and `Byte32` (32 raw
//! bytes). All integers are little-endian.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::{CodecError, Result};

/// Size of the `u32` words used for lengths, counts and offsets.
pub const NUMBER_SIZE: usize = 4;

/// Width of an unsigned integer primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    U8,
    U32,
    U64,
    U128,
    U256,
}

impl Width {
    /// Encoded size in bytes.
    pub const fn bytes(self) -> usize {
        match self {
            Width::U8 => 1,
            Width::U32 => 4,
            Width::U64 => 8,
            Width::U128 => 16,
            Width::U256 => 32,
        }
    }

    /// Number of representable bits.
    pub const fn bits(self) -> u32 {
        (self.bytes() * 8) as u32
    }

    /// Molecule type name, used in error messages.
    pub const fn name(self) -> &'static str {
        match self {
            Width::U8 => "byte",
            Width::U32 => "Uint32",
            Width::U64 => "Uint64",
            Width::U128 => "Uint128",
            Width::U256 => "Uint256",
        }
    }
}

/// A 32-byte hash or identifier (`Byte32`).
///
/// The all-zero value is the "undeployed" sentinel for code hashes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Byte32(pub [u8; 32]);

impl Byte32 {
    /// The zero hash.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// True if every byte is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Lowercase hex without prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> std::result::Result<Self, hex::FromHexError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Build from a slice, failing with a layout error on a length mismatch.
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        let arr: [u8; 32] = slice.try_into().map_err(|_| {
            CodecError::layout(
                "Byte32",
                format!("expected 32 bytes, got {}", slice.len()),
            )
        })?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for Byte32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Byte32(0x{})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Byte32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl AsRef<[u8]> for Byte32 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Byte32 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Byte32 {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Byte32 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Byte32::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter rendering raw bytes as `0x`-prefixed hex.
pub mod hex_bytes {
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        let s = String::deserialize(deserializer)?;
        let s = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(s).map(Bytes::from).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for vectors of raw byte strings.
pub mod hex_bytes_vec {
    use bytes::Bytes;
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(items: &[Bytes], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(items.len()))?;
        for item in items {
            seq.serialize_element(&format!("0x{}", hex::encode(item)))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Bytes>, D::Error> {
        let raw = Vec::<String>::deserialize(deserializer)?;
        raw.iter()
            .map(|s| {
                let s = s.strip_prefix("0x").unwrap_or(s);
                hex::decode(s).map(Bytes::from).map_err(serde::de::Error::custom)
            })
            .collect()
    }
}

/// Append a `u32` in little-endian.
pub fn put_u32(dst: &mut Vec<u8>, n: u32) {
    dst.extend_from_slice(&n.to_le_bytes());
}

/// Append a length or offset, failing if it exceeds `u32`.
pub fn put_len(dst: &mut Vec<u8>, n: usize, context: &str) -> Result<()> {
    let n = u32::try_from(n)
        .map_err(|_| CodecError::range(context, format!("length {} exceeds u32", n)))?;
    put_u32(dst, n);
    Ok(())
}

/// Read a little-endian `u32` at `pos`.
pub fn read_u32(buf: &[u8], pos: usize, context: &str) -> Result<usize> {
    let end = pos
        .checked_add(NUMBER_SIZE)
        .ok_or_else(|| CodecError::layout(context, "offset overflow"))?;
    let word = buf.get(pos..end).ok_or_else(|| {
        CodecError::layout(
            context,
            format!("truncated: need {} bytes, have {}", end, buf.len()),
        )
    })?;
    let mut arr = [0u8; NUMBER_SIZE];
    arr.copy_from_slice(word);
    Ok(u32::from_le_bytes(arr) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_sizes() {
        assert_eq!(Width::U8.bytes(), 1);
        assert_eq!(Width::U32.bytes(), 4);
        assert_eq!(Width::U64.bytes(), 8);
        assert_eq!(Width::U128.bytes(), 16);
        assert_eq!(Width::U256.bytes(), 32);
        assert_eq!(Width::U128.bits(), 128);
    }

    #[test]
    fn test_byte32_hex_roundtrip() {
        let hash = Byte32::from_bytes([0x42; 32]);
        let hex = hash.to_string();
        assert!(hex.starts_with("0x"));
        assert_eq!(Byte32::from_hex(&hex).unwrap(), hash);
        assert_eq!(Byte32::from_hex(&hash.to_hex()).unwrap(), hash);
    }

    #[test]
    fn test_byte32_rejects_short_hex() {
        let short = "a".repeat(62);
        assert!(Byte32::from_hex(&short).is_err());
    }

    #[test]
    fn test_byte32_zero_sentinel() {
        assert!(Byte32::ZERO.is_zero());
        assert!(!Byte32::from_bytes([1; 32]).is_zero());
    }

    #[test]
    fn test_byte32_serde_as_hex_string() {
        let hash = Byte32::from_bytes([0xab; 32]);
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "ab".repeat(32)));
        let back: Byte32 = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }

    #[test]
    fn test_read_u32_truncated() {
        let err = read_u32(&[1, 0, 0], 0, "test").unwrap_err();
        assert!(err.is_layout());
    }

    #[test]
    fn test_put_and_read_u32() {
        let mut buf = Vec::new();
        put_u32(&mut buf, 0x0102_0304);
        assert_eq!(buf, vec![0x04, 0x03, 0x02, 0x01]);
        assert_eq!(read_u32(&buf, 0, "test").unwrap(), 0x0102_0304);
    }
}
