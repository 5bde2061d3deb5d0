//! Numeric canonicalization.
//!
//! Thresholds and amounts reach this layer as decimal strings, plain
//! numbers or big integers. Every equality check and every encode goes
//! through [`normalize`], which maps all of them to one [`Uint256`].

use ethnum::U256;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::NumericError;
use crate::primitives::Width;

/// Canonical unsigned 256-bit integer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Uint256(pub U256);

impl Uint256 {
    pub const ZERO: Self = Self(U256::ZERO);
    pub const MAX: Self = Self(U256::MAX);

    /// Number of significant bits.
    pub fn bits(&self) -> u32 {
        256 - self.0.leading_zeros()
    }

    /// True if the value fits in `width`.
    pub fn fits(&self, width: Width) -> bool {
        self.bits() <= width.bits()
    }

    /// Little-endian bytes truncated to `width`. Callers check [`fits`] first.
    ///
    /// [`fits`]: Uint256::fits
    pub fn to_le_bytes(&self, width: Width) -> Vec<u8> {
        self.0.to_le_bytes()[..width.bytes()].to_vec()
    }

    /// Read little-endian bytes of any length up to 32.
    pub fn from_le_slice(slice: &[u8]) -> Self {
        let mut arr = [0u8; 32];
        arr[..slice.len()].copy_from_slice(slice);
        Self(U256::from_le_bytes(arr))
    }

    /// Narrow to `u128`.
    pub fn to_u128(&self) -> Result<u128, NumericError> {
        self.narrow(Width::U128).map(|v| v.0.as_u128())
    }

    /// Narrow to `u64`.
    pub fn to_u64(&self) -> Result<u64, NumericError> {
        self.narrow(Width::U64).map(|v| v.0.as_u64())
    }

    /// Narrow to `u32`.
    pub fn to_u32(&self) -> Result<u32, NumericError> {
        self.narrow(Width::U32).map(|v| v.0.as_u32())
    }

    /// Narrow to `u8`.
    pub fn to_u8(&self) -> Result<u8, NumericError> {
        self.narrow(Width::U8).map(|v| v.0.as_u8())
    }

    fn narrow(&self, width: Width) -> Result<Self, NumericError> {
        if self.fits(width) {
            Ok(*self)
        } else {
            Err(NumericError::TooWide {
                value: self.to_string(),
                bits: width.bits(),
            })
        }
    }
}

impl fmt::Debug for Uint256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uint256({})", self.0)
    }
}

impl fmt::Display for Uint256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u8> for Uint256 {
    fn from(n: u8) -> Self {
        Self(U256::from(n))
    }
}

impl From<u32> for Uint256 {
    fn from(n: u32) -> Self {
        Self(U256::from(n))
    }
}

impl From<u64> for Uint256 {
    fn from(n: u64) -> Self {
        Self(U256::from(n))
    }
}

impl From<u128> for Uint256 {
    fn from(n: u128) -> Self {
        Self(U256::new(n))
    }
}

impl From<U256> for Uint256 {
    fn from(n: U256) -> Self {
        Self(n)
    }
}

impl Serialize for Uint256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Uint256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let input = Numeric::deserialize(deserializer)?;
        normalize(&input).map_err(de::Error::custom)
    }
}

/// A numeric value as the application supplied it.
#[derive(Debug, Clone, PartialEq)]
pub enum Numeric {
    /// Decimal (or `0x` hex) text, e.g. `"100000000000"`.
    Text(String),
    /// A plain signed number.
    Number(i128),
    /// A floating-point number, accepted only when integral.
    Float(f64),
    /// An already-big integer.
    BigInt(Uint256),
}

impl From<&str> for Numeric {
    fn from(s: &str) -> Self {
        Numeric::Text(s.to_string())
    }
}

impl From<String> for Numeric {
    fn from(s: String) -> Self {
        Numeric::Text(s)
    }
}

impl From<i64> for Numeric {
    fn from(n: i64) -> Self {
        Numeric::Number(n.into())
    }
}

impl From<u64> for Numeric {
    fn from(n: u64) -> Self {
        Numeric::Number(n.into())
    }
}

impl From<u128> for Numeric {
    fn from(n: u128) -> Self {
        Numeric::BigInt(n.into())
    }
}

impl From<Uint256> for Numeric {
    fn from(n: Uint256) -> Self {
        Numeric::BigInt(n)
    }
}

impl Serialize for Numeric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Numeric::Text(s) => serializer.serialize_str(s),
            Numeric::Number(n) => serializer.serialize_str(&n.to_string()),
            Numeric::Float(f) => serializer.serialize_f64(*f),
            Numeric::BigInt(n) => n.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Numeric {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NumericVisitor;

        impl<'de> Visitor<'de> for NumericVisitor {
            type Value = Numeric;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an unsigned integer as a number or a string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Numeric, E> {
                Ok(Numeric::Number(v.into()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Numeric, E> {
                Ok(Numeric::Number(v.into()))
            }

            fn visit_u128<E: de::Error>(self, v: u128) -> Result<Numeric, E> {
                Ok(Numeric::BigInt(v.into()))
            }

            fn visit_i128<E: de::Error>(self, v: i128) -> Result<Numeric, E> {
                Ok(Numeric::Number(v))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Numeric, E> {
                Ok(Numeric::Float(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Numeric, E> {
                Ok(Numeric::Text(v.to_string()))
            }
        }

        deserializer.deserialize_any(NumericVisitor)
    }
}

/// Normalize any numeric representation to a canonical [`Uint256`].
///
/// Text accepts optional surrounding whitespace, an optional trailing `n`
/// (big-integer literal suffix) and an optional `0x` prefix for hex.
pub fn normalize(input: &Numeric) -> Result<Uint256, NumericError> {
    match input {
        Numeric::BigInt(n) => Ok(*n),
        Numeric::Number(n) => {
            if *n < 0 {
                return Err(NumericError::Negative(n.to_string()));
            }
            Ok(Uint256::from(*n as u128))
        }
        Numeric::Float(f) => {
            if *f < 0.0 {
                return Err(NumericError::Negative(f.to_string()));
            }
            if !f.is_finite() || f.fract() != 0.0 {
                return Err(NumericError::Fractional(f.to_string()));
            }
            // Integral f64 above 2^53 is already imprecise; reject instead of guessing.
            if *f > 9_007_199_254_740_991.0 {
                return Err(NumericError::Fractional(f.to_string()));
            }
            Ok(Uint256::from(*f as u64))
        }
        Numeric::Text(s) => parse_text(s),
    }
}

/// Normalize and require the value to fit in `width`.
pub fn normalize_to_width(input: &Numeric, width: Width) -> Result<Uint256, NumericError> {
    let value = normalize(input)?;
    if !value.fits(width) {
        return Err(NumericError::TooWide {
            value: value.to_string(),
            bits: width.bits(),
        });
    }
    Ok(value)
}

fn parse_text(raw: &str) -> Result<Uint256, NumericError> {
    let s = raw.trim();
    let s = s.strip_suffix('n').unwrap_or(s);
    if s.starts_with('-') {
        return Err(NumericError::Negative(raw.to_string()));
    }
    if s.is_empty() {
        return Err(NumericError::Unparsable(raw.to_string()));
    }
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) if !hex.is_empty() => U256::from_str_radix(hex, 16),
        Some(_) => return Err(NumericError::Unparsable(raw.to_string())),
        None => {
            if s.contains('.') {
                return Err(NumericError::Fractional(raw.to_string()));
            }
            U256::from_str_radix(s, 10)
        }
    };
    parsed
        .map(Uint256)
        .map_err(|_| NumericError::Unparsable(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_number_and_bigint_agree() {
        let a = normalize(&Numeric::from("100000000000")).unwrap();
        let b = normalize(&Numeric::from(100_000_000_000u64)).unwrap();
        let c = normalize(&Numeric::from(100_000_000_000u128)).unwrap();
        let d = normalize(&Numeric::from("100000000000n")).unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(c, d);
    }

    #[test]
    fn test_hex_text() {
        let v = normalize(&Numeric::from("0xff")).unwrap();
        assert_eq!(v, Uint256::from(255u64));
    }

    #[test]
    fn test_negative_rejected() {
        assert!(matches!(
            normalize(&Numeric::from(-1i64)),
            Err(NumericError::Negative(_))
        ));
        assert!(matches!(
            normalize(&Numeric::from("-5")),
            Err(NumericError::Negative(_))
        ));
    }

    #[test]
    fn test_fractional_rejected() {
        assert!(matches!(
            normalize(&Numeric::Float(1.5)),
            Err(NumericError::Fractional(_))
        ));
        assert!(matches!(
            normalize(&Numeric::from("1.0")),
            Err(NumericError::Fractional(_))
        ));
        assert_eq!(normalize(&Numeric::Float(42.0)).unwrap(), Uint256::from(42u64));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(normalize(&Numeric::from("")).is_err());
        assert!(normalize(&Numeric::from("12abc")).is_err());
        assert!(normalize(&Numeric::from("0x")).is_err());
    }

    #[test]
    fn test_width_check() {
        let max128 = Numeric::from(u128::MAX);
        assert!(normalize_to_width(&max128, Width::U128).is_ok());
        assert!(matches!(
            normalize_to_width(&max128, Width::U64),
            Err(NumericError::TooWide { bits: 64, .. })
        ));
    }

    #[test]
    fn test_narrowing() {
        let v = Uint256::from(2_592_000u64);
        assert_eq!(v.to_u64().unwrap(), 2_592_000);
        assert_eq!(v.to_u32().unwrap(), 2_592_000);
        assert!(v.to_u8().is_err());
    }

    #[test]
    fn test_le_bytes_roundtrip() {
        let v = Uint256::from(0x0102_0304u64);
        let bytes = v.to_le_bytes(Width::U64);
        assert_eq!(bytes, vec![4, 3, 2, 1, 0, 0, 0, 0]);
        assert_eq!(Uint256::from_le_slice(&bytes), v);
    }

    #[test]
    fn test_serde_forms() {
        let from_number: Numeric = serde_json::from_str("2592000").unwrap();
        let from_text: Numeric = serde_json::from_str("\"2592000\"").unwrap();
        assert_eq!(normalize(&from_number).unwrap(), normalize(&from_text).unwrap());

        let canonical: Uint256 = serde_json::from_str("\"500000000000\"").unwrap();
        assert_eq!(serde_json::to_string(&canonical).unwrap(), "\"500000000000\"");
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn text_and_number_forms_normalize_equal(n in any::<u64>()) {
                let text = normalize(&Numeric::from(n.to_string())).unwrap();
                let suffixed = normalize(&Numeric::from(format!("{}n", n))).unwrap();
                let number = normalize(&Numeric::from(n)).unwrap();
                prop_assert_eq!(text, number);
                prop_assert_eq!(suffixed, number);
            }

            #[test]
            fn le_bytes_roundtrip_u128(n in any::<u128>()) {
                let v = Uint256::from(n);
                let bytes = v.to_le_bytes(Width::U128);
                prop_assert_eq!(bytes.len(), 16);
                prop_assert_eq!(Uint256::from_le_slice(&bytes), v);
            }
        }
    }
}
