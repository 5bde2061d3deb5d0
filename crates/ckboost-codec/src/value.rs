//! The untyped value tree that sits between typed records and bytes.
//!
//! Typed records convert to a [`Value`] and the registry encodes that
//! against a named schema; decoding goes the other way. A composite is a
//! [`Value::Record`] whose fields appear in declaration order.

use bytes::Bytes;

use crate::error::{CodecError, Result};
use crate::numeric::Uint256;
use crate::primitives::Byte32;

/// A decoded (or to-be-encoded) molecule value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Any unsigned integer primitive.
    Uint(Uint256),
    /// Fixed-length raw bytes (`Byte32` and friends).
    Fixed(Bytes),
    /// Length-prefixed raw bytes.
    Bytes(Bytes),
    /// Vector of values, all of the element type.
    Vector(Vec<Value>),
    /// Optional value.
    Option(Option<Box<Value>>),
    /// Struct or table fields in declaration order.
    Record(Vec<Value>),
}

impl Value {
    /// A short name for the variant, used in shape errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Uint(_) => "uint",
            Value::Fixed(_) => "fixed bytes",
            Value::Bytes(_) => "bytes",
            Value::Vector(_) => "vector",
            Value::Option(_) => "option",
            Value::Record(_) => "record",
        }
    }

    /// Wrap a `Byte32`.
    pub fn byte32(hash: &Byte32) -> Self {
        Value::Fixed(Bytes::copy_from_slice(hash.as_bytes()))
    }

    /// Wrap a byte string.
    pub fn bytes(data: impl Into<Bytes>) -> Self {
        Value::Bytes(data.into())
    }

    /// Wrap an unsigned integer.
    pub fn uint(n: impl Into<Uint256>) -> Self {
        Value::Uint(n.into())
    }

    /// Build a vector from an iterator of values.
    pub fn vector<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Value::Vector(items.into_iter().collect())
    }

    /// Wrap an optional value.
    pub fn option(inner: Option<Value>) -> Self {
        Value::Option(inner.map(Box::new))
    }

    /// Build a record from its fields in declaration order.
    pub fn record(fields: Vec<Value>) -> Self {
        Value::Record(fields)
    }

    pub fn into_uint(self, context: &str) -> Result<Uint256> {
        match self {
            Value::Uint(n) => Ok(n),
            other => Err(mismatch(context, "uint", &other)),
        }
    }

    pub fn into_u8(self, context: &str) -> Result<u8> {
        self.into_uint(context)?
            .to_u8()
            .map_err(|e| CodecError::range(context, e.to_string()))
    }

    pub fn into_u32(self, context: &str) -> Result<u32> {
        self.into_uint(context)?
            .to_u32()
            .map_err(|e| CodecError::range(context, e.to_string()))
    }

    pub fn into_u64(self, context: &str) -> Result<u64> {
        self.into_uint(context)?
            .to_u64()
            .map_err(|e| CodecError::range(context, e.to_string()))
    }

    pub fn into_u128(self, context: &str) -> Result<u128> {
        self.into_uint(context)?
            .to_u128()
            .map_err(|e| CodecError::range(context, e.to_string()))
    }

    pub fn into_byte32(self, context: &str) -> Result<Byte32> {
        match self {
            Value::Fixed(b) => Byte32::from_slice(&b),
            other => Err(mismatch(context, "Byte32", &other)),
        }
    }

    pub fn into_bytes(self, context: &str) -> Result<Bytes> {
        match self {
            Value::Bytes(b) => Ok(b),
            other => Err(mismatch(context, "bytes", &other)),
        }
    }

    pub fn into_vector(self, context: &str) -> Result<Vec<Value>> {
        match self {
            Value::Vector(items) => Ok(items),
            other => Err(mismatch(context, "vector", &other)),
        }
    }

    pub fn into_option(self, context: &str) -> Result<Option<Value>> {
        match self {
            Value::Option(inner) => Ok(inner.map(|b| *b)),
            other => Err(mismatch(context, "option", &other)),
        }
    }

    /// Open a record for sequential field reads.
    pub fn into_fields(self, schema: &'static str) -> Result<FieldReader> {
        match self {
            Value::Record(fields) => Ok(FieldReader {
                schema,
                fields: fields.into_iter(),
                index: 0,
            }),
            other => Err(mismatch(schema, "record", &other)),
        }
    }
}

fn mismatch(context: &str, expected: &str, got: &Value) -> CodecError {
    CodecError::shape(context, format!("{}, got {}", expected, got.kind()))
}

/// Sequential reader over a record's fields.
///
/// Used by typed records to rebuild themselves from a decoded value.
pub struct FieldReader {
    schema: &'static str,
    fields: std::vec::IntoIter<Value>,
    index: usize,
}

impl FieldReader {
    fn context(&self) -> String {
        format!("{}[{}]", self.schema, self.index)
    }

    /// Take the next raw field value.
    pub fn next_value(&mut self) -> Result<Value> {
        let context = self.context();
        self.index += 1;
        self.fields
            .next()
            .ok_or_else(|| CodecError::shape(context, "another field"))
    }

    pub fn uint(&mut self) -> Result<Uint256> {
        let context = self.context();
        self.next_value()?.into_uint(&context)
    }

    pub fn u8(&mut self) -> Result<u8> {
        let context = self.context();
        self.next_value()?.into_u8(&context)
    }

    pub fn u32(&mut self) -> Result<u32> {
        let context = self.context();
        self.next_value()?.into_u32(&context)
    }

    pub fn u64(&mut self) -> Result<u64> {
        let context = self.context();
        self.next_value()?.into_u64(&context)
    }

    pub fn u128(&mut self) -> Result<u128> {
        let context = self.context();
        self.next_value()?.into_u128(&context)
    }

    pub fn byte32(&mut self) -> Result<Byte32> {
        let context = self.context();
        self.next_value()?.into_byte32(&context)
    }

    pub fn bytes(&mut self) -> Result<Bytes> {
        let context = self.context();
        self.next_value()?.into_bytes(&context)
    }

    /// Read a vector, converting each element with `f`.
    pub fn vector<T, F>(&mut self, mut f: F) -> Result<Vec<T>>
    where
        F: FnMut(Value) -> Result<T>,
    {
        let context = self.context();
        self.next_value()?
            .into_vector(&context)?
            .into_iter()
            .map(&mut f)
            .collect()
    }

    /// Read an option, converting the inner value with `f`.
    pub fn option<T, F>(&mut self, f: F) -> Result<Option<T>>
    where
        F: FnOnce(Value) -> Result<T>,
    {
        let context = self.context();
        self.next_value()?.into_option(&context)?.map(f).transpose()
    }

    /// Read a nested record with its own conversion.
    pub fn record<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(Value) -> Result<T>,
    {
        f(self.next_value()?)
    }

    /// Ensure every field was consumed.
    pub fn finish(mut self) -> Result<()> {
        if self.fields.next().is_some() {
            return Err(CodecError::shape(
                self.schema,
                format!("exactly {} fields", self.index),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_reader_sequence() {
        let value = Value::record(vec![
            Value::uint(7u32),
            Value::byte32(&Byte32::from_bytes([9; 32])),
            Value::bytes(b"hi".to_vec()),
            Value::vector(vec![Value::uint(1u8), Value::uint(2u8)]),
            Value::option(None),
        ]);

        let mut f = value.into_fields("Test").unwrap();
        assert_eq!(f.u32().unwrap(), 7);
        assert_eq!(f.byte32().unwrap(), Byte32::from_bytes([9; 32]));
        assert_eq!(f.bytes().unwrap(), Bytes::from_static(b"hi"));
        assert_eq!(
            f.vector(|v| v.into_uint("elem").map(|n| n.to_u8().unwrap()))
                .unwrap(),
            vec![1, 2]
        );
        assert_eq!(f.option(|v| v.into_bytes("inner")).unwrap(), None);
        f.finish().unwrap();
    }

    #[test]
    fn test_field_reader_reports_missing_field() {
        let mut f = Value::record(vec![]).into_fields("Empty").unwrap();
        let err = f.u32().unwrap_err();
        assert!(matches!(err, CodecError::Shape { .. }));
    }

    #[test]
    fn test_field_reader_rejects_leftover_fields() {
        let f = Value::record(vec![Value::uint(1u8)])
            .into_fields("One")
            .unwrap();
        assert!(f.finish().is_err());
    }

    #[test]
    fn test_narrowing_out_of_range_is_range_error() {
        let mut f = Value::record(vec![Value::uint(300u32)])
            .into_fields("Narrow")
            .unwrap();
        assert!(f.u8().unwrap_err().is_range());
    }

    #[test]
    fn test_kind_mismatch() {
        let err = Value::uint(1u8).into_bytes("ctx").unwrap_err();
        assert!(matches!(err, CodecError::Shape { .. }));
    }
}
