//! The `Record` trait: one encode/decode pair per domain type.

use bytes::Bytes;
use ckboost_codec::{CodecError, Value};

use crate::registry::registry;

/// A domain type with a registered molecule schema.
///
/// Implementors only describe how to move between themselves and a
/// [`Value`]; byte layout is entirely the registry's job.
pub trait Record: Sized {
    /// Name of the schema in the domain registry.
    const SCHEMA: &'static str;

    /// Convert to a value tree (fields in declaration order).
    fn to_value(&self) -> Value;

    /// Rebuild from a value tree produced by the registry.
    fn from_value(value: Value) -> Result<Self, CodecError>;

    /// Encode to molecule bytes.
    fn encode(&self) -> Result<Vec<u8>, CodecError> {
        registry()?.encode(Self::SCHEMA, &self.to_value())
    }

    /// Decode from molecule bytes. All-or-nothing.
    fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        Self::from_value(registry()?.decode(Self::SCHEMA, bytes)?)
    }

    /// Serialize to a flat byte buffer.
    fn to_bytes(&self) -> Result<Bytes, CodecError> {
        self.encode().map(Bytes::from)
    }
}

/// Value for a vector of records.
pub(crate) fn records<T: Record>(items: &[T]) -> Value {
    Value::vector(items.iter().map(T::to_value))
}

/// Value for a vector of raw byte strings.
pub(crate) fn byte_strings(items: &[Bytes]) -> Value {
    Value::vector(items.iter().cloned().map(Value::Bytes))
}

/// Value for a vector of hashes.
pub(crate) fn hashes(items: &[ckboost_codec::Byte32]) -> Value {
    Value::vector(items.iter().map(Value::byte32))
}
