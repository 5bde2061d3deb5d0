//! Encode and decode values against registered schemas.
//!
//! Wire format (all numbers little-endian `u32` unless stated):
//!
//! ```text
//! struct   field_1 || field_2 || ... (no header)
//! table    total_size || offset_1 .. offset_n || field_1 .. field_n
//! fixvec   item_count || item_1 .. item_n          (fixed-width items)
//! dynvec   total_size || offset_1 .. offset_n || item_1 .. item_n
//! Bytes    length || raw bytes
//! option   nothing (absent) | inner encoding (present)
//! ```
//!
//! Offsets are relative to the start of the enclosing table/dynvec. An
//! empty table or dynvec is the single word `4`.
//!
//! Decoding is all-or-nothing: the first malformed slice aborts the whole
//! decode and no partial value escapes.

use bytes::Bytes;

use crate::error::{CodecError, Result};
use crate::numeric::Uint256;
use crate::primitives::{put_len, read_u32, NUMBER_SIZE};
use crate::registry::SchemaRegistry;
use crate::schema::{FieldType, Layout};
use crate::value::Value;

impl SchemaRegistry {
    /// Encode a value as the named schema.
    pub fn encode(&self, schema: &str, value: &Value) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.encode_composite(schema, value, &mut out)?;
        Ok(out)
    }

    /// Decode bytes as the named schema.
    pub fn decode(&self, schema: &str, bytes: &[u8]) -> Result<Value> {
        self.decode_composite(schema, bytes)
    }

    /// Encode a standalone field type (outside any schema).
    pub fn encode_type(&self, ty: &FieldType, value: &Value) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.encode_field(ty, value, &ty.describe(), &mut out)?;
        Ok(out)
    }

    /// Decode a standalone field type (outside any schema).
    pub fn decode_type(&self, ty: &FieldType, bytes: &[u8]) -> Result<Value> {
        self.decode_field(ty, bytes, &ty.describe())
    }

    fn encode_composite(&self, name: &str, value: &Value, out: &mut Vec<u8>) -> Result<()> {
        let resolved = self.resolved(name)?;
        let schema = &resolved.schema;

        let fields = match value {
            Value::Record(fields) => fields,
            other => {
                return Err(CodecError::shape(
                    name,
                    format!("record, got {}", other.kind()),
                ))
            }
        };
        if fields.len() != schema.fields.len() {
            return Err(CodecError::shape(
                name,
                format!("{} fields, got {}", schema.fields.len(), fields.len()),
            ));
        }

        match schema.layout {
            Layout::Struct => {
                for (field, value) in schema.fields.iter().zip(fields) {
                    let context = format!("{}.{}", name, field.name);
                    self.encode_field(&field.ty, value, &context, out)?;
                }
                Ok(())
            }
            Layout::Table => {
                let mut parts = Vec::with_capacity(fields.len());
                for (field, value) in schema.fields.iter().zip(fields) {
                    let context = format!("{}.{}", name, field.name);
                    let mut part = Vec::new();
                    self.encode_field(&field.ty, value, &context, &mut part)?;
                    parts.push(part);
                }
                write_offset_indexed(&parts, name, out)
            }
        }
    }

    fn encode_field(
        &self,
        ty: &FieldType,
        value: &Value,
        context: &str,
        out: &mut Vec<u8>,
    ) -> Result<()> {
        match (ty, value) {
            (FieldType::Primitive(width), Value::Uint(n)) => {
                if !n.fits(*width) {
                    return Err(CodecError::range(
                        context,
                        format!("{} does not fit in {}", n, width.name()),
                    ));
                }
                out.extend_from_slice(&n.to_le_bytes(*width));
                Ok(())
            }
            (FieldType::FixedBytes(len), Value::Fixed(bytes)) => {
                if bytes.len() != *len {
                    return Err(CodecError::range(
                        context,
                        format!("expected {} bytes, got {}", len, bytes.len()),
                    ));
                }
                out.extend_from_slice(bytes);
                Ok(())
            }
            (FieldType::VarBytes, Value::Bytes(bytes)) => {
                put_len(out, bytes.len(), context)?;
                out.extend_from_slice(bytes);
                Ok(())
            }
            (FieldType::Vector(element), Value::Vector(items)) => {
                if self.fixed_size(element).is_some() {
                    put_len(out, items.len(), context)?;
                    for item in items {
                        self.encode_field(element, item, context, out)?;
                    }
                    Ok(())
                } else {
                    let mut parts = Vec::with_capacity(items.len());
                    for item in items {
                        let mut part = Vec::new();
                        self.encode_field(element, item, context, &mut part)?;
                        parts.push(part);
                    }
                    write_offset_indexed(&parts, context, out)
                }
            }
            (FieldType::Option(inner), Value::Option(opt)) => match opt {
                Some(value) => self.encode_field(inner, value, context, out),
                None => Ok(()),
            },
            (FieldType::Composite(name), value) => self.encode_composite(name, value, out),
            (ty, value) => Err(CodecError::shape(
                context,
                format!("{}, got {}", ty.describe(), value.kind()),
            )),
        }
    }

    fn decode_composite(&self, name: &str, buf: &[u8]) -> Result<Value> {
        let resolved = self.resolved(name)?;
        let schema = &resolved.schema;

        match schema.layout {
            Layout::Struct => {
                let size = resolved.fixed_size.unwrap_or_default();
                if buf.len() != size {
                    return Err(CodecError::layout(
                        name,
                        format!("struct expects {} bytes, got {}", size, buf.len()),
                    ));
                }
                let mut fields = Vec::with_capacity(schema.fields.len());
                let mut pos = 0;
                for field in &schema.fields {
                    let width = self.fixed_size(&field.ty).unwrap_or_default();
                    let context = format!("{}.{}", name, field.name);
                    fields.push(self.decode_field(&field.ty, &buf[pos..pos + width], &context)?);
                    pos += width;
                }
                Ok(Value::Record(fields))
            }
            Layout::Table => {
                let parts = split_offset_indexed(buf, name)?;
                if parts.len() != schema.fields.len() {
                    return Err(CodecError::layout(
                        name,
                        format!(
                            "table expects {} fields, found {}",
                            schema.fields.len(),
                            parts.len()
                        ),
                    ));
                }
                let mut fields = Vec::with_capacity(parts.len());
                for (field, part) in schema.fields.iter().zip(parts) {
                    let context = format!("{}.{}", name, field.name);
                    fields.push(self.decode_field(&field.ty, part, &context)?);
                }
                Ok(Value::Record(fields))
            }
        }
    }

    fn decode_field(&self, ty: &FieldType, buf: &[u8], context: &str) -> Result<Value> {
        match ty {
            FieldType::Primitive(width) => {
                if buf.len() != width.bytes() {
                    return Err(CodecError::layout(
                        context,
                        format!("{} expects {} bytes, got {}", width.name(), width.bytes(), buf.len()),
                    ));
                }
                Ok(Value::Uint(Uint256::from_le_slice(buf)))
            }
            FieldType::FixedBytes(len) => {
                if buf.len() != *len {
                    return Err(CodecError::layout(
                        context,
                        format!("expected {} bytes, got {}", len, buf.len()),
                    ));
                }
                Ok(Value::Fixed(Bytes::copy_from_slice(buf)))
            }
            FieldType::VarBytes => {
                let len = read_u32(buf, 0, context)?;
                if buf.len() - NUMBER_SIZE != len {
                    return Err(CodecError::layout(
                        context,
                        format!("bytes header says {}, body has {}", len, buf.len() - NUMBER_SIZE),
                    ));
                }
                Ok(Value::Bytes(Bytes::copy_from_slice(&buf[NUMBER_SIZE..])))
            }
            FieldType::Vector(element) => match self.fixed_size(element) {
                Some(item_size) => {
                    let count = read_u32(buf, 0, context)?;
                    if item_size == 0 && count > 0 {
                        return Err(CodecError::layout(
                            context,
                            format!("fixvec claims {} zero-width items", count),
                        ));
                    }
                    let expected = count
                        .checked_mul(item_size)
                        .and_then(|n| n.checked_add(NUMBER_SIZE))
                        .ok_or_else(|| CodecError::layout(context, "item count overflow"))?;
                    if buf.len() != expected {
                        return Err(CodecError::layout(
                            context,
                            format!(
                                "fixvec of {} items expects {} bytes, got {}",
                                count,
                                expected,
                                buf.len()
                            ),
                        ));
                    }
                    let mut items = Vec::with_capacity(count.min(buf.len()));
                    for i in 0..count {
                        let start = NUMBER_SIZE + i * item_size;
                        items.push(self.decode_field(
                            element,
                            &buf[start..start + item_size],
                            context,
                        )?);
                    }
                    Ok(Value::Vector(items))
                }
                None => {
                    let parts = split_offset_indexed(buf, context)?;
                    let mut items = Vec::with_capacity(parts.len());
                    for part in parts {
                        items.push(self.decode_field(element, part, context)?);
                    }
                    Ok(Value::Vector(items))
                }
            },
            FieldType::Option(inner) => {
                if buf.is_empty() {
                    Ok(Value::Option(None))
                } else {
                    let value = self.decode_field(inner, buf, context)?;
                    Ok(Value::Option(Some(Box::new(value))))
                }
            }
            FieldType::Composite(name) => self.decode_composite(name, buf),
        }
    }
}

/// Write `total_size || offsets || parts`.
fn write_offset_indexed(parts: &[Vec<u8>], context: &str, out: &mut Vec<u8>) -> Result<()> {
    let header = NUMBER_SIZE * (parts.len() + 1);
    let body: usize = parts.iter().map(Vec::len).sum();
    put_len(out, header + body, context)?;

    let mut offset = header;
    for part in parts {
        put_len(out, offset, context)?;
        offset += part.len();
    }
    for part in parts {
        out.extend_from_slice(part);
    }
    Ok(())
}

/// Split a table/dynvec body into its parts, validating the header.
fn split_offset_indexed<'a>(buf: &'a [u8], context: &str) -> Result<Vec<&'a [u8]>> {
    let total = read_u32(buf, 0, context)?;
    if total != buf.len() {
        return Err(CodecError::layout(
            context,
            format!("total_size {} does not match buffer length {}", total, buf.len()),
        ));
    }
    if total == NUMBER_SIZE {
        return Ok(Vec::new());
    }

    let first = read_u32(buf, NUMBER_SIZE, context)?;
    if first % NUMBER_SIZE != 0 || first < NUMBER_SIZE * 2 {
        return Err(CodecError::layout(
            context,
            format!("invalid first offset {}", first),
        ));
    }
    if first > total {
        return Err(CodecError::layout(
            context,
            format!("header size {} exceeds total_size {}", first, total),
        ));
    }

    let count = first / NUMBER_SIZE - 1;
    let mut offsets = Vec::with_capacity(count);
    for i in 0..count {
        let offset = read_u32(buf, NUMBER_SIZE * (i + 1), context)?;
        if offset > total {
            return Err(CodecError::layout(
                context,
                format!("offset {} points past end ({})", offset, total),
            ));
        }
        if let Some(&prev) = offsets.last() {
            if offset < prev {
                return Err(CodecError::layout(
                    context,
                    format!("offsets out of order: {} after {}", offset, prev),
                ));
            }
        }
        offsets.push(offset);
    }

    let mut parts = Vec::with_capacity(count);
    for (i, &start) in offsets.iter().enumerate() {
        let end = offsets.get(i + 1).copied().unwrap_or(total);
        parts.push(&buf[start..end]);
    }
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{Byte32, Width};
    use crate::schema::Schema;

    fn registry() -> SchemaRegistry {
        let mut r = SchemaRegistry::new();
        r.register_all([
            Schema::table("Script")
                .field("code_hash", FieldType::BYTE32)
                .field("hash_type", FieldType::BYTE)
                .field("args", FieldType::VarBytes),
            Schema::structure("OutPoint")
                .field("tx_hash", FieldType::BYTE32)
                .field("index", FieldType::UINT32),
            Schema::table("TippingConfig")
                .field(
                    "approval_requirement_thresholds",
                    FieldType::vector(FieldType::UINT128),
                )
                .field("expiration_duration", FieldType::UINT64),
            Schema::table("Holder")
                .field("scripts", FieldType::vector(FieldType::Composite("Script")))
                .field("maybe", FieldType::option(FieldType::BYTE32))
                .field("points", FieldType::vector(FieldType::Composite("OutPoint")))
                .field("wide", FieldType::UINT256),
            Schema::table("Empty"),
        ])
        .unwrap();
        r
    }

    fn script(byte: u8, args: &[u8]) -> Value {
        Value::record(vec![
            Value::byte32(&Byte32::from_bytes([byte; 32])),
            Value::uint(1u8),
            Value::bytes(args.to_vec()),
        ])
    }

    #[test]
    fn test_script_exact_bytes() {
        let r = registry();
        let bytes = r.encode("Script", &script(0x11, &[0xaa, 0xbb])).unwrap();

        // header: total 4 + 3 offsets
        assert_eq!(&bytes[0..4], &(16u32 + 32 + 1 + 6).to_le_bytes());
        assert_eq!(&bytes[4..8], &16u32.to_le_bytes());
        assert_eq!(&bytes[8..12], &48u32.to_le_bytes());
        assert_eq!(&bytes[12..16], &49u32.to_le_bytes());
        assert_eq!(&bytes[16..48], &[0x11; 32]);
        assert_eq!(bytes[48], 1);
        assert_eq!(&bytes[49..], &[2, 0, 0, 0, 0xaa, 0xbb]);
    }

    #[test]
    fn test_struct_exact_bytes() {
        let r = registry();
        let value = Value::record(vec![
            Value::byte32(&Byte32::from_bytes([0x22; 32])),
            Value::uint(7u32),
        ]);
        let bytes = r.encode("OutPoint", &value).unwrap();
        assert_eq!(bytes.len(), 36);
        assert_eq!(&bytes[32..], &[7, 0, 0, 0]);
        assert_eq!(r.decode("OutPoint", &bytes).unwrap(), value);
    }

    #[test]
    fn test_tipping_config_roundtrip() {
        let r = registry();
        let value = Value::record(vec![
            Value::vector(vec![
                Value::uint(100_000_000_000u128),
                Value::uint(500_000_000_000u128),
            ]),
            Value::uint(2_592_000u64),
        ]);
        let bytes = r.encode("TippingConfig", &value).unwrap();
        // 12 header + (4 + 32) fixvec + 8
        assert_eq!(bytes.len(), 56);
        assert_eq!(r.decode("TippingConfig", &bytes).unwrap(), value);
    }

    #[test]
    fn test_empty_vectors_and_absent_option() {
        let r = registry();
        let value = Value::record(vec![
            Value::vector(vec![]),
            Value::option(None),
            Value::vector(vec![]),
            Value::uint(0u8),
        ]);
        let bytes = r.encode("Holder", &value).unwrap();
        // header 20 + empty dynvec 4 + option 0 + empty fixvec 4 + 32
        assert_eq!(bytes.len(), 60);
        assert_eq!(&bytes[20..24], &4u32.to_le_bytes());
        assert_eq!(r.decode("Holder", &bytes).unwrap(), value);
    }

    #[test]
    fn test_nested_composites_roundtrip() {
        let r = registry();
        let value = Value::record(vec![
            Value::vector(vec![script(1, b""), script(2, b"xyz")]),
            Value::option(Some(Value::byte32(&Byte32::from_bytes([3; 32])))),
            Value::vector(vec![Value::record(vec![
                Value::byte32(&Byte32::from_bytes([4; 32])),
                Value::uint(9u32),
            ])]),
            Value::Uint(Uint256::MAX),
        ]);
        let bytes = r.encode("Holder", &value).unwrap();
        assert_eq!(r.decode("Holder", &bytes).unwrap(), value);
    }

    #[test]
    fn test_empty_table() {
        let r = registry();
        let bytes = r.encode("Empty", &Value::record(vec![])).unwrap();
        assert_eq!(bytes, vec![4, 0, 0, 0]);
        assert_eq!(r.decode("Empty", &bytes).unwrap(), Value::record(vec![]));
    }

    #[test]
    fn test_range_errors() {
        let r = registry();
        let err = r
            .encode_type(&FieldType::BYTE, &Value::uint(300u32))
            .unwrap_err();
        assert!(err.is_range());

        let err = r
            .encode_type(&FieldType::BYTE32, &Value::Fixed(Bytes::from(vec![0u8; 31])))
            .unwrap_err();
        assert!(err.is_range());

        let max = r
            .encode_type(
                &FieldType::Primitive(Width::U128),
                &Value::Uint(Uint256::from(u128::MAX)),
            )
            .unwrap();
        assert_eq!(max, vec![0xff; 16]);
    }

    #[test]
    fn test_struct_one_byte_short_is_layout_error() {
        let r = registry();
        let value = Value::record(vec![
            Value::byte32(&Byte32::from_bytes([0x22; 32])),
            Value::uint(7u32),
        ]);
        let bytes = r.encode("OutPoint", &value).unwrap();
        let err = r.decode("OutPoint", &bytes[..35]).unwrap_err();
        assert!(err.is_layout());
    }

    #[test]
    fn test_out_of_order_offsets_is_layout_error() {
        let r = registry();
        let mut bytes = r.encode("Script", &script(0x11, &[1])).unwrap();
        // swap offset_2 and offset_3 so offsets decrease
        let o2: [u8; 4] = bytes[8..12].try_into().unwrap();
        let o3: [u8; 4] = bytes[12..16].try_into().unwrap();
        bytes[8..12].copy_from_slice(&o3);
        bytes[12..16].copy_from_slice(&o2);
        assert!(r.decode("Script", &bytes).unwrap_err().is_layout());
    }

    #[test]
    fn test_total_size_larger_than_buffer_is_layout_error() {
        let r = registry();
        let mut bytes = r.encode("Script", &script(0x11, &[1])).unwrap();
        let claimed = (bytes.len() as u32 + 10).to_le_bytes();
        bytes[0..4].copy_from_slice(&claimed);
        assert!(r.decode("Script", &bytes).unwrap_err().is_layout());
    }

    #[test]
    fn test_truncated_buffers_are_layout_errors() {
        let r = registry();
        let bytes = r.encode("Script", &script(0x11, &[1, 2, 3])).unwrap();
        for len in 0..bytes.len() {
            assert!(
                r.decode("Script", &bytes[..len]).unwrap_err().is_layout(),
                "prefix of length {} decoded",
                len
            );
        }
    }

    #[test]
    fn test_wrong_field_count_is_layout_error() {
        let r = registry();
        let bytes = r.encode("Empty", &Value::record(vec![])).unwrap();
        assert!(r.decode("Script", &bytes).unwrap_err().is_layout());
    }

    #[test]
    fn test_var_bytes_length_mismatch() {
        let r = registry();
        let err = r
            .decode_type(&FieldType::VarBytes, &[3, 0, 0, 0, 1, 2])
            .unwrap_err();
        assert!(err.is_layout());
    }

    #[test]
    fn test_fixvec_length_mismatch() {
        let r = registry();
        let ty = FieldType::vector(FieldType::UINT32);
        let err = r.decode_type(&ty, &[2, 0, 0, 0, 1, 0, 0, 0]).unwrap_err();
        assert!(err.is_layout());
    }

    #[test]
    fn test_zero_width_fixvec_count_is_layout_error() {
        let r = registry();
        let ty = FieldType::vector(FieldType::FixedBytes(0));
        let err = r.decode_type(&ty, &[0xff, 0xff, 0xff, 0xff]).unwrap_err();
        assert!(err.is_layout());
        assert_eq!(r.decode_type(&ty, &[0, 0, 0, 0]).unwrap(), Value::Vector(vec![]));
    }

    #[test]
    fn test_shape_mismatch_on_encode() {
        let r = registry();
        let err = r.encode("Script", &Value::uint(1u8)).unwrap_err();
        assert!(matches!(err, CodecError::Shape { .. }));
    }

    #[test]
    fn test_unknown_schema() {
        let r = registry();
        assert!(matches!(
            r.decode("Nope", &[4, 0, 0, 0]),
            Err(CodecError::UnknownSchema(_))
        ));
    }
}
