//! Schema descriptors: the closed lattice of field types.
//!
//! A [`Schema`] is a named, ordered list of typed fields with a layout.
//! Schemas are plain data; they become usable only after registration in
//! a [`SchemaRegistry`](crate::registry::SchemaRegistry), which resolves
//! composite references and rejects malformed declarations up front.

use crate::primitives::Width;

/// The type of one field (or vector element / option payload).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// Unsigned little-endian integer.
    Primitive(Width),
    /// Exactly `n` raw bytes.
    FixedBytes(usize),
    /// `[u32 length][raw bytes]`.
    VarBytes,
    /// Vector of the element type (fixvec or dynvec chosen by width).
    Vector(Box<FieldType>),
    /// Absent encodes as zero bytes, present as the inner encoding.
    Option(Box<FieldType>),
    /// Another registered schema, by name.
    Composite(&'static str),
}

impl FieldType {
    pub const BYTE: FieldType = FieldType::Primitive(Width::U8);
    pub const UINT32: FieldType = FieldType::Primitive(Width::U32);
    pub const UINT64: FieldType = FieldType::Primitive(Width::U64);
    pub const UINT128: FieldType = FieldType::Primitive(Width::U128);
    pub const UINT256: FieldType = FieldType::Primitive(Width::U256);
    pub const BYTE32: FieldType = FieldType::FixedBytes(32);

    pub fn vector(element: FieldType) -> Self {
        FieldType::Vector(Box::new(element))
    }

    pub fn option(inner: FieldType) -> Self {
        FieldType::Option(Box::new(inner))
    }

    /// Human-readable type name, e.g. `Vec<Byte32>`.
    pub fn describe(&self) -> String {
        match self {
            FieldType::Primitive(w) => w.name().to_string(),
            FieldType::FixedBytes(32) => "Byte32".to_string(),
            FieldType::FixedBytes(n) => format!("Byte{}", n),
            FieldType::VarBytes => "Bytes".to_string(),
            FieldType::Vector(t) => format!("Vec<{}>", t.describe()),
            FieldType::Option(t) => format!("Option<{}>", t.describe()),
            FieldType::Composite(name) => name.to_string(),
        }
    }
}

/// Struct (fixed, headerless) or table (offset-indexed) layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Struct,
    Table,
}

/// One named field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub ty: FieldType,
}

/// A named composite schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub name: &'static str,
    pub layout: Layout,
    pub fields: Vec<Field>,
}

impl Schema {
    /// Start a table schema.
    pub fn table(name: &'static str) -> Self {
        Self {
            name,
            layout: Layout::Table,
            fields: Vec::new(),
        }
    }

    /// Start a struct schema.
    pub fn structure(name: &'static str) -> Self {
        Self {
            name,
            layout: Layout::Struct,
            fields: Vec::new(),
        }
    }

    /// Append a field.
    pub fn field(mut self, name: &'static str, ty: FieldType) -> Self {
        self.fields.push(Field { name, ty });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_preserves_order() {
        let schema = Schema::table("Script")
            .field("code_hash", FieldType::BYTE32)
            .field("hash_type", FieldType::BYTE)
            .field("args", FieldType::VarBytes);

        let names: Vec<_> = schema.fields.iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["code_hash", "hash_type", "args"]);
        assert_eq!(schema.layout, Layout::Table);
    }

    #[test]
    fn test_describe() {
        assert_eq!(FieldType::vector(FieldType::BYTE32).describe(), "Vec<Byte32>");
        assert_eq!(
            FieldType::option(FieldType::Composite("Script")).describe(),
            "Option<Script>"
        );
        assert_eq!(FieldType::UINT128.describe(), "Uint128");
    }
}
