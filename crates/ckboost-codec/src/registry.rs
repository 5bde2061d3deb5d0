//! Schema registration and resolution.
//!
//! Registration is where invalid schemas die: composite references must
//! already be registered (so declarations go leaves first and cycles are
//! impossible), struct fields must all be fixed-width, and options may not
//! wrap anything that can encode to zero bytes. Struct sizes are computed
//! once here and reused by every encode/decode.

use std::collections::{HashMap, HashSet};

use crate::error::{CodecError, Result};
use crate::schema::{FieldType, Layout, Schema};

/// A registered schema plus what was derived from it.
#[derive(Debug, Clone)]
pub(crate) struct Resolved {
    pub(crate) schema: Schema,
    /// Total size for struct layouts.
    pub(crate) fixed_size: Option<usize>,
}

/// The set of schemas a codec can encode and decode.
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    schemas: HashMap<&'static str, Resolved>,
    order: Vec<&'static str>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema after validating it against what is already known.
    pub fn register(&mut self, schema: Schema) -> Result<()> {
        if self.schemas.contains_key(schema.name) {
            return Err(CodecError::schema(schema.name, "already registered"));
        }

        let mut seen = HashSet::new();
        for field in &schema.fields {
            if !seen.insert(field.name) {
                return Err(CodecError::schema(
                    schema.name,
                    format!("duplicate field {}", field.name),
                ));
            }
            let context = format!("{}.{}", schema.name, field.name);
            self.check_type(&field.ty, &context)?;
        }

        let fixed_size = match schema.layout {
            Layout::Table => None,
            Layout::Struct => {
                if schema.fields.is_empty() {
                    return Err(CodecError::schema(schema.name, "struct has no fields"));
                }
                let mut total = 0usize;
                for field in &schema.fields {
                    let size = self.fixed_size(&field.ty).ok_or_else(|| {
                        CodecError::schema(
                            schema.name,
                            format!(
                                "struct field {} has variable-width type {}",
                                field.name,
                                field.ty.describe()
                            ),
                        )
                    })?;
                    total += size;
                }
                Some(total)
            }
        };

        self.order.push(schema.name);
        self.schemas
            .insert(schema.name, Resolved { schema, fixed_size });
        Ok(())
    }

    /// Register several schemas in order.
    pub fn register_all<I: IntoIterator<Item = Schema>>(&mut self, schemas: I) -> Result<()> {
        for schema in schemas {
            self.register(schema)?;
        }
        Ok(())
    }

    /// Check whether a schema name is known.
    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Registered schema names in registration order.
    pub fn names(&self) -> &[&'static str] {
        &self.order
    }

    /// Look up a schema declaration.
    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name).map(|r| &r.schema)
    }

    /// Encoded size of a struct schema, `None` for tables or unknown names.
    pub fn struct_size(&self, name: &str) -> Option<usize> {
        self.schemas.get(name).and_then(|r| r.fixed_size)
    }

    pub(crate) fn resolved(&self, name: &str) -> Result<&Resolved> {
        self.schemas
            .get(name)
            .ok_or_else(|| CodecError::UnknownSchema(name.to_string()))
    }

    /// Fixed encoded width of a type, if it has one.
    pub fn fixed_size(&self, ty: &FieldType) -> Option<usize> {
        match ty {
            FieldType::Primitive(w) => Some(w.bytes()),
            FieldType::FixedBytes(n) => Some(*n),
            FieldType::Composite(name) => self.struct_size(name),
            FieldType::VarBytes | FieldType::Vector(_) | FieldType::Option(_) => None,
        }
    }

    fn check_type(&self, ty: &FieldType, context: &str) -> Result<()> {
        match ty {
            FieldType::Primitive(_) | FieldType::FixedBytes(_) | FieldType::VarBytes => Ok(()),
            FieldType::Composite(name) => {
                if self.contains(name) {
                    Ok(())
                } else {
                    Err(CodecError::schema(
                        context,
                        format!("references unregistered schema {}", name),
                    ))
                }
            }
            FieldType::Vector(element) => {
                if self.fixed_size(element) == Some(0) {
                    return Err(CodecError::schema(
                        context,
                        "vector of a zero-width type has no decodable length",
                    ));
                }
                self.check_type(element, context)
            }
            FieldType::Option(inner) => {
                if matches!(**inner, FieldType::Option(_)) {
                    return Err(CodecError::schema(context, "nested option is ambiguous"));
                }
                if self.fixed_size(inner) == Some(0) {
                    return Err(CodecError::schema(
                        context,
                        "option of a zero-width type cannot distinguish present from absent",
                    ));
                }
                self.check_type(inner, context)
            }
        }
    }
}
