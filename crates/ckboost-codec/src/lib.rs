//! # CKBoost Codec
//!
//! Schema-driven molecule encoding for CKBoost cell data.
//!
//! This crate has no I/O and no domain knowledge. It knows how to lay out
//! primitives, structs, tables, vectors and options, and how to validate a
//! byte buffer against a schema on the way back.
//!
//! ## Key Types
//!
//! - [`FieldType`] - The closed lattice of field types
//! - [`Schema`] - A named struct or table declaration
//! - [`SchemaRegistry`] - Resolves schemas at registration and encodes/decodes against them
//! - [`Value`] - The untyped tree between typed records and bytes
//! - [`Byte32`], [`Uint256`] - Fixed-width primitives
//!
//! ## Numeric canonicalization
//!
//! Every numeric comparison and encode funnels through [`normalize`]; see
//! the [`numeric`] module.

pub mod codec;
pub mod error;
pub mod numeric;
pub mod primitives;
pub mod registry;
pub mod schema;
pub mod value;

pub use error::{CodecError, NumericError, Result};
pub use numeric::{normalize, normalize_to_width, Numeric, Uint256};
pub use primitives::{hex_bytes, hex_bytes_vec, Byte32, Width};
pub use registry::SchemaRegistry;
pub use schema::{Field, FieldType, Layout, Schema};
pub use value::{FieldReader, Value};
