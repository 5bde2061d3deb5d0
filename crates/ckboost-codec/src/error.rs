//! Error types for the molecule codec.

use thiserror::Error;

/// Errors raised while registering schemas or encoding/decoding values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A value does not fit the declared width or length (encode-time).
    #[error("range error in {context}: {reason}")]
    Range { context: String, reason: String },

    /// Bytes do not follow the expected struct/table layout (decode-time).
    #[error("layout error in {context}: {reason}")]
    Layout { context: String, reason: String },

    /// A schema was rejected at registration time.
    #[error("invalid schema {schema}: {reason}")]
    Schema { schema: String, reason: String },

    /// A schema name was referenced but never registered.
    #[error("unknown schema: {0}")]
    UnknownSchema(String),

    /// A value tree does not have the shape its schema requires.
    #[error("shape mismatch in {context}: expected {expected}")]
    Shape { context: String, expected: String },
}

impl CodecError {
    pub fn range(context: impl Into<String>, reason: impl Into<String>) -> Self {
        CodecError::Range {
            context: context.into(),
            reason: reason.into(),
        }
    }

    pub fn layout(context: impl Into<String>, reason: impl Into<String>) -> Self {
        CodecError::Layout {
            context: context.into(),
            reason: reason.into(),
        }
    }

    pub fn schema(schema: impl Into<String>, reason: impl Into<String>) -> Self {
        CodecError::Schema {
            schema: schema.into(),
            reason: reason.into(),
        }
    }

    pub fn shape(context: impl Into<String>, expected: impl Into<String>) -> Self {
        CodecError::Shape {
            context: context.into(),
            expected: expected.into(),
        }
    }

    /// True for decode-time layout failures.
    pub fn is_layout(&self) -> bool {
        matches!(self, CodecError::Layout { .. })
    }

    /// True for encode-time range failures.
    pub fn is_range(&self) -> bool {
        matches!(self, CodecError::Range { .. })
    }
}

/// Errors raised while canonicalizing numeric input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NumericError {
    #[error("negative value not allowed: {0}")]
    Negative(String),

    #[error("fractional value not allowed: {0}")]
    Fractional(String),

    #[error("not a valid unsigned integer: {0:?}")]
    Unparsable(String),

    #[error("value {value} does not fit in {bits} bits")]
    TooWide { value: String, bits: u32 },
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
