//! Error types for document operations.

use thiserror::Error;

/// Result type for document operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while manipulating a document.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Object not found in the document.
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    /// Document could not be encoded or decoded.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Errors raised by the interchange codec.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The document-level shape or a known object is malformed.
    #[error("invalid document field '{field}'{}", .index.map(|i| format!(" at object {i}")).unwrap_or_default())]
    Validation {
        /// Offending field name.
        field: String,
        /// Index into `canvas.objects`, when the defect belongs to one object.
        index: Option<usize>,
    },

    /// The payload has an unreadable version or an unrecognized top-level shape.
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// The payload is not JSON.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CodecError {
    pub(crate) fn field(field: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            index: None,
        }
    }

    pub(crate) fn object_field(field: impl Into<String>, index: usize) -> Self {
        Self::Validation {
            field: field.into(),
            index: Some(index),
        }
    }
}
