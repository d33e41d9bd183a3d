//! Renderer error types.

use thiserror::Error;
use vitrine_core::{CodecError, ImageSourceError};

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during rendering and export.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A referenced image could not be fetched or decoded; the render is aborted.
    #[error(transparent)]
    ImageLoad(#[from] ImageSourceError),

    /// A stored document could not be decoded or encoded.
    #[error("Document codec error: {0}")]
    Codec(#[from] CodecError),

    /// The drawing surface could not be built or rasterized.
    #[error("Surface error: {0}")]
    Surface(String),

    /// Rasterized output could not be encoded.
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// Writing an export artifact failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
