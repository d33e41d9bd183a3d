//! Error types for the sync service.

use std::time::Duration;

use thiserror::Error;
use vitrine_core::{CodecError, ValidationError};

use crate::api::ApiError;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while synchronizing a template.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The document failed validation; no network call was made.
    #[error("document failed validation with {} error(s){}", .0.len(), first_error(.0))]
    Validation(Vec<ValidationError>),

    /// A transport failure on one attempt.
    #[error("network error: {0}")]
    Network(#[source] ApiError),

    /// One attempt exceeded its timeout.
    #[error("attempt timed out after {0:?}")]
    Timeout(Duration),

    /// The store rejected the request. Never retried.
    #[error("template store rejected the request: {0}")]
    Api(#[source] ApiError),

    /// Every attempt failed with a retryable error.
    #[error("gave up after {attempts} attempt(s): {last}")]
    ExhaustedRetries {
        /// Attempts made.
        attempts: u32,
        /// Failure of the final attempt.
        #[source]
        last: Box<SyncError>,
    },

    /// A stored document could not be decoded, or a document could not be encoded.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl SyncError {
    /// Whether the error came from validation, before any network call.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

fn first_error(errors: &[ValidationError]) -> String {
    errors
        .first()
        .map(|e| format!(", first: {e}"))
        .unwrap_or_default()
}
