//! The template persistence API seam.
//!
//! [`TemplateApi`] is the contract with the remote template store. The sync
//! service is its only caller; [`crate::HttpTemplateApi`] is the production
//! implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vitrine_core::{RecordId, TemplateRecord, Visibility};

/// Errors returned by a [`TemplateApi`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Connection, DNS or other transport-level failure.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The store answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// The store answered with a body that could not be read.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The client is misconfigured (bad base URL, unusable token).
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// Returns true if another attempt could succeed.
    ///
    /// Transport failures and server-side statuses (5xx, 408, 429) are
    /// retryable. Client errors and malformed responses are not.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status >= 500 || *status == 408 || *status == 429,
            Self::Malformed(_) | Self::Config(_) => false,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Malformed(error.to_string())
        } else if let Some(status) = error.status() {
            Self::Status {
                status: status.as_u16(),
                body: String::new(),
            }
        } else {
            Self::Transport(error.to_string())
        }
    }
}

/// Payload for creating a template record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTemplate {
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Product the template was generated for.
    pub product_id: RecordId,
    /// Owning brand.
    pub brand_id: RecordId,
    /// Serialized document in interchange form.
    pub template_data: serde_json::Value,
    /// Visibility scope.
    pub visibility: Visibility,
    /// Search tags.
    pub tags: Vec<String>,
}

/// Partial update of a template record. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateUpdate {
    /// New display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Replacement document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_data: Option<serde_json::Value>,
    /// New visibility scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    /// Replacement tag list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Soft-delete flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl TemplateUpdate {
    /// Update that replaces only the document.
    #[must_use]
    pub fn document(template_data: serde_json::Value) -> Self {
        Self {
            template_data: Some(template_data),
            ..Self::default()
        }
    }

    /// Update that flips the soft-delete flag off.
    #[must_use]
    pub fn deactivate() -> Self {
        Self {
            is_active: Some(false),
            ..Self::default()
        }
    }
}

/// Remote template store.
///
/// Every method fails with an [`ApiError`]; callers decide whether to retry
/// through [`ApiError::is_retryable`].
#[async_trait]
#[allow(clippy::missing_errors_doc)]
pub trait TemplateApi: Send + Sync {
    /// Create a new record.
    ///
    /// Not idempotent: a retried create after a lost response may leave a
    /// duplicate record behind.
    async fn create(&self, template: &NewTemplate) -> Result<TemplateRecord, ApiError>;

    /// Apply a partial update to an existing record.
    async fn update(
        &self,
        id: RecordId,
        update: &TemplateUpdate,
    ) -> Result<TemplateRecord, ApiError>;

    /// Fetch one record.
    async fn get(&self, id: RecordId) -> Result<TemplateRecord, ApiError>;

    /// Records generated for a product.
    async fn list_by_product(&self, product_id: RecordId)
        -> Result<Vec<TemplateRecord>, ApiError>;

    /// Records owned by a brand.
    async fn list_by_brand(&self, brand_id: RecordId) -> Result<Vec<TemplateRecord>, ApiError>;

    /// Server-side raster export of a stored record.
    async fn export_raster(
        &self,
        id: RecordId,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, ApiError>;
}
