//! The sync service: validate locally, then persist under retry.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use vitrine_core::validation::validate_interchange;
use vitrine_core::{codec, Document, Product, RecordId, TemplateRecord, Visibility};

use crate::api::{NewTemplate, TemplateApi, TemplateUpdate};
use crate::error::{SyncError, SyncResult};
use crate::retry::{run_with_retry, RetryConfig};

/// Sync service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Network retry policy.
    pub retry: RetryConfig,
    /// Visibility given to newly created records.
    pub default_visibility: Visibility,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            default_visibility: Visibility::Brand,
        }
    }
}

/// What a template is attached to when it is first created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRef {
    /// Product identifier.
    pub product_id: RecordId,
    /// Owning brand identifier.
    pub brand_id: RecordId,
    /// Display name for a new record.
    pub name: String,
    /// Search tags for a new record.
    pub tags: Vec<String>,
}

impl ProductRef {
    /// Reference to a product, named after its brand and code.
    #[must_use]
    pub fn for_product(product: &Product) -> Self {
        let name = match (product.brand.name.trim(), product.code.trim()) {
            ("", code) => code.to_string(),
            (brand, "") => brand.to_string(),
            (brand, code) => format!("{brand} {code}"),
        };
        Self {
            product_id: product.id,
            brand_id: product.brand.id,
            name,
            tags: Vec::new(),
        }
    }

    /// Attach search tags.
    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

impl From<&Product> for ProductRef {
    fn from(product: &Product) -> Self {
        Self::for_product(product)
    }
}

/// A fetched record and its decoded document.
#[derive(Debug, Clone)]
pub struct PulledTemplate {
    /// The stored record.
    pub record: TemplateRecord,
    /// Its document, migrated to the current format.
    pub document: Document,
}

/// Reconciles documents with the remote template store.
///
/// Every outbound call goes through the retry policy. Documents are
/// validated before any network traffic; an invalid document never reaches
/// the store.
#[derive(Clone)]
pub struct SyncService {
    api: Arc<dyn TemplateApi>,
    config: SyncConfig,
}

impl std::fmt::Debug for SyncService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SyncService {
    /// Create a service over the given store.
    #[must_use]
    pub fn new(api: Arc<dyn TemplateApi>, config: SyncConfig) -> Self {
        Self { api, config }
    }

    /// The service configuration.
    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Persist a document.
    ///
    /// Updates `template_id` when given, otherwise creates a new record for
    /// `product`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Validation`] without touching the network if the
    /// document is invalid, [`SyncError::Api`] if the store rejects it, and
    /// [`SyncError::ExhaustedRetries`] if every attempt fails.
    pub async fn sync(
        &self,
        doc: &Document,
        product: &ProductRef,
        template_id: Option<RecordId>,
    ) -> SyncResult<TemplateRecord> {
        let value = codec::to_value(doc)?;
        self.sync_raw(value, product, template_id).await
    }

    /// Persist a document received in interchange form (current or legacy).
    ///
    /// The payload is validated, then normalized through the codec so the
    /// store always receives the current format.
    ///
    /// # Errors
    ///
    /// Same as [`SyncService::sync`].
    pub async fn sync_raw(
        &self,
        value: Value,
        product: &ProductRef,
        template_id: Option<RecordId>,
    ) -> SyncResult<TemplateRecord> {
        let report = validate_interchange(&value);
        for warning in &report.warnings {
            warn!(template_id, warning = %warning, "Document validation warning");
        }
        if !report.is_valid() {
            warn!(
                template_id,
                errors = report.errors.len(),
                "Document failed validation; not syncing"
            );
            return Err(SyncError::Validation(report.errors));
        }

        let template_data = codec::to_value(&codec::from_value(value)?)?;
        let retry = &self.config.retry;
        let api = &self.api;

        let record = match template_id {
            Some(id) => {
                let update = &TemplateUpdate::document(template_data);
                run_with_retry(retry, "update", move || api.update(id, update)).await?
            }
            None => {
                let template = &NewTemplate {
                    name: product.name.clone(),
                    description: String::new(),
                    product_id: product.product_id,
                    brand_id: product.brand_id,
                    template_data,
                    visibility: self.config.default_visibility,
                    tags: product.tags.clone(),
                };
                run_with_retry(retry, "create", move || api.create(template)).await?
            }
        };

        info!(
            template_id = record.id,
            product_id = record.product_id,
            created = template_id.is_none(),
            "Template synced"
        );
        Ok(record)
    }

    /// Fetch a record and decode its document.
    ///
    /// # Errors
    ///
    /// Returns a network or store error, or [`SyncError::Codec`] if the
    /// stored document cannot be read.
    pub async fn pull(&self, template_id: RecordId) -> SyncResult<PulledTemplate> {
        let api = &self.api;
        let record =
            run_with_retry(&self.config.retry, "get", move || api.get(template_id)).await?;
        let document = record.document()?;
        Ok(PulledTemplate { record, document })
    }

    /// Records generated for a product.
    ///
    /// # Errors
    ///
    /// Returns a network or store error.
    pub async fn list_for_product(&self, product_id: RecordId) -> SyncResult<Vec<TemplateRecord>> {
        let api = &self.api;
        run_with_retry(&self.config.retry, "list_by_product", move || {
            api.list_by_product(product_id)
        })
        .await
    }

    /// Records owned by a brand.
    ///
    /// # Errors
    ///
    /// Returns a network or store error.
    pub async fn list_for_brand(&self, brand_id: RecordId) -> SyncResult<Vec<TemplateRecord>> {
        let api = &self.api;
        run_with_retry(&self.config.retry, "list_by_brand", move || {
            api.list_by_brand(brand_id)
        })
        .await
    }

    /// Soft-delete a record by clearing its active flag.
    ///
    /// # Errors
    ///
    /// Returns a network or store error.
    pub async fn deactivate(&self, template_id: RecordId) -> SyncResult<TemplateRecord> {
        let api = &self.api;
        let update = &TemplateUpdate::deactivate();
        let record = run_with_retry(&self.config.retry, "deactivate", move || {
            api.update(template_id, update)
        })
        .await?;
        info!(template_id, "Template deactivated");
        Ok(record)
    }

    /// Ask the store to rasterize a record.
    ///
    /// # Errors
    ///
    /// Returns a network or store error.
    pub async fn export_raster(
        &self,
        template_id: RecordId,
        width: u32,
        height: u32,
    ) -> SyncResult<Vec<u8>> {
        let api = &self.api;
        run_with_retry(&self.config.retry, "export_raster", move || {
            api.export_raster(template_id, width, height)
        })
        .await
    }
}
