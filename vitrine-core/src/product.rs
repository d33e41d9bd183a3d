//! Product data supplied by the catalog and the persisted template wrapper.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::CodecResult;
use crate::Document;

/// Identifier used by the persistence API.
pub type RecordId = i64;

/// Brand owning a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    /// Brand identifier.
    pub id: RecordId,
    /// Display name.
    pub name: String,
}

/// A stored product image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductImage {
    /// Path relative to the image store; resolved to a URL before loading.
    pub file_path: String,
}

/// Product data; the engine never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product identifier.
    pub id: RecordId,
    /// Catalog code, e.g. "ABC123".
    pub code: String,
    /// Color name.
    #[serde(default)]
    pub color: String,
    /// Product type, e.g. "Sneaker".
    #[serde(default)]
    pub product_type: String,
    /// Size range, e.g. "36-45".
    #[serde(default)]
    pub size_range: String,
    /// Unit price.
    #[serde(default)]
    pub price: f64,
    /// ISO currency code.
    #[serde(default)]
    pub currency: String,
    /// Owning brand.
    pub brand: Brand,
    /// Product images, primary first.
    #[serde(default)]
    pub images: Vec<ProductImage>,
}

/// Who can see a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Only the author.
    #[default]
    Private,
    /// Everyone in the brand.
    Brand,
    /// Everyone.
    Public,
}

/// A template as persisted by the remote store.
///
/// Records are deactivated by clearing `is_active`, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRecord {
    /// Record identifier.
    pub id: RecordId,
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Product the template was generated for.
    pub product_id: RecordId,
    /// Brand the template belongs to.
    pub brand_id: RecordId,
    /// Serialized document in interchange form.
    pub template_data: serde_json::Value,
    /// Visibility scope.
    #[serde(default)]
    pub visibility: Visibility,
    /// Search tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// How many times the template has been used.
    #[serde(default)]
    pub usage_count: u64,
    /// Soft-delete flag.
    pub is_active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl TemplateRecord {
    /// Decode the stored document.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored payload is not a readable document.
    pub fn document(&self) -> CodecResult<Document> {
        codec::from_value(self.template_data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_parses_with_optional_fields_missing() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "id": 7,
            "code": "ABC123",
            "brand": { "id": 1, "name": "Acme" }
        }))
        .expect("product");
        assert_eq!(product.code, "ABC123");
        assert!(product.images.is_empty());
        assert!(product.price.abs() < f64::EPSILON);
    }

    #[test]
    fn visibility_is_lowercase_on_the_wire() {
        let json = serde_json::to_string(&Visibility::Brand).expect("json");
        assert_eq!(json, "\"brand\"");
    }
}
