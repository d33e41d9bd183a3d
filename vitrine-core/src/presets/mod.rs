//! # Preset template generators
//!
//! Each style clears the target document and repopulates it from product
//! data. Generation is deterministic: object IDs are derived from the style
//! and slot name, and layout depends only on the canvas size, the product
//! and which product images could be loaded.
//!
//! Image slots degrade instead of failing: an image that cannot be loaded is
//! replaced by a placeholder box and label, and the slot is listed in the
//! [`GenerationReport`].

mod compose;
mod palette;
mod styles;

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};

use crate::image_source::{ImageLoader, ImageUrlResolver};
use crate::product::Product;
use crate::Document;

pub use palette::{randomize_palette, Palette, Role};

use compose::{Composer, ImageSlot};

/// Named visual styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresetStyle {
    /// Centered product shot with a quiet caption.
    Minimal,
    /// Catalog page with a details column.
    Catalog,
    /// Bold social post.
    Social,
    /// Full-bleed photo with a caption band.
    Instagram,
    /// Dark split layout.
    Modern,
    /// Store listing with a call to action.
    Ecommerce,
    /// Brand card.
    BusinessCard,
    /// Email newsletter block.
    Newsletter,
    /// Wide web banner.
    Banner,
    /// Grid of up to four product images.
    Collage,
}

impl PresetStyle {
    /// Every style, in a stable order.
    pub const ALL: [Self; 10] = [
        Self::Minimal,
        Self::Catalog,
        Self::Social,
        Self::Instagram,
        Self::Modern,
        Self::Ecommerce,
        Self::BusinessCard,
        Self::Newsletter,
        Self::Banner,
        Self::Collage,
    ];

    /// Style key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Catalog => "catalog",
            Self::Social => "social",
            Self::Instagram => "instagram",
            Self::Modern => "modern",
            Self::Ecommerce => "ecommerce",
            Self::BusinessCard => "business-card",
            Self::Newsletter => "newsletter",
            Self::Banner => "banner",
            Self::Collage => "collage",
        }
    }

    /// Platform preset this style is designed for.
    #[must_use]
    pub const fn use_case(self) -> &'static str {
        match self {
            Self::Minimal | Self::Modern => "social-media",
            Self::Catalog | Self::Ecommerce | Self::Collage => "catalog",
            Self::Social => "facebook-post",
            Self::Instagram => "instagram-story",
            Self::BusinessCard => "business-card",
            Self::Newsletter => "email-header",
            Self::Banner => "web-banner",
        }
    }
}

impl std::fmt::Display for PresetStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unrecognized style key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown preset style '{0}'")]
pub struct UnknownStyle(pub String);

impl FromStr for PresetStyle {
    type Err = UnknownStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|style| style.as_str() == s)
            .ok_or_else(|| UnknownStyle(s.to_string()))
    }
}

/// Tunables shared by every style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetConfig {
    /// Body font family.
    pub font_family: String,
    /// Heading font family.
    pub heading_font_family: String,
    /// Logo text per brand name (matched case-insensitively).
    pub logo_overrides: BTreeMap<String, String>,
    /// Currency code to symbol.
    pub currency_symbols: BTreeMap<String, String>,
    /// Label drawn inside image placeholders.
    pub placeholder_label: String,
}

impl Default for PresetConfig {
    fn default() -> Self {
        let currency_symbols = [("USD", "$"), ("EUR", "€"), ("GBP", "£"), ("TRY", "₺"), ("JPY", "¥")]
            .into_iter()
            .map(|(code, symbol)| (code.to_string(), symbol.to_string()))
            .collect();
        Self {
            font_family: "Helvetica".to_string(),
            heading_font_family: "Helvetica".to_string(),
            logo_overrides: BTreeMap::new(),
            currency_symbols,
            placeholder_label: "Image unavailable".to_string(),
        }
    }
}

impl PresetConfig {
    /// Short logo text for a brand: an override, or the initials.
    #[must_use]
    pub fn logo_text(&self, brand: &str) -> String {
        let key = brand.trim().to_lowercase();
        if let Some(text) = self
            .logo_overrides
            .iter()
            .find(|(name, _)| name.to_lowercase() == key)
            .map(|(_, text)| text)
        {
            return text.clone();
        }

        let words: Vec<&str> = brand.split_whitespace().collect();
        match words.as_slice() {
            [] => String::new(),
            [single] => single.chars().take(3).collect::<String>().to_uppercase(),
            many => many
                .iter()
                .take(3)
                .filter_map(|w| w.chars().next())
                .collect::<String>()
                .to_uppercase(),
        }
    }

    /// Price with its currency symbol, or the code when no symbol is known.
    #[must_use]
    pub fn format_price(&self, price: f64, currency: &str) -> String {
        match self.currency_symbols.get(currency) {
            Some(symbol) => format!("{symbol}{price:.2}"),
            None if currency.is_empty() => format!("{price:.2}"),
            None => format!("{price:.2} {currency}"),
        }
    }
}

/// What a generator call produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    /// Style generated.
    pub style: PresetStyle,
    /// Objects in the document afterwards.
    pub object_count: usize,
    /// Image slots replaced by placeholders because loading failed.
    pub degraded_slots: Vec<String>,
}

/// Populates documents from product data.
#[derive(Clone)]
pub struct PresetGenerator {
    loader: Arc<dyn ImageLoader>,
    resolver: Arc<dyn ImageUrlResolver>,
    config: PresetConfig,
}

impl PresetGenerator {
    /// Create a generator.
    #[must_use]
    pub fn new(
        loader: Arc<dyn ImageLoader>,
        resolver: Arc<dyn ImageUrlResolver>,
        config: PresetConfig,
    ) -> Self {
        Self {
            loader,
            resolver,
            config,
        }
    }

    /// The generator configuration.
    #[must_use]
    pub fn config(&self) -> &PresetConfig {
        &self.config
    }

    /// Clear `doc` and repopulate it for `style`.
    ///
    /// Product images are resolved and probed concurrently before layout;
    /// failures degrade to placeholders.
    pub async fn generate(
        &self,
        doc: &mut Document,
        product: &Product,
        style: PresetStyle,
    ) -> GenerationReport {
        let images = self.probe_images(product).await;

        doc.clear();
        let mut composer = Composer::new(style, doc, product, &self.config, &images);
        styles::compose(&mut composer);
        let degraded_slots = composer.finish();

        if !degraded_slots.is_empty() {
            tracing::warn!(
                style = style.as_str(),
                product = %product.code,
                slots = ?degraded_slots,
                "Generated with placeholder images"
            );
        }

        GenerationReport {
            style,
            object_count: doc.len(),
            degraded_slots,
        }
    }

    async fn probe_images(&self, product: &Product) -> Vec<ImageSlot> {
        let urls: Vec<String> = product
            .images
            .iter()
            .map(|image| self.resolver.resolve(&image.file_path))
            .collect();
        let results = join_all(urls.iter().map(|url| self.loader.load(url))).await;

        urls.into_iter()
            .zip(results)
            .map(|(url, result)| match result {
                Ok(_) => ImageSlot::Ready(url),
                Err(e) => {
                    tracing::warn!(error = %e, "Product image failed to load");
                    ImageSlot::Failed
                }
            })
            .collect()
    }
}
