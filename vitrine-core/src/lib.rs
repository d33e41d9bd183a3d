//! # Vitrine Core
//!
//! Template document logic for product marketing graphics.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                vitrine-core                 │
//! ├─────────────────────────────────────────────┤
//! │  Document Model   │  Interchange Codec      │
//! │  - Objects        │  - Versioned JSON       │
//! │  - Transforms     │  - Legacy migration     │
//! │  - Z-order        │  - Validation           │
//! ├─────────────────────────────────────────────┤
//! │  Layout Engine    │  Preset Generators      │
//! │  - Content bounds │  - Ten named styles     │
//! │  - Aspect snap    │  - Placeholder fallback │
//! │  - Platforms      │  - Palette randomizer   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Rendering lives in `vitrine-renderer`; persistence in `vitrine-sync`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod codec;
pub mod document;
pub mod error;
pub mod image_source;
pub mod layout;
pub mod object;
pub mod presets;
pub mod product;
pub mod validation;

pub use document::{Dimensions, Document, DocumentMetadata};
pub use error::{CodecError, CodecResult, CoreError, CoreResult};
pub use image_source::{
    IdentityResolver, ImageLoader, ImageSourceError, ImageUrlResolver, LoadedImage,
    PrefixUrlResolver,
};
pub use layout::{LayoutConfig, LayoutEngine, SizingOptions};
pub use object::{
    Bounds, ClipRegion, GraphicObject, ObjectId, ObjectKind, Shape, ShapeGeometry, TextAlign,
    TextStyle, Transform,
};
pub use presets::{
    randomize_palette, GenerationReport, Palette, PresetConfig, PresetGenerator, PresetStyle,
};
pub use product::{Brand, Product, ProductImage, RecordId, TemplateRecord, Visibility};
pub use validation::{ValidationError, ValidationReport, ValidationWarning};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
