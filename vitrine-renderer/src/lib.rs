//! # Vitrine Renderer
//!
//! Turns documents into downloadable images.
//!
//! ## Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Document ──► image loads (all, together)   │
//! ├─────────────────────────────────────────────┤
//! │  RenderSurface: SVG body in list order      │
//! ├──────────────┬──────────────┬───────────────┤
//! │ PNG          │ JPEG         │ SVG           │
//! │ resvg        │ resvg + flat │ passthrough   │
//! └──────────────┴──────────────┴───────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod batch;
pub mod error;
pub mod export;
pub mod image;
pub mod sink;

pub use batch::{
    export_json, BatchExportReport, BatchKind, BatchRenderOutcome, ExportFailure, RenderFailure,
    RenderedItem,
};
pub use error::{RenderError, RenderResult};
pub use export::{DocumentRenderer, ExportFormat, RenderOptions, RenderSurface};
pub use image::DefaultImageLoader;
pub use sink::{DirectorySink, ExportArtifact, ExportSink, MemorySink};

use serde::{Deserialize, Serialize};

/// Configuration for the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Load system fonts for text rasterization.
    pub load_system_fonts: bool,
    /// Family used when a text object's family is not installed.
    pub default_font_family: Option<String>,
    /// Maximum renders in flight for multi-document rendering.
    pub max_concurrency: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            load_system_fonts: true,
            default_font_family: None,
            max_concurrency: 4,
        }
    }
}

/// Renderer version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
