//! The editable document: canvas metadata plus a z-ordered object list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::object::{Bounds, Extensions, GraphicObject, ObjectId};
use crate::{CoreError, CoreResult};

/// Current interchange version written by the codec.
pub const DOCUMENT_VERSION: &str = "2.0";

/// Default canvas width for documents without explicit dimensions.
pub const DEFAULT_CANVAS_WIDTH: f64 = 700.0;

/// Default canvas height for documents without explicit dimensions.
pub const DEFAULT_CANVAS_HEIGHT: f64 = 900.0;

/// Default background color.
pub const DEFAULT_BACKGROUND: &str = "#ffffff";

/// Output dimensions in whole units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

impl Dimensions {
    /// Construct from width and height.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width divided by height.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height.max(1))
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Export and targeting metadata carried alongside the canvas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Platform preset the document was optimized for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// Preferred output dimensions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    /// When the document was first created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// When the document was last exported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
    /// Export format of the last export.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Export quality of the last export.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<f64>,
    /// Unrecognized metadata fields.
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// A document containing all graphic objects, back to front.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Interchange version the document was read from or will be written as.
    pub version: String,
    /// Canvas width in units.
    pub canvas_width: f64,
    /// Canvas height in units.
    pub canvas_height: f64,
    /// Background fill as hex.
    pub background_color: String,
    /// Objects in z-order; index 0 is painted first.
    objects: Vec<GraphicObject>,
    /// Export metadata.
    pub metadata: DocumentMetadata,
    /// Unrecognized top-level record fields.
    pub extensions: Extensions,
    /// Unrecognized fields of the `canvas` block.
    pub canvas_extensions: Extensions,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT)
    }
}

impl Document {
    /// Create an empty document with the given canvas size.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            version: DOCUMENT_VERSION.to_string(),
            canvas_width: width,
            canvas_height: height,
            background_color: DEFAULT_BACKGROUND.to_string(),
            objects: Vec::new(),
            metadata: DocumentMetadata::default(),
            extensions: Extensions::new(),
            canvas_extensions: Extensions::new(),
        }
    }

    /// Set the background color.
    #[must_use]
    pub fn with_background(mut self, color: impl Into<String>) -> Self {
        self.background_color = color.into();
        self
    }

    /// Append an object on top of the stack.
    pub fn push(&mut self, object: GraphicObject) -> ObjectId {
        let id = object.id.clone();
        self.objects.push(object);
        id
    }

    /// Remove an object.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn remove(&mut self, id: &ObjectId) -> CoreResult<GraphicObject> {
        let index = self.index_of(id)?;
        Ok(self.objects.remove(index))
    }

    /// Get an object by ID.
    #[must_use]
    pub fn get(&self, id: &ObjectId) -> Option<&GraphicObject> {
        self.objects.iter().find(|o| &o.id == id)
    }

    /// Get a mutable reference to an object by ID.
    pub fn get_mut(&mut self, id: &ObjectId) -> Option<&mut GraphicObject> {
        self.objects.iter_mut().find(|o| &o.id == id)
    }

    /// Objects back to front.
    #[must_use]
    pub fn objects(&self) -> &[GraphicObject] {
        &self.objects
    }

    /// Mutable objects back to front.
    pub fn objects_mut(&mut self) -> impl Iterator<Item = &mut GraphicObject> {
        self.objects.iter_mut()
    }

    /// Move an object to the top of the stack.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn bring_to_front(&mut self, id: &ObjectId) -> CoreResult<()> {
        let index = self.index_of(id)?;
        let object = self.objects.remove(index);
        self.objects.push(object);
        Ok(())
    }

    /// Move an object to the bottom of the stack.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn send_to_back(&mut self, id: &ObjectId) -> CoreResult<()> {
        let index = self.index_of(id)?;
        let object = self.objects.remove(index);
        self.objects.insert(0, object);
        Ok(())
    }

    /// Remove every object, keeping canvas settings.
    pub fn clear(&mut self) {
        self.objects.clear();
    }

    /// Number of objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the document has no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// The canvas rectangle.
    #[must_use]
    pub fn canvas_bounds(&self) -> Bounds {
        Bounds::from_size(self.canvas_width, self.canvas_height)
    }

    /// Canvas size rounded to whole units.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn canvas_dimensions(&self) -> Dimensions {
        Dimensions::new(
            self.canvas_width.round().max(1.0) as u32,
            self.canvas_height.round().max(1.0) as u32,
        )
    }

    /// Preferred export size: metadata dimensions when set, else the canvas.
    #[must_use]
    pub fn export_dimensions(&self) -> Dimensions {
        self.metadata
            .dimensions
            .unwrap_or_else(|| self.canvas_dimensions())
    }

    fn index_of(&self, id: &ObjectId) -> CoreResult<usize> {
        self.objects
            .iter()
            .position(|o| &o.id == id)
            .ok_or_else(|| CoreError::ObjectNotFound(id.to_string()))
    }
}
