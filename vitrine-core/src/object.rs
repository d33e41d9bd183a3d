//! Graphic objects - the building blocks of documents.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Interchange fields the engine does not recognize, kept verbatim.
pub type Extensions = Map<String, Value>;

/// Stable identifier for a graphic object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(String);

impl ObjectId {
    /// Create a new unique object ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Deterministic ID for a named slot of a preset style.
    #[must_use]
    pub fn for_slot(style: &str, slot: &str) -> Self {
        Self(format!("{style}-{slot}"))
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for ObjectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ObjectId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Axis-aligned rectangle in document units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Left edge.
    pub min_x: f64,
    /// Top edge.
    pub min_y: f64,
    /// Right edge.
    pub max_x: f64,
    /// Bottom edge.
    pub max_y: f64,
}

impl Bounds {
    /// Rectangle anchored at the origin.
    #[must_use]
    pub const fn from_size(width: f64, height: f64) -> Self {
        Self {
            min_x: 0.0,
            min_y: 0.0,
            max_x: width,
            max_y: height,
        }
    }

    /// Smallest rectangle containing every point.
    ///
    /// Returns `None` for an empty iterator.
    pub fn enclosing(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        points.into_iter().fold(None, |acc, (x, y)| {
            let point = Self {
                min_x: x,
                min_y: y,
                max_x: x,
                max_y: y,
            };
            Some(acc.map_or(point, |b: Self| b.union(&point)))
        })
    }

    /// Smallest rectangle containing both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Horizontal extent.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Vertical extent.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Whether `other` lies entirely inside this rectangle.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.min_x <= other.min_x
            && self.min_y <= other.min_y
            && self.max_x >= other.max_x
            && self.max_y >= other.max_y
    }
}

/// Placement shared by every object kind.
///
/// A local point is rotated, then scaled, then translated by the position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// X position (units from left).
    pub x: f64,
    /// Y position (units from top).
    pub y: f64,
    /// Horizontal scale factor.
    pub scale_x: f64,
    /// Vertical scale factor.
    pub scale_y: f64,
    /// Rotation in degrees, clockwise.
    pub rotation: f64,
    /// Opacity in `0.0..=1.0`.
    pub opacity: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            opacity: 1.0,
        }
    }
}

impl Transform {
    /// Identity transform translated to `(x, y)`.
    #[must_use]
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    /// Map a point from object space into document space.
    #[must_use]
    pub fn apply(&self, px: f64, py: f64) -> (f64, f64) {
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        let rx = px * cos - py * sin;
        let ry = px * sin + py * cos;
        (rx * self.scale_x + self.x, ry * self.scale_y + self.y)
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    /// Flush left.
    #[default]
    Left,
    /// Centered in the text box.
    Center,
    /// Flush right.
    Right,
    /// Justified; rendered as left-aligned.
    Justify,
}

impl TextAlign {
    /// Interchange name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Justify => "justify",
        }
    }

    /// Parse an interchange name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "left" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            "justify" => Some(Self::Justify),
            _ => None,
        }
    }
}

/// Sub-rectangle of an image, in the image's unscaled units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipRegion {
    /// Left edge relative to the image origin.
    pub x: f64,
    /// Top edge relative to the image origin.
    pub y: f64,
    /// Width of the visible region.
    pub width: f64,
    /// Height of the visible region.
    pub height: f64,
}

/// Text content and typography.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    /// Text content; newlines break lines.
    pub content: String,
    /// Font family name.
    pub font_family: String,
    /// Font size in units.
    pub font_size: f64,
    /// CSS font weight ("normal", "bold", "600", ...).
    pub font_weight: String,
    /// Fill color as hex.
    pub fill: String,
    /// Alignment within the text box.
    pub align: TextAlign,
    /// Text box width.
    pub width: f64,
    /// Text box height.
    pub height: f64,
}

/// Geometry of a shape object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeGeometry {
    /// Rectangle with optional rounded corners.
    Rect {
        /// Width in units.
        width: f64,
        /// Height in units.
        height: f64,
        /// Corner radius.
        corner_radius: f64,
    },
    /// Circle whose bounding box starts at the object position.
    Circle {
        /// Radius in units.
        radius: f64,
    },
    /// Line from the object position to the position plus `(dx, dy)`.
    Line {
        /// Horizontal end offset.
        dx: f64,
        /// Vertical end offset.
        dy: f64,
    },
}

/// A filled and/or stroked primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    /// Geometry.
    pub geometry: ShapeGeometry,
    /// Fill color as hex; `None` leaves the interior empty.
    pub fill: Option<String>,
    /// Stroke color as hex.
    pub stroke: Option<String>,
    /// Stroke width in units.
    pub stroke_width: f64,
}

impl Shape {
    /// Filled rectangle.
    #[must_use]
    pub fn rect(width: f64, height: f64, fill: impl Into<String>) -> Self {
        Self {
            geometry: ShapeGeometry::Rect {
                width,
                height,
                corner_radius: 0.0,
            },
            fill: Some(fill.into()),
            stroke: None,
            stroke_width: 0.0,
        }
    }

    /// Filled circle.
    #[must_use]
    pub fn circle(radius: f64, fill: impl Into<String>) -> Self {
        Self {
            geometry: ShapeGeometry::Circle { radius },
            fill: Some(fill.into()),
            stroke: None,
            stroke_width: 0.0,
        }
    }

    /// Stroked line.
    #[must_use]
    pub fn line(dx: f64, dy: f64, stroke: impl Into<String>, stroke_width: f64) -> Self {
        Self {
            geometry: ShapeGeometry::Line { dx, dy },
            fill: None,
            stroke: Some(stroke.into()),
            stroke_width,
        }
    }

    /// Round the corners of a rectangle; other geometries are unchanged.
    #[must_use]
    pub fn with_corner_radius(mut self, radius: f64) -> Self {
        if let ShapeGeometry::Rect { corner_radius, .. } = &mut self.geometry {
            *corner_radius = radius;
        }
        self
    }

    /// Add a stroke.
    #[must_use]
    pub fn with_stroke(mut self, stroke: impl Into<String>, width: f64) -> Self {
        self.stroke = Some(stroke.into());
        self.stroke_width = width;
        self
    }
}

/// The content an object carries.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    /// A text block.
    Text(TextStyle),
    /// A rectangle, circle or line.
    Shape(Shape),
    /// A raster image.
    Image {
        /// Image source reference (URL, path or data URI).
        src: String,
        /// Display width in units.
        width: f64,
        /// Display height in units.
        height: f64,
        /// Visible sub-region.
        clip: Option<ClipRegion>,
    },
}

impl ObjectKind {
    /// Interchange type tag.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Shape(shape) => match shape.geometry {
                ShapeGeometry::Rect { .. } => "rect",
                ShapeGeometry::Circle { .. } => "circle",
                ShapeGeometry::Line { .. } => "line",
            },
            Self::Image { .. } => "image",
        }
    }

    /// Extent in object space, before the transform is applied.
    #[must_use]
    pub fn local_bounds(&self) -> Bounds {
        match self {
            Self::Text(text) => Bounds::from_size(text.width, text.height),
            Self::Image { width, height, .. } => Bounds::from_size(*width, *height),
            Self::Shape(shape) => match shape.geometry {
                ShapeGeometry::Rect { width, height, .. } => Bounds::from_size(width, height),
                ShapeGeometry::Circle { radius } => Bounds::from_size(radius * 2.0, radius * 2.0),
                ShapeGeometry::Line { dx, dy } => Bounds {
                    min_x: dx.min(0.0),
                    min_y: dy.min(0.0),
                    max_x: dx.max(0.0),
                    max_y: dy.max(0.0),
                },
            },
        }
    }
}

/// Tags accepted in the `type` field of interchange objects.
pub const KNOWN_KINDS: [&str; 5] = ["text", "rect", "circle", "line", "image"];

/// A graphic object with content, transform and identity.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicObject {
    /// Stable identifier.
    pub id: ObjectId,
    /// Object content.
    pub kind: ObjectKind,
    /// Placement.
    pub transform: Transform,
    /// Named style preset (palette role for generated objects).
    pub style_preset: Option<String>,
    /// Unrecognized interchange fields.
    pub extensions: Extensions,
}

impl GraphicObject {
    /// Create a new object with a fresh ID and identity transform.
    #[must_use]
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            id: ObjectId::new(),
            kind,
            transform: Transform::default(),
            style_preset: None,
            extensions: Extensions::new(),
        }
    }

    /// Set the ID.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<ObjectId>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Move to `(x, y)`, keeping scale, rotation and opacity.
    #[must_use]
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.transform.x = x;
        self.transform.y = y;
        self
    }

    /// Tag with a named style preset.
    #[must_use]
    pub fn with_style_preset(mut self, preset: impl Into<String>) -> Self {
        self.style_preset = Some(preset.into());
        self
    }

    /// Transformed bounding box in document space.
    #[must_use]
    pub fn bounding_box(&self) -> Bounds {
        let local = self.kind.local_bounds();
        let corners = [
            (local.min_x, local.min_y),
            (local.max_x, local.min_y),
            (local.max_x, local.max_y),
            (local.min_x, local.max_y),
        ];
        Bounds::enclosing(corners.map(|(x, y)| self.transform.apply(x, y)))
            .unwrap_or_else(|| Bounds::from_size(0.0, 0.0))
    }
}
