//! Interchange codec: documents to and from their portable JSON form.
//!
//! The wire shape is
//!
//! ```text
//! { version, canvas: { objects, background, width, height }, product?, metadata }
//! ```
//!
//! Legacy files are a bare array of objects; [`decode`] detects them and routes
//! them through [`migrate`] first. Objects with a missing or unknown `type` tag
//! are skipped with a warning so newer writers do not break older readers.

use serde_json::{json, Map, Value};

use crate::document::{
    Document, DocumentMetadata, DEFAULT_BACKGROUND, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH,
    DOCUMENT_VERSION,
};
use crate::error::{CodecError, CodecResult};
use crate::object::{
    ClipRegion, GraphicObject, ObjectId, ObjectKind, Shape, ShapeGeometry, TextAlign, TextStyle,
    Transform,
};
use crate::product::Product;

/// Font family used when a text object does not name one.
pub const DEFAULT_FONT_FAMILY: &str = "Helvetica";

/// Major interchange versions this codec reads.
pub const SUPPORTED_MAJOR_VERSIONS: [u32; 2] = [1, 2];

/// Marker written into the metadata of migrated legacy documents.
pub const LEGACY_SOURCE: &str = "legacy-array";

/// Serialize a document to interchange JSON text.
///
/// # Errors
///
/// Returns an error if the metadata cannot be serialized.
pub fn encode(doc: &Document) -> CodecResult<String> {
    Ok(serde_json::to_string(&to_value(doc)?)?)
}

/// Serialize a document to indented interchange JSON text.
///
/// # Errors
///
/// Returns an error if the metadata cannot be serialized.
pub fn encode_pretty(doc: &Document) -> CodecResult<String> {
    Ok(serde_json::to_string_pretty(&to_value(doc)?)?)
}

/// Serialize a document to an interchange JSON value.
///
/// # Errors
///
/// Returns an error if the metadata cannot be serialized.
pub fn to_value(doc: &Document) -> CodecResult<Value> {
    let objects: Vec<Value> = doc.objects().iter().map(object_to_value).collect();

    let mut canvas = doc.canvas_extensions.clone();
    canvas.insert("objects".to_string(), Value::Array(objects));
    canvas.insert("background".to_string(), json!(doc.background_color));
    canvas.insert("width".to_string(), json!(doc.canvas_width));
    canvas.insert("height".to_string(), json!(doc.canvas_height));

    let mut root = doc.extensions.clone();
    root.insert("version".to_string(), json!(doc.version));
    root.insert("canvas".to_string(), Value::Object(canvas));
    root.insert("metadata".to_string(), serde_json::to_value(&doc.metadata)?);
    Ok(Value::Object(root))
}

/// Build a full interchange record, embedding the product the document shows.
///
/// # Errors
///
/// Returns an error if the metadata or product cannot be serialized.
pub fn encode_record(doc: &Document, product: Option<&Product>) -> CodecResult<Value> {
    let mut value = to_value(doc)?;
    if let (Some(product), Value::Object(root)) = (product, &mut value) {
        root.insert("product".to_string(), serde_json::to_value(product)?);
    }
    Ok(value)
}

/// Parse interchange JSON text into a document.
///
/// # Errors
///
/// Returns [`CodecError::Json`] for text that is not JSON,
/// [`CodecError::UnsupportedFormat`] for an unreadable version or top-level
/// shape, and [`CodecError::Validation`] for a malformed canvas or object.
pub fn decode(text: &str) -> CodecResult<Document> {
    let value: Value = serde_json::from_str(text)?;
    from_value(value)
}

/// Whether a payload is a legacy bare object array.
#[must_use]
pub fn is_legacy(value: &Value) -> bool {
    value.is_array()
}

/// Wrap a legacy bare object array into the current interchange shape.
///
/// The array is moved into `canvas.objects` unchanged. Any other payload is
/// returned as is.
#[must_use]
pub fn migrate(value: Value) -> Value {
    match value {
        Value::Array(objects) => {
            let object_count = objects.len();
            json!({
                "version": DOCUMENT_VERSION,
                "canvas": { "objects": objects },
                "metadata": {
                    "migrated_from": LEGACY_SOURCE,
                    "object_count": object_count,
                },
            })
        }
        other => other,
    }
}

/// Migrate a legacy payload and decode the result.
///
/// # Errors
///
/// See [`from_value`].
pub fn migrate_document(value: Value) -> CodecResult<Document> {
    from_value(migrate(value))
}

/// Decode an interchange JSON value into a document.
///
/// # Errors
///
/// See [`decode`].
pub fn from_value(value: Value) -> CodecResult<Document> {
    let value = if is_legacy(&value) {
        tracing::info!("Migrating legacy bare-array document");
        migrate(value)
    } else {
        value
    };

    let Value::Object(mut root) = value else {
        return Err(CodecError::UnsupportedFormat(
            "expected a document object or a legacy object array".to_string(),
        ));
    };

    let version = match root.remove("version") {
        Some(Value::String(version)) => version,
        Some(other) => {
            return Err(CodecError::UnsupportedFormat(format!(
                "version must be a string, got {other}"
            )))
        }
        None => return Err(CodecError::field("version")),
    };
    check_version(&version)?;

    let Some(Value::Object(mut canvas)) = root.remove("canvas") else {
        return Err(CodecError::field("canvas"));
    };
    let Some(Value::Array(objects)) = canvas.remove("objects") else {
        return Err(CodecError::field("canvas.objects"));
    };

    let width = canvas_number(&mut canvas, "width")?.unwrap_or(DEFAULT_CANVAS_WIDTH);
    let height = canvas_number(&mut canvas, "height")?.unwrap_or(DEFAULT_CANVAS_HEIGHT);
    let background = match canvas.remove("background") {
        None | Some(Value::Null) => DEFAULT_BACKGROUND.to_string(),
        Some(Value::String(color)) => color,
        Some(_) => return Err(CodecError::field("canvas.background")),
    };

    let metadata: DocumentMetadata = match root.remove("metadata") {
        None | Some(Value::Null) => DocumentMetadata::default(),
        Some(raw) => serde_json::from_value(raw).map_err(|e| {
            tracing::debug!("Rejecting metadata block: {e}");
            CodecError::field("metadata")
        })?,
    };

    let mut doc = Document::new(width, height).with_background(background);
    doc.version = version;
    doc.metadata = metadata;
    // The embedded product is rebuilt from live data by `encode_record`.
    root.remove("product");
    doc.extensions = root;
    doc.canvas_extensions = canvas;

    for (index, raw) in objects.into_iter().enumerate() {
        if let Some(object) = object_from_value(raw, index)? {
            doc.push(object);
        }
    }

    Ok(doc)
}

fn check_version(version: &str) -> CodecResult<()> {
    let major = version
        .split('.')
        .next()
        .and_then(|m| m.trim().parse::<u32>().ok());
    match major {
        Some(major) if SUPPORTED_MAJOR_VERSIONS.contains(&major) => Ok(()),
        _ => Err(CodecError::UnsupportedFormat(format!(
            "document version '{version}' is not supported"
        ))),
    }
}

fn canvas_number(canvas: &mut Map<String, Value>, key: &str) -> CodecResult<Option<f64>> {
    match canvas.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(_) => Err(CodecError::field(format!("canvas.{key}"))),
    }
}

/// Remaining fields of one wire object; whatever is not consumed becomes the
/// extension bag.
struct ObjectFields {
    map: Map<String, Value>,
    index: usize,
}

impl ObjectFields {
    fn invalid(&self, key: &str) -> CodecError {
        CodecError::object_field(key, self.index)
    }

    fn number_or(&mut self, key: &str, default: f64) -> CodecResult<f64> {
        match self.map.remove(key) {
            None | Some(Value::Null) => Ok(default),
            Some(Value::Number(n)) => n.as_f64().ok_or_else(|| self.invalid(key)),
            Some(_) => Err(self.invalid(key)),
        }
    }

    fn optional_string(&mut self, key: &str) -> CodecResult<Option<String>> {
        match self.map.remove(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(_) => Err(self.invalid(key)),
        }
    }

    fn string_or(&mut self, key: &str, default: &str) -> CodecResult<String> {
        Ok(self
            .optional_string(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    fn require_string(&mut self, key: &str) -> CodecResult<String> {
        self.optional_string(key)?.ok_or_else(|| self.invalid(key))
    }

    fn font_weight(&mut self) -> CodecResult<String> {
        match self.map.remove("fontWeight") {
            None | Some(Value::Null) => Ok("normal".to_string()),
            Some(Value::String(s)) => Ok(s),
            Some(Value::Number(n)) => Ok(n.to_string()),
            Some(_) => Err(self.invalid("fontWeight")),
        }
    }

    fn text_align(&mut self) -> CodecResult<TextAlign> {
        match self.optional_string("textAlign")? {
            None => Ok(TextAlign::default()),
            Some(name) => TextAlign::parse(&name).ok_or_else(|| self.invalid("textAlign")),
        }
    }

    fn id(&mut self) -> CodecResult<ObjectId> {
        match self.map.remove("id") {
            None | Some(Value::Null) => Ok(ObjectId::from(format!("object-{}", self.index))),
            Some(Value::String(s)) => Ok(ObjectId::from(s)),
            Some(Value::Number(n)) => Ok(ObjectId::from(n.to_string())),
            Some(_) => Err(self.invalid("id")),
        }
    }

    fn clip(&mut self) -> CodecResult<Option<ClipRegion>> {
        match self.map.remove("clipRegion") {
            None | Some(Value::Null) => Ok(None),
            Some(raw) => serde_json::from_value(raw)
                .map(Some)
                .map_err(|_| self.invalid("clipRegion")),
        }
    }

    fn shape(&mut self, geometry: ShapeGeometry) -> CodecResult<Shape> {
        Ok(Shape {
            geometry,
            fill: self.optional_string("fill")?,
            stroke: self.optional_string("stroke")?,
            stroke_width: self.number_or("strokeWidth", 1.0)?,
        })
    }
}

fn object_from_value(raw: Value, index: usize) -> CodecResult<Option<GraphicObject>> {
    let Value::Object(map) = raw else {
        return Err(CodecError::object_field("canvas.objects", index));
    };
    let mut fields = ObjectFields { map, index };

    let tag = match fields.map.remove("type") {
        Some(Value::String(tag)) => tag,
        Some(other) => {
            tracing::warn!(index, "Skipping object with non-string type tag {other}");
            return Ok(None);
        }
        None => {
            tracing::warn!(index, "Skipping object without a type tag");
            return Ok(None);
        }
    };

    let kind = match tag.as_str() {
        "text" => ObjectKind::Text(TextStyle {
            content: fields.string_or("text", "")?,
            font_family: fields.string_or("fontFamily", DEFAULT_FONT_FAMILY)?,
            font_size: fields.number_or("fontSize", 16.0)?,
            font_weight: fields.font_weight()?,
            fill: fields.string_or("fill", "#000000")?,
            align: fields.text_align()?,
            width: fields.number_or("width", 0.0)?,
            height: fields.number_or("height", 0.0)?,
        }),
        "rect" => {
            let geometry = ShapeGeometry::Rect {
                width: fields.number_or("width", 0.0)?,
                height: fields.number_or("height", 0.0)?,
                corner_radius: fields.number_or("rx", 0.0)?,
            };
            ObjectKind::Shape(fields.shape(geometry)?)
        }
        "circle" => {
            let geometry = ShapeGeometry::Circle {
                radius: fields.number_or("radius", 0.0)?,
            };
            ObjectKind::Shape(fields.shape(geometry)?)
        }
        "line" => {
            let geometry = ShapeGeometry::Line {
                dx: fields.number_or("x2", 0.0)?,
                dy: fields.number_or("y2", 0.0)?,
            };
            ObjectKind::Shape(fields.shape(geometry)?)
        }
        "image" => ObjectKind::Image {
            src: fields.require_string("src")?,
            width: fields.number_or("width", 0.0)?,
            height: fields.number_or("height", 0.0)?,
            clip: fields.clip()?,
        },
        unknown => {
            tracing::warn!(index, kind = unknown, "Skipping object of unknown kind");
            return Ok(None);
        }
    };

    let id = fields.id()?;
    let transform = Transform {
        x: fields.number_or("left", 0.0)?,
        y: fields.number_or("top", 0.0)?,
        scale_x: fields.number_or("scaleX", 1.0)?,
        scale_y: fields.number_or("scaleY", 1.0)?,
        rotation: fields.number_or("angle", 0.0)?,
        opacity: fields.number_or("opacity", 1.0)?,
    };
    let style_preset = fields.optional_string("stylePreset")?;

    Ok(Some(GraphicObject {
        id,
        kind,
        transform,
        style_preset,
        extensions: fields.map,
    }))
}

fn object_to_value(object: &GraphicObject) -> Value {
    let mut map = object.extensions.clone();
    let mut put = |key: &str, value: Value| {
        map.insert(key.to_string(), value);
    };

    put("type", json!(object.kind.tag()));
    put("id", json!(object.id.as_str()));
    let t = &object.transform;
    put("left", json!(t.x));
    put("top", json!(t.y));
    put("scaleX", json!(t.scale_x));
    put("scaleY", json!(t.scale_y));
    put("angle", json!(t.rotation));
    put("opacity", json!(t.opacity));
    if let Some(preset) = &object.style_preset {
        put("stylePreset", json!(preset));
    }

    match &object.kind {
        ObjectKind::Text(text) => {
            put("text", json!(text.content));
            put("fontFamily", json!(text.font_family));
            put("fontSize", json!(text.font_size));
            put("fontWeight", json!(text.font_weight));
            put("fill", json!(text.fill));
            put("textAlign", json!(text.align.as_str()));
            put("width", json!(text.width));
            put("height", json!(text.height));
        }
        ObjectKind::Shape(shape) => {
            match shape.geometry {
                ShapeGeometry::Rect {
                    width,
                    height,
                    corner_radius,
                } => {
                    put("width", json!(width));
                    put("height", json!(height));
                    put("rx", json!(corner_radius));
                }
                ShapeGeometry::Circle { radius } => put("radius", json!(radius)),
                ShapeGeometry::Line { dx, dy } => {
                    put("x2", json!(dx));
                    put("y2", json!(dy));
                }
            }
            if let Some(fill) = &shape.fill {
                put("fill", json!(fill));
            }
            if let Some(stroke) = &shape.stroke {
                put("stroke", json!(stroke));
            }
            put("strokeWidth", json!(shape.stroke_width));
        }
        ObjectKind::Image {
            src,
            width,
            height,
            clip,
        } => {
            put("src", json!(src));
            put("width", json!(width));
            put("height", json!(height));
            if let Some(clip) = clip {
                put("clipRegion", json!(clip));
            }
        }
    }

    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::Brand;

    fn sample_document() -> Document {
        let mut doc = Document::new(1080.0, 1080.0).with_background("#fafafa");
        doc.push(
            GraphicObject::new(ObjectKind::Shape(
                Shape::rect(200.0, 100.0, "#ff0000")
                    .with_corner_radius(8.0)
                    .with_stroke("#000000", 2.0),
            ))
            .with_id("card")
            .at(10.0, 20.0)
            .with_style_preset("surface"),
        );
        doc.push(
            GraphicObject::new(ObjectKind::Text(TextStyle {
                content: "ABC123".to_string(),
                font_family: "Inter".to_string(),
                font_size: 42.0,
                font_weight: "bold".to_string(),
                fill: "#111111".to_string(),
                align: TextAlign::Center,
                width: 300.0,
                height: 50.0,
            }))
            .with_id("title")
            .with_transform(Transform {
                x: 40.0,
                y: 60.0,
                scale_x: 1.5,
                scale_y: 1.5,
                rotation: 12.5,
                opacity: 0.8,
            }),
        );
        doc.push(
            GraphicObject::new(ObjectKind::Image {
                src: "https://cdn.example.com/a.png".to_string(),
                width: 400.0,
                height: 300.0,
                clip: Some(ClipRegion {
                    x: 10.0,
                    y: 10.0,
                    width: 380.0,
                    height: 280.0,
                }),
            })
            .with_id("hero"),
        );
        doc.push(
            GraphicObject::new(ObjectKind::Shape(Shape::line(100.0, 0.0, "#333", 3.0)))
                .with_id("rule"),
        );
        doc.push(
            GraphicObject::new(ObjectKind::Shape(Shape::circle(25.0, "#00ff00"))).with_id("dot"),
        );
        doc
    }

    #[test]
    fn test_round_trip_is_field_for_field() {
        let doc = sample_document();
        let text = encode(&doc).expect("encode");
        let back = decode(&text).expect("decode");
        assert_eq!(back, doc);
    }

    #[test]
    fn test_round_trip_preserves_extensions() {
        let raw = json!({
            "version": "2.0",
            "canvas": {
                "objects": [{
                    "type": "rect", "id": "r", "left": 0, "top": 0,
                    "width": 10, "height": 10, "fill": "#fff",
                    "shadow": { "blur": 4 }, "selectable": false
                }],
                "width": 100, "height": 100
            },
            "metadata": { "owner": "studio" }
        });
        let doc = from_value(raw).expect("decode");
        let object = &doc.objects()[0];
        assert_eq!(object.extensions.get("selectable"), Some(&json!(false)));
        assert_eq!(doc.metadata.extensions.get("owner"), Some(&json!("studio")));

        let again = decode(&encode(&doc).expect("encode")).expect("decode");
        assert_eq!(again, doc);
    }

    #[test]
    fn test_unknown_kind_is_skipped() {
        let raw = json!({
            "version": "2.0",
            "canvas": { "objects": [
                { "type": "hologram", "id": "h" },
                { "id": "no-tag" },
                { "type": "circle", "id": "c", "radius": 5 }
            ]}
        });
        let doc = from_value(raw).expect("decode");
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.objects()[0].id.as_str(), "c");
    }

    #[test]
    fn test_malformed_objects_field_fails_with_field_name() {
        let raw = json!({ "version": "2.0", "canvas": { "objects": { "oops": 1 } } });
        match from_value(raw) {
            Err(CodecError::Validation { field, index }) => {
                assert_eq!(field, "canvas.objects");
                assert_eq!(index, None);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_image_without_src_reports_index() {
        let raw = json!({
            "version": "2.0",
            "canvas": { "objects": [
                { "type": "rect", "id": "ok" },
                { "type": "image", "id": "bad" }
            ]}
        });
        match from_value(raw) {
            Err(CodecError::Validation { field, index }) => {
                assert_eq!(field, "src");
                assert_eq!(index, Some(1));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_version_checks() {
        let future = json!({ "version": "9.1", "canvas": { "objects": [] } });
        assert!(matches!(
            from_value(future),
            Err(CodecError::UnsupportedFormat(_))
        ));

        let numeric = json!({ "version": 2, "canvas": { "objects": [] } });
        assert!(matches!(
            from_value(numeric),
            Err(CodecError::UnsupportedFormat(_))
        ));

        let missing = json!({ "canvas": { "objects": [] } });
        assert!(matches!(
            from_value(missing),
            Err(CodecError::Validation { ref field, .. }) if field == "version"
        ));

        assert!(matches!(
            from_value(json!("just a string")),
            Err(CodecError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_legacy_array_migrates_unchanged() {
        let legacy = json!([
            { "type": "text", "id": "a", "text": "Hello", "left": 5, "top": 6 },
            { "type": "rect", "id": "b", "width": 20, "height": 10, "futureField": [1, 2] }
        ]);
        let migrated = migrate(legacy.clone());
        assert_eq!(migrated["version"], json!("2.0"));
        assert_eq!(migrated["canvas"]["objects"], legacy);
        assert!(migrated["metadata"].is_object());

        let doc = migrate_document(legacy).expect("decode");
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.canvas_width, DEFAULT_CANVAS_WIDTH);
    }

    #[test]
    fn test_migrate_passes_current_documents_through() {
        let current = to_value(&sample_document()).expect("value");
        assert_eq!(migrate(current.clone()), current);
    }

    #[test]
    fn test_decode_text_routes_legacy_arrays() {
        let doc = decode(r#"[{"type":"circle","id":"c","radius":3}]"#).expect("decode");
        assert_eq!(doc.version, DOCUMENT_VERSION);
        assert_eq!(doc.objects()[0].id.as_str(), "c");
    }

    #[test]
    fn test_encode_record_embeds_product() {
        let product = Product {
            id: 1,
            code: "ABC123".into(),
            color: "Black".into(),
            product_type: "Sneaker".into(),
            size_range: "36-45".into(),
            price: 59.9,
            currency: "USD".into(),
            brand: Brand {
                id: 3,
                name: "Acme".into(),
            },
            images: vec![],
        };
        let record = encode_record(&sample_document(), Some(&product)).expect("record");
        assert_eq!(record["product"]["code"], json!("ABC123"));
        assert_eq!(record["product"]["brand"]["name"], json!("Acme"));

        // The product block is ignored on decode.
        let doc = from_value(record).expect("decode");
        assert_eq!(doc, sample_document());
    }

    #[test]
    fn test_unknown_root_and_canvas_fields_survive_round_trip() {
        let raw = json!({
            "version": "2.0",
            "canvas": {
                "objects": [],
                "background": "#fff",
                "width": 700,
                "height": 900,
                "zoom": 1.5
            },
            "metadata": {},
            "author": "ops"
        });

        let doc = from_value(raw).expect("decode");
        assert_eq!(doc.canvas_extensions.get("zoom"), Some(&json!(1.5)));
        assert_eq!(doc.extensions.get("author"), Some(&json!("ops")));
        assert!(!doc.canvas_extensions.contains_key("width"));

        let out = to_value(&doc).expect("encode");
        assert_eq!(out["canvas"]["zoom"], json!(1.5));
        assert_eq!(out["author"], json!("ops"));
        assert_eq!(out["canvas"]["width"], json!(700.0));
        assert_eq!(from_value(out).expect("decode again"), doc);
    }
}
