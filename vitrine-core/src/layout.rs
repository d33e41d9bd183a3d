//! Dynamic layout: content bounds, responsive sizing and platform presets.
//!
//! All lookup tables live in [`LayoutConfig`], passed in at construction, so
//! callers can override them without touching the engine.

use serde::{Deserialize, Serialize};

use crate::document::{Dimensions, Document};
use crate::object::Bounds;

/// A named aspect ratio (width / height).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectRatio {
    /// Table key, e.g. "portrait".
    pub name: String,
    /// Width divided by height.
    pub ratio: f64,
}

/// A named output size for a target platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformPreset {
    /// Use-case key, e.g. "instagram-story".
    pub name: String,
    /// Output width.
    pub width: u32,
    /// Output height.
    pub height: u32,
}

impl PlatformPreset {
    fn new(name: &str, width: u32, height: u32) -> Self {
        Self {
            name: name.to_string(),
            width,
            height,
        }
    }

    /// The preset as dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }
}

/// Immutable tables and constants driving the layout engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Space added on every side of the content bounds.
    pub padding: f64,
    /// Snap targets for responsive sizing; earlier entries win ties.
    pub aspect_ratios: Vec<AspectRatio>,
    /// Output sizes per use case.
    pub platform_presets: Vec<PlatformPreset>,
    /// Size returned for unknown use cases.
    pub default_dimensions: Dimensions,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let ratio = |name: &str, ratio: f64| AspectRatio {
            name: name.to_string(),
            ratio,
        };
        Self {
            padding: 50.0,
            aspect_ratios: vec![
                ratio("square", 1.0),
                ratio("portrait", 0.75),
                ratio("landscape", 1.333),
                ratio("instagram", 1.0),
                ratio("facebook", 1.91),
                ratio("twitter", 1.778),
            ],
            platform_presets: vec![
                PlatformPreset::new("social-media", 1080, 1080),
                PlatformPreset::new("instagram-story", 1080, 1920),
                PlatformPreset::new("facebook-post", 1200, 630),
                PlatformPreset::new("twitter-post", 1200, 675),
                PlatformPreset::new("linkedin-post", 1200, 627),
                PlatformPreset::new("print-a4", 2480, 3508),
                PlatformPreset::new("print-letter", 2550, 3300),
                PlatformPreset::new("web-banner", 1200, 300),
                PlatformPreset::new("email-header", 600, 200),
                PlatformPreset::new("catalog", 800, 1000),
                PlatformPreset::new("business-card", 1050, 600),
            ],
            default_dimensions: Dimensions::new(700, 900),
        }
    }
}

/// Flags for [`LayoutEngine::calculate_dynamic_dimensions`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizingOptions {
    /// Snap the result to the nearest named aspect ratio.
    pub responsive: bool,
    /// Grow the output to fit the content plus padding.
    pub auto_scale: bool,
}

/// Computes content bounds and output dimensions.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    /// Create an engine over the given tables.
    #[must_use]
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// The tables in use.
    #[must_use]
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Platform presets in table order.
    #[must_use]
    pub fn platform_presets(&self) -> &[PlatformPreset] {
        &self.config.platform_presets
    }

    /// Smallest rectangle enclosing every object's transformed box.
    ///
    /// An empty document yields the canvas rectangle.
    #[must_use]
    pub fn compute_content_bounds(&self, doc: &Document) -> Bounds {
        doc.objects()
            .iter()
            .map(crate::GraphicObject::bounding_box)
            .reduce(|acc, b| acc.union(&b))
            .unwrap_or_else(|| doc.canvas_bounds())
    }

    /// Derive output dimensions from document content.
    ///
    /// With both flags off, `base` is returned unchanged. Otherwise each axis
    /// becomes `max(base, content span + 2 * padding)`, and with `responsive`
    /// the result is snapped to the nearest named aspect ratio by growing one
    /// axis.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn calculate_dynamic_dimensions(
        &self,
        doc: &Document,
        base: Dimensions,
        options: SizingOptions,
    ) -> Dimensions {
        if !options.responsive && !options.auto_scale {
            return base;
        }

        let bounds = self.compute_content_bounds(doc);
        let padding = self.config.padding * 2.0;
        let fit = |span: f64, base: u32| -> u32 {
            let needed = (span + padding).ceil();
            if needed.is_finite() && needed > f64::from(base) {
                needed.min(f64::from(u32::MAX)) as u32
            } else {
                base
            }
        };
        let mut width = fit(bounds.width(), base.width);
        let mut height = fit(bounds.height(), base.height).max(1);

        if options.responsive {
            let aspect = f64::from(width) / f64::from(height);
            if let Some(target) = self.nearest_aspect_ratio(aspect) {
                let ratio = target.ratio;
                tracing::debug!(
                    aspect,
                    snapped = %target.name,
                    ratio,
                    "Snapping dimensions to aspect ratio"
                );
                if ratio > aspect {
                    width = (f64::from(height) * ratio).round() as u32;
                } else {
                    height = (f64::from(width) / ratio).round() as u32;
                }
            }
        }

        Dimensions::new(width, height)
    }

    /// Table entry closest to `aspect`; ties resolve to the earliest entry.
    #[must_use]
    pub fn nearest_aspect_ratio(&self, aspect: f64) -> Option<&AspectRatio> {
        self.config
            .aspect_ratios
            .iter()
            .filter(|entry| entry.ratio > 0.0)
            .fold(None, |best: Option<&AspectRatio>, entry| match best {
                Some(current)
                    if (current.ratio - aspect).abs() <= (entry.ratio - aspect).abs() =>
                {
                    Some(current)
                }
                _ => Some(entry),
            })
    }

    /// Output size for a named use case, or the default for unknown keys.
    #[must_use]
    pub fn get_optimal_dimensions(&self, use_case: &str) -> Dimensions {
        self.config
            .platform_presets
            .iter()
            .find(|preset| preset.name == use_case)
            .map_or(self.config.default_dimensions, PlatformPreset::dimensions)
    }

    /// Copy of `doc` tagged for `platform` with the preset dimensions recorded
    /// in its metadata. Object positions are left as they are.
    #[must_use]
    pub fn optimize_for_platform(&self, doc: &Document, platform: &str) -> Document {
        let mut optimized = doc.clone();
        optimized.metadata.platform = Some(platform.to_string());
        optimized.metadata.dimensions = Some(self.get_optimal_dimensions(platform));
        optimized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{GraphicObject, ObjectKind, Shape, TextAlign, TextStyle};

    /// A document whose content plus default padding spans exactly `w` x `h`.
    fn content_spanning(w: u32, h: u32) -> Document {
        let mut doc = Document::new(10.0, 10.0);
        doc.push(GraphicObject::new(ObjectKind::Shape(Shape::rect(
            f64::from(w) - 100.0,
            f64::from(h) - 100.0,
            "#000",
        ))));
        doc
    }

    fn responsive() -> SizingOptions {
        SizingOptions {
            responsive: true,
            auto_scale: false,
        }
    }

    #[test]
    fn test_empty_document_bounds_are_canvas() {
        let engine = LayoutEngine::default();
        let doc = Document::new(700.0, 900.0);
        assert_eq!(
            engine.compute_content_bounds(&doc),
            Bounds::from_size(700.0, 900.0)
        );
    }

    #[test]
    fn test_no_flags_returns_base() {
        let engine = LayoutEngine::default();
        let doc = content_spanning(5000, 5000);
        let base = Dimensions::new(640, 480);
        assert_eq!(
            engine.calculate_dynamic_dimensions(&doc, base, SizingOptions::default()),
            base
        );
    }

    #[test]
    fn test_auto_scale_grows_to_content_plus_padding() {
        let engine = LayoutEngine::default();
        let doc = content_spanning(1200, 800);
        let dims = engine.calculate_dynamic_dimensions(
            &doc,
            Dimensions::new(700, 900),
            SizingOptions {
                responsive: false,
                auto_scale: true,
            },
        );
        assert_eq!(dims, Dimensions::new(1200, 900));
    }

    #[test]
    fn test_snaps_to_each_named_ratio() {
        let engine = LayoutEngine::default();
        let cases = [
            ((1000, 1000), "square", 1.0),
            ((760, 1000), "portrait", 0.75),
            ((1320, 1000), "landscape", 1.333),
            ((1900, 1000), "facebook", 1.91),
            ((1770, 1000), "twitter", 1.778),
        ];
        for ((w, h), name, ratio) in cases {
            let doc = content_spanning(w, h);
            let aspect = f64::from(w) / f64::from(h);
            assert_eq!(engine.nearest_aspect_ratio(aspect).map(|r| r.name.as_str()), Some(name));

            let dims = engine.calculate_dynamic_dimensions(&doc, Dimensions::new(1, 1), responsive());
            assert!(
                (dims.aspect_ratio() - ratio).abs() < 0.002,
                "{name}: {dims} has ratio {}",
                dims.aspect_ratio()
            );
            assert!(dims.width >= w && dims.height >= h, "{name}: {dims} shrank");
        }
    }

    #[test]
    fn test_instagram_ties_with_square_and_square_wins() {
        let engine = LayoutEngine::default();
        let winner = engine.nearest_aspect_ratio(1.02).expect("ratio");
        assert_eq!(winner.name, "square");

        let custom = LayoutEngine::new(LayoutConfig {
            aspect_ratios: vec![
                AspectRatio {
                    name: "instagram".into(),
                    ratio: 1.0,
                },
                AspectRatio {
                    name: "square".into(),
                    ratio: 1.0,
                },
            ],
            ..LayoutConfig::default()
        });
        assert_eq!(
            custom.nearest_aspect_ratio(1.02).map(|r| r.name.as_str()),
            Some("instagram")
        );
    }

    #[test]
    fn test_small_text_does_not_expand_base() {
        let engine = LayoutEngine::default();
        let mut doc = Document::new(700.0, 900.0);
        doc.push(
            GraphicObject::new(ObjectKind::Text(TextStyle {
                content: "ABC123".into(),
                font_family: "Inter".into(),
                font_size: 40.0,
                font_weight: "bold".into(),
                fill: "#000".into(),
                align: TextAlign::Left,
                width: 200.0,
                height: 50.0,
            }))
            .at(100.0, 100.0),
        );

        let dims =
            engine.calculate_dynamic_dimensions(&doc, Dimensions::new(700, 900), responsive());
        assert_eq!(dims.width, 700);
        assert!(dims.height >= 900);
        // 700 / 900 snaps to portrait (0.75) by growing the height.
        assert_eq!(dims.height, 933);
    }

    #[test]
    fn test_platform_presets() {
        let engine = LayoutEngine::default();
        assert_eq!(
            engine.get_optimal_dimensions("instagram-story"),
            Dimensions::new(1080, 1920)
        );
        assert_eq!(
            engine.get_optimal_dimensions("business-card"),
            Dimensions::new(1050, 600)
        );
        assert_eq!(engine.get_optimal_dimensions("xyz"), Dimensions::new(700, 900));
        assert_eq!(engine.platform_presets().len(), 11);
    }

    #[test]
    fn test_optimize_for_platform_records_metadata_only() {
        let engine = LayoutEngine::default();
        let doc = content_spanning(300, 300);
        let optimized = engine.optimize_for_platform(&doc, "facebook-post");
        assert_eq!(optimized.metadata.platform.as_deref(), Some("facebook-post"));
        assert_eq!(optimized.metadata.dimensions, Some(Dimensions::new(1200, 630)));
        assert_eq!(optimized.objects(), doc.objects());
        assert!(doc.metadata.platform.is_none());
    }

    #[test]
    fn test_config_overrides_from_json() {
        let config: LayoutConfig = serde_json::from_value(serde_json::json!({
            "padding": 10.0,
            "default_dimensions": { "width": 100, "height": 200 }
        }))
        .expect("config");
        let engine = LayoutEngine::new(config);
        assert_eq!(engine.get_optimal_dimensions("nope"), Dimensions::new(100, 200));
        assert_eq!(engine.config().aspect_ratios.len(), 6);
    }
}
