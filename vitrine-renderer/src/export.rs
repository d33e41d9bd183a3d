//! Document rendering to image formats.
//!
//! Renders a [`Document`] to PNG, JPEG or SVG using an SVG intermediate
//! representation and the resvg/tiny-skia rasterization pipeline.

use std::collections::HashMap;
use std::fmt::Write;
use std::str::FromStr;
use std::sync::Arc;

use futures::future::join_all;
use image::ImageEncoder;
use serde::{Deserialize, Serialize};
use vitrine_core::{
    Document, GraphicObject, ImageLoader, ImageUrlResolver, ObjectKind, ShapeGeometry, TextAlign,
};

use crate::error::{RenderError, RenderResult};
use crate::image::to_data_uri;
use crate::RenderConfig;

/// Export output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// PNG image.
    #[default]
    Png,
    /// JPEG image.
    Jpeg,
    /// SVG vector graphics (the SVG XML as UTF-8 bytes).
    Svg,
}

impl ExportFormat {
    /// File extension without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Svg => "svg",
        }
    }

    /// MIME type.
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Svg => "image/svg+xml",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "svg" => Ok(Self::Svg),
            other => Err(format!("unsupported export format '{other}'")),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Per-render settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Surface width (default: the document's export width).
    pub width: Option<u32>,
    /// Surface height (default: the document's export height).
    pub height: Option<u32>,
    /// Output format.
    pub format: ExportFormat,
    /// JPEG quality in `0.0..=1.0`.
    pub quality: f32,
    /// Supersampling factor applied to both axes before encoding.
    pub multiplier: f32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            format: ExportFormat::Png,
            quality: 0.92,
            multiplier: 1.0,
        }
    }
}

/// A document painted in list order, ready to encode.
///
/// Every image is already embedded, so encoding never suspends.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSurface {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Background color as hex.
    pub background: String,
    canvas_width: f64,
    canvas_height: f64,
    body: String,
}

impl RenderSurface {
    /// Complete SVG for this surface scaled by `multiplier`.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn to_svg(&self, multiplier: f32) -> String {
        let multiplier = if multiplier.is_finite() && multiplier > 0.0 {
            f64::from(multiplier)
        } else {
            1.0
        };
        let out_w = ((f64::from(self.width) * multiplier).round() as u32).max(1);
        let out_h = ((f64::from(self.height) * multiplier).round() as u32).max(1);

        let mut svg = String::with_capacity(self.body.len() + 512);
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{out_w}\" height=\"{out_h}\">",
        );
        let _ = write!(
            svg,
            "<rect width=\"{out_w}\" height=\"{out_h}\" fill=\"{}\"/>",
            escape_xml(&self.background),
        );
        // Canvas space is letterboxed into the output when the aspect differs
        let _ = write!(
            svg,
            "<svg width=\"{out_w}\" height=\"{out_h}\" viewBox=\"0 0 {} {}\" preserveAspectRatio=\"xMidYMid meet\">",
            self.canvas_width, self.canvas_height,
        );
        svg.push_str(&self.body);
        svg.push_str("</svg></svg>");
        svg
    }
}

/// Renders documents, loading images through the injected seams.
#[derive(Clone)]
pub struct DocumentRenderer {
    loader: Arc<dyn ImageLoader>,
    resolver: Arc<dyn ImageUrlResolver>,
    config: RenderConfig,
    fontdb: Arc<usvg::fontdb::Database>,
}

impl DocumentRenderer {
    /// Create a renderer.
    ///
    /// System fonts are loaded once here when the config asks for them.
    #[must_use]
    pub fn new(
        loader: Arc<dyn ImageLoader>,
        resolver: Arc<dyn ImageUrlResolver>,
        config: RenderConfig,
    ) -> Self {
        let mut fontdb = usvg::fontdb::Database::new();
        if config.load_system_fonts {
            fontdb.load_system_fonts();
            tracing::debug!(faces = fontdb.len(), "Loaded system fonts");
        }
        Self {
            loader,
            resolver,
            config,
            fontdb: Arc::new(fontdb),
        }
    }

    /// The renderer configuration.
    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Paint `doc` onto a surface of the requested size.
    ///
    /// All image loads start together and the render waits for every one.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::ImageLoad`] if any image fails to load; no
    /// partial surface is produced.
    pub async fn render_to_surface(
        &self,
        doc: &Document,
        options: &RenderOptions,
    ) -> RenderResult<RenderSurface> {
        let images = self.load_images(doc).await?;
        let export = doc.export_dimensions();
        let width = options.width.unwrap_or(export.width).max(1);
        let height = options.height.unwrap_or(export.height).max(1);

        let mut body = String::with_capacity(256 * doc.len().max(1));
        for (index, object) in doc.objects().iter().enumerate() {
            render_object_svg(&mut body, index, object, &images);
        }

        tracing::debug!(
            objects = doc.len(),
            images = images.len(),
            width,
            height,
            "Painted document surface"
        );

        Ok(RenderSurface {
            width,
            height,
            background: doc.background_color.clone(),
            canvas_width: doc.canvas_width.max(1.0),
            canvas_height: doc.canvas_height.max(1.0),
            body,
        })
    }

    /// Encode a painted surface.
    ///
    /// `quality` (0.0 to 1.0) applies to JPEG only.
    ///
    /// # Errors
    ///
    /// Returns an error if rasterization or encoding fails.
    pub fn render_to_bytes(
        &self,
        surface: &RenderSurface,
        format: ExportFormat,
        quality: f32,
        multiplier: f32,
    ) -> RenderResult<Vec<u8>> {
        let svg = surface.to_svg(multiplier);
        match format {
            ExportFormat::Svg => Ok(svg.into_bytes()),
            ExportFormat::Png => {
                let pixmap = self.rasterize_svg(&svg)?;
                pixmap
                    .encode_png()
                    .map_err(|e| RenderError::Encode(format!("PNG encoding failed: {e}")))
            }
            ExportFormat::Jpeg => {
                let pixmap = self.rasterize_svg(&svg)?;
                encode_jpeg(&pixmap, parse_hex_color(&surface.background), quality)
            }
        }
    }

    /// Render a document straight to encoded bytes.
    ///
    /// # Errors
    ///
    /// See [`Self::render_to_surface`] and [`Self::render_to_bytes`].
    pub async fn render_document(
        &self,
        doc: &Document,
        options: &RenderOptions,
    ) -> RenderResult<Vec<u8>> {
        let surface = self.render_to_surface(doc, options).await?;
        self.render_to_bytes(&surface, options.format, options.quality, options.multiplier)
    }

    /// Load every distinct image source, keyed by the source as written.
    async fn load_images(&self, doc: &Document) -> RenderResult<HashMap<String, String>> {
        let mut sources: Vec<&str> = Vec::new();
        for object in doc.objects() {
            if let ObjectKind::Image { src, .. } = &object.kind {
                if !sources.contains(&src.as_str()) {
                    sources.push(src);
                }
            }
        }

        let resolved: Vec<String> = sources.iter().map(|s| self.resolver.resolve(s)).collect();
        let results = join_all(resolved.iter().map(|url| self.loader.load(url))).await;

        let mut images = HashMap::with_capacity(sources.len());
        for (src, result) in sources.into_iter().zip(results) {
            let image = result.map_err(|e| {
                tracing::warn!(error = %e, "Image load failed, aborting render");
                e
            })?;
            images.insert(src.to_string(), to_data_uri(&image));
        }
        Ok(images)
    }

    /// Rasterize an SVG string to a tiny-skia Pixmap.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn rasterize_svg(&self, svg: &str) -> RenderResult<tiny_skia::Pixmap> {
        let mut opt = usvg::Options::default();
        opt.fontdb = Arc::clone(&self.fontdb);
        if let Some(family) = &self.config.default_font_family {
            opt.font_family.clone_from(family);
        }

        let tree = usvg::Tree::from_str(svg, &opt)
            .map_err(|e| RenderError::Surface(format!("SVG parsing failed: {e}")))?;

        let px_w = tree.size().width().ceil() as u32;
        let px_h = tree.size().height().ceil() as u32;

        let mut pixmap = tiny_skia::Pixmap::new(px_w.max(1), px_h.max(1)).ok_or_else(|| {
            RenderError::Surface(format!("cannot allocate a {px_w}x{px_h} pixmap"))
        })?;

        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        Ok(pixmap)
    }
}

/// Flatten premultiplied RGBA onto an opaque background as packed RGB.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn flatten_to_rgb(rgba: &[u8], bg: [u8; 3]) -> Vec<u8> {
    let mut rgb_data = Vec::with_capacity(rgba.len() / 4 * 3);
    for pixel in rgba.chunks_exact(4) {
        let inv = 1.0 - f32::from(pixel[3]) / 255.0;
        for channel in 0..3 {
            let value = f32::from(bg[channel]).mul_add(inv, f32::from(pixel[channel]));
            rgb_data.push(value.round().clamp(0.0, 255.0) as u8);
        }
    }
    rgb_data
}

/// Flatten onto the background and encode as JPEG.
fn encode_jpeg(pixmap: &tiny_skia::Pixmap, bg: [u8; 3], quality: f32) -> RenderResult<Vec<u8>> {
    let (width, height) = (pixmap.width(), pixmap.height());
    // tiny-skia stores premultiplied alpha
    let rgb_data = flatten_to_rgb(pixmap.data(), bg);

    let quality = jpeg_quality(quality);
    let mut buf = std::io::Cursor::new(Vec::new());
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality);
    encoder
        .write_image(&rgb_data, width, height, image::ExtendedColorType::Rgb8)
        .map_err(|e| RenderError::Encode(format!("JPEG encoding failed: {e}")))?;

    Ok(buf.into_inner())
}

/// Map a 0.0-1.0 quality onto the encoder's 1-100 scale.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn jpeg_quality(quality: f32) -> u8 {
    if !quality.is_finite() {
        return 92;
    }
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Parse `#rgb` or `#rrggbb`; anything else is white.
fn parse_hex_color(color: &str) -> [u8; 3] {
    let hex = color.trim().trim_start_matches('#');
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    let parsed = match hex.len() {
        3 => hex
            .chars()
            .map(|c| channel(&c.to_string().repeat(2)))
            .collect::<Option<Vec<u8>>>(),
        6 => (0..3)
            .map(|i| hex.get(i * 2..i * 2 + 2).and_then(channel))
            .collect::<Option<Vec<u8>>>(),
        _ => None,
    };
    match parsed.as_deref() {
        Some(&[r, g, b]) => [r, g, b],
        _ => [255, 255, 255],
    }
}

/// Render a single object to SVG.
fn render_object_svg(
    svg: &mut String,
    index: usize,
    object: &GraphicObject,
    images: &HashMap<String, String>,
) {
    let tf = &object.transform;
    // SVG applies the list right to left: rotate, then scale, then translate
    let _ = write!(
        svg,
        "<g transform=\"translate({} {}) scale({} {}) rotate({})\" opacity=\"{}\">",
        tf.x,
        tf.y,
        tf.scale_x,
        tf.scale_y,
        tf.rotation,
        tf.opacity.clamp(0.0, 1.0),
    );

    match &object.kind {
        ObjectKind::Text(text) => {
            let anchor_x = match text.align {
                TextAlign::Left | TextAlign::Justify => 0.0,
                TextAlign::Center => text.width / 2.0,
                TextAlign::Right => text.width,
            };
            let anchor = match text.align {
                TextAlign::Left | TextAlign::Justify => "start",
                TextAlign::Center => "middle",
                TextAlign::Right => "end",
            };
            let _ = write!(
                svg,
                "<text font-family=\"{}\" font-size=\"{}\" font-weight=\"{}\" fill=\"{}\" text-anchor=\"{anchor}\">",
                escape_xml(&text.font_family),
                text.font_size,
                escape_xml(&text.font_weight),
                escape_xml(&text.fill),
            );
            for (line_no, line) in text.content.lines().enumerate() {
                #[allow(clippy::cast_precision_loss)]
                let baseline = text.font_size * (1.0 + 1.25 * line_no as f64);
                let _ = write!(
                    svg,
                    "<tspan x=\"{anchor_x}\" y=\"{baseline}\">{}</tspan>",
                    escape_xml(line),
                );
            }
            svg.push_str("</text>");
        }

        ObjectKind::Shape(shape) => {
            let fill = shape.fill.as_deref().map_or_else(|| "none".to_string(), escape_xml);
            let stroke = shape
                .stroke
                .as_deref()
                .map_or_else(|| "none".to_string(), escape_xml);
            let paint = format!(
                "fill=\"{fill}\" stroke=\"{stroke}\" stroke-width=\"{}\"",
                shape.stroke_width
            );
            match shape.geometry {
                ShapeGeometry::Rect {
                    width,
                    height,
                    corner_radius,
                } => {
                    let _ = write!(
                        svg,
                        "<rect width=\"{width}\" height=\"{height}\" rx=\"{corner_radius}\" {paint}/>",
                    );
                }
                ShapeGeometry::Circle { radius } => {
                    let _ = write!(
                        svg,
                        "<circle cx=\"{radius}\" cy=\"{radius}\" r=\"{radius}\" {paint}/>",
                    );
                }
                ShapeGeometry::Line { dx, dy } => {
                    let _ = write!(svg, "<line x1=\"0\" y1=\"0\" x2=\"{dx}\" y2=\"{dy}\" {paint}/>");
                }
            }
        }

        ObjectKind::Image {
            src,
            width,
            height,
            clip,
        } => {
            let clip_attr = clip.as_ref().map_or_else(String::new, |region| {
                let _ = write!(
                    svg,
                    "<clipPath id=\"clip-{index}\"><rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"/></clipPath>",
                    region.x, region.y, region.width, region.height,
                );
                format!(" clip-path=\"url(#clip-{index})\"")
            });
            // Sources are always loaded before painting starts
            if let Some(data_uri) = images.get(src) {
                let _ = write!(
                    svg,
                    "<image width=\"{width}\" height=\"{height}\" preserveAspectRatio=\"xMidYMid slice\" href=\"{data_uri}\"{clip_attr}/>",
                );
            }
        }
    }

    svg.push_str("</g>");
}

/// Escape XML special characters.
fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
