//! Slot-based drawing helpers shared by every style.

use crate::object::{GraphicObject, ObjectId, ObjectKind, Shape, TextAlign, TextStyle};
use crate::presets::{Palette, PresetConfig, PresetStyle, Role};
use crate::product::Product;
use crate::Document;

const LINE_HEIGHT: f64 = 1.25;

/// Outcome of probing one product image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum ImageSlot {
    /// Loaded; holds the resolved URL.
    Ready(String),
    /// Could not be loaded.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Font {
    Body,
    Heading,
}

/// Placement and typography for a text slot.
#[derive(Debug, Clone, Copy)]
pub(super) struct TextBox {
    x: f64,
    y: f64,
    width: f64,
    size: f64,
    align: TextAlign,
    font: Font,
}

impl TextBox {
    pub(super) fn new(x: f64, y: f64, width: f64, size: f64) -> Self {
        Self {
            x,
            y,
            width,
            size,
            align: TextAlign::Left,
            font: Font::Body,
        }
    }

    pub(super) fn centered(mut self) -> Self {
        self.align = TextAlign::Center;
        self
    }

    pub(super) fn right(mut self) -> Self {
        self.align = TextAlign::Right;
        self
    }

    pub(super) fn heading(mut self) -> Self {
        self.font = Font::Heading;
        self
    }
}

/// Writes role-colored objects with slot-derived IDs into a cleared document.
pub(super) struct Composer<'a> {
    style: PresetStyle,
    doc: &'a mut Document,
    product: &'a Product,
    config: &'a PresetConfig,
    images: &'a [ImageSlot],
    palette: Palette,
    degraded: Vec<String>,
}

impl<'a> Composer<'a> {
    pub(super) fn new(
        style: PresetStyle,
        doc: &'a mut Document,
        product: &'a Product,
        config: &'a PresetConfig,
        images: &'a [ImageSlot],
    ) -> Self {
        let palette = Palette::for_style(style);
        doc.background_color.clone_from(&palette.background);
        Self {
            style,
            doc,
            product,
            config,
            images,
            palette,
            degraded: Vec::new(),
        }
    }

    pub(super) fn style(&self) -> PresetStyle {
        self.style
    }

    pub(super) fn product(&self) -> &'a Product {
        self.product
    }

    pub(super) fn width(&self) -> f64 {
        self.doc.canvas_width
    }

    pub(super) fn height(&self) -> f64 {
        self.doc.canvas_height
    }

    /// Number of product images, loaded or not.
    pub(super) fn image_count(&self) -> usize {
        self.images.len()
    }

    pub(super) fn price_label(&self) -> String {
        self.config
            .format_price(self.product.price, &self.product.currency)
    }

    pub(super) fn logo(&self) -> String {
        self.config.logo_text(&self.product.brand.name)
    }

    fn push(&mut self, slot: &str, kind: ObjectKind, x: f64, y: f64, role: Option<Role>) {
        let mut object = GraphicObject::new(kind)
            .with_id(ObjectId::for_slot(self.style.as_str(), slot))
            .at(x, y);
        if let Some(role) = role {
            object = object.with_style_preset(role.as_str());
        }
        self.doc.push(object);
    }

    pub(super) fn rect(&mut self, slot: &str, x: f64, y: f64, width: f64, height: f64, role: Role) {
        let shape = Shape::rect(width, height, self.palette.color(role));
        self.push(slot, ObjectKind::Shape(shape), x, y, Some(role));
    }

    pub(super) fn rounded_rect(
        &mut self,
        slot: &str,
        (x, y, width, height): (f64, f64, f64, f64),
        radius: f64,
        role: Role,
    ) {
        let shape = Shape::rect(width, height, self.palette.color(role)).with_corner_radius(radius);
        self.push(slot, ObjectKind::Shape(shape), x, y, Some(role));
    }

    /// Unfilled rectangle stroked in the role color.
    pub(super) fn frame(
        &mut self,
        slot: &str,
        (x, y, width, height): (f64, f64, f64, f64),
        stroke_width: f64,
        role: Role,
    ) {
        let mut shape = Shape::rect(width, height, "").with_stroke(self.palette.color(role), stroke_width);
        shape.fill = None;
        self.push(slot, ObjectKind::Shape(shape), x, y, Some(role));
    }

    pub(super) fn circle(&mut self, slot: &str, x: f64, y: f64, radius: f64, role: Role) {
        let shape = Shape::circle(radius, self.palette.color(role));
        self.push(slot, ObjectKind::Shape(shape), x, y, Some(role));
    }

    pub(super) fn line(&mut self, slot: &str, (x, y): (f64, f64), (dx, dy): (f64, f64), role: Role) {
        let shape = Shape::line(dx, dy, self.palette.color(role), 2.0);
        self.push(slot, ObjectKind::Shape(shape), x, y, Some(role));
    }

    /// Text object; height grows with the number of lines.
    pub(super) fn text(&mut self, slot: &str, text_box: TextBox, role: Role, content: impl Into<String>) {
        let content = content.into();
        let lines = content.lines().count().max(1);
        #[allow(clippy::cast_precision_loss)]
        let height = text_box.size * LINE_HEIGHT * lines as f64;
        let (font_family, font_weight) = match text_box.font {
            Font::Body => (self.config.font_family.clone(), "normal"),
            Font::Heading => (self.config.heading_font_family.clone(), "bold"),
        };
        let style = TextStyle {
            content,
            font_family,
            font_size: text_box.size,
            font_weight: font_weight.to_string(),
            fill: self.palette.color(role).to_string(),
            align: text_box.align,
            width: text_box.width,
            height,
        };
        self.push(slot, ObjectKind::Text(style), text_box.x, text_box.y, Some(role));
    }

    /// Product image `index` in the given box.
    ///
    /// A failed load draws a placeholder and records the slot as degraded.
    /// A product without that image draws the placeholder silently.
    pub(super) fn product_image(&mut self, slot: &str, index: usize, frame: (f64, f64, f64, f64)) {
        let images = self.images;
        match images.get(index) {
            Some(ImageSlot::Ready(url)) => {
                let (x, y, width, height) = frame;
                let kind = ObjectKind::Image {
                    src: url.clone(),
                    width,
                    height,
                    clip: None,
                };
                self.push(slot, kind, x, y, None);
            }
            Some(ImageSlot::Failed) => {
                self.placeholder(slot, frame);
                self.degraded.push(slot.to_string());
            }
            None => self.placeholder(slot, frame),
        }
    }

    fn placeholder(&mut self, slot: &str, frame: (f64, f64, f64, f64)) {
        let (x, y, width, height) = frame;
        let shape = Shape::rect(width, height, self.palette.color(Role::Surface))
            .with_stroke(self.palette.color(Role::Muted), 2.0);
        self.push(slot, ObjectKind::Shape(shape), x, y, Some(Role::Surface));

        let size = (width / 16.0).clamp(12.0, 28.0);
        let label = self.config.placeholder_label.clone();
        self.text(
            &format!("{slot}-label"),
            TextBox::new(x, y + height / 2.0 - size / 2.0, width, size).centered(),
            Role::Muted,
            label,
        );
    }

    /// Consume the composer, returning the degraded slot names.
    pub(super) fn finish(self) -> Vec<String> {
        self.degraded
    }
}
