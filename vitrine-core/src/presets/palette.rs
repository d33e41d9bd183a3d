//! Color roles, fixed per-style palettes and the palette randomizer.

use rand::Rng;

use crate::object::ObjectKind;
use crate::presets::PresetStyle;
use crate::Document;

/// What a generated object's color stands for; stored as its style preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Panels and cards drawn over the background.
    Surface,
    /// Dominant brand color.
    Primary,
    /// Supporting color.
    Secondary,
    /// Highlights: price badges, call-to-action buttons.
    Accent,
    /// Body text on the background or surfaces.
    Text,
    /// Text drawn on primary or accent fills.
    OnPrimary,
    /// De-emphasized text, rules and placeholders.
    Muted,
}

impl Role {
    /// Style preset name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Surface => "surface",
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Accent => "accent",
            Self::Text => "text",
            Self::OnPrimary => "on-primary",
            Self::Muted => "muted",
        }
    }

    /// Parse a style preset name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "surface" => Some(Self::Surface),
            "primary" => Some(Self::Primary),
            "secondary" => Some(Self::Secondary),
            "accent" => Some(Self::Accent),
            "text" => Some(Self::Text),
            "on-primary" => Some(Self::OnPrimary),
            "muted" => Some(Self::Muted),
            _ => None,
        }
    }
}

/// A complete set of role colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    /// Canvas background.
    pub background: String,
    /// See [`Role::Surface`].
    pub surface: String,
    /// See [`Role::Primary`].
    pub primary: String,
    /// See [`Role::Secondary`].
    pub secondary: String,
    /// See [`Role::Accent`].
    pub accent: String,
    /// See [`Role::Text`].
    pub text: String,
    /// See [`Role::OnPrimary`].
    pub on_primary: String,
    /// See [`Role::Muted`].
    pub muted: String,
}

impl Palette {
    #[allow(clippy::too_many_arguments)]
    fn from_hex(
        background: &str,
        surface: &str,
        primary: &str,
        secondary: &str,
        accent: &str,
        text: &str,
        on_primary: &str,
        muted: &str,
    ) -> Self {
        Self {
            background: background.to_string(),
            surface: surface.to_string(),
            primary: primary.to_string(),
            secondary: secondary.to_string(),
            accent: accent.to_string(),
            text: text.to_string(),
            on_primary: on_primary.to_string(),
            muted: muted.to_string(),
        }
    }

    /// The fixed palette a style is generated with.
    #[must_use]
    pub fn for_style(style: PresetStyle) -> Self {
        match style {
            PresetStyle::Minimal => Self::from_hex(
                "#ffffff", "#f5f5f5", "#111111", "#555555", "#111111", "#111111", "#ffffff",
                "#9e9e9e",
            ),
            PresetStyle::Catalog => Self::from_hex(
                "#fbfaf7", "#ffffff", "#1f3a5f", "#4d6d9a", "#e07a1f", "#1d1d1d", "#ffffff",
                "#8a8a8a",
            ),
            PresetStyle::Social => Self::from_hex(
                "#ff5a5f", "#ffffff", "#ff5a5f", "#ffb400", "#00a699", "#222222", "#ffffff",
                "#767676",
            ),
            PresetStyle::Instagram => Self::from_hex(
                "#fdf6ec", "#ffffff", "#833ab4", "#fd1d1d", "#fcb045", "#262626", "#ffffff",
                "#8e8e8e",
            ),
            PresetStyle::Modern => Self::from_hex(
                "#0f1115", "#1b1e24", "#f2f2f2", "#9aa0a6", "#00d1b2", "#f2f2f2", "#0f1115",
                "#5f6368",
            ),
            PresetStyle::Ecommerce => Self::from_hex(
                "#ffffff", "#f7f7f7", "#232f3e", "#37475a", "#ff9900", "#0f1111", "#ffffff",
                "#565959",
            ),
            PresetStyle::BusinessCard => Self::from_hex(
                "#f8f5f0", "#ffffff", "#2b2d42", "#8d99ae", "#d90429", "#2b2d42", "#ffffff",
                "#8d99ae",
            ),
            PresetStyle::Newsletter => Self::from_hex(
                "#ffffff", "#f4f1ea", "#264653", "#2a9d8f", "#e76f51", "#1b1b1b", "#ffffff",
                "#6c757d",
            ),
            PresetStyle::Banner => Self::from_hex(
                "#1d3557", "#f1faee", "#1d3557", "#457b9d", "#e63946", "#f1faee", "#ffffff",
                "#a8dadc",
            ),
            PresetStyle::Collage => Self::from_hex(
                "#fffdf7", "#ffffff", "#3d405b", "#81b29a", "#e07a5f", "#3d405b", "#ffffff",
                "#a5a58d",
            ),
        }
    }

    /// Color for a role.
    #[must_use]
    pub fn color(&self, role: Role) -> &str {
        match role {
            Role::Surface => &self.surface,
            Role::Primary => &self.primary,
            Role::Secondary => &self.secondary,
            Role::Accent => &self.accent,
            Role::Text => &self.text,
            Role::OnPrimary => &self.on_primary,
            Role::Muted => &self.muted,
        }
    }

    /// Palette derived from a single hue.
    #[must_use]
    pub fn from_hue(hue: f64) -> Self {
        let complement = (hue + 180.0) % 360.0;
        let split = (hue + 30.0) % 360.0;
        Self {
            background: hsl_to_hex(hue, 0.30, 0.97),
            surface: hsl_to_hex(hue, 0.20, 0.99),
            primary: hsl_to_hex(hue, 0.65, 0.35),
            secondary: hsl_to_hex(split, 0.45, 0.55),
            accent: hsl_to_hex(complement, 0.80, 0.55),
            text: hsl_to_hex(hue, 0.25, 0.12),
            on_primary: "#ffffff".to_string(),
            muted: hsl_to_hex(hue, 0.10, 0.60),
        }
    }

    /// Repaint every role-tagged object and the background.
    ///
    /// A tagged shape with a fill takes its role color as fill and the muted
    /// color as outline; an outline-only shape takes its role color as stroke.
    pub fn apply(&self, doc: &mut Document) {
        doc.background_color.clone_from(&self.background);
        for object in doc.objects_mut() {
            let Some(role) = object.style_preset.as_deref().and_then(Role::parse) else {
                continue;
            };
            let color = self.color(role).to_string();
            match &mut object.kind {
                ObjectKind::Text(text) => text.fill = color,
                ObjectKind::Shape(shape) => {
                    if shape.fill.is_some() {
                        shape.fill = Some(color);
                        // Outlines of filled shapes are always muted
                        if shape.stroke.is_some() {
                            shape.stroke = Some(self.muted.clone());
                        }
                    } else {
                        shape.stroke = Some(color);
                    }
                }
                ObjectKind::Image { .. } => {}
            }
        }
    }
}

/// Repaint a generated document with a random hue.
///
/// Unlike the generators this is intentionally non-deterministic; pass a
/// seeded RNG to reproduce a result.
pub fn randomize_palette<R: Rng + ?Sized>(doc: &mut Document, rng: &mut R) -> Palette {
    let palette = Palette::from_hue(rng.random_range(0.0..360.0));
    palette.apply(doc);
    palette
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn hsl_to_hex(hue: f64, saturation: f64, lightness: f64) -> String {
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let h = hue / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = lightness - c / 2.0;
    let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    format!("#{:02x}{:02x}{:02x}", channel(r), channel(g), channel(b))
}
