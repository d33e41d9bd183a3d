//! Layouts for each named style.
//!
//! Positions are proportional to the canvas so every style works at any
//! document size.

use super::compose::{Composer, TextBox};
use super::{PresetStyle, Role};

pub(super) fn compose(c: &mut Composer<'_>) {
    match c.style() {
        PresetStyle::Minimal => minimal(c),
        PresetStyle::Catalog => catalog(c),
        PresetStyle::Social => social(c),
        PresetStyle::Instagram => instagram(c),
        PresetStyle::Modern => modern(c),
        PresetStyle::Ecommerce => ecommerce(c),
        PresetStyle::BusinessCard => business_card(c),
        PresetStyle::Newsletter => newsletter(c),
        PresetStyle::Banner => banner(c),
        PresetStyle::Collage => collage(c),
    }
}

fn detail_lines(c: &Composer<'_>) -> String {
    let p = c.product();
    [
        ("Type", &p.product_type),
        ("Color", &p.color),
        ("Sizes", &p.size_range),
    ]
    .into_iter()
    .filter(|(_, value)| !value.is_empty())
    .map(|(label, value)| format!("{label}: {value}"))
    .collect::<Vec<_>>()
    .join("\n")
}

fn minimal(c: &mut Composer<'_>) {
    let (w, h) = (c.width(), c.height());
    let margin = w * 0.1;
    let p = c.product();

    c.product_image("photo", 0, (margin, h * 0.1, w - 2.0 * margin, h * 0.55));
    c.text(
        "brand",
        TextBox::new(margin, h * 0.7, w - 2.0 * margin, h * 0.03).centered(),
        Role::Muted,
        p.brand.name.to_uppercase(),
    );
    c.text(
        "code",
        TextBox::new(margin, h * 0.75, w - 2.0 * margin, h * 0.045).heading().centered(),
        Role::Text,
        &p.code,
    );
    let price = c.price_label();
    c.text(
        "price",
        TextBox::new(margin, h * 0.83, w - 2.0 * margin, h * 0.035).centered(),
        Role::Primary,
        price,
    );
}

fn catalog(c: &mut Composer<'_>) {
    let (w, h) = (c.width(), c.height());
    let margin = w * 0.06;
    let p = c.product();

    c.rect("header", 0.0, 0.0, w, h * 0.1, Role::Primary);
    let logo = c.logo();
    c.text(
        "logo",
        TextBox::new(margin, h * 0.025, w * 0.3, h * 0.045).heading(),
        Role::OnPrimary,
        logo,
    );
    c.text(
        "brand",
        TextBox::new(w * 0.4, h * 0.035, w * 0.6 - margin, h * 0.025).right(),
        Role::OnPrimary,
        &p.brand.name,
    );

    let photo_w = w * 0.55;
    c.product_image("photo", 0, (margin, h * 0.14, photo_w, h * 0.6));

    let column_x = margin * 2.0 + photo_w;
    let column_w = w - column_x - margin;
    c.text(
        "code",
        TextBox::new(column_x, h * 0.14, column_w, h * 0.04).heading(),
        Role::Text,
        &p.code,
    );
    c.line("rule", (column_x, h * 0.2), (column_w, 0.0), Role::Muted);
    let details = detail_lines(c);
    c.text(
        "details",
        TextBox::new(column_x, h * 0.23, column_w, h * 0.025),
        Role::Text,
        details,
    );
    let price = c.price_label();
    c.rounded_rect("price-badge", (column_x, h * 0.62, column_w, h * 0.08), 6.0, Role::Accent);
    c.text(
        "price",
        TextBox::new(column_x, h * 0.64, column_w, h * 0.035).heading().centered(),
        Role::OnPrimary,
        price,
    );
    c.rect("footer", 0.0, h * 0.9, w, h * 0.1, Role::Surface);
    c.text(
        "footer-text",
        TextBox::new(margin, h * 0.935, w - 2.0 * margin, h * 0.022).centered(),
        Role::Muted,
        format!("{} catalog", p.brand.name),
    );
}

fn social(c: &mut Composer<'_>) {
    let (w, h) = (c.width(), c.height());
    let p = c.product();

    c.circle("glow", w * 0.15, h * 0.08, w * 0.35, Role::Secondary);
    c.rounded_rect("card", (w * 0.08, h * 0.08, w * 0.84, h * 0.84), 24.0, Role::Surface);
    c.product_image("photo", 0, (w * 0.14, h * 0.13, w * 0.72, h * 0.5));
    c.text(
        "headline",
        TextBox::new(w * 0.12, h * 0.66, w * 0.76, h * 0.05).heading().centered(),
        Role::Primary,
        format!("New from {}", p.brand.name),
    );
    c.text(
        "code",
        TextBox::new(w * 0.12, h * 0.74, w * 0.76, h * 0.03).centered(),
        Role::Text,
        &p.code,
    );
    let price = c.price_label();
    c.circle("price-badge", w * 0.68, h * 0.7, w * 0.11, Role::Accent);
    c.text(
        "price",
        TextBox::new(w * 0.68, h * 0.7 + w * 0.09, w * 0.22, h * 0.03).heading().centered(),
        Role::OnPrimary,
        price,
    );
}

fn instagram(c: &mut Composer<'_>) {
    let (w, h) = (c.width(), c.height());
    let p = c.product();

    c.product_image("photo", 0, (0.0, 0.0, w, h * 0.78));
    c.rect("caption-band", 0.0, h * 0.78, w, h * 0.22, Role::Primary);
    c.text(
        "handle",
        TextBox::new(w * 0.06, h * 0.81, w * 0.88, h * 0.025),
        Role::OnPrimary,
        format!("@{}", p.brand.name.to_lowercase().replace(' ', "")),
    );
    c.text(
        "code",
        TextBox::new(w * 0.06, h * 0.85, w * 0.6, h * 0.04).heading(),
        Role::OnPrimary,
        &p.code,
    );
    let price = c.price_label();
    c.text(
        "price",
        TextBox::new(w * 0.6, h * 0.85, w * 0.34, h * 0.04).heading().right(),
        Role::Accent,
        price,
    );
    c.text(
        "details",
        TextBox::new(w * 0.06, h * 0.92, w * 0.88, h * 0.022),
        Role::OnPrimary,
        format!("{} · {}", p.color, p.size_range),
    );
}

fn modern(c: &mut Composer<'_>) {
    let (w, h) = (c.width(), c.height());
    let p = c.product();
    let split = w * 0.5;

    c.rect("panel", split, 0.0, w - split, h, Role::Surface);
    c.product_image("photo", 0, (w * 0.05, h * 0.15, split - w * 0.1, h * 0.7));
    c.rect("accent-bar", split + w * 0.05, h * 0.2, w * 0.06, h * 0.008, Role::Accent);
    c.text(
        "brand",
        TextBox::new(split + w * 0.05, h * 0.24, w * 0.4, h * 0.025),
        Role::Muted,
        p.brand.name.to_uppercase(),
    );
    c.text(
        "code",
        TextBox::new(split + w * 0.05, h * 0.3, w * 0.4, h * 0.05).heading(),
        Role::Primary,
        &p.code,
    );
    let details = detail_lines(c);
    c.text(
        "details",
        TextBox::new(split + w * 0.05, h * 0.42, w * 0.4, h * 0.022),
        Role::Secondary,
        details,
    );
    let price = c.price_label();
    c.text(
        "price",
        TextBox::new(split + w * 0.05, h * 0.72, w * 0.4, h * 0.05).heading(),
        Role::Accent,
        price,
    );
}

fn ecommerce(c: &mut Composer<'_>) {
    let (w, h) = (c.width(), c.height());
    let margin = w * 0.06;
    let p = c.product();

    c.rect("photo-well", margin, margin, w - 2.0 * margin, h * 0.5, Role::Surface);
    c.product_image(
        "photo",
        0,
        (margin * 1.5, margin * 1.5, w - 3.0 * margin, h * 0.5 - margin),
    );
    c.text(
        "brand",
        TextBox::new(margin, h * 0.58, w - 2.0 * margin, h * 0.022),
        Role::Secondary,
        &p.brand.name,
    );
    c.text(
        "code",
        TextBox::new(margin, h * 0.62, w - 2.0 * margin, h * 0.04).heading(),
        Role::Text,
        format!("{} {}", p.code, p.product_type).trim().to_string(),
    );
    let price = c.price_label();
    c.text(
        "price",
        TextBox::new(margin, h * 0.69, w - 2.0 * margin, h * 0.045).heading(),
        Role::Primary,
        price,
    );
    let details = detail_lines(c);
    c.text(
        "details",
        TextBox::new(margin, h * 0.76, w - 2.0 * margin, h * 0.02),
        Role::Muted,
        details,
    );
    c.rounded_rect("cta", (margin, h * 0.88, w - 2.0 * margin, h * 0.07), 8.0, Role::Accent);
    c.text(
        "cta-label",
        TextBox::new(margin, h * 0.9, w - 2.0 * margin, h * 0.03).heading().centered(),
        Role::Text,
        "Shop now",
    );
}

fn business_card(c: &mut Composer<'_>) {
    let (w, h) = (c.width(), c.height());
    let p = c.product();
    let logo = c.logo();

    c.rect("stripe", 0.0, 0.0, w * 0.04, h, Role::Accent);
    c.frame("border", (w * 0.06, h * 0.06, w * 0.88, h * 0.88), 1.5, Role::Muted);
    c.circle("logo-mark", w * 0.12, h * 0.5 - w * 0.09, w * 0.09, Role::Primary);
    c.text(
        "logo",
        TextBox::new(w * 0.12, h * 0.5 - w * 0.025, w * 0.18, w * 0.045).heading().centered(),
        Role::OnPrimary,
        logo,
    );
    c.text(
        "brand",
        TextBox::new(w * 0.4, h * 0.3, w * 0.5, h * 0.08).heading(),
        Role::Text,
        &p.brand.name,
    );
    c.line("rule", (w * 0.4, h * 0.45), (w * 0.45, 0.0), Role::Accent);
    c.text(
        "tagline",
        TextBox::new(w * 0.4, h * 0.52, w * 0.5, h * 0.05),
        Role::Secondary,
        format!("Featuring {}", p.code),
    );
}

fn newsletter(c: &mut Composer<'_>) {
    let (w, h) = (c.width(), c.height());
    let margin = w * 0.08;
    let p = c.product();

    c.rect("masthead", 0.0, 0.0, w, h * 0.14, Role::Primary);
    c.text(
        "title",
        TextBox::new(margin, h * 0.035, w - 2.0 * margin, h * 0.06).heading().centered(),
        Role::OnPrimary,
        format!("{} News", p.brand.name),
    );
    c.product_image("photo", 0, (margin, h * 0.18, w - 2.0 * margin, h * 0.42));
    c.text(
        "headline",
        TextBox::new(margin, h * 0.63, w - 2.0 * margin, h * 0.04).heading(),
        Role::Text,
        format!("Just arrived: {}", p.code),
    );
    let details = detail_lines(c);
    c.text(
        "body",
        TextBox::new(margin, h * 0.7, w - 2.0 * margin, h * 0.024),
        Role::Text,
        details,
    );
    let price = c.price_label();
    c.rounded_rect("button", (margin, h * 0.85, w * 0.4, h * 0.07), 20.0, Role::Accent);
    c.text(
        "button-label",
        TextBox::new(margin, h * 0.87, w * 0.4, h * 0.03).heading().centered(),
        Role::OnPrimary,
        format!("Order for {price}"),
    );
    c.line("divider", (margin, h * 0.96), (w - 2.0 * margin, 0.0), Role::Muted);
}

fn banner(c: &mut Composer<'_>) {
    let (w, h) = (c.width(), c.height());
    let p = c.product();

    c.rect("accent-block", w * 0.7, 0.0, w * 0.3, h, Role::Secondary);
    c.product_image("photo", 0, (w * 0.72, h * 0.1, w * 0.26, h * 0.8));
    c.text(
        "brand",
        TextBox::new(w * 0.04, h * 0.15, w * 0.6, h * 0.12),
        Role::Muted,
        p.brand.name.to_uppercase(),
    );
    c.text(
        "headline",
        TextBox::new(w * 0.04, h * 0.35, w * 0.6, h * 0.2).heading(),
        Role::Text,
        &p.code,
    );
    let price = c.price_label();
    c.rounded_rect("price-badge", (w * 0.04, h * 0.68, w * 0.2, h * 0.2), 6.0, Role::Accent);
    c.text(
        "price",
        TextBox::new(w * 0.04, h * 0.72, w * 0.2, h * 0.1).heading().centered(),
        Role::OnPrimary,
        price,
    );
}

fn collage(c: &mut Composer<'_>) {
    let (w, h) = (c.width(), c.height());
    let margin = w * 0.05;
    let gap = w * 0.02;
    let p = c.product();

    let tiles = c.image_count().clamp(1, 4);
    let (cols, rows) = match tiles {
        1 => (1, 1),
        2 => (2, 1),
        _ => (2, 2),
    };
    let grid_w = w - 2.0 * margin;
    let grid_h = h * 0.75 - margin;
    let tile_w = (grid_w - gap * f64::from(cols - 1)) / f64::from(cols);
    let tile_h = (grid_h - gap * f64::from(rows - 1)) / f64::from(rows);

    for index in 0..tiles {
        #[allow(clippy::cast_possible_truncation)]
        let (col, row) = ((index as u32) % cols, (index as u32) / cols);
        let x = margin + f64::from(col) * (tile_w + gap);
        let y = margin + f64::from(row) * (tile_h + gap);
        c.product_image(&format!("tile-{}", index + 1), index, (x, y, tile_w, tile_h));
    }

    c.line("rule", (margin, h * 0.8), (grid_w, 0.0), Role::Secondary);
    c.text(
        "code",
        TextBox::new(margin, h * 0.83, grid_w * 0.6, h * 0.04).heading(),
        Role::Text,
        &p.code,
    );
    let price = c.price_label();
    c.text(
        "price",
        TextBox::new(margin + grid_w * 0.6, h * 0.83, grid_w * 0.4, h * 0.04).heading().right(),
        Role::Accent,
        price,
    );
    c.text(
        "brand",
        TextBox::new(margin, h * 0.9, grid_w, h * 0.022),
        Role::Muted,
        &p.brand.name,
    );
}
