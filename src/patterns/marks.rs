use chrono::{Datelike, Local};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{
    draw_filled_ellipse_mut, draw_filled_rect_mut, draw_hollow_ellipse_mut, draw_hollow_rect_mut,
};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use imageproc::rect::Rect;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::canvas::{self, TRANSPARENT};
use crate::fonts::{self, FontLibrary};
use crate::vocab;

use super::{BadgeShape, CornerChoice, CornerPos, GenRequest, WatermarkParams};

/// Small branded label tucked into one corner, on a dark backing strip.
pub(crate) fn corner(
    req: &GenRequest<'_>,
    fonts: &FontLibrary,
    rng: &mut StdRng,
) -> (RgbaImage, WatermarkParams) {
    let (width, height) = (req.width, req.height);
    let mut layer = canvas::layer(width, height);

    let text = match req.seed_text {
        Some(t) => t.to_owned(),
        None => {
            // brand names plus one extra slot for a copyright line
            let pick = rng.random_range(0..=vocab::BRAND_NAMES.len());
            match vocab::BRAND_NAMES.get(pick) {
                Some(brand) => (*brand).to_owned(),
                None => format!("\u{00a9} {}", Local::now().year()),
            }
        }
    };

    let font_px = (req.min_side() / 20) as f32;
    let face = fonts.get(rng, false);
    let (text_w, text_h) = fonts::measure(&face, font_px, &text);

    let padding = 20i32;
    let corner = match req.corner {
        CornerChoice::At(c) => c,
        CornerChoice::Random => *CornerPos::ALL.choose(rng).unwrap_or(&CornerPos::BottomRight),
    };
    let (x, y) = match corner {
        CornerPos::TopLeft => (padding, padding),
        CornerPos::TopRight => (width as i32 - text_w as i32 - padding, padding),
        CornerPos::BottomLeft => (padding, height as i32 - text_h as i32 - padding),
        CornerPos::BottomRight => (
            width as i32 - text_w as i32 - padding,
            height as i32 - text_h as i32 - padding,
        ),
    };

    let bg_padding = 10i32;
    let bg_opacity: u8 = rng.random_range(60..=90);
    let opacity: u8 = rng.random_range(90..=140);

    draw_filled_rect_mut(
        &mut layer,
        Rect::at(x - bg_padding, y - bg_padding)
            .of_size(text_w + 2 * bg_padding as u32, text_h + 2 * bg_padding as u32),
        Rgba([0, 0, 0, bg_opacity]),
    );
    fonts::draw(&mut layer, Rgba([255, 255, 255, opacity]), x, y, font_px, &face, &text);

    let params = WatermarkParams::Corner { text, corner, opacity };
    (layer, params)
}

/// Centered brand text on a badge shape picked uniformly from rectangle,
/// ellipse, and rounded rectangle.
pub(crate) fn logo(
    req: &GenRequest<'_>,
    fonts: &FontLibrary,
    rng: &mut StdRng,
) -> (RgbaImage, WatermarkParams) {
    let (width, height) = (req.width, req.height);
    let mut layer = canvas::layer(width, height);

    let text = match req.seed_text {
        Some(t) => t.to_owned(),
        None => (*vocab::BRAND_NAMES.choose(rng).unwrap_or(&"ACME Corp")).to_owned(),
    };

    let font_px = (req.min_side() / 12) as f32;
    let face = fonts.get(rng, true);
    let (text_w, text_h) = fonts::measure(&face, font_px, &text);

    let x = (width as i32 - text_w as i32) / 2;
    let y = (height as i32 - text_h as i32) / 2;

    let pad = 30i32;
    let opacity: u8 = rng.random_range(60..=100);
    let shape = *[BadgeShape::Rectangle, BadgeShape::Ellipse, BadgeShape::RoundedRectangle]
        .choose(rng)
        .unwrap_or(&BadgeShape::Rectangle);

    let fill = Rgba([255, 255, 255, opacity]);
    let outline = Rgba([200, 200, 200, opacity + 20]);
    let (left, top) = (x - pad, y - pad);
    let (box_w, box_h) = (text_w + 2 * pad as u32, text_h + 2 * pad as u32);
    const STROKE: i32 = 3;

    match shape {
        BadgeShape::Rectangle => {
            draw_filled_rect_mut(&mut layer, Rect::at(left, top).of_size(box_w, box_h), fill);
            for i in 0..STROKE {
                draw_hollow_rect_mut(
                    &mut layer,
                    Rect::at(left + i, top + i).of_size(
                        (box_w as i32 - 2 * i).max(1) as u32,
                        (box_h as i32 - 2 * i).max(1) as u32,
                    ),
                    outline,
                );
            }
        }
        BadgeShape::Ellipse => {
            let center = (left + box_w as i32 / 2, top + box_h as i32 / 2);
            let (rx, ry) = (box_w as i32 / 2, box_h as i32 / 2);
            draw_filled_ellipse_mut(&mut layer, center, rx, ry, fill);
            for i in 0..STROKE {
                draw_hollow_ellipse_mut(&mut layer, center, (rx - i).max(1), (ry - i).max(1), outline);
            }
        }
        BadgeShape::RoundedRectangle => {
            const RADIUS: u32 = 20;
            canvas::fill_rounded_rect(&mut layer, left, top, box_w, box_h, RADIUS, fill);
            canvas::stroke_rounded_rect(&mut layer, left, top, box_w, box_h, RADIUS, STROKE as u32, outline);
        }
    }

    fonts::draw(
        &mut layer,
        Rgba([0, 0, 0, opacity.saturating_add(100)]),
        x,
        y,
        font_px,
        &face,
        &text,
    );

    let params = WatermarkParams::LogoStyle { text, shape, opacity };
    (layer, params)
}

/// Circular rubber stamp at a random position: two red rings, bold text,
/// a same-day date line, the whole layer then tilted.
pub(crate) fn stamp(
    req: &GenRequest<'_>,
    fonts: &FontLibrary,
    rng: &mut StdRng,
) -> (RgbaImage, WatermarkParams) {
    let (width, height) = (req.width, req.height);
    let mut layer = canvas::layer(width, height);

    let text = match req.seed_text {
        Some(t) => t.to_owned(),
        None => (*vocab::STAMP_TEXTS.choose(rng).unwrap_or(&"APPROVED")).to_owned(),
    };

    let stamp_size = req.min_side() / 4;
    // keep the whole stamp inside the image even after the final tilt
    let margin = stamp_size + 20;
    let cx = rng.random_range(margin..=(width.saturating_sub(margin)).max(margin));
    let cy = rng.random_range(margin..=(height.saturating_sub(margin)).max(margin));

    let opacity: u8 = rng.random_range(90..=150);
    let ink = Rgba([255, 0, 0, opacity]);
    let center = (cx as f32, cy as f32);

    canvas::stroke_arc(&mut layer, center, stamp_size as f32, stamp_size as f32, 0.0, 360.0, 8, ink);
    let inner = stamp_size.saturating_sub(20);
    if inner > 0 {
        canvas::stroke_arc(&mut layer, center, inner as f32, inner as f32, 0.0, 360.0, 4, ink);
    }

    let font_px = (stamp_size / 4).max(4) as f32;
    let face = fonts.get(rng, true);
    let (text_w, text_h) = fonts::measure(&face, font_px, &text);
    fonts::draw(
        &mut layer,
        ink,
        cx as i32 - text_w as i32 / 2,
        cy as i32 - text_h as i32 / 2,
        font_px,
        &face,
        &text,
    );

    let date = Local::now().format("%Y-%m-%d").to_string();
    let date_px = (font_px / 2.0).max(4.0);
    let date_face = fonts.get(rng, false);
    let (date_w, _) = fonts::measure(&date_face, date_px, &date);
    fonts::draw(
        &mut layer,
        ink,
        cx as i32 - date_w as i32 / 2,
        cy as i32 + stamp_size as i32 / 3,
        date_px,
        &date_face,
        &date,
    );

    let angle = rng.random_range(-30..=30);
    let layer = rotate_about_center(
        &layer,
        (angle as f32).to_radians(),
        Interpolation::Bilinear,
        TRANSPARENT,
    );

    let params = WatermarkParams::Stamp { text, date, angle, opacity, position: (cx, cy) };
    (layer, params)
}

/// Concentric broken arcs around the image center, loosely resembling a
/// fingerprint whorl.
pub(crate) fn fingerprint(
    req: &GenRequest<'_>,
    fonts: &FontLibrary,
    rng: &mut StdRng,
) -> (RgbaImage, WatermarkParams) {
    let (width, height) = (req.width, req.height);
    let mut layer = canvas::layer(width, height);

    let center = (width as f32 / 2.0, height as f32 / 2.0);
    let size = req.min_side() / 3;
    let opacity: u8 = rng.random_range(30..=70);
    let color = Rgba([100, 100, 100, opacity]);

    const NUM_RINGS: u32 = 15;
    for ring in 0..NUM_RINGS {
        let radius = size as f32 * (ring + 1) as f32 / NUM_RINGS as f32;
        let start: u32 = rng.random_range(0..=30);
        let mut arc_start = start;
        while arc_start < 360 {
            let arc_end = arc_start + rng.random_range(20..=35);
            canvas::stroke_arc(
                &mut layer,
                center,
                radius,
                radius * 0.7,
                arc_start as f32,
                arc_end as f32,
                2,
                color,
            );
            arc_start += 45;
        }
    }

    if let Some(caption) = req.seed_text {
        let font_px = (size / 10).max(4) as f32;
        let face = fonts.get(rng, false);
        let (caption_w, _) = fonts::measure(&face, font_px, caption);
        fonts::draw(
            &mut layer,
            color,
            width as i32 / 2 - caption_w as i32 / 2,
            height as i32 / 2 + size as i32,
            font_px,
            &face,
            caption,
        );
    }

    let params = WatermarkParams::Fingerprint { size, opacity };
    (layer, params)
}
