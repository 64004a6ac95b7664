use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::canvas;
use crate::fonts::{self, FontLibrary};
use crate::vocab;

use super::{GenRequest, WatermarkParams};

fn repeated(text: &str, count: u32) -> String {
    vec![text; count as usize].join(" ")
}

/// Repeated text tiled along the image diagonal. The tile grid extends past
/// the image on every side so rotation leaves no bare corners.
pub(crate) fn diagonal(
    req: &GenRequest<'_>,
    fonts: &FontLibrary,
    rng: &mut StdRng,
) -> (RgbaImage, WatermarkParams) {
    let (width, height) = (req.width, req.height);
    let mut layer = canvas::layer(width, height);

    let text = req.pick_text(rng);
    let repeat_count = rng.random_range(2..=5);
    let final_text = repeated(&text, repeat_count);

    let font_px = (req.min_side() / 15) as f32;
    let face = fonts.get(rng, false);
    let angle = (height as f32 / width as f32).atan().to_degrees();
    let opacity: u8 = rng.random_range(60..=90);
    let color = Rgba([200, 200, 200, opacity]);

    let block = canvas::text_block(&face, font_px, color, &final_text, 0.0);
    let tile = canvas::rotate_expand(&block, -angle);

    let spacing_x = i64::from(width) / 4;
    let spacing_y = i64::from(height) / 4;
    for i in -2..5i64 {
        for j in -2..5i64 {
            canvas::paste(&mut layer, &tile, i * spacing_x, j * spacing_y);
        }
    }

    let params = WatermarkParams::DiagonalPattern { text, repeat_count, final_text, opacity, angle };
    (layer, params)
}

/// Repeated text lines whose vertical offset follows a sine of x.
pub(crate) fn wave(
    req: &GenRequest<'_>,
    fonts: &FontLibrary,
    rng: &mut StdRng,
) -> (RgbaImage, WatermarkParams) {
    let (width, height) = (req.width, req.height);
    let mut layer = canvas::layer(width, height);

    let text = req.pick_text(rng);
    let repeat_count = rng.random_range(2..=5);
    let final_text = repeated(&text, repeat_count);

    let font_px = (req.min_side() / 20) as f32;
    let face = fonts.get(rng, false);
    let opacity: u8 = rng.random_range(70..=90);
    let color = Rgba([200, 200, 200, opacity]);

    let amplitude = height / 10;
    let frequency = 0.02f32;
    let vertical_spacing = height / 6;
    let step = ((final_text.chars().count() as u32) * (font_px as u32) / 2).max(1);

    for line in 0..7u32 {
        let y_base = (line * vertical_spacing) as f32;
        let mut x = 0u32;
        while x < width {
            let y = y_base + amplitude as f32 * (frequency * x as f32 + line as f32).sin();
            fonts::draw(&mut layer, color, x as i32, y as i32, font_px, &face, &final_text);
            x += step;
        }
    }

    let params = WatermarkParams::WavePattern { text, repeat_count, final_text, amplitude, opacity };
    (layer, params)
}

/// Text wrapped around a circle, one tangentially rotated glyph at a time.
pub(crate) fn circular(
    req: &GenRequest<'_>,
    fonts: &FontLibrary,
    rng: &mut StdRng,
) -> (RgbaImage, WatermarkParams) {
    let (width, height) = (req.width, req.height);
    let mut layer = canvas::layer(width, height);

    let text = req.pick_text(rng);
    let repeat_count = rng.random_range(2..=4);
    let ring_text = repeated(&text, repeat_count);
    let unit = format!("{ring_text} \u{2022} ");

    let center = (width as f32 / 2.0, height as f32 / 2.0);
    let radius = req.min_side() / 3;
    let font_px = (radius / 8).max(4) as f32;
    let face = fonts.get(rng, false);

    let (unit_width, _) = fonts::measure(&face, font_px, &unit);
    let circumference = 2.0 * std::f32::consts::PI * radius as f32;
    let laps = (circumference / unit_width.max(1) as f32) as usize + 1;
    let full_text = unit.repeat(laps);

    let opacity: u8 = rng.random_range(70..=100);
    let color = Rgba([255, 255, 255, opacity]);

    let glyph_count = full_text.chars().count();
    let angle_step = 360.0 / glyph_count as f32;
    let cell = (font_px * 2.0) as u32;
    let mut buf = [0u8; 4];
    for (i, ch) in full_text.chars().enumerate() {
        let deg = i as f32 * angle_step;
        let rad = deg.to_radians();
        let x = center.0 + radius as f32 * rad.cos();
        let y = center.1 + radius as f32 * rad.sin();

        let mut glyph = canvas::layer(cell, cell);
        fonts::draw(
            &mut glyph,
            color,
            (font_px / 2.0) as i32,
            (font_px / 2.0) as i32,
            font_px,
            &face,
            ch.encode_utf8(&mut buf),
        );
        let rotated = canvas::rotate_expand(&glyph, deg + 90.0);
        canvas::paste(
            &mut layer,
            &rotated,
            (x - font_px) as i64,
            (y - font_px) as i64,
        );
    }

    let params = WatermarkParams::CircularText {
        text,
        repeat_count,
        final_text: ring_text,
        radius,
        opacity,
    };
    (layer, params)
}

/// Sunburst: N evenly spaced rays from the center, each carrying the text
/// rotated to run along the ray.
pub(crate) fn radial(
    req: &GenRequest<'_>,
    fonts: &FontLibrary,
    rng: &mut StdRng,
) -> (RgbaImage, WatermarkParams) {
    let (width, height) = (req.width, req.height);
    let mut layer = canvas::layer(width, height);

    let text = req.pick_text(rng);
    let repeat_count = rng.random_range(2..=4);
    let final_text = repeated(&text, repeat_count);

    let center = (width as f32 / 2.0, height as f32 / 2.0);
    let num_rays = 12u32;
    let font_px = (req.min_side() / 25).max(4) as f32;
    let face = fonts.get(rng, false);
    let opacity: u8 = rng.random_range(80..=150);

    let block = canvas::text_block(&face, font_px, Rgba([255, 255, 255, opacity]), &final_text, 0.0);
    let line_color = Rgba([200, 200, 200, opacity / 2]);

    for ray in 0..num_rays {
        let deg = 360.0 / num_rays as f32 * ray as f32;
        let rad = deg.to_radians();
        let end = (
            center.0 + width as f32 / 2.0 * rad.cos(),
            center.1 + height as f32 / 2.0 * rad.sin(),
        );
        draw_line_segment_mut(&mut layer, center, end, line_color);

        let rotated = canvas::rotate_expand(&block, deg);
        let steps = 5;
        for step in 1..steps {
            let t = step as f32 / steps as f32;
            let x = center.0 + t * (end.0 - center.0);
            let y = center.1 + t * (end.1 - center.1);
            canvas::paste(
                &mut layer,
                &rotated,
                (x - rotated.width() as f32 / 2.0) as i64,
                (y - rotated.height() as f32 / 2.0) as i64,
            );
        }
    }

    let params = WatermarkParams::Radial { text, repeat_count, final_text, num_rays, opacity };
    (layer, params)
}

/// A sparse lattice of a single repeated symbol.
pub(crate) fn grid(
    req: &GenRequest<'_>,
    fonts: &FontLibrary,
    rng: &mut StdRng,
) -> (RgbaImage, WatermarkParams) {
    let (width, height) = (req.width, req.height);
    let mut layer = canvas::layer(width, height);

    let symbol = match req.seed_text {
        Some(t) => t.to_owned(),
        None => (*vocab::GRID_SYMBOLS.choose(rng).unwrap_or(&"+")).to_owned(),
    };
    let grid_size: u32 = rng.random_range(50..=100);
    let opacity: u8 = rng.random_range(80..=150);
    let color = Rgba([150, 150, 150, opacity]);
    let font_px = (grid_size / 3) as f32;
    let face = fonts.get(rng, false);

    for x in (0..width).step_by(grid_size as usize) {
        for y in (0..height).step_by(grid_size as usize) {
            fonts::draw(&mut layer, color, x as i32, y as i32, font_px, &face, &symbol);
        }
    }

    let params = WatermarkParams::Grid { symbol, grid_size, opacity };
    (layer, params)
}

/// Tiled cells, each with its own randomized pastel border and short label.
pub(crate) fn mosaic(
    req: &GenRequest<'_>,
    fonts: &FontLibrary,
    rng: &mut StdRng,
) -> (RgbaImage, WatermarkParams) {
    let (width, height) = (req.width, req.height);
    let mut layer = canvas::layer(width, height);

    let text = match req.seed_text {
        Some(t) => t.to_owned(),
        None => (*vocab::MOSAIC_TEXTS.choose(rng).unwrap_or(&"PROTECTED")).to_owned(),
    };
    let tile_size = req.min_side() / 8;
    let font_px = (tile_size / 3) as f32;
    let face = fonts.get(rng, false);

    let label: String = text.chars().take(4).collect();
    let (label_w, label_h) = fonts::measure(&face, font_px, &label);

    for x in (0..width).step_by(tile_size as usize) {
        for y in (0..height).step_by(tile_size as usize) {
            let opacity: u8 = rng.random_range(10..=60);
            let color = Rgba([
                rng.random_range(180..=255),
                rng.random_range(180..=255),
                rng.random_range(180..=255),
                opacity,
            ]);
            draw_hollow_rect_mut(
                &mut layer,
                Rect::at(x as i32, y as i32).of_size(tile_size, tile_size),
                color,
            );
            let label_x = x as i32 + (tile_size as i32 - label_w as i32) / 2;
            let label_y = y as i32 + (tile_size as i32 - label_h as i32) / 2;
            fonts::draw(&mut layer, color, label_x, label_y, font_px, &face, &label);
        }
    }

    let params = WatermarkParams::Mosaic { text, tile_size };
    (layer, params)
}
