use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use rand::rngs::StdRng;
use rand::Rng;

use crate::canvas;
use crate::fonts::{self, FontLibrary};

use super::{GenRequest, WatermarkParams};

/// Abstract barcode: random-width vertical bars with ~70% fill probability
/// and a numeric caption. Visually plausible, deliberately not decodable.
pub(crate) fn barcode(
    req: &GenRequest<'_>,
    fonts: &FontLibrary,
    rng: &mut StdRng,
) -> (RgbaImage, WatermarkParams) {
    let (width, height) = (req.width, req.height);
    let mut layer = canvas::layer(width, height);

    let barcode_w = req.min_side() / 2;
    let barcode_h = barcode_w / 4;
    let x_start = (width - barcode_w) / 2;
    let y_start = (height - barcode_h) / 2;

    let opacity: u8 = rng.random_range(60..=140);
    let ink = Rgba([0, 0, 0, opacity]);
    let num_bars: u32 = rng.random_range(30..=50);

    for bar in 0..num_bars {
        let bar_w: u32 = rng.random_range(2..=8);
        let x = x_start + bar * barcode_w / num_bars;
        if rng.random_bool(0.7) {
            draw_filled_rect_mut(
                &mut layer,
                Rect::at(x as i32, y_start as i32).of_size(bar_w, barcode_h.max(1)),
                ink,
            );
        }
    }

    let text = match req.seed_text {
        Some(t) => t.to_owned(),
        None => format!(
            "{}-{}",
            rng.random_range(100_000..=999_999u32),
            rng.random_range(100..=999u32)
        ),
    };
    let font_px = (barcode_h / 4).max(4) as f32;
    let face = fonts.get(rng, false);
    let (text_w, _) = fonts::measure(&face, font_px, &text);
    fonts::draw(
        &mut layer,
        ink,
        (x_start + barcode_w / 2) as i32 - text_w as i32 / 2,
        (y_start + barcode_h + 10) as i32,
        font_px,
        &face,
        &text,
    );

    let params = WatermarkParams::Barcode { text, opacity };
    (layer, params)
}

/// QR-look-alike: three finder markers plus a random module field. Like the
/// barcode, it only has to look the part.
pub(crate) fn qr(
    req: &GenRequest<'_>,
    _fonts: &FontLibrary,
    rng: &mut StdRng,
) -> (RgbaImage, WatermarkParams) {
    let (width, height) = (req.width, req.height);
    let mut layer = canvas::layer(width, height);

    let qr_size = req.min_side() / 4;
    let module = (qr_size / 20).max(1);
    let x_start = (width - qr_size) / 2;
    let y_start = (height - qr_size) / 2;

    let opacity: u8 = rng.random_range(50..=90);
    let dark = Rgba([0, 0, 0, opacity]);
    let light = Rgba([255, 255, 255, opacity]);

    let marker = module * 7;
    let corners = [
        (x_start, y_start),
        (x_start + qr_size - marker, y_start),
        (x_start, y_start + qr_size - marker),
    ];
    for (cx, cy) in corners {
        draw_filled_rect_mut(&mut layer, Rect::at(cx as i32, cy as i32).of_size(marker, marker), dark);
        draw_filled_rect_mut(
            &mut layer,
            Rect::at((cx + module) as i32, (cy + module) as i32)
                .of_size((marker - 2 * module).max(1), (marker - 2 * module).max(1)),
            light,
        );
        draw_filled_rect_mut(
            &mut layer,
            Rect::at((cx + 2 * module) as i32, (cy + 2 * module) as i32)
                .of_size(marker.saturating_sub(4 * module).max(1), marker.saturating_sub(4 * module).max(1)),
            dark,
        );
    }

    for i in 8..20u32 {
        for j in 8..20u32 {
            if rng.random_bool(0.5) {
                draw_filled_rect_mut(
                    &mut layer,
                    Rect::at((x_start + i * module) as i32, (y_start + j * module) as i32)
                        .of_size(module, module),
                    dark,
                );
            }
        }
    }

    let params = WatermarkParams::QrStyle { size: qr_size, opacity };
    (layer, params)
}
