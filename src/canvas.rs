use image::{imageops, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use imageproc::rect::Rect;

use crate::fonts::{self, FaceHandle};

pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// A fully transparent scratch layer matching the target image.
pub fn layer(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, TRANSPARENT)
}

/// Alpha-composite `src` onto `dst` at the given offset. Negative offsets
/// and overhang are clipped.
pub fn paste(dst: &mut RgbaImage, src: &RgbaImage, x: i64, y: i64) {
    imageops::overlay(dst, src, x, y);
}

/// Render `text` into a tight transparent block, padded by `pad_frac` of the
/// measured size per axis so rotation does not clip glyph extremities.
pub fn text_block(
    face: &FaceHandle<'_>,
    px: f32,
    color: Rgba<u8>,
    text: &str,
    pad_frac: f32,
) -> RgbaImage {
    let (tw, th) = fonts::measure(face, px, text);
    let pad_x = (tw as f32 * pad_frac) as u32;
    let pad_y = (th as f32 * pad_frac) as u32;
    let mut block = layer(tw + pad_x * 2, th + pad_y * 2);
    fonts::draw(&mut block, color, pad_x as i32, pad_y as i32, px, face, text);
    block
}

/// Rotate `src` by `degrees` into a canvas exactly the size of the rotated
/// bounding box, so nothing is clipped and the result is as tight as
/// possible. The intermediate square is sized to the diagonal, which holds
/// the source under any rotation.
pub fn rotate_expand(src: &RgbaImage, degrees: f32) -> RgbaImage {
    if src.width() == 0 || src.height() == 0 {
        return src.clone();
    }
    let radians = degrees.to_radians();
    let (sin, cos) = (radians.sin().abs(), radians.cos().abs());
    let (w, h) = (src.width() as f32, src.height() as f32);
    let out_w = ((w * cos + h * sin).ceil() as u32).max(1);
    let out_h = ((w * sin + h * cos).ceil() as u32).max(1);

    let diag = (w * w + h * h).sqrt().ceil() as u32;
    let mut square = layer(diag, diag);
    paste(
        &mut square,
        src,
        i64::from((diag - src.width()) / 2),
        i64::from((diag - src.height()) / 2),
    );
    let rotated = rotate_about_center(&square, radians, Interpolation::Bilinear, TRANSPARENT);

    let crop_x = (diag.saturating_sub(out_w)) / 2;
    let crop_y = (diag.saturating_sub(out_h)) / 2;
    imageops::crop_imm(&rotated, crop_x, crop_y, out_w.min(diag), out_h.min(diag)).to_image()
}

/// Stroke an elliptical arc from `start_deg` to `end_deg` (screen-space
/// degrees, y axis pointing down) with the given stroke width. Widths grow
/// inward from the nominal radii.
pub fn stroke_arc(
    canvas: &mut RgbaImage,
    center: (f32, f32),
    rx: f32,
    ry: f32,
    start_deg: f32,
    end_deg: f32,
    width: u32,
    color: Rgba<u8>,
) {
    for inset in 0..width {
        let (rx, ry) = (rx - inset as f32, ry - inset as f32);
        if rx <= 0.0 || ry <= 0.0 {
            break;
        }
        let sweep = (end_deg - start_deg).abs();
        let steps = (sweep.ceil() as usize).max(1);
        let point_at = |deg: f32| {
            let rad = deg.to_radians();
            (center.0 + rx * rad.cos(), center.1 + ry * rad.sin())
        };
        let mut prev = point_at(start_deg);
        for s in 1..=steps {
            let next = point_at(start_deg + (end_deg - start_deg) * s as f32 / steps as f32);
            draw_line_segment_mut(canvas, prev, next, color);
            prev = next;
        }
    }
}

/// Fill a rectangle with rounded corners of the given radius.
pub fn fill_rounded_rect(
    canvas: &mut RgbaImage,
    left: i32,
    top: i32,
    width: u32,
    height: u32,
    radius: u32,
    color: Rgba<u8>,
) {
    let radius = radius.min(width / 2).min(height / 2);
    if radius == 0 {
        draw_filled_rect_mut(canvas, Rect::at(left, top).of_size(width, height), color);
        return;
    }
    let r = radius as i32;
    draw_filled_rect_mut(
        canvas,
        Rect::at(left + r, top).of_size(width - 2 * radius, height),
        color,
    );
    draw_filled_rect_mut(
        canvas,
        Rect::at(left, top + r).of_size(width, height - 2 * radius),
        color,
    );
    let right = left + width as i32 - 1;
    let bottom = top + height as i32 - 1;
    for (cx, cy) in [
        (left + r, top + r),
        (right - r, top + r),
        (left + r, bottom - r),
        (right - r, bottom - r),
    ] {
        draw_filled_circle_mut(canvas, (cx, cy), r, color);
    }
}

/// Outline a rectangle with rounded corners: straight edges plus four
/// quarter arcs, repeated `width` times for stroke thickness.
pub fn stroke_rounded_rect(
    canvas: &mut RgbaImage,
    left: i32,
    top: i32,
    width: u32,
    height: u32,
    radius: u32,
    stroke: u32,
    color: Rgba<u8>,
) {
    let radius = radius.min(width / 2).min(height / 2);
    let r = radius as f32;
    let right = left as f32 + width as f32 - 1.0;
    let bottom = top as f32 + height as f32 - 1.0;
    let (left, top) = (left as f32, top as f32);
    for inset in 0..stroke {
        let o = inset as f32;
        let (l, t, rt, b) = (left + o, top + o, right - o, bottom - o);
        draw_line_segment_mut(canvas, (l + r, t), (rt - r, t), color);
        draw_line_segment_mut(canvas, (l + r, b), (rt - r, b), color);
        draw_line_segment_mut(canvas, (l, t + r), (l, b - r), color);
        draw_line_segment_mut(canvas, (rt, t + r), (rt, b - r), color);
        let arc_r = (r - o).max(1.0);
        stroke_arc(canvas, (l + r, t + r), arc_r, arc_r, 180.0, 270.0, 1, color);
        stroke_arc(canvas, (rt - r, t + r), arc_r, arc_r, 270.0, 360.0, 1, color);
        stroke_arc(canvas, (rt - r, b - r), arc_r, arc_r, 0.0, 90.0, 1, color);
        stroke_arc(canvas, (l + r, b - r), arc_r, arc_r, 90.0, 180.0, 1, color);
    }
}
