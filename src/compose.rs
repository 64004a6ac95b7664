use image::{imageops, DynamicImage, RgbImage, RgbaImage};

/// Alpha-over composite of one overlay onto an opaque base, flattened to
/// RGB. Overlays are exactly image-sized, so the offset is always (0, 0),
/// and callers composite at most once per image.
pub fn alpha_over(base: &RgbaImage, overlay: &RgbaImage) -> RgbImage {
    debug_assert_eq!(
        (base.width(), base.height()),
        (overlay.width(), overlay.height()),
        "overlay must match the base image size",
    );
    let mut merged = base.clone();
    imageops::overlay(&mut merged, overlay, 0, 0);
    DynamicImage::ImageRgba8(merged).to_rgb8()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(w: u32, h: u32, px: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba(px))
    }

    #[test]
    fn result_is_opaque_and_same_size() {
        let base = solid(64, 48, [10, 20, 30, 255]);
        let overlay = solid(64, 48, [0, 0, 0, 0]);
        let out = alpha_over(&base, &overlay);
        assert_eq!((out.width(), out.height()), (64, 48));
    }

    #[test]
    fn transparent_overlay_leaves_base_untouched() {
        let base = solid(16, 16, [40, 80, 120, 255]);
        let overlay = solid(16, 16, [255, 255, 255, 0]);
        let out = alpha_over(&base, &overlay);
        assert_eq!(out.get_pixel(8, 8).0, [40, 80, 120]);
    }

    #[test]
    fn opaque_overlay_replaces_base() {
        let base = solid(16, 16, [0, 0, 0, 255]);
        let overlay = solid(16, 16, [255, 0, 0, 255]);
        let out = alpha_over(&base, &overlay);
        assert_eq!(out.get_pixel(3, 3).0, [255, 0, 0]);
    }

    #[test]
    fn half_alpha_overlay_blends() {
        let base = solid(8, 8, [0, 0, 0, 255]);
        let overlay = solid(8, 8, [255, 255, 255, 128]);
        let out = alpha_over(&base, &overlay);
        let px = out.get_pixel(4, 4).0;
        for c in px {
            assert!((120..=136).contains(&c), "expected mid-gray, got {px:?}");
        }
    }
}
