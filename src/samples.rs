use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::compose;
use crate::fonts::{self, FontLibrary};
use crate::patterns::{self, CornerChoice, CornerPos, GenRequest, WatermarkKind};

const SAMPLE_WIDTH: u32 = 800;
const SAMPLE_HEIGHT: u32 = 600;

/// Write one preview per style onto a mock document, for eyeballing the
/// generators without an input corpus.
pub fn generate_samples(
    out_dir: &Path,
    fonts: &FontLibrary,
    seed: u64,
) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut written = Vec::new();

    for kind in WatermarkKind::ALL {
        let base = document_mock(SAMPLE_WIDTH, SAMPLE_HEIGHT, kind, fonts, &mut rng);
        let req = GenRequest {
            width: SAMPLE_WIDTH,
            height: SAMPLE_HEIGHT,
            seed_text: None,
            corner: CornerChoice::At(CornerPos::BottomRight),
        };
        let (overlay, _) = patterns::generate(kind, &req, fonts, &mut rng);
        let flattened = compose::alpha_over(&base, &overlay);

        let path = out_dir.join(format!("sample_{kind}_watermark.png"));
        flattened.save(&path)?;
        written.push(path);
    }

    info!(count = written.len(), dir = %out_dir.display(), "sample sheet written");
    Ok(written)
}

/// A light gray page with a border, a caption, and ruled lines, so the
/// watermark has something document-like to sit on.
fn document_mock(
    width: u32,
    height: u32,
    kind: WatermarkKind,
    fonts: &FontLibrary,
    rng: &mut StdRng,
) -> RgbaImage {
    let mut page = RgbaImage::from_pixel(width, height, Rgba([240, 240, 240, 255]));
    let frame = Rgba([200, 200, 200, 255]);
    for inset in 0..2i32 {
        draw_hollow_rect_mut(
            &mut page,
            Rect::at(50 + inset, 50 + inset)
                .of_size(width - 100 - 2 * inset as u32, height - 100 - 2 * inset as u32),
            frame,
        );
    }

    let face = fonts.get(rng, false);
    fonts::draw(
        &mut page,
        Rgba([100, 100, 100, 255]),
        60,
        60,
        16.0,
        &face,
        &format!("Sample document - {kind} watermark"),
    );

    let rule = Rgba([220, 220, 220, 255]);
    let mut y = 120.0f32;
    for _ in 0..10 {
        draw_line_segment_mut(&mut page, (80.0, y), (width as f32 - 80.0, y), rule);
        y += 40.0;
    }
    page
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_sample_per_style() {
        let dir = tempfile::tempdir().unwrap();
        let fonts = FontLibrary::empty();
        let written = generate_samples(dir.path(), &fonts, 1).unwrap();
        assert_eq!(written.len(), WatermarkKind::ALL.len());
        for path in written {
            let img = image::open(&path).unwrap();
            assert_eq!((img.width(), img.height()), (SAMPLE_WIDTH, SAMPLE_HEIGHT));
        }
    }
}
