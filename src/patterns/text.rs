use image::{Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::Rng;

use crate::canvas;
use crate::fonts::FontLibrary;
use crate::placement::{self, BoundingBox};
use crate::vocab;

use super::{GenRequest, PlacementRecord, WatermarkParams};

/// 1-5 independently placed, rotated text instances.
pub(crate) fn generate(
    req: &GenRequest<'_>,
    fonts: &FontLibrary,
    rng: &mut StdRng,
) -> (RgbaImage, WatermarkParams) {
    let requested = rng.random_range(1..=5);
    with_count(req, fonts, rng, requested)
}

/// Place up to `requested` instances. Instances whose placement budget runs
/// out are dropped silently; `count` in the payload reflects only what
/// actually landed on the layer.
pub fn with_count(
    req: &GenRequest<'_>,
    fonts: &FontLibrary,
    rng: &mut StdRng,
    requested: u32,
) -> (RgbaImage, WatermarkParams) {
    let (width, height) = (req.width, req.height);
    let mut layer = canvas::layer(width, height);
    let mut occupied: Vec<BoundingBox> = Vec::new();
    let mut records: Vec<PlacementRecord> = Vec::new();

    for _ in 0..requested {
        let base_text = req.pick_text(rng);
        let number = rng.random_range(1..=5);
        let final_text = format!("{base_text} {number}");

        let divisor = rng.random_range(12..=18);
        let font_px = (req.min_side() / divisor) as f32;
        let face = fonts.get(rng, true);

        let opacity: u8 = rng.random_range(80..=120);
        let color = vocab::palette_color(rng);
        let block = canvas::text_block(
            &face,
            font_px,
            Rgba([color[0], color[1], color[2], opacity]),
            &final_text,
            0.3,
        );

        let rotation = rng.random_range(-45..=45);
        let rotated = canvas::rotate_expand(&block, rotation as f32);

        let Some(bbox) = placement::place(rng, width, height, rotated.width(), rotated.height(), &occupied)
        else {
            continue;
        };

        canvas::paste(&mut layer, &rotated, i64::from(bbox.left), i64::from(bbox.top));
        occupied.push(bbox);
        records.push(PlacementRecord {
            base_text,
            number,
            final_text,
            color,
            opacity,
            rotation,
            coordinates: (bbox.left, bbox.top),
            bbox,
        });
    }

    let params = WatermarkParams::Text { count: records.len(), watermarks: records };
    (layer, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::CornerChoice;
    use rand::SeedableRng;

    fn request(width: u32, height: u32) -> GenRequest<'static> {
        GenRequest { width, height, seed_text: None, corner: CornerChoice::Random }
    }

    #[test]
    fn count_matches_recorded_instances() {
        let fonts = FontLibrary::empty();
        let mut rng = StdRng::seed_from_u64(1);
        let (_, params) = generate(&request(800, 600), &fonts, &mut rng);
        let WatermarkParams::Text { count, watermarks } = params else {
            panic!("text generator must emit a text payload");
        };
        assert_eq!(count, watermarks.len());
        assert!(count <= 5);
    }

    #[test]
    fn placed_instances_never_overlap_and_stay_in_margin() {
        let fonts = FontLibrary::empty();
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let req = request(640, 480);
            let margin = crate::placement::margin_for(req.width, req.height);
            let (_, params) = with_count(&req, &fonts, &mut rng, 5);
            let WatermarkParams::Text { watermarks, .. } = params else {
                panic!("expected text payload");
            };
            for (i, a) in watermarks.iter().enumerate() {
                assert!(a.bbox.left >= margin && a.bbox.top >= margin);
                assert!(a.bbox.right + margin <= req.width);
                assert!(a.bbox.bottom + margin <= req.height);
                for b in &watermarks[i + 1..] {
                    assert!(!a.bbox.overlaps(&b.bbox), "seed {seed}: {:?} vs {:?}", a.bbox, b.bbox);
                }
            }
        }
    }

    #[test]
    fn crowded_image_drops_instances_instead_of_failing() {
        let fonts = FontLibrary::empty();
        let mut rng = StdRng::seed_from_u64(2);
        // small canvas, large demand: some of the 5 won't fit
        let (_, params) = with_count(&request(140, 110), &fonts, &mut rng, 5);
        let WatermarkParams::Text { count, watermarks } = params else {
            panic!("expected text payload");
        };
        assert!(count <= 5);
        assert_eq!(count, watermarks.len());
    }

    #[test]
    fn seed_text_overrides_vocabulary() {
        let fonts = FontLibrary::empty();
        let mut rng = StdRng::seed_from_u64(3);
        let req = GenRequest {
            width: 800,
            height: 600,
            seed_text: Some("ACME INTERNAL"),
            corner: CornerChoice::Random,
        };
        let (_, params) = with_count(&req, &fonts, &mut rng, 3);
        let WatermarkParams::Text { watermarks, .. } = params else {
            panic!("expected text payload");
        };
        for record in &watermarks {
            assert_eq!(record.base_text, "ACME INTERNAL");
            assert_eq!(record.final_text, format!("ACME INTERNAL {}", record.number));
        }
    }

    #[test]
    fn metadata_is_reproducible_for_a_seed() {
        let fonts = FontLibrary::empty();
        let run = || {
            let mut rng = StdRng::seed_from_u64(9);
            let (_, params) = generate(&request(500, 400), &fonts, &mut rng);
            serde_json::to_string(&params).unwrap()
        };
        assert_eq!(run(), run());
    }
}
