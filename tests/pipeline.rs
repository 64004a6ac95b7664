use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use image::{Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::tempdir;

use wmgen::apply::{apply_watermark, ApplyOptions, Outcome, WatermarkMetadata};
use wmgen::fonts::FontLibrary;
use wmgen::patterns::{
    text_with_count, CornerChoice, CornerPos, GenRequest, StyleChoice, WatermarkKind,
    WatermarkParams,
};
use wmgen::pipeline::{run_batch, BatchParams, BatchSummary, DEFAULT_EXTENSIONS, SUMMARY_FILE};
use wmgen::placement::margin_for;

fn write_test_image(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 251) as u8, (y % 251) as u8, 180])
    });
    img.save(path).unwrap();
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}

#[test]
fn undersized_image_skips_without_writing_anything() {
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    let src = dir.path().join("tiny.png");
    write_test_image(&src, 50, 50);

    let fonts = FontLibrary::empty();
    let mut rng = StdRng::seed_from_u64(1);
    let outcome =
        apply_watermark(&src, out.path(), &ApplyOptions::default(), &fonts, &mut rng).unwrap();

    assert!(matches!(outcome, Outcome::TooSmall { width: 50, height: 50 }));
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn corner_watermark_round_trips_through_the_sidecar() {
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    let src = dir.path().join("invoice.png");
    write_test_image(&src, 800, 600);

    let fonts = FontLibrary::empty();
    let mut rng = StdRng::seed_from_u64(2);
    let opts = ApplyOptions {
        style: StyleChoice::Fixed(WatermarkKind::Corner),
        pool: &[],
        seed_text: Some("\u{00a9} 2024 Example Corp"),
        corner: CornerChoice::At(CornerPos::BottomRight),
    };
    let outcome = apply_watermark(&src, out.path(), &opts, &fonts, &mut rng).unwrap();

    let Outcome::Applied { kind, image_path, metadata_path } = outcome else {
        panic!("800x600 must be watermarked");
    };
    assert_eq!(kind, WatermarkKind::Corner);

    let written = image::open(&image_path).unwrap();
    assert_eq!((written.width(), written.height()), (800, 600));

    let raw = std::fs::read_to_string(&metadata_path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["watermark"]["type"], "corner");
    assert_eq!(value["watermark"]["text"], "\u{00a9} 2024 Example Corp");
    assert_eq!(value["watermark"]["corner"], "bottom-right");

    let metadata: WatermarkMetadata = serde_json::from_str(&raw).unwrap();
    assert_eq!(metadata.source_image, "invoice.png");
    assert_eq!((metadata.image_size.width, metadata.image_size.height), (800, 600));
    let WatermarkParams::Corner { corner, .. } = metadata.watermark else {
        panic!("sidecar must carry the corner payload");
    };
    assert_eq!(corner, CornerPos::BottomRight);
}

#[test]
fn text_count_reflects_placements_and_boxes_stay_disjoint() {
    let fonts = FontLibrary::empty();
    let req = GenRequest {
        width: 800,
        height: 600,
        seed_text: None,
        corner: CornerChoice::Random,
    };
    let margin = margin_for(req.width, req.height);

    for seed in 0..10 {
        let mut rng = StdRng::seed_from_u64(seed);
        let (overlay, params) = text_with_count(&req, &fonts, &mut rng, 5);
        assert_eq!((overlay.width(), overlay.height()), (800, 600));

        let WatermarkParams::Text { count, watermarks } = params else {
            panic!("expected the text payload");
        };
        assert!(count <= 5);
        assert_eq!(count, watermarks.len());
        for (i, a) in watermarks.iter().enumerate() {
            assert!(a.bbox.left >= margin && a.bbox.top >= margin);
            assert!(a.bbox.right + margin <= req.width);
            assert!(a.bbox.bottom + margin <= req.height);
            for b in &watermarks[i + 1..] {
                assert!(!a.bbox.overlaps(&b.bbox), "seed {seed}");
            }
        }
    }
}

#[test]
fn same_seed_reproduces_identical_ground_truth() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("page.png");
    write_test_image(&src, 640, 480);
    let fonts = FontLibrary::empty();

    let run = |out: &Path| {
        let mut rng = StdRng::seed_from_u64(99);
        let opts = ApplyOptions {
            style: StyleChoice::Fixed(WatermarkKind::Text),
            ..ApplyOptions::default()
        };
        let outcome = apply_watermark(&src, out, &opts, &fonts, &mut rng).unwrap();
        let Outcome::Applied { metadata_path, .. } = outcome else {
            panic!("expected success");
        };
        let metadata: WatermarkMetadata =
            serde_json::from_str(&std::fs::read_to_string(metadata_path).unwrap()).unwrap();
        metadata.watermark
    };

    let out_a = tempdir().unwrap();
    let out_b = tempdir().unwrap();
    assert_eq!(run(out_a.path()), run(out_b.path()));
}

#[tokio::test]
async fn batch_accounts_for_truncation_skips_and_histogram() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    for i in 0..10 {
        let (w, h) = if i == 2 || i == 5 { (50, 50) } else { (200, 160) };
        write_test_image(&input.path().join(format!("img{i:02}.png")), w, h);
    }

    let summary = run_batch(
        BatchParams {
            input_dir: input.path().to_path_buf(),
            output_dir: output.path().to_path_buf(),
            style: StyleChoice::Random,
            pool: Vec::new(),
            extensions: default_extensions(),
            max_images: Some(8),
            seed: 7,
            concurrency: 4,
        },
        Arc::new(FontLibrary::empty()),
        Arc::new(AtomicBool::new(false)),
    )
    .await
    .unwrap();

    // sorted listing truncates to img00..img07, which includes both tiny ones
    assert_eq!(summary.total_images, 8);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.successful, 6);
    assert_eq!(summary.successful + summary.failed + summary.skipped, 8);
    let histogram_total: u64 = summary.watermark_types.values().sum();
    assert_eq!(histogram_total, summary.successful);

    for i in [0u32, 1, 3, 4, 6, 7] {
        assert!(output.path().join(format!("img{i:02}.png")).exists());
        assert!(output.path().join(format!("img{i:02}.json")).exists());
    }
    for i in [2u32, 5] {
        assert!(!output.path().join(format!("img{i:02}.json")).exists());
    }
    assert!(!output.path().join("img08.json").exists(), "img08 was truncated away");

    let raw = std::fs::read_to_string(output.path().join(SUMMARY_FILE)).unwrap();
    let persisted: BatchSummary = serde_json::from_str(&raw).unwrap();
    assert_eq!(persisted.successful, summary.successful);
    assert_eq!(persisted.watermark_types, summary.watermark_types);
}

#[tokio::test]
async fn corrupt_files_are_counted_failed_without_stopping_the_batch() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    write_test_image(&input.path().join("good.png"), 300, 200);
    std::fs::write(input.path().join("bad.png"), b"not a png at all").unwrap();

    let summary = run_batch(
        BatchParams {
            input_dir: input.path().to_path_buf(),
            output_dir: output.path().to_path_buf(),
            style: StyleChoice::Fixed(WatermarkKind::Grid),
            pool: Vec::new(),
            extensions: default_extensions(),
            max_images: None,
            seed: 3,
            concurrency: 2,
        },
        Arc::new(FontLibrary::empty()),
        Arc::new(AtomicBool::new(false)),
    )
    .await
    .unwrap();

    assert_eq!(summary.total_images, 2);
    assert_eq!(summary.successful, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.watermark_types.get("grid"), Some(&1));
    assert!(output.path().join("good.json").exists());
}

#[tokio::test]
async fn missing_input_directory_is_fatal() {
    let output = tempdir().unwrap();
    let result = run_batch(
        BatchParams {
            input_dir: output.path().join("does-not-exist"),
            output_dir: output.path().to_path_buf(),
            style: StyleChoice::Random,
            pool: Vec::new(),
            extensions: default_extensions(),
            max_images: None,
            seed: 1,
            concurrency: 1,
        },
        Arc::new(FontLibrary::empty()),
        Arc::new(AtomicBool::new(false)),
    )
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn pre_set_stop_flag_still_writes_a_summary() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    write_test_image(&input.path().join("only.png"), 300, 200);

    let summary = run_batch(
        BatchParams {
            input_dir: input.path().to_path_buf(),
            output_dir: output.path().to_path_buf(),
            style: StyleChoice::Random,
            pool: Vec::new(),
            extensions: default_extensions(),
            max_images: None,
            seed: 1,
            concurrency: 1,
        },
        Arc::new(FontLibrary::empty()),
        Arc::new(AtomicBool::new(true)),
    )
    .await
    .unwrap();

    assert_eq!(summary.successful + summary.failed + summary.skipped, 0);
    assert!(output.path().join(SUMMARY_FILE).exists());
}

#[tokio::test]
async fn random_style_pool_restricts_the_histogram() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    for i in 0..6 {
        write_test_image(&input.path().join(format!("doc{i}.png")), 240, 180);
    }

    let pool = vec![WatermarkKind::Corner, WatermarkKind::Stamp];
    let summary = run_batch(
        BatchParams {
            input_dir: input.path().to_path_buf(),
            output_dir: output.path().to_path_buf(),
            style: StyleChoice::Random,
            pool: pool.clone(),
            extensions: default_extensions(),
            max_images: None,
            seed: 11,
            concurrency: 3,
        },
        Arc::new(FontLibrary::empty()),
        Arc::new(AtomicBool::new(false)),
    )
    .await
    .unwrap();

    assert_eq!(summary.successful, 6);
    for style in summary.watermark_types.keys() {
        assert!(
            pool.iter().any(|k| k.as_str() == style),
            "style {style} is outside the configured pool",
        );
    }
}
