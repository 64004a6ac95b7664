use std::path::{Path, PathBuf};

use chrono::Utc;
use image::{ImageFormat, RgbImage};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::compose;
use crate::error::{WmError, WmResult};
use crate::fonts::FontLibrary;
use crate::patterns::{self, CornerChoice, GenRequest, StyleChoice, WatermarkKind, WatermarkParams};

/// Images below this size on either axis are skipped, not failed.
pub const MIN_DIMENSION: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// Ground-truth sidecar written next to every output image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatermarkMetadata {
    pub source_image: String,
    pub timestamp: String,
    pub image_size: ImageSize,
    pub watermark: WatermarkParams,
}

/// What one applier invocation produced.
#[derive(Debug)]
pub enum Outcome {
    Applied {
        kind: WatermarkKind,
        image_path: PathBuf,
        metadata_path: PathBuf,
    },
    TooSmall {
        width: u32,
        height: u32,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct ApplyOptions<'a> {
    pub style: StyleChoice,
    /// Candidate styles when `style` is `Random`. Empty means all thirteen.
    pub pool: &'a [WatermarkKind],
    pub seed_text: Option<&'a str>,
    pub corner: CornerChoice,
}

impl Default for ApplyOptions<'_> {
    fn default() -> Self {
        Self {
            style: StyleChoice::Random,
            pool: &[],
            seed_text: None,
            corner: CornerChoice::Random,
        }
    }
}

/// Watermark one image: decode, generate, composite, persist the flattened
/// PNG and its metadata sidecar, both named after the source's stem.
/// Decode/encode/write problems surface as errors for the caller to tally;
/// an undersized image is an `Outcome`, not an error.
pub fn apply_watermark(
    source: &Path,
    out_dir: &Path,
    opts: &ApplyOptions<'_>,
    fonts: &FontLibrary,
    rng: &mut StdRng,
) -> WmResult<Outcome> {
    let base = image::open(source)
        .map_err(|e| WmError::decode(source, e))?
        .to_rgba8();
    let (width, height) = base.dimensions();
    if width < MIN_DIMENSION || height < MIN_DIMENSION {
        return Ok(Outcome::TooSmall { width, height });
    }

    let kind = match opts.style {
        StyleChoice::Fixed(kind) => kind,
        StyleChoice::Random => {
            let pool = if opts.pool.is_empty() { &WatermarkKind::ALL[..] } else { opts.pool };
            *pool.choose(rng).unwrap_or(&WatermarkKind::Text)
        }
    };

    let req = GenRequest { width, height, seed_text: opts.seed_text, corner: opts.corner };
    let (overlay, params) = patterns::generate(kind, &req, fonts, rng);
    let flattened = compose::alpha_over(&base, &overlay);

    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    let image_path = out_dir.join(format!("{stem}.png"));
    let metadata_path = out_dir.join(format!("{stem}.json"));

    write_image(&image_path, &flattened)?;

    let metadata = WatermarkMetadata {
        source_image: source
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(stem)
            .to_owned(),
        timestamp: Utc::now().to_rfc3339(),
        image_size: ImageSize { width, height },
        watermark: params,
    };
    write_metadata(&metadata_path, &metadata)?;

    Ok(Outcome::Applied { kind, image_path, metadata_path })
}

// Both artifacts go through a tmp file and rename so a crashed run never
// leaves a half-written image or sidecar under the final name.

fn write_image(path: &Path, img: &RgbImage) -> WmResult<()> {
    let tmp = tmp_path(path);
    img.save_with_format(&tmp, ImageFormat::Png)
        .map_err(|e| WmError::encode(path, e))?;
    std::fs::rename(&tmp, path).map_err(|e| WmError::io(path, e))?;
    Ok(())
}

fn write_metadata(path: &Path, metadata: &WatermarkMetadata) -> WmResult<()> {
    let tmp = tmp_path(path);
    let bytes = serde_json::to_vec_pretty(metadata)?;
    std::fs::write(&tmp, bytes).map_err(|e| WmError::io(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| WmError::io(path, e))?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
