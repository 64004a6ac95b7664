use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use indicatif::ProgressBar;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::apply::{self, ApplyOptions, Outcome};
use crate::error::{WmError, WmResult};
use crate::fonts::FontLibrary;
use crate::patterns::{CornerChoice, StyleChoice, WatermarkKind};

pub const DEFAULT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif"];

pub const SUMMARY_FILE: &str = "watermark_summary.json";

/// One record per run, written after the last image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub processing_date: String,
    pub input_folder: String,
    pub output_folder: String,
    /// Candidate files after dedup, sorting and truncation.
    pub total_images: u64,
    pub successful: u64,
    pub failed: u64,
    pub skipped: u64,
    pub watermark_types: BTreeMap<String, u64>,
}

#[derive(Debug, Clone)]
pub struct BatchParams {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub style: StyleChoice,
    /// Candidate styles when `style` is `Random`. Empty means all thirteen.
    pub pool: Vec<WatermarkKind>,
    pub extensions: Vec<String>,
    pub max_images: Option<usize>,
    pub seed: u64,
    pub concurrency: usize,
}

#[derive(Default)]
struct BatchStats {
    successful: u64,
    failed: u64,
    skipped: u64,
    types: BTreeMap<String, u64>,
}

/// Watermark every candidate image under `input_dir`. Per-image problems are
/// tallied and logged, never fatal; a missing input directory or an
/// uncreatable output directory aborts before any image is touched. The
/// `stop` flag is honored between images, and the summary always reflects
/// whatever completed.
pub async fn run_batch(
    params: BatchParams,
    fonts: Arc<FontLibrary>,
    stop: Arc<AtomicBool>,
) -> anyhow::Result<BatchSummary> {
    let files = enumerate_images(&params.input_dir, &params.extensions, params.max_images)
        .with_context(|| format!("cannot enumerate {}", params.input_dir.display()))?;
    std::fs::create_dir_all(&params.output_dir)
        .with_context(|| format!("cannot create {}", params.output_dir.display()))?;
    info!(
        candidates = files.len(),
        input = %params.input_dir.display(),
        "starting batch",
    );

    let bar = ProgressBar::new(files.len() as u64);
    let stats = Arc::new(Mutex::new(BatchStats::default()));
    let semaphore = Arc::new(Semaphore::new(params.concurrency.max(1)));
    let params = Arc::new(params);
    let mut workers: JoinSet<()> = JoinSet::new();

    for (index, path) in files.iter().cloned().enumerate() {
        if stop.load(Ordering::Relaxed) {
            info!("stop requested, not dispatching further images");
            break;
        }
        let permit = semaphore.clone().acquire_owned().await?;
        let params = params.clone();
        let fonts = fonts.clone();
        let stats = stats.clone();
        let bar = bar.clone();

        workers.spawn_blocking(move || {
            let _permit = permit;
            // independent stream per image: reproducible regardless of
            // worker interleaving
            let mut rng = StdRng::seed_from_u64(image_seed(params.seed, index as u64));
            let opts = ApplyOptions {
                style: params.style,
                pool: &params.pool,
                seed_text: None,
                corner: CornerChoice::Random,
            };
            match apply::apply_watermark(&path, &params.output_dir, &opts, &fonts, &mut rng) {
                Ok(Outcome::Applied { kind, .. }) => {
                    let mut stats = stats.lock();
                    stats.successful += 1;
                    *stats.types.entry(kind.as_str().to_owned()).or_insert(0) += 1;
                }
                Ok(Outcome::TooSmall { width, height }) => {
                    warn!(path = %path.display(), width, height, "skipping undersized image");
                    stats.lock().skipped += 1;
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "failed to watermark image");
                    stats.lock().failed += 1;
                }
            }
            bar.inc(1);
        });
    }

    while let Some(joined) = workers.join_next().await {
        if let Err(err) = joined {
            warn!(error = %err, "worker aborted");
            stats.lock().failed += 1;
        }
    }
    bar.finish_and_clear();

    let summary = {
        let stats = stats.lock();
        BatchSummary {
            processing_date: Utc::now().to_rfc3339(),
            input_folder: params.input_dir.display().to_string(),
            output_folder: params.output_dir.display().to_string(),
            total_images: files.len() as u64,
            successful: stats.successful,
            failed: stats.failed,
            skipped: stats.skipped,
            watermark_types: stats.types.clone(),
        }
    };
    write_summary(&params.output_dir, &summary)
        .with_context(|| format!("cannot write summary in {}", params.output_dir.display()))?;
    info!(
        successful = summary.successful,
        failed = summary.failed,
        skipped = summary.skipped,
        "batch complete",
    );
    Ok(summary)
}

/// Files directly under `dir` with a matching extension, case-insensitive,
/// deduplicated and sorted so `max` truncation is reproducible.
pub fn enumerate_images(
    dir: &Path,
    extensions: &[String],
    max: Option<usize>,
) -> WmResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| WmError::io(dir, e))?;
    let mut unique = BTreeSet::new();
    for entry in entries {
        let entry = entry.map_err(|e| WmError::io(dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if extensions
            .iter()
            .any(|want| want.trim_start_matches('.').eq_ignore_ascii_case(ext))
        {
            unique.insert(path);
        }
    }
    let mut files: Vec<PathBuf> = unique.into_iter().collect();
    if let Some(max) = max {
        files.truncate(max);
    }
    Ok(files)
}

fn image_seed(run_seed: u64, index: u64) -> u64 {
    run_seed ^ index.wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

fn write_summary(out_dir: &Path, summary: &BatchSummary) -> WmResult<PathBuf> {
    let path = out_dir.join(SUMMARY_FILE);
    let tmp = out_dir.join(format!("{SUMMARY_FILE}.tmp"));
    let bytes = serde_json::to_vec_pretty(summary)?;
    std::fs::write(&tmp, bytes).map_err(|e| WmError::io(&tmp, e))?;
    std::fs::rename(&tmp, &path).map_err(|e| WmError::io(&path, e))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::write(path, b"x").unwrap();
    }

    #[test]
    fn enumeration_filters_sorts_and_truncates() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("c.png"));
        touch(&dir.path().join("a.jpg"));
        touch(&dir.path().join("B.PNG"));
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join("noext"));

        let exts: Vec<String> = DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect();
        let all = enumerate_images(dir.path(), &exts, None).unwrap();
        let names: Vec<_> = all
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_owned())
            .collect();
        assert_eq!(names, ["B.PNG", "a.jpg", "c.png"]);

        let capped = enumerate_images(dir.path(), &exts, Some(2)).unwrap();
        assert_eq!(capped.len(), 2);
    }

    #[test]
    fn enumeration_accepts_dotted_extension_config() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("scan.jpeg"));
        let files =
            enumerate_images(dir.path(), &[".jpeg".to_string()], None).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn missing_input_dir_is_fatal() {
        let err = enumerate_images(Path::new("/nonexistent/wmgen"), &["png".to_string()], None)
            .unwrap_err();
        assert!(matches!(err, WmError::Io { .. }));
    }

    #[test]
    fn image_seed_varies_by_index_and_run() {
        assert_ne!(image_seed(42, 0), image_seed(42, 1));
        assert_ne!(image_seed(42, 1), image_seed(43, 1));
        assert_eq!(image_seed(42, 7), image_seed(42, 7));
    }
}
