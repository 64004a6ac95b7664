use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use wmgen::config::{self, RunCfg};
use wmgen::fonts::FontLibrary;
use wmgen::patterns::{StyleChoice, WatermarkKind};
use wmgen::pipeline::{self, BatchParams};
use wmgen::samples;

#[derive(Parser)]
#[command(
    name = "wmgen",
    about = "Inject synthetic watermarks into image collections and record ground truth"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Watermark every image in a directory, with sidecars and a run summary.
    Run(RunArgs),
    /// Render one preview per watermark style onto a mock document.
    Samples(SamplesArgs),
}

#[derive(Args)]
struct RunArgs {
    /// YAML run configuration; the flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    input_dir: Option<PathBuf>,
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Style name, or "random" for a fresh draw per image.
    #[arg(long)]
    style: Option<StyleChoice>,
    /// Comma-separated file extensions to consider.
    #[arg(long, value_delimiter = ',')]
    extensions: Option<Vec<String>>,
    #[arg(long)]
    max_images: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
    /// Worker count; defaults to one per CPU.
    #[arg(long)]
    concurrency: Option<usize>,
}

#[derive(Args)]
struct SamplesArgs {
    #[arg(long, default_value = "watermark_samples")]
    output_dir: PathBuf,
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Command::Run(args) => run(args).await,
        Command::Samples(args) => {
            let fonts = FontLibrary::discover();
            let written = samples::generate_samples(&args.output_dir, &fonts, args.seed)?;
            println!(
                "Wrote {} samples to {}",
                written.len(),
                args.output_dir.display()
            );
            Ok(())
        }
    }
}

async fn run(args: RunArgs) -> Result<()> {
    let mut cfg = match &args.config {
        Some(path) => config::load(path)?,
        None => RunCfg::default(),
    };
    if let Some(v) = args.input_dir {
        cfg.input_dir = v;
    }
    if let Some(v) = args.output_dir {
        cfg.output_dir = v;
    }
    if let Some(v) = args.style {
        cfg.style = v.to_string();
    }
    if let Some(v) = args.extensions {
        cfg.extensions = v;
    }
    if let Some(v) = args.max_images {
        cfg.max_images = Some(v);
    }
    if let Some(v) = args.seed {
        cfg.seed = v;
    }
    if let Some(v) = args.concurrency {
        cfg.concurrency = v;
    }

    let style: StyleChoice = cfg.style.parse().map_err(anyhow::Error::msg)?;
    let pool = cfg
        .styles
        .iter()
        .map(|s| s.parse::<WatermarkKind>().map_err(anyhow::Error::msg))
        .collect::<Result<Vec<_>>>()?;
    let concurrency = if cfg.concurrency == 0 {
        std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4)
    } else {
        cfg.concurrency
    };

    let fonts = Arc::new(FontLibrary::discover());
    if fonts.is_empty() {
        tracing::warn!("no usable system fonts found, falling back to the built-in face");
    } else {
        info!(fonts = fonts.len(), "fonts discovered");
    }

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received, finishing in-flight images");
                stop.store(true, Ordering::Relaxed);
            }
        });
    }

    let output_dir = cfg.output_dir.clone();
    let summary = pipeline::run_batch(
        BatchParams {
            input_dir: cfg.input_dir,
            output_dir: cfg.output_dir,
            style,
            pool,
            extensions: cfg.extensions,
            max_images: cfg.max_images,
            seed: cfg.seed,
            concurrency,
        },
        fonts,
        stop,
    )
    .await?;

    println!(
        "Processed {} candidates: {} watermarked, {} failed, {} skipped",
        summary.total_images, summary.successful, summary.failed, summary.skipped
    );
    for (style, count) in &summary.watermark_types {
        println!("  {style}: {count}");
    }
    println!("Output saved to {}", output_dir.display());
    Ok(())
}
