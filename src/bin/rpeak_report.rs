use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;
use rpeak_rs::{
    DistanceThreshold, ElementPeaks, PostProcessConfig, ProbabilityBatch, RPeakDetectorBuilder,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[path = "rpeak_report/json_report_formatter.rs"]
mod json_report_formatter;

#[derive(Debug, Parser)]
#[command(name = "rpeak_report")]
#[command(about = "Convert per-frame QRS probabilities into R-peak sample indices")]
struct Args {
    /// JSON probability batch: `[[...], ...]`, `[...]` or `{"probabilities": [[...]]}`.
    #[arg(long, env = "RPEAK_REPORT_INPUT")]
    input: PathBuf,
    /// JSON post-process config; flags below override its fields.
    #[arg(long, env = "RPEAK_REPORT_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "RPEAK_REPORT_FS")]
    fs: Option<f64>,
    #[arg(long, env = "RPEAK_REPORT_REDUCTION")]
    reduction: Option<usize>,
    #[arg(long, env = "RPEAK_REPORT_THRESHOLD")]
    threshold: Option<f32>,
    #[arg(long, env = "RPEAK_REPORT_DURATION_MS")]
    duration_ms: Option<f64>,
    /// Minimum, or minimum and maximum, inter-beat distance in ms (e.g. `200,1200`).
    #[arg(long, env = "RPEAK_REPORT_DIST_MS", value_delimiter = ',', num_args = 1..=2)]
    dist_ms: Vec<f64>,
    #[arg(long, env = "RPEAK_REPORT_SKIP_MS")]
    skip_ms: Option<f64>,
    /// Report path; stdout when omitted.
    #[arg(long, env = "RPEAK_REPORT_OUT")]
    out: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct Report {
    meta: Meta,
    elements: Vec<ElementReport>,
}

#[derive(Debug, Serialize)]
struct Meta {
    input: String,
    batch_size: usize,
    frame_count: usize,
    elapsed_ms: f64,
    config: PostProcessConfig,
}

#[derive(Debug, Serialize)]
struct ElementReport {
    index: usize,
    #[serde(flatten)]
    peaks: ElementPeaks,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run() {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = Args::parse();
    let config = build_config(&args)?;

    let batch = ProbabilityBatch::load(&args.input)
        .map_err(|err| format!("Failed to load '{}': {err}", args.input.display()))?;
    tracing::info!(
        input = %args.input.display(),
        batch_size = batch.batch_size(),
        frame_count = batch.frame_count(),
        "loaded probability batch"
    );

    let detector = RPeakDetectorBuilder::new(config)
        .build()
        .map_err(|err| err.to_string())?;
    let started = Instant::now();
    let elements = detector
        .detect_probabilities_with_counts(&batch)
        .map_err(|err| err.to_string())?;
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

    let total_rpeaks: usize = elements.iter().map(|e| e.rpeaks.len()).sum();
    tracing::info!(total_rpeaks, elapsed_ms, "post-processing done");

    let report = Report {
        meta: Meta {
            input: args.input.display().to_string(),
            batch_size: batch.batch_size(),
            frame_count: batch.frame_count(),
            elapsed_ms,
            config: detector.config().clone(),
        },
        elements: elements
            .into_iter()
            .enumerate()
            .map(|(index, peaks)| ElementReport { index, peaks })
            .collect(),
    };
    json_report_formatter::write_report(args.out.as_deref(), &report)
}

fn build_config(args: &Args) -> Result<PostProcessConfig, String> {
    let mut config = match args.config.as_deref() {
        Some(path) => load_config(path)?,
        None => PostProcessConfig::default(),
    };
    if let Some(fs) = args.fs {
        config.fs_hz = fs;
    }
    if let Some(reduction) = args.reduction {
        config.reduction = reduction;
    }
    if let Some(threshold) = args.threshold {
        config.bin_pred_thr = threshold;
    }
    if let Some(duration_ms) = args.duration_ms {
        config.duration_thr_ms = duration_ms;
    }
    if !args.dist_ms.is_empty() {
        config.dist_thr_ms =
            DistanceThreshold::from_slice(&args.dist_ms).map_err(|err| err.to_string())?;
    }
    if let Some(skip_ms) = args.skip_ms {
        config.skip_dist_ms = skip_ms;
    }
    config.validate().map_err(|err| err.to_string())?;
    Ok(config)
}

fn load_config(path: &Path) -> Result<PostProcessConfig, String> {
    PostProcessConfig::load(path)
        .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))
}
