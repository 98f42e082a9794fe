//! R-peak post-processing for per-frame QRS probabilities.
//!
//! Each batch element goes through the same stages: threshold into a mask,
//! extract active intervals, keep those long enough to be a QRS complex,
//! merge peaks closer than the refractory distance, optionally fill
//! oversized gaps with missed beats, then drop peaks near the signal ends.

pub mod config;
pub mod detection;
pub mod error;
pub mod pipeline;
pub mod types;

pub use config::{DistanceThreshold, PostProcessConfig, ResolvedParams};
pub use error::DetectionError;
pub use pipeline::batch::post_process_batch;
pub use pipeline::builder::RPeakDetectorBuilder;
pub use pipeline::defaults::QrsPostProcessor;
pub use pipeline::runtime::RPeakDetector;
pub use pipeline::traits::{PeakPostProcessor, ProbabilityModel};
pub use types::{
    DetectionOutput, ElementPeaks, Interval, Peak, ProbabilityBatch, SignalBatch, StageCounts,
};
