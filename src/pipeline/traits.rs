use crate::config::ResolvedParams;
use crate::error::DetectionError;
use crate::types::{ElementPeaks, ProbabilityBatch, SignalBatch};

/// Upstream beat-detection model: raw ECG in, per-frame QRS probabilities out.
pub trait ProbabilityModel: Send + Sync {
    fn produces(&self, signal: &SignalBatch) -> Result<ProbabilityBatch, DetectionError>;
}

/// Turns the probabilities of one batch element into R-peaks.
pub trait PeakPostProcessor: Send + Sync {
    fn process(&self, probs: &[f32], params: &ResolvedParams) -> ElementPeaks;
}
