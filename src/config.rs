use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DetectionError;

/// Distance thresholds between consecutive R-peaks, in ms.
///
/// `Single` only enforces the minimum distance. `Range` additionally checks
/// gaps at or above `max_ms` for missed beats. Deserializes from a number,
/// a one-element array or a two-element array (`[200, 1200]`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DistanceThresholdRepr", into = "Vec<f64>")]
pub enum DistanceThreshold {
    Single(f64),
    Range { min_ms: f64, max_ms: f64 },
}

impl DistanceThreshold {
    pub fn from_slice(values_ms: &[f64]) -> Result<Self, DetectionError> {
        match *values_ms {
            [min_ms] => Ok(Self::Single(min_ms)),
            [min_ms, max_ms] => Ok(Self::Range { min_ms, max_ms }),
            [] => Err(DetectionError::config(
                "distance threshold needs at least one value",
            )),
            _ => Err(DetectionError::config(format!(
                "distance threshold accepts at most two values, got {}",
                values_ms.len()
            ))),
        }
    }

    pub fn min_ms(&self) -> f64 {
        match *self {
            Self::Single(min_ms) => min_ms,
            Self::Range { min_ms, .. } => min_ms,
        }
    }

    pub fn max_ms(&self) -> Option<f64> {
        match *self {
            Self::Single(_) => None,
            Self::Range { max_ms, .. } => Some(max_ms),
        }
    }

    fn validate(&self) -> Result<(), DetectionError> {
        require_positive("minimum distance threshold (ms)", self.min_ms())?;
        if let Some(max_ms) = self.max_ms() {
            require_positive("maximum distance threshold (ms)", max_ms)?;
            if max_ms < self.min_ms() {
                return Err(DetectionError::config(format!(
                    "maximum distance threshold {max_ms} ms is below the minimum {} ms",
                    self.min_ms()
                )));
            }
        }
        Ok(())
    }
}

impl From<f64> for DistanceThreshold {
    fn from(min_ms: f64) -> Self {
        Self::Single(min_ms)
    }
}

impl From<DistanceThreshold> for Vec<f64> {
    fn from(value: DistanceThreshold) -> Self {
        match value {
            DistanceThreshold::Single(min_ms) => vec![min_ms],
            DistanceThreshold::Range { min_ms, max_ms } => vec![min_ms, max_ms],
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DistanceThresholdRepr {
    Scalar(f64),
    List(Vec<f64>),
}

impl TryFrom<DistanceThresholdRepr> for DistanceThreshold {
    type Error = DetectionError;

    fn try_from(repr: DistanceThresholdRepr) -> Result<Self, Self::Error> {
        match repr {
            DistanceThresholdRepr::Scalar(min_ms) => Ok(Self::Single(min_ms)),
            DistanceThresholdRepr::List(values) => Self::from_slice(&values),
        }
    }
}

/// Parameters shared by every batch element of one post-processing call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostProcessConfig {
    /// Sampling frequency of the underlying ECG, in Hz.
    #[serde(default = "default_fs_hz")]
    pub fs_hz: f64,
    /// Number of raw samples represented by one probability frame.
    #[serde(default = "default_reduction")]
    pub reduction: usize,
    #[serde(default = "default_bin_pred_thr")]
    pub bin_pred_thr: f32,
    /// Minimum duration of a "true" QRS complex, in ms.
    #[serde(default = "default_duration_thr_ms")]
    pub duration_thr_ms: f64,
    #[serde(default = "default_dist_thr_ms")]
    pub dist_thr_ms: DistanceThreshold,
    /// Peaks closer than this to either end of the signal are discarded, in ms.
    #[serde(default = "default_skip_dist_ms")]
    pub skip_dist_ms: f64,
}

impl PostProcessConfig {
    pub const DEFAULT_FS_HZ: f64 = 200.0;
    pub const DEFAULT_REDUCTION: usize = 1;
    pub const DEFAULT_BIN_PRED_THR: f32 = 0.5;
    pub const DEFAULT_DURATION_THR_MS: f64 = 64.0;
    pub const DEFAULT_DIST_THR_MS: f64 = 200.0;
    pub const DEFAULT_SKIP_DIST_MS: f64 = 500.0;

    pub fn load(path: &Path) -> Result<Self, DetectionError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| DetectionError::io("read post-process config", e))?;
        serde_json::from_str(&data)
            .map_err(|e| DetectionError::json("parse post-process config", e))
    }

    pub fn validate(&self) -> Result<(), DetectionError> {
        require_positive("sampling frequency (Hz)", self.fs_hz)?;
        if self.reduction == 0 {
            return Err(DetectionError::config("reduction factor must be at least 1"));
        }
        if !self.bin_pred_thr.is_finite() {
            return Err(DetectionError::config(format!(
                "binarization threshold must be finite, got {}",
                self.bin_pred_thr
            )));
        }
        require_positive("duration threshold (ms)", self.duration_thr_ms)?;
        self.dist_thr_ms.validate()?;
        if !self.skip_dist_ms.is_finite() || self.skip_dist_ms < 0.0 {
            return Err(DetectionError::config(format!(
                "edge skip distance must be a non-negative number of ms, got {}",
                self.skip_dist_ms
            )));
        }
        Ok(())
    }

    /// Sample spacing in ms.
    pub fn spacing_ms(&self) -> f64 {
        1000.0 / self.fs_hz
    }

    /// Converts the ms-based thresholds into the sample and frame domains
    /// of a batch with `frame_count` frames per element.
    pub fn resolve(&self, frame_count: usize) -> ResolvedParams {
        let spacing_ms = self.spacing_ms();
        ResolvedParams {
            reduction: self.reduction,
            bin_pred_thr: self.bin_pred_thr,
            input_len: self.reduction * frame_count,
            duration_frames: self.duration_thr_ms / spacing_ms / self.reduction as f64,
            min_dist_samples: self.dist_thr_ms.min_ms() / spacing_ms,
            max_dist_samples: self.dist_thr_ms.max_ms().map(|max_ms| max_ms / spacing_ms),
            skip_samples: self.skip_dist_ms / spacing_ms,
        }
    }
}

impl Default for PostProcessConfig {
    fn default() -> Self {
        Self {
            fs_hz: Self::DEFAULT_FS_HZ,
            reduction: Self::DEFAULT_REDUCTION,
            bin_pred_thr: Self::DEFAULT_BIN_PRED_THR,
            duration_thr_ms: Self::DEFAULT_DURATION_THR_MS,
            dist_thr_ms: DistanceThreshold::Single(Self::DEFAULT_DIST_THR_MS),
            skip_dist_ms: Self::DEFAULT_SKIP_DIST_MS,
        }
    }
}

fn default_fs_hz() -> f64 {
    PostProcessConfig::DEFAULT_FS_HZ
}
fn default_reduction() -> usize {
    PostProcessConfig::DEFAULT_REDUCTION
}
fn default_bin_pred_thr() -> f32 {
    PostProcessConfig::DEFAULT_BIN_PRED_THR
}
fn default_duration_thr_ms() -> f64 {
    PostProcessConfig::DEFAULT_DURATION_THR_MS
}
fn default_dist_thr_ms() -> DistanceThreshold {
    DistanceThreshold::Single(PostProcessConfig::DEFAULT_DIST_THR_MS)
}
fn default_skip_dist_ms() -> f64 {
    PostProcessConfig::DEFAULT_SKIP_DIST_MS
}

fn require_positive(what: &str, value: f64) -> Result<(), DetectionError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(DetectionError::config(format!(
            "{what} must be positive, got {value}"
        )))
    }
}

/// [`PostProcessConfig`] expressed in samples and frames for one frame count.
///
/// Thresholds stay fractional; they are compared against integer distances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedParams {
    pub reduction: usize,
    pub bin_pred_thr: f32,
    /// Length of the underlying signal in samples.
    pub input_len: usize,
    pub duration_frames: f64,
    pub min_dist_samples: f64,
    pub max_dist_samples: Option<f64>,
    pub skip_samples: f64,
}
