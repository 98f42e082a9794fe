use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DetectionError;

/// Rectangular `(batch, frames)` array of per-frame QRS probabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProbabilityBatchRepr", into = "Vec<Vec<f32>>")]
pub struct ProbabilityBatch {
    batch_size: usize,
    frame_count: usize,
    values: Vec<f32>,
}

impl ProbabilityBatch {
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self, DetectionError> {
        let frame_count = rows.first().map_or(0, Vec::len);
        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != frame_count)
        {
            return Err(DetectionError::shape(format!(
                "batch element {idx} has {} frames, expected {frame_count}",
                row.len()
            )));
        }
        Ok(Self {
            batch_size: rows.len(),
            frame_count,
            values: rows.into_iter().flatten().collect(),
        })
    }

    /// Promotes one probability sequence to a single-element batch.
    pub fn from_single(row: Vec<f32>) -> Self {
        Self {
            batch_size: 1,
            frame_count: row.len(),
            values: row,
        }
    }

    pub fn load(path: &Path) -> Result<Self, DetectionError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| DetectionError::io("read probability batch", e))?;
        Self::from_json(&data)
    }

    /// Parses a nested array, a flat sequence or `{"probabilities": ...}`.
    ///
    /// Malformed JSON is a `Json` error; well-formed JSON of any other shape
    /// is a `Shape` error.
    pub fn from_json(data: &str) -> Result<Self, DetectionError> {
        let repr: ProbabilityBatchRepr = serde_json::from_str(data)
            .map_err(|e| DetectionError::json("parse probability batch", e))?;
        Self::try_from(repr)
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn row(&self, idx: usize) -> &[f32] {
        &self.values[idx * self.frame_count..(idx + 1) * self.frame_count]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> + '_ {
        (0..self.batch_size).map(move |idx| self.row(idx))
    }

    pub(crate) fn values(&self) -> &[f32] {
        &self.values
    }
}

impl From<ProbabilityBatch> for Vec<Vec<f32>> {
    fn from(batch: ProbabilityBatch) -> Self {
        batch.rows().map(<[f32]>::to_vec).collect()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ProbabilityBatchRepr {
    Batch(Vec<Vec<f32>>),
    Single(Vec<f32>),
    Wrapped { probabilities: Vec<Vec<f32>> },
    Other(serde_json::Value),
}

impl TryFrom<ProbabilityBatchRepr> for ProbabilityBatch {
    type Error = DetectionError;

    fn try_from(repr: ProbabilityBatchRepr) -> Result<Self, Self::Error> {
        match repr {
            ProbabilityBatchRepr::Batch(rows) | ProbabilityBatchRepr::Wrapped { probabilities: rows } => {
                Self::from_rows(rows)
            }
            ProbabilityBatchRepr::Single(row) => Ok(Self::from_single(row)),
            ProbabilityBatchRepr::Other(_) => Err(DetectionError::shape(
                "expected a (batch, frames) array of numbers or a single frame sequence",
            )),
        }
    }
}

/// Raw ECG input for a [`crate::ProbabilityModel`], shaped `(batch, leads, samples)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalBatch {
    batch_size: usize,
    lead_count: usize,
    sample_count: usize,
    values: Vec<f32>,
}

impl SignalBatch {
    pub fn from_batch(batch: Vec<Vec<Vec<f32>>>) -> Result<Self, DetectionError> {
        let lead_count = batch.first().map_or(0, Vec::len);
        let sample_count = batch
            .first()
            .and_then(|leads| leads.first())
            .map_or(0, Vec::len);
        for (b_idx, leads) in batch.iter().enumerate() {
            if leads.len() != lead_count {
                return Err(DetectionError::shape(format!(
                    "batch element {b_idx} has {} leads, expected {lead_count}",
                    leads.len()
                )));
            }
            if let Some((l_idx, lead)) = leads
                .iter()
                .enumerate()
                .find(|(_, lead)| lead.len() != sample_count)
            {
                return Err(DetectionError::shape(format!(
                    "batch element {b_idx}, lead {l_idx} has {} samples, expected {sample_count}",
                    lead.len()
                )));
            }
        }
        Ok(Self {
            batch_size: batch.len(),
            lead_count,
            sample_count,
            values: batch.into_iter().flatten().flatten().collect(),
        })
    }

    /// Promotes a `(leads, samples)` recording to a single-element batch.
    pub fn from_leads(leads: Vec<Vec<f32>>) -> Result<Self, DetectionError> {
        Self::from_batch(vec![leads])
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn lead_count(&self) -> usize {
        self.lead_count
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Samples of one lead of one batch element.
    pub fn lead(&self, b_idx: usize, l_idx: usize) -> &[f32] {
        let start = (b_idx * self.lead_count + l_idx) * self.sample_count;
        &self.values[start..start + self.sample_count]
    }
}

/// Half-open `[start, end)` run of active frames in a binary mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    pub start: usize,
    pub end: usize,
}

impl Interval {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start < end, "interval [{start}, {end}) is empty");
        Self { start, end }
    }

    /// Number of frames covered.
    pub fn duration(&self) -> usize {
        self.end - self.start
    }

    /// Midpoint of the interval mapped to the sample domain, floored.
    pub fn midpoint_sample(&self, reduction: usize) -> usize {
        reduction * (self.start + self.end) / 2
    }
}

/// R-peak candidate in the sample domain, with the interval it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Peak {
    pub index: usize,
    pub interval: Interval,
}

impl Peak {
    pub fn new(index: usize, interval: Interval) -> Self {
        Self { index, interval }
    }

    pub fn from_interval(interval: Interval, reduction: usize) -> Self {
        Self::new(interval.midpoint_sample(reduction), interval)
    }

    /// Frame of the probability sequence this peak reads its score from.
    pub fn frame(&self, reduction: usize) -> usize {
        self.index / reduction
    }
}

/// Per-stage counters for one batch element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StageCounts {
    pub intervals: usize,
    pub candidates: usize,
    pub merged_away: usize,
    pub gap_filled: usize,
    pub edge_trimmed: usize,
}

/// Final R-peaks of one batch element.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ElementPeaks {
    /// Zero-based sample indices, strictly increasing.
    pub rpeaks: Vec<usize>,
    pub counts: StageCounts,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectionOutput {
    pub probabilities: ProbabilityBatch,
    /// One strictly increasing sample-index sequence per batch element.
    pub rpeaks: Vec<Vec<usize>>,
}
