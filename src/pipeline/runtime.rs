use crate::config::PostProcessConfig;
use crate::error::DetectionError;
use crate::pipeline::batch::run_batch;
use crate::pipeline::traits::{PeakPostProcessor, ProbabilityModel};
use crate::types::{DetectionOutput, ElementPeaks, ProbabilityBatch, SignalBatch};

pub struct RPeakDetector {
    config: PostProcessConfig,
    model: Option<Box<dyn ProbabilityModel>>,
    post_processor: Box<dyn PeakPostProcessor>,
}

pub(crate) struct RPeakDetectorParts {
    pub config: PostProcessConfig,
    pub model: Option<Box<dyn ProbabilityModel>>,
    pub post_processor: Box<dyn PeakPostProcessor>,
}

impl RPeakDetector {
    pub(crate) fn from_parts(parts: RPeakDetectorParts) -> Self {
        Self {
            config: parts.config,
            model: parts.model,
            post_processor: parts.post_processor,
        }
    }

    pub fn config(&self) -> &PostProcessConfig {
        &self.config
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// R-peaks of every batch element, from precomputed probabilities.
    pub fn detect_probabilities(
        &self,
        probabilities: &ProbabilityBatch,
    ) -> Result<Vec<Vec<usize>>, DetectionError> {
        Ok(self
            .detect_probabilities_with_counts(probabilities)?
            .into_iter()
            .map(|element| element.rpeaks)
            .collect())
    }

    /// Like [`Self::detect_probabilities`], keeping per-stage counters.
    pub fn detect_probabilities_with_counts(
        &self,
        probabilities: &ProbabilityBatch,
    ) -> Result<Vec<ElementPeaks>, DetectionError> {
        run_batch(probabilities, &self.config, self.post_processor.as_ref())
    }

    /// Runs the model on raw ECG, then post-processes its probabilities.
    pub fn detect(&self, signal: &SignalBatch) -> Result<DetectionOutput, DetectionError> {
        let model = self.model.as_ref().ok_or_else(|| {
            DetectionError::runtime("detect", "no probability model configured")
        })?;

        let probabilities = model.produces(signal)?;
        if probabilities.batch_size() != signal.batch_size() {
            return Err(DetectionError::shape(format!(
                "model returned {} batch elements for {} inputs",
                probabilities.batch_size(),
                signal.batch_size()
            )));
        }
        let expected_frames = signal.sample_count() / self.config.reduction.max(1);
        if probabilities.frame_count() != expected_frames {
            tracing::warn!(
                frames = probabilities.frame_count(),
                expected_frames,
                reduction = self.config.reduction,
                "model frame count does not match signal length / reduction"
            );
        }

        let rpeaks = self.detect_probabilities(&probabilities)?;
        Ok(DetectionOutput {
            probabilities,
            rpeaks,
        })
    }
}
