use crate::config::PostProcessConfig;
use crate::error::DetectionError;
use crate::pipeline::defaults::QrsPostProcessor;
use crate::pipeline::runtime::{RPeakDetector, RPeakDetectorParts};
use crate::pipeline::traits::{PeakPostProcessor, ProbabilityModel};

pub struct RPeakDetectorBuilder {
    config: PostProcessConfig,
    model: Option<Box<dyn ProbabilityModel>>,
    post_processor: Option<Box<dyn PeakPostProcessor>>,
}

impl RPeakDetectorBuilder {
    pub fn new(config: PostProcessConfig) -> Self {
        Self {
            config,
            model: None,
            post_processor: None,
        }
    }

    pub fn with_model(mut self, model: Box<dyn ProbabilityModel>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_post_processor(mut self, post_processor: Box<dyn PeakPostProcessor>) -> Self {
        self.post_processor = Some(post_processor);
        self
    }

    pub fn build(self) -> Result<RPeakDetector, DetectionError> {
        self.config.validate()?;
        Ok(RPeakDetector::from_parts(RPeakDetectorParts {
            config: self.config,
            model: self.model,
            post_processor: self
                .post_processor
                .unwrap_or_else(|| Box::new(QrsPostProcessor)),
        }))
    }
}
