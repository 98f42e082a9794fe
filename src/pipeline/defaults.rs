use crate::config::ResolvedParams;
use crate::detection::post_process_element;
use crate::pipeline::traits::PeakPostProcessor;
use crate::types::ElementPeaks;

/// Threshold, duration-filter, merge, gap-fill and edge-trim post-processing.
pub struct QrsPostProcessor;

impl PeakPostProcessor for QrsPostProcessor {
    fn process(&self, probs: &[f32], params: &ResolvedParams) -> ElementPeaks {
        post_process_element(probs, params)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::PostProcessConfig;

    use super::*;

    #[test]
    fn qrs_post_processor_process() {
        let mut probs = vec![0.1f32; 400];
        for p in &mut probs[100..116] {
            *p = 0.9;
        }
        let config = PostProcessConfig {
            skip_dist_ms: 0.0,
            ..PostProcessConfig::default()
        };
        let params = config.resolve(probs.len());
        let out = QrsPostProcessor.process(&probs, &params);
        assert_eq!(out, post_process_element(&probs, &params));
        assert_eq!(out.rpeaks, vec![108]);
    }
}
