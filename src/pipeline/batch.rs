use crate::config::PostProcessConfig;
use crate::error::DetectionError;
use crate::pipeline::defaults::QrsPostProcessor;
use crate::pipeline::traits::PeakPostProcessor;
use crate::types::{ElementPeaks, ProbabilityBatch};

/// Post-processes every batch element with the default [`QrsPostProcessor`].
///
/// Returns one strictly increasing sample-index sequence per element, in
/// batch order. The config is validated before any element is touched.
pub fn post_process_batch(
    batch: &ProbabilityBatch,
    config: &PostProcessConfig,
) -> Result<Vec<Vec<usize>>, DetectionError> {
    let elements = run_batch(batch, config, &QrsPostProcessor)?;
    Ok(elements.into_iter().map(|element| element.rpeaks).collect())
}

pub(crate) fn run_batch(
    batch: &ProbabilityBatch,
    config: &PostProcessConfig,
    processor: &dyn PeakPostProcessor,
) -> Result<Vec<ElementPeaks>, DetectionError> {
    config.validate()?;
    let params = config.resolve(batch.frame_count());

    let out_of_range = batch
        .values()
        .iter()
        .filter(|p| !(0.0..=1.0).contains(*p))
        .count();
    if out_of_range > 0 {
        tracing::warn!(
            out_of_range,
            total = batch.values().len(),
            "probabilities outside [0, 1] (or NaN); thresholding them as-is"
        );
    }

    tracing::debug!(
        batch_size = batch.batch_size(),
        frame_count = batch.frame_count(),
        input_len = params.input_len,
        min_dist_samples = params.min_dist_samples,
        max_dist_samples = ?params.max_dist_samples,
        skip_samples = params.skip_samples,
        "post-process: batch start"
    );

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        Ok((0..batch.batch_size())
            .into_par_iter()
            .map(|b_idx| processor.process(batch.row(b_idx), &params))
            .collect())
    }

    #[cfg(not(feature = "parallel"))]
    {
        Ok(batch
            .rows()
            .map(|row| processor.process(row, &params))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DistanceThreshold;

    fn element(frame_count: usize, runs: &[(usize, usize)]) -> Vec<f32> {
        let mut probs = vec![0.05f32; frame_count];
        for &(start, end) in runs {
            for p in &mut probs[start..end] {
                *p = 0.9;
            }
        }
        probs
    }

    #[test]
    fn batch_elements_are_processed_independently_in_order() {
        let batch = ProbabilityBatch::from_rows(vec![
            element(2000, &[(494, 507), (994, 1007)]),
            vec![0.1; 2000],
            element(2000, &[(1194, 1207)]),
        ])
        .unwrap();
        let rpeaks = post_process_batch(&batch, &PostProcessConfig::default()).unwrap();
        assert_eq!(rpeaks, vec![vec![500, 1000], vec![], vec![1200]]);
    }

    #[test]
    fn invalid_config_fails_before_processing() {
        let batch = ProbabilityBatch::from_single(vec![0.9; 100]);
        let config = PostProcessConfig {
            dist_thr_ms: DistanceThreshold::Single(-200.0),
            ..PostProcessConfig::default()
        };
        assert!(matches!(
            post_process_batch(&batch, &config),
            Err(DetectionError::Config { .. })
        ));
    }

    #[test]
    fn empty_batch_yields_no_elements() {
        let batch = ProbabilityBatch::from_rows(Vec::new()).unwrap();
        assert!(post_process_batch(&batch, &PostProcessConfig::default())
            .unwrap()
            .is_empty());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_batch_matches_sequential_elements() {
        use crate::detection::post_process_element;

        let rows = (0..16)
            .map(|b_idx| {
                let first = 94 + 10 * b_idx;
                element(
                    2000,
                    &[(first, first + 13), (994, 1007), (1194, 1198), (1494, 1507)],
                )
            })
            .collect::<Vec<_>>();
        let batch = ProbabilityBatch::from_rows(rows).unwrap();
        let config = PostProcessConfig {
            dist_thr_ms: DistanceThreshold::Range {
                min_ms: 200.0,
                max_ms: 1200.0,
            },
            skip_dist_ms: 0.0,
            ..PostProcessConfig::default()
        };
        let params = config.resolve(batch.frame_count());
        let sequential = batch
            .rows()
            .map(|row| post_process_element(row, &params))
            .collect::<Vec<_>>();

        let parallel = run_batch(&batch, &config, &QrsPostProcessor).unwrap();
        assert_eq!(parallel, sequential);
        assert!(parallel.iter().any(|element| element.counts.gap_filled > 0));
    }

    #[test]
    fn out_of_range_probabilities_are_thresholded_as_is() {
        let mut probs = vec![-0.5f32; 2000];
        for p in &mut probs[994..1007] {
            *p = 1.7;
        }
        let batch = ProbabilityBatch::from_single(probs);
        let rpeaks = post_process_batch(&batch, &PostProcessConfig::default()).unwrap();
        assert_eq!(rpeaks, vec![vec![1000]]);
    }
}
