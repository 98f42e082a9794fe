//! Stages turning one element's QRS probabilities into R-peak sample indices.

use crate::config::ResolvedParams;
use crate::types::{ElementPeaks, StageCounts};

mod candidates;
mod edge_trim;
mod gap_fill;
mod mask;
mod merge;

pub use candidates::generate_candidates;
pub use edge_trim::trim_edges;
pub use gap_fill::fill_gaps;
pub use mask::{binarize, intervals_in_window, mask_to_intervals};
pub use merge::merge_close_peaks;

/// Runs every post-processing stage on the probabilities of one batch element.
pub fn post_process_element(probs: &[f32], params: &ResolvedParams) -> ElementPeaks {
    let mask = binarize(probs, params.bin_pred_thr);
    let intervals = mask_to_intervals(&mask, true);
    let mut peaks = generate_candidates(&intervals, params.reduction, params.duration_frames);
    let mut counts = StageCounts {
        intervals: intervals.len(),
        candidates: peaks.len(),
        ..StageCounts::default()
    };

    counts.merged_away =
        merge_close_peaks(&mut peaks, probs, params.reduction, params.min_dist_samples);

    if let Some(max_dist_samples) = params.max_dist_samples {
        counts.gap_filled =
            fill_gaps(&mut peaks, &mask, probs, params.reduction, max_dist_samples);
    }

    counts.edge_trimmed = trim_edges(&mut peaks, params.skip_samples, params.input_len);

    tracing::debug!(
        frames = probs.len(),
        intervals = counts.intervals,
        candidates = counts.candidates,
        merged_away = counts.merged_away,
        gap_filled = counts.gap_filled,
        edge_trimmed = counts.edge_trimmed,
        rpeaks = peaks.len(),
        "post-process: element done"
    );

    ElementPeaks {
        rpeaks: peaks.into_iter().map(|peak| peak.index).collect(),
        counts,
    }
}
