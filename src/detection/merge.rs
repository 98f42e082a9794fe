use crate::types::Peak;

/// Enforces the refractory distance between adjacent peaks.
///
/// Each pass scans from the first pair and resolves only the first pair closer
/// than `min_dist_samples`: the peak with the lower probability at its frame is
/// deleted, and the earlier one survives a tie. Every deletion restarts the
/// scan, so the loop ends after at most `peaks.len()` deletions.
///
/// `peaks` must be strictly increasing by index. Distances are absolute, so
/// unordered input is tolerated but may resolve conflicts arbitrarily.
///
/// Returns the number of deleted peaks.
pub fn merge_close_peaks(
    peaks: &mut Vec<Peak>,
    probs: &[f32],
    reduction: usize,
    min_dist_samples: f64,
) -> usize {
    let mut deleted = 0usize;
    while let Some(r) = first_conflict(peaks, min_dist_samples) {
        let prev_prob = prob_at(probs, peaks[r].frame(reduction));
        let next_prob = prob_at(probs, peaks[r + 1].frame(reduction));
        let del_idx = if prev_prob >= next_prob { r + 1 } else { r };
        let removed = peaks.remove(del_idx);
        deleted += 1;
        tracing::trace!(
            removed_index = removed.index,
            prev_prob,
            next_prob,
            "merge: dropped peak within refractory distance"
        );
    }
    deleted
}

fn first_conflict(peaks: &[Peak], min_dist_samples: f64) -> Option<usize> {
    peaks
        .windows(2)
        .position(|pair| (pair[1].index.abs_diff(pair[0].index) as f64) < min_dist_samples)
}

pub(super) fn prob_at(probs: &[f32], frame: usize) -> f32 {
    probs.get(frame).copied().unwrap_or(f32::NEG_INFINITY)
}
