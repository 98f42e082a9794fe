use crate::types::{Interval, Peak};

/// One midpoint peak per interval lasting at least `duration_frames`.
pub fn generate_candidates(
    intervals: &[Interval],
    reduction: usize,
    duration_frames: f64,
) -> Vec<Peak> {
    intervals
        .iter()
        .filter(|itv| itv.duration() as f64 >= duration_frames)
        .map(|&itv| Peak::from_interval(itv, reduction))
        .collect()
}
