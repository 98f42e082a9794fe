use std::ops::Range;

use crate::types::Interval;

/// Element-wise `value > threshold`.
pub fn binarize(probs: &[f32], threshold: f32) -> Vec<bool> {
    probs.iter().map(|&p| p > threshold).collect()
}

/// Maximal runs of `target` in `mask`, ascending and disjoint.
pub fn mask_to_intervals(mask: &[bool], target: bool) -> Vec<Interval> {
    intervals_in_window(mask, 0..mask.len(), target)
}

/// Maximal runs of `target` inside `window`, reported in whole-mask coordinates.
///
/// Runs are clipped at the window edges. An empty or out-of-range window
/// yields no intervals.
pub fn intervals_in_window(mask: &[bool], window: Range<usize>, target: bool) -> Vec<Interval> {
    let end = window.end.min(mask.len());
    if window.start >= end {
        return Vec::new();
    }

    let mut intervals = Vec::new();
    let mut run_start: Option<usize> = None;
    for (idx, &value) in mask[window.start..end].iter().enumerate() {
        let frame = window.start + idx;
        match (value == target, run_start) {
            (true, None) => run_start = Some(frame),
            (false, Some(start)) => {
                intervals.push(Interval::new(start, frame));
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = run_start {
        intervals.push(Interval::new(start, end));
    }
    intervals
}
