use crate::types::{Interval, Peak};

use super::mask::intervals_in_window;

/// Inserts suspected missed beats into gaps of at least `max_dist_samples`.
///
/// The search window of a gap lies between the end of the earlier peak's
/// interval and the start of the later one's, and is searched in the binary
/// mask ignoring the duration threshold. A gap with nothing to offer is
/// skipped and the scan moves on; an insertion restarts the scan from the
/// first pair. `peaks` must be strictly increasing by index; a pair out of
/// order has an empty search window and is never filled.
/// Each insertion consumes a mask interval not yet owned by any peak, which
/// bounds the number of restarts.
///
/// Returns the number of inserted peaks.
pub fn fill_gaps(
    peaks: &mut Vec<Peak>,
    mask: &[bool],
    probs: &[f32],
    reduction: usize,
    max_dist_samples: f64,
) -> usize {
    let mut inserted = 0usize;
    'scan: loop {
        let mut r = 0usize;
        while r + 1 < peaks.len() {
            let (prev, next) = (peaks[r], peaks[r + 1]);
            if (next.index.abs_diff(prev.index) as f64) >= max_dist_samples {
                let window = prev.interval.end..next.interval.start;
                if let Some(chosen) = select_missed_qrs(mask, probs, window) {
                    let peak = Peak::from_interval(chosen, reduction);
                    tracing::trace!(
                        prev_index = prev.index,
                        next_index = next.index,
                        inserted_index = peak.index,
                        interval_start = chosen.start,
                        interval_end = chosen.end,
                        "gap fill: inserted suspected missed beat"
                    );
                    peaks.insert(r + 1, peak);
                    inserted += 1;
                    continue 'scan;
                }
            }
            r += 1;
        }
        break;
    }
    inserted
}

/// Longest active interval in `window`; ties go to the highest peak probability,
/// then to the earliest interval.
fn select_missed_qrs(
    mask: &[bool],
    probs: &[f32],
    window: std::ops::Range<usize>,
) -> Option<Interval> {
    let mut best: Option<(Interval, f32)> = None;
    for itv in intervals_in_window(mask, window, true) {
        let peak_prob = max_prob(probs, itv);
        let should_replace = match best {
            None => true,
            Some((current, _)) if itv.duration() > current.duration() => true,
            Some((current, current_prob)) => {
                itv.duration() == current.duration() && peak_prob > current_prob
            }
        };
        if should_replace {
            best = Some((itv, peak_prob));
        }
    }
    best.map(|(itv, _)| itv)
}

fn max_prob(probs: &[f32], itv: Interval) -> f32 {
    probs
        .get(itv.start..itv.end)
        .unwrap_or(&[])
        .iter()
        .copied()
        .fold(f32::NEG_INFINITY, f32::max)
}
