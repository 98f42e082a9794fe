use crate::types::Peak;

/// Keeps peaks with `skip_samples <= index < input_len - skip_samples`.
///
/// Returns the number of dropped peaks.
pub fn trim_edges(peaks: &mut Vec<Peak>, skip_samples: f64, input_len: usize) -> usize {
    let before = peaks.len();
    let upper = input_len as f64 - skip_samples;
    peaks.retain(|peak| {
        let index = peak.index as f64;
        index >= skip_samples && index < upper
    });
    before - peaks.len()
}
