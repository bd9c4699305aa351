//! Overlapping fixed-length windows over a long buffer

/// Number of chunks [`split_with_overlap`] produces
///
/// `1` when `input_length <= target_length`, otherwise
/// `ceil((input_length - target_length) / step) + 1`.
pub fn chunk_count(input_length: usize, target_length: usize, step: usize) -> usize {
    if input_length <= target_length || step == 0 {
        return 1;
    }
    (input_length - target_length).div_ceil(step) + 1
}

/// Split `samples` into `target_length` windows advancing by `step`
///
/// Windows are taken from the front while more than `target_length` samples
/// remain past the read position; the last window is always the final
/// `target_length` samples of the input, so it can overlap its predecessor by
/// more than `target_length - step`.
///
/// Input no longer than `target_length` is returned as a single window
/// (unpadded); callers pad it themselves. `step` must be positive.
pub fn split_with_overlap(samples: &[f32], target_length: usize, step: usize) -> Vec<Vec<f32>> {
    if samples.len() <= target_length || step == 0 {
        return vec![samples.to_vec()];
    }

    let mut chunks = Vec::with_capacity(chunk_count(samples.len(), target_length, step));
    let mut position = 0;

    while samples.len() - position > target_length {
        chunks.push(samples[position..position + target_length].to_vec());
        position += step;
    }

    chunks.push(samples[samples.len() - target_length..].to_vec());
    chunks
}
