//! Padding and truncation to an exact sample count

use datanorm_core::PaddingStrategy;

/// Bring `samples` to exactly `target_length` samples
///
/// Under-length input is padded per `strategy`, over-length input is
/// truncated, exact-length input is returned untouched.
pub fn fit_to_length(
    mut samples: Vec<f32>,
    target_length: usize,
    strategy: PaddingStrategy,
) -> Vec<f32> {
    if samples.len() < target_length {
        samples = match strategy {
            PaddingStrategy::Repeat => repeat_pad(&samples, target_length),
            PaddingStrategy::ZeroPad => zero_pad(samples, target_length),
        };
    }
    samples.truncate(target_length);
    samples
}

/// Tile `samples` end-to-end `ceil(target_length / len)` times
///
/// The result is at least `target_length` long. An empty input has nothing
/// to tile and yields silence.
pub fn repeat_pad(samples: &[f32], target_length: usize) -> Vec<f32> {
    if samples.is_empty() {
        return vec![0.0; target_length];
    }
    let repeats = target_length.div_ceil(samples.len());
    samples.repeat(repeats)
}

/// Append zeros up to `target_length`
pub fn zero_pad(mut samples: Vec<f32>, target_length: usize) -> Vec<f32> {
    if samples.len() < target_length {
        samples.resize(target_length, 0.0);
    }
    samples
}
