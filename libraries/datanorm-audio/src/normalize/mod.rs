//! Fixed-shape normalization of mono buffers
//!
//! Two strategies, picked once per run through [`NormalizationMode`]:
//!
//! - **Resample**: downsample to the target rate when the source is faster,
//!   then pad or truncate to exactly one `target_length` buffer.
//! - **Resize**: keep the source rate and cut long input into overlapping
//!   `target_length` windows; short input is padded into a single window.
//!
//! Every returned buffer has exactly `target_length` samples.

mod chunking;
mod padding;

pub use chunking::{chunk_count, split_with_overlap};
pub use padding::{fit_to_length, repeat_pad, zero_pad};

use datanorm_core::{AudioBuffer, NormalizationMode, NormalizeError, Resampler, Result, TargetSpec};
use tracing::debug;

/// Normalize one mono buffer into one or more fixed-length buffers
///
/// # Errors
/// Returns `NormalizeError::Transform` for an empty input, a failed
/// resampling pass, or a resampler that returns nothing.
pub fn normalize(
    buffer: AudioBuffer,
    mode: NormalizationMode,
    spec: &TargetSpec,
    resampler: &dyn Resampler,
) -> Result<Vec<AudioBuffer>> {
    if buffer.is_empty() {
        return Err(NormalizeError::transform("cannot normalize an empty buffer"));
    }

    let outputs = match mode {
        NormalizationMode::Resample => vec![resample_and_fit(buffer, spec, resampler)?],
        NormalizationMode::Resize => chunk_with_overlap(buffer, spec),
    };

    debug!(
        mode = %mode,
        outputs = outputs.len(),
        target_length = spec.target_length(),
        "Normalized buffer"
    );

    Ok(outputs)
}

/// Resample-mode normalization: one buffer at the target rate
///
/// Input slower than or equal to the target rate is not upsampled; the
/// output is still labelled with the target rate.
pub fn resample_and_fit(
    buffer: AudioBuffer,
    spec: &TargetSpec,
    resampler: &dyn Resampler,
) -> Result<AudioBuffer> {
    let target_rate = spec.target_samplerate();

    let samples = if buffer.sample_rate > target_rate {
        debug!(
            from = buffer.sample_rate,
            to = target_rate,
            samples = buffer.len(),
            "Downsampling"
        );
        resampler.resample(&buffer.samples, buffer.sample_rate, target_rate)?
    } else {
        buffer.samples
    };

    if samples.is_empty() {
        return Err(NormalizeError::transform("resampling produced no samples"));
    }

    let samples = fit_to_length(samples, spec.target_length(), spec.padding_strategy());
    Ok(AudioBuffer::new(samples, target_rate))
}

/// Resize-mode normalization: overlapping windows at the source rate
pub fn chunk_with_overlap(buffer: AudioBuffer, spec: &TargetSpec) -> Vec<AudioBuffer> {
    let target_length = spec.target_length();
    let sample_rate = buffer.sample_rate;

    if buffer.len() <= target_length {
        let samples = fit_to_length(buffer.samples, target_length, spec.padding_strategy());
        return vec![AudioBuffer::new(samples, sample_rate)];
    }

    split_with_overlap(&buffer.samples, target_length, spec.chunk_step())
        .into_iter()
        .map(|samples| AudioBuffer::new(samples, sample_rate))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use datanorm_core::PaddingStrategy;

    /// Naive decimator standing in for a real resampler
    struct Decimate;

    impl Resampler for Decimate {
        fn resample(&self, samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
            let factor = (from_rate / to_rate) as usize;
            Ok(samples.iter().step_by(factor.max(1)).copied().collect())
        }
    }

    /// Resampler that must never be reached
    struct Unreachable;

    impl Resampler for Unreachable {
        fn resample(&self, _: &[f32], _: u32, _: u32) -> Result<Vec<f32>> {
            Err(NormalizeError::transform("resampler should not be called"))
        }
    }

    struct Silent;

    impl Resampler for Silent {
        fn resample(&self, _: &[f32], _: u32, _: u32) -> Result<Vec<f32>> {
            Ok(Vec::new())
        }
    }

    fn spec(len: usize, rate: u32, padding: PaddingStrategy, overlap: f64) -> TargetSpec {
        TargetSpec::new(len, rate, padding, overlap).unwrap()
    }

    #[test]
    fn resample_mode_downsamples_then_fits() {
        let spec = spec(10, 8_000, PaddingStrategy::ZeroPad, 0.0);
        let input = AudioBuffer::new((0..16).map(|i| i as f32).collect(), 16_000);

        let outputs = normalize(input, NormalizationMode::Resample, &spec, &Decimate).unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].sample_rate, 8_000);
        assert_eq!(
            outputs[0].samples,
            vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 14.0, 0.0, 0.0]
        );
    }

    #[test]
    fn resample_mode_never_upsamples() {
        let spec = spec(7, 16_000, PaddingStrategy::Repeat, 0.0);
        let input = AudioBuffer::new(vec![1.0, 2.0, 3.0], 8_000);

        let outputs = normalize(input, NormalizationMode::Resample, &spec, &Unreachable).unwrap();
        assert_eq!(outputs[0].samples, vec![1.0, 2.0, 3.0, 1.0, 2.0, 3.0, 1.0]);
        // Labelled with the target rate regardless
        assert_eq!(outputs[0].sample_rate, 16_000);
    }

    #[test]
    fn resample_mode_truncates_long_input() {
        let spec = spec(4, 16_000, PaddingStrategy::Repeat, 0.0);
        let input = AudioBuffer::new(vec![0.1; 100], 16_000);

        let outputs = normalize(input, NormalizationMode::Resample, &spec, &Unreachable).unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].len(), 4);
    }

    #[test]
    fn resize_mode_keeps_source_rate() {
        let spec = spec(10, 16_000, PaddingStrategy::Repeat, 0.1);
        let input = AudioBuffer::new(vec![0.5; 100], 44_100);

        let outputs = normalize(input, NormalizationMode::Resize, &spec, &Unreachable).unwrap();
        assert_eq!(outputs.len(), 11);
        for output in &outputs {
            assert_eq!(output.len(), 10);
            assert_eq!(output.sample_rate, 44_100);
        }
    }

    #[test]
    fn resize_mode_pads_short_input() {
        let spec = spec(7, 16_000, PaddingStrategy::ZeroPad, 0.1);
        let input = AudioBuffer::new(vec![1.0, 2.0, 3.0], 22_050);

        let outputs = normalize(input, NormalizationMode::Resize, &spec, &Unreachable).unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].samples, vec![1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(outputs[0].sample_rate, 22_050);
    }

    #[test]
    fn empty_input_is_a_transform_error() {
        let spec = spec(4, 16_000, PaddingStrategy::Repeat, 0.0);
        for mode in [NormalizationMode::Resample, NormalizationMode::Resize] {
            let err = normalize(AudioBuffer::new(Vec::new(), 16_000), mode, &spec, &Unreachable)
                .unwrap_err();
            assert!(matches!(err, NormalizeError::Transform(_)));
        }
    }

    #[test]
    fn empty_resampler_output_is_a_transform_error() {
        let spec = spec(4, 8_000, PaddingStrategy::Repeat, 0.0);
        let input = AudioBuffer::new(vec![0.5; 16], 16_000);

        let err = normalize(input, NormalizationMode::Resample, &spec, &Silent).unwrap_err();
        assert!(matches!(err, NormalizeError::Transform(_)));
    }

    #[test]
    fn resampler_failure_propagates() {
        let spec = spec(4, 8_000, PaddingStrategy::Repeat, 0.0);
        let input = AudioBuffer::new(vec![0.5; 16], 16_000);

        let err = normalize(input, NormalizationMode::Resample, &spec, &Unreachable).unwrap_err();
        assert!(err.to_string().contains("should not be called"));
    }
}
