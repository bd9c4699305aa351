//! Rubato resampler backend
//!
//! Band-limited sinc interpolation using the rubato crate.

use super::{validate_rate, ResamplingError, ResamplingQuality, Result};
use datanorm_core::Resampler;
use rubato::{
    Resampler as RubatoResamplerTrait, SincFixedIn, SincInterpolationParameters,
    SincInterpolationType, WindowFunction,
};

/// Rubato-based mono resampler
///
/// Stateless between calls: every `resample_mono` builds its own rubato
/// instance, so one `RubatoResampler` can be shared across worker threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct RubatoResampler {
    quality: ResamplingQuality,
}

impl RubatoResampler {
    /// Create a new rubato resampler
    pub fn new(quality: ResamplingQuality) -> Self {
        Self { quality }
    }

    /// Quality preset in use
    pub fn quality(&self) -> ResamplingQuality {
        self.quality
    }

    /// Convert quality preset to rubato parameters
    fn quality_to_params(quality: ResamplingQuality) -> SincInterpolationParameters {
        match quality {
            ResamplingQuality::Fast => SincInterpolationParameters {
                sinc_len: 64,
                f_cutoff: 0.9,
                interpolation: SincInterpolationType::Linear,
                oversampling_factor: 128,
                window: WindowFunction::Blackman,
            },
            ResamplingQuality::Balanced => SincInterpolationParameters {
                sinc_len: 128,
                f_cutoff: 0.95,
                interpolation: SincInterpolationType::Cubic,
                oversampling_factor: 256,
                window: WindowFunction::BlackmanHarris,
            },
            ResamplingQuality::High => SincInterpolationParameters {
                sinc_len: 256,
                f_cutoff: 0.99,
                interpolation: SincInterpolationType::Cubic,
                oversampling_factor: 512,
                window: WindowFunction::BlackmanHarris,
            },
            ResamplingQuality::Maximum => SincInterpolationParameters {
                sinc_len: 512,
                f_cutoff: 0.995,
                interpolation: SincInterpolationType::Cubic,
                oversampling_factor: 1024,
                window: WindowFunction::BlackmanHarris2,
            },
        }
    }

    /// Expected output length: `ceil(len * to / from)`
    pub fn output_len(input_len: usize, from_rate: u32, to_rate: u32) -> usize {
        (input_len as u64 * u64::from(to_rate)).div_ceil(u64::from(from_rate)) as usize
    }

    /// Resample a complete mono buffer
    pub fn resample_mono(&self, input: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
        validate_rate(from_rate)?;
        validate_rate(to_rate)?;

        // 1:1 passthrough - avoid resampling overhead when rates match
        if from_rate == to_rate || input.is_empty() {
            return Ok(input.to_vec());
        }

        let ratio = f64::from(to_rate) / f64::from(from_rate);
        let expected = Self::output_len(input.len(), from_rate, to_rate);

        let mut resampler = SincFixedIn::<f32>::new(
            ratio,
            1.0,
            Self::quality_to_params(self.quality),
            self.quality.chunk_size(),
            1,
        )
        .map_err(|e| {
            ResamplingError::InitializationFailed(format!("SincFixedIn creation failed: {}", e))
        })?;

        let delay = resampler.output_delay();
        let mut output = Vec::with_capacity(expected + delay);
        let mut position = 0;

        // Complete chunks first
        loop {
            let needed = resampler.input_frames_next();
            if input.len() - position < needed {
                break;
            }
            let chunk = [&input[position..position + needed]];
            let processed = resampler.process(&chunk, None).map_err(|e| {
                ResamplingError::ProcessingFailed(format!("SincIn resampling failed: {}", e))
            })?;
            output.extend_from_slice(&processed[0]);
            position += needed;
        }

        // Zero-padded tail chunk
        if position < input.len() {
            let chunk = [&input[position..]];
            let processed = resampler
                .process_partial(Some(&chunk[..]), None)
                .map_err(|e| {
                    ResamplingError::ProcessingFailed(format!("SincIn tail failed: {}", e))
                })?;
            output.extend_from_slice(&processed[0]);
        }

        // Drain the filter delay
        while output.len() < delay + expected {
            let processed = resampler
                .process_partial(None::<&[&[f32]]>, None)
                .map_err(|e| {
                    ResamplingError::ProcessingFailed(format!("SincIn flush failed: {}", e))
                })?;
            if processed[0].is_empty() {
                break;
            }
            output.extend_from_slice(&processed[0]);
        }

        let mut resampled: Vec<f32> = output.into_iter().skip(delay).take(expected).collect();
        resampled.resize(expected, 0.0);
        Ok(resampled)
    }
}

impl Resampler for RubatoResampler {
    fn resample(&self, samples: &[f32], from_rate: u32, to_rate: u32) -> datanorm_core::Result<Vec<f32>> {
        Ok(self.resample_mono(samples, from_rate, to_rate)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(frequency: f32, sample_rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * frequency * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn test_output_len_is_exact_ceiling() {
        assert_eq!(RubatoResampler::output_len(4_800, 48_000, 16_000), 1_600);
        assert_eq!(RubatoResampler::output_len(4_801, 48_000, 16_000), 1_601);
        assert_eq!(RubatoResampler::output_len(44_100, 44_100, 22_050), 22_050);
        assert_eq!(RubatoResampler::output_len(1, 48_000, 8_000), 1);
    }

    #[test]
    fn test_passthrough_when_rates_match() {
        let resampler = RubatoResampler::new(ResamplingQuality::Fast);
        let input = vec![0.1, -0.2, 0.3];
        assert_eq!(resampler.resample_mono(&input, 16_000, 16_000).unwrap(), input);
    }

    #[test]
    fn test_empty_input() {
        let resampler = RubatoResampler::new(ResamplingQuality::Fast);
        assert!(resampler.resample_mono(&[], 48_000, 16_000).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_rates() {
        let resampler = RubatoResampler::new(ResamplingQuality::Fast);
        assert!(matches!(
            resampler.resample_mono(&[0.0; 8], 0, 16_000),
            Err(ResamplingError::InvalidSampleRate(0))
        ));
        assert!(matches!(
            resampler.resample_mono(&[0.0; 8], 48_000, 2_000_000),
            Err(ResamplingError::InvalidSampleRate(2_000_000))
        ));
    }

    #[test]
    fn test_downsample_length_and_energy() {
        let resampler = RubatoResampler::new(ResamplingQuality::Balanced);
        let input = sine(440.0, 48_000, 48_000);
        let output = resampler.resample_mono(&input, 48_000, 16_000).unwrap();

        assert_eq!(output.len(), 16_000);

        // A 440 Hz tone is well inside the new passband, RMS should survive
        let rms = (output[1_000..15_000].iter().map(|s| s * s).sum::<f32>() / 14_000.0).sqrt();
        assert!((rms - std::f32::consts::FRAC_1_SQRT_2).abs() < 0.05, "rms = {}", rms);
    }

    #[test]
    fn test_short_input_shorter_than_one_chunk() {
        let resampler = RubatoResampler::new(ResamplingQuality::Fast);
        let input = sine(100.0, 44_100, 300);
        let output = resampler.resample_mono(&input, 44_100, 22_050).unwrap();
        assert_eq!(output.len(), 150);
        assert!(output.iter().all(|s| s.is_finite()));
    }
}
