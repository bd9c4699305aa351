//! Sample rate conversion
//!
//! Offline, whole-buffer resampling for dataset preparation. Each call builds
//! a fresh rubato sinc resampler for the rate pair at hand, feeds the complete
//! mono buffer through it, compensates the filter delay, and returns exactly
//! `ceil(len * to / from)` samples.
//!
//! ## Example
//!
//! ```rust
//! use datanorm_audio::resampling::{RubatoResampler, ResamplingQuality};
//!
//! let resampler = RubatoResampler::new(ResamplingQuality::Fast);
//! let input = vec![0.0f32; 4_800]; // 100 ms at 48 kHz
//! let output = resampler.resample_mono(&input, 48_000, 16_000).unwrap();
//! assert_eq!(output.len(), 1_600);
//! ```

mod rubato_backend;

use datanorm_core::NormalizeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use rubato_backend::RubatoResampler;

/// Resampling errors
#[derive(Error, Debug)]
pub enum ResamplingError {
    #[error("Invalid sample rate: {0} Hz (must be > 0 and < 1MHz)")]
    InvalidSampleRate(u32),

    #[error("Resampler initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

pub type Result<T> = std::result::Result<T, ResamplingError>;

impl From<ResamplingError> for NormalizeError {
    fn from(err: ResamplingError) -> Self {
        NormalizeError::transform(format!("resampling failed: {}", err))
    }
}

/// Resampling quality presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResamplingQuality {
    /// Fast - Low CPU, short filter
    /// - Passband: 90% of Nyquist
    Fast,

    /// Balanced - Moderate CPU, good quality
    /// - Passband: 95% of Nyquist
    #[default]
    Balanced,

    /// High - Higher CPU, excellent quality
    /// - Passband: 99% of Nyquist
    High,

    /// Maximum - Highest CPU, longest filter
    /// - Passband: 99.5% of Nyquist
    Maximum,
}

impl ResamplingQuality {
    /// Configuration name of this preset
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Balanced => "balanced",
            Self::High => "high",
            Self::Maximum => "maximum",
        }
    }

    /// Get transition band width (0.0 - 1.0, normalized to Nyquist)
    pub fn transition_band(&self) -> f64 {
        match self {
            Self::Fast => 0.10,
            Self::Balanced => 0.05,
            Self::High => 0.01,
            Self::Maximum => 0.005,
        }
    }

    /// Input chunk size handed to rubato per `process` call
    pub fn chunk_size(&self) -> usize {
        match self {
            Self::Fast | Self::Balanced => 1024,
            Self::High => 2048,
            Self::Maximum => 4096,
        }
    }
}

impl fmt::Display for ResamplingQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResamplingQuality {
    type Err = NormalizeError;

    fn from_str(s: &str) -> std::result::Result<Self, NormalizeError> {
        match s.trim().to_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "balanced" => Ok(Self::Balanced),
            "high" => Ok(Self::High),
            "maximum" | "max" => Ok(Self::Maximum),
            other => Err(NormalizeError::config(format!(
                "unknown resampling quality '{}' (expected fast, balanced, high or maximum)",
                other
            ))),
        }
    }
}

/// Validate a sample rate the way every backend expects it
pub(crate) fn validate_rate(rate: u32) -> Result<()> {
    if rate == 0 || rate > 1_000_000 {
        return Err(ResamplingError::InvalidSampleRate(rate));
    }
    Ok(())
}
