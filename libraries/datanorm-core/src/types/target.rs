//! Target shape configuration and strategy selection

use crate::error::{NormalizeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How an under-length buffer is brought up to the target length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaddingStrategy {
    /// Tile the buffer end-to-end, then truncate
    #[default]
    Repeat,

    /// Append zero-valued samples
    ZeroPad,
}

impl PaddingStrategy {
    /// Configuration name of this strategy
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Repeat => "repeat",
            Self::ZeroPad => "zero_pad",
        }
    }
}

impl fmt::Display for PaddingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaddingStrategy {
    type Err = NormalizeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "repeat" => Ok(Self::Repeat),
            "zero_pad" | "zeropad" | "zero-pad" => Ok(Self::ZeroPad),
            other => Err(NormalizeError::config(format!(
                "unknown padding strategy '{}' (expected 'repeat' or 'zero_pad')",
                other
            ))),
        }
    }
}

/// Normalization strategy, selected once per run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationMode {
    /// Resample down to the target rate, then pad or clip to one output
    #[default]
    Resample,

    /// Keep the source rate and split long input into overlapping chunks
    Resize,
}

impl NormalizationMode {
    /// Configuration name of this mode
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resample => "resample",
            Self::Resize => "resize",
        }
    }
}

impl fmt::Display for NormalizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NormalizationMode {
    type Err = NormalizeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "resample" => Ok(Self::Resample),
            "resize" => Ok(Self::Resize),
            other => Err(NormalizeError::config(format!(
                "unknown normalization mode '{}' (expected 'resample' or 'resize')",
                other
            ))),
        }
    }
}

/// Fixed output shape for a run
///
/// Built once through a validating constructor and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TargetSpec {
    target_length: usize,
    target_samplerate: u32,
    padding_strategy: PaddingStrategy,
    chunking_overlap_factor: f64,
}

impl TargetSpec {
    /// Create a target spec from a length in samples
    ///
    /// # Errors
    /// Returns `NormalizeError::Config` if the length or sample rate is zero,
    /// the overlap factor is outside `[0, 1)`, or the resulting chunk step
    /// would be zero.
    pub fn new(
        target_length: usize,
        target_samplerate: u32,
        padding_strategy: PaddingStrategy,
        chunking_overlap_factor: f64,
    ) -> Result<Self> {
        if target_length == 0 {
            return Err(NormalizeError::config("target length must be positive"));
        }
        if target_samplerate == 0 {
            return Err(NormalizeError::config("target sample rate must be positive"));
        }
        if !(0.0..1.0).contains(&chunking_overlap_factor) {
            return Err(NormalizeError::config(format!(
                "overlap factor must be in [0, 1), got {}",
                chunking_overlap_factor
            )));
        }

        let spec = Self {
            target_length,
            target_samplerate,
            padding_strategy,
            chunking_overlap_factor,
        };

        if spec.chunk_step() == 0 {
            return Err(NormalizeError::config(format!(
                "overlap factor {} leaves no forward step for a {}-sample chunk",
                chunking_overlap_factor, target_length
            )));
        }

        Ok(spec)
    }

    /// Create a target spec from a duration in seconds
    ///
    /// `target_length = round(duration_seconds * target_samplerate)`
    pub fn from_duration(
        duration_seconds: f64,
        target_samplerate: u32,
        padding_strategy: PaddingStrategy,
        chunking_overlap_factor: f64,
    ) -> Result<Self> {
        if !duration_seconds.is_finite() || duration_seconds <= 0.0 {
            return Err(NormalizeError::config(format!(
                "target duration must be positive, got {}",
                duration_seconds
            )));
        }
        let target_length = (duration_seconds * f64::from(target_samplerate)).round() as usize;
        Self::new(
            target_length,
            target_samplerate,
            padding_strategy,
            chunking_overlap_factor,
        )
    }

    /// Exact sample count of every output buffer
    pub fn target_length(&self) -> usize {
        self.target_length
    }

    /// Output sample rate for resample mode
    pub fn target_samplerate(&self) -> u32 {
        self.target_samplerate
    }

    /// Padding strategy for under-length input
    pub fn padding_strategy(&self) -> PaddingStrategy {
        self.padding_strategy
    }

    /// Fraction of a chunk shared with the next chunk
    pub fn chunking_overlap_factor(&self) -> f64 {
        self.chunking_overlap_factor
    }

    /// Read-position advance between chunks: `floor(T * (1 - overlap))`
    pub fn chunk_step(&self) -> usize {
        (self.target_length as f64 * (1.0 - self.chunking_overlap_factor)).floor() as usize
    }

    /// Target duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.target_length as f64 / f64::from(self.target_samplerate)
    }
}
