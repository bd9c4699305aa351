//! Collaborator traits consumed by the engine and the batch orchestrator

use crate::error::Result;
use crate::types::{AudioBuffer, AudioInfo, DecodedAudio};
use std::path::Path;

/// Audio decoder trait
///
/// Implementers read a whole file into interleaved `f32` samples. Decoders are
/// shared between concurrent file tasks, so decoding takes `&self`.
pub trait AudioDecoder: Send + Sync {
    /// Decode an audio file from the given path (loads entire file)
    ///
    /// # Errors
    /// Returns `NormalizeError::Decode` if the file cannot be read or parsed
    fn decode(&self, path: &Path) -> Result<DecodedAudio>;

    /// Read stream properties without keeping the samples around
    ///
    /// The default implementation decodes the whole file.
    fn probe(&self, path: &Path) -> Result<AudioInfo> {
        let decoded = self.decode(path)?;
        Ok(AudioInfo {
            frames: decoded.frames() as u64,
            sample_rate: decoded.sample_rate,
            channels: decoded.channels,
        })
    }
}

/// Audio encoder trait
///
/// Implementers write a mono buffer to disk at the buffer's sample rate.
pub trait AudioEncoder: Send + Sync {
    /// Write `buffer` to `path`, replacing any existing file
    ///
    /// # Errors
    /// Returns `NormalizeError::Encode` if the destination cannot be written
    fn encode(&self, path: &Path, buffer: &AudioBuffer) -> Result<()>;

    /// Check if the encoder can produce the container implied by `path`
    fn supports(&self, path: &Path) -> bool;
}

/// Sample rate converter
pub trait Resampler: Send + Sync {
    /// Convert mono `samples` from `from_rate` to `to_rate`
    ///
    /// # Errors
    /// Returns `NormalizeError::Transform` if conversion fails
    fn resample(&self, samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>>;
}
