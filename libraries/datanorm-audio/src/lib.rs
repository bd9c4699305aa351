//! datanorm Audio
//!
//! Decoding, resampling, normalization and WAV output for datanorm.
//!
//! This crate provides:
//! - Audio decoding via Symphonia (MP3, FLAC, OGG, WAV, AAC)
//! - Offline sinc resampling via rubato
//! - The normalization engine: resample-and-fit or overlapping chunking
//! - Mono WAV output via hound
//!
//! # Example: Normalizing a Buffer
//!
//! ```rust
//! use datanorm_audio::normalize::normalize;
//! use datanorm_audio::resampling::{ResamplingQuality, RubatoResampler};
//! use datanorm_core::{AudioBuffer, NormalizationMode, PaddingStrategy, TargetSpec};
//!
//! let spec = TargetSpec::new(10, 16_000, PaddingStrategy::Repeat, 0.1).unwrap();
//! let resampler = RubatoResampler::new(ResamplingQuality::Fast);
//!
//! // 100 samples split into overlapping 10-sample windows
//! let buffer = AudioBuffer::new(vec![0.0; 100], 16_000);
//! let chunks = normalize(buffer, NormalizationMode::Resize, &spec, &resampler).unwrap();
//! assert_eq!(chunks.len(), 11);
//! ```
//!
//! # Example: Decoding a File
//!
//! ```rust,no_run
//! use datanorm_audio::SymphoniaDecoder;
//! use datanorm_core::AudioDecoder;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let decoder = SymphoniaDecoder::new();
//! let decoded = decoder.decode(Path::new("/data/clip.flac"))?;
//! let mono = decoded.into_mono();
//!
//! println!("Decoded {} samples at {} Hz", mono.len(), mono.sample_rate);
//! # Ok(())
//! # }
//! ```

mod decoder;
mod encoder;
mod error;
pub mod normalize;
pub mod resampling;

pub use decoder::SymphoniaDecoder;
pub use encoder::{SampleFormat, WavEncoder};
pub use error::{AudioError, Result};
pub use resampling::{ResamplingQuality, RubatoResampler};
