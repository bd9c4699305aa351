//! datanorm Core
//!
//! Shared types, collaborator traits, and error handling for the datanorm
//! workspace.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `AudioBuffer`, `DecodedAudio`, `TargetSpec`, and the
//!   closed strategy enums (`NormalizationMode`, `PaddingStrategy`)
//! - **Core Traits**: `AudioDecoder`, `AudioEncoder`, `Resampler`
//! - **Error Handling**: Unified `NormalizeError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use datanorm_core::{PaddingStrategy, TargetSpec};
//!
//! // Four seconds at 16 kHz, repeat-padded, 10% chunk overlap
//! let spec = TargetSpec::from_duration(4.0, 16_000, PaddingStrategy::Repeat, 0.1).unwrap();
//! assert_eq!(spec.target_length(), 64_000);
//! assert_eq!(spec.chunk_step(), 57_600);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{ErrorKind, NormalizeError, Result};
pub use traits::{AudioDecoder, AudioEncoder, Resampler};
pub use types::{
    AudioBuffer, AudioInfo, DecodedAudio, NormalizationMode, PaddingStrategy, TargetSpec,
};
