//! Domain types shared across the workspace

mod audio;
mod target;

pub use audio::{AudioBuffer, AudioInfo, DecodedAudio};
pub use target::{NormalizationMode, PaddingStrategy, TargetSpec};
