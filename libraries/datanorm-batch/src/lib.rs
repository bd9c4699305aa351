//! datanorm Batch
//!
//! Dataset-level processing for datanorm:
//! - File discovery, eager or streaming
//! - Output path mapping with `_part_{n}` fan-out naming
//! - The batch orchestrator: bounded concurrency, resume, per-file failure
//!   isolation, atomic writes
//! - Dataset statistics, overall or per label
//! - Corrupt-file repair and bulk format conversion through FFmpeg
//!
//! # Example
//!
//! ```rust,no_run
//! use datanorm_audio::{RubatoResampler, SymphoniaDecoder, WavEncoder};
//! use datanorm_batch::{BatchConfig, BatchOrchestrator};
//! use datanorm_core::{NormalizationMode, PaddingStrategy, TargetSpec};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let target = TargetSpec::from_duration(4.0, 16_000, PaddingStrategy::Repeat, 0.1)?;
//! let mut config = BatchConfig::new("/data/raw", "/data/normalized", "wav", target);
//! config.mode = NormalizationMode::Resize;
//! config.resume = true;
//!
//! let orchestrator = BatchOrchestrator::new(
//!     config,
//!     Arc::new(SymphoniaDecoder::new()),
//!     Arc::new(WavEncoder::new()),
//!     Arc::new(RubatoResampler::default()),
//! );
//!
//! let summary = orchestrator.run().await?;
//! println!("{}", summary.summary_text());
//! # Ok(())
//! # }
//! ```

pub mod convert;
pub mod ffmpeg;
pub mod labels;
pub mod orchestrator;
pub mod paths;
pub mod repair;
pub mod scanner;
pub mod stats;
mod tasks;
pub mod types;

pub use convert::{ConvertSummary, Converter};
pub use ffmpeg::{Ffmpeg, FfmpegError};
pub use labels::{read_labels, LabeledFile};
pub use orchestrator::BatchOrchestrator;
pub use paths::{ensure_output_outside_source, OutputFormat, OutputLayout};
pub use repair::{codec_args, RepairAction, RepairError, RepairSummary, Repairer};
pub use scanner::{normalize_extension, DiscoveryMode, FileScanner, ScanIter};
pub use stats::{analyze_directory, analyze_labeled, DatasetStats, LabeledStats, Stats};
pub use types::{
    BatchConfig, BatchProgress, BatchSummary, FileOutcome, ProgressCallback, DEFAULT_CONCURRENCY,
};
