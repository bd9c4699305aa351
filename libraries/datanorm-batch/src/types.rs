//! Run configuration, per-file outcomes and run summaries

use crate::paths::{ensure_output_outside_source, OutputFormat};
use crate::scanner::DiscoveryMode;
use datanorm_core::{ErrorKind, NormalizationMode, NormalizeError, Result, TargetSpec};
use serde::Serialize;
use std::path::PathBuf;

/// Default number of files processed concurrently
pub const DEFAULT_CONCURRENCY: usize = 64;

/// Configuration for one normalization run
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Directory tree to read from
    pub source_root: PathBuf,

    /// Directory tree to write to
    pub output_root: PathBuf,

    /// Source file extension, with or without the leading dot
    pub extension: String,

    /// Normalization strategy for every file in the run
    pub mode: NormalizationMode,

    /// Output shape
    pub target: TargetSpec,

    /// Maximum number of files in flight
    pub concurrency_limit: usize,

    /// Skip files whose outputs already exist
    pub resume: bool,

    /// Eager or streaming enumeration
    pub discovery: DiscoveryMode,

    /// Output container selection
    pub output_format: OutputFormat,
}

impl BatchConfig {
    /// Create a config with default mode, concurrency and formats
    pub fn new(
        source_root: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
        extension: impl Into<String>,
        target: TargetSpec,
    ) -> Self {
        Self {
            source_root: source_root.into(),
            output_root: output_root.into(),
            extension: extension.into(),
            mode: NormalizationMode::default(),
            target,
            concurrency_limit: DEFAULT_CONCURRENCY,
            resume: false,
            discovery: DiscoveryMode::default(),
            output_format: OutputFormat::default(),
        }
    }

    /// Reject settings that cannot run
    ///
    /// # Errors
    /// Returns `NormalizeError::Config` for a zero concurrency limit, an
    /// empty extension, or an output root inside the source root.
    pub fn validate(&self) -> Result<()> {
        if self.concurrency_limit == 0 {
            return Err(NormalizeError::config("concurrency limit must be positive"));
        }
        if self.extension.trim().trim_start_matches('.').is_empty() {
            return Err(NormalizeError::config("file extension must not be empty"));
        }
        ensure_output_outside_source(&self.source_root, &self.output_root)
    }
}

/// What happened to one source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// Normalized and written to `outputs` files
    Written {
        /// Number of output files
        outputs: usize,
    },

    /// Outputs already present, file not opened
    SkippedExisting,

    /// Decoded to zero samples
    SkippedEmpty,

    /// Failed with the given error class
    Failed(ErrorKind),
}

/// Summary of a normalization run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    /// Files attempted
    pub total_files: usize,

    /// Sources successfully normalized
    pub written: usize,

    /// Output files written (fan-out counts each part)
    pub outputs_written: usize,

    /// Sources skipped by resume
    pub skipped_existing: usize,

    /// Sources with no audio samples
    pub skipped_empty: usize,

    /// Sources that could not be decoded
    pub failed_decode: usize,

    /// Sources that failed resampling or shaping
    pub failed_transform: usize,

    /// Sources whose outputs could not be written
    pub failed_encode: usize,

    /// Error messages for failed sources
    pub errors: Vec<(PathBuf, String)>,

    /// Wall-clock duration of the run
    pub duration_seconds: f64,
}

impl BatchSummary {
    /// Tally one outcome
    pub fn record(&mut self, outcome: FileOutcome) {
        self.total_files += 1;
        match outcome {
            FileOutcome::Written { outputs } => {
                self.written += 1;
                self.outputs_written += outputs;
            }
            FileOutcome::SkippedExisting => self.skipped_existing += 1,
            FileOutcome::SkippedEmpty => self.skipped_empty += 1,
            FileOutcome::Failed(ErrorKind::Decode) => self.failed_decode += 1,
            FileOutcome::Failed(ErrorKind::Transform) => self.failed_transform += 1,
            // Path mapping and setup problems surface at write time
            FileOutcome::Failed(ErrorKind::Encode | ErrorKind::Discovery | ErrorKind::Config) => {
                self.failed_encode += 1;
            }
        }
    }

    /// Total failed sources
    pub fn failed(&self) -> usize {
        self.failed_decode + self.failed_transform + self.failed_encode
    }

    /// Total skipped sources
    pub fn skipped(&self) -> usize {
        self.skipped_existing + self.skipped_empty
    }

    pub fn summary_text(&self) -> String {
        format!(
            "Normalization complete: {} written ({} outputs), {} skipped, {} failed in {:.1}s",
            self.written,
            self.outputs_written,
            self.skipped(),
            self.failed(),
            self.duration_seconds
        )
    }
}

/// Progress snapshot handed to the progress callback
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchProgress {
    /// Total files, when discovery was eager
    pub total_files: Option<usize>,

    /// Files completed so far
    pub processed_files: usize,

    pub written: usize,
    pub skipped: usize,
    pub failed: usize,

    /// Most recently completed file
    pub current_file: Option<PathBuf>,
}

impl BatchProgress {
    /// Create a progress tracker
    pub fn new(total_files: Option<usize>) -> Self {
        Self {
            total_files,
            ..Self::default()
        }
    }

    /// Advance by one completed file
    pub fn advance(&mut self, path: PathBuf, outcome: FileOutcome) {
        self.processed_files += 1;
        match outcome {
            FileOutcome::Written { .. } => self.written += 1,
            FileOutcome::SkippedExisting | FileOutcome::SkippedEmpty => self.skipped += 1,
            FileOutcome::Failed(_) => self.failed += 1,
        }
        self.current_file = Some(path);
    }

    pub fn percentage(&self) -> Option<f32> {
        self.total_files.map(|total| {
            if total == 0 {
                return 100.0;
            }
            (self.processed_files as f32 / total as f32) * 100.0
        })
    }
}

/// Callback for batch progress updates
pub type ProgressCallback = Box<dyn Fn(&BatchProgress) + Send + Sync>;
