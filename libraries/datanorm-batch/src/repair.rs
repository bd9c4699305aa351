//! Corrupt-file repair
//!
//! Files the decoder can read are copied verbatim; anything else is
//! re-encoded through an external FFmpeg process.

use crate::ffmpeg::{Ffmpeg, FfmpegError};
use crate::paths::{ensure_output_outside_source, OutputFormat, OutputLayout};
use crate::scanner::{normalize_extension, FileScanner};
use crate::tasks::FileTasks;
use datanorm_core::{AudioDecoder, NormalizeError};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum RepairError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Output already exists: {}", .0.display())]
    OutputExists(PathBuf),

    #[error("No repair handler for '{0}' files")]
    UnsupportedFormat(String),

    #[error("Decode check failed: {0}")]
    Worker(String),

    #[error(transparent)]
    Ffmpeg(#[from] FfmpegError),
}

/// How a file was repaired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairAction {
    /// Decoded cleanly and was copied as-is
    Copied,

    /// Re-encoded by FFmpeg
    Reencoded,
}

/// Summary of a repair run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RepairSummary {
    pub total_files: usize,
    pub copied: usize,
    pub reencoded: usize,
    pub failed: usize,

    /// Error messages for failed files
    pub errors: Vec<(PathBuf, String)>,

    pub duration_seconds: f64,
}

impl RepairSummary {
    pub fn summary_text(&self) -> String {
        format!(
            "Repair complete: {} copied, {} re-encoded, {} failed",
            self.copied, self.reencoded, self.failed
        )
    }
}

/// Codec arguments FFmpeg needs to rebuild a file of the given extension
pub fn codec_args(extension: &str) -> Option<&'static [&'static str]> {
    match normalize_extension(extension).as_str() {
        ".flac" => Some(&["-c:a", "flac", "-compression_level", "5"]),
        ".wav" => Some(&["-c:a", "pcm_s16le"]),
        _ => None,
    }
}

/// Repairs a directory of possibly corrupt audio files
#[derive(Clone)]
pub struct Repairer {
    decoder: Arc<dyn AudioDecoder>,
    ffmpeg: Ffmpeg,
}

impl Repairer {
    /// Create a repairer using `ffmpeg` from `PATH`
    pub fn new(decoder: Arc<dyn AudioDecoder>) -> Self {
        Self {
            decoder,
            ffmpeg: Ffmpeg::default(),
        }
    }

    /// Use a specific FFmpeg binary
    pub fn with_ffmpeg(mut self, ffmpeg_path: impl Into<PathBuf>) -> Self {
        self.ffmpeg = Ffmpeg::new(ffmpeg_path);
        self
    }

    /// Repair every matching file under `source_root` into `output_root`
    ///
    /// The source tree layout is mirrored. Existing outputs are replaced
    /// when `overwrite` is set and fail the file otherwise.
    ///
    /// # Errors
    /// Returns `NormalizeError::Config` for an extension without a repair
    /// handler, a zero concurrency limit or an output root inside the source
    /// root, and `NormalizeError::Discovery`
    /// when the source root cannot be scanned.
    pub async fn repair_directory(
        &self,
        source_root: &Path,
        output_root: &Path,
        extension: &str,
        concurrency_limit: usize,
        overwrite: bool,
    ) -> Result<RepairSummary, NormalizeError> {
        let start_time = Instant::now();

        let codec = codec_args(extension).ok_or_else(|| {
            NormalizeError::config(RepairError::UnsupportedFormat(extension.to_string()).to_string())
        })?;
        if concurrency_limit == 0 {
            return Err(NormalizeError::config("concurrency limit must be positive"));
        }
        ensure_output_outside_source(source_root, output_root)?;

        let files = FileScanner::new().scan_directory(source_root, extension)?;
        info!("Repairing {} files from {}", files.len(), source_root.display());

        let layout = OutputLayout::new(source_root, output_root, OutputFormat::Source);
        let semaphore = Arc::new(Semaphore::new(concurrency_limit));
        let mut tasks = FileTasks::new();
        let mut summary = RepairSummary::default();

        for source in files {
            let destination = match layout.output_path(&source) {
                Ok(destination) => destination,
                Err(e) => {
                    summary.total_files += 1;
                    summary.failed += 1;
                    summary.errors.push((source, e.to_string()));
                    continue;
                }
            };

            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| NormalizeError::config(format!("concurrency gate closed: {}", e)))?;
            let repairer = self.clone();

            tasks.spawn(source.clone(), async move {
                let _permit = permit;
                repairer
                    .repair_file(&source, &destination, codec, overwrite)
                    .await
            });
        }

        while let Some((path, result)) = tasks.next().await {
            summary.total_files += 1;
            let error = match result {
                Ok(Ok(RepairAction::Copied)) => {
                    summary.copied += 1;
                    continue;
                }
                Ok(Ok(RepairAction::Reencoded)) => {
                    summary.reencoded += 1;
                    continue;
                }
                Ok(Err(e)) => e.to_string(),
                Err(e) => format!("repair task failed: {}", e),
            };

            warn!("Couldn't repair {}: {}", path.display(), error);
            summary.failed += 1;
            summary.errors.push((path, error));
        }

        summary.duration_seconds = start_time.elapsed().as_secs_f64();
        info!("{}", summary.summary_text());

        Ok(summary)
    }

    /// Repair one file
    pub async fn repair_file(
        &self,
        source: &Path,
        destination: &Path,
        codec: &[&str],
        overwrite: bool,
    ) -> Result<RepairAction, RepairError> {
        if destination.exists() {
            if !overwrite {
                return Err(RepairError::OutputExists(destination.to_path_buf()));
            }
            tokio::fs::remove_file(destination).await?;
        }

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let decoder = Arc::clone(&self.decoder);
        let probe_path = source.to_path_buf();
        let readable = tokio::task::spawn_blocking(move || decoder.decode(&probe_path))
            .await
            .map_err(|e| RepairError::Worker(e.to_string()))?;

        match readable {
            Ok(_) => {
                tokio::fs::copy(source, destination).await?;
                debug!("Copied intact file {}", source.display());
                Ok(RepairAction::Copied)
            }
            Err(e) => {
                debug!("Re-encoding {}: {}", source.display(), e);
                self.ffmpeg.transcode(source, codec, destination).await?;
                Ok(RepairAction::Reencoded)
            }
        }
    }
}
