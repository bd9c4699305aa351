//! Bulk format conversion through FFmpeg
//!
//! Every matching file under the source root is handed to FFmpeg with the
//! caller's extra arguments and written under the output root with the
//! target extension, mirroring the source tree. Existing outputs are
//! overwritten.

use crate::ffmpeg::{Ffmpeg, FfmpegError};
use crate::paths::{ensure_output_outside_source, OutputFormat, OutputLayout};
use crate::scanner::{normalize_extension, FileScanner};
use crate::tasks::FileTasks;
use datanorm_core::NormalizeError;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Summary of a conversion run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConvertSummary {
    pub total_files: usize,
    pub converted: usize,
    pub failed: usize,

    /// Error messages for failed files
    pub errors: Vec<(PathBuf, String)>,

    pub duration_seconds: f64,
}

impl ConvertSummary {
    pub fn summary_text(&self) -> String {
        format!(
            "Conversion complete: {} of {} converted, {} failed",
            self.converted, self.total_files, self.failed
        )
    }
}

/// Converts a directory of audio files to another container/codec
#[derive(Debug, Clone, Default)]
pub struct Converter {
    ffmpeg: Ffmpeg,
}

impl Converter {
    /// Create a converter using `ffmpeg` from `PATH`
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific FFmpeg binary
    pub fn with_ffmpeg(mut self, ffmpeg_path: impl Into<PathBuf>) -> Self {
        self.ffmpeg = Ffmpeg::new(ffmpeg_path);
        self
    }

    /// Convert every `extension` file under `source_root` to `output_format`
    ///
    /// `extra_args` are passed to FFmpeg between the input and the output,
    /// e.g. `["-ar", "16000", "-ac", "1"]`.
    ///
    /// # Errors
    /// Returns `NormalizeError::Config` for an empty output format, a zero
    /// concurrency limit or an output root inside the source root, and
    /// `NormalizeError::Discovery` when the source root cannot be scanned.
    pub async fn convert_directory(
        &self,
        source_root: &Path,
        output_root: &Path,
        extension: &str,
        output_format: &str,
        concurrency_limit: usize,
        extra_args: &[String],
    ) -> Result<ConvertSummary, NormalizeError> {
        let start_time = Instant::now();

        let target_extension = normalize_extension(output_format)
            .trim_start_matches('.')
            .to_string();
        if target_extension.is_empty() {
            return Err(NormalizeError::config("output format must not be empty"));
        }
        if concurrency_limit == 0 {
            return Err(NormalizeError::config("concurrency limit must be positive"));
        }
        ensure_output_outside_source(source_root, output_root)?;

        let files = FileScanner::new().scan_directory(source_root, extension)?;
        info!(
            "Converting {} files from {} to {}",
            files.len(),
            source_root.display(),
            target_extension
        );

        let layout = OutputLayout::new(source_root, output_root, OutputFormat::Source);
        let extra_args: Arc<[String]> = extra_args.into();
        let semaphore = Arc::new(Semaphore::new(concurrency_limit));
        let mut tasks = FileTasks::new();
        let mut summary = ConvertSummary::default();

        for source in files {
            let mut destination = match layout.output_path(&source) {
                Ok(destination) => destination,
                Err(e) => {
                    summary.total_files += 1;
                    summary.failed += 1;
                    summary.errors.push((source, e.to_string()));
                    continue;
                }
            };
            destination.set_extension(&target_extension);

            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| NormalizeError::config(format!("concurrency gate closed: {}", e)))?;
            let converter = self.clone();
            let extra_args = Arc::clone(&extra_args);

            tasks.spawn(source.clone(), async move {
                let _permit = permit;
                converter
                    .convert_file(&source, &destination, &extra_args)
                    .await
            });
        }

        while let Some((path, result)) = tasks.next().await {
            summary.total_files += 1;
            let error = match result {
                Ok(Ok(())) => {
                    summary.converted += 1;
                    continue;
                }
                Ok(Err(e)) => e.to_string(),
                Err(e) => format!("conversion task failed: {}", e),
            };

            warn!("Couldn't convert {}: {}", path.display(), error);
            summary.failed += 1;
            summary.errors.push((path, error));
        }

        summary.duration_seconds = start_time.elapsed().as_secs_f64();
        info!("{}", summary.summary_text());

        Ok(summary)
    }

    /// Convert one file, creating the destination directory
    pub async fn convert_file(
        &self,
        source: &Path,
        destination: &Path,
        extra_args: &[String],
    ) -> Result<(), FfmpegError> {
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        self.ffmpeg.transcode(source, extra_args, destination).await?;
        debug!("Converted {} -> {}", source.display(), destination.display());
        Ok(())
    }
}
