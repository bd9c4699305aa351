//! Batch orchestration - brings together discovery, decoding, normalization
//! and encoding under a per-run concurrency cap
//!
//! Every file goes through [`FileJob::process_file`] on the blocking pool.
//! Per-file failures are logged and tallied; only discovery and configuration
//! errors end a run early.

use crate::paths::{output_paths, stale_outputs, OutputLayout};
use crate::scanner::{normalize_extension, DiscoveryMode, FileScanner};
use crate::tasks::FileTasks;
use crate::types::{BatchConfig, BatchProgress, BatchSummary, FileOutcome, ProgressCallback};
use datanorm_audio::normalize::normalize;
use datanorm_core::{
    AudioBuffer, AudioDecoder, AudioEncoder, ErrorKind, NormalizationMode, NormalizeError,
    Resampler, Result, TargetSpec,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tracing::{debug, error, info, warn};

/// Result of one file task, including a panic on the blocking pool
type TaskResult = std::result::Result<Result<FileOutcome>, JoinError>;

/// Dataset normalization orchestrator
pub struct BatchOrchestrator {
    config: BatchConfig,
    decoder: Arc<dyn AudioDecoder>,
    encoder: Arc<dyn AudioEncoder>,
    resampler: Arc<dyn Resampler>,
    scanner: FileScanner,
    /// Progress callback
    progress_callback: Option<ProgressCallback>,
}

impl BatchOrchestrator {
    /// Create a new orchestrator
    pub fn new(
        config: BatchConfig,
        decoder: Arc<dyn AudioDecoder>,
        encoder: Arc<dyn AudioEncoder>,
        resampler: Arc<dyn Resampler>,
    ) -> Self {
        Self {
            config,
            decoder,
            encoder,
            resampler,
            scanner: FileScanner::new(),
            progress_callback: None,
        }
    }

    /// Replace the file scanner (e.g. to follow symlinks)
    pub fn with_scanner(mut self, scanner: FileScanner) -> Self {
        self.scanner = scanner;
        self
    }

    /// Set progress callback, invoked after every completed file
    pub fn on_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Run configuration
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Normalize every matching file under the source root
    ///
    /// Returns once every discovered file has been attempted.
    ///
    /// # Errors
    /// Returns `NormalizeError::Config` for an unusable configuration and
    /// `NormalizeError::Discovery` when the source root cannot be scanned.
    /// Per-file failures are reported in the summary instead.
    pub async fn run(&self) -> Result<BatchSummary> {
        let start_time = Instant::now();
        self.config.validate()?;

        let extension = normalize_extension(&self.config.extension);
        let (files, total_files): (Box<dyn Iterator<Item = PathBuf> + Send>, Option<usize>) =
            match self.config.discovery {
                DiscoveryMode::Eager => {
                    let files = self
                        .scanner
                        .scan_directory(&self.config.source_root, &extension)?;
                    let total = files.len();
                    (Box::new(files.into_iter()), Some(total))
                }
                DiscoveryMode::Streaming => (
                    Box::new(self.scanner.walk(&self.config.source_root, &extension)?),
                    None,
                ),
            };

        info!(
            source = %self.config.source_root.display(),
            output = %self.config.output_root.display(),
            mode = %self.config.mode,
            target_length = self.config.target.target_length(),
            concurrency = self.config.concurrency_limit,
            discovery = %self.config.discovery,
            files = ?total_files,
            "Starting normalization run"
        );

        let job = Arc::new(FileJob {
            layout: OutputLayout::new(
                &self.config.source_root,
                &self.config.output_root,
                self.config.output_format,
            ),
            mode: self.config.mode,
            target: self.config.target,
            resume: self.config.resume,
            decoder: Arc::clone(&self.decoder),
            encoder: Arc::clone(&self.encoder),
            resampler: Arc::clone(&self.resampler),
        });

        // Owned by this run only
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency_limit));
        let mut tasks: FileTasks<TaskResult> = FileTasks::new();
        let mut summary = BatchSummary::default();
        let mut progress = BatchProgress::new(total_files);

        for path in files {
            // Acquire before spawning so discovery waits for a free slot
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| NormalizeError::config(format!("concurrency gate closed: {}", e)))?;

            while let Some((done, result)) = tasks.try_next() {
                self.complete(done, result.and_then(|inner| inner), &mut summary, &mut progress);
            }

            let job = Arc::clone(&job);
            let source = path.clone();
            tasks.spawn(path, async move {
                let _permit = permit;
                tokio::task::spawn_blocking(move || job.process_file(&source)).await
            });
        }

        while let Some((done, result)) = tasks.next().await {
            self.complete(done, result.and_then(|inner| inner), &mut summary, &mut progress);
        }

        summary.duration_seconds = start_time.elapsed().as_secs_f64();

        info!(
            written = summary.written,
            outputs = summary.outputs_written,
            skipped_existing = summary.skipped_existing,
            skipped_empty = summary.skipped_empty,
            failed = summary.failed(),
            duration_secs = summary.duration_seconds,
            "Normalization run finished"
        );

        Ok(summary)
    }

    /// Fold one finished task into the summary and report progress
    fn complete(
        &self,
        path: PathBuf,
        result: TaskResult,
        summary: &mut BatchSummary,
        progress: &mut BatchProgress,
    ) {
        let outcome = match result {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                match e.kind() {
                    ErrorKind::Encode | ErrorKind::Discovery | ErrorKind::Config => {
                        error!("Failed to write outputs for {}: {}", path.display(), e);
                    }
                    ErrorKind::Decode | ErrorKind::Transform => {
                        warn!("Failed to normalize {}: {}", path.display(), e);
                    }
                }
                summary.errors.push((path.clone(), e.to_string()));
                FileOutcome::Failed(e.kind())
            }
            Err(e) => {
                error!("Worker failed on {}: {}", path.display(), e);
                summary.errors.push((path.clone(), format!("worker failed: {}", e)));
                FileOutcome::Failed(ErrorKind::Transform)
            }
        };

        summary.record(outcome);
        progress.advance(path, outcome);

        if let Some(callback) = &self.progress_callback {
            callback(progress);
        }
    }
}

/// Everything a worker needs to process one file
struct FileJob {
    layout: OutputLayout,
    mode: NormalizationMode,
    target: TargetSpec,
    resume: bool,
    decoder: Arc<dyn AudioDecoder>,
    encoder: Arc<dyn AudioEncoder>,
    resampler: Arc<dyn Resampler>,
}

impl FileJob {
    /// Decode, normalize and write one source file
    fn process_file(&self, source: &Path) -> Result<FileOutcome> {
        let base = self.layout.output_path(source)?;

        if self.resume && self.layout.resume_candidates(&base).iter().any(|p| p.exists()) {
            debug!("Skipping {}: output exists", source.display());
            return Ok(FileOutcome::SkippedExisting);
        }

        let audio = self.decoder.decode(source)?.into_mono();
        if audio.is_empty() {
            warn!("Skipping {}: no audio samples", source.display());
            return Ok(FileOutcome::SkippedEmpty);
        }

        let source_rate = audio.sample_rate;
        let outputs = normalize(audio, self.mode, &self.target, self.resampler.as_ref())?;
        let destinations = output_paths(&base, outputs.len());

        if let Some(parent) = base.parent() {
            fs::create_dir_all(parent).map_err(|e| NormalizeError::encode(parent, e))?;
        }

        // Part 0 lands last, so its presence means every part was committed
        for (destination, buffer) in destinations.iter().zip(&outputs).rev() {
            self.write_atomic(destination, buffer)?;
        }

        // Leftovers from an earlier run with a different fan-out
        for stale in stale_outputs(&base, outputs.len()) {
            fs::remove_file(&stale).map_err(|e| NormalizeError::encode(&stale, e))?;
            debug!("Removed stale output {}", stale.display());
        }

        debug!(
            "Normalized {} ({} Hz) into {} output(s)",
            source.display(),
            source_rate,
            outputs.len()
        );

        Ok(FileOutcome::Written {
            outputs: outputs.len(),
        })
    }

    /// Encode into a temp file next to `destination`, then rename over it
    fn write_atomic(&self, destination: &Path, buffer: &AudioBuffer) -> Result<()> {
        let directory = destination.parent().unwrap_or_else(|| Path::new("."));
        let suffix = destination
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let mut builder = tempfile::Builder::new();
        builder.prefix(".datanorm-").suffix(&suffix);
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // Plain-create mode; the process umask still applies
            builder.permissions(fs::Permissions::from_mode(0o666));
        }

        let temp = builder
            .tempfile_in(directory)
            .map_err(|e| NormalizeError::encode(destination, e))?;

        self.encoder
            .encode(temp.path(), buffer)
            .map_err(|e| match e {
                NormalizeError::Encode { reason, .. } => NormalizeError::encode(destination, reason),
                other => other,
            })?;

        temp.persist(destination)
            .map_err(|e| NormalizeError::encode(destination, e.error))?;

        Ok(())
    }
}
