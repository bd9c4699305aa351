//! Dataset statistics: length, sample rate and duration distributions

use crate::labels::LabeledFile;
use crate::scanner::FileScanner;
use crate::tasks::FileTasks;
use datanorm_core::{AudioDecoder, AudioInfo, NormalizeError, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{info, warn};

/// Summary statistics over one measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stats {
    pub mean: f64,
    pub median: f64,
    pub max: f64,
    pub min: f64,
    pub count: usize,
}

impl Stats {
    /// Compute statistics, or `None` for an empty sample
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let middle = count / 2;
        let median = if count % 2 == 0 {
            (sorted[middle - 1] + sorted[middle]) / 2.0
        } else {
            sorted[middle]
        };

        Some(Self {
            mean: sorted.iter().sum::<f64>() / count as f64,
            median,
            max: sorted[count - 1],
            min: sorted[0],
            count,
        })
    }
}

/// Statistics for a directory of audio files
#[derive(Debug, Clone, Default, Serialize)]
pub struct DatasetStats {
    /// Files that were probed successfully
    pub files: usize,

    /// Length in samples per channel
    pub lengths: Option<Stats>,

    /// Sample rate in Hz
    pub sample_rates: Option<Stats>,

    /// Duration in seconds
    pub durations: Option<Stats>,

    /// Files that could not be read
    pub failures: Vec<(PathBuf, String)>,

    /// Wall-clock duration of the analysis
    pub duration_seconds: f64,
}

impl DatasetStats {
    /// Build statistics from probed stream properties
    pub fn from_infos(infos: &[AudioInfo]) -> Self {
        let lengths: Vec<f64> = infos.iter().map(|i| i.frames as f64).collect();
        let rates: Vec<f64> = infos.iter().map(|i| f64::from(i.sample_rate)).collect();
        let durations: Vec<f64> = infos.iter().map(AudioInfo::duration_secs).collect();

        Self {
            files: infos.len(),
            lengths: Stats::from_values(&lengths),
            sample_rates: Stats::from_values(&rates),
            durations: Stats::from_values(&durations),
            ..Self::default()
        }
    }
}

/// Dataset statistics overall and broken down by label
#[derive(Debug, Clone, Default, Serialize)]
pub struct LabeledStats {
    /// Every labeled file
    pub overall: DatasetStats,

    /// Files of each label
    pub per_label: BTreeMap<String, DatasetStats>,
}

/// Probe every matching file under `root` and summarize the dataset
///
/// Unreadable files are logged and listed in [`DatasetStats::failures`];
/// files with zero frames or a zero sample rate are listed there too.
///
/// # Errors
/// Returns `NormalizeError::Discovery` if `root` cannot be scanned and
/// `NormalizeError::Config` for a zero concurrency limit.
pub async fn analyze_directory(
    root: &Path,
    extension: &str,
    decoder: Arc<dyn AudioDecoder>,
    concurrency_limit: usize,
) -> Result<DatasetStats> {
    if concurrency_limit == 0 {
        return Err(NormalizeError::config("concurrency limit must be positive"));
    }

    let start_time = Instant::now();
    let files = FileScanner::new().scan_directory(root, extension)?;
    info!("Analyzing {} files under {}", files.len(), root.display());

    let probed = probe_all(files, decoder, concurrency_limit).await?;

    let mut stats = summarize(probed.iter());
    stats.duration_seconds = start_time.elapsed().as_secs_f64();

    info!(
        files = stats.files,
        failures = stats.failures.len(),
        "Dataset analysis finished"
    );

    Ok(stats)
}

/// Probe the files named by a label table and summarize them per label
///
/// File names resolve against `root`. A file listed more than once is
/// probed once and counted once per row.
///
/// # Errors
/// Returns `NormalizeError::Discovery` if `root` is not a directory and
/// `NormalizeError::Config` for a zero concurrency limit.
pub async fn analyze_labeled(
    root: &Path,
    labels: &[LabeledFile],
    decoder: Arc<dyn AudioDecoder>,
    concurrency_limit: usize,
) -> Result<LabeledStats> {
    if concurrency_limit == 0 {
        return Err(NormalizeError::config("concurrency limit must be positive"));
    }
    if !root.is_dir() {
        return Err(NormalizeError::discovery(root, "not a directory"));
    }

    let start_time = Instant::now();
    let files: BTreeSet<PathBuf> = labels.iter().map(|row| root.join(&row.filename)).collect();
    info!(
        "Analyzing {} labeled files ({} rows) under {}",
        files.len(),
        labels.len(),
        root.display()
    );

    let probed = probe_all(files.into_iter().collect(), decoder, concurrency_limit).await?;

    let mut rows_by_label: BTreeMap<&str, Vec<(&PathBuf, &ProbeResult)>> = BTreeMap::new();
    let mut all_rows = Vec::with_capacity(labels.len());
    for row in labels {
        let path = root.join(&row.filename);
        if let Some((path, result)) = probed.get_key_value(&path) {
            rows_by_label
                .entry(row.label.as_str())
                .or_default()
                .push((path, result));
            all_rows.push((path, result));
        }
    }

    let mut overall = summarize(all_rows.into_iter());
    overall.duration_seconds = start_time.elapsed().as_secs_f64();

    let per_label = rows_by_label
        .into_iter()
        .map(|(label, rows)| (label.to_string(), summarize(rows.into_iter())))
        .collect();

    info!(
        files = overall.files,
        failures = overall.failures.len(),
        "Labeled dataset analysis finished"
    );

    Ok(LabeledStats { overall, per_label })
}

/// Stream properties of one file, or why they could not be read
type ProbeResult = std::result::Result<AudioInfo, String>;

/// Probe `files` under a concurrency cap
async fn probe_all(
    files: Vec<PathBuf>,
    decoder: Arc<dyn AudioDecoder>,
    concurrency_limit: usize,
) -> Result<HashMap<PathBuf, ProbeResult>> {
    let semaphore = Arc::new(Semaphore::new(concurrency_limit));
    let mut tasks = FileTasks::new();

    for path in files {
        let permit = Arc::clone(&semaphore)
            .acquire_owned()
            .await
            .map_err(|e| NormalizeError::config(format!("concurrency gate closed: {}", e)))?;
        let decoder = Arc::clone(&decoder);
        let source = path.clone();

        tasks.spawn(path, async move {
            let _permit = permit;
            tokio::task::spawn_blocking(move || decoder.probe(&source)).await
        });
    }

    let mut probed = HashMap::new();
    while let Some((path, result)) = tasks.next().await {
        let result = match result.and_then(|inner| inner) {
            Ok(Ok(info)) if info.frames > 0 && info.sample_rate > 0 => Ok(info),
            Ok(Ok(_)) => Err("empty stream".to_string()),
            Ok(Err(e)) => Err(e.to_string()),
            Err(e) => Err(format!("probe task failed: {}", e)),
        };

        if let Err(reason) = &result {
            warn!("Couldn't read {}: {}", path.display(), reason);
        }
        probed.insert(path, result);
    }

    Ok(probed)
}

/// Statistics over probed files, with failures sorted by path
fn summarize<'a>(rows: impl Iterator<Item = (&'a PathBuf, &'a ProbeResult)>) -> DatasetStats {
    let mut infos = Vec::new();
    let mut failures = Vec::new();

    for (path, result) in rows {
        match result {
            Ok(info) => infos.push(*info),
            Err(reason) => failures.push((path.clone(), reason.clone())),
        }
    }
    failures.sort();

    let mut stats = DatasetStats::from_infos(&infos);
    stats.failures = failures;
    stats
}
