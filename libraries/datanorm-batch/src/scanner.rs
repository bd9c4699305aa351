//! File discovery for source audio
//!
//! Two ways to enumerate a source tree: [`FileScanner::scan_directory`]
//! collects and sorts everything up front, [`FileScanner::walk`] yields paths
//! lazily while the tree is traversed.

use datanorm_core::{NormalizeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use walkdir::WalkDir;

/// How the orchestrator enumerates source files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryMode {
    /// Collect the full, sorted file list before processing starts
    #[default]
    Eager,

    /// Process files while the directory walk is still running
    Streaming,
}

impl DiscoveryMode {
    /// Configuration name of this mode
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eager => "eager",
            Self::Streaming => "streaming",
        }
    }
}

impl fmt::Display for DiscoveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscoveryMode {
    type Err = NormalizeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "eager" => Ok(Self::Eager),
            "streaming" | "lazy" => Ok(Self::Streaming),
            other => Err(NormalizeError::config(format!(
                "unknown discovery mode '{}' (expected 'eager' or 'streaming')",
                other
            ))),
        }
    }
}

/// Normalize a user-supplied extension to a lowercase, dot-prefixed suffix
///
/// `"wav"`, `".wav"` and `" WAV "` all become `".wav"`.
pub fn normalize_extension(extension: &str) -> String {
    let trimmed = extension.trim().trim_start_matches('.').to_lowercase();
    format!(".{}", trimmed)
}

/// Check whether a file name ends with `suffix`, ignoring case
///
/// `suffix` is expected in [`normalize_extension`] form.
pub fn matches_extension(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.to_lowercase().ends_with(suffix))
}

/// Scanner for audio files in directories
#[derive(Debug, Clone, Default)]
pub struct FileScanner {
    /// Whether to follow symbolic links
    follow_links: bool,

    /// Maximum depth to traverse
    max_depth: Option<usize>,
}

impl FileScanner {
    /// Create a new file scanner
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to follow symbolic links
    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Set maximum directory depth to traverse
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Scan a directory tree for files ending in `extension`
    ///
    /// The result is sorted, so repeated scans of an unchanged tree return
    /// the same order.
    ///
    /// # Errors
    /// Returns `NormalizeError::Discovery` if `root` is missing or is not a
    /// directory.
    pub fn scan_directory(&self, root: &Path, extension: &str) -> Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = self.walk(root, extension)?.collect();
        files.sort();
        Ok(files)
    }

    /// Lazily walk a directory tree for files ending in `extension`
    ///
    /// # Errors
    /// Returns `NormalizeError::Discovery` if `root` is missing or is not a
    /// directory. Entries that cannot be read during the walk are logged and
    /// skipped.
    pub fn walk(&self, root: &Path, extension: &str) -> Result<ScanIter> {
        if !root.exists() {
            return Err(NormalizeError::discovery(root, "directory does not exist"));
        }

        if !root.is_dir() {
            return Err(NormalizeError::discovery(root, "not a directory"));
        }

        let mut walker = WalkDir::new(root).follow_links(self.follow_links);

        if let Some(depth) = self.max_depth {
            walker = walker.max_depth(depth);
        }

        Ok(ScanIter {
            inner: walker.into_iter(),
            suffix: normalize_extension(extension),
        })
    }
}

/// Single-pass iterator over matching files
pub struct ScanIter {
    inner: walkdir::IntoIter,
    suffix: String,
}

impl Iterator for ScanIter {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            match self.inner.next()? {
                Ok(entry) => {
                    // Skip directories
                    if entry.file_type().is_dir() {
                        continue;
                    }

                    if matches_extension(entry.path(), &self.suffix) {
                        return Some(entry.into_path());
                    }
                }
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                }
            }
        }
    }
}
