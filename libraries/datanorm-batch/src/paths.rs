//! Output path mapping
//!
//! A source file keeps its path relative to the source root, re-rooted at the
//! output root. One output buffer keeps the base file name; several buffers
//! become `{stem}_part_{index}{.ext}` in chunk order.

use datanorm_core::{NormalizeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Container of written outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Keep the source file extension
    #[default]
    Source,

    /// Replace the extension with `.wav`
    Wav,
}

impl OutputFormat {
    /// Configuration name of this format
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Wav => "wav",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = NormalizeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "source" => Ok(Self::Source),
            "wav" => Ok(Self::Wav),
            other => Err(NormalizeError::config(format!(
                "unknown output format '{}' (expected 'source' or 'wav')",
                other
            ))),
        }
    }
}

/// Maps source files to their destinations
#[derive(Debug, Clone)]
pub struct OutputLayout {
    source_root: PathBuf,
    output_root: PathBuf,
    format: OutputFormat,
}

impl OutputLayout {
    /// Create a layout mirroring `source_root` under `output_root`
    pub fn new(
        source_root: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
        format: OutputFormat,
    ) -> Self {
        Self {
            source_root: source_root.into(),
            output_root: output_root.into(),
            format,
        }
    }

    /// Root outputs are written under
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Base (single-output) destination for a source file
    ///
    /// # Errors
    /// Returns `NormalizeError::Encode` when `source` is not under the
    /// source root.
    pub fn output_path(&self, source: &Path) -> Result<PathBuf> {
        let relative = source.strip_prefix(&self.source_root).map_err(|_| {
            NormalizeError::encode(
                source,
                format!("not under source root {}", self.source_root.display()),
            )
        })?;

        let mut destination = self.output_root.join(relative);
        if self.format == OutputFormat::Wav {
            destination.set_extension("wav");
        }
        Ok(destination)
    }

    /// Paths whose existence marks a source as already processed
    ///
    /// The fan-out count is only known after decoding, so both the single
    /// output and the first part are checked.
    pub fn resume_candidates(&self, base: &Path) -> [PathBuf; 2] {
        [base.to_path_buf(), part_path(base, 0)]
    }
}

/// Name of the `index`-th fan-out part of `base`
pub fn part_path(base: &Path, index: usize) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut name = format!("{}_part_{}", stem, index);
    if let Some(ext) = base.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }

    base.with_file_name(name)
}

/// Destinations for `count` output buffers of one source
pub fn output_paths(base: &Path, count: usize) -> Vec<PathBuf> {
    if count == 1 {
        return vec![base.to_path_buf()];
    }
    (0..count).map(|index| part_path(base, index)).collect()
}

/// Earlier outputs of `base` that a fresh set of `count` outputs does not
/// overwrite
///
/// With a single output the `_part_{n}` run starting at 0 is stale; with
/// several, the bare base file and the run of parts from `count` upward are.
/// Parts are probed in order and the scan stops at the first missing index.
pub fn stale_outputs(base: &Path, count: usize) -> Vec<PathBuf> {
    let mut stale = Vec::new();
    if count > 1 && base.exists() {
        stale.push(base.to_path_buf());
    }

    let first_stale_part = if count == 1 { 0 } else { count };
    stale.extend(
        (first_stale_part..)
            .map(|index| part_path(base, index))
            .take_while(|path| path.exists()),
    );
    stale
}

/// Reject an output root equal to or inside the source root
///
/// Outputs written there would be discovered as sources by later runs, or
/// by the same run when discovery is streaming. Roots are compared after
/// resolving symlinks and `..` through their nearest existing ancestor.
///
/// # Errors
/// Returns `NormalizeError::Config` when `output_root` lies under
/// `source_root`.
pub fn ensure_output_outside_source(source_root: &Path, output_root: &Path) -> Result<()> {
    let (Some(source), Some(output)) = (resolve(source_root), resolve(output_root)) else {
        return Ok(());
    };

    if output.starts_with(&source) {
        return Err(NormalizeError::config(format!(
            "output directory {} must not be inside source directory {}",
            output_root.display(),
            source_root.display()
        )));
    }
    Ok(())
}

/// Canonical form of a path that may not exist yet
fn resolve(path: &Path) -> Option<PathBuf> {
    let mut existing = path;
    let mut missing = Vec::new();

    loop {
        if let Ok(canonical) = existing.canonicalize() {
            return Some(
                missing
                    .iter()
                    .rev()
                    .fold(canonical, |resolved, component| resolved.join(component)),
            );
        }

        missing.push(existing.file_name()?.to_os_string());
        existing = match existing.parent()? {
            parent if parent.as_os_str().is_empty() => Path::new("."),
            parent => parent,
        };
    }
}
