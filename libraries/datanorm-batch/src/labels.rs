//! Label tables mapping dataset file names to class labels
//!
//! A label table is a space-separated text file with a header row, e.g.
//!
//! ```text
//! filename label
//! spk1/a.flac real
//! spk2/b.flac fake
//! ```
//!
//! File names are relative to the dataset root.

use datanorm_core::{NormalizeError, Result};
use std::path::Path;
use tracing::warn;

/// One row of a label table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledFile {
    pub filename: String,
    pub label: String,
}

/// Read a label table, picking the two named columns
///
/// Rows missing either column are skipped with a warning.
///
/// # Errors
/// Returns `NormalizeError::Discovery` if the table cannot be read or parsed
/// and `NormalizeError::Config` if a named column is not in the header.
pub fn read_labels(
    path: &Path,
    filename_column: &str,
    label_column: &str,
) -> Result<Vec<LabeledFile>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b' ')
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|e| NormalizeError::discovery(path, e))?;

    let headers = reader
        .headers()
        .map_err(|e| NormalizeError::discovery(path, e))?
        .clone();
    let column = |name: &str| {
        headers.iter().position(|header| header == name).ok_or_else(|| {
            NormalizeError::config(format!(
                "labels file {} has no '{}' column",
                path.display(),
                name
            ))
        })
    };
    let filename_index = column(filename_column)?;
    let label_index = column(label_column)?;

    let mut labels = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| NormalizeError::discovery(path, e))?;
        match (record.get(filename_index), record.get(label_index)) {
            (Some(filename), Some(label)) if !filename.is_empty() && !label.is_empty() => {
                labels.push(LabeledFile {
                    filename: filename.to_string(),
                    label: label.to_string(),
                });
            }
            _ => warn!(
                "Skipping incomplete row {} in {}",
                record.position().map_or(0, |p| p.line()),
                path.display()
            ),
        }
    }

    Ok(labels)
}
