//! Core error types for datanorm

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias using `NormalizeError`
pub type Result<T> = std::result::Result<T, NormalizeError>;

/// Core error type for datanorm
///
/// `Discovery` and `Config` abort a run before any file is processed. Every
/// other variant is scoped to a single file and is recovered by the batch
/// orchestrator.
#[derive(Error, Debug)]
pub enum NormalizeError {
    /// Source root missing or unreadable
    #[error("Discovery error at {}: {reason}", path.display())]
    Discovery {
        /// Root that could not be scanned
        path: PathBuf,
        /// Underlying cause
        reason: String,
    },

    /// A source file could not be parsed as audio
    #[error("Decode error for {}: {reason}", path.display())]
    Decode {
        /// Offending source file
        path: PathBuf,
        /// Underlying cause
        reason: String,
    },

    /// Resample, pad, or chunk step failed
    #[error("Transform error: {0}")]
    Transform(String),

    /// Destination could not be written
    #[error("Encode error for {}: {reason}", path.display())]
    Encode {
        /// Destination path
        path: PathBuf,
        /// Underlying cause
        reason: String,
    },

    /// Invalid run configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Coarse classification used to tally per-file failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`NormalizeError::Discovery`]
    Discovery,
    /// See [`NormalizeError::Decode`]
    Decode,
    /// See [`NormalizeError::Transform`]
    Transform,
    /// See [`NormalizeError::Encode`]; I/O failures are counted here too
    Encode,
    /// See [`NormalizeError::Config`]
    Config,
}

impl NormalizeError {
    /// Create a discovery error
    pub fn discovery(path: impl AsRef<Path>, reason: impl ToString) -> Self {
        Self::Discovery {
            path: path.as_ref().to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// Create a decode error
    pub fn decode(path: impl AsRef<Path>, reason: impl ToString) -> Self {
        Self::Decode {
            path: path.as_ref().to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// Create a transform error
    pub fn transform(msg: impl Into<String>) -> Self {
        Self::Transform(msg.into())
    }

    /// Create an encode error
    pub fn encode(path: impl AsRef<Path>, reason: impl ToString) -> Self {
        Self::Encode {
            path: path.as_ref().to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Discovery { .. } => ErrorKind::Discovery,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::Transform(_) => ErrorKind::Transform,
            Self::Encode { .. } | Self::Io(_) => ErrorKind::Encode,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Whether this error must abort the whole run
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind(), ErrorKind::Discovery | ErrorKind::Config)
    }
}
