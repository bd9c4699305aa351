//! External FFmpeg process runner

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FfmpegError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("FFmpeg failed ({status}): {stderr}")]
    Failed { status: ExitStatus, stderr: String },
}

/// Handle to an FFmpeg binary
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    path: PathBuf,
}

impl Default for Ffmpeg {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl Ffmpeg {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `ffmpeg -i <input> <args> -y <output>`
    ///
    /// A partially written output is removed when FFmpeg fails.
    pub async fn transcode<S: AsRef<OsStr>>(
        &self,
        input: &Path,
        args: &[S],
        output: &Path,
    ) -> Result<(), FfmpegError> {
        let mut cmd = Command::new(&self.path);
        cmd.arg("-i")
            .arg(input)
            .args(args)
            .arg("-y") // Overwrite output file
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!("Running {} on {}", self.path.display(), input.display());
        let result = cmd.output().await?;

        if !result.status.success() {
            let _ = tokio::fs::remove_file(output).await;
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(FfmpegError::Failed {
                status: result.status,
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(())
    }
}
