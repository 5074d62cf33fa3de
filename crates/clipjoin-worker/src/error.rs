//! Worker error types.

use std::path::PathBuf;
use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Job document error: {0}")]
    Model(#[from] clipjoin_models::ModelError),

    #[error("Missing source files: {}", format_paths(.0))]
    MissingSources(Vec<PathBuf>),

    #[error("Source {} lies inside output directory {}", .path.display(), .output_dir.display())]
    SourceInOutput { path: PathBuf, output_dir: PathBuf },

    #[error("Clip name {0:?} must not contain '..'")]
    UnsafeClipName(String),

    #[error("Media error: {0}")]
    Media(#[from] clipjoin_media::MediaError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Diagnostic output of a failed ffmpeg run, if that is what failed.
    pub fn tool_stderr(&self) -> Option<&str> {
        match self {
            WorkerError::Media(clipjoin_media::MediaError::FfmpegFailed { stderr, .. }) => {
                stderr.as_deref()
            }
            _ => None,
        }
    }
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
