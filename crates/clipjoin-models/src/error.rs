//! Error types for job models.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while loading or interpreting a job document.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Invalid job document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid job id {id:?}: {reason}")]
    InvalidJobId { id: String, reason: &'static str },

    #[error("Fade of {fade}s does not fit clip {name} ({duration}s long)")]
    FadeWindow {
        name: String,
        fade: f64,
        duration: f64,
    },

    #[error("Unknown fade policy: {0}")]
    UnknownFadePolicy(String),
}

impl ModelError {
    /// Create an invalid job id error.
    pub fn invalid_job_id(id: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidJobId {
            id: id.into(),
            reason,
        }
    }
}
