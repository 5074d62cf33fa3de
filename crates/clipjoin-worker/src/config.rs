//! Worker configuration.

use std::path::PathBuf;

use clipjoin_models::FadePolicy;

use crate::error::{WorkerError, WorkerResult};

/// Worker configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerConfig {
    /// Directory clip names are resolved against
    pub source_root: PathBuf,
    /// Directory job output directories are created in
    pub output_root: PathBuf,
    /// ffmpeg program name or path
    pub ffmpeg_program: String,
    /// Treatment of fades longer than half a clip
    pub fade_policy: FadePolicy,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("."),
            output_root: PathBuf::from("."),
            ffmpeg_program: "ffmpeg".to_string(),
            fade_policy: FadePolicy::default(),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> WorkerResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> WorkerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let fade_policy = match non_empty("CLIPJOIN_FADE_POLICY") {
            Some(value) => value.parse().map_err(|e| {
                WorkerError::config_error(format!("CLIPJOIN_FADE_POLICY: {}", e))
            })?,
            None => defaults.fade_policy,
        };

        Ok(Self {
            source_root: non_empty("CLIPJOIN_SOURCE_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.source_root),
            output_root: non_empty("CLIPJOIN_OUTPUT_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_root),
            ffmpeg_program: non_empty("CLIPJOIN_FFMPEG").unwrap_or(defaults.ffmpeg_program),
            fade_policy,
        })
    }

    /// Set the source root.
    pub fn with_source_root(mut self, source_root: impl Into<PathBuf>) -> Self {
        self.source_root = source_root.into();
        self
    }

    /// Set the output root.
    pub fn with_output_root(mut self, output_root: impl Into<PathBuf>) -> Self {
        self.output_root = output_root.into();
        self
    }

    /// Set the fade policy.
    pub fn with_fade_policy(mut self, fade_policy: FadePolicy) -> Self {
        self.fade_policy = fade_policy;
        self
    }
}
