//! Clip specifications.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ModelError, ModelResult};

/// One entry of the job document: a source segment to extract and fade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClipSpec {
    /// Source file name; holds the resolved path once the job is resolved
    pub name: String,

    /// Start of the segment in seconds
    pub start: f64,

    /// End of the segment in seconds (exclusive)
    pub end: f64,

    /// Fade-in and fade-out duration in seconds
    pub fade: f64,
}

impl ClipSpec {
    /// Create a new clip spec.
    pub fn new(name: impl Into<String>, start: f64, end: f64, fade: f64) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            fade,
        }
    }

    /// Length of the trimmed segment in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Start of the fade-out, on the source timeline.
    pub fn fade_out_start(&self) -> f64 {
        self.end - self.fade
    }

    /// Whether the fade-in and fade-out windows overlap or exceed the segment.
    pub fn fade_exceeds_clip(&self) -> bool {
        self.fade * 2.0 > self.duration()
    }

    /// Apply a fade policy, returning the clip that should be rendered.
    pub fn with_fade_policy(&self, policy: FadePolicy) -> ModelResult<ClipSpec> {
        if !self.fade_exceeds_clip() {
            return Ok(self.clone());
        }

        match policy {
            FadePolicy::Passthrough => Ok(self.clone()),
            FadePolicy::Clamp => Ok(ClipSpec {
                fade: (self.duration() / 2.0).max(0.0),
                ..self.clone()
            }),
            FadePolicy::Reject => Err(ModelError::FadeWindow {
                name: self.name.clone(),
                fade: self.fade,
                duration: self.duration(),
            }),
        }
    }
}

/// How to treat clips whose fades do not fit (`fade * 2 > end - start`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FadePolicy {
    /// Hand the values to ffmpeg unchanged
    #[default]
    Passthrough,
    /// Shorten the fade to half the segment duration
    Clamp,
    /// Fail the job
    Reject,
}

impl FadePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FadePolicy::Passthrough => "passthrough",
            FadePolicy::Clamp => "clamp",
            FadePolicy::Reject => "reject",
        }
    }
}

impl fmt::Display for FadePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FadePolicy {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "passthrough" | "pass-through" => Ok(FadePolicy::Passthrough),
            "clamp" => Ok(FadePolicy::Clamp),
            "reject" => Ok(FadePolicy::Reject),
            other => Err(ModelError::UnknownFadePolicy(other.to_string())),
        }
    }
}
