//! Structured logging for clip jobs.
//!
//! Every event carries the job id; state transitions also carry the clip
//! index while clips are being trimmed.

use tracing::{error, info, warn, Span};

use clipjoin_models::{JobId, JobState};

/// Logger bound to one job run.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: JobId,
}

impl JobLogger {
    pub fn new(job_id: &JobId) -> Self {
        Self {
            job_id: job_id.clone(),
        }
    }

    pub fn log_start(&self, clip_count: usize) {
        info!(job_id = %self.job_id, clips = clip_count, "Job started");
    }

    /// Log a state machine transition.
    pub fn log_state(&self, state: JobState) {
        match state {
            JobState::ProcessingClip(index) => {
                info!(job_id = %self.job_id, state = %state, clip = index, "Job state: {}", state)
            }
            _ => info!(job_id = %self.job_id, state = %state, "Job state: {}", state),
        }
    }

    pub fn log_warning(&self, message: &str) {
        warn!(job_id = %self.job_id, "Job warning: {}", message);
    }

    pub fn log_error(&self, message: &str) {
        error!(job_id = %self.job_id, "Job failed: {}", message);
    }

    /// Log the diagnostic tail of a failed ffmpeg run, one event per line.
    pub fn log_tool_output(&self, stderr: &str) {
        for line in stderr.lines() {
            error!(job_id = %self.job_id, "ffmpeg: {}", line);
        }
    }

    pub fn log_completion(&self, result: &std::path::Path) {
        info!(job_id = %self.job_id, result = %result.display(), "Job completed");
    }

    /// Span wrapping the whole run.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("clip_job", job_id = %self.job_id)
    }
}
