//! Sequential job processor.
//!
//! Drives a job through `Created → PathsResolved → SourcesVerified →
//! ProcessingClip(i) → Concatenating → Done`. Any error aborts the run and the
//! completion marker is not written.

use std::path::{Path, PathBuf};
use tracing::Instrument;

use clipjoin_media::{
    check_sources, concat_clips, intermediate_name, reset_directory, trim_and_fade, FfmpegRunner,
    MediaError, MediaTool,
};
use clipjoin_models::{ClipSpec, Job, JobId, JobState};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLogger;
use crate::marker::write_done_marker;
use crate::resolver::resolve_paths;

/// Files produced by a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutput {
    pub job_id: JobId,
    /// `<output_root>/<job_id>`
    pub output_dir: PathBuf,
    /// Per-clip intermediates, in clip order
    pub intermediates: Vec<PathBuf>,
    pub manifest: PathBuf,
    pub result: PathBuf,
    pub marker: PathBuf,
}

/// Runs clip jobs against a [`MediaTool`].
pub struct JobProcessor<T: MediaTool> {
    config: WorkerConfig,
    tool: T,
}

impl JobProcessor<FfmpegRunner> {
    /// Create a processor that runs the configured ffmpeg binary.
    pub fn from_config(config: WorkerConfig) -> Self {
        let tool = FfmpegRunner::new().with_program(config.ffmpeg_program.clone());
        Self::new(config, tool)
    }
}

impl<T: MediaTool> JobProcessor<T> {
    pub fn new(config: WorkerConfig, tool: T) -> Self {
        Self { config, tool }
    }

    pub fn tool(&self) -> &T {
        &self.tool
    }

    /// Output directory for a job.
    pub fn output_dir(&self, job_id: &JobId) -> PathBuf {
        self.config.output_root.join(job_id.as_str())
    }

    /// Process a job end to end.
    pub async fn process(&self, job: Job) -> WorkerResult<JobOutput> {
        let logger = JobLogger::new(&job.id);
        let span = logger.create_span();

        async {
            logger.log_start(job.len());

            match self.run(job, &logger).await {
                Ok(output) => {
                    logger.log_completion(&output.result);
                    Ok(output)
                }
                Err(e) => {
                    logger.log_error(&e.to_string());
                    if let Some(stderr) = e.tool_stderr() {
                        logger.log_tool_output(stderr);
                    }
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(&self, job: Job, logger: &JobLogger) -> WorkerResult<JobOutput> {
        logger.log_state(JobState::Created);

        if job.is_empty() {
            return Err(MediaError::EmptyManifest.into());
        }

        let job = resolve_paths(job, &self.config.source_root)?;
        logger.log_state(JobState::PathsResolved);

        let report = check_sources(job.clips.iter().map(|clip| &clip.name)).await;
        if !report.all_present() {
            return Err(WorkerError::MissingSources(report.into_missing()));
        }
        logger.log_state(JobState::SourcesVerified);

        let clips = self.apply_fade_policy(&job.clips, logger)?;

        let output_dir = self.output_dir(&job.id);
        ensure_sources_outside(&output_dir, &clips).await?;
        reset_directory(&output_dir).await?;

        let mut intermediates = Vec::with_capacity(clips.len());
        for (index, clip) in clips.iter().enumerate() {
            logger.log_state(JobState::ProcessingClip(index));
            let output = output_dir.join(intermediate_name(index));
            intermediates.push(trim_and_fade(&self.tool, clip, output).await?);
        }

        logger.log_state(JobState::Concatenating);
        let (manifest, result) = concat_clips(&self.tool, &output_dir, &intermediates).await?;

        let marker = write_done_marker(&output_dir).await?;
        logger.log_state(JobState::Done);

        Ok(JobOutput {
            job_id: job.id,
            output_dir,
            intermediates,
            manifest,
            result,
            marker,
        })
    }

    fn apply_fade_policy(&self, clips: &[ClipSpec], logger: &JobLogger) -> WorkerResult<Vec<ClipSpec>> {
        let policy = self.config.fade_policy;

        clips
            .iter()
            .map(|clip| {
                if clip.fade_exceeds_clip() {
                    logger.log_warning(&format!(
                        "fade {}s exceeds half of {} ({}s), policy {}",
                        clip.fade,
                        clip.name,
                        clip.duration(),
                        policy
                    ));
                }
                clip.with_fade_policy(policy).map_err(WorkerError::from)
            })
            .collect()
    }
}

/// Fail if any source lives inside `output_dir`, which is about to be wiped.
async fn ensure_sources_outside(output_dir: &Path, clips: &[ClipSpec]) -> WorkerResult<()> {
    let output_dir = match tokio::fs::canonicalize(output_dir).await {
        Ok(dir) => dir,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    for clip in clips {
        let path = tokio::fs::canonicalize(&clip.name).await?;
        if path.starts_with(&output_dir) {
            return Err(WorkerError::SourceInOutput {
                path,
                output_dir: output_dir.clone(),
            });
        }
    }

    Ok(())
}
