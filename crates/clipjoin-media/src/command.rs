//! FFmpeg command builder and runner.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::debug;

use crate::error::{MediaError, MediaResult};
use crate::filters::format_seconds;
use crate::progress::{is_progress_line, parse_progress_line, FfmpegProgress};

/// Number of diagnostic stderr lines kept for error reports.
const STDERR_TAIL_LINES: usize = 40;

/// Builder for FFmpeg commands.
#[derive(Debug, Clone, PartialEq)]
pub struct FfmpegCommand {
    /// Input file path
    input: PathBuf,
    /// Output file path
    output: PathBuf,
    /// Input arguments (before -i)
    input_args: Vec<String>,
    /// Output arguments (after -i)
    output_args: Vec<String>,
    /// Expected output duration, for progress reporting
    expected_duration: Option<f64>,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            input_args: Vec::new(),
            output_args: Vec::new(),
            expected_duration: None,
        }
    }

    /// Add input arguments (before -i).
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.input_args.push(arg.into());
        self
    }

    /// Add output arguments (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Force the input demuxer (e.g. `concat`).
    pub fn input_format(self, format: impl Into<String>) -> Self {
        self.input_arg("-f").input_arg(format)
    }

    /// Trim the output to `[start, end)` on the input timeline.
    ///
    /// Seeking happens after decoding so that filters see source timestamps.
    pub fn trim(mut self, start: f64, end: f64) -> Self {
        self.expected_duration = Some(end - start);
        self.output_arg("-ss")
            .output_arg(format_seconds(start))
            .output_arg("-to")
            .output_arg(format_seconds(end))
    }

    /// Set video filter.
    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-vf").output_arg(filter)
    }

    /// Copy streams without re-encoding.
    pub fn codec_copy(self) -> Self {
        self.output_arg("-c").output_arg("copy")
    }

    /// Drop audio streams.
    pub fn no_audio(self) -> Self {
        self.output_arg("-an")
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn expected_duration(&self) -> Option<f64> {
        self.expected_duration
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        // Overwrite outputs
        args.push("-y".to_string());

        args.push("-v".to_string());
        args.push("error".to_string());

        // Progress output to stderr
        args.push("-progress".to_string());
        args.push("pipe:2".to_string());

        args.extend(self.input_args.clone());

        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());

        args.extend(self.output_args.clone());

        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Exit status and diagnostics of one external tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutcome {
    /// Whether the process exited successfully
    pub success: bool,
    /// Exit code (None if killed by a signal)
    pub exit_code: Option<i32>,
    /// Trailing non-progress stderr output
    pub stderr: String,
}

impl ToolOutcome {
    /// A successful run with no diagnostics.
    pub fn succeeded() -> Self {
        Self {
            success: true,
            exit_code: Some(0),
            stderr: String::new(),
        }
    }

    /// A failed run.
    pub fn failed(exit_code: Option<i32>, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Turn a failed outcome into an error, labelled with `operation`.
    pub fn check(self, operation: &str) -> MediaResult<()> {
        if self.success {
            return Ok(());
        }

        let message = match self.exit_code {
            Some(code) => format!("{} exited with status {}", operation, code),
            None => format!("{} was terminated by a signal", operation),
        };
        let stderr = (!self.stderr.is_empty()).then_some(self.stderr);

        Err(MediaError::ffmpeg_failed(message, stderr, self.exit_code))
    }
}

/// Executes FFmpeg commands.
///
/// Implemented by [`FfmpegRunner`]; tests substitute scripted tools.
#[async_trait]
pub trait MediaTool: Send + Sync {
    /// Run a command to completion and report how it exited.
    async fn execute(&self, cmd: &FfmpegCommand) -> MediaResult<ToolOutcome>;
}

/// Runner for FFmpeg commands with progress tracking.
#[derive(Debug, Clone)]
pub struct FfmpegRunner {
    /// Program name or path of the ffmpeg binary
    program: String,
}

impl Default for FfmpegRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegRunner {
    /// Create a runner using `ffmpeg` from PATH.
    pub fn new() -> Self {
        Self {
            program: "ffmpeg".to_string(),
        }
    }

    /// Use a specific ffmpeg binary.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Run an FFmpeg command with progress callback.
    pub async fn run_with_progress<F>(
        &self,
        cmd: &FfmpegCommand,
        progress_callback: F,
    ) -> MediaResult<ToolOutcome>
    where
        F: Fn(FfmpegProgress) + Send + 'static,
    {
        let program = check_ffmpeg(&self.program)?;

        let args = cmd.build_args();
        debug!("Running FFmpeg: {} {}", program.display(), args.join(" "));

        let mut child = Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| MediaError::internal("ffmpeg stderr not captured"))?;
        let mut reader = BufReader::new(stderr).lines();

        // Progress and diagnostics share stderr; split them apart
        let stderr_handle = tokio::spawn(async move {
            let mut current_progress = FfmpegProgress::default();
            let mut tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);

            while let Ok(Some(line)) = reader.next_line().await {
                if is_progress_line(&line) {
                    if let Some(progress) = parse_progress_line(&line, &mut current_progress) {
                        progress_callback(progress);
                    }
                } else if !line.trim().is_empty() {
                    if tail.len() == STDERR_TAIL_LINES {
                        tail.pop_front();
                    }
                    tail.push_back(line);
                }
            }

            Vec::from(tail).join("\n")
        });

        let status = child.wait().await?;
        let stderr = stderr_handle.await.unwrap_or_default();

        Ok(ToolOutcome {
            success: status.success(),
            exit_code: status.code(),
            stderr,
        })
    }
}

#[async_trait]
impl MediaTool for FfmpegRunner {
    async fn execute(&self, cmd: &FfmpegCommand) -> MediaResult<ToolOutcome> {
        let total_ms = cmd.expected_duration().map(|secs| (secs * 1000.0) as i64);
        let output = cmd.output().display().to_string();

        self.run_with_progress(cmd, move |progress| match total_ms {
            Some(total_ms) => debug!(
                output = %output,
                percent = progress.percentage(total_ms),
                eta_secs = ?progress.eta_seconds(total_ms),
                "FFmpeg progress"
            ),
            None => debug!(
                output = %output,
                out_time = %progress.out_time,
                speed = progress.speed,
                "FFmpeg progress"
            ),
        })
        .await
    }
}

/// Locate the ffmpeg binary.
pub fn check_ffmpeg(program: &str) -> MediaResult<PathBuf> {
    which::which(program).map_err(|_| MediaError::FfmpegNotFound(program.to_string()))
}
