//! FFmpeg CLI wrapper for clip jobs.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - A runner that captures exit status and diagnostics for every invocation
//! - Progress parsing from `-progress pipe:2`
//! - The trim + fade and concat operations used by the worker
//! - Source existence checks and output directory helpers

pub mod clip;
pub mod command;
pub mod concat;
pub mod error;
pub mod filters;
pub mod fs_utils;
pub mod progress;
pub mod sources;

pub use clip::{build_trim_fade_command, intermediate_name, trim_and_fade, INTERMEDIATE_SUFFIX};
pub use command::{check_ffmpeg, FfmpegCommand, FfmpegRunner, MediaTool, ToolOutcome};
pub use concat::{
    build_concat_command, concat_clips, ConcatManifest, MANIFEST_FILE_NAME, RESULT_FILE_NAME,
};
pub use error::{MediaError, MediaResult};
pub use filters::{fade_filter, format_seconds};
pub use fs_utils::{reset_directory, write_empty_file};
pub use progress::FfmpegProgress;
pub use sources::{check_sources, SourceReport};
