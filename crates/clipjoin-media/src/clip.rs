//! Per-clip trim and fade.

use std::path::{Path, PathBuf};
use tracing::info;

use clipjoin_models::ClipSpec;

use crate::command::{FfmpegCommand, MediaTool};
use crate::error::MediaResult;
use crate::filters::fade_filter;

/// Suffix shared by all per-clip outputs.
pub const INTERMEDIATE_SUFFIX: &str = ".intermediate.mp4";

/// File name of the intermediate produced for the clip at `index`.
pub fn intermediate_name(index: usize) -> String {
    format!("{}{}", index, INTERMEDIATE_SUFFIX)
}

/// Build the trim + fade command for one clip.
///
/// Equivalent to
/// `ffmpeg -y -i <src> -vf <fades> -ss <start> -to <end> -an <output>`.
pub fn build_trim_fade_command(clip: &ClipSpec, output: impl AsRef<Path>) -> FfmpegCommand {
    FfmpegCommand::new(&clip.name, output)
        .video_filter(fade_filter(clip))
        .trim(clip.start, clip.end)
        .no_audio()
}

/// Trim a clip to `[start, end)`, apply its fades and drop audio.
///
/// Returns the output path once the tool reports success.
pub async fn trim_and_fade<T>(tool: &T, clip: &ClipSpec, output: impl AsRef<Path>) -> MediaResult<PathBuf>
where
    T: MediaTool + ?Sized,
{
    let output = output.as_ref();

    info!(
        "Trimming clip: {} -> {} ({}s..{}s, fade {}s)",
        clip.name,
        output.display(),
        clip.start,
        clip.end,
        clip.fade
    );

    let cmd = build_trim_fade_command(clip, output);
    tool.execute(&cmd).await?.check("ffmpeg trim")?;

    Ok(output.to_path_buf())
}
