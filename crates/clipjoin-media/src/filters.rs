//! FFmpeg video filter definitions.

use clipjoin_models::ClipSpec;

/// Render seconds the way FFmpeg time options expect them (`5`, `1.5`).
pub fn format_seconds(secs: f64) -> String {
    format!("{}", secs)
}

/// Build the fade-in/fade-out filter for a clip.
///
/// Fade times are on the source timeline: fade-in starts at `start`,
/// fade-out starts at `end - fade`. Both last `fade` seconds.
pub fn fade_filter(clip: &ClipSpec) -> String {
    format!(
        "fade=in:st={}:d={},fade=out:st={}:d={}",
        format_seconds(clip.start),
        format_seconds(clip.fade),
        format_seconds(clip.fade_out_start()),
        format_seconds(clip.fade),
    )
}
