//! Lossless concatenation through the concat demuxer.
//!
//! The manifest lists exactly the intermediates handed in by the caller, in
//! the order given. The job directory is never scanned.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::command::{FfmpegCommand, MediaTool};
use crate::error::{MediaError, MediaResult};

/// Manifest file name inside the job directory.
pub const MANIFEST_FILE_NAME: &str = "list.txt";

/// Concatenated output file name inside the job directory.
pub const RESULT_FILE_NAME: &str = "result.mp4";

/// Ordered list of files for the concat demuxer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcatManifest {
    entries: Vec<String>,
}

impl ConcatManifest {
    /// Build a manifest for files that will be listed from `dir`.
    ///
    /// Files inside `dir` are written relative to it; the demuxer resolves
    /// relative entries against the manifest's own location.
    pub fn from_files(dir: impl AsRef<Path>, files: &[PathBuf]) -> MediaResult<Self> {
        if files.is_empty() {
            return Err(MediaError::EmptyManifest);
        }

        let dir = dir.as_ref();
        let entries = files
            .iter()
            .map(|file| {
                file.strip_prefix(dir)
                    .unwrap_or(file)
                    .to_string_lossy()
                    .to_string()
            })
            .collect();

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Whether every entry passes the demuxer's safe mode: relative, and every
    /// component made of portable characters without a leading period.
    pub fn is_safe(&self) -> bool {
        self.entries.iter().all(|entry| {
            !entry.starts_with('/')
                && entry.split('/').all(|part| {
                    !part.is_empty()
                        && !part.starts_with('.')
                        && part
                            .chars()
                            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
                })
        })
    }

    /// Render in concat demuxer syntax, one `file '<name>'` line per entry.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|entry| format!("file '{}'\n", entry.replace('\'', r"'\''")))
            .collect()
    }

    /// Write the manifest to `path`, replacing any previous one.
    pub async fn write(&self, path: impl AsRef<Path>) -> MediaResult<()> {
        tokio::fs::write(path, self.render()).await?;
        Ok(())
    }
}

/// Build the concat command: `ffmpeg -y -f concat -i <manifest> -c copy -an <output>`.
pub fn build_concat_command(
    manifest: &ConcatManifest,
    manifest_path: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new(manifest_path, output).input_format("concat");
    if !manifest.is_safe() {
        cmd = cmd.input_arg("-safe").input_arg("0");
    }
    cmd.codec_copy().no_audio()
}

/// Write `list.txt` for `files` into `dir` and join them into `result.mp4`.
///
/// Returns the manifest and result paths.
pub async fn concat_clips<T>(tool: &T, dir: impl AsRef<Path>, files: &[PathBuf]) -> MediaResult<(PathBuf, PathBuf)>
where
    T: MediaTool + ?Sized,
{
    let dir = dir.as_ref();
    let manifest = ConcatManifest::from_files(dir, files)?;
    let manifest_path = dir.join(MANIFEST_FILE_NAME);
    let result_path = dir.join(RESULT_FILE_NAME);

    manifest.write(&manifest_path).await?;
    info!(
        "Concatenating {} clips: {} -> {}",
        manifest.entries().len(),
        manifest_path.display(),
        result_path.display()
    );

    let cmd = build_concat_command(&manifest, &manifest_path, &result_path);
    tool.execute(&cmd).await?.check("ffmpeg concat")?;

    Ok((manifest_path, result_path))
}
