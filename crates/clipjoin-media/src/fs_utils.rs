//! Filesystem utilities for job output directories.

use std::path::Path;
use tokio::fs;

use crate::error::MediaResult;

/// Make `dir` an empty directory, removing anything a previous run left behind.
///
/// Parent directories are created as needed.
pub async fn reset_directory(dir: impl AsRef<Path>) -> MediaResult<()> {
    let dir = dir.as_ref();

    match fs::remove_dir_all(dir).await {
        Ok(()) => {
            tracing::debug!("Removed previous output: {}", dir.display());
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    fs::create_dir_all(dir).await?;
    Ok(())
}

/// Create `path` as a zero-byte file, truncating it if present.
pub async fn write_empty_file(path: impl AsRef<Path>) -> MediaResult<()> {
    fs::File::create(path.as_ref()).await?;
    Ok(())
}
