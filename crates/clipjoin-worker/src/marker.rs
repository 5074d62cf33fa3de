//! Completion marker.

use std::path::{Path, PathBuf};

use clipjoin_media::write_empty_file;

use crate::error::WorkerResult;

/// Name of the sentinel file written once a job finished without fault.
pub const DONE_MARKER: &str = "DONE";

/// Write the empty `DONE` marker into `output_dir`.
pub async fn write_done_marker(output_dir: impl AsRef<Path>) -> WorkerResult<PathBuf> {
    let path = output_dir.as_ref().join(DONE_MARKER);
    write_empty_file(&path).await?;
    Ok(path)
}

/// Whether `output_dir` carries the completion marker.
pub async fn is_done(output_dir: impl AsRef<Path>) -> bool {
    tokio::fs::metadata(output_dir.as_ref().join(DONE_MARKER))
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_marker_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!is_done(dir.path()).await);

        let path = write_done_marker(dir.path()).await.unwrap();

        assert_eq!(path, dir.path().join("DONE"));
        assert!(is_done(dir.path()).await);
        assert_eq!(tokio::fs::metadata(&path).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(write_done_marker(dir.path().join("absent")).await.is_err());
    }
}
