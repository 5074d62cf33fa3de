//! Source file existence checks.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Outcome of checking that every source file exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceReport {
    missing: Vec<PathBuf>,
}

impl SourceReport {
    /// True when every checked path is an existing regular file.
    pub fn all_present(&self) -> bool {
        self.missing.is_empty()
    }

    /// Paths that were not found, in the order they were checked.
    pub fn into_missing(self) -> Vec<PathBuf> {
        self.missing
    }
}

/// Check that every path is an existing regular file.
///
/// All paths are checked so the report names every missing file, not just the first.
pub async fn check_sources<I, P>(paths: I) -> SourceReport
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut report = SourceReport::default();

    for path in paths {
        let path = path.as_ref();
        let is_file = tokio::fs::metadata(path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);

        if is_file {
            info!("Source found: {}", path.display());
        } else {
            warn!("Source not found: {}", path.display());
            report.missing.push(path.to_path_buf());
        }
    }

    report
}
