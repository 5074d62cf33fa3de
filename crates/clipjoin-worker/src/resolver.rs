//! Rewrites clip names into paths under the source root.

use std::path::{Component, Path};

use clipjoin_models::Job;

use crate::error::{WorkerError, WorkerResult};

/// Prefix every clip name in `job` with `source_root`.
///
/// Leading separators are stripped and names with `..` components are
/// rejected, so every resolved path stays under the root. Existence is not
/// checked here.
pub fn resolve_paths(mut job: Job, source_root: impl AsRef<Path>) -> WorkerResult<Job> {
    let source_root = source_root.as_ref();

    for clip in &mut job.clips {
        let name = clip.name.trim_start_matches(['/', '\\']);
        if Path::new(name)
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(WorkerError::UnsafeClipName(clip.name.clone()));
        }
        clip.name = source_root.join(name).to_string_lossy().to_string();
    }

    Ok(job)
}
