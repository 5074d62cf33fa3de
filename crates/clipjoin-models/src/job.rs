//! Job definitions and the job document loader.

use schemars::schema::RootSchema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::str::FromStr;

use crate::clip::ClipSpec;
use crate::error::{ModelError, ModelResult};

/// Identifier of a job; doubles as the name of its output directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Parse a job id, ensuring it is usable as a single directory name.
    pub fn parse(s: impl Into<String>) -> ModelResult<Self> {
        let s = s.into();

        if s.is_empty() {
            return Err(ModelError::invalid_job_id(s, "must not be empty"));
        }
        if s == "." || s == ".." {
            return Err(ModelError::invalid_job_id(s, "must not be a relative directory"));
        }
        if s.contains(['/', '\\']) {
            return Err(ModelError::invalid_job_id(s, "must not contain path separators"));
        }
        if s.contains('\0') {
            return Err(ModelError::invalid_job_id(s, "must not contain NUL"));
        }

        Ok(Self(s))
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for JobId {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

/// Job lifecycle. There is no failure state: any error aborts the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "index")]
pub enum JobState {
    /// Job was loaded from its document
    Created,
    /// Clip names were rewritten under the source root
    PathsResolved,
    /// Every source file was found on disk
    SourcesVerified,
    /// Clip at this index is being trimmed and faded
    ProcessingClip(usize),
    /// Intermediates are being joined
    Concatenating,
    /// Completion marker written
    Done,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Created => f.write_str("created"),
            JobState::PathsResolved => f.write_str("paths_resolved"),
            JobState::SourcesVerified => f.write_str("sources_verified"),
            JobState::ProcessingClip(i) => write!(f, "processing_clip[{}]", i),
            JobState::Concatenating => f.write_str("concatenating"),
            JobState::Done => f.write_str("done"),
        }
    }
}

/// Wire format of the job document.
///
/// ```json
/// {
///     "UUID": "00-333-322-OTI-NA-NE",
///     "files": [
///         {"name": "a.mp4", "start": 0, "end": 10, "fade": 2}
///     ]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct JobDocument {
    /// Job identifier, used as the output directory name
    #[serde(rename = "UUID")]
    pub uuid: String,

    /// Clips in output order
    pub files: Vec<ClipSpec>,
}

/// A job: an ordered list of clips producing one concatenated video.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: JobId,
    pub clips: Vec<ClipSpec>,
}

impl Job {
    /// Create a job from parts.
    pub fn new(id: JobId, clips: Vec<ClipSpec>) -> Self {
        Self { id, clips }
    }

    /// Load a job document from a reader (typically stdin).
    pub fn from_reader<R: Read>(reader: R) -> ModelResult<Self> {
        let document: JobDocument = serde_json::from_reader(reader)?;
        Self::try_from(document)
    }

    /// Load a job document from bytes.
    pub fn from_slice(bytes: &[u8]) -> ModelResult<Self> {
        let document: JobDocument = serde_json::from_slice(bytes)?;
        Self::try_from(document)
    }

    /// JSON schema of the accepted job document.
    pub fn json_schema() -> RootSchema {
        schemars::schema_for!(JobDocument)
    }

    /// Number of clips in the job.
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

impl TryFrom<JobDocument> for Job {
    type Error = ModelError;

    fn try_from(document: JobDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: JobId::parse(document.uuid)?,
            clips: document.files,
        })
    }
}

impl FromStr for Job {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_slice(s.as_bytes())
    }
}
