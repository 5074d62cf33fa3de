//! Job document models for clipjoin.
//!
//! This crate provides Serde-serializable types for:
//! - The job document read from stdin (`UUID` + `files`)
//! - Clip specifications and the fade window policy
//! - Job identifiers and lifecycle states

pub mod clip;
pub mod error;
pub mod job;

// Re-export common types
pub use clip::{ClipSpec, FadePolicy};
pub use error::{ModelError, ModelResult};
pub use job::{Job, JobDocument, JobId, JobState};
