//! Clip job worker.
//!
//! This crate provides:
//! - Path resolution of job clips under a source root
//! - The sequential job processor (preflight, trim + fade, concat, marker)
//! - Environment configuration and structured job logging

pub mod config;
pub mod error;
pub mod logging;
pub mod marker;
pub mod processor;
pub mod resolver;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use logging::JobLogger;
pub use marker::{is_done, write_done_marker, DONE_MARKER};
pub use processor::{JobOutput, JobProcessor};
pub use resolver::resolve_paths;
