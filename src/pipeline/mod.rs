//! Digest pipeline: catalog query, per-paper processing, and digest persistence.

pub mod categorize;
mod service;
pub mod types;

pub use categorize::{Category, categorize};
pub use service::{DigestApi, PipelineService};
pub use types::{DigestOutcome, DigestRecord, PipelineError, SkipReason};
