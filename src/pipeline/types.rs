//! Core data types and error definitions for the digest pipeline.

use crate::catalog::CatalogError;
use crate::extract::ExtractError;
use crate::fetcher::FetchError;
use crate::pipeline::categorize::Category;
use crate::sink::SinkError;
use crate::summarization::SummarizationClientError;
use serde::Serialize;
use thiserror::Error;

/// A digest entry produced for a single paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DigestRecord {
    /// Normalized paper title.
    pub title: String,
    /// Keyword-derived category label.
    pub category: Category,
    /// Model-generated abstractive summary, kept to a single line.
    pub summary: String,
}

/// Per-paper failure that drops the paper from the digest without aborting the run.
#[derive(Debug, Error)]
pub enum SkipReason {
    /// The PDF could not be downloaded or cached.
    #[error("download failed: {0}")]
    Download(#[from] FetchError),
    /// The PDF bytes could not be parsed into text.
    #[error("text extraction failed: {0}")]
    Extraction(#[from] ExtractError),
    /// The document parsed but produced no usable text.
    #[error("document has no extractable text")]
    EmptyText,
    /// The summarization provider failed for this paper.
    #[error("summarization failed: {0}")]
    Summarization(#[from] SummarizationClientError),
}

impl SkipReason {
    /// Pipeline stage where the failure occurred, for logging.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Download(_) => "download",
            Self::Extraction(_) | Self::EmptyText => "extract",
            Self::Summarization(_) => "summarize",
        }
    }
}

/// Errors that abort an entire digest run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The requested paper count falls outside the accepted bounds.
    #[error("Requested count {requested} is outside 1..={max}")]
    InvalidCount {
        /// Count supplied by the caller.
        requested: usize,
        /// Upper bound accepted by the service.
        max: usize,
    },
    /// The catalog could not be queried, so no digest can be produced.
    #[error("Catalog query failed: {0}")]
    Catalog(#[from] CatalogError),
    /// The digest file could not be written.
    #[error("Failed to persist digest: {0}")]
    Sink(#[from] SinkError),
}

/// Summary of a completed run produced by [`crate::pipeline::PipelineService::run_digest`].
#[derive(Debug, Clone)]
pub struct DigestOutcome {
    /// Records written to the digest file, newest paper first.
    pub records: Vec<DigestRecord>,
    /// Papers the catalog returned for this run.
    pub fetched: usize,
    /// Papers dropped because a per-paper stage failed.
    pub skipped: usize,
}
