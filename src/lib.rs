#![deny(missing_docs)]

//! Core library for the Paper Digest service.

/// Axum router and REST handlers.
pub mod api;
/// arXiv catalog client and Atom feed decoding.
pub mod catalog;
/// Environment-backed configuration loading.
pub mod config;
/// PDF text extraction behind a pluggable trait.
pub mod extract;
/// Cached document downloads.
pub mod fetcher;
/// Tracing setup and log routing.
pub mod logging;
/// Digest run metrics helpers.
pub mod metrics;
/// Digest pipeline orchestration and categorization.
pub mod pipeline;
/// Digest file rendering and atomic persistence.
pub mod sink;
/// Summarization client abstraction and the Ollama adapter.
pub mod summarization;
