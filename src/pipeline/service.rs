//! Pipeline service coordinating catalog queries, document handling, and digest writes.

use crate::{
    catalog::{CatalogClient, Paper},
    config::get_config,
    extract::{TextExtractor, get_text_extractor},
    fetcher::DocumentFetcher,
    metrics::{DigestMetrics, MetricsSnapshot},
    pipeline::{
        categorize::categorize,
        types::{DigestOutcome, DigestRecord, PipelineError, SkipReason},
    },
    sink,
    summarization::{SummarizationClient, SummarizationRequest, get_summarization_client},
};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

/// Coordinates a digest run: catalog query, per-paper fetch, extraction,
/// summarization and categorization, and the final digest write.
///
/// The service owns long-lived handles to the catalog client, document fetcher,
/// text extractor, summarization client, and metrics registry so that both the
/// HTTP surface and the CLI reuse the same components. Construct the service
/// once near process start and share it through an `Arc`.
pub struct PipelineService {
    catalog: CatalogClient,
    fetcher: DocumentFetcher,
    extractor: Box<dyn TextExtractor + Send + Sync>,
    summarizer: Box<dyn SummarizationClient + Send + Sync>,
    output_file: PathBuf,
    metrics: Arc<DigestMetrics>,
}

/// Abstraction over the digest pipeline used by external surfaces (HTTP, CLI).
#[async_trait]
pub trait DigestApi: Send + Sync {
    /// Run one digest pass over the `requested` most recent papers.
    async fn run_digest(&self, requested: usize) -> Result<DigestOutcome, PipelineError>;

    /// Report the counters accumulated across runs so far.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl PipelineService {
    /// Build a new pipeline service, initializing backing clients as needed.
    pub fn new() -> Self {
        let config = get_config();
        let catalog = CatalogClient::new().expect("Failed to construct catalog client");
        let fetcher = DocumentFetcher::new().expect("Failed to prepare document cache");
        tracing::info!(model = %config.summarization_model, "Initializing summarization client");
        let summarizer = get_summarization_client();

        Self {
            catalog,
            fetcher,
            extractor: get_text_extractor(),
            summarizer,
            output_file: config.output_file.clone(),
            metrics: Arc::new(DigestMetrics::new()),
        }
    }

    /// Run one digest pass: query the catalog, carry each paper through the
    /// per-paper stages, and publish the digest file.
    ///
    /// Per-paper failures are logged and skipped; only catalog and digest-file
    /// failures abort the run.
    pub async fn run_digest(&self, requested: usize) -> Result<DigestOutcome, PipelineError> {
        let config = get_config();
        let max = config.catalog_max_results;
        if requested == 0 || requested > max {
            return Err(PipelineError::InvalidCount { requested, max });
        }

        tracing::info!(requested, topic = %config.catalog_topic, "Starting digest run");
        let papers = self
            .catalog
            .recent_papers(&config.catalog_topic, requested)
            .await?;
        let fetched = papers.len();

        let mut records = Vec::with_capacity(fetched);
        let mut skipped = 0usize;
        for paper in &papers {
            match self.process_paper(paper).await {
                Ok(record) => {
                    tracing::info!(title = %paper.title, category = %record.category, "Paper recorded");
                    records.push(record);
                }
                Err(reason) => {
                    skipped += 1;
                    tracing::warn!(title = %paper.title, stage = reason.stage(), error = %reason, "Paper skipped");
                }
            }
        }

        sink::write_records(&records, &self.output_file).await?;
        self.metrics
            .record_run(records.len() as u64, skipped as u64);
        tracing::info!(
            requested,
            fetched,
            recorded = records.len(),
            skipped,
            output = %self.output_file.display(),
            "Digest run complete"
        );

        Ok(DigestOutcome {
            records,
            fetched,
            skipped,
        })
    }

    /// Carry one paper through fetch, extraction, summarization, and categorization.
    async fn process_paper(&self, paper: &Paper) -> Result<DigestRecord, SkipReason> {
        let config = get_config();
        let document = self.fetcher.fetch(paper).await?;
        let extracted = self.extractor.extract(document.bytes).await?;
        if extracted.is_empty() {
            return Err(SkipReason::EmptyText);
        }

        let summary = self
            .summarizer
            .generate_summary(SummarizationRequest {
                model: config.summarization_model.clone(),
                text: truncate_chars(&extracted.text, config.summary_input_limit).to_string(),
                min_words: config.summary_min_words,
                max_words: config.summary_max_words,
            })
            .await?;

        Ok(DigestRecord {
            title: paper.title.clone(),
            category: categorize(&extracted.text),
            // Digest blocks are line-oriented and models occasionally wrap
            // their output, so collapse the summary onto one line.
            summary: summary.split_whitespace().collect::<Vec<_>>().join(" "),
        })
    }

    /// Return the current digest metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl Default for PipelineService {
    fn default() -> Self {
        Self::new()
    }
}

/// Truncate to a character budget without splitting a code point.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

#[async_trait]
impl DigestApi for PipelineService {
    async fn run_digest(&self, requested: usize) -> Result<DigestOutcome, PipelineError> {
        PipelineService::run_digest(self, requested).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        PipelineService::metrics_snapshot(self)
    }
}
