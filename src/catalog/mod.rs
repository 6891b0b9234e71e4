//! Catalog access for recent paper metadata.
//!
//! The catalog speaks the arXiv query API: a single `GET /api/query` endpoint
//! returning an Atom feed. This module owns the HTTP client, the typed errors
//! for catalog failures, and the [`Paper`] records handed to the pipeline.

mod feed;

use crate::config::get_config;
use reqwest::Client;
use thiserror::Error;
use time::OffsetDateTime;

/// Errors surfaced while querying the paper catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The configured catalog URL could not be parsed.
    #[error("Invalid catalog URL: {0}")]
    InvalidUrl(String),
    /// Transport-level failure while talking to the catalog.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The catalog answered with a non-success status.
    #[error("Unexpected catalog response ({status}): {body}")]
    UnexpectedStatus {
        /// Status code returned by the catalog.
        status: reqwest::StatusCode,
        /// Raw response body, useful for debugging.
        body: String,
    },
    /// The catalog answered with a body that is not a valid Atom feed.
    #[error("Malformed catalog feed: {0}")]
    InvalidFeed(#[from] quick_xml::DeError),
}

/// A catalog entry selected for digesting.
#[derive(Debug, Clone)]
pub struct Paper {
    /// Stable catalog identifier (the Atom entry id).
    pub id: String,
    /// Title with internal whitespace collapsed to single spaces.
    pub title: String,
    /// Absolute URL of the paper's PDF rendition.
    pub pdf_url: String,
    /// Submission timestamp, when the entry carried a parsable one.
    pub published: Option<OffsetDateTime>,
}

/// Lightweight HTTP client for catalog queries.
pub struct CatalogClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
}

impl CatalogClient {
    /// Build a client pointed at the configured catalog base URL.
    pub fn new() -> Result<Self, CatalogError> {
        let config = get_config();
        let client = Client::builder().user_agent("paper-digest/0.1").build()?;

        let base_url =
            normalize_base_url(&config.catalog_base_url).map_err(CatalogError::InvalidUrl)?;
        tracing::debug!(url = %base_url, "Initialized catalog HTTP client");

        Ok(Self { client, base_url })
    }

    /// Query the catalog for the most recently submitted papers in a topic.
    ///
    /// Results are ordered newest first and never number more than
    /// `max_results`, even when the feed over-delivers. Entries without a PDF
    /// rendition are dropped, so the returned list may also be shorter.
    pub async fn recent_papers(
        &self,
        topic: &str,
        max_results: usize,
    ) -> Result<Vec<Paper>, CatalogError> {
        let url = format!("{}/api/query", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .query(&[
                ("search_query", format!("cat:{topic}")),
                ("start", "0".to_string()),
                ("max_results", max_results.to_string()),
                ("sortBy", "submittedDate".to_string()),
                ("sortOrder", "descending".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = CatalogError::UnexpectedStatus { status, body };
            tracing::error!(topic, error = %error, "Catalog query failed");
            return Err(error);
        }

        let body = response.text().await?;
        let parsed: feed::AtomFeed = quick_xml::de::from_str(&body)?;
        let mut papers = feed::into_papers(parsed);
        // The feed's length is as untrusted as its ordering; keep the newest
        // `max_results` no matter how many entries came back.
        if papers.len() > max_results {
            tracing::warn!(
                topic,
                entries = papers.len(),
                max_results,
                "Catalog returned more entries than requested; truncating"
            );
            papers.truncate(max_results);
        }
        tracing::debug!(topic, papers = papers.len(), "Catalog query returned entries");
        Ok(papers)
    }
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, MockServer};

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query: search_query=cat:cs.RO</title>
  <entry>
    <id>http://arxiv.org/abs/2501.00001v1</id>
    <published>2025-01-01T10:00:00Z</published>
    <title>Older Paper</title>
    <link href="http://arxiv.org/abs/2501.00001v1" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/2501.00001v1" rel="related" type="application/pdf"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2501.00002v1</id>
    <published>2025-01-02T10:00:00Z</published>
    <title>Newer Paper</title>
    <link title="pdf" href="http://arxiv.org/pdf/2501.00002v1" rel="related" type="application/pdf"/>
  </entry>
</feed>"#;

    fn test_client(base_url: String) -> CatalogClient {
        CatalogClient {
            client: Client::builder()
                .user_agent("paper-digest-test")
                .build()
                .expect("client"),
            base_url,
        }
    }

    #[tokio::test]
    async fn recent_papers_emits_expected_query() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/query")
                    .query_param("search_query", "cat:cs.RO")
                    .query_param("start", "0")
                    .query_param("max_results", "2")
                    .query_param("sortBy", "submittedDate")
                    .query_param("sortOrder", "descending");
                then.status(200)
                    .header("content-type", "application/atom+xml; charset=UTF-8")
                    .body(FEED);
            })
            .await;

        let client = test_client(server.base_url());
        let papers = client.recent_papers("cs.RO", 2).await.expect("query");

        mock.assert_async().await;
        assert_eq!(papers.len(), 2);
        assert_eq!(papers[0].title, "Newer Paper");
        assert_eq!(papers[1].title, "Older Paper");
        assert_eq!(papers[0].pdf_url, "http://arxiv.org/pdf/2501.00002v1");
    }

    #[tokio::test]
    async fn recent_papers_caps_an_over_delivering_feed() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/query")
                    .query_param("max_results", "1");
                then.status(200)
                    .header("content-type", "application/atom+xml; charset=UTF-8")
                    .body(FEED);
            })
            .await;

        let client = test_client(server.base_url());
        let papers = client.recent_papers("cs.RO", 1).await.expect("query");

        assert_eq!(papers.len(), 1);
        assert_eq!(papers[0].title, "Newer Paper");
    }

    #[tokio::test]
    async fn recent_papers_surfaces_catalog_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/query");
                then.status(503).body("catalog overloaded");
            })
            .await;

        let client = test_client(server.base_url());
        let error = client
            .recent_papers("cs.RO", 3)
            .await
            .expect_err("status error");

        match error {
            CatalogError::UnexpectedStatus { status, body } => {
                assert_eq!(status.as_u16(), 503);
                assert!(body.contains("overloaded"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn recent_papers_rejects_malformed_feed() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/query");
                then.status(200).body("<feed><entry>");
            })
            .await;

        let client = test_client(server.base_url());
        let error = client
            .recent_papers("cs.RO", 3)
            .await
            .expect_err("parse error");
        assert!(matches!(error, CatalogError::InvalidFeed(_)));
    }
}
