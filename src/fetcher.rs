use crate::catalog::Paper;
use crate::config::get_config;
use reqwest::Client;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while materializing a paper's PDF in the cache.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure while downloading.
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// The document host answered with a non-success status.
    #[error("Download failed with status {status}")]
    DownloadFailed {
        /// Status code returned by the document host.
        status: reqwest::StatusCode,
    },
    /// The cache directory or file could not be read or written.
    #[error("Cache I/O failed for {path}: {source}")]
    Cache {
        /// Cache path involved in the failure.
        path: PathBuf,
        /// Underlying filesystem error.
        source: std::io::Error,
    },
}

/// A document materialized in the cache.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// Cache location of the PDF.
    pub path: PathBuf,
    /// Raw PDF bytes.
    pub bytes: Vec<u8>,
}

/// Cache-aware downloader for paper PDFs.
pub struct DocumentFetcher {
    pub(crate) client: Client,
    pub(crate) cache_dir: PathBuf,
}

impl DocumentFetcher {
    /// Construct a new fetcher using configuration derived from the environment.
    pub fn new() -> Result<Self, FetchError> {
        let config = get_config();
        let client = Client::builder().user_agent("paper-digest/0.1").build()?;

        let cache_dir = config.document_cache_dir.clone();
        std::fs::create_dir_all(&cache_dir).map_err(|source| FetchError::Cache {
            path: cache_dir.clone(),
            source,
        })?;
        tracing::debug!(cache = %cache_dir.display(), "Initialized document cache");

        Ok(Self { client, cache_dir })
    }

    /// Fetch a paper's PDF, downloading only when the cache misses.
    ///
    /// The cache key is derived from the paper title, so repeated runs never
    /// re-download documents that already landed on disk.
    pub async fn fetch(&self, paper: &Paper) -> Result<FetchedDocument, FetchError> {
        let path = self.cache_dir.join(derive_filename(&paper.title));

        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                tracing::debug!(title = %paper.title, path = %path.display(), "Cache hit; skipping download");
                return Ok(FetchedDocument { path, bytes });
            }
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => return Err(FetchError::Cache { path, source }),
        }

        let response = self.client.get(&paper.pdf_url).send().await?;
        if !response.status().is_success() {
            let error = FetchError::DownloadFailed {
                status: response.status(),
            };
            tracing::warn!(title = %paper.title, url = %paper.pdf_url, error = %error, "Document download failed");
            return Err(error);
        }

        let bytes = response.bytes().await?.to_vec();
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|source| FetchError::Cache {
                path: path.clone(),
                source,
            })?;
        tracing::debug!(title = %paper.title, bytes = bytes.len(), path = %path.display(), "Document downloaded");
        Ok(FetchedDocument { path, bytes })
    }
}

/// Derive the cache filename for a title: path-hostile characters become
/// underscores and a `.pdf` suffix is appended when missing.
pub(crate) fn derive_filename(title: &str) -> String {
    let mut name = title.replace([':', '/'], "_");
    if !name.ends_with(".pdf") {
        name.push_str(".pdf");
    }
    name
}
