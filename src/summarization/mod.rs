//! Abstractions for generating abstractive paper summaries via local providers.
//!
//! The Ollama-backed client mirrors the catalog client by issuing HTTP requests
//! directly to the runtime, always non-streaming. Decoding runs greedily so a
//! digest re-run over the same inputs yields the same summaries.

use crate::config::get_config;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Failures reported while producing a summary.
#[derive(Debug, Error)]
pub enum SummarizationClientError {
    /// Provider was unreachable or the endpoint is missing.
    #[error("Summarizer unreachable: {0}")]
    ProviderUnavailable(String),
    /// Provider rejected the request or the input was unusable.
    #[error("Summary generation failed: {0}")]
    GenerationFailed(String),
    /// Provider reply could not be decoded.
    #[error("Unusable summarizer response: {0}")]
    InvalidResponse(String),
}

/// Inputs for one summary generation call.
#[derive(Debug, Clone)]
pub struct SummarizationRequest {
    /// Model identifier exactly as the provider knows it.
    pub model: String,
    /// Paper text to summarize, already truncated by the pipeline.
    pub text: String,
    /// Lower word bound for the summary.
    pub min_words: usize,
    /// Upper word bound for the summary.
    pub max_words: usize,
}

/// Capability to turn extracted paper text into a short abstract.
#[async_trait]
pub trait SummarizationClient: Send + Sync {
    /// Produce a summary that honors the request's word bounds.
    async fn generate_summary(
        &self,
        request: SummarizationRequest,
    ) -> Result<String, SummarizationClientError>;
}

/// Construct the client for the configured Ollama endpoint.
pub fn get_summarization_client() -> Box<dyn SummarizationClient + Send + Sync> {
    let config = get_config();
    let base_url = config
        .ollama_url
        .clone()
        .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());
    Box::new(OllamaSummarizationClient::new(base_url))
}

struct OllamaSummarizationClient {
    http: Client,
    base_url: String,
}

impl OllamaSummarizationClient {
    fn new(base_url: String) -> Self {
        let http = Client::builder()
            .user_agent("paper-digest/summary")
            .build()
            .expect("Failed to construct reqwest::Client for summarization");
        Self { http, base_url }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

fn build_prompt(request: &SummarizationRequest) -> String {
    format!(
        "You summarize research papers. Write one neutral paragraph of {min} to {max} words \
         covering the problem, the approach, and the findings. Do not invent content that is \
         not in the text.\n\nPaper text:\n{text}",
        min = request.min_words,
        max = request.max_words,
        text = request.text,
    )
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    done: bool,
}

#[async_trait]
impl SummarizationClient for OllamaSummarizationClient {
    async fn generate_summary(
        &self,
        request: SummarizationRequest,
    ) -> Result<String, SummarizationClientError> {
        if request.text.trim().is_empty() {
            return Err(SummarizationClientError::GenerationFailed(
                "refusing to summarize empty text".into(),
            ));
        }

        tracing::debug!(
            model = %request.model,
            input_len = request.text.len(),
            "Generating summary"
        );

        let payload = json!({
            "model": request.model,
            "prompt": build_prompt(&request),
            "stream": false,
            "options": {
                // Greedy decoding keeps re-runs byte-for-byte reproducible.
                "temperature": 0.0,
            }
        });

        let response = self
            .http
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                SummarizationClientError::ProviderUnavailable(format!(
                    "could not reach Ollama at {}: {error}",
                    self.base_url
                ))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SummarizationClientError::ProviderUnavailable(format!(
                "generate endpoint missing at {}",
                self.endpoint()
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizationClientError::GenerationFailed(format!(
                "generation request returned {status}: {body}"
            )));
        }

        let body: OllamaResponse = response.json().await.map_err(|error| {
            SummarizationClientError::InvalidResponse(format!(
                "could not decode Ollama reply: {error}"
            ))
        })?;

        if !body.done {
            return Err(SummarizationClientError::InvalidResponse(
                "Ollama reply incomplete; streaming responses are not supported".into(),
            ));
        }

        Ok(body.response.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};

    fn request(text: &str) -> SummarizationRequest {
        SummarizationRequest {
            model: "llama".into(),
            text: text.into(),
            min_words: 100,
            max_words: 250,
        }
    }

    #[test]
    fn prompt_carries_word_bounds_and_text() {
        let prompt = build_prompt(&request("An inverted pendulum study."));
        assert!(prompt.contains("100 to 250 words"));
        assert!(prompt.contains("An inverted pendulum study."));
    }

    #[tokio::test]
    async fn ollama_client_handles_successful_response() {
        let server = MockServer::start_async().await;
        let client = OllamaSummarizationClient {
            http: Client::builder()
                .user_agent("paper-digest-test")
                .build()
                .expect("client"),
            base_url: server.base_url(),
        };

        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(200).json_body(json!({
                    "response": "  Summary text ",
                    "done": true
                }));
            })
            .await;

        let summary = client
            .generate_summary(request("Robots that learn."))
            .await
            .expect("summary");

        mock.assert_async().await;
        assert_eq!(summary, "Summary text");
    }

    #[tokio::test]
    async fn ollama_client_handles_error_status() {
        let server = MockServer::start_async().await;
        let client = OllamaSummarizationClient {
            http: Client::builder()
                .user_agent("paper-digest-test")
                .build()
                .expect("client"),
            base_url: server.base_url(),
        };

        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(500).body("boom");
            })
            .await;

        let error = client
            .generate_summary(request("Robots that learn."))
            .await
            .expect_err("error response");

        assert!(
            matches!(error, SummarizationClientError::GenerationFailed(message) if message.contains("500"))
        );
    }

    #[tokio::test]
    async fn ollama_client_rejects_incomplete_responses() {
        let server = MockServer::start_async().await;
        let client = OllamaSummarizationClient {
            http: Client::builder()
                .user_agent("paper-digest-test")
                .build()
                .expect("client"),
            base_url: server.base_url(),
        };

        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(200).json_body(json!({
                    "response": "partial",
                    "done": false
                }));
            })
            .await;

        let error = client
            .generate_summary(request("Robots that learn."))
            .await
            .expect_err("incomplete response");
        assert!(matches!(
            error,
            SummarizationClientError::InvalidResponse(_)
        ));
    }

    #[tokio::test]
    async fn empty_text_is_rejected_before_any_request() {
        let client = OllamaSummarizationClient::new("http://127.0.0.1:1".into());
        let error = client
            .generate_summary(request("   "))
            .await
            .expect_err("empty input");
        assert!(matches!(
            error,
            SummarizationClientError::GenerationFailed(_)
        ));
    }
}
