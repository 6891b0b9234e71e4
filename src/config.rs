use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;

const DEFAULT_CATALOG_URL: &str = "http://export.arxiv.org";
const DEFAULT_CATALOG_TOPIC: &str = "cs.RO";
const DEFAULT_CATALOG_MAX_RESULTS: usize = 100;
const DEFAULT_DOCUMENT_CACHE_DIR: &str = "documents";
const DEFAULT_OUTPUT_FILE: &str = "arxiv_summary.txt";
const DEFAULT_SUMMARY_INPUT_LIMIT: usize = 5_000;
const DEFAULT_SUMMARY_MIN_WORDS: usize = 100;
const DEFAULT_SUMMARY_MAX_WORDS: usize = 250;

/// Failures raised while reading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is absent.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// An environment variable holds a value that does not parse.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the Paper Digest service.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Base URL of the catalog serving paper metadata and PDFs.
    pub catalog_base_url: String,
    /// Catalog topic (arXiv category) queried for recent papers.
    pub catalog_topic: String,
    /// Upper bound accepted for the per-run paper count.
    pub catalog_max_results: usize,
    /// Directory where downloaded PDFs are cached between runs.
    pub document_cache_dir: PathBuf,
    /// Path of the digest file produced by a run.
    pub output_file: PathBuf,
    /// Model identifier passed to the summarization backend.
    pub summarization_model: String,
    /// Optional override for the Ollama base URL.
    pub ollama_url: Option<String>,
    /// Maximum number of characters of extracted text sent to the summarizer.
    pub summary_input_limit: usize,
    /// Lower word bound requested for generated summaries.
    pub summary_min_words: usize,
    /// Upper word bound requested for generated summaries.
    pub summary_max_words: usize,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

impl Config {
    /// Assemble and validate the configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let catalog_max_results = load_env_optional("CATALOG_MAX_RESULTS")
            .map(|value| {
                value
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("CATALOG_MAX_RESULTS".to_string()))
            })
            .transpose()?
            .unwrap_or(DEFAULT_CATALOG_MAX_RESULTS);
        if catalog_max_results == 0 {
            return Err(ConfigError::InvalidValue("CATALOG_MAX_RESULTS".to_string()));
        }

        let summary_input_limit = load_env_optional("SUMMARY_INPUT_LIMIT")
            .map(|value| {
                value
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("SUMMARY_INPUT_LIMIT".to_string()))
            })
            .transpose()?
            .unwrap_or(DEFAULT_SUMMARY_INPUT_LIMIT);
        if summary_input_limit == 0 {
            return Err(ConfigError::InvalidValue("SUMMARY_INPUT_LIMIT".to_string()));
        }

        let summary_min_words = load_env_optional("SUMMARY_MIN_WORDS")
            .map(|value| {
                value
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("SUMMARY_MIN_WORDS".to_string()))
            })
            .transpose()?
            .unwrap_or(DEFAULT_SUMMARY_MIN_WORDS);
        let summary_max_words = load_env_optional("SUMMARY_MAX_WORDS")
            .map(|value| {
                value
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("SUMMARY_MAX_WORDS".to_string()))
            })
            .transpose()?
            .unwrap_or(DEFAULT_SUMMARY_MAX_WORDS);
        if summary_min_words > summary_max_words {
            // Either variable may be the misconfigured one; name both.
            return Err(ConfigError::InvalidValue(
                "SUMMARY_MIN_WORDS > SUMMARY_MAX_WORDS".to_string(),
            ));
        }

        Ok(Self {
            catalog_base_url: load_env_optional("ARXIV_API_URL")
                .unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string()),
            catalog_topic: load_env_optional("ARXIV_TOPIC")
                .unwrap_or_else(|| DEFAULT_CATALOG_TOPIC.to_string()),
            catalog_max_results,
            document_cache_dir: load_env_optional("DOCUMENT_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DOCUMENT_CACHE_DIR)),
            output_file: load_env_optional("DIGEST_OUTPUT_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE)),
            summarization_model: load_env("SUMMARIZATION_MODEL")?,
            ollama_url: load_env_optional("OLLAMA_URL"),
            summary_input_limit,
            summary_min_words,
            summary_max_words,
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Process-wide configuration, set once during startup.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Fetch the configuration; panics when called before [`init_config`].
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Read the environment (and any `.env` file) and cache the resulting config.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        catalog = %config.catalog_base_url,
        topic = %config.catalog_topic,
        model = %config.summarization_model,
        output = %config.output_file.display(),
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
