use async_trait::async_trait;
use thiserror::Error;

/// Errors raised while turning document bytes into text.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The bytes could not be parsed as a document.
    #[error("Failed to parse document: {0}")]
    Parse(String),
    /// The blocking extraction task was cancelled or panicked.
    #[error("Extraction task failed: {0}")]
    Task(String),
}

/// Text recovered from a document, page markers collapsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText {
    /// Concatenated page text in original page order.
    pub text: String,
    /// Number of pages that contributed any text.
    pub pages: usize,
}

impl ExtractedText {
    /// True when the document produced no usable text.
    pub fn is_empty(&self) -> bool {
        self.pages == 0
    }

    /// Assemble extraction output from raw parser text.
    ///
    /// The parser separates pages with form feeds. A document whose pages are
    /// all blank normalizes to the empty value, so `pages == 0` always implies
    /// an empty `text`.
    pub(crate) fn from_raw(text: String) -> Self {
        let pages = text
            .split('\x0C')
            .filter(|page| !page.trim().is_empty())
            .count();
        if pages == 0 {
            return Self::default();
        }
        Self { text, pages }
    }
}

/// Interface implemented by document text extractors.
#[async_trait]
pub trait TextExtractor {
    /// Recover the full text of the supplied document bytes.
    async fn extract(&self, bytes: Vec<u8>) -> Result<ExtractedText, ExtractError>;
}

/// PDF extractor backed by the `pdf-extract` parser.
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    /// Construct a new PDF extractor instance.
    pub const fn new() -> Self {
        Self
    }
}

impl Default for PdfTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract(&self, bytes: Vec<u8>) -> Result<ExtractedText, ExtractError> {
        // The parser is CPU-bound and occasionally panics on malformed files;
        // run it on the blocking pool so neither stalls the runtime.
        let text = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&bytes).map_err(|err| err.to_string())
        })
        .await
        .map_err(|err| ExtractError::Task(err.to_string()))?
        .map_err(ExtractError::Parse)?;

        let extracted = ExtractedText::from_raw(text);
        tracing::debug!(
            pages = extracted.pages,
            chars = extracted.text.len(),
            "Extracted document text"
        );
        Ok(extracted)
    }
}

/// Build a text extractor suitable for the current configuration.
pub fn get_text_extractor() -> Box<dyn TextExtractor + Send + Sync> {
    Box::new(PdfTextExtractor::new())
}
