//! HTTP clients for the external services the pipeline depends on.
//!
//! Each external dependency sits behind an async trait so the pipeline
//! can be exercised against in-process fakes. Implementations share a
//! single `reqwest` client with a generous request timeout and a short
//! connect timeout. There is no automatic retry; a failed call surfaces
//! as an error and the caller decides what it invalidates.

pub mod completion;
pub mod embedding;
pub mod extraction;
pub mod inference;

use async_trait::async_trait;

use crate::core::config::ServicesConfig;
use crate::core::error::{IngestError, Result};
use crate::core::types::{PageRange, SectionMap};

pub use completion::CompletionClient;
pub use embedding::{EmbeddingBatch, HttpEmbedder};
pub use extraction::HttpSectionExtractor;
pub use inference::HttpPageLocator;

/// Converts a page range of a PDF into markdown text.
#[async_trait]
pub trait SectionExtractor: Send + Sync {
    /// Extract the given page range as markdown.
    ///
    /// Returns `Ok(None)` when the range yields no text (blank or
    /// image-only pages); that is a skip, not an error.
    async fn extract(
        &self,
        pdf: &[u8],
        file_stem: &str,
        lang: &str,
        pages: PageRange,
    ) -> Result<Option<String>>;
}

/// Infers the printed page range of each top-level report section.
#[async_trait]
pub trait PageLocator: Send + Sync {
    /// Map section names to inferred page boundaries from the
    /// table-of-contents markdown.
    async fn locate_sections(&self, contents_markdown: &str) -> Result<SectionMap>;
}

/// Generates embedding vectors for chunk text.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of document chunks in one request.
    async fn embed_documents(&self, texts: &[String]) -> Result<EmbeddingBatch>;

    /// Embed a single query string.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;
}

/// Enriches chunk text before embedding (keywords, QA pairs).
#[async_trait]
pub trait ChunkAnnotator: Send + Sync {
    /// Extract retrieval keywords for one chunk.
    async fn keywords(&self, chunk: &str) -> Result<String>;

    /// Generate QA pairs answerable from one chunk.
    async fn qa_pairs(&self, chunk: &str) -> Result<Vec<String>>;
}

/// Build the shared HTTP client from service configuration.
pub(crate) fn build_http_client(config: &ServicesConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.request_timeout_sec))
        .connect_timeout(std::time::Duration::from_secs(config.connect_timeout_sec))
        .build()
        .map_err(|e| IngestError::Config(format!("Failed to build HTTP client: {e}")))
}

/// Strip an optional markdown code fence from a model response.
///
/// Completion models often wrap JSON output in ```json fences even when
/// told not to; tolerate both fenced and bare payloads.
pub(crate) fn strip_json_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}
