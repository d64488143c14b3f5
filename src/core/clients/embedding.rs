//! Embedding service client.
//!
//! One POST per batch. The document endpoint echoes the submitted texts
//! back alongside the vectors; the echoed list is what downstream code
//! pairs with the vectors, so the client validates both lists have the
//! same length as the request before returning.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::clients::{build_http_client, Embedder};
use crate::core::config::ServicesConfig;
use crate::core::error::{IngestError, Result};

/// Embedding vectors for a batch of chunks, positionally paired with
/// the texts the service echoed back.
#[derive(Debug, Clone)]
pub struct EmbeddingBatch {
    /// Chunk texts as echoed by the service, in request order
    pub texts: Vec<String>,

    /// One vector per text, same order
    pub vectors: Vec<Vec<f32>>,
}

/// HTTP client for the embedding service
#[derive(Debug, Clone)]
pub struct HttpEmbedder {
    client: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: EmbeddingInput<'a>,
    #[serde(rename = "type")]
    kind: &'a str,
}

#[derive(Serialize)]
#[serde(untagged)]
enum EmbeddingInput<'a> {
    Batch(&'a [String]),
    Single(&'a str),
}

#[derive(Deserialize)]
struct DocumentResponse {
    text: Vec<String>,
    vector: Vec<Vec<f32>>,
}

#[derive(Deserialize)]
struct QueryResponse {
    vector: Vec<f32>,
}

impl HttpEmbedder {
    /// Create an embedder from service configuration.
    pub fn new(config: &ServicesConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config)?,
            url: config.embedding_url.clone(),
        })
    }

    async fn post(&self, request: &EmbeddingRequest<'_>) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| IngestError::Embedding(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IngestError::Embedding(format!(
                "Endpoint returned {status}: {body}"
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<EmbeddingBatch> {
        if texts.is_empty() {
            return Ok(EmbeddingBatch {
                texts: Vec::new(),
                vectors: Vec::new(),
            });
        }

        tracing::debug!("Embedding batch of {} chunks", texts.len());

        let request = EmbeddingRequest {
            input: EmbeddingInput::Batch(texts),
            kind: "documents",
        };

        let parsed: DocumentResponse = self
            .post(&request)
            .await?
            .json()
            .await
            .map_err(|e| IngestError::Embedding(format!("Malformed response: {e}")))?;

        // Positional pairing downstream depends on both lists matching
        // the request length exactly.
        if parsed.vector.len() != texts.len() || parsed.text.len() != texts.len() {
            return Err(IngestError::EmbeddingCountMismatch {
                requested: texts.len(),
                received: parsed.vector.len(),
            });
        }

        Ok(EmbeddingBatch {
            texts: parsed.text,
            vectors: parsed.vector,
        })
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbeddingRequest {
            input: EmbeddingInput::Single(text),
            kind: "query",
        };

        let parsed: QueryResponse = self
            .post(&request)
            .await?
            .json()
            .await
            .map_err(|e| IngestError::Embedding(format!("Malformed response: {e}")))?;

        Ok(parsed.vector)
    }
}
