//! Chunk expansion before embedding.
//!
//! Optionally enriches each chunk with extracted keywords and generated
//! QA pairs so the embedding captures vocabulary a retrieval query is
//! likely to use. The expanded text exists only for embedding; the
//! original chunk text is what gets persisted.
//!
//! One annotation task is spawned per chunk; handles are joined in
//! input order so output i always belongs to chunk i regardless of
//! completion order. A failed annotation leaves that chunk unexpanded
//! and never aborts the section.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::core::clients::{strip_json_fence, ChunkAnnotator, CompletionClient};
use crate::core::config::ExpansionConfig;
use crate::core::error::{IngestError, Result};
use crate::core::prompts::{render, KEYWORD_PROMPT, QA_GENERATION_PROMPT};

/// Annotator backed by the chat-completion endpoint
#[derive(Debug, Clone)]
pub struct CompletionAnnotator {
    completion: CompletionClient,
}

#[derive(Deserialize)]
struct KeywordReply {
    keywords: String,
}

#[derive(Deserialize)]
struct QaReply {
    qa_session: Vec<String>,
}

impl CompletionAnnotator {
    /// Create an annotator over an existing completion client.
    pub fn new(completion: CompletionClient) -> Self {
        Self { completion }
    }
}

#[async_trait]
impl ChunkAnnotator for CompletionAnnotator {
    async fn keywords(&self, chunk: &str) -> Result<String> {
        let prompt = render(KEYWORD_PROMPT, "chunk_text", chunk);
        let reply = self.completion.complete(&prompt).await?;

        let parsed: KeywordReply = serde_json::from_str(strip_json_fence(&reply))
            .map_err(|e| IngestError::Completion(format!("Unparseable keyword reply: {e}")))?;

        Ok(parsed.keywords)
    }

    async fn qa_pairs(&self, chunk: &str) -> Result<Vec<String>> {
        let prompt = render(QA_GENERATION_PROMPT, "chunk_text", chunk);
        let reply = self.completion.complete(&prompt).await?;

        let parsed: QaReply = serde_json::from_str(strip_json_fence(&reply))
            .map_err(|e| IngestError::Completion(format!("Unparseable QA reply: {e}")))?;

        Ok(parsed.qa_session)
    }
}

/// Expands chunks with keywords and QA pairs before embedding
pub struct ChunkExpander {
    annotator: Arc<dyn ChunkAnnotator>,
    config: ExpansionConfig,
}

impl ChunkExpander {
    /// Create an expander with the given annotator and feature flags.
    pub fn new(annotator: Arc<dyn ChunkAnnotator>, config: ExpansionConfig) -> Self {
        Self { annotator, config }
    }

    /// Produce the embedding-time text for each chunk.
    ///
    /// Output has exactly the input length and order. Chunks whose
    /// annotations fail keep their original text.
    pub async fn expand(&self, chunks: &[String]) -> Vec<String> {
        if !self.config.enabled || chunks.is_empty() {
            return chunks.to_vec();
        }

        let handles: Vec<_> = chunks
            .iter()
            .map(|chunk| {
                let annotator = Arc::clone(&self.annotator);
                let chunk = chunk.clone();
                let want_keywords = self.config.keywords;
                let want_qa = self.config.qa;

                tokio::spawn(async move {
                    expand_one(annotator.as_ref(), &chunk, want_keywords, want_qa).await
                })
            })
            .collect();

        let mut expanded = Vec::with_capacity(chunks.len());
        for (idx, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(text) => expanded.push(text),
                Err(e) => {
                    tracing::warn!("Expansion task for chunk {} panicked: {}", idx, e);
                    expanded.push(chunks[idx].clone());
                }
            }
        }

        expanded
    }
}

/// Expand a single chunk, falling back to the original on any failure.
async fn expand_one(
    annotator: &dyn ChunkAnnotator,
    chunk: &str,
    want_keywords: bool,
    want_qa: bool,
) -> String {
    let mut expanded = chunk.to_string();

    if want_keywords {
        match annotator.keywords(chunk).await {
            Ok(keywords) => {
                expanded.push_str("\n\n keywords: \n");
                expanded.push_str(&keywords);
            }
            Err(e) => tracing::warn!("Keyword expansion failed: {}", e),
        }
    }

    if want_qa {
        match annotator.qa_pairs(chunk).await {
            Ok(pairs) => {
                expanded.push_str("\n\n qa session: \n");
                expanded.push_str(&pairs.join("\n"));
            }
            Err(e) => tracing::warn!("QA expansion failed: {}", e),
        }
    }

    expanded
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeAnnotator {
        fail_keyword_for: Option<usize>,
        calls: AtomicUsize,
    }

    impl FakeAnnotator {
        fn new() -> Self {
            Self {
                fail_keyword_for: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ChunkAnnotator for FakeAnnotator {
        async fn keywords(&self, chunk: &str) -> Result<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_keyword_for == Some(call) {
                return Err(IngestError::Completion("down".to_string()));
            }
            Ok(format!("kw({})", &chunk[..chunk.len().min(5)]))
        }

        async fn qa_pairs(&self, chunk: &str) -> Result<Vec<String>> {
            Ok(vec![format!("Q: about {}? A: yes.", &chunk[..chunk.len().min(5)])])
        }
    }

    fn config(enabled: bool) -> ExpansionConfig {
        ExpansionConfig {
            enabled,
            keywords: true,
            qa: true,
        }
    }

    #[tokio::test]
    async fn test_disabled_expansion_is_identity() {
        let expander = ChunkExpander::new(Arc::new(FakeAnnotator::new()), config(false));
        let chunks = vec!["alpha".to_string(), "beta".to_string()];

        assert_eq!(expander.expand(&chunks).await, chunks);
    }

    #[tokio::test]
    async fn test_expansion_preserves_order_and_length() {
        let expander = ChunkExpander::new(Arc::new(FakeAnnotator::new()), config(true));
        let chunks: Vec<String> = (0..8).map(|i| format!("chunk-{i} body")).collect();

        let expanded = expander.expand(&chunks).await;

        assert_eq!(expanded.len(), chunks.len());
        for (original, exp) in chunks.iter().zip(&expanded) {
            // Expanded text always starts with the original chunk
            assert!(exp.starts_with(original.as_str()));
            assert!(exp.contains("keywords:"));
            assert!(exp.contains("qa session:"));
        }
    }

    #[tokio::test]
    async fn test_failed_annotation_keeps_original_text() {
        let annotator = FakeAnnotator {
            fail_keyword_for: Some(0),
            calls: AtomicUsize::new(0),
        };
        let expander = ChunkExpander::new(
            Arc::new(annotator),
            ExpansionConfig {
                enabled: true,
                keywords: true,
                qa: false,
            },
        );
        let chunks = vec!["only chunk".to_string()];

        let expanded = expander.expand(&chunks).await;

        assert_eq!(expanded, vec!["only chunk".to_string()]);
    }

    #[tokio::test]
    async fn test_keyword_reply_parsing() {
        let parsed: KeywordReply =
            serde_json::from_str(r#"{"keywords": "revenue, margin, outlook"}"#).unwrap();
        assert_eq!(parsed.keywords, "revenue, margin, outlook");
    }
}
