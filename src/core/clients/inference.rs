//! Page-range inference over the completion endpoint.
//!
//! Feeds the table-of-contents markdown to the content-searching prompt
//! and parses the model's JSON reply into a section map. A failure at
//! any point here is fatal for the document: without section boundaries
//! nothing downstream can run.

use async_trait::async_trait;

use crate::core::clients::{strip_json_fence, CompletionClient, PageLocator};
use crate::core::error::{IngestError, Result};
use crate::core::prompts::{render, CONTENT_SEARCHING_PROMPT};
use crate::core::types::SectionMap;

/// Page locator backed by a chat-completion call
#[derive(Debug, Clone)]
pub struct HttpPageLocator {
    completion: CompletionClient,
}

impl HttpPageLocator {
    /// Create a locator over an existing completion client.
    pub fn new(completion: CompletionClient) -> Self {
        Self { completion }
    }
}

#[async_trait]
impl PageLocator for HttpPageLocator {
    async fn locate_sections(&self, contents_markdown: &str) -> Result<SectionMap> {
        let prompt = render(CONTENT_SEARCHING_PROMPT, "input_markdown", contents_markdown);

        let reply = self
            .completion
            .complete(&prompt)
            .await
            .map_err(|e| IngestError::PageInference(e.to_string()))?;

        let map: SectionMap = serde_json::from_str(strip_json_fence(&reply))
            .map_err(|e| IngestError::PageInference(format!("Unparseable section map: {e}")))?;

        if map.is_empty() {
            return Err(IngestError::PageInference(
                "Model returned an empty section map".to_string(),
            ));
        }

        tracing::info!("Inferred page ranges for {} sections", map.len());
        Ok(map)
    }
}
