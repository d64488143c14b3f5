//! Unified service container for finrag
//!
//! Wires the HTTP clients, expansion and storage into a ready pipeline.

use std::sync::Arc;

use crate::core::clients::{
    CompletionClient, HttpEmbedder, HttpPageLocator, HttpSectionExtractor,
};
use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::ingest::{ChunkExpander, CompletionAnnotator, IngestPipeline};
use crate::core::storage::MilvusChunkStore;

/// Unified services container
#[derive(Clone)]
pub struct Services {
    /// Fully wired ingestion pipeline
    pub pipeline: Arc<IngestPipeline>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl Services {
    /// Create services from configuration.
    ///
    /// All HTTP clients share the configured timeouts; the completion
    /// client is shared between page inference and chunk expansion.
    pub fn new(config: Config) -> Result<Self> {
        let completion = CompletionClient::new(&config.services)?;

        let extractor = Arc::new(HttpSectionExtractor::new(&config.services)?);
        let locator = Arc::new(HttpPageLocator::new(completion.clone()));
        let embedder = Arc::new(HttpEmbedder::new(&config.services)?);
        let store = Arc::new(MilvusChunkStore::new(&config.storage)?);

        let expander = ChunkExpander::new(
            Arc::new(CompletionAnnotator::new(completion)),
            config.expansion.clone(),
        );

        let pipeline = Arc::new(IngestPipeline::new(
            extractor,
            locator,
            embedder,
            store,
            expander,
            config.clone(),
        ));

        Ok(Self {
            pipeline,
            config: Arc::new(config),
        })
    }
}
