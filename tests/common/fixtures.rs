//! In-process fakes for the pipeline's external collaborators.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use finrag::core::clients::{
    ChunkAnnotator, Embedder, EmbeddingBatch, PageLocator, SectionExtractor,
};
use finrag::core::config::Config;
use finrag::core::error::{IngestError, Result};
use finrag::core::ingest::{ChunkExpander, IngestPipeline};
use finrag::core::storage::ChunkStore;
use finrag::core::types::{ChunkRecord, PageRange, SectionBounds, SectionMap};

/// Extractor scripted by physical start page.
///
/// Start page 0 serves the table-of-contents markdown; other start
/// pages serve per-section markdown. `None` simulates an empty range.
pub struct ScriptedExtractor {
    pub contents: String,
    pub by_start_page: BTreeMap<usize, Option<String>>,
}

#[async_trait]
impl SectionExtractor for ScriptedExtractor {
    async fn extract(
        &self,
        _pdf: &[u8],
        _file_stem: &str,
        _lang: &str,
        pages: PageRange,
    ) -> Result<Option<String>> {
        if pages.start == 0 {
            return Ok(Some(self.contents.clone()));
        }
        match self.by_start_page.get(&pages.start) {
            Some(markdown) => Ok(markdown.clone()),
            None => Err(IngestError::Extraction(format!(
                "no script for start page {}",
                pages.start
            ))),
        }
    }
}

/// Locator returning a preset section map, or a scripted failure
pub struct ScriptedLocator {
    pub result: std::result::Result<SectionMap, String>,
}

#[async_trait]
impl PageLocator for ScriptedLocator {
    async fn locate_sections(&self, _contents_markdown: &str) -> Result<SectionMap> {
        match &self.result {
            Ok(map) => Ok(map.clone()),
            Err(msg) => Err(IngestError::PageInference(msg.clone())),
        }
    }
}

/// Embedder producing deterministic vectors, with scripted failures.
///
/// If any submitted text contains `mismatch_marker`, the batch reports
/// a count mismatch; `transport_marker` simulates a transport failure.
#[derive(Default)]
pub struct FakeEmbedder {
    pub mismatch_marker: Option<String>,
    pub transport_marker: Option<String>,
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<EmbeddingBatch> {
        if let Some(marker) = &self.transport_marker {
            if texts.iter().any(|t| t.contains(marker.as_str())) {
                return Err(IngestError::Embedding("connection reset".to_string()));
            }
        }
        if let Some(marker) = &self.mismatch_marker {
            if texts.iter().any(|t| t.contains(marker.as_str())) {
                return Err(IngestError::EmbeddingCountMismatch {
                    requested: texts.len(),
                    received: texts.len().saturating_sub(1),
                });
            }
        }

        Ok(EmbeddingBatch {
            texts: texts.to_vec(),
            vectors: texts.iter().map(|_| vec![0.25_f32; 4]).collect(),
        })
    }

    async fn embed_query(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![0.25_f32; 4])
    }
}

/// Chunk store accumulating records in memory
#[derive(Default)]
pub struct MemoryStore {
    pub records: Mutex<Vec<ChunkRecord>>,
    pub fail_insert: bool,
}

#[async_trait]
impl ChunkStore for MemoryStore {
    async fn ensure_collection(&self) -> Result<()> {
        Ok(())
    }

    async fn insert_chunks(&self, chunks: &[ChunkRecord]) -> Result<usize> {
        if self.fail_insert {
            return Err(IngestError::Storage("insert rejected".to_string()));
        }
        let mut records = self.records.lock().unwrap();
        records.extend_from_slice(chunks);
        Ok(chunks.len())
    }
}

/// Annotator that never gets called (expansion disabled in tests)
struct NoopAnnotator;

#[async_trait]
impl ChunkAnnotator for NoopAnnotator {
    async fn keywords(&self, _chunk: &str) -> Result<String> {
        Ok(String::new())
    }

    async fn qa_pairs(&self, _chunk: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

/// Section map with two placed sections and one the model failed on.
///
/// With the default page offset of 2 the corrected starts are 2
/// (OVERVIEW) and 28 (GOVERNANCE, open-ended).
pub fn sample_section_map() -> SectionMap {
    let mut map = SectionMap::new();
    map.insert(
        "OVERVIEW".to_string(),
        SectionBounds {
            start: "4".to_string(),
            end: "10".to_string(),
            sections: vec!["Chairman's Letter".to_string()],
        },
    );
    map.insert(
        "GOVERNANCE".to_string(),
        SectionBounds {
            start: "30".to_string(),
            end: String::new(),
            sections: Vec::new(),
        },
    );
    map.insert(
        "UNPLACED".to_string(),
        SectionBounds::default(),
    );
    map
}

/// Wire a pipeline from fakes with expansion disabled.
pub fn build_pipeline(
    extractor: ScriptedExtractor,
    locator: ScriptedLocator,
    embedder: FakeEmbedder,
    store: Arc<MemoryStore>,
    config: Config,
) -> IngestPipeline {
    let expander = ChunkExpander::new(Arc::new(NoopAnnotator), config.expansion.clone());
    IngestPipeline::new(
        Arc::new(extractor),
        Arc::new(locator),
        Arc::new(embedder),
        store,
        expander,
        config,
    )
}
