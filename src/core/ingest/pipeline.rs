//! Ingestion coordination.
//!
//! Drives one document end to end: filename parse, table-of-contents
//! extraction, page inference, per-section extract/split/repair/embed,
//! and a single batched insert into the vector store. A batch run walks
//! a directory of PDFs and survives fatal failures of individual
//! documents.
//!
//! Failure handling follows three tiers. Filename parse, page
//! inference, artifact-directory I/O and the final insert abort the
//! document. Extraction and embedding failures skip the section.
//! Chunks at or above the hard storage limit are dropped one by one.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use walkdir::WalkDir;

use crate::core::clients::{Embedder, PageLocator, SectionExtractor};
use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::ingest::expansion::ChunkExpander;
use crate::core::ingest::repair::OversizeRepair;
use crate::core::ingest::resolver::SectionResolver;
use crate::core::ingest::splitter::{char_len, TextSplitter};
use crate::core::storage::ChunkStore;
use crate::core::types::{
    ChunkRecord, DocumentId, DocumentReport, PageRange, ResolvedSection, RunSummary, SectionMap,
};

/// Coordinates the full ingestion flow for report documents
pub struct IngestPipeline {
    extractor: Arc<dyn SectionExtractor>,
    locator: Arc<dyn PageLocator>,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn ChunkStore>,
    expander: ChunkExpander,
    splitter: TextSplitter,
    repair: OversizeRepair,
    resolver: SectionResolver,
    config: Config,
}

impl IngestPipeline {
    /// Assemble a pipeline from its collaborators and configuration.
    pub fn new(
        extractor: Arc<dyn SectionExtractor>,
        locator: Arc<dyn PageLocator>,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn ChunkStore>,
        expander: ChunkExpander,
        config: Config,
    ) -> Self {
        let splitter = TextSplitter::new(config.chunking.target_size, config.chunking.overlap);
        let repair = OversizeRepair::new(
            config.chunking.safety_max,
            config.chunking.window_overlap,
        );
        let resolver = SectionResolver::new(config.sections.page_offset);

        Self {
            extractor,
            locator,
            embedder,
            store,
            expander,
            splitter,
            repair,
            resolver,
            config,
        }
    }

    /// Ingest every `.pdf` in a directory.
    ///
    /// Documents are processed sequentially; a fatal error in one is
    /// logged and the run moves on to the next.
    pub async fn ingest_directory(&self, dir: &Path) -> Result<RunSummary> {
        let start = Instant::now();

        self.store.ensure_collection().await?;

        let mut pdf_paths: Vec<_> = WalkDir::new(dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry.file_type().is_file()
                    && entry
                        .path()
                        .extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
            })
            .map(|entry| entry.into_path())
            .collect();
        pdf_paths.sort();

        tracing::info!("Found {} report files in {:?}", pdf_paths.len(), dir);

        let mut summary = RunSummary::default();

        for path in &pdf_paths {
            match self.ingest_document(path).await {
                Ok((report, chunks)) => {
                    summary.absorb(&report, &chunks);
                }
                Err(e) => {
                    tracing::error!("Abandoning {:?}: {}", path, e);
                    summary.documents_failed += 1;
                }
            }
        }

        tracing::info!(
            "Run complete: {} documents processed, {} failed, {} chunks stored in {:?}",
            summary.documents_processed,
            summary.documents_failed,
            summary.chunks_stored,
            start.elapsed()
        );
        log_summary_sets(&summary);

        Ok(summary)
    }

    /// Ingest a single report document.
    pub async fn ingest_document(&self, path: &Path) -> Result<(DocumentReport, Vec<ChunkRecord>)> {
        let file_stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        tracing::info!("Ingesting {}", file_stem);

        let id = DocumentId::from_file_stem(&file_stem)?;
        let pdf = std::fs::read(path)?;
        let lang = &self.config.sections.language;

        // The table of contents lives in the leading pages.
        let contents_range = PageRange {
            start: 0,
            end: Some(self.config.sections.contents_pages.saturating_sub(1)),
        };
        let contents_md = self
            .extractor
            .extract(&pdf, &file_stem, lang, contents_range)
            .await?
            .unwrap_or_default();

        let section_map = self.locator.locate_sections(&contents_md).await?;
        self.write_inference_artifact(&file_stem, &section_map);

        let resolved = self.resolver.resolve(&section_map);

        let mut report = DocumentReport {
            file_stem: file_stem.clone(),
            sections_resolved: resolved.len(),
            sections_skipped: section_map.len() - resolved.len(),
            ..Default::default()
        };

        let mut all_chunks = Vec::new();
        for section in &resolved {
            match self
                .ingest_section(&pdf, &file_stem, lang, &id, section, &mut report)
                .await
            {
                Ok(chunks) => all_chunks.extend(chunks),
                Err(e) if e.is_section_recoverable() => {
                    tracing::warn!("Skipping section '{}': {}", section.name, e);
                    report.sections_skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        report.chunks_stored = self.store.insert_chunks(&all_chunks).await?;

        tracing::info!(
            "{}: {} chunks stored, {} dropped, {} repaired, {} sections skipped",
            file_stem,
            report.chunks_stored,
            report.chunks_dropped,
            report.chunks_repaired,
            report.sections_skipped
        );

        Ok((report, all_chunks))
    }

    /// Extract, split, repair, expand and embed one section.
    async fn ingest_section(
        &self,
        pdf: &[u8],
        file_stem: &str,
        lang: &str,
        id: &DocumentId,
        section: &ResolvedSection,
        report: &mut DocumentReport,
    ) -> Result<Vec<ChunkRecord>> {
        let Some(markdown) = self
            .extractor
            .extract(pdf, file_stem, lang, section.pages)
            .await?
        else {
            tracing::warn!("Section '{}' yielded no text", section.name);
            report.sections_skipped += 1;
            return Ok(Vec::new());
        };

        let chunks = self.splitter.split(&markdown);
        tracing::info!("Section '{}': {} chunks", section.name, chunks.len());

        let (chunks, repair_report) = self.repair.enforce(chunks);
        report.chunks_repaired += repair_report.repaired;

        if chunks.is_empty() {
            return Ok(Vec::new());
        }

        // Expanded text feeds the embedding; the original text is what
        // gets persisted.
        let embed_texts = self.expander.expand(&chunks).await;
        let batch = self.embedder.embed_documents(&embed_texts).await?;
        tracing::info!(
            "Section '{}': {} embeddings",
            section.name,
            batch.vectors.len()
        );

        let created_at = chrono::Utc::now().to_rfc3339();
        let mut records = Vec::with_capacity(chunks.len());

        for (chunk_text, embedding) in chunks.into_iter().zip(batch.vectors) {
            let chunk_length = char_len(&chunk_text);
            if chunk_length >= self.config.chunking.hard_max {
                tracing::warn!(
                    "Dropping {}-char chunk in '{}': exceeds storage limit",
                    chunk_length,
                    section.name
                );
                report.chunks_dropped += 1;
                continue;
            }

            records.push(ChunkRecord {
                session_name: section.name.clone(),
                company: id.company.clone(),
                year: id.year.to_string(),
                chunk_text,
                chunk_index: records.len(),
                chunk_length,
                embedding,
                created_at: created_at.clone(),
            });
        }

        Ok(records)
    }

    /// Persist the raw inference result next to the other outputs.
    ///
    /// Failure to write the artifact is logged but never aborts the
    /// document; it is a debugging aid, not pipeline state.
    fn write_inference_artifact(&self, file_stem: &str, map: &SectionMap) {
        let dir = self.config.storage.output_dir.join(file_stem);
        let write = || -> Result<()> {
            std::fs::create_dir_all(&dir)?;
            let json = serde_json::to_string_pretty(map)?;
            std::fs::write(dir.join("content_results.json"), json)?;
            Ok(())
        };

        if let Err(e) = write() {
            tracing::warn!("Failed to write inference artifact for {}: {}", file_stem, e);
        }
    }
}

fn log_summary_sets(summary: &RunSummary) {
    let join = |set: &std::collections::BTreeSet<String>| {
        set.iter().cloned().collect::<Vec<_>>().join(", ")
    };
    tracing::info!("Companies: {}", join(&summary.companies));
    tracing::info!("Years: {}", join(&summary.years));
    tracing::info!("Sessions: {}", join(&summary.sessions));
}
