//! Core data types for the finrag ingestion service.
//!
//! This module defines the data structures that flow through the
//! pipeline: document identities, inferred section boundaries, resolved
//! page ranges, chunk records, and run statistics.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::core::error::{IngestError, Result};

/// Filename pattern for annual reports: `{company}_{year}.pdf`.
///
/// `company` is any run of characters before the final `_YYYY` group.
static FILENAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<company>.+)_(?P<year>\d{4})\.pdf$").expect("valid regex"));

/// Identity of a report document, parsed from its filename
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentId {
    /// Company name as it appears in the filename
    pub company: String,

    /// Four-digit reporting year
    pub year: u16,
}

impl DocumentId {
    /// Parse a document identity from a file stem (no `.pdf` suffix).
    ///
    /// Fails with [`IngestError::InvalidFilename`], which is fatal for
    /// the document but not for the batch run.
    pub fn from_file_stem(stem: &str) -> Result<Self> {
        let file_name = format!("{stem}.pdf");
        let captures = FILENAME_PATTERN
            .captures(&file_name)
            .ok_or_else(|| IngestError::InvalidFilename(file_name.clone()))?;

        let company = captures["company"].to_string();
        let year: u16 = captures["year"]
            .parse()
            .map_err(|_| IngestError::InvalidFilename(file_name.clone()))?;

        Ok(Self { company, year })
    }
}

/// Physical page range for a resolved section.
///
/// `end: None` means open-ended: the section runs to the last page of
/// the document. That is only legitimate for the final section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    /// First physical page (1-based after offset correction)
    pub start: usize,

    /// Last physical page, or `None` for open-ended
    pub end: Option<usize>,
}

/// Inferred boundaries for one named section, as returned by the
/// page-locating call. Page numbers arrive as strings; empty strings
/// signal that inference failed for this section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SectionBounds {
    /// Printed start page ("" when inference failed)
    #[serde(default)]
    pub start: String,

    /// Printed end page ("" for the last section or on failure)
    #[serde(default)]
    pub end: String,

    /// Ordered subsection titles listed under this section
    #[serde(default)]
    pub sections: Vec<String>,
}

/// Mapping of section name to inferred boundaries
pub type SectionMap = BTreeMap<String, SectionBounds>;

/// A section with corrected, extraction-ready page boundaries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSection {
    /// Section name (e.g. "GOVERNANCE")
    pub name: String,

    /// Corrected physical page range
    pub pages: PageRange,
}

/// A chunk ready for persistence in the vector store.
///
/// Invariant at persistence time: `chunk_length` equals the character
/// count of `chunk_text` and is strictly below the hard storage limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Name of the section this chunk came from
    pub session_name: String,

    /// Company parsed from the source filename
    pub company: String,

    /// Reporting year parsed from the source filename
    pub year: String,

    /// Chunk text content
    pub chunk_text: String,

    /// Dense zero-based index within the originating section
    pub chunk_index: usize,

    /// Character count of `chunk_text`
    pub chunk_length: usize,

    /// Embedding vector, positionally paired by the embedding stage
    pub embedding: Vec<f32>,

    /// Creation timestamp (RFC 3339)
    pub created_at: String,
}

/// Statistics from ingesting a single document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentReport {
    /// Source file stem (e.g. "NVIDIA_2024")
    pub file_stem: String,

    /// Sections with usable page ranges
    pub sections_resolved: usize,

    /// Sections skipped (inference failure, empty extraction,
    /// embedding failure)
    pub sections_skipped: usize,

    /// Chunks persisted to the vector store
    pub chunks_stored: usize,

    /// Chunks dropped by the hard size limit after repair
    pub chunks_dropped: usize,

    /// Oversized splitter chunks that required repair
    pub chunks_repaired: usize,
}

/// Summary of a batch run over a directory of reports
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// Documents fully processed (possibly with skipped sections)
    pub documents_processed: usize,

    /// Documents abandoned due to fatal errors
    pub documents_failed: usize,

    /// Total chunks persisted across all documents
    pub chunks_stored: usize,

    /// Distinct companies represented among persisted chunks
    pub companies: BTreeSet<String>,

    /// Distinct years represented among persisted chunks
    pub years: BTreeSet<String>,

    /// Distinct section names represented among persisted chunks
    pub sessions: BTreeSet<String>,
}

impl RunSummary {
    /// Fold one document's outcome into the run summary
    pub fn absorb(&mut self, report: &DocumentReport, chunks: &[ChunkRecord]) {
        self.documents_processed += 1;
        self.chunks_stored += report.chunks_stored;
        for chunk in chunks {
            self.companies.insert(chunk.company.clone());
            self.years.insert(chunk.year.clone());
            self.sessions.insert(chunk.session_name.clone());
        }
    }
}
