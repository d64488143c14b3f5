//! Error types and error handling for the finrag ingestion service.
//!
//! The pipeline distinguishes three failure classes: fatal for a whole
//! document (bad filename, page inference down), recoverable for a single
//! section (bad page range, empty extraction, embedding mismatch), and
//! recoverable for a single chunk (hard size limit exceeded after repair).
//! Lower layers return errors; the coordinator decides continue-vs-abort.

use thiserror::Error;

/// Result type alias for finrag operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// Main error type for the finrag service
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Invalid report filename '{0}': expected '{{company}}_{{year}}.pdf'")]
    InvalidFilename(String),

    #[error("Page inference failed: {0}")]
    PageInference(String),

    #[error("Section extraction failed: {0}")]
    Extraction(String),

    #[error("Embedding request failed: {0}")]
    Embedding(String),

    #[error("Embedding count mismatch: requested {requested}, received {received}")]
    EmbeddingCountMismatch { requested: usize, received: usize },

    #[error("Completion request failed: {0}")]
    Completion(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl IngestError {
    /// Get user-friendly error message
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Errors that abort processing of the current document.
    ///
    /// The batch runner catches these, logs, and moves on to the next
    /// document; they never halt the whole run.
    pub fn is_fatal_for_document(&self) -> bool {
        matches!(
            self,
            IngestError::InvalidFilename(_)
                | IngestError::PageInference(_)
                | IngestError::Storage(_)
                | IngestError::Io(_)
        )
    }

    /// Errors that skip the current section and let the document continue.
    pub fn is_section_recoverable(&self) -> bool {
        matches!(
            self,
            IngestError::Extraction(_)
                | IngestError::Embedding(_)
                | IngestError::EmbeddingCountMismatch { .. }
                | IngestError::Completion(_)
        )
    }
}
