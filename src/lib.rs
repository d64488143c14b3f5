//! finrag - Financial-Report Ingestion Pipeline
//!
//! Ingests annual-report PDFs for semantic search: locates report
//! sections by page range, splits section text into retrieval-sized
//! chunks, attaches embedding vectors and persists them to a vector
//! store.
//!
//! # Architecture
//!
//! - **core**: Domain logic (protocol-agnostic)
//!   - config, error, types, prompts
//!   - ingest (splitting, oversize repair, section resolution,
//!     coordination, chunk expansion)
//!   - clients (conversion, page inference, embedding, completion)
//!   - storage (Milvus-style vector store)
//!   - services (unified service container)
//!
//! - **cli**: clap adapter (depends on core)
//!
//! # Key guarantees
//!
//! - UTF-8 safe, character-based chunk sizing (never splits inside a
//!   multi-byte sequence)
//! - No chunk exceeds the storage safety limit after repair; repair
//!   never truncates content
//! - Per-section embedding failures never poison other sections
//! - Batch runs survive fatal failures of individual documents

// Core domain logic (protocol-agnostic)
pub mod core;

// CLI adapter
pub mod cli;

// Re-export commonly used types for convenience
pub use core::config::Config;
pub use core::error::{IngestError, Result};
pub use core::services::Services;
pub use core::types::*;
