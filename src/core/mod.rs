//! Core domain logic (protocol-agnostic)
//!
//! # Architecture
//!
//! - **config**: Configuration loading (TOML + environment)
//! - **error**: Error types and Result alias
//! - **types**: Domain data structures
//! - **prompts**: Completion prompt templates
//! - **clients**: HTTP clients for external services
//! - **storage**: Vector-store persistence
//! - **ingest**: Splitting, repair, resolution, coordination
//! - **services**: Unified service container

pub mod clients;
pub mod config;
pub mod error;
pub mod ingest;
pub mod prompts;
pub mod services;
pub mod storage;
pub mod types;

// Re-export key types for convenience
pub use config::Config;
pub use error::{IngestError, Result};
pub use services::Services;
