//! CLI command implementations

pub mod config;
pub mod ingest;

pub use config::ConfigArgs;
pub use ingest::IngestArgs;
