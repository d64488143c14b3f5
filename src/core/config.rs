//! Configuration management for the finrag ingestion service.
//!
//! This module handles loading configuration from TOML files and
//! environment variables, with sensible defaults for all settings.

use crate::core::error::{IngestError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub sections: SectionConfig,
    #[serde(default)]
    pub services: ServicesConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub expansion: ExpansionConfig,
}

/// Chunking configuration.
///
/// All sizes are in characters, not bytes. `safety_max` and `hard_max`
/// are independent constants: `safety_max` is what the repair engine
/// enforces, `hard_max` is the absolute storage limit checked one last
/// time before persistence. There is no formula relating the two.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChunkingConfig {
    /// Target characters per splitter chunk
    #[serde(default = "default_target_size")]
    pub target_size: usize,

    /// Character overlap between consecutive splitter chunks
    #[serde(default = "default_overlap")]
    pub overlap: usize,

    /// Maximum characters the repair engine allows per chunk
    #[serde(default = "default_safety_max")]
    pub safety_max: usize,

    /// Absolute storage limit; chunks at or above this are dropped
    #[serde(default = "default_hard_max")]
    pub hard_max: usize,

    /// Character overlap between fixed-width repair windows
    #[serde(default = "default_window_overlap")]
    pub window_overlap: usize,
}

/// Section resolution configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SectionConfig {
    /// Pages subtracted from inferred start / added to inferred end,
    /// compensating for printed-vs-physical page misalignment.
    /// Empirical, not derived from document metadata.
    #[serde(default = "default_page_offset")]
    pub page_offset: usize,

    /// Number of leading pages scanned for the table of contents
    #[serde(default = "default_contents_pages")]
    pub contents_pages: usize,

    /// Language hint passed to the conversion service
    #[serde(default = "default_language")]
    pub language: String,
}

/// External service endpoints and timeouts
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServicesConfig {
    /// Document-conversion service endpoint (PDF pages -> markdown)
    #[serde(default)]
    pub extraction_url: String,

    /// Embedding service endpoint
    #[serde(default)]
    pub embedding_url: String,

    /// Chat-completion endpoint (page inference, expansion)
    #[serde(default)]
    pub completion_url: String,

    /// Model identifier for completion calls
    #[serde(default = "default_completion_model")]
    pub completion_model: String,

    /// API key for the completion endpoint (env only, never TOML)
    #[serde(skip_serializing, default)]
    pub api_key: String,

    /// Per-request timeout in seconds (generous; embedding batches
    /// for long sections can be slow)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_sec: u64,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_sec: u64,
}

/// Vector store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Vector database base URL
    #[serde(default)]
    pub milvus_url: String,

    /// Database name
    #[serde(default = "default_database")]
    pub database: String,

    /// Collection receiving chunk records
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Access token (env only, never TOML)
    #[serde(skip_serializing, default)]
    pub token: String,

    /// Directory for per-document artifacts (inference results)
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

/// Document-expansion side feature (keywords / QA enrichment)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExpansionConfig {
    /// Master switch for chunk expansion before embedding
    #[serde(default)]
    pub enabled: bool,

    /// Append extracted keywords to the embedded text
    #[serde(default = "default_true")]
    pub keywords: bool,

    /// Append generated QA pairs to the embedded text
    #[serde(default = "default_true")]
    pub qa: bool,
}

// Default value functions
fn default_target_size() -> usize {
    1500
}

fn default_overlap() -> usize {
    500
}

fn default_safety_max() -> usize {
    1600
}

fn default_hard_max() -> usize {
    2000
}

fn default_window_overlap() -> usize {
    100
}

fn default_page_offset() -> usize {
    2
}

fn default_contents_pages() -> usize {
    4
}

fn default_language() -> String {
    "en".to_string()
}

fn default_completion_model() -> String {
    "gpt-4o".to_string()
}

fn default_request_timeout() -> u64 {
    600
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_database() -> String {
    "default".to_string()
}

fn default_collection() -> String {
    "report_chunks".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./data/output")
}

fn default_true() -> bool {
    true
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            target_size: default_target_size(),
            overlap: default_overlap(),
            safety_max: default_safety_max(),
            hard_max: default_hard_max(),
            window_overlap: default_window_overlap(),
        }
    }
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            page_offset: default_page_offset(),
            contents_pages: default_contents_pages(),
            language: default_language(),
        }
    }
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            extraction_url: String::new(),
            embedding_url: String::new(),
            completion_url: String::new(),
            completion_model: default_completion_model(),
            api_key: String::new(),
            request_timeout_sec: default_request_timeout(),
            connect_timeout_sec: default_connect_timeout(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            milvus_url: String::new(),
            database: default_database(),
            collection: default_collection(),
            token: String::new(),
            output_dir: default_output_dir(),
        }
    }
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            keywords: true,
            qa: true,
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| IngestError::Config(format!("Failed to read config file: {e}")))?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load config with priority: env vars > TOML > defaults
    ///
    /// TOML is read from `FINRAG_CONFIG` if set, otherwise from
    /// `./finrag.toml` when present.
    pub fn load() -> Result<Self> {
        let mut config = if let Ok(config_path) = env::var("FINRAG_CONFIG") {
            Self::from_file(config_path)?
        } else if Path::new("finrag.toml").exists() {
            Self::from_file("finrag.toml")?
        } else {
            Self::default()
        };

        config.merge_env();
        config.validate()?;

        Ok(config)
    }

    /// Merge configuration with environment variables
    pub fn merge_env(&mut self) {
        // Chunking configuration
        if let Ok(size) = env::var("FINRAG_TARGET_SIZE") {
            if let Ok(s) = size.parse() {
                self.chunking.target_size = s;
            }
        }
        if let Ok(overlap) = env::var("FINRAG_OVERLAP") {
            if let Ok(o) = overlap.parse() {
                self.chunking.overlap = o;
            }
        }
        if let Ok(max) = env::var("FINRAG_SAFETY_MAX") {
            if let Ok(m) = max.parse() {
                self.chunking.safety_max = m;
            }
        }
        if let Ok(max) = env::var("FINRAG_HARD_MAX") {
            if let Ok(m) = max.parse() {
                self.chunking.hard_max = m;
            }
        }

        // Service endpoints
        if let Ok(url) = env::var("FINRAG_EXTRACTION_URL") {
            self.services.extraction_url = url;
        }
        if let Ok(url) = env::var("EMBEDDING_END_POINT") {
            self.services.embedding_url = url;
        }
        if let Ok(url) = env::var("FINRAG_COMPLETION_URL") {
            self.services.completion_url = url;
        }
        if let Ok(key) = env::var("FINRAG_API_KEY") {
            self.services.api_key = key;
        }

        // Storage
        if let Ok(url) = env::var("MILVUS_URL") {
            self.storage.milvus_url = url;
        }
        if let Ok(db) = env::var("MILVUS_DB_NAME") {
            self.storage.database = db;
        }
        if let Ok(pw) = env::var("MILVUS_PW") {
            self.storage.token = pw;
        }
        if let Ok(dir) = env::var("FINRAG_OUTPUT_DIR") {
            self.storage.output_dir = PathBuf::from(dir);
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.chunking.target_size == 0 {
            return Err(IngestError::Config(
                "Target chunk size must be non-zero".to_string(),
            ));
        }

        if self.chunking.overlap >= self.chunking.target_size {
            return Err(IngestError::Config(
                "Splitter overlap must be less than target size".to_string(),
            ));
        }

        if self.chunking.safety_max >= self.chunking.hard_max {
            return Err(IngestError::Config(
                "Safety max must be strictly below the hard storage limit".to_string(),
            ));
        }

        // Repair windows advance by at least 90% of safety_max; the
        // window overlap must stay below that or windowing stalls.
        if self.chunking.window_overlap >= self.chunking.safety_max * 9 / 10 {
            return Err(IngestError::Config(
                "Window overlap must be below 90% of safety max".to_string(),
            ));
        }

        if self.sections.contents_pages == 0 {
            return Err(IngestError::Config(
                "Contents pages must be non-zero".to_string(),
            ));
        }

        if self.services.request_timeout_sec == 0 || self.services.connect_timeout_sec == 0 {
            return Err(IngestError::Config(
                "Request and connect timeouts must be non-zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Log configuration (redacting sensitive values)
    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Target chunk size: {} chars", self.chunking.target_size);
        tracing::info!("  Splitter overlap: {} chars", self.chunking.overlap);
        tracing::info!("  Safety max: {} chars", self.chunking.safety_max);
        tracing::info!("  Hard max: {} chars", self.chunking.hard_max);
        tracing::info!("  Window overlap: {} chars", self.chunking.window_overlap);
        tracing::info!("  Page offset: +/-{}", self.sections.page_offset);
        tracing::info!("  Contents pages: {}", self.sections.contents_pages);
        tracing::info!("  Extraction URL: {}", self.services.extraction_url);
        tracing::info!("  Embedding URL: {}", self.services.embedding_url);
        tracing::info!("  Completion URL: {}", self.services.completion_url);
        tracing::info!("  Vector store: {}", self.storage.milvus_url);
        tracing::info!("  Collection: {}", self.storage.collection);
        tracing::info!("  Output dir: {:?}", self.storage.output_dir);
        tracing::info!("  Expansion enabled: {}", self.expansion.enabled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.chunking.target_size, 1500);
        assert_eq!(config.chunking.overlap, 500);
        assert_eq!(config.chunking.safety_max, 1600);
        assert_eq!(config.chunking.hard_max, 2000);
        assert_eq!(config.sections.page_offset, 2);
    }

    #[test]
    fn test_config_validation_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_safety_above_hard() {
        let mut config = Config::default();
        config.chunking.safety_max = 2000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_overlap_too_large() {
        let mut config = Config::default();
        config.chunking.overlap = 1500;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_window_overlap() {
        let mut config = Config::default();
        config.chunking.window_overlap = 1500;
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_env_var_override() {
        env::set_var("FINRAG_SAFETY_MAX", "1200");

        let mut config = Config::default();
        config.merge_env();

        assert_eq!(config.chunking.safety_max, 1200);

        env::remove_var("FINRAG_SAFETY_MAX");
    }

    #[test]
    #[serial]
    fn test_env_var_endpoints() {
        env::set_var("EMBEDDING_END_POINT", "http://emb.local/embed");
        env::set_var("MILVUS_URL", "http://milvus.local:19530");

        let mut config = Config::default();
        config.merge_env();

        assert_eq!(config.services.embedding_url, "http://emb.local/embed");
        assert_eq!(config.storage.milvus_url, "http://milvus.local:19530");

        env::remove_var("EMBEDDING_END_POINT");
        env::remove_var("MILVUS_URL");
    }

    #[test]
    fn test_toml_deserialization() {
        let toml = r#"
            [chunking]
            target_size = 1000
            overlap = 200
            safety_max = 1100
            hard_max = 1500

            [sections]
            page_offset = 1
            contents_pages = 3
            language = "ch"

            [storage]
            milvus_url = "http://localhost:19530"
            collection = "annual_reports"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.chunking.target_size, 1000);
        assert_eq!(config.sections.page_offset, 1);
        assert_eq!(config.sections.language, "ch");
        assert_eq!(config.storage.collection, "annual_reports");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_secrets_not_serialized() {
        let mut config = Config::default();
        config.services.api_key = "secret".to_string();
        config.storage.token = "secret".to_string();

        let rendered = toml::to_string(&config).unwrap();
        assert!(!rendered.contains("secret"));
    }
}
