//! Config command - show current configuration

use clap::Args;
use serde::Serialize;

use crate::cli::output::colors;
use crate::cli::OutputFormat;
use crate::core::services::Services;

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {}

/// Configuration response (secrets omitted)
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub chunking: ChunkingView,
    pub sections: SectionView,
    pub services: ServicesView,
    pub storage: StorageView,
    pub expansion_enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct ChunkingView {
    pub target_size: usize,
    pub overlap: usize,
    pub safety_max: usize,
    pub hard_max: usize,
    pub window_overlap: usize,
}

#[derive(Debug, Serialize)]
pub struct SectionView {
    pub page_offset: usize,
    pub contents_pages: usize,
    pub language: String,
}

#[derive(Debug, Serialize)]
pub struct ServicesView {
    pub extraction_url: String,
    pub embedding_url: String,
    pub completion_url: String,
    pub completion_model: String,
    pub request_timeout_sec: u64,
    pub connect_timeout_sec: u64,
}

#[derive(Debug, Serialize)]
pub struct StorageView {
    pub milvus_url: String,
    pub database: String,
    pub collection: String,
    pub output_dir: String,
}

/// Execute the config command
pub async fn execute(
    _args: ConfigArgs,
    services: &Services,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = &services.config;

    let response = ConfigResponse {
        chunking: ChunkingView {
            target_size: config.chunking.target_size,
            overlap: config.chunking.overlap,
            safety_max: config.chunking.safety_max,
            hard_max: config.chunking.hard_max,
            window_overlap: config.chunking.window_overlap,
        },
        sections: SectionView {
            page_offset: config.sections.page_offset,
            contents_pages: config.sections.contents_pages,
            language: config.sections.language.clone(),
        },
        services: ServicesView {
            extraction_url: config.services.extraction_url.clone(),
            embedding_url: config.services.embedding_url.clone(),
            completion_url: config.services.completion_url.clone(),
            completion_model: config.services.completion_model.clone(),
            request_timeout_sec: config.services.request_timeout_sec,
            connect_timeout_sec: config.services.connect_timeout_sec,
        },
        storage: StorageView {
            milvus_url: config.storage.milvus_url.clone(),
            database: config.storage.database.clone(),
            collection: config.storage.collection.clone(),
            output_dir: config.storage.output_dir.display().to_string(),
        },
        expansion_enabled: config.expansion.enabled,
    };

    match format {
        OutputFormat::Human => {
            println!("{}", colors::label("Configuration:"));
            println!("  {}", colors::label("chunking:"));
            println!("    target_size: {}", response.chunking.target_size);
            println!("    overlap: {}", response.chunking.overlap);
            println!("    safety_max: {}", response.chunking.safety_max);
            println!("    hard_max: {}", response.chunking.hard_max);
            println!("    window_overlap: {}", response.chunking.window_overlap);
            println!("  {}", colors::label("sections:"));
            println!("    page_offset: {}", response.sections.page_offset);
            println!("    contents_pages: {}", response.sections.contents_pages);
            println!("    language: {}", response.sections.language);
            println!("  {}", colors::label("services:"));
            println!("    extraction_url: {}", response.services.extraction_url);
            println!("    embedding_url: {}", response.services.embedding_url);
            println!("    completion_url: {}", response.services.completion_url);
            println!("    completion_model: {}", response.services.completion_model);
            println!(
                "    {}",
                colors::dim(&format!(
                    "timeouts: {}s request / {}s connect",
                    response.services.request_timeout_sec, response.services.connect_timeout_sec
                ))
            );
            println!("  {}", colors::label("storage:"));
            println!("    milvus_url: {}", response.storage.milvus_url);
            println!("    database: {}", response.storage.database);
            println!("    collection: {}", response.storage.collection);
            println!("    output_dir: {}", response.storage.output_dir);
            println!("  expansion_enabled: {}", response.expansion_enabled);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
