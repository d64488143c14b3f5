//! Ingest command - process a directory of report PDFs

use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

use crate::cli::output::{colors, format_duration, print_warning};
use crate::cli::OutputFormat;
use crate::core::services::Services;

/// Arguments for the ingest command
#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Directory containing `{company}_{year}.pdf` report files
    pub path: PathBuf,

    /// Language hint for the conversion service (e.g. "en", "ch")
    #[arg(long, short = 'l')]
    pub language: Option<String>,
}

/// Ingestion result response
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub path: String,
    pub documents_processed: usize,
    pub documents_failed: usize,
    pub chunks_stored: usize,
    pub companies: Vec<String>,
    pub years: Vec<String>,
    pub sessions: Vec<String>,
    pub duration_secs: f64,
}

/// Execute the ingest command
pub async fn execute(
    args: IngestArgs,
    services: &Services,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = args.path.canonicalize().map_err(|e| {
        format!(
            "Invalid path '{}': {}. Make sure the path exists and is accessible.",
            args.path.display(),
            e
        )
    })?;

    if !path.is_dir() {
        return Err(format!(
            "Path '{}' is not a directory. Point finrag at a directory of report PDFs.",
            path.display()
        )
        .into());
    }

    if format == OutputFormat::Human {
        eprintln!(
            "Ingesting reports from {}...",
            colors::file_path(&path.display().to_string())
        );
    }

    let start = Instant::now();
    let summary = services.pipeline.ingest_directory(&path).await?;
    let duration_secs = start.elapsed().as_secs_f64();

    let response = IngestResponse {
        path: path.to_string_lossy().into_owned(),
        documents_processed: summary.documents_processed,
        documents_failed: summary.documents_failed,
        chunks_stored: summary.chunks_stored,
        companies: summary.companies.into_iter().collect(),
        years: summary.years.into_iter().collect(),
        sessions: summary.sessions.into_iter().collect(),
        duration_secs,
    };

    match format {
        OutputFormat::Human => {
            println!(
                "{} {} documents ({} chunks) in {}",
                colors::success("Ingested"),
                colors::number(&response.documents_processed.to_string()),
                colors::number(&response.chunks_stored.to_string()),
                colors::number(&format_duration(response.duration_secs))
            );
            if response.documents_failed > 0 {
                print_warning(&format!(
                    "{} documents failed",
                    response.documents_failed
                ));
            }
            println!("Companies: {}", response.companies.join(", "));
            println!("Years: {}", response.years.join(", "));
            println!(
                "Sections: {}",
                response
                    .sessions
                    .iter()
                    .map(|s| colors::section(s).to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
