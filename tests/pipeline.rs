//! End-to-end pipeline tests against in-process fakes.
//!
//! Covers the partial-failure taxonomy: per-document fatal errors,
//! per-section skips, and per-chunk drops, plus the persisted record
//! invariants (dense indices, character lengths, identity fields).

mod common;

use std::collections::BTreeMap;
use std::sync::Arc;

use tempfile::TempDir;

use common::{build_pipeline, sample_section_map, FakeEmbedder, MemoryStore, ScriptedExtractor, ScriptedLocator};
use finrag::core::config::Config;
use finrag::core::ingest::IngestPipeline;

const OVERVIEW_START: usize = 2;
const GOVERNANCE_START: usize = 28;

fn overview_text() -> String {
    "Revenue grew strongly across the data center segment this year. ".repeat(50)
}

fn governance_text() -> String {
    "The board reviewed risk controls quarterly. Oversight remained effective throughout."
        .to_string()
}

fn scripted_extractor(sections: &[(usize, Option<String>)]) -> ScriptedExtractor {
    ScriptedExtractor {
        contents: "# CONTENTS\n\n# OVERVIEW\n\n4 Chairman's Letter".to_string(),
        by_start_page: sections.iter().cloned().collect::<BTreeMap<_, _>>(),
    }
}

fn test_config(output_dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.storage.output_dir = output_dir.path().to_path_buf();
    config
}

fn write_pdf(dir: &TempDir, name: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, b"%PDF-1.7 stub").unwrap();
    path
}

fn happy_pipeline(store: Arc<MemoryStore>, config: Config) -> IngestPipeline {
    build_pipeline(
        scripted_extractor(&[
            (OVERVIEW_START, Some(overview_text())),
            (GOVERNANCE_START, Some(governance_text())),
        ]),
        ScriptedLocator {
            result: Ok(sample_section_map()),
        },
        FakeEmbedder::default(),
        store,
        config,
    )
}

#[tokio::test]
async fn test_happy_path_persists_both_sections() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_pdf(&input, "NVIDIA_2024.pdf");

    let store = Arc::new(MemoryStore::default());
    let pipeline = happy_pipeline(Arc::clone(&store), test_config(&output));

    let summary = pipeline.ingest_directory(input.path()).await.unwrap();

    assert_eq!(summary.documents_processed, 1);
    assert_eq!(summary.documents_failed, 0);
    assert!(summary.chunks_stored > 1);
    assert!(summary.companies.contains("NVIDIA"));
    assert!(summary.years.contains("2024"));
    assert!(summary.sessions.contains("OVERVIEW"));
    assert!(summary.sessions.contains("GOVERNANCE"));

    let records = store.records.lock().unwrap();
    assert_eq!(records.len(), summary.chunks_stored);
    for record in records.iter() {
        assert_eq!(record.company, "NVIDIA");
        assert_eq!(record.year, "2024");
        assert_eq!(record.chunk_length, record.chunk_text.chars().count());
        // Repair guarantees the safety margin, storage the hard limit
        assert!(record.chunk_length <= 1600);
        assert!(record.chunk_length < 2000);
    }
}

#[tokio::test]
async fn test_chunk_indices_dense_per_section() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let pdf = write_pdf(&input, "NVIDIA_2024.pdf");

    let store = Arc::new(MemoryStore::default());
    let pipeline = happy_pipeline(Arc::clone(&store), test_config(&output));

    pipeline.ingest_document(&pdf).await.unwrap();

    let records = store.records.lock().unwrap();
    let mut by_section: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for record in records.iter() {
        by_section
            .entry(record.session_name.as_str())
            .or_default()
            .push(record.chunk_index);
    }

    for (section, indices) in by_section {
        let expected: Vec<usize> = (0..indices.len()).collect();
        assert_eq!(indices, expected, "gapped indices in section {section}");
    }
}

#[tokio::test]
async fn test_inference_artifact_written() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let pdf = write_pdf(&input, "NVIDIA_2024.pdf");

    let store = Arc::new(MemoryStore::default());
    let pipeline = happy_pipeline(Arc::clone(&store), test_config(&output));

    pipeline.ingest_document(&pdf).await.unwrap();

    let artifact = output.path().join("NVIDIA_2024").join("content_results.json");
    let raw = std::fs::read_to_string(artifact).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed["OVERVIEW"]["start"], "4");
    assert_eq!(parsed["GOVERNANCE"]["end"], "");
}

#[tokio::test]
async fn test_empty_extraction_skips_section_only() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let pdf = write_pdf(&input, "NVIDIA_2024.pdf");

    let store = Arc::new(MemoryStore::default());
    let pipeline = build_pipeline(
        scripted_extractor(&[
            (OVERVIEW_START, None),
            (GOVERNANCE_START, Some(governance_text())),
        ]),
        ScriptedLocator {
            result: Ok(sample_section_map()),
        },
        FakeEmbedder::default(),
        Arc::clone(&store),
        test_config(&output),
    );

    let (report, chunks) = pipeline.ingest_document(&pdf).await.unwrap();

    assert!(report.sections_skipped >= 2); // UNPLACED + empty OVERVIEW
    assert!(!chunks.is_empty());
    assert!(chunks.iter().all(|c| c.session_name == "GOVERNANCE"));
}

#[tokio::test]
async fn test_embedding_mismatch_invalidates_one_section() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let pdf = write_pdf(&input, "NVIDIA_2024.pdf");

    let store = Arc::new(MemoryStore::default());
    let pipeline = build_pipeline(
        scripted_extractor(&[
            (OVERVIEW_START, Some(overview_text())),
            (GOVERNANCE_START, Some(governance_text())),
        ]),
        ScriptedLocator {
            result: Ok(sample_section_map()),
        },
        FakeEmbedder {
            mismatch_marker: Some("board reviewed risk".to_string()),
            ..Default::default()
        },
        Arc::clone(&store),
        test_config(&output),
    );

    let (report, chunks) = pipeline.ingest_document(&pdf).await.unwrap();

    // GOVERNANCE contributes nothing; OVERVIEW is untouched
    assert!(chunks.iter().all(|c| c.session_name == "OVERVIEW"));
    assert!(!chunks.is_empty());
    assert!(report.sections_skipped >= 2);
}

#[tokio::test]
async fn test_embedding_transport_failure_is_section_scoped() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let pdf = write_pdf(&input, "NVIDIA_2024.pdf");

    let store = Arc::new(MemoryStore::default());
    let pipeline = build_pipeline(
        scripted_extractor(&[
            (OVERVIEW_START, Some(overview_text())),
            (GOVERNANCE_START, Some(governance_text())),
        ]),
        ScriptedLocator {
            result: Ok(sample_section_map()),
        },
        FakeEmbedder {
            transport_marker: Some("Revenue grew strongly".to_string()),
            ..Default::default()
        },
        Arc::clone(&store),
        test_config(&output),
    );

    let (_, chunks) = pipeline.ingest_document(&pdf).await.unwrap();

    assert!(chunks.iter().all(|c| c.session_name == "GOVERNANCE"));
    assert!(!chunks.is_empty());
}

#[tokio::test]
async fn test_invalid_filename_fails_only_that_document() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_pdf(&input, "NVIDIA_2024.pdf");
    write_pdf(&input, "report.pdf");

    let store = Arc::new(MemoryStore::default());
    let pipeline = happy_pipeline(Arc::clone(&store), test_config(&output));

    let summary = pipeline.ingest_directory(input.path()).await.unwrap();

    assert_eq!(summary.documents_processed, 1);
    assert_eq!(summary.documents_failed, 1);
    assert_eq!(summary.companies.len(), 1);
    assert!(summary.companies.contains("NVIDIA"));
}

#[tokio::test]
async fn test_inference_failure_is_fatal_for_document() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_pdf(&input, "NVIDIA_2024.pdf");

    let store = Arc::new(MemoryStore::default());
    let pipeline = build_pipeline(
        scripted_extractor(&[]),
        ScriptedLocator {
            result: Err("model unavailable".to_string()),
        },
        FakeEmbedder::default(),
        Arc::clone(&store),
        test_config(&output),
    );

    let summary = pipeline.ingest_directory(input.path()).await.unwrap();

    assert_eq!(summary.documents_processed, 0);
    assert_eq!(summary.documents_failed, 1);
    assert!(store.records.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_storage_failure_is_fatal_for_document() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_pdf(&input, "NVIDIA_2024.pdf");

    let store = Arc::new(MemoryStore {
        fail_insert: true,
        ..Default::default()
    });
    let pipeline = happy_pipeline(Arc::clone(&store), test_config(&output));

    let summary = pipeline.ingest_directory(input.path()).await.unwrap();

    assert_eq!(summary.documents_processed, 0);
    assert_eq!(summary.documents_failed, 1);
}

#[tokio::test]
async fn test_hard_limit_drops_chunk_after_repair() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let pdf = write_pdf(&input, "NVIDIA_2024.pdf");

    // Safety margin misconfigured above the hard limit: the repair
    // engine passes a 2050-char chunk that storage must refuse.
    let mut config = test_config(&output);
    config.chunking.safety_max = 2100;
    config.chunking.hard_max = 2000;

    let store = Arc::new(MemoryStore::default());
    let pipeline = build_pipeline(
        scripted_extractor(&[
            (OVERVIEW_START, Some("x".repeat(2050))),
            (GOVERNANCE_START, Some(governance_text())),
        ]),
        ScriptedLocator {
            result: Ok(sample_section_map()),
        },
        FakeEmbedder::default(),
        Arc::clone(&store),
        config,
    );

    let (report, chunks) = pipeline.ingest_document(&pdf).await.unwrap();

    assert_eq!(report.chunks_dropped, 1);
    assert!(chunks.iter().all(|c| c.session_name == "GOVERNANCE"));
    assert!(chunks.iter().all(|c| c.chunk_length < 2000));
}
