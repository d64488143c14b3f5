//! Document-conversion service client.
//!
//! Sends PDF bytes (base64) with a page range and language hint,
//! receives the markdown rendering of those pages. An empty rendering
//! comes back as `Ok(None)`; whole-page scans and blank separators in
//! annual reports make that a routine outcome, not an error.

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::core::clients::{build_http_client, SectionExtractor};
use crate::core::config::ServicesConfig;
use crate::core::error::{IngestError, Result};
use crate::core::types::PageRange;

/// HTTP client for the PDF-to-markdown conversion service
#[derive(Debug, Clone)]
pub struct HttpSectionExtractor {
    client: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
struct ExtractionRequest<'a> {
    pdf_base64: String,
    file_name: &'a str,
    lang: &'a str,
    start_page: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_page: Option<usize>,
}

#[derive(Deserialize)]
struct ExtractionResponse {
    #[serde(default)]
    markdown: Option<String>,
}

impl HttpSectionExtractor {
    /// Create an extractor from service configuration.
    pub fn new(config: &ServicesConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config)?,
            url: config.extraction_url.clone(),
        })
    }
}

#[async_trait]
impl SectionExtractor for HttpSectionExtractor {
    async fn extract(
        &self,
        pdf: &[u8],
        file_stem: &str,
        lang: &str,
        pages: PageRange,
    ) -> Result<Option<String>> {
        tracing::debug!(
            "Extracting pages {}..{:?} of {}",
            pages.start,
            pages.end,
            file_stem
        );

        let request = ExtractionRequest {
            pdf_base64: base64::engine::general_purpose::STANDARD.encode(pdf),
            file_name: file_stem,
            lang,
            start_page: pages.start,
            end_page: pages.end,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| IngestError::Extraction(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IngestError::Extraction(format!(
                "Endpoint returned {status}: {body}"
            )));
        }

        let parsed: ExtractionResponse = response
            .json()
            .await
            .map_err(|e| IngestError::Extraction(format!("Malformed response: {e}")))?;

        Ok(parsed.markdown.filter(|md| !md.trim().is_empty()))
    }
}
