//! Milvus REST chunk store.
//!
//! Uses the v2 REST API: one insert call per document with the full
//! accumulated chunk batch. Field names in the insert payload are the
//! collection schema; they match [`ChunkRecord`]'s serde names exactly.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::config::StorageConfig;
use crate::core::error::{IngestError, Result};
use crate::core::storage::ChunkStore;
use crate::core::types::ChunkRecord;

/// Chunk store backed by the Milvus v2 REST API
#[derive(Debug, Clone)]
pub struct MilvusChunkStore {
    client: reqwest::Client,
    base_url: String,
    database: String,
    collection: String,
    token: String,
}

#[derive(Serialize)]
struct InsertRequest<'a> {
    #[serde(rename = "dbName")]
    db_name: &'a str,
    #[serde(rename = "collectionName")]
    collection_name: &'a str,
    data: &'a [ChunkRecord],
}

#[derive(Deserialize)]
struct MilvusResponse {
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Deserialize, Default)]
struct InsertData {
    #[serde(rename = "insertCount", default)]
    insert_count: usize,
}

#[derive(Deserialize, Default)]
struct HasData {
    #[serde(default)]
    has: bool,
}

impl MilvusChunkStore {
    /// Create a store from storage configuration.
    pub fn new(config: &StorageConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| IngestError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.milvus_url.trim_end_matches('/').to_string(),
            database: config.database.clone(),
            collection: config.collection.clone(),
            token: config.token.clone(),
        })
    }

    async fn post(&self, path: &str, body: &serde_json::Value) -> Result<MilvusResponse> {
        let url = format!("{}{path}", self.base_url);

        let mut builder = self.client.post(&url).json(body);
        if !self.token.is_empty() {
            builder = builder.bearer_auth(&self.token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| IngestError::Storage(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IngestError::Storage(format!(
                "Vector store returned {status}: {body}"
            )));
        }

        let parsed: MilvusResponse = response
            .json()
            .await
            .map_err(|e| IngestError::Storage(format!("Malformed response: {e}")))?;

        if parsed.code != 0 {
            return Err(IngestError::Storage(format!(
                "Vector store error {}: {}",
                parsed.code, parsed.message
            )));
        }

        Ok(parsed)
    }
}

#[async_trait]
impl ChunkStore for MilvusChunkStore {
    async fn ensure_collection(&self) -> Result<()> {
        let response = self
            .post(
                "/v2/vectordb/collections/has",
                &json!({ "dbName": self.database, "collectionName": self.collection }),
            )
            .await?;

        let has: HasData = serde_json::from_value(response.data).unwrap_or_default();
        if has.has {
            tracing::debug!("Collection '{}' present", self.collection);
            return Ok(());
        }

        tracing::info!("Creating collection '{}'", self.collection);
        self.post(
            "/v2/vectordb/collections/create",
            &json!({
                "dbName": self.database,
                "collectionName": self.collection,
                "schema": {
                    "autoId": true,
                    "enableDynamicField": true,
                    "fields": [
                        { "fieldName": "id", "dataType": "Int64", "isPrimary": true },
                        { "fieldName": "embedding", "dataType": "FloatVector",
                          "elementTypeParams": { "dim": "1024" } },
                        { "fieldName": "chunk_text", "dataType": "VarChar",
                          "elementTypeParams": { "max_length": "2000" } },
                        { "fieldName": "session_name", "dataType": "VarChar",
                          "elementTypeParams": { "max_length": "256" } },
                        { "fieldName": "company", "dataType": "VarChar",
                          "elementTypeParams": { "max_length": "256" } },
                        { "fieldName": "year", "dataType": "VarChar",
                          "elementTypeParams": { "max_length": "8" } },
                        { "fieldName": "chunk_index", "dataType": "Int64" },
                        { "fieldName": "chunk_length", "dataType": "Int64" },
                        { "fieldName": "created_at", "dataType": "VarChar",
                          "elementTypeParams": { "max_length": "64" } }
                    ]
                }
            }),
        )
        .await?;

        Ok(())
    }

    async fn insert_chunks(&self, chunks: &[ChunkRecord]) -> Result<usize> {
        if chunks.is_empty() {
            tracing::warn!("No chunks to store");
            return Ok(0);
        }

        let request = InsertRequest {
            db_name: &self.database,
            collection_name: &self.collection,
            data: chunks,
        };

        let body = serde_json::to_value(&request)?;
        let response = self.post("/v2/vectordb/entities/insert", &body).await?;

        let data: InsertData = serde_json::from_value(response.data).unwrap_or_default();
        let stored = if data.insert_count > 0 {
            data.insert_count
        } else {
            chunks.len()
        };
        tracing::info!("Stored {} chunks", stored);
        Ok(stored)
    }
}
