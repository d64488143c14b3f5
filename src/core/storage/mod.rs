//! Chunk persistence.
//!
//! The pipeline talks to storage through the [`ChunkStore`] trait; the
//! production implementation is a Milvus-style REST client.

pub mod milvus;

use async_trait::async_trait;

use crate::core::error::Result;
use crate::core::types::ChunkRecord;

pub use milvus::MilvusChunkStore;

/// Persists embedded chunks to the vector store.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Create the target collection if it does not already exist.
    async fn ensure_collection(&self) -> Result<()>;

    /// Insert a batch of chunk records, returning how many were stored.
    async fn insert_chunks(&self, chunks: &[ChunkRecord]) -> Result<usize>;
}
