//! Vector store provider trait for storing and searching embeddings

use async_trait::async_trait;

use crate::error::VectorStoreError;
use crate::types::{Chunk, ScoredChunk};

/// Trait for vector storage and similarity search
///
/// Implementations:
/// - `LocalVectorStore`: flat cosine index persisted as JSON
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    /// Insert chunks; every chunk must carry an embedding
    async fn insert(&self, chunks: Vec<Chunk>) -> Result<(), VectorStoreError>;

    /// Return up to `top_k` chunks ordered by descending similarity
    async fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>, VectorStoreError>;

    /// Get total number of chunks stored
    async fn len(&self) -> Result<usize, VectorStoreError>;

    /// Check if store is empty
    async fn is_empty(&self) -> Result<bool, VectorStoreError> {
        Ok(self.len().await? == 0)
    }

    /// Get provider name for logging
    fn name(&self) -> &str;
}
