//! Question → top-k chunks

use std::sync::Arc;

use crate::error::Result;
use crate::providers::{EmbeddingProvider, VectorStoreProvider};
use crate::types::ScoredChunk;

/// Embeds a question and looks up its nearest chunks
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStoreProvider>,
    top_k: usize,
}

impl Retriever {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            store,
            top_k,
        }
    }

    /// Retrieve the `top_k` chunks most similar to `question`.
    ///
    /// Embedding failures surface as `Error::Model`, store failures as
    /// `Error::Database`.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<ScoredChunk>> {
        let embedding = self.embedder.embed(question).await?;
        let results = self.store.search(&embedding, self.top_k).await?;

        tracing::debug!(
            "Retrieved {} chunks from {} (top_k={})",
            results.len(),
            self.store.name(),
            self.top_k
        );

        Ok(results)
    }
}
