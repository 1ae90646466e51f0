//! Local vector store: a flat cosine-similarity index persisted as JSON

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::VectorStoreError;
use crate::types::{Chunk, ScoredChunk};

use super::vector_store::VectorStoreProvider;

const INDEX_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct PersistedIndex {
    version: u32,
    chunks: Vec<Chunk>,
}

/// Brute-force index over every stored chunk.
///
/// Searches scan all vectors, which is fine for a single PDF worth of chunks.
pub struct LocalVectorStore {
    /// Backing file, `None` for in-memory stores
    path: Option<PathBuf>,
    chunks: Arc<RwLock<Vec<Chunk>>>,
}

impl LocalVectorStore {
    /// Create an empty store that is never persisted
    pub fn in_memory() -> Self {
        Self {
            path: None,
            chunks: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Start an empty index that will be saved to `path`, replacing any
    /// existing file on the next save
    pub fn create(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            chunks: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Open the index stored at `path`, or start empty if the file does not exist
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, VectorStoreError> {
        let path = path.into();

        let chunks = if path.exists() {
            let data = std::fs::read(&path).map_err(|e| {
                VectorStoreError::Storage(format!("failed to read {}: {}", path.display(), e))
            })?;
            let index: PersistedIndex = serde_json::from_slice(&data)
                .map_err(|e| VectorStoreError::Corrupt(format!("{}: {}", path.display(), e)))?;
            if index.version != INDEX_VERSION {
                return Err(VectorStoreError::Corrupt(format!(
                    "{}: unsupported index version {}",
                    path.display(),
                    index.version
                )));
            }
            tracing::info!(
                "Loaded {} chunks from {}",
                index.chunks.len(),
                path.display()
            );
            index.chunks
        } else {
            tracing::warn!(
                "Vector store {} does not exist yet; starting empty (run harmony-indexer)",
                path.display()
            );
            Vec::new()
        };

        Ok(Self {
            path: Some(path),
            chunks: Arc::new(RwLock::new(chunks)),
        })
    }

    /// Write the index to its backing file (no-op for in-memory stores)
    pub fn save(&self) -> Result<(), VectorStoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| VectorStoreError::Storage(e.to_string()))?;
            }
        }

        let index = PersistedIndex {
            version: INDEX_VERSION,
            chunks: self.chunks.read().clone(),
        };
        let data =
            serde_json::to_vec(&index).map_err(|e| VectorStoreError::Storage(e.to_string()))?;

        // write-then-rename so a crash never leaves a half-written index
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, data).map_err(|e| VectorStoreError::Storage(e.to_string()))?;
        std::fs::rename(&tmp, path).map_err(|e| VectorStoreError::Storage(e.to_string()))?;

        tracing::info!("Saved {} chunks to {}", index.chunks.len(), path.display());
        Ok(())
    }

    fn dimensions(chunks: &[Chunk]) -> Option<usize> {
        chunks.first().map(|c| c.embedding.len())
    }
}

/// Cosine similarity; zero vectors score 0
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[async_trait]
impl VectorStoreProvider for LocalVectorStore {
    async fn insert(&self, chunks: Vec<Chunk>) -> Result<(), VectorStoreError> {
        let mut stored = self.chunks.write();
        let mut expected = Self::dimensions(&stored);

        for chunk in &chunks {
            if chunk.embedding.is_empty() {
                return Err(VectorStoreError::Unavailable(format!(
                    "chunk {} has no embedding",
                    chunk.id
                )));
            }
            let expected = *expected.get_or_insert(chunk.embedding.len());
            if chunk.embedding.len() != expected {
                return Err(VectorStoreError::DimensionMismatch {
                    expected,
                    actual: chunk.embedding.len(),
                });
            }
        }

        stored.extend(chunks);
        Ok(())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>, VectorStoreError> {
        let chunks = Arc::clone(&self.chunks);
        let query = query_embedding.to_vec();

        tokio::task::spawn_blocking(move || {
            let chunks = chunks.read();

            if let Some(expected) = Self::dimensions(&chunks) {
                if expected != query.len() {
                    return Err(VectorStoreError::DimensionMismatch {
                        expected,
                        actual: query.len(),
                    });
                }
            }

            let mut scored: Vec<ScoredChunk> = chunks
                .iter()
                .map(|chunk| ScoredChunk {
                    similarity: cosine_similarity(&query, &chunk.embedding),
                    chunk: chunk.clone(),
                })
                .collect();

            scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
            scored.truncate(top_k);
            Ok(scored)
        })
        .await
        .map_err(|e| VectorStoreError::Unavailable(format!("search task failed: {}", e)))?
    }

    async fn len(&self) -> Result<usize, VectorStoreError> {
        Ok(self.chunks.read().len())
    }

    fn name(&self) -> &str {
        "local-flat"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str, embedding: Vec<f32>) -> Chunk {
        Chunk::new(text.to_string(), Some(0), 0).with_embedding(embedding)
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity() {
        let store = LocalVectorStore::in_memory();
        store
            .insert(vec![
                chunk("cardiology", vec![1.0, 0.0, 0.0]),
                chunk("pediatrics", vec![0.0, 1.0, 0.0]),
                chunk("cardiac surgery", vec![0.9, 0.1, 0.0]),
            ])
            .await
            .unwrap();

        let results = store.search(&[1.0, 0.0, 0.0], 2).await.unwrap();
        let texts: Vec<&str> = results.iter().map(|r| r.chunk.content.as_str()).collect();
        assert_eq!(texts, vec!["cardiology", "cardiac surgery"]);
    }

    #[tokio::test]
    async fn test_empty_store_returns_nothing() {
        let store = LocalVectorStore::in_memory();
        assert!(store.search(&[1.0, 2.0], 5).await.unwrap().is_empty());
        assert!(store.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_dimension_mismatch() {
        let store = LocalVectorStore::in_memory();
        store.insert(vec![chunk("a", vec![1.0, 0.0])]).await.unwrap();

        let err = store.search(&[1.0, 0.0, 0.0], 5).await.unwrap_err();
        assert!(matches!(
            err,
            VectorStoreError::DimensionMismatch { expected: 2, actual: 3 }
        ));

        let err = store.insert(vec![chunk("b", vec![1.0])]).await.unwrap_err();
        assert!(matches!(err, VectorStoreError::DimensionMismatch { .. }));
    }

    #[tokio::test]
    async fn test_persistence_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index").join("store.json");

        let store = LocalVectorStore::open(&path).unwrap();
        store
            .insert(vec![
                chunk("opening hours", vec![0.2, 0.8]),
                chunk("parking", vec![0.9, 0.1]),
            ])
            .await
            .unwrap();
        store.save().unwrap();

        let reopened = LocalVectorStore::open(&path).unwrap();
        assert_eq!(reopened.len().await.unwrap(), 2);
        let results = reopened.search(&[1.0, 0.0], 1).await.unwrap();
        assert_eq!(results[0].chunk.content, "parking");
    }

    #[test]
    fn test_corrupt_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, b"not json").unwrap();

        assert!(matches!(
            LocalVectorStore::open(&path),
            Err(VectorStoreError::Corrupt(_))
        ));
    }
}
