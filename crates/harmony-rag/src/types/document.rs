//! Indexed text chunks

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A slice of the source PDF as stored in the vector index
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique chunk ID
    pub id: Uuid,
    /// Text content
    pub content: String,
    /// Page number (0-indexed, as reported by the PDF parser)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Chunk index within the document
    pub chunk_index: u32,
    /// Embedding vector
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embedding: Vec<f32>,
}

impl Chunk {
    /// Create a new chunk without an embedding
    pub fn new(content: String, page: Option<u32>, chunk_index: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            content,
            page,
            chunk_index,
            embedding: Vec::new(),
        }
    }

    /// Attach the embedding computed for `content`
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = embedding;
        self
    }
}

/// A chunk returned by similarity search
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    /// The matched chunk
    pub chunk: Chunk,
    /// Cosine similarity to the query (higher is more similar)
    pub similarity: f32,
}
