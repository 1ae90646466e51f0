//! Core types shared by the server, the pipeline and the indexer

pub mod document;
pub mod query;
pub mod response;

pub use document::{Chunk, ScoredChunk};
pub use query::QueryRequest;
pub use response::{HealthResponse, QueryResponse};
