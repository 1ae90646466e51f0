//! harmony-rag: clinic assistant backend
//!
//! Answers questions about the clinic from an indexed PDF. A question is
//! embedded, the nearest chunks are pulled from a local vector index and
//! handed to a hosted chat model together with the question. The HTTP API
//! (`GET /`, `POST /generate/`, `POST /chat/`) sits behind CORS, a request
//! size guard, an API key guard and a per-client rate limiter.

pub mod chat;
pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod logging;
pub mod providers;
pub mod rate_limit;
pub mod retrieval;
pub mod security;
pub mod server;
pub mod types;

pub use config::Settings;
pub use error::{Error, Result};
pub use types::{
    document::{Chunk, ScoredChunk},
    query::QueryRequest,
    response::{HealthResponse, QueryResponse},
};
