//! Provider abstractions for embeddings, chat completion and vector storage
//!
//! The HTTP layer only talks to these traits, so the OpenAI client and the
//! local index can be swapped for fakes in tests.

pub mod embedding;
pub mod llm;
pub mod local;
pub mod openai;
pub mod vector_store;

pub use embedding::EmbeddingProvider;
pub use llm::{ChatMessage, ChatRole, LlmProvider};
pub use local::LocalVectorStore;
pub use openai::OpenAiClient;
pub use vector_store::VectorStoreProvider;
