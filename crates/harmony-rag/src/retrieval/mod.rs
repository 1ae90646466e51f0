//! Similarity retrieval over the indexed PDF

pub mod retriever;

pub use retriever::Retriever;
