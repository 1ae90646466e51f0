//! Application state for the HTTP server

use std::sync::Arc;

use crate::chat::CannedResponses;
use crate::config::Settings;
use crate::error::Result;
use crate::generation::AnswerPipeline;
use crate::providers::{
    EmbeddingProvider, LlmProvider, LocalVectorStore, OpenAiClient, VectorStoreProvider,
};
use crate::rate_limit::RateLimiter;
use crate::retrieval::Retriever;

use super::interceptors::InterceptorChain;

/// Shared application state, built once at startup and injected into handlers
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Loaded configuration
    settings: Settings,
    /// Retrieve-then-complete pipeline for `/generate/`
    pipeline: AnswerPipeline,
    /// Lookup table for `/chat/`
    canned: CannedResponses,
    /// Pre-dispatch checks
    interceptors: InterceptorChain,
    /// Rate limit windows, shared with the rate limit interceptor
    limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Assemble state from already-built collaborators
    pub fn new(
        settings: Settings,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Self {
        let retriever = Retriever::new(embedder, store, settings.vector_db.top_k);
        let pipeline = AnswerPipeline::new(
            retriever,
            llm,
            settings.llm.temperature,
            settings.max_question_length,
        );

        let limiter = Arc::new(RateLimiter::new());
        let interceptors = InterceptorChain::from_settings(&settings, Arc::clone(&limiter));

        Self {
            inner: Arc::new(AppStateInner {
                settings,
                pipeline,
                canned: CannedResponses::default(),
                interceptors,
                limiter,
            }),
        }
    }

    /// Connect to the configured model service and open the local index
    pub async fn from_settings(settings: Settings) -> Result<Self> {
        tracing::info!("Initializing application state...");

        let client = Arc::new(OpenAiClient::new(&settings.llm)?);
        tracing::info!(
            "Model client ready ({} / {})",
            settings.llm.chat_model,
            settings.llm.embedding_model
        );

        let store = Arc::new(LocalVectorStore::open(&settings.vector_db.storage_path)?);
        let chunks = store.len().await?;
        tracing::info!(
            "Vector store {} ready with {} chunks",
            store.name(),
            chunks
        );

        if !client.health_check().await {
            tracing::warn!(
                "Model service at {} did not answer the health check",
                settings.llm.base_url
            );
        }

        Ok(Self::new(settings, client.clone(), store, client))
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub fn pipeline(&self) -> &AnswerPipeline {
        &self.inner.pipeline
    }

    pub fn canned(&self) -> &CannedResponses {
        &self.inner.canned
    }

    pub fn interceptors(&self) -> &InterceptorChain {
        &self.inner.interceptors
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.inner.limiter
    }
}
