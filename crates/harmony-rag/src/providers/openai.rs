//! OpenAI-compatible client for embeddings and chat completion
//!
//! Failures surface directly to the caller; there is no retry.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{LlmConfig, Secret};
use crate::error::{Error, ModelError, Result};

use super::embedding::EmbeddingProvider;
use super::llm::{ChatMessage, LlmProvider};

/// Texts sent per `/embeddings` request when embedding in bulk
const EMBEDDING_BATCH_SIZE: usize = 256;

/// Client for an OpenAI-compatible REST API
pub struct OpenAiClient {
    /// HTTP client
    client: Client,
    /// API base URL without trailing slash
    base_url: String,
    /// Provider API key
    api_key: Secret,
    /// Chat completion model
    chat_model: String,
    /// Embedding model
    embedding_model: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Serialize)]
struct EmbeddingBatchRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

/// Embeddings in input order; the API tags each one with its input index.
fn ordered_embeddings(
    mut data: Vec<EmbeddingData>,
    expected: usize,
) -> std::result::Result<Vec<Vec<f32>>, ModelError> {
    if data.len() != expected {
        return Err(ModelError::Decode(format!(
            "expected {} embeddings, got {}",
            expected,
            data.len()
        )));
    }
    if data.iter().any(|d| d.embedding.is_empty()) {
        return Err(ModelError::Empty("embedding"));
    }

    data.sort_by_key(|d| d.index);
    Ok(data.into_iter().map(|d| d.embedding).collect())
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiClient {
    /// Create a new client
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        if config.api_key.is_empty() {
            tracing::warn!("OPENAI_API_KEY is not set; model requests will likely be rejected");
        }

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            chat_model: config.chat_model.clone(),
            embedding_model: config.embedding_model.clone(),
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        if self.api_key.is_empty() {
            request
        } else {
            request.bearer_auth(self.api_key.expose())
        }
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> std::result::Result<Response, ModelError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .authorized(self.client.post(&url))
            .json(body)
            .send()
            .await
            .map_err(|e| ModelError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Status { status, body });
        }

        Ok(response)
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiClient {
    async fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, ModelError> {
        let request = EmbeddingRequest {
            model: &self.embedding_model,
            input: text,
        };

        let response: EmbeddingResponse = self
            .post_json("/embeddings", &request)
            .await?
            .json()
            .await
            .map_err(|e| ModelError::Decode(e.to_string()))?;

        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .filter(|e| !e.is_empty())
            .ok_or(ModelError::Empty("embedding"))
    }

    async fn embed_batch(
        &self,
        texts: &[String],
    ) -> std::result::Result<Vec<Vec<f32>>, ModelError> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(EMBEDDING_BATCH_SIZE) {
            tracing::debug!(
                "Requesting {} embeddings from {}",
                batch.len(),
                self.embedding_model
            );

            let request = EmbeddingBatchRequest {
                model: &self.embedding_model,
                input: batch,
            };

            let response: EmbeddingResponse = self
                .post_json("/embeddings", &request)
                .await?
                .json()
                .await
                .map_err(|e| ModelError::Decode(e.to_string()))?;

            embeddings.extend(ordered_embeddings(response.data, batch.len())?);
        }

        Ok(embeddings)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[async_trait]
impl LlmProvider for OpenAiClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> std::result::Result<String, ModelError> {
        tracing::debug!(
            "Requesting completion from {} ({} messages)",
            self.chat_model,
            messages.len()
        );

        let request = ChatCompletionRequest {
            model: &self.chat_model,
            messages,
            temperature,
        };

        let response: ChatCompletionResponse = self
            .post_json("/chat/completions", &request)
            .await?
            .json()
            .await
            .map_err(|e| ModelError::Decode(e.to_string()))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(ModelError::Empty("completion"))
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/models", self.base_url);
        match self.authorized(self.client.get(&url)).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.chat_model
    }
}
