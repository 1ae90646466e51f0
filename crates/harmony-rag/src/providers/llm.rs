//! LLM provider trait for chat completion

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

/// One message of a chat prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Trait for chat-completion models
///
/// Implementations:
/// - `OpenAiClient`: OpenAI-compatible `/chat/completions` endpoint
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Complete the conversation and return the assistant text verbatim
    async fn complete(&self, messages: &[ChatMessage], temperature: f32)
        -> Result<String, ModelError>;

    /// Check if the provider is reachable
    async fn health_check(&self) -> bool;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
