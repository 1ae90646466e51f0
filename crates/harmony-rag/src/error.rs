//! Error types for the assistant backend

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for backend operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failures reported by the embedding or chat-completion service
#[derive(Debug, Error)]
pub enum ModelError {
    /// The request never produced an HTTP response (connect, timeout, TLS)
    #[error("model request failed: {0}")]
    Request(String),

    /// The service answered with a non-success status
    #[error("model service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded
    #[error("failed to decode model response: {0}")]
    Decode(String),

    /// The service answered successfully but without any content
    #[error("model returned an empty {0}")]
    Empty(&'static str),
}

/// Failures reported by the vector store
#[derive(Debug, Error)]
pub enum VectorStoreError {
    /// Query embedding and stored embeddings disagree on dimensions
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Reading or writing the persisted index failed
    #[error("vector store storage error: {0}")]
    Storage(String),

    /// The persisted index exists but could not be decoded
    #[error("vector store index is corrupt: {0}")]
    Corrupt(String),

    /// The store could not serve the request
    #[error("vector store unavailable: {0}")]
    Unavailable(String),
}

/// Backend errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request body failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Malformed request metadata
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Generic retrieval-augmented generation failure
    #[error("RAG error: {0}")]
    Rag(String),

    /// Vector store failure
    #[error("Database error: {0}")]
    Database(#[from] VectorStoreError),

    /// Embedding or language model failure
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Client exceeded its request quota
    #[error("Rate limit exceeded: {detail}")]
    RateLimited { detail: String, retry_after: u64 },

    /// API key header absent
    #[error("API key is required")]
    MissingApiKey { header: String },

    /// API key header present but wrong
    #[error("Invalid API key")]
    InvalidApiKey { header: String },

    /// Declared body size above the configured maximum
    #[error("Request too large: {requested_size} bytes (max {max_size})")]
    RequestTooLarge { max_size: u64, requested_size: u64 },

    /// Body without a usable `Content-Length` ran past the configured maximum
    #[error("Request body exceeds {max_size} bytes")]
    BodyTooLarge { max_size: u64 },

    /// Source document could not be read or produced no text
    #[error("Parse error: {0}")]
    Parse(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a generic RAG error
    pub fn rag(message: impl Into<String>) -> Self {
        Self::Rag(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// HTTP status reported to the caller
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Model(_) => StatusCode::BAD_GATEWAY,
            Error::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Error::MissingApiKey { .. } | Error::InvalidApiKey { .. } => StatusCode::UNAUTHORIZED,
            Error::RequestTooLarge { .. } | Error::BodyTooLarge { .. } => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            Error::Config(_)
            | Error::Rag(_)
            | Error::Parse(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            Error::Validation(msg) => json!({
                "error": "Validation error",
                "detail": msg,
            }),
            Error::BadRequest(msg) => json!({
                "error": "Bad request",
                "detail": msg,
            }),
            Error::Rag(msg) => {
                tracing::error!("RAG error: {}", msg);
                json!({
                    "error": "RAG error",
                    "detail": "Failed to generate a response",
                })
            }
            Error::Database(err) => {
                tracing::error!("Database error: {}", err);
                json!({
                    "error": "Database error",
                    "detail": "The document index is currently unavailable",
                })
            }
            Error::Model(err) => {
                tracing::error!("Model error: {}", err);
                json!({
                    "error": "Model error",
                    "detail": "The language model service failed to respond",
                })
            }
            Error::RateLimited { detail, retry_after } => json!({
                "error": "Rate limit exceeded",
                "detail": detail,
                "retry_after": retry_after,
            }),
            Error::MissingApiKey { header } => json!({
                "error": "API key is required",
                "detail": format!("Provide your API key in the '{}' header", header),
                "header": header,
            }),
            Error::InvalidApiKey { header } => json!({
                "error": "Invalid API key",
                "detail": format!("The key supplied in the '{}' header is not valid", header),
                "header": header,
            }),
            Error::RequestTooLarge {
                max_size,
                requested_size,
            } => json!({
                "error": "Request too large",
                "detail": format!(
                    "Request body of {} bytes exceeds the limit of {} bytes",
                    requested_size, max_size
                ),
                "max_size": max_size,
                "requested_size": requested_size,
            }),
            Error::BodyTooLarge { max_size } => json!({
                "error": "Request too large",
                "detail": format!("Request body exceeds the limit of {} bytes", max_size),
                "max_size": max_size,
            }),
            Error::Config(_)
            | Error::Parse(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::Internal(_) => {
                tracing::error!("Internal error: {}", self);
                json!({
                    "error": "Internal server error",
                    "detail": "An unexpected error occurred",
                })
            }
        };

        let mut response = (status, Json(body)).into_response();

        if let Error::RateLimited { retry_after, .. } = &self {
            if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}
