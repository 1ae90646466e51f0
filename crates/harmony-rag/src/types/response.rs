//! Response bodies

use serde::{Deserialize, Serialize};

/// Body returned by `POST /generate/` and `POST /chat/`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryResponse {
    pub response: String,
}

impl QueryResponse {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

/// Body returned by `GET /`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub message: String,
}

impl HealthResponse {
    pub fn running() -> Self {
        Self {
            message: "Backend is running!".to_string(),
        }
    }
}
