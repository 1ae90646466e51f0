//! GET / - liveness check

use axum::Json;

use crate::types::HealthResponse;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::running())
}
