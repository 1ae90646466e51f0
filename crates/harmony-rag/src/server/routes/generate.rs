//! POST /generate/ - answer a question from the indexed PDF

use axum::{extract::State, Json};
use std::time::Instant;

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::QueryResponse;

use super::ValidatedQuery;

pub async fn generate_response(
    State(state): State<AppState>,
    ValidatedQuery(request): ValidatedQuery,
) -> Result<Json<QueryResponse>> {
    let start = Instant::now();
    tracing::info!(
        "Generate request ({} chars)",
        request.question.chars().count()
    );

    let answer = state.pipeline().answer(&request.question).await?;

    tracing::info!(
        "Generated response ({} chars) in {}ms",
        answer.chars().count(),
        start.elapsed().as_millis()
    );

    Ok(Json(QueryResponse::new(answer)))
}
