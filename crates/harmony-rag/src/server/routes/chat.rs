//! POST /chat/ - canned answers

use axum::{extract::State, Json};

use crate::security::sanitize_input;
use crate::server::state::AppState;
use crate::types::QueryResponse;

use super::ValidatedQuery;

pub async fn chat_response(
    State(state): State<AppState>,
    ValidatedQuery(request): ValidatedQuery,
) -> Json<QueryResponse> {
    let question = sanitize_input(&request.question, state.settings().max_question_length);
    let answer = state.canned().lookup(&question);

    Json(QueryResponse::new(answer))
}
