//! Route handlers and the validated question extractor

pub mod chat;
pub mod generate;
pub mod health;

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    Json,
};

use crate::error::Error;
use crate::server::state::AppState;
use crate::types::QueryRequest;

/// JSON question body, checked against the configured length bounds.
///
/// Malformed JSON, a missing field and an out-of-range length all reject
/// with 422 before the handler runs. A body that outgrows the size limit
/// while being read rejects with 413.
#[derive(Debug)]
pub struct ValidatedQuery(pub QueryRequest);

#[async_trait]
impl FromRequest<AppState> for ValidatedQuery {
    type Rejection = Error;

    async fn from_request(request: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let Json(query) = Json::<QueryRequest>::from_request(request, state)
            .await
            .map_err(|rejection| body_rejection(rejection, state))?;

        query.validate(state.settings().max_question_length)?;
        Ok(Self(query))
    }
}

fn body_rejection(rejection: JsonRejection, state: &AppState) -> Error {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return Error::BodyTooLarge {
            max_size: state.settings().max_request_size,
        };
    }
    Error::validation(rejection.body_text())
}
