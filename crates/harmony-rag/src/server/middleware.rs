//! Axum middleware driving the interceptor chain

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use std::time::Instant;

use super::interceptors::RequestMeta;
use super::state::AppState;

/// Client address as seen by the listener, `unknown` when unavailable
pub fn client_ip(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Runs every interceptor before the route, then logs the outcome
pub async fn guard(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let start = Instant::now();

    let meta = RequestMeta {
        method: request.method().clone(),
        path: request.uri().path().to_string(),
        client_ip: client_ip(&request),
        headers: request.headers().clone(),
    };

    if let Err(e) = state.interceptors().run(&meta) {
        tracing::warn!(
            "Rejected {} {} from {}: {}",
            meta.method,
            meta.path,
            meta.client_ip,
            e
        );
        return e.into_response();
    }

    let response = next.run(request).await;

    tracing::info!(
        "{} {} from {} -> {} in {:.3}s",
        meta.method,
        meta.path,
        meta.client_ip,
        response.status().as_u16(),
        start.elapsed().as_secs_f64()
    );

    response
}
