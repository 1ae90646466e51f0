//! HTTP server for the assistant backend

pub mod interceptors;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::any::Any;
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Settings;
use crate::error::{Error, Result};
use state::AppState;

/// How often stale rate limit windows are dropped
const RATE_LIMIT_PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Build the router with all routes and middleware.
///
/// Layers from the outside in: CORS, tracing, panic catcher, body limit,
/// interceptor chain.
pub fn build_router(state: AppState) -> Router {
    let settings = state.settings();
    let body_limit = usize::try_from(settings.max_request_size).unwrap_or(usize::MAX);
    let cors = cors_layer(&settings.cors_origins);

    Router::new()
        .route("/", get(routes::health::health_check))
        .route("/generate/", post(routes::generate::generate_response))
        .route("/chat/", post(routes::chat::chat_response))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::guard,
        ))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// CORS for the configured origins, with credentials
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter(|origin| {
            // a wildcard cannot be combined with credentials
            if origin.as_str() == "*" {
                tracing::warn!("Ignoring wildcard CORS origin; list origins explicitly");
                return false;
            }
            true
        })
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("Handler panicked: {}", message);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "Internal server error",
            "detail": "An unexpected error occurred",
        })),
    )
        .into_response()
}

/// Assistant HTTP server
pub struct RagServer {
    state: AppState,
}

impl RagServer {
    /// Create a server backed by the configured model service and index
    pub async fn new(settings: Settings) -> Result<Self> {
        let state = AppState::from_settings(settings).await?;
        Ok(Self { state })
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = self
            .address()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid address: {}", e)))?;

        let limiter = self.state.limiter().clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(RATE_LIMIT_PURGE_INTERVAL);
            loop {
                interval.tick().await;
                let purged = limiter.purge_expired();
                if purged > 0 {
                    tracing::debug!("Purged {} expired rate limit windows", purged);
                }
            }
        });

        let router = build_router(self.state);

        tracing::info!("Starting server on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Config(format!("Failed to bind: {}", e)))?;

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .map_err(|e| Error::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        self.state.settings().address()
    }
}
