//! Assistant HTTP server
//!
//! Run with: cargo run -p harmony-rag --bin harmony-server

use harmony_rag::{config::Settings, logging, server::RagServer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load settings: {}", e);
            std::process::exit(1);
        }
    };

    logging::init(&settings.logging)?;
    settings.log_loaded();

    tracing::info!("Environment: {}", settings.environment);
    if settings.development_mode {
        tracing::warn!("==============================================================");
        tracing::warn!("DEVELOPMENT MODE: API key enforcement is DISABLED.");
        tracing::warn!("Set ENVIRONMENT=production before exposing this server.");
        tracing::warn!("==============================================================");
    } else if settings.api_key.is_empty() {
        tracing::warn!(
            "API_KEY is not set; every request to a protected route will be rejected with 401"
        );
    }
    tracing::info!(
        "Rate limits: generate={}, chat={}, health={}",
        settings.rate_limits.generate,
        settings.rate_limits.chat,
        settings.rate_limits.health
    );

    let server = RagServer::new(settings).await?;

    tracing::info!("Endpoints:");
    tracing::info!("  GET  /           - health check");
    tracing::info!("  POST /generate/  - answer from the indexed PDF");
    tracing::info!("  POST /chat/      - canned answers");

    server.start().await?;

    Ok(())
}
