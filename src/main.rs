use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

mod aggregate;
mod config;
mod error;
mod handlers;
mod models;
mod upstream;

#[cfg(test)]
mod test_support;

use crate::config::Config;
use crate::upstream::HttpUpstream;

/// Shared application state. Cheap to clone; the upstream client is a
/// connection pool shared read-only by every request.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<HttpUpstream>,
    pub upstream_host: String,
    pub target_names: Arc<Vec<String>>,
    pub upstream_timeout: Duration,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (ignored in production where env vars are injected)
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,hello_consumer=debug".into()),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Hello Consumer  — Rust + Axum       ║");
    info!("║  fan-out · join · merge              ║");
    info!("╚══════════════════════════════════════╝");

    info!(
        upstream = %config.upstream_host,
        targets = ?config.targets,
        timeout_ms = config.upstream_timeout.as_millis(),
        "Upstream configured"
    );

    let state = AppState {
        upstream: Arc::new(HttpUpstream::new(config.upstream_timeout)?),
        upstream_host: config.upstream_host.clone(),
        target_names: Arc::new(config.targets.clone()),
        upstream_timeout: config.upstream_timeout,
    };

    let app = build_router(state);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    info!("Try: GET http://{}/", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::greetings::aggregate_greetings))
        .route("/health", get(handlers::health))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
