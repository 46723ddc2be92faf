//! HTTP server implementation using Axum.

use std::sync::Arc;

use axum::{Router, routing::get};
use chrono_tz::Tz;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use certpost_core::config::GatewayConfig;

/// Shared state for the gateway server.
#[derive(Clone)]
pub struct AppState {
    /// Timestamps in the health report use the sweep timezone.
    pub timezone: Tz,
    pub start_time: std::time::Instant,
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    let shared = Arc::new(state);
    Router::new()
        .route("/", get(super::routes::health))
        .route("/health", get(super::routes::health))
        .layer(
            CorsLayer::new()
                .allow_methods([axum::http::Method::GET])
                .allow_headers(Any)
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

/// Start the HTTP server; runs until the process exits.
pub async fn start(config: &GatewayConfig, timezone: Tz) -> anyhow::Result<()> {
    let state = AppState {
        timezone,
        start_time: std::time::Instant::now(),
    };
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🌐 Gateway server listening on http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
