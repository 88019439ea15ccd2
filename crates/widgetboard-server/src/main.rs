//! Widgetboard HTTP Server
//!
//! Serves the in-memory widget store over a small REST API. State lives for
//! the lifetime of the process and is never persisted.

mod api;
mod config;
mod dto;

use api::AppState;
use config::ServerConfig;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "widgetboard_server=info,widgetboard_core=info,tower_http=info".into()
            }),
        )
        .init();

    let config = ServerConfig::from_env();
    let addr = config.addr;
    let state = Arc::new(AppState::new(config));

    let app = api::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Widgetboard server listening on {}", addr);
    info!("Widget API: http://localhost:{}/api/v1/widgets", addr.port());

    axum::serve(listener, app).await
}
