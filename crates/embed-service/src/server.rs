//! HTTP server setup.

use std::net::SocketAddr;

use axum::routing::{get, post};
use axum::Router;
use tracing::info;

use crate::health;
use crate::state::AppState;
use crate::vectorize;

/// Build the gateway router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/vectorize-text", post(vectorize::vectorize_text))
        .route("/vectorize-image", post(vectorize::vectorize_image))
        .route(
            "/vectorize-image/upload",
            post(vectorize::vectorize_image_upload),
        )
        .route("/healthz", get(health::healthz))
        .with_state(state)
}

/// Run the HTTP server until the process exits.
pub async fn run_server(
    addr: SocketAddr,
    state: AppState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP server ready on {}", addr);

    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// Run the HTTP server with graceful shutdown support.
///
/// Accepts a shutdown signal future that, when resolved, stops accepting
/// connections and lets in-flight requests drain.
pub async fn run_server_with_shutdown<F>(
    addr: SocketAddr,
    state: AppState,
    shutdown_signal: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    info!("Starting HTTP server on {} (with graceful shutdown)", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP server ready on {}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("HTTP server shutdown complete");
    Ok(())
}
