//! Health endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

/// Health response body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub cache: &'static str,
}

/// GET /healthz
///
/// Reports store liveness without failing the endpoint: a degraded cache is
/// visible here rather than masked, but the service itself is still up.
pub async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    let cache = match state.cache.ping().await {
        Ok(()) => "ok",
        Err(err) => {
            warn!(error = %err, "Health probe: store unreachable");
            "unavailable"
        }
    };

    Json(HealthResponse {
        status: "ok",
        cache,
    })
}
