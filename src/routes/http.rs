// GET handlers: version, health, combined stats and per-sampler sub-resources

use axum::{Json, extract::State, response::IntoResponse};

use super::AppState;
use crate::models::{ApiResponse, HealthResponse};
use crate::version::{NAME, VERSION};

/// GET /version: returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /health: liveness; `mockMode` only appears when mock data is served.
pub(super) async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        ok: true,
        mock_mode: state.aggregator.is_mock().then_some(true),
    })
}

/// GET /stats: a freshly aggregated snapshot.
pub(super) async fn stats_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mock = state.aggregator.is_mock();
    Json(ApiResponse::ok(state.aggregator.collect().await, mock))
}

pub(super) async fn host_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mock = state.aggregator.is_mock();
    Json(ApiResponse::ok(state.aggregator.host().await, mock))
}

pub(super) async fn containers_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mock = state.aggregator.is_mock();
    Json(ApiResponse::ok(state.aggregator.containers().await, mock))
}

pub(super) async fn services_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mock = state.aggregator.is_mock();
    Json(ApiResponse::ok(state.aggregator.services().await, mock))
}
