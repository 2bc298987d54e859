// HTTP + Server-Sent Events routes

mod auth;
mod http;
mod sse;

pub use auth::AUTH_HEADER;

use axum::{Router, middleware, routing::get};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};

use crate::aggregator::Aggregator;
use crate::config::AppConfig;
use crate::models::Snapshot;
use crate::worker::LatestSnapshot;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) aggregator: Aggregator,
    pub(crate) stats_tx: broadcast::Sender<Arc<Snapshot>>,
    pub(crate) latest: LatestSnapshot,
    pub(crate) sse_connections: Arc<AtomicUsize>,
    pub(crate) auth_token: Option<Arc<str>>,
}

pub fn app(
    aggregator: Aggregator,
    stats_tx: broadcast::Sender<Arc<Snapshot>>,
    latest: LatestSnapshot,
    sse_connections: Arc<AtomicUsize>,
    config: &AppConfig,
) -> Router {
    let state = AppState {
        aggregator,
        stats_tx,
        latest,
        sse_connections,
        auth_token: config.auth_token().map(Arc::from),
    };
    Router::new()
        .route("/", get(|| async { "Hello from hostpulse!" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/health", get(http::health_handler)) // GET /health
        .route("/stats", get(http::stats_handler)) // GET /stats
        .route("/stats/stream", get(sse::stats_stream)) // SSE /stats/stream
        .route("/host", get(http::host_handler)) // GET /host
        .route("/containers", get(http::containers_handler)) // GET /containers
        .route("/services", get(http::services_handler)) // GET /services
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_token,
        ))
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
