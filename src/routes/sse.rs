// Server-Sent Events push stream

use axum::{
    extract::State,
    http::{HeaderName, header},
    response::{
        IntoResponse,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures_util::Stream;
use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::broadcast;

use super::AppState;
use crate::models::Snapshot;

/// Decrements the SSE connection count on drop (connect = +1, drop = -1).
struct SseGuard(Arc<AtomicUsize>);

impl Drop for SseGuard {
    fn drop(&mut self) {
        let active = self.0.fetch_sub(1, Ordering::Relaxed).saturating_sub(1);
        tracing::info!(active_connections = active, "Client disconnected from stats stream");
    }
}

/// SSE /stats/stream: replays the latest snapshot, then one event per worker tick.
pub(super) async fn stats_stream(State(state): State<AppState>) -> impl IntoResponse {
    let rx = state.stats_tx.subscribe();
    let initial = state.latest.read().await.clone();
    let active = state.sse_connections.fetch_add(1, Ordering::Relaxed) + 1;
    let guard = SseGuard(state.sse_connections.clone());
    tracing::info!(active_connections = active, "Client connected to stats stream");

    (
        [
            (HeaderName::from_static("x-accel-buffering"), "no"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Sse::new(event_stream(rx, initial, guard)).keep_alive(KeepAlive::default()),
    )
}

fn event_stream(
    mut rx: broadcast::Receiver<Arc<Snapshot>>,
    initial: Option<Arc<Snapshot>>,
    guard: SseGuard,
) -> impl Stream<Item = Result<Event, Infallible>> {
    async_stream::stream! {
        let _guard = guard;
        if let Some(snapshot) = initial.as_deref() {
            yield Ok(snapshot_event(snapshot));
        }
        loop {
            match rx.recv().await {
                Ok(snapshot) => {
                    yield Ok(snapshot_event(&snapshot));
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("stats stream client lagged, skipped {} events", n);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
}

/// Snapshot as a default `message` event; a snapshot that cannot be encoded becomes a typed
/// `error` event so the subscriber still sees the tick.
fn snapshot_event(snapshot: &Snapshot) -> Event {
    match serde_json::to_string(snapshot) {
        Ok(json) => Event::default().data(json),
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize snapshot");
            error_event(&format!("failed to serialize snapshot: {}", e))
        }
    }
}

fn error_event(message: &str) -> Event {
    Event::default()
        .event("error")
        .data(serde_json::json!({ "error": message }).to_string())
}
