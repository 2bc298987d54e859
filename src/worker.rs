// Background sampling worker: one aggregation per tick, broadcast to every SSE subscriber.
// Ticks never overlap: each collection is awaited before the next tick is taken, and missed
// ticks are skipped rather than queued.

use crate::aggregator::Aggregator;
use crate::models::Snapshot;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{RwLock, broadcast};
use tokio::time::{Duration, Instant, interval};
use tracing::Instrument;

/// Rate limit for "no receivers" log line (avoid logging every tick when nobody is subscribed)
const NO_RECEIVERS_WARN_INTERVAL: Duration = Duration::from_secs(60);

/// Most recent snapshot, replayed to subscribers as soon as they connect.
pub type LatestSnapshot = Arc<RwLock<Option<Arc<Snapshot>>>>;

/// Aggregator, channels, and shutdown for the worker.
pub struct WorkerDeps {
    pub aggregator: Aggregator,
    pub tx: broadcast::Sender<Arc<Snapshot>>,
    pub latest: LatestSnapshot,
    pub sse_connections: Arc<AtomicUsize>,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

/// Worker timing and logging config.
pub struct WorkerConfig {
    pub sample_interval_ms: u64,
    /// How often to log app stats (real seconds).
    pub stats_log_interval_secs: u64,
}

/// Runs one aggregation, stores it as the latest snapshot and broadcasts it.
/// Returns whether at least one subscriber received it.
pub async fn run_one_tick(
    aggregator: &Aggregator,
    tx: &broadcast::Sender<Arc<Snapshot>>,
    latest: &LatestSnapshot,
) -> bool {
    let snapshot = Arc::new(aggregator.collect().await);
    *latest.write().await = Some(snapshot.clone());
    tx.send(snapshot).is_ok()
}

pub fn spawn(deps: WorkerDeps, config: WorkerConfig) -> tokio::task::JoinHandle<()> {
    let WorkerDeps {
        aggregator,
        tx,
        latest,
        sse_connections,
        mut shutdown_rx,
    } = deps;
    let WorkerConfig {
        sample_interval_ms,
        stats_log_interval_secs,
    } = config;

    let stats_log_interval = Duration::from_secs(stats_log_interval_secs);

    let worker_span = tracing::span!(tracing::Level::DEBUG, "worker", sample_interval_ms);

    tokio::spawn(async move {
        let mut tick = interval(Duration::from_millis(sample_interval_ms));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut stats_log_tick = interval(stats_log_interval);
        stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut snapshots_total: u64 = 0;
        let mut last_no_receivers_warn: Option<Instant> = None;

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let delivered = run_one_tick(&aggregator, &tx, &latest).await;
                    snapshots_total += 1;
                    if !delivered {
                        let should_warn = last_no_receivers_warn
                            .is_none_or(|t| t.elapsed() >= NO_RECEIVERS_WARN_INTERVAL);
                        if should_warn {
                            tracing::debug!(
                                operation = "broadcast_snapshot",
                                "No active stream clients; broadcast channel has no receivers"
                            );
                            last_no_receivers_warn = Some(Instant::now());
                        }
                    }
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("Worker shutting down");
                    break;
                }
                _ = stats_log_tick.tick() => {
                    tracing::info!(
                        sse_clients = sse_connections.load(Ordering::Relaxed),
                        snapshots_total,
                        mock_mode = aggregator.is_mock(),
                        "app stats"
                    );
                }
            }
        }
    }.instrument(worker_span))
}
