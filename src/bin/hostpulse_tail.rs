// Terminal consumer: follows the profiler's event stream and prints one line per snapshot.
//
// Usage: hostpulse-tail [URL]   (default http://127.0.0.1:8787/stats/stream)
// The token is read from SYSTEM_PROFILER_AUTH_TOKEN.

use anyhow::Result;
use hostpulse::client::format::{format_bps, format_bytes, format_percent, format_uptime};
use hostpulse::client::{EventStreamClient, StreamConsumer, TransportEvent};
use tokio::time::{Duration, MissedTickBehavior};
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://127.0.0.1:8787/stats/stream";
/// Freshness is re-evaluated at least this often, even while the stream is silent.
const STATUS_TICK: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let url = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_URL.into());
    let token = std::env::var("SYSTEM_PROFILER_AUTH_TOKEN").ok();
    let (mut rx, _handle) = EventStreamClient::new(url, token)?.spawn(16);
    let mut consumer = StreamConsumer::default();
    let mut clock = tokio::time::interval(STATUS_TICK);
    clock.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let now = tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else { break };
                let now = chrono::Utc::now();
                consumer.handle(&event, now);
                match &event {
                    TransportEvent::Message(msg) if msg.event == "message" => {
                        match consumer.error() {
                            Some(err) => eprintln!("{}", err),
                            None => print_line(&consumer, now),
                        }
                    }
                    TransportEvent::Message(_) | TransportEvent::Closed => {
                        if let Some(err) = consumer.error() {
                            eprintln!("{}", err);
                        }
                    }
                    TransportEvent::Error(e) => {
                        tracing::warn!(error = %e, "stream transport error");
                    }
                    TransportEvent::Connecting | TransportEvent::Opened => {}
                }
                now
            }
            _ = clock.tick() => chrono::Utc::now(),
            _ = tokio::signal::ctrl_c() => break,
        };
        if let Some(status) = consumer.status_change(now) {
            eprintln!("[{:?}] {}", status.state, status.freshness.label());
        }
    }
    Ok(())
}

fn print_line(consumer: &StreamConsumer, now: chrono::DateTime<chrono::Utc>) {
    let (Some(snapshot), Some(point)) = (consumer.last_good(), consumer.history().latest()) else {
        return;
    };
    let host = &snapshot.host;
    let temp = point
        .temp
        .map(|c| format!("{:.1}°C", c))
        .unwrap_or_else(|| "-".into());
    println!(
        "{} [{}] {} up {} | cpu {} mem {} ({}) temp {} | rx {} tx {} | containers {}/{} unhealthy {} | services {}",
        point.label,
        consumer.freshness(now).label(),
        host.system.hostname,
        format_uptime(host.system.uptime_seconds),
        format_percent(Some(point.cpu), 1),
        format_percent(Some(point.mem), 1),
        format_bytes(host.memory.used_bytes as f64),
        temp,
        format_bps(point.rx_rate),
        format_bps(point.tx_rate),
        snapshot.containers.summary.running,
        snapshot.containers.summary.total,
        snapshot.containers.summary.unhealthy,
        if snapshot.services.all_healthy { "ok" } else { "degraded" },
    );
}
