// Dashboard-side state machine driven by transport events

use chrono::{DateTime, Local, Utc};
use serde::Deserialize;

use super::freshness::Freshness;
use super::history::{HISTORY_MAX, History};
use super::transport::TransportEvent;
use crate::models::{HistoryPoint, Snapshot};

pub const PARSE_ERROR: &str = "Failed to parse stats";
pub const CONNECTION_LOST: &str = "Connection lost. Reconnecting...";

/// Observable connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    /// Open, nothing received on this connection yet.
    Connected,
    /// Open and delivering snapshots.
    Receiving,
    /// Open, but the last message is older than the warm window.
    Stalled,
}

/// Connection state and freshness tier at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub state: ConnectionState,
    pub freshness: Freshness,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Link {
    Down,
    Connecting,
    Open { last_message: Option<DateTime<Utc>> },
}

#[derive(Debug, Clone, Copy)]
struct NetSample {
    t_ms: i64,
    rx: u64,
    tx: u64,
}

#[derive(Deserialize)]
struct ErrorPayload {
    error: String,
}

pub struct StreamConsumer {
    link: Link,
    current: Option<Snapshot>,
    last_good: Option<Snapshot>,
    history: History<HistoryPoint>,
    last_net: Option<NetSample>,
    error: Option<String>,
    reported: Option<Status>,
}

impl Default for StreamConsumer {
    fn default() -> Self {
        Self::new(HISTORY_MAX)
    }
}

impl StreamConsumer {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            link: Link::Down,
            current: None,
            last_good: None,
            history: History::new(history_capacity),
            last_net: None,
            error: None,
            reported: None,
        }
    }

    /// Applies one transport event. `now` is the receive time.
    pub fn handle(&mut self, event: &TransportEvent, now: DateTime<Utc>) {
        match event {
            TransportEvent::Connecting => self.link = Link::Connecting,
            TransportEvent::Opened => {
                self.link = Link::Open { last_message: None };
                self.error = None;
            }
            TransportEvent::Message(msg) => {
                if msg.event == "error" {
                    self.error = Some(match serde_json::from_str::<ErrorPayload>(&msg.data) {
                        Ok(payload) => payload.error,
                        Err(_) => msg.data.clone(),
                    });
                    return;
                }
                if msg.data.is_empty() {
                    return;
                }
                match serde_json::from_str::<Option<Snapshot>>(&msg.data) {
                    Ok(Some(snapshot)) => {
                        if let Link::Open { last_message } = &mut self.link {
                            *last_message = Some(now);
                        }
                        self.ingest(snapshot);
                    }
                    Ok(None) => self.current = None,
                    Err(e) => {
                        tracing::debug!(error = %e, "failed to parse stats message");
                        self.error = Some(PARSE_ERROR.into());
                    }
                }
            }
            TransportEvent::Error(_) | TransportEvent::Closed => {
                self.link = Link::Down;
                self.error = Some(CONNECTION_LOST.into());
            }
        }
    }

    fn ingest(&mut self, snapshot: Snapshot) {
        let point = self.history_point(&snapshot);
        self.history.push(point);
        self.error = None;
        self.last_good = Some(snapshot.clone());
        self.current = Some(snapshot);
    }

    fn history_point(&mut self, snapshot: &Snapshot) -> HistoryPoint {
        let t_ms = snapshot.timestamp.timestamp_millis();
        let (rx, tx) = snapshot.host.network.totals();
        let (rx_rate, tx_rate) = match self.last_net {
            Some(prev) => net_rates(prev, t_ms, rx, tx),
            None => (None, None),
        };
        self.last_net = Some(NetSample { t_ms, rx, tx });

        let temperature = &snapshot.host.temperature;
        HistoryPoint {
            t: t_ms,
            label: time_label(snapshot.timestamp),
            cpu: snapshot.host.cpu.usage_percent,
            mem: snapshot.host.memory.usage_percent,
            temp: temperature.cpu_celsius.filter(|_| temperature.available),
            rx_rate,
            tx_rate,
        }
    }

    pub fn state(&self, now: DateTime<Utc>) -> ConnectionState {
        match self.link {
            Link::Down => ConnectionState::Disconnected,
            Link::Connecting => ConnectionState::Connecting,
            Link::Open { last_message: None } => ConnectionState::Connected,
            Link::Open {
                last_message: Some(at),
            } => match (now - at).to_std() {
                Ok(age) if age >= super::freshness::WARM_WITHIN => ConnectionState::Stalled,
                _ => ConnectionState::Receiving,
            },
        }
    }

    /// Worst tier until a snapshot arrives on the current connection.
    pub fn freshness(&self, now: DateTime<Utc>) -> Freshness {
        let delivering = matches!(
            self.link,
            Link::Open {
                last_message: Some(_)
            }
        );
        let age = self
            .last_good
            .as_ref()
            .map(|s| (now - s.timestamp).to_std().unwrap_or_default());
        Freshness::classify(delivering, age)
    }

    pub fn status(&self, now: DateTime<Utc>) -> Status {
        Status {
            state: self.state(now),
            freshness: self.freshness(now),
        }
    }

    /// Status at `now` if it differs from the one last returned here. Call it on a timer as well
    /// as after events: ageing alone moves a quiet stream from Hot to Stale.
    pub fn status_change(&mut self, now: DateTime<Utc>) -> Option<Status> {
        let status = self.status(now);
        if self.reported == Some(status) {
            return None;
        }
        self.reported = Some(status);
        Some(status)
    }

    pub fn history(&self) -> &History<HistoryPoint> {
        &self.history
    }

    pub fn last_good(&self) -> Option<&Snapshot> {
        self.last_good.as_ref()
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.current.as_ref()
    }

    /// Connection banner or transient parse error.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Bytes/sec per direction; `None` on non-positive elapsed time or a counter that went backwards.
fn net_rates(prev: NetSample, t_ms: i64, rx: u64, tx: u64) -> (Option<f64>, Option<f64>) {
    let dt = (t_ms - prev.t_ms) as f64 / 1000.0;
    if dt <= 0.0 {
        return (None, None);
    }
    let rate = |now: u64, before: u64| now.checked_sub(before).map(|d| d as f64 / dt);
    (rate(rx, prev.rx), rate(tx, prev.tx))
}

fn time_label(t: DateTime<Utc>) -> String {
    t.with_timezone(&Local).format("%H:%M:%S").to_string()
}
