// Client-side derived history point

use serde::{Deserialize, Serialize};

/// One chart point derived from a received snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPoint {
    /// Snapshot time, epoch milliseconds.
    pub t: i64,
    /// Local wall-clock label, e.g. "12:34:56".
    pub label: String,
    pub cpu: f64,
    pub mem: f64,
    pub temp: Option<f64>,
    /// Bytes/sec; null until two samples exist or after a counter reset.
    pub rx_rate: Option<f64>,
    pub tx_rate: Option<f64>,
}
