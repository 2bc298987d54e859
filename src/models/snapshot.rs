// Combined snapshot and HTTP envelopes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ContainerStats, HostStats, ServiceHealthStats};

/// One immutable, timestamped composite of host, container and service data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,
    pub host: HostStats,
    pub containers: ContainerStats,
    pub services: ServiceHealthStats,
}

/// Envelope for pull endpoints: `{ data, mockMode }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub data: T,
    pub mock_mode: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, mock_mode: bool) -> Self {
        Self { data, mock_mode }
    }
}

/// GET /health body; `mockMode` is only present when true.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mock_mode: Option<bool>,
}
