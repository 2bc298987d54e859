// Dependent-service health models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceHealth {
    pub name: String,
    /// Probe target: the HTTP URL, or `tcp://host:port` for TCP probes.
    pub url: String,
    pub healthy: bool,
    pub response_time_ms: Option<u64>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceHealthStats {
    pub services: Vec<ServiceHealth>,
    pub all_healthy: bool,
}

impl ServiceHealthStats {
    pub fn new(services: Vec<ServiceHealth>) -> Self {
        let all_healthy = services.iter().all(|s| s.healthy);
        Self {
            services,
            all_healthy,
        }
    }
}
