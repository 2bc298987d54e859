// Shared test helpers
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hostpulse::aggregator::Aggregator;
use hostpulse::docker_repo::MockContainers;
use hostpulse::host_repo::MockHost;
use hostpulse::models::*;
use hostpulse::probe_repo::mock_service_health;
use hostpulse::source::{MockSource, StatsSource};
use std::sync::Arc;
use std::time::Duration;

/// Mock snapshot with a single interface carrying the given counters.
pub fn snapshot_at(timestamp: DateTime<Utc>, rx_bytes: u64, tx_bytes: u64) -> Snapshot {
    let mut host = MockHost::new().next();
    host.network = NetworkStats {
        interfaces: vec![NetworkInterface {
            name: "eth0".into(),
            rx_bytes,
            tx_bytes,
        }],
    };
    Snapshot {
        timestamp,
        host,
        containers: MockContainers::new().next(),
        services: mock_service_health(),
    }
}

pub fn mock_aggregator() -> Aggregator {
    Aggregator::new(Arc::new(MockSource::new()), Duration::from_secs(5))
}

/// Hostname reported by `SlowSource` when the host sampler overran the deadline.
pub const DEGRADED_HOSTNAME: &str = "degraded";

/// Mock data behind per-sampler delays. Fallbacks are recognizable: a `DEGRADED_HOSTNAME` host,
/// an empty container list and an empty service list.
pub struct SlowSource {
    pub inner: MockSource,
    pub host_delay: Duration,
    pub container_delay: Duration,
    pub service_delay: Duration,
}

impl SlowSource {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MockSource::new(),
            host_delay: delay,
            container_delay: delay,
            service_delay: delay,
        }
    }

    /// Only the container sampler is slow.
    pub fn containers_only(delay: Duration) -> Self {
        Self {
            host_delay: Duration::ZERO,
            service_delay: Duration::ZERO,
            ..Self::new(delay)
        }
    }
}

#[async_trait]
impl StatsSource for SlowSource {
    async fn host_stats(&self) -> HostStats {
        tokio::time::sleep(self.host_delay).await;
        self.inner.host_stats().await
    }

    async fn container_stats(&self) -> ContainerStats {
        tokio::time::sleep(self.container_delay).await;
        self.inner.container_stats().await
    }

    async fn service_health(&self) -> ServiceHealthStats {
        tokio::time::sleep(self.service_delay).await;
        self.inner.service_health().await
    }

    fn host_fallback(&self) -> HostStats {
        let mut host = self.inner.host_fallback();
        host.system.hostname = DEGRADED_HOSTNAME.into();
        host
    }

    fn container_fallback(&self) -> ContainerStats {
        ContainerStats::new(Vec::new())
    }

    fn service_fallback(&self) -> ServiceHealthStats {
        ServiceHealthStats::new(Vec::new())
    }

    fn is_mock(&self) -> bool {
        true
    }
}
