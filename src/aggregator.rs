// Snapshot aggregation: run the three samplers concurrently and stamp the result

use crate::models::{ContainerStats, HostStats, ServiceHealthStats, Snapshot};
use crate::source::StatsSource;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct Aggregator {
    source: Arc<dyn StatsSource>,
    deadline: Duration,
}

impl Aggregator {
    /// `deadline` bounds each sampler on its own; an overrunning sampler contributes its
    /// degraded value instead of holding back the others.
    pub fn new(source: Arc<dyn StatsSource>, deadline: Duration) -> Self {
        Self { source, deadline }
    }

    pub fn is_mock(&self) -> bool {
        self.source.is_mock()
    }

    /// Fan out to host, container and service samplers and join them into a new snapshot.
    pub async fn collect(&self) -> Snapshot {
        let (host, containers, services) =
            tokio::join!(self.host(), self.containers(), self.services());
        Snapshot {
            timestamp: chrono::Utc::now(),
            host,
            containers,
            services,
        }
    }

    pub async fn host(&self) -> HostStats {
        self.bounded("host", self.source.host_stats(), || {
            self.source.host_fallback()
        })
        .await
    }

    pub async fn containers(&self) -> ContainerStats {
        self.bounded("containers", self.source.container_stats(), || {
            self.source.container_fallback()
        })
        .await
    }

    pub async fn services(&self) -> ServiceHealthStats {
        self.bounded("services", self.source.service_health(), || {
            self.source.service_fallback()
        })
        .await
    }

    async fn bounded<T>(
        &self,
        sampler: &'static str,
        fut: impl Future<Output = T>,
        fallback: impl FnOnce() -> T,
    ) -> T {
        match tokio::time::timeout(self.deadline, fut).await {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(
                    sampler,
                    timeout_ms = self.deadline.as_millis() as u64,
                    operation = "collect",
                    "sampler overran the tick deadline; using degraded data"
                );
                fallback()
            }
        }
    }
}
