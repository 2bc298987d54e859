// Sampling strategy: live samplers or deterministic mock data, chosen once at startup

use crate::config::AppConfig;
use crate::docker_repo::{DockerRepo, MockContainers};
use crate::host_repo::{HostRepo, MockHost};
use crate::models::{ContainerStats, HostStats, ServiceHealthStats};
use crate::probe_repo::{ProbeRepo, mock_service_health};
use async_trait::async_trait;
use std::sync::Arc;

/// The three samplers behind one interface. Implementations degrade internally and never fail.
///
/// The `*_fallback` methods must return immediately; they stand in for a sampler that overran
/// the tick deadline.
#[async_trait]
pub trait StatsSource: Send + Sync {
    async fn host_stats(&self) -> HostStats;
    async fn container_stats(&self) -> ContainerStats;
    async fn service_health(&self) -> ServiceHealthStats;
    fn host_fallback(&self) -> HostStats;
    fn container_fallback(&self) -> ContainerStats;
    fn service_fallback(&self) -> ServiceHealthStats;
    fn is_mock(&self) -> bool;
}

/// Real samplers: /proc + /sys, the Docker control socket, and network probes.
pub struct LiveSource {
    pub host: HostRepo,
    pub docker: DockerRepo,
    pub probes: ProbeRepo,
}

impl LiveSource {
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        Ok(Self {
            host: HostRepo::new(&config.host),
            docker: DockerRepo::connect(&config.docker),
            probes: ProbeRepo::new(&config.services)?,
        })
    }
}

#[async_trait]
impl StatsSource for LiveSource {
    async fn host_stats(&self) -> HostStats {
        self.host.sample().await
    }

    async fn container_stats(&self) -> ContainerStats {
        self.docker.container_stats().await
    }

    async fn service_health(&self) -> ServiceHealthStats {
        self.probes.service_health().await
    }

    fn host_fallback(&self) -> HostStats {
        self.host.degraded()
    }

    fn container_fallback(&self) -> ContainerStats {
        self.docker.fallback()
    }

    fn service_fallback(&self) -> ServiceHealthStats {
        self.probes.timed_out()
    }

    fn is_mock(&self) -> bool {
        false
    }
}

/// Deterministic cyclic data for development hosts.
#[derive(Debug, Default)]
pub struct MockSource {
    host: MockHost,
    containers: MockContainers,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StatsSource for MockSource {
    async fn host_stats(&self) -> HostStats {
        self.host.next()
    }

    async fn container_stats(&self) -> ContainerStats {
        self.containers.next()
    }

    async fn service_health(&self) -> ServiceHealthStats {
        mock_service_health()
    }

    fn host_fallback(&self) -> HostStats {
        self.host.next()
    }

    fn container_fallback(&self) -> ContainerStats {
        self.containers.next()
    }

    fn service_fallback(&self) -> ServiceHealthStats {
        mock_service_health()
    }

    fn is_mock(&self) -> bool {
        true
    }
}

/// Picks the strategy from the effective mock-mode flag.
pub fn from_config(config: &AppConfig) -> anyhow::Result<Arc<dyn StatsSource>> {
    if config.mock_mode() {
        tracing::info!("mock mode enabled; serving synthetic stats");
        Ok(Arc::new(MockSource::new()))
    } else {
        Ok(Arc::new(LiveSource::from_config(config)?))
    }
}
