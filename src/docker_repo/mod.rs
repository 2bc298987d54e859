// Docker container stats via bollard over the engine's control socket

mod mock;
mod stats;

pub use mock::MockContainers;

use crate::config::DockerConfig;
use crate::models::{ContainerHealth, ContainerInfo, ContainerState, ContainerStats};
use bollard::Docker;
use bollard::query_parameters::{InspectContainerOptions, ListContainersOptions, StatsOptions};
use bollard::models::{ContainerInspectResponse, ContainerStatsResponse, ContainerSummary};
use futures_util::StreamExt;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{instrument, warn};

const SHORT_ID_LEN: usize = 12;

pub struct DockerRepo {
    docker: Option<Docker>,
    stack_label: String,
    stack_name: String,
    request_timeout: Duration,
    stats_timeout: Duration,
    fallback: MockContainers,
}

impl DockerRepo {
    /// Builds the client. Nothing is dialled until the first sample; a client that cannot be
    /// built leaves the repo permanently on mock data.
    pub fn connect(config: &DockerConfig) -> Self {
        let request_timeout = Duration::from_millis(config.request_timeout_ms);
        let docker = match Docker::connect_with_socket(
            &config.socket_path,
            request_timeout.as_secs().max(1),
            bollard::API_DEFAULT_VERSION,
        ) {
            Ok(d) => Some(d),
            Err(e) => {
                warn!(
                    error = %e,
                    socket = %config.socket_path,
                    "Docker client unavailable; container stats will use mock data"
                );
                None
            }
        };
        Self {
            docker,
            stack_label: config.stack_label.clone(),
            stack_name: config.stack_name.clone(),
            request_timeout,
            stats_timeout: Duration::from_millis(config.stats_timeout_ms),
            fallback: MockContainers::new(),
        }
    }

    /// Containers of this stack. An unreachable control socket falls back to mock data.
    #[instrument(skip(self), fields(repo = "docker", operation = "container_stats"))]
    pub async fn container_stats(&self) -> ContainerStats {
        match self.collect().await {
            Ok(stats) => stats,
            Err(e) => {
                warn!(error = %e, "Docker socket error, using mock container data");
                self.fallback.next()
            }
        }
    }

    /// Next mock fixture, served whenever the control socket cannot answer.
    pub fn fallback(&self) -> ContainerStats {
        self.fallback.next()
    }

    async fn collect(&self) -> anyhow::Result<ContainerStats> {
        let docker = self
            .docker
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("no Docker client"))?;

        let mut filters = HashMap::new();
        filters.insert(
            "label".to_string(),
            vec![format!("{}={}", self.stack_label, self.stack_name)],
        );
        let options = ListContainersOptions {
            all: true,
            filters: Some(filters),
            ..Default::default()
        };

        let listed = timeout(self.request_timeout, docker.list_containers(Some(options)))
            .await
            .map_err(|_| anyhow::anyhow!("list_containers timed out"))??;

        let infos =
            futures_util::future::join_all(listed.iter().map(|c| self.describe(docker, c))).await;
        Ok(ContainerStats::new(infos))
    }

    /// Inspect and (for running containers) one-shot stats, fetched in parallel. Any failure
    /// keeps the container with listing-only fields.
    async fn describe(&self, docker: &Docker, summary: &ContainerSummary) -> ContainerInfo {
        let id = summary.id.clone().unwrap_or_default();
        let listed_state = summary
            .state
            .as_ref()
            .map(|s| ContainerState::from_docker(&s.to_string()))
            .unwrap_or(ContainerState::Created);
        let basic = basic_info(summary, listed_state);

        let stats_fut = async {
            if listed_state == ContainerState::Running {
                self.one_shot_stats(docker, &id).await.map(Some)
            } else {
                Ok(None)
            }
        };
        let (inspect, stats) = tokio::join!(self.inspect(docker, &id), stats_fut);

        match (inspect, stats) {
            (Ok(inspect), Ok(stats)) => with_details(basic, &inspect, stats.as_ref()),
            (Err(e), _) | (_, Err(e)) => {
                tracing::debug!(
                    error = %e,
                    container = %basic.name,
                    "container details unavailable; reporting listing fields only"
                );
                basic
            }
        }
    }

    async fn inspect(&self, docker: &Docker, id: &str) -> anyhow::Result<ContainerInspectResponse> {
        let r = timeout(
            self.request_timeout,
            docker.inspect_container(id, None::<InspectContainerOptions>),
        )
        .await
        .map_err(|_| anyhow::anyhow!("inspect timed out"))??;
        Ok(r)
    }

    async fn one_shot_stats(
        &self,
        docker: &Docker,
        id: &str,
    ) -> anyhow::Result<ContainerStatsResponse> {
        let options = StatsOptions {
            stream: false,
            ..Default::default()
        };
        let mut stream = docker.stats(id, Some(options));
        match timeout(self.stats_timeout, stream.next()).await {
            Ok(Some(r)) => Ok(r?),
            Ok(None) => Err(anyhow::anyhow!("stats stream ended without a sample")),
            Err(_) => Err(anyhow::anyhow!("stats timed out")),
        }
    }
}

fn basic_info(summary: &ContainerSummary, state: ContainerState) -> ContainerInfo {
    let id = summary.id.as_deref().unwrap_or_default();
    let name = summary
        .names
        .as_ref()
        .and_then(|n| n.first())
        .map(|n| n.trim_start_matches('/').to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "unknown".into());
    ContainerInfo {
        id: id.chars().take(SHORT_ID_LEN).collect(),
        name,
        image: summary.image.clone().unwrap_or_default(),
        status: summary.status.clone().unwrap_or_default(),
        state,
        health: ContainerHealth::None,
        restart_count: 0,
        cpu_percent: None,
        memory_usage_bytes: None,
        memory_limit_bytes: None,
        memory_percent: None,
    }
}

fn with_details(
    mut info: ContainerInfo,
    inspect: &ContainerInspectResponse,
    stats: Option<&ContainerStatsResponse>,
) -> ContainerInfo {
    if let Some(state) = inspect.state.as_ref() {
        if let Some(status) = state.status.as_ref().map(|s| s.to_string())
            && !status.is_empty()
        {
            info.state = ContainerState::from_docker(&status);
        }
        let health = state
            .health
            .as_ref()
            .and_then(|h| h.status.as_ref())
            .map(|s| s.to_string());
        info.health = ContainerHealth::from_docker(health.as_deref());
    }
    info.restart_count = inspect
        .restart_count
        .map(|n| n.clamp(0, u32::MAX as i64) as u32)
        .unwrap_or(0);
    if let Some(stats) = stats {
        let usage = stats::process_statistics(stats);
        info.cpu_percent = Some(usage.cpu_percent);
        info.memory_usage_bytes = usage.memory_usage_bytes;
        info.memory_limit_bytes = usage.memory_limit_bytes;
        info.memory_percent = usage.memory_percent;
    }
    info
}
