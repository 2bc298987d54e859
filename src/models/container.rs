// Docker container models

use serde::{Deserialize, Serialize};

/// Container lifecycle state; serializes to lowercase JSON (e.g. "running").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerState {
    Running,
    Exited,
    Paused,
    Restarting,
    Dead,
    Created,
}

impl ContainerState {
    /// Parse from Docker API state string (e.g. "running", "exited").
    /// Anything unrecognised (including "removing") maps to `Created`.
    pub fn from_docker(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "running" => ContainerState::Running,
            "exited" => ContainerState::Exited,
            "paused" => ContainerState::Paused,
            "restarting" => ContainerState::Restarting,
            "dead" => ContainerState::Dead,
            _ => ContainerState::Created,
        }
    }

    /// Exited and dead containers count as stopped in the summary.
    pub fn is_stopped(self) -> bool {
        matches!(self, ContainerState::Exited | ContainerState::Dead)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerHealth {
    Healthy,
    Unhealthy,
    Starting,
    None,
}

impl ContainerHealth {
    /// Parse from Docker health status; missing or unknown means no healthcheck.
    pub fn from_docker(s: Option<&str>) -> Self {
        match s.map(str::to_lowercase).as_deref() {
            Some("healthy") => ContainerHealth::Healthy,
            Some("unhealthy") => ContainerHealth::Unhealthy,
            Some("starting") => ContainerHealth::Starting,
            _ => ContainerHealth::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerInfo {
    pub id: String,
    pub name: String,
    pub image: String,
    /// Human readable status from the listing, e.g. "Up 2 hours".
    pub status: String,
    pub state: ContainerState,
    pub health: ContainerHealth,
    pub restart_count: u32,
    pub cpu_percent: Option<f64>,
    pub memory_usage_bytes: Option<u64>,
    pub memory_limit_bytes: Option<u64>,
    pub memory_percent: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSummary {
    pub total: u32,
    pub running: u32,
    pub stopped: u32,
    pub unhealthy: u32,
}

impl ContainerSummary {
    pub fn from_containers(containers: &[ContainerInfo]) -> Self {
        containers
            .iter()
            .fold(ContainerSummary::default(), |mut acc, c| {
                acc.total += 1;
                if c.state == ContainerState::Running {
                    acc.running += 1;
                } else if c.state.is_stopped() {
                    acc.stopped += 1;
                }
                if c.health == ContainerHealth::Unhealthy {
                    acc.unhealthy += 1;
                }
                acc
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerStats {
    pub containers: Vec<ContainerInfo>,
    pub summary: ContainerSummary,
}

impl ContainerStats {
    /// Builds the stats with a summary folded from `containers`, so the two never disagree.
    pub fn new(containers: Vec<ContainerInfo>) -> Self {
        let summary = ContainerSummary::from_containers(&containers);
        Self {
            containers,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container(state: ContainerState, health: ContainerHealth) -> ContainerInfo {
        ContainerInfo {
            id: "abc".into(),
            name: "c".into(),
            image: "img".into(),
            status: String::new(),
            state,
            health,
            restart_count: 0,
            cpu_percent: None,
            memory_usage_bytes: None,
            memory_limit_bytes: None,
            memory_percent: None,
        }
    }

    #[test]
    fn summary_is_consistent_for_every_state_mix() {
        let states = [
            ContainerState::Running,
            ContainerState::Exited,
            ContainerState::Paused,
            ContainerState::Restarting,
            ContainerState::Dead,
            ContainerState::Created,
        ];
        let healths = [
            ContainerHealth::Healthy,
            ContainerHealth::Unhealthy,
            ContainerHealth::Starting,
            ContainerHealth::None,
        ];
        let mut list = Vec::new();
        for (i, s) in states.iter().enumerate() {
            for h in &healths[..(i % healths.len()) + 1] {
                list.push(container(*s, *h));
                let stats = ContainerStats::new(list.clone());
                let sum = stats.summary;
                assert_eq!(sum.total as usize, list.len());
                assert!(sum.running + sum.stopped <= sum.total);
                assert!(sum.unhealthy <= sum.total);
            }
        }
    }

    #[test]
    fn summary_counts_exited_and_dead_as_stopped() {
        let stats = ContainerStats::new(vec![
            container(ContainerState::Running, ContainerHealth::Healthy),
            container(ContainerState::Exited, ContainerHealth::None),
            container(ContainerState::Dead, ContainerHealth::None),
            container(ContainerState::Paused, ContainerHealth::Unhealthy),
        ]);
        assert_eq!(
            stats.summary,
            ContainerSummary {
                total: 4,
                running: 1,
                stopped: 2,
                unhealthy: 1,
            }
        );
    }

    #[test]
    fn state_and_health_parse_docker_strings() {
        assert_eq!(ContainerState::from_docker("RUNNING"), ContainerState::Running);
        assert_eq!(ContainerState::from_docker("dead"), ContainerState::Dead);
        assert_eq!(ContainerState::from_docker("removing"), ContainerState::Created);
        assert_eq!(
            ContainerHealth::from_docker(Some("unhealthy")),
            ContainerHealth::Unhealthy
        );
        assert_eq!(ContainerHealth::from_docker(Some("")), ContainerHealth::None);
        assert_eq!(ContainerHealth::from_docker(None), ContainerHealth::None);
    }
}
