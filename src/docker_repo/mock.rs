// Mock container stats: four healthy containers whose usage cycles through sampled values

use crate::models::{ContainerHealth, ContainerInfo, ContainerState, ContainerStats};
use std::sync::atomic::{AtomicUsize, Ordering};

const MEMORY_LIMIT: u64 = 8_217_448_448;

struct Fixture {
    id: &'static str,
    name: &'static str,
    image: &'static str,
    cpu: [f64; 10],
    memory_usage: [u64; 10],
    memory_percent: [f64; 10],
}

const FIXTURES: [Fixture; 4] = [
    Fixture {
        id: "abc123",
        name: "hostpulse-web-1",
        image: "hostpulse-web:latest",
        cpu: [
            0.0098, 0.0146, 0.0139, 0.0160, 1.6530, 0.0130, 0.0129, 0.0176, 0.0167, 0.0159,
        ],
        memory_usage: [
            1_148_194_816,
            1_150_000_000,
            1_145_000_000,
            1_152_000_000,
            1_146_000_000,
            1_151_000_000,
            1_147_000_000,
            1_153_000_000,
            1_148_000_000,
            1_150_000_000,
        ],
        memory_percent: [13.97, 14.0, 13.9, 14.1, 13.95, 14.05, 13.85, 14.15, 13.98, 14.02],
    },
    Fixture {
        id: "def456",
        name: "hostpulse-profiler-1",
        image: "hostpulse-profiler:latest",
        cpu: [
            0.0342, 1.8184, 0.4955, 0.1098, 0.0925, 0.0425, 0.0036, 0.1157, 0.0421, 0.0445,
        ],
        memory_usage: [
            57_614_336, 58_000_000, 57_000_000, 58_500_000, 57_500_000, 58_200_000, 57_200_000,
            58_800_000, 57_800_000, 58_300_000,
        ],
        memory_percent: [0.70, 0.71, 0.69, 0.72, 0.70, 0.71, 0.70, 0.72, 0.70, 0.71],
    },
    Fixture {
        id: "ghi789",
        name: "hostpulse-img-validator-1",
        image: "hostpulse/img-validator:stable",
        cpu: [
            0.0417, 0.0561, 0.0584, 0.0462, 0.0691, 0.0443, 0.0375, 0.0647, 10.5069, 0.0444,
        ],
        memory_usage: [
            314_736_640,
            315_000_000,
            314_000_000,
            316_000_000,
            314_500_000,
            315_500_000,
            314_200_000,
            316_200_000,
            314_800_000,
            315_200_000,
        ],
        memory_percent: [3.83, 3.84, 3.82, 3.86, 3.83, 3.85, 3.81, 3.87, 3.83, 3.85],
    },
    Fixture {
        id: "jkl012",
        name: "hostpulse-db-1",
        image: "postgres:17",
        cpu: [0.0, 0.0, 5.7808, 0.0, 0.3794, 0.0, 0.0026, 6.0050, 0.0, 0.0],
        memory_usage: [
            22_470_656, 22_500_000, 22_400_000, 22_600_000, 22_450_000, 22_550_000, 22_420_000,
            22_620_000, 22_480_000, 22_520_000,
        ],
        memory_percent: [0.27, 0.28, 0.27, 0.29, 0.275, 0.285, 0.27, 0.29, 0.28, 0.285],
    },
];

/// Deterministic container fixture; every call advances all containers one step.
#[derive(Debug, Default)]
pub struct MockContainers {
    tick: AtomicUsize,
}

impl MockContainers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> ContainerStats {
        let i = self.tick.fetch_add(1, Ordering::Relaxed) % 10;
        let containers = FIXTURES
            .iter()
            .map(|f| ContainerInfo {
                id: f.id.into(),
                name: f.name.into(),
                image: f.image.into(),
                status: "Up 2 hours".into(),
                state: ContainerState::Running,
                health: ContainerHealth::Healthy,
                restart_count: 0,
                cpu_percent: Some(f.cpu[i]),
                memory_usage_bytes: Some(f.memory_usage[i]),
                memory_limit_bytes: Some(MEMORY_LIMIT),
                memory_percent: Some(f.memory_percent[i]),
            })
            .collect();
        ContainerStats::new(containers)
    }
}
