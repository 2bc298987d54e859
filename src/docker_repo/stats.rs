// Process raw Docker stats API response into per-container usage.

use crate::models::clamp_percent;
use bollard::models::ContainerStatsResponse;

/// Resource usage derived from one non-streaming stats response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ContainerUsage {
    pub cpu_percent: f64,
    pub memory_usage_bytes: Option<u64>,
    pub memory_limit_bytes: Option<u64>,
    pub memory_percent: Option<f64>,
}

/// CPU % = usage_delta / system_delta * online_cpus * 100, using the current and previous
/// cumulative readings the engine returns in a single response. A non-positive system delta
/// or a negative usage delta reports 0. Exposed for unit tests.
pub(crate) fn process_statistics(s: &ContainerStatsResponse) -> ContainerUsage {
    let cpu_percent = match (s.cpu_stats.as_ref(), s.precpu_stats.as_ref()) {
        (Some(cpu_stats), Some(precpu_stats)) => {
            let total = |u: Option<&bollard::models::ContainerCpuUsage>| {
                u.and_then(|u| u.total_usage).unwrap_or(0) as i128
            };
            let cpu_delta =
                total(cpu_stats.cpu_usage.as_ref()) - total(precpu_stats.cpu_usage.as_ref());
            let system_delta = cpu_stats.system_cpu_usage.unwrap_or(0) as i128
                - precpu_stats.system_cpu_usage.unwrap_or(0) as i128;
            let online = match cpu_stats.online_cpus {
                Some(n) if n > 0 => n as f64,
                _ => 1.0,
            };
            if system_delta <= 0 || cpu_delta < 0 {
                0.0
            } else {
                (cpu_delta as f64 / system_delta as f64) * online * 100.0
            }
        }
        _ => 0.0,
    };

    let memory_usage_bytes = s.memory_stats.as_ref().and_then(|m| m.usage);
    let memory_limit_bytes = s.memory_stats.as_ref().and_then(|m| m.limit);
    let memory_percent = match (memory_usage_bytes, memory_limit_bytes) {
        (Some(usage), Some(limit)) if limit > 0 => {
            Some(clamp_percent(usage as f64 / limit as f64 * 100.0))
        }
        _ => None,
    };

    ContainerUsage {
        cpu_percent,
        memory_usage_bytes,
        memory_limit_bytes,
        memory_percent,
    }
}
