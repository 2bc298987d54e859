// Domain models (wire format shared by the profiler server and stream consumers)

mod container;
mod history;
mod host;
mod service;
mod snapshot;

pub use container::{ContainerHealth, ContainerInfo, ContainerState, ContainerStats, ContainerSummary};
pub use history::HistoryPoint;
pub use host::{
    CpuStats, DiskStats, HostStats, MemoryStats, NetworkInterface, NetworkStats, SystemInfo,
    TemperatureStats,
};
pub use service::{ServiceHealth, ServiceHealthStats};
pub use snapshot::{ApiResponse, HealthResponse, Snapshot};

/// Clamp a percentage into [0, 100]; NaN becomes 0.
pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// `part / whole * 100`, clamped; 0 when `whole` is 0.
pub fn percent_of(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    clamp_percent(part as f64 / whole as f64 * 100.0)
}
