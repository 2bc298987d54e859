// Host models: CPU, memory, disks, temperature, network and static system facts

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuStats {
    pub usage_percent: f64,
    /// 1, 5 and 15 minute load averages.
    pub load_average: [f64; 3],
    pub cores: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStats {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
    pub available_bytes: u64,
    pub usage_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskStats {
    pub mount_point: String,
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
    pub usage_percent: f64,
}

/// CPU temperature; `available` is false (and `cpu_celsius` null) on hosts without a sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureStats {
    pub cpu_celsius: Option<f64>,
    pub available: bool,
}

impl TemperatureStats {
    pub fn from_reading(cpu_celsius: Option<f64>) -> Self {
        Self {
            available: cpu_celsius.is_some(),
            cpu_celsius,
        }
    }

    pub fn unavailable() -> Self {
        Self::from_reading(None)
    }
}

/// Cumulative byte counters for one interface (monotonic until reboot or wrap).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    pub name: String,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStats {
    pub interfaces: Vec<NetworkInterface>,
}

impl NetworkStats {
    /// Sum of (rx, tx) across all interfaces.
    pub fn totals(&self) -> (u64, u64) {
        self.interfaces.iter().fold((0u64, 0u64), |(rx, tx), i| {
            (rx.saturating_add(i.rx_bytes), tx.saturating_add(i.tx_bytes))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub hostname: String,
    pub platform: String,
    pub arch: String,
    pub uptime_seconds: f64,
    pub kernel_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostStats {
    pub cpu: CpuStats,
    pub memory: MemoryStats,
    pub disks: Vec<DiskStats>,
    pub temperature: TemperatureStats,
    pub network: NetworkStats,
    pub system: SystemInfo,
}
