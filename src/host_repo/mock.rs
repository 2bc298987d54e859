// Deterministic host stats for development hosts without /proc

use crate::models::*;
use std::sync::atomic::{AtomicU64, Ordering};

const CPU_PERCENT: [f64; 10] = [12.4, 18.9, 25.5, 31.2, 22.7, 9.8, 14.3, 41.6, 27.1, 16.5];
const MEMORY_USED_MB: [u64; 10] = [3120, 3188, 3240, 3302, 3275, 3190, 3150, 3410, 3330, 3215];
const TEMPERATURE: [f64; 10] = [47.2, 47.8, 48.3, 49.1, 48.7, 47.9, 47.5, 50.2, 49.4, 48.1];
const LOAD: [[f64; 3]; 10] = [
    [0.42, 0.51, 0.48],
    [0.55, 0.53, 0.49],
    [0.71, 0.57, 0.50],
    [0.88, 0.62, 0.52],
    [0.64, 0.61, 0.52],
    [0.39, 0.55, 0.51],
    [0.47, 0.53, 0.50],
    [1.12, 0.66, 0.54],
    [0.93, 0.70, 0.56],
    [0.58, 0.66, 0.55],
];

const TOTAL_MEMORY: u64 = 8 * 1024 * 1024 * 1024;
const DISK_TOTAL: u64 = 128 * 1024 * 1024 * 1024;
const DISK_USED: u64 = 54 * 1024 * 1024 * 1024;
const RX_BASE: u64 = 100 * 1024 * 1024;
const TX_BASE: u64 = 50 * 1024 * 1024;
const RX_STEP: u64 = 262_144;
const TX_STEP: u64 = 98_304;

/// Cycles through fixed value tables; network counters only ever grow.
#[derive(Debug, Default)]
pub struct MockHost {
    tick: AtomicU64,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> HostStats {
        let tick = self.tick.fetch_add(1, Ordering::Relaxed);
        let i = (tick % CPU_PERCENT.len() as u64) as usize;
        let used = MEMORY_USED_MB[i] * 1024 * 1024;
        let available = TOTAL_MEMORY - used;
        HostStats {
            cpu: CpuStats {
                usage_percent: CPU_PERCENT[i],
                load_average: LOAD[i],
                cores: 4,
            },
            memory: MemoryStats {
                total_bytes: TOTAL_MEMORY,
                used_bytes: used,
                free_bytes: available / 2,
                available_bytes: available,
                usage_percent: percent_of(used, TOTAL_MEMORY),
            },
            disks: vec![DiskStats {
                mount_point: "/".into(),
                total_bytes: DISK_TOTAL,
                used_bytes: DISK_USED,
                free_bytes: DISK_TOTAL - DISK_USED,
                usage_percent: percent_of(DISK_USED, DISK_TOTAL),
            }],
            temperature: TemperatureStats::from_reading(Some(TEMPERATURE[i])),
            network: NetworkStats {
                interfaces: vec![NetworkInterface {
                    name: "eth0".into(),
                    rx_bytes: RX_BASE + tick * RX_STEP,
                    tx_bytes: TX_BASE + tick * TX_STEP,
                }],
            },
            system: SystemInfo {
                hostname: "mock-host".into(),
                platform: std::env::consts::OS.into(),
                arch: std::env::consts::ARCH.into(),
                uptime_seconds: 86_400.0 + tick as f64 * 2.0,
                kernel_version: None,
            },
        }
    }
}
