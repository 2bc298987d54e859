// Host stats from the kernel's virtual filesystem (/proc, /sys), with sysinfo fallbacks

mod mock;
pub mod procfs;

pub use mock::MockHost;
pub use procfs::CpuTimes;

use crate::config::{DiskMount, HostConfig};
use crate::models::*;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use sysinfo::System;
use tokio::time::timeout;
use tracing::instrument;

pub struct HostRepo {
    proc_path: PathBuf,
    sys_path: PathBuf,
    disks: Vec<DiskMount>,
    disk_timeout: Duration,
    /// Last aggregate CPU reading; read-then-replaced once per sample.
    prev_cpu: Mutex<Option<CpuTimes>>,
    sys: Mutex<System>,
}

impl HostRepo {
    pub fn new(config: &HostConfig) -> Self {
        Self {
            proc_path: PathBuf::from(&config.proc_path),
            sys_path: PathBuf::from(&config.sys_path),
            disks: config.disks.clone(),
            disk_timeout: Duration::from_millis(config.disk_timeout_ms),
            prev_cpu: Mutex::new(None),
            sys: Mutex::new(System::new()),
        }
    }

    /// Seeds the previous CPU reading, e.g. to compute a real percentage on the first sample.
    pub fn with_previous_cpu(self, times: CpuTimes) -> Self {
        *self.prev_cpu.lock().unwrap_or_else(PoisonError::into_inner) = Some(times);
        self
    }

    pub fn previous_cpu(&self) -> Option<CpuTimes> {
        *self.prev_cpu.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Samples every host field. Unreadable sources degrade that field only.
    #[instrument(skip(self), fields(repo = "host", operation = "sample"))]
    pub async fn sample(&self) -> HostStats {
        let proc = self.proc_path.as_path();
        let thermal = self.sys_path.join("class/thermal/thermal_zone0/temp");
        let (stat, meminfo, loadavg, uptime, net_dev, version, cpuinfo, thermal, disks) = tokio::join!(
            read_optional(proc.join("stat")),
            read_optional(proc.join("meminfo")),
            read_optional(proc.join("loadavg")),
            read_optional(proc.join("uptime")),
            read_optional(proc.join("net/dev")),
            read_optional(proc.join("version")),
            read_optional(proc.join("cpuinfo")),
            read_optional(thermal),
            self.disk_stats(),
        );

        let usage_percent = match stat.as_deref().and_then(procfs::parse_cpu_times) {
            Some(curr) => self.advance_cpu(curr),
            None => 0.0,
        };
        let cpu = CpuStats {
            usage_percent,
            load_average: loadavg
                .as_deref()
                .and_then(procfs::parse_loadavg)
                .unwrap_or_else(fallback_load),
            cores: cpuinfo
                .as_deref()
                .and_then(procfs::parse_cpu_count)
                .unwrap_or_else(fallback_core_count),
        };

        let memory = match meminfo.as_deref().and_then(procfs::parse_meminfo) {
            Some(m) => memory_stats(m),
            None => self.fallback_memory(),
        };

        let cpu_celsius = thermal
            .as_deref()
            .and_then(procfs::parse_thermal_millidegrees);

        let network = NetworkStats {
            interfaces: net_dev
                .as_deref()
                .map(procfs::parse_net_dev)
                .unwrap_or_default(),
        };

        let system = SystemInfo {
            hostname: System::host_name().unwrap_or_else(|| "unknown".into()),
            platform: std::env::consts::OS.into(),
            arch: std::env::consts::ARCH.into(),
            uptime_seconds: uptime
                .as_deref()
                .and_then(procfs::parse_uptime)
                .unwrap_or_else(|| System::uptime() as f64),
            kernel_version: version
                .as_deref()
                .and_then(procfs::parse_kernel_version)
                .or_else(System::kernel_version),
        };

        HostStats {
            cpu,
            memory,
            disks,
            temperature: TemperatureStats::from_reading(cpu_celsius),
            network,
            system,
        }
    }

    /// Host data from sysinfo alone, without reading /proc, /sys or the mounts. CPU usage reads
    /// 0 and disks, interfaces and temperature are absent.
    pub fn degraded(&self) -> HostStats {
        HostStats {
            cpu: CpuStats {
                usage_percent: 0.0,
                load_average: fallback_load(),
                cores: fallback_core_count(),
            },
            memory: self.fallback_memory(),
            disks: Vec::new(),
            temperature: TemperatureStats::unavailable(),
            network: NetworkStats {
                interfaces: Vec::new(),
            },
            system: SystemInfo {
                hostname: System::host_name().unwrap_or_else(|| "unknown".into()),
                platform: std::env::consts::OS.into(),
                arch: std::env::consts::ARCH.into(),
                uptime_seconds: System::uptime() as f64,
                kernel_version: System::kernel_version(),
            },
        }
    }

    fn advance_cpu(&self, curr: CpuTimes) -> f64 {
        let mut prev = self.prev_cpu.lock().unwrap_or_else(PoisonError::into_inner);
        let usage = procfs::cpu_usage_percent(prev.as_ref(), &curr);
        *prev = Some(curr);
        usage
    }

    fn fallback_memory(&self) -> MemoryStats {
        let mut sys = self.sys.lock().unwrap_or_else(PoisonError::into_inner);
        sys.refresh_memory();
        let available = sys.available_memory();
        memory_stats(procfs::MemInfo {
            total: sys.total_memory(),
            free: sys.free_memory(),
            available: (available > 0).then_some(available),
        })
    }

    /// Disk usage for each configured mount; mounts that cannot be statted in time are dropped.
    async fn disk_stats(&self) -> Vec<DiskStats> {
        let lookups = self.disks.iter().cloned().map(|mount| {
            let limit = self.disk_timeout;
            async move {
                let task = tokio::task::spawn_blocking({
                    let mount = mount.clone();
                    move || statvfs_disk(&mount)
                });
                let result = match timeout(limit, task).await {
                    Ok(joined) => joined.map_err(std::io::Error::other).and_then(|r| r),
                    Err(_) => Err(std::io::Error::new(
                        std::io::ErrorKind::TimedOut,
                        format!("statvfs timed out after {} ms", limit.as_millis()),
                    )),
                };
                (mount, result)
            }
        });
        let mut out = Vec::with_capacity(self.disks.len());
        for (mount, result) in futures_util::future::join_all(lookups).await {
            match result {
                Ok(disk) => out.push(disk),
                Err(e) => {
                    tracing::debug!(
                        error = %e,
                        mount_point = %mount.mount_point,
                        path = %mount.path,
                        operation = "statvfs",
                        "disk stats unavailable"
                    );
                }
            }
        }
        out
    }
}

fn memory_stats(m: procfs::MemInfo) -> MemoryStats {
    let used = m.used();
    MemoryStats {
        total_bytes: m.total,
        used_bytes: used,
        free_bytes: m.free,
        available_bytes: m.available.unwrap_or(m.free),
        usage_percent: percent_of(used, m.total),
    }
}

fn fallback_load() -> [f64; 3] {
    let l = System::load_average();
    [l.one, l.five, l.fifteen]
}

fn fallback_core_count() -> u32 {
    std::thread::available_parallelism()
        .map(|n| n.get() as u32)
        .unwrap_or(1)
}

async fn read_optional(path: PathBuf) -> Option<String> {
    match tokio::fs::read_to_string(&path).await {
        Ok(s) => Some(s),
        Err(e) => {
            tracing::debug!(error = %e, path = %path.display(), "host file unavailable");
            None
        }
    }
}

#[cfg(unix)]
#[allow(clippy::unnecessary_cast)]
fn statvfs_disk(mount: &DiskMount) -> std::io::Result<DiskStats> {
    let st = nix::sys::statvfs::statvfs(Path::new(&mount.path)).map_err(std::io::Error::from)?;
    let block = st.fragment_size() as u64;
    let total = (st.blocks() as u64).saturating_mul(block);
    let free = (st.blocks_free() as u64).saturating_mul(block);
    let used = total.saturating_sub(free);
    Ok(DiskStats {
        mount_point: mount.mount_point.clone(),
        total_bytes: total,
        used_bytes: used,
        free_bytes: free,
        usage_percent: percent_of(used, total),
    })
}

#[cfg(not(unix))]
fn statvfs_disk(mount: &DiskMount) -> std::io::Result<DiskStats> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        format!("statvfs not supported for {}", Path::new(&mount.path).display()),
    ))
}
