// Parsers for kernel pseudo-files: /proc/stat, meminfo, loadavg, uptime, net/dev, version, cpuinfo
// and the thermal-zone counter. Pure functions over file contents so they test without a kernel.

use crate::models::NetworkInterface;

/// Aggregate CPU time counters from the `cpu ` line of /proc/stat (in USER_HZ ticks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuTimes {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

impl CpuTimes {
    pub fn total(&self) -> u64 {
        self.user
            + self.nice
            + self.system
            + self.idle
            + self.iowait
            + self.irq
            + self.softirq
            + self.steal
    }
}

/// Usage % between two readings: `1 - idle_delta / total_delta`, clamped to [0, 100].
/// No previous reading, no elapsed ticks or counters going backwards all yield 0.
pub fn cpu_usage_percent(prev: Option<&CpuTimes>, curr: &CpuTimes) -> f64 {
    let Some(prev) = prev else {
        return 0.0;
    };
    let total_delta = curr.total().saturating_sub(prev.total());
    if total_delta == 0 || curr.total() < prev.total() {
        return 0.0;
    }
    let idle_delta = curr.idle.saturating_sub(prev.idle);
    let busy = total_delta.saturating_sub(idle_delta);
    crate::models::clamp_percent(busy as f64 / total_delta as f64 * 100.0)
}

pub fn parse_cpu_times(content: &str) -> Option<CpuTimes> {
    let line = content.lines().find(|l| l.starts_with("cpu "))?;
    let fields: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .map(|v| v.parse::<u64>())
        .collect::<Result<_, _>>()
        .ok()?;
    if fields.len() < 8 {
        return None;
    }
    Some(CpuTimes {
        user: fields[0],
        nice: fields[1],
        system: fields[2],
        idle: fields[3],
        iowait: fields[4],
        irq: fields[5],
        softirq: fields[6],
        steal: fields[7],
    })
}

/// Fields of /proc/meminfo we use, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemInfo {
    pub total: u64,
    pub free: u64,
    pub available: Option<u64>,
}

impl MemInfo {
    /// Used = total - available; total - free when the kernel does not report MemAvailable.
    pub fn used(&self) -> u64 {
        let basis = self.available.unwrap_or(self.free);
        self.total.saturating_sub(basis)
    }
}

pub fn parse_meminfo(content: &str) -> Option<MemInfo> {
    let mut total = None;
    let mut free = None;
    let mut available = None;
    for line in content.lines() {
        let Some((key, rest)) = line.split_once(':') else {
            continue;
        };
        let Some(kb) = rest
            .split_whitespace()
            .next()
            .and_then(|v| v.parse::<u64>().ok())
        else {
            continue;
        };
        let bytes = kb.saturating_mul(1024);
        match key.trim() {
            "MemTotal" => total = Some(bytes),
            "MemFree" => free = Some(bytes),
            "MemAvailable" => available = Some(bytes),
            _ => {}
        }
    }
    Some(MemInfo {
        total: total?,
        free: free.unwrap_or(0),
        available,
    })
}

pub fn parse_loadavg(content: &str) -> Option<[f64; 3]> {
    let mut parts = content.split_whitespace().map(|p| p.parse::<f64>().ok());
    Some([parts.next()??, parts.next()??, parts.next()??])
}

pub fn parse_uptime(content: &str) -> Option<f64> {
    content.split_whitespace().next()?.parse().ok()
}

/// Per-interface cumulative counters; loopback is skipped.
pub fn parse_net_dev(content: &str) -> Vec<NetworkInterface> {
    content
        .lines()
        .skip(2)
        .filter_map(|line| {
            let (name, rest) = line.split_once(':')?;
            let name = name.trim();
            if name.is_empty() || name == "lo" {
                return None;
            }
            let cols: Vec<&str> = rest.split_whitespace().collect();
            if cols.len() < 9 {
                return None;
            }
            Some(NetworkInterface {
                name: name.to_string(),
                rx_bytes: cols[0].parse().ok()?,
                tx_bytes: cols[8].parse().ok()?,
            })
        })
        .collect()
}

/// Thermal-zone millidegrees to Celsius, rounded to one decimal.
pub fn parse_thermal_millidegrees(content: &str) -> Option<f64> {
    let milli = content.trim().parse::<i64>().ok()?;
    Some((milli as f64 / 100.0).round() / 10.0)
}

/// Release from "Linux version 6.1.0-rpi7-rpi-v8 (...)".
pub fn parse_kernel_version(content: &str) -> Option<String> {
    let rest = content.split("Linux version ").nth(1)?;
    rest.split_whitespace().next().map(str::to_string)
}

pub fn parse_cpu_count(content: &str) -> Option<u32> {
    let n = content
        .lines()
        .filter(|l| {
            l.split_once(':')
                .is_some_and(|(k, _)| k.trim() == "processor")
        })
        .count();
    if n == 0 { None } else { Some(n as u32) }
}
