// Human-readable formatting for terminal output

use bytesize::ByteSize;
use std::time::Duration;

const PLACEHOLDER: &str = "-";

/// IEC units (KiB, MiB, ...), one decimal from KiB up.
pub fn format_bytes(bytes: f64) -> String {
    if bytes.is_nan() {
        return PLACEHOLDER.to_string();
    }
    ByteSize::b(bytes.max(0.0).round() as u64)
        .display()
        .iec()
        .to_string()
}

pub fn format_bps(bytes_per_sec: Option<f64>) -> String {
    match bytes_per_sec {
        Some(v) if !v.is_nan() => format!("{}/s", format_bytes(v)),
        _ => PLACEHOLDER.to_string(),
    }
}

pub fn format_percent(value: Option<f64>, digits: usize) -> String {
    match value {
        Some(v) if !v.is_nan() => format!("{:.*}%", digits, v.clamp(0.0, 100.0)),
        _ => PLACEHOLDER.to_string(),
    }
}

/// Whole seconds, e.g. `1day 2h 3m 4s`; zero parts are omitted.
pub fn format_uptime(seconds: f64) -> String {
    if seconds.is_nan() {
        return PLACEHOLDER.to_string();
    }
    let whole = Duration::from_secs(seconds.max(0.0).floor() as u64);
    humantime::format_duration(whole).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes() {
        assert_eq!(format_bytes(512.0), "512 B");
        assert_eq!(format_bytes(2048.0), "2.0 KiB");
        assert_eq!(format_bytes(1.5 * 1024.0 * 1024.0), "1.5 MiB");
        assert_eq!(format_bytes(8_217_448_448.0), "7.7 GiB");
        assert_eq!(format_bytes(-3.0), "0 B");
        assert_eq!(format_bytes(f64::NAN), "-");
    }

    #[test]
    fn rates_and_percent() {
        assert_eq!(format_bps(Some(1024.0)), "1.0 KiB/s");
        assert_eq!(format_bps(Some(300.4)), "300 B/s");
        assert_eq!(format_bps(None), "-");
        assert_eq!(format_percent(Some(42.345), 1), "42.3%");
        assert_eq!(format_percent(Some(140.0), 0), "100%");
        assert_eq!(format_percent(None, 1), "-");
    }

    #[test]
    fn uptime() {
        assert_eq!(format_uptime(0.0), "0s");
        assert_eq!(format_uptime(59.9), "59s");
        assert_eq!(format_uptime(3661.0), "1h 1m 1s");
        assert_eq!(format_uptime(90_000.0), "1day 1h");
        assert_eq!(format_uptime(f64::NAN), "-");
    }
}
