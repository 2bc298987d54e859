// Config loading, env overrides and validation tests

use hostpulse::config::{AppConfig, DiskMount, ProbeTarget};
use std::collections::HashMap;

const VALID_CONFIG: &str = r#"
[server]
port = 8787
host = "127.0.0.1"

[auth]
token = "s3cret"

[monitoring]
sample_interval_ms = 1000
tick_timeout_ms = 5000
broadcast_capacity = 8
stats_log_interval_secs = 60
mock_mode = true

[host]
proc_path = "/host/proc"
sys_path = "/host/sys"
disks = [
    { mount_point = "/", path = "/host/root" },
    { mount_point = "/data", path = "/host/data" },
]

[docker]
socket_path = "/var/run/docker.sock"
stack_label = "com.docker.compose.project"
stack_name = "media"
request_timeout_ms = 1000
stats_timeout_ms = 2000

[services]
timeout_ms = 2000
targets = [
    { name = "web", url = "http://web:3000/" },
    { name = "db", host = "db", port = 5432 },
]
"#;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_config_loads_from_str() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("load_from_str");
    assert_eq!(config.server.port, 8787);
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.auth_token(), Some("s3cret"));
    assert!(config.mock_mode());
    assert_eq!(config.host.proc_path, "/host/proc");
    assert_eq!(
        config.host.disks[1],
        DiskMount {
            mount_point: "/data".into(),
            path: "/host/data".into(),
        }
    );
    assert_eq!(config.services.timeout_ms, 2000);
    assert_eq!(
        config.services.targets[1],
        ProbeTarget::Tcp {
            name: "db".into(),
            host: "db".into(),
            port: 5432,
        }
    );
}

#[test]
fn test_empty_config_uses_defaults() {
    let config = AppConfig::load_from_str("").expect("defaults");
    assert_eq!(config.server.port, 8787);
    assert_eq!(config.monitoring.sample_interval_ms, 2000);
    assert_eq!(config.auth_token(), None);
    assert_eq!(config.docker.stack_label, "com.docker.compose.project");
    assert_eq!(config.docker.stack_name, "hostpulse");
    assert_eq!(config.host.disks.len(), 2);
    assert_eq!(config.host.disks[1].mount_point, "/var/lib/docker");
    assert!(config.monitoring.tick_timeout_ms > config.docker.worst_case_ms());
    assert_eq!(config.services.targets.len(), 3);
    assert_eq!(config.mock_mode(), !cfg!(target_os = "linux"));
}

#[test]
fn test_empty_token_disables_auth() {
    let mut config = AppConfig::load_from_str("").unwrap();
    config
        .apply_env_with(env(&[("SYSTEM_PROFILER_AUTH_TOKEN", "")]))
        .unwrap();
    assert_eq!(config.auth_token(), None);
}

#[test]
fn test_env_overrides() {
    let mut config = AppConfig::load_from_str(VALID_CONFIG).unwrap();
    config
        .apply_env_with(env(&[
            ("PORT", "9000"),
            ("MOCK_HOST_STATS", "false"),
            ("DISK_MOUNTS", "/=/host/root, /backup"),
            ("SERVICE_TARGETS", "api=http://api:8080/health,cache=redis:6379"),
            ("STACK_NAME", "photos"),
        ]))
        .unwrap();
    assert_eq!(config.server.port, 9000);
    assert!(!config.mock_mode());
    assert_eq!(config.host.disks.len(), 2);
    assert_eq!(config.host.disks[1].mount_point, "/backup");
    assert_eq!(config.host.disks[1].path, "/backup");
    assert_eq!(config.docker.stack_name, "photos");
    assert_eq!(config.services.targets[0].display_url(), "http://api:8080/health");
    assert_eq!(config.services.targets[1].display_url(), "tcp://redis:6379");
}

#[test]
fn test_env_rejects_bad_values() {
    let mut config = AppConfig::load_from_str("").unwrap();
    assert!(config.apply_env_with(env(&[("PORT", "http")])).is_err());

    let mut config = AppConfig::load_from_str("").unwrap();
    let err = config
        .apply_env_with(env(&[("MOCK_HOST_STATS", "maybe")]))
        .unwrap_err();
    assert!(err.to_string().contains("MOCK_HOST_STATS"));

    let mut config = AppConfig::load_from_str("").unwrap();
    assert!(
        config
            .apply_env_with(env(&[("SERVICE_TARGETS", "nameless")]))
            .is_err()
    );
}

#[test]
fn test_probe_target_parse() {
    assert_eq!(
        ProbeTarget::parse("web=https://example.com/").unwrap(),
        ProbeTarget::Http {
            name: "web".into(),
            url: "https://example.com/".into(),
        }
    );
    assert!(ProbeTarget::parse("db=db:notaport").is_err());
    assert!(ProbeTarget::parse("db=db").is_err());
}

#[test]
fn test_config_validation_rejects_invalid_port() {
    let bad = VALID_CONFIG.replace("port = 8787", "port = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("server.port"));
}

#[test]
fn test_config_validation_rejects_zero_interval() {
    let bad = VALID_CONFIG.replace("sample_interval_ms = 1000", "sample_interval_ms = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("sample_interval_ms"));
}

#[test]
fn test_config_validation_rejects_zero_broadcast_capacity() {
    let bad = VALID_CONFIG.replace("broadcast_capacity = 8", "broadcast_capacity = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("broadcast_capacity"));
}

#[test]
fn test_config_validation_rejects_bad_target_url() {
    let bad = VALID_CONFIG.replace("http://web:3000/", "not a url");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("web"));
}

#[test]
fn test_config_validation_rejects_empty_socket() {
    let bad = VALID_CONFIG.replace("socket_path = \"/var/run/docker.sock\"", "socket_path = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("docker.socket_path"));
}

#[test]
fn test_config_validation_rejects_tick_deadline_below_sampler_worst_case() {
    assert!(AppConfig::load_from_str(VALID_CONFIG).is_ok());

    // list (1000) + max(inspect 1000, stats 4000) = 5000, not below the 5000 ms deadline.
    let bad = VALID_CONFIG.replace("stats_timeout_ms = 2000", "stats_timeout_ms = 4000");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("tick_timeout_ms"));
    assert!(err.to_string().contains("docker"));

    let bad = VALID_CONFIG.replace("timeout_ms = 2000\ntargets", "timeout_ms = 6000\ntargets");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("services.timeout_ms"));
}
