use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub monitoring: MonitoringConfig,
    pub host: HostConfig,
    pub docker: DockerConfig,
    pub services: ServicesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8787,
            host: "0.0.0.0".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared secret expected in `X-Profiler-Token`. Unset disables auth (dev mode).
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub sample_interval_ms: u64,
    /// Deadline for each sampler within a tick (or a sub-resource request). Must exceed every
    /// sampler's own worst case so the deadline only fires on a stuck sampler.
    pub tick_timeout_ms: u64,
    /// Max number of events kept in the broadcast channel (slow SSE clients may lag).
    pub broadcast_capacity: usize,
    /// How often to log app stats (SSE clients, ticks) at INFO level.
    pub stats_log_interval_secs: u64,
    /// Forces mock sampling on or off. Unset means "mock on non-Linux hosts".
    pub mock_mode: Option<bool>,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: 2000,
            tick_timeout_ms: 20_000,
            broadcast_capacity: 16,
            stats_log_interval_secs: 60,
            mock_mode: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DiskMount {
    /// Mount point reported to clients, e.g. "/".
    pub mount_point: String,
    /// Path actually statted (differs when the host fs is bind-mounted, e.g. "/host/root").
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub proc_path: String,
    pub sys_path: String,
    pub disks: Vec<DiskMount>,
    /// Per-mount bound on statvfs, which can hang on a dead network mount.
    pub disk_timeout_ms: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            proc_path: "/proc".into(),
            sys_path: "/sys".into(),
            disks: vec![
                DiskMount {
                    mount_point: "/".into(),
                    path: "/".into(),
                },
                DiskMount {
                    mount_point: "/var/lib/docker".into(),
                    path: "/var/lib/docker".into(),
                },
            ],
            disk_timeout_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DockerConfig {
    pub socket_path: String,
    pub stack_label: String,
    pub stack_name: String,
    pub request_timeout_ms: u64,
    pub stats_timeout_ms: u64,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            socket_path: "/var/run/docker.sock".into(),
            stack_label: "com.docker.compose.project".into(),
            stack_name: "hostpulse".into(),
            request_timeout_ms: 5000,
            stats_timeout_ms: 10_000,
        }
    }
}

impl DockerConfig {
    /// Listing, then inspect and stats side by side for each container.
    pub fn worst_case_ms(&self) -> u64 {
        self.request_timeout_ms
            .saturating_add(self.request_timeout_ms.max(self.stats_timeout_ms))
    }
}

/// One dependent service: either an HTTP URL or a bare TCP host:port.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ProbeTarget {
    Http { name: String, url: String },
    Tcp { name: String, host: String, port: u16 },
}

impl ProbeTarget {
    pub fn name(&self) -> &str {
        match self {
            ProbeTarget::Http { name, .. } | ProbeTarget::Tcp { name, .. } => name,
        }
    }

    /// Target as reported in `ServiceHealth.url`.
    pub fn display_url(&self) -> String {
        match self {
            ProbeTarget::Http { url, .. } => url.clone(),
            ProbeTarget::Tcp { host, port, .. } => format!("tcp://{}:{}", host, port),
        }
    }

    /// Parse `name=http://host/path` or `name=host:port`.
    pub fn parse(entry: &str) -> anyhow::Result<Self> {
        let (name, target) = entry
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("probe target {:?} must be name=target", entry))?;
        let name = name.trim().to_string();
        let target = target.trim();
        if target.starts_with("http://") || target.starts_with("https://") {
            return Ok(ProbeTarget::Http {
                name,
                url: target.to_string(),
            });
        }
        let (host, port) = target
            .rsplit_once(':')
            .ok_or_else(|| anyhow::anyhow!("probe target {:?} must be host:port", target))?;
        let port = port
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("probe target {:?}: invalid port: {}", target, e))?;
        Ok(ProbeTarget::Tcp {
            name,
            host: host.to_string(),
            port,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub timeout_ms: u64,
    pub targets: Vec<ProbeTarget>,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            targets: vec![
                ProbeTarget::Http {
                    name: "web".into(),
                    url: "http://web:3000/".into(),
                },
                ProbeTarget::Http {
                    name: "ai-img-validator".into(),
                    url: "http://ai-img-validator:8000/".into(),
                },
                ProbeTarget::Tcp {
                    name: "db".into(),
                    host: "db".into(),
                    port: 5432,
                },
            ],
        }
    }
}

impl AppConfig {
    /// Loads `CONFIG_FILE` (default `config.toml`, optional) then applies environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let explicit = std::env::var("CONFIG_FILE").ok();
        let path = explicit.clone().unwrap_or_else(|| "config.toml".into());
        let s = match std::fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if explicit.is_none() && e.kind() == std::io::ErrorKind::NotFound => {
                String::new()
            }
            Err(e) => return Err(anyhow::anyhow!("reading {}: {}", path, e)),
        };
        let mut config: AppConfig = toml::from_str(&s)?;
        config.apply_env_with(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies environment-style overrides read through `lookup`, then re-validates.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("PORT") {
            self.server.port = v
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("PORT {:?}: {}", v, e))?;
        }
        if let Some(v) = lookup("SYSTEM_PROFILER_AUTH_TOKEN") {
            self.auth.token = Some(v);
        }
        if let Some(v) = lookup("MOCK_HOST_STATS") {
            self.monitoring.mock_mode = match v.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Some(true),
                "false" | "0" | "no" => Some(false),
                "" => None,
                other => anyhow::bail!("MOCK_HOST_STATS must be true or false, got {:?}", other),
            };
        }
        if let Some(v) = lookup("SAMPLE_INTERVAL_MS") {
            self.monitoring.sample_interval_ms = v
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("SAMPLE_INTERVAL_MS {:?}: {}", v, e))?;
        }
        if let Some(v) = lookup("PROC_PATH") {
            self.host.proc_path = v;
        }
        if let Some(v) = lookup("SYS_PATH") {
            self.host.sys_path = v;
        }
        if let Some(v) = lookup("DISK_MOUNTS") {
            self.host.disks = split_list(&v)
                .map(|entry| match entry.split_once('=') {
                    Some((mount, path)) => DiskMount {
                        mount_point: mount.trim().to_string(),
                        path: path.trim().to_string(),
                    },
                    None => DiskMount {
                        mount_point: entry.to_string(),
                        path: entry.to_string(),
                    },
                })
                .collect();
        }
        if let Some(v) = lookup("DOCKER_SOCKET") {
            self.docker.socket_path = v;
        }
        if let Some(v) = lookup("STACK_LABEL") {
            self.docker.stack_label = v;
        }
        if let Some(v) = lookup("STACK_NAME") {
            self.docker.stack_name = v;
        }
        if let Some(v) = lookup("SERVICE_TARGETS") {
            self.services.targets = split_list(&v)
                .map(ProbeTarget::parse)
                .collect::<anyhow::Result<Vec<_>>>()?;
        }
        self.validate()
    }

    /// Effective mock mode: explicit override, otherwise on for every non-Linux host.
    pub fn mock_mode(&self) -> bool {
        self.monitoring
            .mock_mode
            .unwrap_or(!cfg!(target_os = "linux"))
    }

    /// Auth token, treating an empty string as unset.
    pub fn auth_token(&self) -> Option<&str> {
        self.auth.token.as_deref().filter(|t| !t.is_empty())
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            self.monitoring.sample_interval_ms > 0,
            "monitoring.sample_interval_ms must be > 0, got {}",
            self.monitoring.sample_interval_ms
        );
        anyhow::ensure!(
            self.monitoring.tick_timeout_ms > 0,
            "monitoring.tick_timeout_ms must be > 0, got {}",
            self.monitoring.tick_timeout_ms
        );
        anyhow::ensure!(
            self.monitoring.broadcast_capacity > 0,
            "monitoring.broadcast_capacity must be > 0, got {}",
            self.monitoring.broadcast_capacity
        );
        anyhow::ensure!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        anyhow::ensure!(
            !self.host.proc_path.is_empty(),
            "host.proc_path must be non-empty"
        );
        for disk in &self.host.disks {
            anyhow::ensure!(
                !disk.mount_point.is_empty() && !disk.path.is_empty(),
                "host.disks entries need a mount_point and a path, got {:?}",
                disk
            );
        }
        anyhow::ensure!(
            !self.docker.socket_path.is_empty(),
            "docker.socket_path must be non-empty"
        );
        anyhow::ensure!(
            self.docker.request_timeout_ms > 0 && self.docker.stats_timeout_ms > 0,
            "docker timeouts must be > 0"
        );
        anyhow::ensure!(
            self.services.timeout_ms > 0,
            "services.timeout_ms must be > 0, got {}",
            self.services.timeout_ms
        );
        anyhow::ensure!(
            self.host.disk_timeout_ms > 0,
            "host.disk_timeout_ms must be > 0, got {}",
            self.host.disk_timeout_ms
        );
        let slowest = [
            ("docker", self.docker.worst_case_ms()),
            ("services.timeout_ms", self.services.timeout_ms),
            ("host.disk_timeout_ms", self.host.disk_timeout_ms),
        ];
        for (sampler, worst_case_ms) in slowest {
            anyhow::ensure!(
                self.monitoring.tick_timeout_ms > worst_case_ms,
                "monitoring.tick_timeout_ms ({}) must exceed the {} worst case of {} ms",
                self.monitoring.tick_timeout_ms,
                sampler,
                worst_case_ms
            );
        }
        for target in &self.services.targets {
            anyhow::ensure!(
                !target.name().is_empty(),
                "services.targets entries need a name, got {:?}",
                target
            );
            match target {
                ProbeTarget::Http { url, .. } => {
                    reqwest::Url::parse(url).map_err(|e| {
                        anyhow::anyhow!("services.targets {:?}: invalid url: {}", target.name(), e)
                    })?;
                }
                ProbeTarget::Tcp { host, port, .. } => {
                    anyhow::ensure!(
                        !host.is_empty() && *port > 0,
                        "services.targets {:?}: host must be non-empty and port > 0",
                        target.name()
                    );
                }
            }
        }
        Ok(())
    }
}

fn split_list(v: &str) -> impl Iterator<Item = &str> {
    v.split(',').map(str::trim).filter(|s| !s.is_empty())
}
