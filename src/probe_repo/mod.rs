// Reachability probes for dependent services (HTTP GET or bare TCP connect), run concurrently

mod mock;

pub use mock::mock_service_health;

use crate::config::{ProbeTarget, ServicesConfig};
use crate::models::{ServiceHealth, ServiceHealthStats};
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::instrument;

/// Outcome of a single probe before it is labelled with the service name.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeOutcome {
    pub healthy: bool,
    pub response_time_ms: u64,
    pub error: Option<String>,
}

pub struct ProbeRepo {
    client: reqwest::Client,
    targets: Vec<ProbeTarget>,
    timeout: Duration,
}

impl ProbeRepo {
    pub fn new(config: &ServicesConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(crate::version::user_agent())
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .build()?;
        Ok(Self {
            client,
            targets: config.targets.clone(),
            timeout: Duration::from_millis(config.timeout_ms),
        })
    }

    /// One record per configured target, in configuration order.
    #[instrument(skip(self), fields(repo = "probe", operation = "service_health"))]
    pub async fn service_health(&self) -> ServiceHealthStats {
        let probes = self.targets.iter().map(|t| self.check(t));
        ServiceHealthStats::new(futures_util::future::join_all(probes).await)
    }

    /// Every target reported unhealthy with a `"timeout"` error, as if each probe had expired.
    pub fn timed_out(&self) -> ServiceHealthStats {
        let services = self
            .targets
            .iter()
            .map(|target| record(target, timed_out(self.timeout)))
            .collect();
        ServiceHealthStats::new(services)
    }

    async fn check(&self, target: &ProbeTarget) -> ServiceHealth {
        let outcome = match target {
            ProbeTarget::Http { url, .. } => http_probe(&self.client, url, self.timeout).await,
            ProbeTarget::Tcp { host, port, .. } => tcp_probe(host, *port, self.timeout).await,
        };
        if !outcome.healthy {
            tracing::debug!(
                service = target.name(),
                error = outcome.error.as_deref().unwrap_or_default(),
                "service probe failed"
            );
        }
        record(target, outcome)
    }
}

fn record(target: &ProbeTarget, outcome: ProbeOutcome) -> ServiceHealth {
    ServiceHealth {
        name: target.name().to_string(),
        url: target.display_url(),
        healthy: outcome.healthy,
        response_time_ms: Some(outcome.response_time_ms),
        error: outcome.error,
    }
}

/// GET `url`. Any status in [200, 500) counts as healthy: the probe measures whether the service
/// is up and answering, so 4xx responses are deliberately accepted. 5xx, connection errors and
/// timeouts are unhealthy.
pub async fn http_probe(client: &reqwest::Client, url: &str, limit: Duration) -> ProbeOutcome {
    let start = Instant::now();
    match timeout(limit, client.get(url).send()).await {
        Ok(Ok(res)) => {
            let response_time_ms = elapsed_ms(start);
            let status = res.status().as_u16();
            if (200..500).contains(&status) {
                ProbeOutcome {
                    healthy: true,
                    response_time_ms,
                    error: None,
                }
            } else {
                ProbeOutcome {
                    healthy: false,
                    response_time_ms,
                    error: Some(format!("HTTP {}", status)),
                }
            }
        }
        Ok(Err(e)) => ProbeOutcome {
            healthy: false,
            response_time_ms: elapsed_ms(start),
            error: Some(e.to_string()),
        },
        Err(_) => timed_out(limit),
    }
}

/// Healthy as soon as the TCP connect succeeds; nothing is sent.
pub async fn tcp_probe(host: &str, port: u16, limit: Duration) -> ProbeOutcome {
    let start = Instant::now();
    match timeout(limit, TcpStream::connect((host, port))).await {
        Ok(Ok(_stream)) => ProbeOutcome {
            healthy: true,
            response_time_ms: elapsed_ms(start),
            error: None,
        },
        Ok(Err(e)) => ProbeOutcome {
            healthy: false,
            response_time_ms: elapsed_ms(start),
            error: Some(e.to_string()),
        },
        Err(_) => timed_out(limit),
    }
}

fn timed_out(limit: Duration) -> ProbeOutcome {
    ProbeOutcome {
        healthy: false,
        response_time_ms: limit.as_millis() as u64,
        error: Some("timeout".into()),
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
