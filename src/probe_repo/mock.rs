// Mock service health for development hosts

use crate::models::{ServiceHealth, ServiceHealthStats};

pub fn mock_service_health() -> ServiceHealthStats {
    let service = |name: &str, url: &str, ms: u64| ServiceHealth {
        name: name.into(),
        url: url.into(),
        healthy: true,
        response_time_ms: Some(ms),
        error: None,
    };
    ServiceHealthStats::new(vec![
        service("web", "http://web:3000/", 45),
        service("ai-img-validator", "http://ai-img-validator:8000/", 120),
        service("db", "tcp://db:5432", 5),
    ])
}
