// Service checks go straight to the target even when a proxy is configured in the environment.
// Kept in its own test binary because it mutates process-wide environment variables.

use axum::{Router, http::StatusCode};
use hostpulse::config::{ProbeTarget, ServicesConfig};
use hostpulse::probe_repo::ProbeRepo;
use tokio::net::TcpListener;

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn service_checks_ignore_proxy_environment() {
    let target = serve(Router::new().fallback(|| async { "ok" })).await;
    let proxy = serve(Router::new().fallback(|| async { (StatusCode::BAD_GATEWAY, "proxy") })).await;

    // SAFETY: this binary runs a single test, so nothing reads the environment concurrently.
    unsafe {
        for key in ["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"] {
            std::env::set_var(key, &proxy);
        }
        for key in ["NO_PROXY", "no_proxy"] {
            std::env::remove_var(key);
        }
    }

    let repo = ProbeRepo::new(&ServicesConfig {
        timeout_ms: 2000,
        targets: vec![ProbeTarget::Http {
            name: "web".into(),
            url: format!("{}/", target),
        }],
    })
    .unwrap();

    let health = repo.service_health().await;
    let web = &health.services[0];
    assert!(web.healthy, "answered by the proxy: {:?}", web.error);
    assert!(health.all_healthy);
}
