// Shared-secret header check; a no-op when no token is configured (dev mode)

use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::AppState;

pub const AUTH_HEADER: &str = "X-Profiler-Token";

pub(super) async fn require_token(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.auth_token.as_deref() else {
        return next.run(req).await;
    };
    match req.headers().get(AUTH_HEADER).map(|v| v.as_bytes()) {
        None => unauthorized("Missing authentication token"),
        Some(token) if token != expected.as_bytes() => unauthorized("Invalid authentication token"),
        Some(_) => next.run(req).await,
    }
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}
