use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

use service::rate_limit::Decision;

use crate::errors::ApiError;
use crate::state::AppState;

/// Authenticated principal attached to the request by `require_admin`.
#[derive(Debug, Clone)]
pub struct AdminPrincipal(pub String);

/// Middleware: admit or reject the request before any further processing.
/// A rejection never touches repository or auth state.
pub async fn rate_limit(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = client_key(&req);
    match state.limiter.admit(&key) {
        Decision::Allowed { remaining } => {
            let mut res = next.run(req).await;
            res.headers_mut()
                .insert("x-ratelimit-remaining", HeaderValue::from(remaining));
            Ok(res)
        }
        Decision::Limited => Err(ApiError::RateLimited),
    }
}

/// Client key for rate limiting: the peer address when the listener
/// provides one, else the first X-Forwarded-For hop, else a fixed key
/// (e.g. under a test harness that bypasses the TCP listener). The
/// forwarded header is client-controlled, so the peer address takes
/// precedence.
fn client_key(req: &Request) -> String {
    if let Some(info) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return info.0.ip().to_string();
    }
    if let Some(forwarded) = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    "unknown".to_string()
}

/// Middleware: require a valid admin bearer token on mutating routes.
/// The sub-cause (expired vs otherwise invalid) is logged only; callers
/// always see the same unauthorized response.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    match state.issuer.verify(token) {
        Ok(principal) => {
            req.extensions_mut().insert(AdminPrincipal(principal));
            Ok(next.run(req).await)
        }
        Err(e) => {
            warn!(error = %e, "bearer token rejected");
            Err(ApiError::Unauthorized)
        }
    }
}
