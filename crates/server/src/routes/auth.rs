use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::ApiError;
use crate::middleware::AdminPrincipal;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct AuthStatus {
    pub authenticated: bool,
    pub user: String,
}

/// Exchange the admin password for an access token.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    match state.issuer.issue(&input.password) {
        Ok(token) => {
            info!("admin login successful");
            Ok(Json(TokenResponse {
                token,
                token_type: "bearer",
                expires_in: state.issuer.ttl_seconds(),
            }))
        }
        Err(e) => {
            warn!(error = %e, "failed login attempt");
            Err(ApiError::Unauthorized)
        }
    }
}

/// Report the current authentication status; runs behind `require_admin`.
pub async fn verify(Extension(principal): Extension<AdminPrincipal>) -> Json<AuthStatus> {
    Json(AuthStatus { authenticated: true, user: principal.0 })
}

/// Token invalidation happens client-side; this is an acknowledgement only.
pub async fn logout() -> Json<serde_json::Value> {
    Json(serde_json::json!({"message": "Logged out successfully"}))
}
