//! Login, logout and session check.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::auth::{cleared_cookie, session_cookie};
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: Option<String>,
}

/// `POST /api/login`: exchange the admin password for a session cookie.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let password = body.password.unwrap_or_default();
    if !state.auth.verify_password(&password) {
        warn!("Rejected admin login");
        return Err(ApiError::Unauthorized("Invalid password".into()));
    }

    let token = state
        .auth
        .create_token()
        .map_err(|e| ApiError::Internal(format!("Failed to sign token: {e}")))?;
    let cookie = session_cookie(
        &token,
        state.auth.token_ttl().num_seconds(),
        state.secure_cookies,
    );

    info!("Admin logged in");
    Ok(([(SET_COOKIE, cookie)], Json(json!({ "success": true }))))
}

/// `DELETE /api/login`: clear the session cookie.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(SET_COOKIE, cleared_cookie(state.secure_cookies))],
        Json(json!({ "success": true })),
    )
}

/// `GET /api/auth/check`
pub async fn check(State(state): State<AppState>, headers: HeaderMap) -> Json<serde_json::Value> {
    Json(json!({ "authenticated": state.auth.is_authenticated(&headers) }))
}
