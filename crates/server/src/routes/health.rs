//! Health and deployment status endpoints.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct Health {
    pub status: String,
}

/// Liveness probe.
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    /// Active backend name, or `"none"`.
    pub storage: String,
    pub backend_configured: bool,
    pub environment: String,
}

/// Which backend is active, for the admin panel.
pub async fn status(State(state): State<AppState>) -> Json<Status> {
    Json(Status {
        storage: state.store.backend_name().unwrap_or("none").to_string(),
        backend_configured: state.store.is_configured(),
        environment: state.environment.clone(),
    })
}
