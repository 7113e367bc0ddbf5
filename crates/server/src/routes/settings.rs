//! Display settings endpoints.

use axum::extract::State;
use axum::Json;

use wishlist_core::models::settings::{Settings, SettingsUpdate};

use crate::auth::AdminSession;
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;

pub async fn get(State(state): State<AppState>) -> Json<Settings> {
    Json(state.store.get_settings().await)
}

/// Merge the partial body over the current settings and save the result.
pub async fn update(
    State(state): State<AppState>,
    _admin: AdminSession,
    ApiJson(update): ApiJson<SettingsUpdate>,
) -> ApiResult<Json<Settings>> {
    let merged = state.store.get_settings().await.merged(update);
    state.store.save_settings(&merged).await?;
    Ok(Json(merged))
}
