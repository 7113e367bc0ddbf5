//! Gift endpoints. Reads are public; writes need an [`AdminSession`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use wishlist_core::models::gift::{Gift, GiftUpdate, NewGift, MANUAL_SOURCE};

use crate::auth::AdminSession;
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::state::AppState;

/// Body of `PATCH /api/gifts/{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct TrackPriceBody {
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

/// Body of `POST /api/gifts/track-price`.
#[derive(Debug, Default, Deserialize)]
pub struct TrackPriceByIdBody {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

pub async fn list(State(state): State<AppState>) -> Json<Vec<Gift>> {
    Json(state.store.list_gifts().await)
}

pub async fn create(
    State(state): State<AppState>,
    _admin: AdminSession,
    ApiJson(new_gift): ApiJson<NewGift>,
) -> ApiResult<(StatusCode, Json<Gift>)> {
    if !new_gift.has_required_fields() {
        return Err(ApiError::BadRequest("Name and price are required".into()));
    }
    debug!(
        name = %new_gift.name,
        has_image = !new_gift.image.is_empty(),
        stores = new_gift.stores.len(),
        "Creating gift"
    );
    let gift = state.store.add_gift(new_gift).await?;
    Ok((StatusCode::CREATED, Json(gift)))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Gift>> {
    state
        .store
        .get_gift(&id)
        .await
        .map(Json)
        .ok_or_else(ApiError::gift_not_found)
}

pub async fn update(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<GiftUpdate>,
) -> ApiResult<Json<Gift>> {
    state
        .store
        .update_gift(&id, update)
        .await?
        .map(Json)
        .ok_or_else(ApiError::gift_not_found)
}

pub async fn track_price(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<TrackPriceBody>,
) -> ApiResult<Json<Gift>> {
    let price =
        non_empty(body.price).ok_or_else(|| ApiError::BadRequest("Price is required".into()))?;
    let source = non_empty(body.source).unwrap_or_else(|| MANUAL_SOURCE.to_string());
    state
        .store
        .track_price(&id, &price, &source)
        .await?
        .map(Json)
        .ok_or_else(ApiError::gift_not_found)
}

pub async fn track_price_by_id(
    State(state): State<AppState>,
    _admin: AdminSession,
    ApiJson(body): ApiJson<TrackPriceByIdBody>,
) -> ApiResult<Json<Gift>> {
    let (Some(id), Some(price)) = (non_empty(body.id), non_empty(body.price)) else {
        return Err(ApiError::BadRequest("Gift ID and price are required".into()));
    };
    let source = non_empty(body.source).unwrap_or_else(|| MANUAL_SOURCE.to_string());
    state
        .store
        .track_price(&id, &price, &source)
        .await?
        .map(Json)
        .ok_or_else(ApiError::gift_not_found)
}

pub async fn delete(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    if state.store.delete_gift(&id).await? {
        Ok(Json(json!({ "success": true })))
    } else {
        Err(ApiError::gift_not_found())
    }
}
