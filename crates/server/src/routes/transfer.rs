//! Export download and import upload.

use axum::extract::State;
use axum::http::header::CONTENT_DISPOSITION;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};

use wishlist_core::models::transfer::{ImportRequest, EXPORT_FILE_NAME};

use crate::auth::AdminSession;
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;

/// `GET /api/export`: the whole wishlist as a downloadable JSON file.
pub async fn export(State(state): State<AppState>) -> impl IntoResponse {
    let bundle = state.store.export_all().await;
    (
        [(
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
        )],
        Json(bundle),
    )
}

/// `POST /api/import`: `{gifts, settings?, clearExisting}`.
pub async fn import(
    State(state): State<AppState>,
    _admin: AdminSession,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Json<Value>> {
    let request = ImportRequest::from_json(body)?;
    let summary = state.store.import_all(request).await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("Successfully imported {} gift(s)", summary.total_gift_count),
        "imported": {
            "gifts": summary.total_gift_count,
            "added": summary.imported_gift_count,
            "settings": summary.imported_settings,
        }
    })))
}
