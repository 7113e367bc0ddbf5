//! Request extractors with JSON error bodies.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;

use crate::error::ApiError;

/// `axum::Json` whose rejection renders as `{"error": ...}` like every
/// other failure.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
