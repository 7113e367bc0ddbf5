//! Route table.

pub mod auth;
pub mod gifts;
pub mod health;
pub mod settings;
pub mod transfer;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/status", get(health::status))
        // Session
        .route("/api/login", post(auth::login).delete(auth::logout))
        .route("/api/auth/check", get(auth::check))
        // Gifts
        .route("/api/gifts", get(gifts::list).post(gifts::create))
        .route("/api/gifts/track-price", post(gifts::track_price_by_id))
        .route(
            "/api/gifts/{id}",
            get(gifts::get_one)
                .put(gifts::update)
                .patch(gifts::track_price)
                .delete(gifts::delete),
        )
        // Settings
        .route("/api/settings", get(settings::get).put(settings::update))
        // Import / export
        .route("/api/export", get(transfer::export))
        .route("/api/import", post(transfer::import))
}
