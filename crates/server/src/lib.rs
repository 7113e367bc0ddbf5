//! HTTP API for the gift wishlist.
//!
//! Public visitors read gifts and settings; the admin logs in with a
//! password and gets a session cookie for everything that writes.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::state::AppState;

/// Full application: routes, request tracing, and state.
pub fn app(state: AppState) -> Router {
    routes::router()
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
