//! Application state shared across handlers.

use std::sync::Arc;

use wishlist_core::GiftStore;

use crate::auth::AuthConfig;
use crate::config::{self, ServerConfig};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The wishlist store.
    pub store: Arc<GiftStore>,
    /// Token and password settings.
    pub auth: Arc<AuthConfig>,
    /// Deployment environment name, reported by `/api/status`.
    pub environment: String,
    /// Whether auth cookies carry the `Secure` attribute.
    pub secure_cookies: bool,
}

impl AppState {
    /// Create new application state.
    pub fn new(store: GiftStore, auth: AuthConfig, environment: impl Into<String>) -> Self {
        let environment = environment.into();
        Self {
            store: Arc::new(store),
            auth: Arc::new(auth),
            secure_cookies: config::is_production(&environment),
            environment,
        }
    }

    /// Build state from a loaded [`ServerConfig`].
    pub fn from_config(store: GiftStore, config: &ServerConfig) -> Self {
        Self {
            store: Arc::new(store),
            auth: Arc::new(config.auth.clone()),
            environment: config.environment.clone(),
            secure_cookies: config.is_production(),
        }
    }
}
