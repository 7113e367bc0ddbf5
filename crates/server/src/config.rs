//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use wishlist_core::storage::config::BackendConfig;

use crate::auth::{AdminPassword, AuthConfig};

const DEFAULT_ADDR: &str = "127.0.0.1:3000";
const PRODUCTION: &str = "production";
const DEFAULT_ENVIRONMENT: &str = PRODUCTION;
const DEFAULT_DATA_DIR: &str = "./data";

/// Wishlist server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address.
    pub addr: SocketAddr,
    /// Deployment environment name. Auth cookies are `Secure` in `production`.
    pub environment: String,
    /// Token signing and admin password.
    pub auth: AuthConfig,
    /// Which key-value backend the store persists into.
    pub backend: BackendConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `WISHLIST_ADDR` | Server bind address | `127.0.0.1:3000` |
    /// | `APP_ENV` | Deployment environment | `production` |
    /// | `JWT_SECRET` | HS256 signing secret | (required) |
    /// | `ADMIN_PASSWORD` | Plaintext admin password | |
    /// | `ADMIN_PASSWORD_HASH` | Argon2 PHC hash, wins over `ADMIN_PASSWORD` | |
    /// | `STORAGE_BACKEND` | `none`, `memory`, `file`, `redis`, `vercel-kv`, `cloudflare-kv` | `none` |
    /// | `DATA_DIR` | Directory for the `file` backend | `./data` |
    /// | `REDIS_URL` | Redis connection URL | (required for `redis`) |
    /// | `KV_REST_API_URL` / `KV_REST_API_TOKEN` | Vercel KV endpoint and token | (required for `vercel-kv`) |
    /// | `CF_ACCOUNT_ID` / `CF_KV_NAMESPACE_ID` / `CF_API_TOKEN` | Cloudflare KV namespace | (required for `cloudflare-kv`) |
    ///
    /// One of `ADMIN_PASSWORD` / `ADMIN_PASSWORD_HASH` must be set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`ServerConfig::from_env`] over an arbitrary variable source.
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let addr_raw = var("WISHLIST_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr_raw
            .parse()
            .map_err(|_| ConfigError::InvalidAddr(addr_raw.clone()))?;

        let environment = var("APP_ENV").unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());

        let jwt_secret = var("JWT_SECRET").ok_or(ConfigError::MissingJwtSecret)?;

        let admin_password = match (var("ADMIN_PASSWORD_HASH"), var("ADMIN_PASSWORD")) {
            (Some(hash), _) => AdminPassword::hash(hash).map_err(ConfigError::InvalidPasswordHash)?,
            (None, Some(plain)) => AdminPassword::Plain(plain),
            (None, None) => return Err(ConfigError::MissingAdminPassword),
        };

        let backend = backend_from(&var)?;

        Ok(Self {
            addr,
            environment,
            auth: AuthConfig::new(jwt_secret, admin_password),
            backend,
        })
    }

    /// Whether auth cookies get the `Secure` attribute.
    pub fn is_production(&self) -> bool {
        is_production(&self.environment)
    }
}

/// `production` is the only environment that serves `Secure` cookies.
pub fn is_production(environment: &str) -> bool {
    environment == PRODUCTION
}

fn backend_from<F>(var: &F) -> Result<BackendConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let kind = var("STORAGE_BACKEND").unwrap_or_else(|| "none".to_string());
    let require = |name: &'static str| {
        var(name).ok_or_else(|| ConfigError::MissingBackendVar {
            backend: kind.clone(),
            var: name,
        })
    };

    let config = match kind.to_ascii_lowercase().as_str() {
        "none" => BackendConfig::None,
        "memory" => BackendConfig::Memory,
        "file" => BackendConfig::File {
            dir: PathBuf::from(var("DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())),
        },
        "redis" => BackendConfig::Redis {
            url: require("REDIS_URL")?,
        },
        "vercel-kv" => BackendConfig::VercelKv {
            url: require("KV_REST_API_URL")?,
            token: require("KV_REST_API_TOKEN")?,
        },
        "cloudflare-kv" => BackendConfig::CloudflareKv {
            account_id: require("CF_ACCOUNT_ID")?,
            namespace_id: require("CF_KV_NAMESPACE_ID")?,
            api_token: require("CF_API_TOKEN")?,
        },
        _ => return Err(ConfigError::UnknownBackend(kind.clone())),
    };
    Ok(config)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid WISHLIST_ADDR format: {0}")]
    InvalidAddr(String),

    #[error("JWT_SECRET environment variable is required")]
    MissingJwtSecret,

    #[error("ADMIN_PASSWORD or ADMIN_PASSWORD_HASH environment variable is required")]
    MissingAdminPassword,

    #[error("ADMIN_PASSWORD_HASH is not a valid Argon2 PHC string: {0}")]
    InvalidPasswordHash(String),

    #[error("Unknown STORAGE_BACKEND: {0}")]
    UnknownBackend(String),

    #[error("{var} environment variable is required for the {backend} backend")]
    MissingBackendVar { backend: String, var: &'static str },
}
