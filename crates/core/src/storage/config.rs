use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::errors::CoreError;

use super::cloudflare_kv::CloudflareKvBackend;
use super::file::JsonFileBackend;
use super::memory::InMemoryBackend;
use super::redis_kv::RedisBackend;
use super::traits::KeyValueBackend;
use super::vercel_kv::VercelKvBackend;

/// Which key-value backend to construct, with everything it needs.
///
/// Selection happens here, at start-up, and the resulting handle is passed
/// into the store. New targets are added as a variant plus an adapter.
#[derive(Clone, PartialEq, Eq)]
pub enum BackendConfig {
    /// No backend: reads return the built-in examples, writes fail.
    None,
    Memory,
    File {
        dir: PathBuf,
    },
    Redis {
        url: String,
    },
    VercelKv {
        url: String,
        token: String,
    },
    CloudflareKv {
        account_id: String,
        namespace_id: String,
        api_token: String,
    },
}

impl BackendConfig {
    /// Short identifier, matching the `STORAGE_BACKEND` values.
    pub fn kind(&self) -> &'static str {
        match self {
            BackendConfig::None => "none",
            BackendConfig::Memory => "memory",
            BackendConfig::File { .. } => "file",
            BackendConfig::Redis { .. } => "redis",
            BackendConfig::VercelKv { .. } => "vercel-kv",
            BackendConfig::CloudflareKv { .. } => "cloudflare-kv",
        }
    }

    /// Build the backend. `Ok(None)` for [`BackendConfig::None`].
    pub async fn connect(&self) -> Result<Option<Arc<dyn KeyValueBackend>>, CoreError> {
        let backend: Arc<dyn KeyValueBackend> = match self {
            BackendConfig::None => return Ok(None),
            BackendConfig::Memory => Arc::new(InMemoryBackend::new()),
            BackendConfig::File { dir } => Arc::new(JsonFileBackend::open(dir.clone()).await?),
            BackendConfig::Redis { url } => Arc::new(RedisBackend::connect(url).await?),
            BackendConfig::VercelKv { url, token } => {
                Arc::new(VercelKvBackend::new(url.clone(), token.clone()))
            }
            BackendConfig::CloudflareKv {
                account_id,
                namespace_id,
                api_token,
            } => Arc::new(CloudflareKvBackend::new(
                account_id.clone(),
                namespace_id.clone(),
                api_token.clone(),
            )),
        };
        info!(backend = backend.name(), "Key-value backend ready");
        Ok(Some(backend))
    }
}

// Credentials stay out of logs.
impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendConfig::File { dir } => f.debug_struct("File").field("dir", dir).finish(),
            other => f.write_str(other.kind()),
        }
    }
}
