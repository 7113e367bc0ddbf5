use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{AsyncCommands, Client};
use serde_json::Value;
use std::time::Duration;

use crate::errors::CoreError;

use super::traits::KeyValueBackend;

/// Redis backend. Each key holds the JSON text of its value.
///
/// The connection manager reconnects on its own and is cheap to clone, so
/// one instance serves every concurrent request.
pub struct RedisBackend {
    conn: ConnectionManager,
}

impl RedisBackend {
    /// Connect to `url` (e.g. `redis://127.0.0.1:6379`).
    pub async fn connect(url: &str) -> Result<Self, CoreError> {
        let config = ConnectionManagerConfig::new()
            .set_number_of_retries(1)
            .set_connection_timeout(Duration::from_secs(5));

        let client = Client::open(url).map_err(|e| {
            CoreError::StorageUnavailable(format!("Invalid REDIS_URL: {e}"))
        })?;
        let conn = client
            .get_connection_manager_with_config(config)
            .await
            .map_err(|e| CoreError::StorageUnavailable(format!("Redis not connected: {e}")))?;

        Ok(Self { conn })
    }
}

#[async_trait]
impl KeyValueBackend for RedisBackend {
    fn name(&self) -> &str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, CoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(key).await?;
        raw.map(|text| serde_json::from_str(&text))
            .transpose()
            .map_err(CoreError::from)
    }

    async fn put(&self, key: &str, value: &Value) -> Result<(), CoreError> {
        let raw = serde_json::to_string(value)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize {key}: {e}")))?;
        let mut conn = self.conn.clone();
        let _: () = conn.set(key, raw).await?;
        Ok(())
    }
}
