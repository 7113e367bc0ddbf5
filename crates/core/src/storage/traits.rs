use async_trait::async_trait;
use serde_json::Value;

use crate::errors::CoreError;

/// Trait abstraction for the key-value store the wishlist persists into.
///
/// Each deployment target (process memory, local files, Redis, Vercel KV,
/// Cloudflare KV) implements this trait. The gift store only ever reads and
/// writes whole JSON values under fixed keys, so swapping targets never
/// touches the store itself.
///
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait KeyValueBackend: Send + Sync {
    /// Human-readable name of this backend (for logs/errors).
    fn name(&self) -> &str;

    /// Read the value stored under `key`, or `None` if nothing is stored.
    async fn get(&self, key: &str) -> Result<Option<Value>, CoreError>;

    /// Store `value` under `key`, replacing whatever was there.
    async fn put(&self, key: &str, value: &Value) -> Result<(), CoreError>;

    /// Release connections on shutdown.
    async fn close(&self) -> Result<(), CoreError> {
        Ok(())
    }
}
