use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::errors::CoreError;

use super::traits::KeyValueBackend;

/// Process-local backend. Contents live as long as the process does.
///
/// Useful for tests and single-instance deployments that don't need
/// durability.
#[derive(Default)]
pub struct InMemoryBackend {
    entries: RwLock<HashMap<String, Value>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueBackend for InMemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, CoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &Value) -> Result<(), CoreError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.clone());
        Ok(())
    }
}
