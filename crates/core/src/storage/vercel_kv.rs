use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::errors::CoreError;

use super::traits::KeyValueBackend;

const BACKEND_NAME: &str = "vercel-kv";

/// Vercel KV (Upstash Redis REST API) backend.
///
/// - **Auth**: bearer token (`KV_REST_API_TOKEN`).
/// - **Endpoints**: `GET {url}/get/{key}`, `POST {url}/set/{key}` with the
///   value as the raw request body.
/// - Values are stored as JSON text; `result` comes back as a string or `null`.
pub struct VercelKvBackend {
    client: Client,
    base_url: String,
    token: String,
}

impl VercelKvBackend {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }
}

// ── Upstash REST response types ─────────────────────────────────────

#[derive(Deserialize)]
struct RestResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

impl RestResponse {
    fn into_result(self, key: &str) -> Result<Option<Value>, CoreError> {
        match self.error {
            Some(message) => Err(CoreError::Backend {
                backend: BACKEND_NAME.into(),
                message: format!("{key}: {message}"),
            }),
            None => Ok(self.result),
        }
    }
}

#[async_trait]
impl KeyValueBackend for VercelKvBackend {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, CoreError> {
        let url = format!("{}/get/{key}", self.base_url);

        let resp: RestResponse = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Backend {
                backend: BACKEND_NAME.into(),
                message: format!("Failed to parse response for {key}: {e}"),
            })?;

        match resp.into_result(key)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(text)) => Ok(Some(serde_json::from_str(&text)?)),
            // Already-decoded JSON (written by another client) is taken as-is.
            Some(other) => Ok(Some(other)),
        }
    }

    async fn put(&self, key: &str, value: &Value) -> Result<(), CoreError> {
        let url = format!("{}/set/{key}", self.base_url);
        let body = serde_json::to_string(value)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize {key}: {e}")))?;

        let resp: RestResponse = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .body(body)
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Backend {
                backend: BACKEND_NAME.into(),
                message: format!("Failed to parse response for {key}: {e}"),
            })?;

        resp.into_result(key).map(|_| ())
    }
}
