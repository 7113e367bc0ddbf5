use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::errors::CoreError;

use super::traits::KeyValueBackend;

const BACKEND_NAME: &str = "cloudflare-kv";
const API_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

/// Cloudflare Workers KV backend, via the account-scoped REST API.
///
/// - **Auth**: API token with `Workers KV Storage:Edit`.
/// - **Endpoint**: `.../accounts/{account}/storage/kv/namespaces/{namespace}/values/{key}`
///   (`GET` returns the raw value or 404, `PUT` takes the raw value).
pub struct CloudflareKvBackend {
    client: Client,
    base_url: String,
    account_id: String,
    namespace_id: String,
    api_token: String,
}

impl CloudflareKvBackend {
    pub fn new(
        account_id: impl Into<String>,
        namespace_id: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: API_BASE_URL.to_string(),
            account_id: account_id.into(),
            namespace_id: namespace_id.into(),
            api_token: api_token.into(),
        }
    }

    /// Point at a different API host (e.g. a local emulator).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn value_url(&self, key: &str) -> String {
        format!(
            "{}/accounts/{}/storage/kv/namespaces/{}/values/{key}",
            self.base_url, self.account_id, self.namespace_id
        )
    }
}

// ── Cloudflare API envelope (only used for error reporting) ─────────

#[derive(Deserialize)]
struct ApiEnvelope {
    #[serde(default)]
    errors: Vec<ApiMessage>,
}

#[derive(Deserialize)]
struct ApiMessage {
    message: String,
}

fn api_error(key: &str, status: StatusCode, body: &str) -> CoreError {
    let detail = serde_json::from_str::<ApiEnvelope>(body)
        .ok()
        .and_then(|env| env.errors.into_iter().next())
        .map(|m| m.message)
        .unwrap_or_else(|| body.chars().take(200).collect());
    CoreError::Backend {
        backend: BACKEND_NAME.into(),
        message: format!("{key}: HTTP {status}: {detail}"),
    }
}

#[async_trait]
impl KeyValueBackend for CloudflareKvBackend {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, CoreError> {
        let resp = self
            .client
            .get(self.value_url(key))
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(api_error(key, status, &body));
        }

        Ok(Some(serde_json::from_str(&body)?))
    }

    async fn put(&self, key: &str, value: &Value) -> Result<(), CoreError> {
        let body = serde_json::to_string(value)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize {key}: {e}")))?;

        let resp = self
            .client
            .put(self.value_url(key))
            .bearer_auth(&self.api_token)
            .header(CONTENT_TYPE, "text/plain")
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(api_error(key, status, &body));
        }
        Ok(())
    }
}
