use thiserror::Error;

/// Unified error type for the entire wishlist-core library.
///
/// There is no not-found variant: lookups by id return `Option`/`bool`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Storage ─────────────────────────────────────────────────────
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Backend error ({backend}): {message}")]
    Backend {
        backend: String,
        message: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("File I/O error: {0}")]
    FileIO(String),

    #[error("Network error: {0}")]
    Network(String),

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),
}

impl CoreError {
    /// Wrap any failure on a write path as `StorageUnavailable`, keeping the
    /// original message. Already-wrapped errors pass through unchanged.
    pub(crate) fn into_storage_unavailable(self) -> Self {
        match self {
            CoreError::StorageUnavailable(_) => self,
            other => CoreError::StorageUnavailable(other.to_string()),
        }
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // KV REST endpoints are addressed by URL; strip any query string so
        // credentials passed that way never reach the logs.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}

impl From<redis::RedisError> for CoreError {
    fn from(e: redis::RedisError) -> Self {
        CoreError::Backend {
            backend: "redis".into(),
            message: e.to_string(),
        }
    }
}
