use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::CoreError;

use super::gift::Gift;
use super::settings::Settings;

/// Schema version written into every export file.
pub const EXPORT_VERSION: &str = "1.0";

/// Suggested file name for downloaded exports.
pub const EXPORT_FILE_NAME: &str = "christmas-list-export.json";

/// Snapshot of the whole wishlist, for download or clipboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub gifts: Vec<Gift>,
    pub settings: Settings,
    pub exported_at: DateTime<Utc>,
    pub version: String,
}

/// A parsed import payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRequest {
    pub gifts: Vec<Gift>,
    /// Replaces the stored settings wholesale when present.
    pub settings: Option<Settings>,
    /// Replace the collection instead of merging into it.
    pub clear_existing: bool,
}

impl ImportRequest {
    pub fn new(gifts: Vec<Gift>, settings: Option<Settings>, clear_existing: bool) -> Self {
        Self {
            gifts,
            settings,
            clear_existing,
        }
    }

    /// Parse a raw `{gifts, settings?, clearExisting}` body.
    ///
    /// `gifts` must be an array of gift objects; anything else rejects the
    /// whole payload. A `settings` value that is not an object is ignored.
    /// The `exportedAt`/`version` wrapper of an export file is accepted and
    /// discarded, so an export can be posted back as-is.
    pub fn from_json(value: Value) -> Result<Self, CoreError> {
        let Value::Object(mut body) = value else {
            return Err(CoreError::MalformedInput(
                "import payload must be a JSON object".into(),
            ));
        };

        let gifts = match body.remove("gifts") {
            Some(Value::Array(items)) => items
                .into_iter()
                .enumerate()
                .map(|(idx, item)| {
                    serde_json::from_value::<Gift>(item).map_err(|e| {
                        CoreError::MalformedInput(format!("gift at index {idx} is invalid: {e}"))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
            _ => {
                return Err(CoreError::MalformedInput(
                    "Invalid data format: gifts must be an array".into(),
                ))
            }
        };

        let settings = match body.remove("settings") {
            Some(raw @ Value::Object(_)) => Some(serde_json::from_value::<Settings>(raw).map_err(
                |e| CoreError::MalformedInput(format!("settings are invalid: {e}")),
            )?),
            _ => None,
        };

        let clear_existing = body
            .get("clearExisting")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Ok(Self {
            gifts,
            settings,
            clear_existing,
        })
    }
}

impl From<ExportBundle> for ImportRequest {
    /// Re-import an export, replacing everything currently stored.
    fn from(bundle: ExportBundle) -> Self {
        Self {
            gifts: bundle.gifts,
            settings: Some(bundle.settings),
            clear_existing: true,
        }
    }
}

/// Outcome of an import, for caller reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    /// Incoming records actually written (after id dedup).
    pub imported_gift_count: usize,
    /// Size of the collection after the import.
    pub total_gift_count: usize,
    pub imported_settings: bool,
}
