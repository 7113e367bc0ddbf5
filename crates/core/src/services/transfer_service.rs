use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::debug;

use crate::errors::CoreError;
use crate::models::gift::Gift;
use crate::models::settings::Settings;
use crate::models::transfer::{ExportBundle, EXPORT_VERSION};

use super::gift_service::GiftService;

/// Export assembly and import merge rules. No I/O.
pub struct TransferService {
    gift_service: GiftService,
}

impl TransferService {
    pub fn new() -> Self {
        Self {
            gift_service: GiftService::new(),
        }
    }

    pub fn build_export(
        &self,
        gifts: Vec<Gift>,
        settings: Settings,
        exported_at: DateTime<Utc>,
    ) -> ExportBundle {
        ExportBundle {
            gifts,
            settings,
            exported_at,
            version: EXPORT_VERSION.to_string(),
        }
    }

    /// Every incoming gift needs a name; one bad record rejects the batch.
    pub fn validate_import(&self, gifts: &[Gift]) -> Result<(), CoreError> {
        if let Some(idx) = gifts.iter().position(|g| g.name.is_empty()) {
            return Err(CoreError::ValidationError(format!(
                "Invalid gift data: all gifts must have a name (gift at index {idx} has none)"
            )));
        }
        Ok(())
    }

    /// Combine `existing` with `incoming`.
    ///
    /// - `clear_existing`: the result is the incoming batch alone.
    /// - otherwise existing records are kept untouched and only incoming
    ///   records with an unseen id are appended; colliding ones are dropped.
    ///
    /// Incoming records without an id get a fresh one, and repeated ids
    /// inside the batch keep their first occurrence. Returns the new
    /// collection and how many incoming records made it in.
    pub fn merge_import(
        &self,
        existing: Vec<Gift>,
        incoming: Vec<Gift>,
        clear_existing: bool,
        now: DateTime<Utc>,
    ) -> (Vec<Gift>, usize) {
        let mut collection = if clear_existing { Vec::new() } else { existing };
        let mut seen: HashSet<String> = collection.iter().map(|g| g.id.clone()).collect();
        let mut imported = 0;

        for mut gift in incoming {
            if gift.id.is_empty() {
                gift.id = self.gift_service.next_id(&collection, now);
            }
            if !seen.insert(gift.id.clone()) {
                debug!(gift_id = %gift.id, "Skipping imported gift with an existing id");
                continue;
            }
            gift.retain_complete_stores();
            gift.enforce_history_limit();
            collection.push(gift);
            imported += 1;
        }

        (collection, imported)
    }
}

impl Default for TransferService {
    fn default() -> Self {
        Self::new()
    }
}
