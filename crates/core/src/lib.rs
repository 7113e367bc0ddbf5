pub mod errors;
pub mod models;
pub mod services;
pub mod storage;

use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use errors::CoreError;
use models::{
    gift::{example_gifts, Gift, GiftUpdate, NewGift},
    settings::Settings,
    transfer::{ExportBundle, ImportRequest, ImportSummary},
};
use services::{gift_service::GiftService, transfer_service::TransferService};
use storage::keys::{GIFTS_KEY, SETTINGS_KEY};
use storage::traits::KeyValueBackend;

/// Main entry point for the wishlist core library.
///
/// Sole owner of the persisted gift collection and settings record. Every
/// operation loads the whole JSON value for its key, applies the change in
/// memory, and writes it back with one `put`. There is no locking: two
/// concurrent writers race and the last write wins.
///
/// Without a backend, reads fall back to the built-in example gifts and
/// default settings, and every write fails with
/// [`CoreError::StorageUnavailable`].
#[must_use]
pub struct GiftStore {
    backend: Option<Arc<dyn KeyValueBackend>>,
    gift_service: GiftService,
    transfer_service: TransferService,
}

impl std::fmt::Debug for GiftStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GiftStore")
            .field("backend", &self.backend_name())
            .finish()
    }
}

impl GiftStore {
    /// Store persisting into `backend`.
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self::with_backend(Some(backend))
    }

    /// Store with no backend (stateless example data, read-only).
    pub fn unconfigured() -> Self {
        Self::with_backend(None)
    }

    pub fn with_backend(backend: Option<Arc<dyn KeyValueBackend>>) -> Self {
        Self {
            backend,
            gift_service: GiftService::new(),
            transfer_service: TransferService::new(),
        }
    }

    #[must_use]
    pub fn backend_name(&self) -> Option<&str> {
        self.backend.as_deref().map(|b| b.name())
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    /// Close the backend. Call once on shutdown.
    pub async fn close(&self) -> Result<(), CoreError> {
        match &self.backend {
            Some(backend) => backend.close().await,
            None => Ok(()),
        }
    }

    // ── Gifts ───────────────────────────────────────────────────────

    /// The full collection, in insertion order.
    ///
    /// The first read against an empty backend seeds it with the example
    /// gifts. Backend failures are logged and degrade to the examples.
    pub async fn list_gifts(&self) -> Vec<Gift> {
        let Some(backend) = self.backend.as_deref() else {
            return example_gifts();
        };

        match backend.get(GIFTS_KEY).await {
            Ok(Some(raw)) => match serde_json::from_value::<Vec<Gift>>(raw) {
                Ok(gifts) => gifts,
                Err(e) => {
                    warn!(backend = backend.name(), error = %e, "Stored gifts are unreadable, serving examples");
                    example_gifts()
                }
            },
            Ok(None) => {
                let seeds = example_gifts();
                if let Err(e) = Self::persist_gifts(backend, &seeds).await {
                    warn!(backend = backend.name(), error = %e, "Failed to seed example gifts");
                } else {
                    info!(backend = backend.name(), count = seeds.len(), "Seeded example gifts");
                }
                seeds
            }
            Err(e) => {
                warn!(backend = backend.name(), error = %e, "Failed to read gifts, serving examples");
                example_gifts()
            }
        }
    }

    #[must_use]
    pub async fn get_gift(&self, id: &str) -> Option<Gift> {
        let gifts = self.list_gifts().await;
        self.gift_service.find(&gifts, id).cloned()
    }

    /// Create a gift. Callers validate required fields beforehand.
    pub async fn add_gift(&self, new_gift: NewGift) -> Result<Gift, CoreError> {
        let backend = self.require_backend()?;
        let mut gifts = Self::load_gifts_for_write(backend).await?;
        let gift = self.gift_service.add_gift(&mut gifts, new_gift, Utc::now());
        Self::persist_gifts(backend, &gifts).await?;
        info!(gift_id = %gift.id, name = %gift.name, "Gift created");
        Ok(gift)
    }

    /// Shallow-merge `update` over the stored gift. `Ok(None)` if unknown.
    pub async fn update_gift(
        &self,
        id: &str,
        update: GiftUpdate,
    ) -> Result<Option<Gift>, CoreError> {
        let backend = self.require_backend()?;
        let mut gifts = Self::load_gifts_for_write(backend).await?;
        let Some(updated) = self.gift_service.update_gift(&mut gifts, id, update) else {
            return Ok(None);
        };
        Self::persist_gifts(backend, &gifts).await?;
        debug!(gift_id = %id, "Gift updated");
        Ok(Some(updated))
    }

    /// Record a new price observation and make it the current price, in a
    /// single write. `Ok(None)` if the id is unknown.
    pub async fn track_price(
        &self,
        id: &str,
        price: &str,
        source: &str,
    ) -> Result<Option<Gift>, CoreError> {
        let backend = self.require_backend()?;
        let mut gifts = Self::load_gifts_for_write(backend).await?;
        let Some(updated) = self
            .gift_service
            .track_price(&mut gifts, id, price, source, Utc::now())
        else {
            return Ok(None);
        };
        Self::persist_gifts(backend, &gifts).await?;
        info!(gift_id = %id, price, source, "Price tracked");
        Ok(Some(updated))
    }

    /// Remove a gift. `Ok(false)` if nothing had that id.
    pub async fn delete_gift(&self, id: &str) -> Result<bool, CoreError> {
        let backend = self.require_backend()?;
        let mut gifts = Self::load_gifts_for_write(backend).await?;
        if !self.gift_service.delete_gift(&mut gifts, id) {
            return Ok(false);
        }
        Self::persist_gifts(backend, &gifts).await?;
        info!(gift_id = %id, "Gift deleted");
        Ok(true)
    }

    // ── Settings ────────────────────────────────────────────────────

    /// Stored settings over the defaults. Never writes.
    pub async fn get_settings(&self) -> Settings {
        let Some(backend) = self.backend.as_deref() else {
            return Settings::default();
        };

        match backend.get(SETTINGS_KEY).await {
            Ok(Some(raw)) => serde_json::from_value(raw).unwrap_or_else(|e| {
                warn!(backend = backend.name(), error = %e, "Stored settings are unreadable, using defaults");
                Settings::default()
            }),
            Ok(None) => Settings::default(),
            Err(e) => {
                warn!(backend = backend.name(), error = %e, "Failed to read settings, using defaults");
                Settings::default()
            }
        }
    }

    /// Overwrite the stored settings with `settings` as given.
    ///
    /// Unlike [`GiftStore::update_gift`] this does not merge: callers that
    /// accept partial input merge over [`GiftStore::get_settings`] first.
    pub async fn save_settings(&self, settings: &Settings) -> Result<(), CoreError> {
        let backend = self.require_backend()?;
        let raw = serde_json::to_value(settings)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize settings: {e}")))?;
        backend
            .put(SETTINGS_KEY, &raw)
            .await
            .map_err(CoreError::into_storage_unavailable)?;
        debug!("Settings saved");
        Ok(())
    }

    // ── Import / Export ─────────────────────────────────────────────

    /// Snapshot of gifts and settings with a timestamp and schema version.
    pub async fn export_all(&self) -> ExportBundle {
        let gifts = self.list_gifts().await;
        let settings = self.get_settings().await;
        self.transfer_service
            .build_export(gifts, settings, Utc::now())
    }

    /// Import a batch of gifts and, optionally, settings.
    ///
    /// The batch is validated first; one nameless gift rejects all of it.
    ///
    /// Gifts and settings live under separate keys and are written in that
    /// order. If the settings write fails the error is returned, but the new
    /// gift collection has already been stored.
    pub async fn import_all(&self, request: ImportRequest) -> Result<ImportSummary, CoreError> {
        self.transfer_service.validate_import(&request.gifts)?;
        let backend = self.require_backend()?;

        let existing = if request.clear_existing {
            Vec::new()
        } else {
            Self::load_gifts_for_write(backend).await?
        };
        let (gifts, imported) = self.transfer_service.merge_import(
            existing,
            request.gifts,
            request.clear_existing,
            Utc::now(),
        );
        Self::persist_gifts(backend, &gifts).await?;

        let imported_settings = match &request.settings {
            Some(settings) => {
                if let Err(e) = self.save_settings(settings).await {
                    warn!(
                        total = gifts.len(),
                        error = %e,
                        "Import stored gifts but failed to store settings"
                    );
                    return Err(e);
                }
                true
            }
            None => false,
        };

        info!(
            imported,
            total = gifts.len(),
            clear_existing = request.clear_existing,
            imported_settings,
            "Import complete"
        );

        Ok(ImportSummary {
            imported_gift_count: imported,
            total_gift_count: gifts.len(),
            imported_settings,
        })
    }

    // ── Persistence helpers ─────────────────────────────────────────

    fn require_backend(&self) -> Result<&dyn KeyValueBackend, CoreError> {
        self.backend.as_deref().ok_or_else(|| {
            CoreError::StorageUnavailable("no key-value backend is configured".into())
        })
    }

    /// Load the collection for a read-modify-write. Unlike
    /// [`GiftStore::list_gifts`], a failed or unreadable read aborts the write
    /// rather than replacing stored data with the examples.
    async fn load_gifts_for_write(backend: &dyn KeyValueBackend) -> Result<Vec<Gift>, CoreError> {
        let raw = backend
            .get(GIFTS_KEY)
            .await
            .map_err(CoreError::into_storage_unavailable)?;
        match raw {
            Some(raw) => serde_json::from_value(raw).map_err(|e| {
                CoreError::StorageUnavailable(format!("Stored gifts are unreadable: {e}"))
            }),
            None => Ok(example_gifts()),
        }
    }

    async fn persist_gifts(backend: &dyn KeyValueBackend, gifts: &[Gift]) -> Result<(), CoreError> {
        let raw: Value = serde_json::to_value(gifts)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize gifts: {e}")))?;
        backend
            .put(GIFTS_KEY, &raw)
            .await
            .map_err(CoreError::into_storage_unavailable)
    }
}
