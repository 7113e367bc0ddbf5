// ═══════════════════════════════════════════════════════════════════
// Store Tests: GiftStore operations against real and failing backends
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use wishlist_core::errors::CoreError;
use wishlist_core::models::gift::{
    example_gifts, Gift, GiftUpdate, NewGift, Priority, StoreLink, PRICE_HISTORY_LIMIT,
};
use wishlist_core::models::settings::{Settings, SettingsUpdate};
use wishlist_core::models::transfer::{ImportRequest, EXPORT_VERSION};
use wishlist_core::storage::keys::{GIFTS_KEY, SETTINGS_KEY};
use wishlist_core::storage::memory::InMemoryBackend;
use wishlist_core::storage::traits::KeyValueBackend;
use wishlist_core::GiftStore;

// ═══════════════════════════════════════════════════════════════════
// Test Helpers: Mock Backends
// ═══════════════════════════════════════════════════════════════════

/// A backend whose every call fails.
struct FailingBackend;

#[async_trait]
impl KeyValueBackend for FailingBackend {
    fn name(&self) -> &str {
        "failing"
    }

    async fn get(&self, _key: &str) -> Result<Option<Value>, CoreError> {
        Err(CoreError::Network("connection refused".into()))
    }

    async fn put(&self, _key: &str, _value: &Value) -> Result<(), CoreError> {
        Err(CoreError::Network("connection refused".into()))
    }
}

/// Reads work, writes fail. Counts write attempts.
#[derive(Default)]
struct ReadOnlyBackend {
    inner: InMemoryBackend,
    puts: AtomicUsize,
}

#[async_trait]
impl KeyValueBackend for ReadOnlyBackend {
    fn name(&self) -> &str {
        "read-only"
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, CoreError> {
        self.inner.get(key).await
    }

    async fn put(&self, _key: &str, _value: &Value) -> Result<(), CoreError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        Err(CoreError::Backend {
            backend: "read-only".into(),
            message: "quota exceeded".into(),
        })
    }
}

/// Memory backend that counts writes.
#[derive(Default)]
struct CountingBackend {
    inner: InMemoryBackend,
    puts: AtomicUsize,
}

#[async_trait]
impl KeyValueBackend for CountingBackend {
    fn name(&self) -> &str {
        "counting"
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, CoreError> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: &Value) -> Result<(), CoreError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.put(key, value).await
    }
}

/// Memory backend that refuses writes to the settings key.
#[derive(Default)]
struct SettingsLockedBackend {
    inner: InMemoryBackend,
}

#[async_trait]
impl KeyValueBackend for SettingsLockedBackend {
    fn name(&self) -> &str {
        "settings-locked"
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, CoreError> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: &Value) -> Result<(), CoreError> {
        if key == SETTINGS_KEY {
            return Err(CoreError::Network("connection reset".into()));
        }
        self.inner.put(key, value).await
    }
}

fn memory_store() -> (GiftStore, Arc<InMemoryBackend>) {
    let backend = Arc::new(InMemoryBackend::new());
    (GiftStore::new(backend.clone()), backend)
}

/// Store whose collection starts out empty instead of seeded.
async fn empty_store() -> (GiftStore, Arc<InMemoryBackend>) {
    let (store, backend) = memory_store();
    backend.put(GIFTS_KEY, &json!([])).await.unwrap();
    (store, backend)
}

fn named_gift(id: &str, name: &str) -> Gift {
    serde_json::from_value(json!({ "id": id, "name": name, "price": "$10" })).unwrap()
}

// ═══════════════════════════════════════════════════════════════════
// list / get
// ═══════════════════════════════════════════════════════════════════

mod listing {
    use super::*;

    #[tokio::test]
    async fn first_read_seeds_backend_with_examples() {
        let (store, backend) = memory_store();
        let gifts = store.list_gifts().await;
        assert_eq!(gifts, example_gifts());

        let stored = backend.get(GIFTS_KEY).await.unwrap().unwrap();
        let stored: Vec<Gift> = serde_json::from_value(stored).unwrap();
        assert_eq!(stored, example_gifts());
    }

    #[tokio::test]
    async fn unconfigured_store_serves_examples_without_state() {
        let store = GiftStore::unconfigured();
        assert_eq!(store.list_gifts().await.len(), 2);
        assert!(store.add_gift(NewGift::new("Lamp", "$20")).await.is_err());
        assert_eq!(store.list_gifts().await.len(), 2);
    }

    #[tokio::test]
    async fn failing_backend_reads_degrade_to_examples() {
        let store = GiftStore::new(Arc::new(FailingBackend));
        assert_eq!(store.list_gifts().await, example_gifts());
        assert_eq!(store.get_gift("1").await.unwrap().name, "Sony WH-1000XM5 Headphones");
    }

    #[tokio::test]
    async fn unreadable_blob_degrades_to_examples() {
        let (store, backend) = memory_store();
        backend.put(GIFTS_KEY, &json!({"not": "a list"})).await.unwrap();
        assert_eq!(store.list_gifts().await, example_gifts());
    }

    #[tokio::test]
    async fn seed_write_failure_still_returns_examples() {
        let backend = Arc::new(ReadOnlyBackend::default());
        let store = GiftStore::new(backend.clone());
        assert_eq!(store.list_gifts().await, example_gifts());
        assert_eq!(backend.puts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn get_unknown_id_is_none() {
        let (store, _) = memory_store();
        assert!(store.get_gift("nope").await.is_none());
    }

    #[tokio::test]
    async fn legacy_records_without_history_load() {
        let (store, backend) = memory_store();
        backend
            .put(GIFTS_KEY, &json!([{ "id": "7", "name": "Scarf", "price": "$15" }]))
            .await
            .unwrap();
        let gift = store.get_gift("7").await.unwrap();
        assert!(gift.price_history.is_empty());
        assert_eq!(gift.priority, Priority::Medium);
        assert!(gift.stores.is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
// add
// ═══════════════════════════════════════════════════════════════════

mod add {
    use super::*;

    #[tokio::test]
    async fn assigns_unique_ids() {
        let (store, _) = memory_store();
        let mut ids = HashSet::new();
        for i in 0..25 {
            let gift = store
                .add_gift(NewGift::new(format!("Gift {i}"), "$1"))
                .await
                .unwrap();
            assert!(ids.insert(gift.id.clone()), "duplicate id {}", gift.id);
        }
        let all = store.list_gifts().await;
        let all_ids: HashSet<_> = all.iter().map(|g| g.id.clone()).collect();
        assert_eq!(all_ids.len(), all.len());
        assert_eq!(all.len(), 27);
    }

    #[tokio::test]
    async fn applies_defaults_and_appends() {
        let (store, _) = empty_store().await;
        let gift = store.add_gift(NewGift::new("Mug", "$12")).await.unwrap();
        assert_eq!(gift.priority, Priority::Medium);
        assert_eq!(gift.image, "");
        assert_eq!(gift.description, "");
        assert!(gift.stores.is_empty());
        assert!(gift.price_history.is_empty());
        assert_eq!(store.list_gifts().await, vec![gift]);
    }

    #[tokio::test]
    async fn drops_incomplete_store_links() {
        let (store, _) = empty_store().await;
        let mut new_gift = NewGift::new("Mug", "$12").with_store("Etsy", "https://etsy.com");
        new_gift.stores.push(StoreLink::new("", "https://nowhere.example"));
        new_gift.stores.push(StoreLink::new("Nameless", ""));
        let gift = store.add_gift(new_gift).await.unwrap();
        assert_eq!(gift.stores, vec![StoreLink::new("Etsy", "https://etsy.com")]);
    }

    #[tokio::test]
    async fn first_add_keeps_the_examples() {
        let (store, _) = memory_store();
        store.add_gift(NewGift::new("Mug", "$12")).await.unwrap();
        let gifts = store.list_gifts().await;
        assert_eq!(gifts.len(), 3);
        assert_eq!(gifts[0].id, "1");
        assert_eq!(gifts[2].name, "Mug");
    }

    #[tokio::test]
    async fn write_failure_is_storage_unavailable() {
        let store = GiftStore::new(Arc::new(ReadOnlyBackend::default()));
        let err = store.add_gift(NewGift::new("Mug", "$12")).await.unwrap_err();
        assert!(matches!(err, CoreError::StorageUnavailable(_)));
    }

    #[tokio::test]
    async fn failed_read_aborts_write() {
        let store = GiftStore::new(Arc::new(FailingBackend));
        let err = store.add_gift(NewGift::new("Mug", "$12")).await.unwrap_err();
        assert!(matches!(err, CoreError::StorageUnavailable(_)));
    }

    #[tokio::test]
    async fn unreadable_blob_aborts_write_and_is_left_alone() {
        let (store, backend) = memory_store();
        backend.put(GIFTS_KEY, &json!("garbage")).await.unwrap();
        let err = store.add_gift(NewGift::new("Mug", "$12")).await.unwrap_err();
        assert!(matches!(err, CoreError::StorageUnavailable(_)));
        assert_eq!(backend.get(GIFTS_KEY).await.unwrap(), Some(json!("garbage")));
    }
}

// ═══════════════════════════════════════════════════════════════════
// update
// ═══════════════════════════════════════════════════════════════════

mod update {
    use super::*;

    #[tokio::test]
    async fn id_in_payload_is_ignored() {
        let (store, _) = memory_store();
        let update = GiftUpdate {
            id: Some("different-value".into()),
            name: Some("X".into()),
            ..GiftUpdate::default()
        };
        let updated = store.update_gift("1", update).await.unwrap().unwrap();
        assert_eq!(updated.id, "1");
        assert_eq!(updated.name, "X");

        let stored = store.get_gift("1").await.unwrap();
        assert_eq!(stored.id, "1");
        assert_eq!(stored.name, "X");
        assert!(store.get_gift("different-value").await.is_none());
    }

    #[tokio::test]
    async fn absent_fields_keep_stored_values() {
        let (store, _) = memory_store();
        let before = store.get_gift("1").await.unwrap();
        let update = GiftUpdate {
            price: Some("$299".into()),
            ..GiftUpdate::default()
        };
        let after = store.update_gift("1", update).await.unwrap().unwrap();
        assert_eq!(after.price, "$299");
        assert_eq!(after.name, before.name);
        assert_eq!(after.stores, before.stores);
        assert_eq!(after.priority, before.priority);
    }

    #[tokio::test]
    async fn unknown_id_is_none_and_writes_nothing() {
        let backend = Arc::new(CountingBackend::default());
        let store = GiftStore::new(backend.clone());
        store.list_gifts().await;
        let writes = backend.puts.load(Ordering::SeqCst);

        let result = store.update_gift("ghost", GiftUpdate::default()).await.unwrap();
        assert!(result.is_none());
        assert_eq!(backend.puts.load(Ordering::SeqCst), writes);
    }

    #[tokio::test]
    async fn oversized_history_in_payload_is_capped() {
        let (store, _) = memory_store();
        let mut full = store.get_gift("2").await.unwrap();
        for i in 0..(PRICE_HISTORY_LIMIT + 5) {
            full.record_price(&format!("${i}"), "manual", chrono::Utc::now());
        }
        // Build an over-long payload by hand; record_price already trims.
        let mut history = full.price_history.clone();
        history.extend(full.price_history.iter().take(5).cloned());
        let update = GiftUpdate {
            price_history: Some(history),
            ..GiftUpdate::default()
        };
        let updated = store.update_gift("2", update).await.unwrap().unwrap();
        assert_eq!(updated.price_history.len(), PRICE_HISTORY_LIMIT);
    }

    #[tokio::test]
    async fn full_record_round_trips_through_update() {
        let (store, _) = memory_store();
        let mut gift = store.get_gift("1").await.unwrap();
        gift.description = "Updated".into();
        let updated = store
            .update_gift("1", GiftUpdate::from(gift.clone()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated, gift);
    }
}

// ═══════════════════════════════════════════════════════════════════
// track price
// ═══════════════════════════════════════════════════════════════════

mod track_price {
    use super::*;

    #[tokio::test]
    async fn updates_current_price_and_history() {
        let (store, _) = memory_store();
        store.track_price("1", "$50", "manual").await.unwrap().unwrap();

        let gift = store.get_gift("1").await.unwrap();
        assert_eq!(gift.price, "$50");
        let last = gift.price_history.last().unwrap();
        assert_eq!(last.price, "$50");
        assert_eq!(last.source, "manual");
    }

    #[tokio::test]
    async fn history_keeps_fifty_most_recent() {
        let (store, _) = memory_store();
        for i in 0..60 {
            store
                .track_price("2", &format!("${i}"), "scraper")
                .await
                .unwrap()
                .unwrap();
        }
        let gift = store.get_gift("2").await.unwrap();
        assert_eq!(gift.price_history.len(), PRICE_HISTORY_LIMIT);
        assert_eq!(gift.price_history.first().unwrap().price, "$10");
        assert_eq!(gift.price_history.last().unwrap().price, "$59");
        assert_eq!(gift.price, "$59");
    }

    #[tokio::test]
    async fn is_a_single_write() {
        let backend = Arc::new(CountingBackend::default());
        let store = GiftStore::new(backend.clone());
        store.list_gifts().await;
        let before = backend.puts.load(Ordering::SeqCst);

        store.track_price("1", "$300", "manual").await.unwrap();
        assert_eq!(backend.puts.load(Ordering::SeqCst), before + 1);
    }

    #[tokio::test]
    async fn unknown_id_is_none() {
        let (store, _) = memory_store();
        assert!(store.track_price("ghost", "$1", "manual").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn empty_price_is_recorded_but_not_made_current() {
        let (store, _) = memory_store();
        let gift = store.track_price("1", "", "manual").await.unwrap().unwrap();
        assert_eq!(gift.price, "$348");
        assert_eq!(gift.price_history.len(), 1);
    }

    #[tokio::test]
    async fn keeps_other_gifts_untouched() {
        let (store, _) = memory_store();
        let other_before = store.get_gift("2").await.unwrap();
        store.track_price("1", "$1", "manual").await.unwrap();
        assert_eq!(store.get_gift("2").await.unwrap(), other_before);
    }
}

// ═══════════════════════════════════════════════════════════════════
// delete
// ═══════════════════════════════════════════════════════════════════

mod delete {
    use super::*;

    #[tokio::test]
    async fn removes_existing() {
        let (store, _) = memory_store();
        assert!(store.delete_gift("1").await.unwrap());
        let gifts = store.list_gifts().await;
        assert_eq!(gifts.len(), 1);
        assert_eq!(gifts[0].id, "2");
    }

    #[tokio::test]
    async fn unknown_id_is_false_and_size_unchanged() {
        let (store, _) = memory_store();
        let before = store.list_gifts().await.len();
        assert!(!store.delete_gift("unknown").await.unwrap());
        assert_eq!(store.list_gifts().await.len(), before);
    }

    #[tokio::test]
    async fn requires_backend() {
        let store = GiftStore::unconfigured();
        assert!(matches!(
            store.delete_gift("1").await,
            Err(CoreError::StorageUnavailable(_))
        ));
    }
}

// ═══════════════════════════════════════════════════════════════════
// settings
// ═══════════════════════════════════════════════════════════════════

mod settings {
    use super::*;

    #[tokio::test]
    async fn defaults_when_nothing_stored_and_read_does_not_write() {
        let (store, backend) = memory_store();
        assert_eq!(store.get_settings().await, Settings::default());
        assert!(backend.get(SETTINGS_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn partial_record_is_merged_over_defaults() {
        let (store, backend) = memory_store();
        backend
            .put(SETTINGS_KEY, &json!({ "title": "Birthday List" }))
            .await
            .unwrap();
        let settings = store.get_settings().await;
        assert_eq!(settings.title, "Birthday List");
        assert_eq!(settings.emoji, Settings::default().emoji);
        assert_eq!(settings.subtitle, Settings::default().subtitle);
    }

    #[tokio::test]
    async fn save_is_a_full_overwrite() {
        let (store, backend) = memory_store();
        let settings = Settings {
            emoji: "🎁".into(),
            title: "Gifts".into(),
            subtitle: "".into(),
        };
        store.save_settings(&settings).await.unwrap();
        assert_eq!(
            backend.get(SETTINGS_KEY).await.unwrap().unwrap(),
            json!({ "emoji": "🎁", "title": "Gifts", "subtitle": "" })
        );
        assert_eq!(store.get_settings().await, settings);
    }

    #[tokio::test]
    async fn caller_side_merge_then_save() {
        let (store, _) = memory_store();
        let merged = store.get_settings().await.merged(SettingsUpdate {
            emoji: Some("⭐".into()),
            ..SettingsUpdate::default()
        });
        store.save_settings(&merged).await.unwrap();
        let settings = store.get_settings().await;
        assert_eq!(settings.emoji, "⭐");
        assert_eq!(settings.title, "Christmas Wishlist");
    }

    #[tokio::test]
    async fn failing_backend_reads_default_and_save_fails() {
        let store = GiftStore::new(Arc::new(FailingBackend));
        assert_eq!(store.get_settings().await, Settings::default());
        assert!(matches!(
            store.save_settings(&Settings::default()).await,
            Err(CoreError::StorageUnavailable(_))
        ));
    }
}

// ═══════════════════════════════════════════════════════════════════
// import / export
// ═══════════════════════════════════════════════════════════════════

mod transfer {
    use super::*;

    #[tokio::test]
    async fn export_wraps_gifts_and_settings() {
        let (store, _) = memory_store();
        let bundle = store.export_all().await;
        assert_eq!(bundle.gifts, example_gifts());
        assert_eq!(bundle.settings, Settings::default());
        assert_eq!(bundle.version, EXPORT_VERSION);

        let json = serde_json::to_value(&bundle).unwrap();
        assert!(json["exportedAt"].is_string());
        assert_eq!(json["version"], "1.0");
    }

    #[tokio::test]
    async fn merge_drops_colliding_ids() {
        let (store, _) = empty_store().await;
        store
            .import_all(ImportRequest::new(vec![named_gift("1", "Original")], None, true))
            .await
            .unwrap();

        let summary = store
            .import_all(ImportRequest::new(
                vec![named_gift("1", "A"), named_gift("2", "B")],
                None,
                false,
            ))
            .await
            .unwrap();

        assert_eq!(summary.imported_gift_count, 1);
        assert_eq!(summary.total_gift_count, 2);
        assert!(!summary.imported_settings);

        let gifts = store.list_gifts().await;
        assert_eq!(gifts.len(), 2);
        assert_eq!(gifts[0].id, "1");
        assert_eq!(gifts[0].name, "Original");
        assert_eq!(gifts[1].id, "2");
        assert_eq!(gifts[1].name, "B");
    }

    #[tokio::test]
    async fn clear_existing_with_empty_batch_empties_collection() {
        let (store, _) = memory_store();
        assert_eq!(store.list_gifts().await.len(), 2);
        store
            .import_all(ImportRequest::new(vec![], None, true))
            .await
            .unwrap();
        assert!(store.list_gifts().await.is_empty());
    }

    #[tokio::test]
    async fn nameless_gift_rejects_whole_batch() {
        let (store, _) = empty_store().await;
        let err = store
            .import_all(ImportRequest::new(
                vec![named_gift("1", "A"), named_gift("2", "")],
                None,
                true,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
        assert!(store.list_gifts().await.is_empty());
    }

    #[tokio::test]
    async fn settings_replace_stored_settings() {
        let (store, _) = memory_store();
        store
            .save_settings(&Settings {
                emoji: "🎁".into(),
                title: "Old".into(),
                subtitle: "Old subtitle".into(),
            })
            .await
            .unwrap();

        let incoming = Settings {
            emoji: "🎂".into(),
            title: "New".into(),
            subtitle: "New subtitle".into(),
        };
        let summary = store
            .import_all(ImportRequest::new(vec![], Some(incoming.clone()), false))
            .await
            .unwrap();
        assert!(summary.imported_settings);
        assert_eq!(store.get_settings().await, incoming);
    }

    #[tokio::test]
    async fn export_then_import_round_trips() {
        let (source, _) = memory_store();
        source.add_gift(NewGift::new("Mug", "$12").with_priority(Priority::Low)).await.unwrap();
        source.track_price("1", "$299", "manual").await.unwrap();
        source
            .save_settings(&Settings {
                emoji: "🎁".into(),
                title: "Round trip".into(),
                subtitle: "sub".into(),
            })
            .await
            .unwrap();
        let bundle = source.export_all().await;

        let (target, _) = memory_store();
        target.add_gift(NewGift::new("Will be cleared", "$1")).await.unwrap();

        let text = serde_json::to_string(&bundle).unwrap();
        let request = ImportRequest::from_json(serde_json::from_str(&text).unwrap()).unwrap();
        assert!(!request.clear_existing);
        let request = ImportRequest {
            clear_existing: true,
            ..request
        };
        target.import_all(request).await.unwrap();

        assert_eq!(target.list_gifts().await, bundle.gifts);
        assert_eq!(target.get_settings().await, bundle.settings);
    }

    #[tokio::test]
    async fn imported_gifts_without_id_get_one() {
        let (store, _) = empty_store().await;
        let incoming: Gift = serde_json::from_value(json!({ "name": "No id" })).unwrap();
        store
            .import_all(ImportRequest::new(vec![incoming.clone(), incoming], None, false))
            .await
            .unwrap();
        let gifts = store.list_gifts().await;
        assert_eq!(gifts.len(), 2);
        assert!(gifts.iter().all(|g| !g.id.is_empty()));
        assert_ne!(gifts[0].id, gifts[1].id);
    }

    #[tokio::test]
    async fn null_id_gets_fresh_id() {
        let (store, _) = empty_store().await;
        let request =
            ImportRequest::from_json(json!({ "gifts": [{ "id": null, "name": "Null id" }] }))
                .unwrap();
        let summary = store.import_all(request).await.unwrap();
        assert_eq!(summary.imported_gift_count, 1);

        let gifts = store.list_gifts().await;
        assert_eq!(gifts.len(), 1);
        assert_eq!(gifts[0].name, "Null id");
        assert!(!gifts[0].id.is_empty());
    }

    #[tokio::test]
    async fn null_name_is_a_validation_error() {
        let (store, _) = empty_store().await;
        let request = ImportRequest::from_json(json!({
            "gifts": [{ "id": "a", "name": "A" }, { "id": "b", "name": null }],
            "clearExisting": true,
        }))
        .unwrap();
        let err = store.import_all(request).await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)), "got {err:?}");
        assert!(err.to_string().contains("index 1"));
        assert!(store.list_gifts().await.is_empty());
    }

    #[tokio::test]
    async fn failed_settings_write_keeps_imported_gifts() {
        let backend = Arc::new(SettingsLockedBackend::default());
        backend.put(GIFTS_KEY, &json!([])).await.unwrap();
        let store = GiftStore::new(backend.clone());

        let err = store
            .import_all(ImportRequest::new(
                vec![named_gift("1", "A")],
                Some(Settings::default()),
                true,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::StorageUnavailable(_)));

        let gifts = store.list_gifts().await;
        assert_eq!(gifts, vec![named_gift("1", "A")]);
    }

    #[tokio::test]
    async fn import_requires_backend() {
        let store = GiftStore::unconfigured();
        let err = store
            .import_all(ImportRequest::new(vec![named_gift("1", "A")], None, true))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::StorageUnavailable(_)));
    }
}
