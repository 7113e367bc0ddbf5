use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Maximum number of price observations kept per gift. Oldest are dropped first.
pub const PRICE_HISTORY_LIMIT: usize = 50;

/// Source recorded for price observations entered by hand.
pub const MANUAL_SOURCE: &str = "manual";

/// How much the list owner wants a gift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

/// A place where the gift can be bought.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreLink {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

impl StoreLink {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Links missing either half are never persisted.
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.url.is_empty()
    }
}

/// One observed price of a gift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistoryEntry {
    /// Display string, e.g. `"$139.99"`. Kept opaque, never parsed.
    pub price: String,
    pub date: DateTime<Utc>,
    #[serde(default = "default_source")]
    pub source: String,
}

fn default_source() -> String {
    MANUAL_SOURCE.to_string()
}

/// A single wishlist entry, exactly as it is stored under the gifts key.
///
/// Every field has a default, and `null` reads as the default, so records
/// written before a field existed (e.g. `priceHistory`) still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gift {
    /// Empty until assigned. Imported records without one get a fresh id.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    /// Current display price. Always equals the latest tracked price once
    /// a price has been tracked.
    #[serde(default, deserialize_with = "null_as_default")]
    pub price: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: Priority,

    #[serde(default, deserialize_with = "lenient_stores")]
    pub stores: Vec<StoreLink>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub price_history: Vec<PriceHistoryEntry>,
}

impl Gift {
    /// Append a price observation and make it the current price.
    ///
    /// The history is trimmed to the most recent [`PRICE_HISTORY_LIMIT`]
    /// entries. An empty `price` is still recorded but leaves the current
    /// price untouched.
    pub fn record_price(&mut self, price: &str, source: &str, at: DateTime<Utc>) {
        self.price_history.push(PriceHistoryEntry {
            price: price.to_string(),
            date: at,
            source: source.to_string(),
        });
        self.enforce_history_limit();

        if !price.is_empty() {
            self.price = price.to_string();
        }
    }

    /// Drop the oldest history entries beyond [`PRICE_HISTORY_LIMIT`].
    pub fn enforce_history_limit(&mut self) {
        let len = self.price_history.len();
        if len > PRICE_HISTORY_LIMIT {
            self.price_history.drain(..len - PRICE_HISTORY_LIMIT);
        }
    }

    /// Remove store links with an empty name or url.
    pub fn retain_complete_stores(&mut self) {
        self.stores.retain(StoreLink::is_complete);
    }
}

/// Fields accepted when creating a gift. The id is assigned by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGift {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub price: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: Priority,

    #[serde(default, deserialize_with = "lenient_stores")]
    pub stores: Vec<StoreLink>,
}

impl NewGift {
    pub fn new(name: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price: price.into(),
            ..Self::default()
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn with_store(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.stores.push(StoreLink::new(name, url));
        self
    }

    /// `true` when both required fields are present.
    pub fn has_required_fields(&self) -> bool {
        !self.name.trim().is_empty() && !self.price.trim().is_empty()
    }

    /// Build the stored record under the given id, with an empty history.
    pub fn into_gift(self, id: String) -> Gift {
        Gift {
            id,
            name: self.name,
            price: self.price,
            image: self.image,
            description: self.description,
            priority: self.priority,
            stores: self.stores,
            price_history: Vec::new(),
        }
    }
}

/// Partial update shallow-merged over a stored gift.
///
/// Absent (or `null`) fields keep their stored value. `id` is accepted so
/// that full records can be posted back, but it is always ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(
        default,
        deserialize_with = "lenient_optional_stores",
        skip_serializing_if = "Option::is_none"
    )]
    pub stores: Option<Vec<StoreLink>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_history: Option<Vec<PriceHistoryEntry>>,
}

impl GiftUpdate {
    /// Overwrite `gift` with every field present in this update, except `id`.
    pub fn apply_to(self, gift: &mut Gift) {
        if let Some(name) = self.name {
            gift.name = name;
        }
        if let Some(price) = self.price {
            gift.price = price;
        }
        if let Some(image) = self.image {
            gift.image = image;
        }
        if let Some(description) = self.description {
            gift.description = description;
        }
        if let Some(priority) = self.priority {
            gift.priority = priority;
        }
        if let Some(stores) = self.stores {
            gift.stores = stores;
        }
        if let Some(history) = self.price_history {
            gift.price_history = history;
        }
    }
}

impl From<Gift> for GiftUpdate {
    fn from(gift: Gift) -> Self {
        Self {
            id: Some(gift.id),
            name: Some(gift.name),
            price: Some(gift.price),
            image: Some(gift.image),
            description: Some(gift.description),
            priority: Some(gift.priority),
            stores: Some(gift.stores),
            price_history: Some(gift.price_history),
        }
    }
}

/// The two records shown on a brand-new wishlist.
pub fn example_gifts() -> Vec<Gift> {
    vec![
        Gift {
            id: "1".into(),
            name: "Sony WH-1000XM5 Headphones".into(),
            price: "$348".into(),
            image: "https://images.unsplash.com/photo-1618366712010-f4ae9c647dcb?w=800".into(),
            description: "Industry-leading noise canceling wireless headphones with exceptional \
                          sound quality and 30-hour battery life."
                .into(),
            priority: Priority::High,
            stores: vec![
                StoreLink::new("Amazon", "https://amazon.com"),
                StoreLink::new("Best Buy", "https://bestbuy.com"),
            ],
            price_history: Vec::new(),
        },
        Gift {
            id: "2".into(),
            name: "Kindle Paperwhite".into(),
            price: "$139".into(),
            image: "https://images.unsplash.com/photo-1592496431122-2349e0fbc666?w=800".into(),
            description: "The thinnest, lightest Kindle Paperwhite yet with a flush-front design \
                          and 300 ppi glare-free display."
                .into(),
            priority: Priority::Medium,
            stores: vec![StoreLink::new("Amazon", "https://amazon.com")],
            price_history: Vec::new(),
        },
    ]
}

// ── Lenient deserializers ───────────────────────────────────────────

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts a JSON array of links or a JSON-encoded string of one (the admin
/// form posts the latter). Anything else, including an unparseable string,
/// yields an empty list. Individual malformed entries are skipped.
fn lenient_stores<'de, D>(deserializer: D) -> Result<Vec<StoreLink>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(stores_from_value(value))
}

fn lenient_optional_stores<'de, D>(deserializer: D) -> Result<Option<Vec<StoreLink>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        other => Ok(Some(stores_from_value(other))),
    }
}

fn stores_from_value(value: Value) -> Vec<StoreLink> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        Value::String(raw) => match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}
