use serde::{Deserialize, Serialize};

/// Display configuration of the public wishlist page. One record per deployment.
///
/// Deserialization fills any missing field from [`Settings::default`], so a
/// partially stored record always resolves to a complete one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub emoji: String,
    pub title: String,
    pub subtitle: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            emoji: "🎄".to_string(),
            title: "Christmas Wishlist".to_string(),
            subtitle: "Click on any gift to see more details and where to buy".to_string(),
        }
    }
}

impl Settings {
    /// Shallow merge: fields present in `update` win, the rest are kept.
    #[must_use]
    pub fn merged(&self, update: SettingsUpdate) -> Self {
        Self {
            emoji: update.emoji.unwrap_or_else(|| self.emoji.clone()),
            title: update.title.unwrap_or_else(|| self.title.clone()),
            subtitle: update.subtitle.unwrap_or_else(|| self.subtitle.clone()),
        }
    }
}

/// Partial settings payload, as sent by the admin panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
}
