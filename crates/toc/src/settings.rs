//! Persisted panel settings.
//!
//! Stored as JSON under a fixed key, e.g. `{"isExpanded":true,"position":"right"}`.
//! Fields missing from the stored object fall back to their defaults; a payload
//! that does not decode at all yields the full defaults.

use app_api::KeyValueStore;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelPosition {
    Left,
    #[default]
    Right,
}

impl PanelPosition {
    pub fn as_str(self) -> &'static str {
        match self {
            PanelPosition::Left => "left",
            PanelPosition::Right => "right",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PanelSettings {
    pub is_expanded: bool,
    pub position: PanelPosition,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            is_expanded: true,
            position: PanelPosition::Right,
        }
    }
}

#[derive(Debug)]
pub enum SettingsError {
    Decode(serde_json::Error),
    Encode(serde_json::Error),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Decode(err) => write!(f, "stored settings are malformed: {err}"),
            SettingsError::Encode(err) => write!(f, "settings could not be encoded: {err}"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Decode(err) | SettingsError::Encode(err) => Some(err),
        }
    }
}

impl PanelSettings {
    pub fn decode(raw: &str) -> Result<Self, SettingsError> {
        serde_json::from_str(raw).map_err(SettingsError::Decode)
    }

    pub fn encode(&self) -> Result<String, SettingsError> {
        serde_json::to_string(self).map_err(SettingsError::Encode)
    }

    /// Read settings from `store`, recovering to defaults on absent or
    /// corrupt data.
    pub fn load(store: &dyn KeyValueStore, key: &str) -> Self {
        let Some(raw) = store.get(key) else {
            return Self::default();
        };
        match Self::decode(&raw) {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!(target: "toc.settings", "{err}; using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore, key: &str) {
        match self.encode() {
            Ok(raw) => store.set(key, &raw),
            Err(err) => log::warn!(target: "toc.settings", "{err}"),
        }
    }
}
