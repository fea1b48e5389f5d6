//! Storefront settings parsing.
//!
//! `/settings` returns an ordered list of `{name, value, is_json}` rows.
//! [`parse_settings`] turns them into a typed mapping. JSON rows that fail
//! to parse silently keep their raw text.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use tracing::debug;

/// A settings row as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSetting {
    /// Setting key.
    pub name: String,
    /// Raw value, usually a string.
    pub value: JsonValue,
    /// Whether `value` holds JSON text.
    #[serde(default)]
    pub is_json: bool,
}

/// Parsed settings keyed by name, in first-insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings(Map<String, JsonValue>);

impl Settings {
    /// Raw parsed value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.0.get(name)
    }

    /// Value as a string, if it is one.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(JsonValue::as_str)
    }

    /// Value as a boolean, if it is one.
    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(JsonValue::as_bool)
    }

    /// Number of settings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no settings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
        self.0.iter()
    }

    /// Borrow the underlying map.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, JsonValue> {
        &self.0
    }
}

fn parse_value(setting: &RawSetting) -> JsonValue {
    match (&setting.value, setting.is_json) {
        (JsonValue::String(text), true) => serde_json::from_str(text).unwrap_or_else(|e| {
            debug!(name = %setting.name, error = %e, "Setting is not valid JSON, keeping raw text");
            JsonValue::String(text.clone())
        }),
        (JsonValue::String(text), false) if text == "true" => JsonValue::Bool(true),
        (JsonValue::String(text), false) if text == "false" => JsonValue::Bool(false),
        (value, _) => value.clone(),
    }
}

/// Parse settings rows. Later rows with a repeated name overwrite earlier ones.
#[must_use]
pub fn parse_settings(rows: &[RawSetting]) -> Settings {
    let mut map = Map::with_capacity(rows.len());
    for row in rows {
        map.insert(row.name.clone(), parse_value(row));
    }
    Settings(map)
}
