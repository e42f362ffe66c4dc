//! Generic settings persistence coordination.
//!
//! Provides a reusable API for persisting engine settings to a key/value
//! store. Values are stored as JSON strings, so any serializable setting can
//! be kept under its own key.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// String key/value store that settings are persisted into.
pub trait SettingsStorage {
    fn get_string(&self, key: &str) -> Option<String>;

    fn set_string(&mut self, key: &str, value: String);

    /// Writes pending changes to the backing medium.
    fn flush(&mut self) -> anyhow::Result<()>;
}

/// Settings kept only for the lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    data: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStorage for MemoryStorage {
    fn get_string(&self, key: &str) -> Option<String> {
        self.data.get(key).cloned()
    }

    fn set_string(&mut self, key: &str, value: String) {
        self.data.insert(key.to_string(), value);
    }

    fn flush(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Settings stored as one JSON object in a file.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
    data: serde_json::Map<String, serde_json::Value>,
}

impl JsonFileStorage {
    /// Opens (or prepares to create) the settings file at `path`.
    ///
    /// A missing or unreadable file starts out empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = fs::read_to_string(&path)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default();
        Self { path, data }
    }

    /// Opens the settings file in the platform config directory.
    ///
    /// Returns `None` when the platform has no config directory.
    pub fn open_default() -> Option<Self> {
        Self::default_path().map(Self::open)
    }

    /// `<config dir>/zmage-select/settings.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("zmage-select").join("settings.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStorage for JsonFileStorage {
    fn get_string(&self, key: &str) -> Option<String> {
        self.data.get(key).map(|value| value.to_string())
    }

    fn set_string(&mut self, key: &str, value: String) {
        let value = serde_json::from_str(&value).unwrap_or(serde_json::Value::String(value));
        self.data.insert(key.to_string(), value);
    }

    fn flush(&mut self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(&self.data)?;
        fs::write(&self.path, text)
            .with_context(|| format!("writing {}", self.path.display()))
    }
}

/// Coordinates generic settings persistence.
///
/// This coordinator provides type-safe loading and saving of any serializable
/// settings to a `SettingsStorage`. Settings are stored as JSON strings.
pub struct SettingsCoordinator;

impl SettingsCoordinator {
    /// Loads a setting from persistent storage with a default fallback.
    ///
    /// # Type Parameters
    /// * `T` - The type to deserialize, must implement Deserialize and Default
    ///
    /// # Arguments
    /// * `storage` - The settings store, if one is available
    /// * `key` - The storage key for this setting
    ///
    /// # Returns
    /// The deserialized value if found and valid, otherwise the default value for type T
    pub fn load_setting<T>(storage: Option<&dyn SettingsStorage>, key: &str) -> T
    where
        T: for<'de> Deserialize<'de> + Default,
    {
        Self::try_load_setting(storage, key).unwrap_or_default()
    }

    /// Saves a setting and flushes the store.
    ///
    /// # Arguments
    /// * `storage` - The settings store (mutable)
    /// * `key` - The storage key for this setting
    /// * `value` - The value to serialize and save
    pub fn save_setting<T>(storage: &mut dyn SettingsStorage, key: &str, value: &T) -> anyhow::Result<()>
    where
        T: Serialize,
    {
        let json_str = serde_json::to_string(value)
            .with_context(|| format!("serializing setting '{key}'"))?;
        storage.set_string(key, json_str);
        storage.flush()
    }

    /// Attempts to load a setting, returning None if not found or invalid.
    pub fn try_load_setting<T>(storage: Option<&dyn SettingsStorage>, key: &str) -> Option<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let storage = storage?;
        let json_str = storage.get_string(key)?;
        match serde_json::from_str(&json_str) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring invalid setting");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::EngineConfig;

    #[test]
    fn test_save_and_load_simple() {
        let mut storage = MemoryStorage::new();
        SettingsCoordinator::save_setting(&mut storage, "test_key", &42i32).unwrap();
        let loaded: i32 = SettingsCoordinator::load_setting(Some(&storage), "test_key");
        assert_eq!(loaded, 42);
    }

    #[test]
    fn test_load_with_default() {
        let storage = MemoryStorage::new();
        let loaded: i32 = SettingsCoordinator::load_setting(Some(&storage), "missing_key");
        assert_eq!(loaded, 0);
        let loaded: EngineConfig = SettingsCoordinator::load_setting(None, "engine");
        assert_eq!(loaded, EngineConfig::default());
    }

    #[test]
    fn test_invalid_value_falls_back() {
        let mut storage = MemoryStorage::new();
        storage.set_string("engine", "not json".to_string());
        let result: Option<EngineConfig> = SettingsCoordinator::try_load_setting(Some(&storage), "engine");
        assert_eq!(result, None);
    }

    #[test]
    fn test_json_file_roundtrip() {
        let dir = std::env::temp_dir().join(format!("zmage-select-test-{}", std::process::id()));
        let path = dir.join("settings.json");

        let config = EngineConfig {
            long_press_ms: 450,
            ..EngineConfig::default()
        };
        let mut storage = JsonFileStorage::open(&path);
        SettingsCoordinator::save_setting(&mut storage, "engine", &config).unwrap();

        let reopened = JsonFileStorage::open(&path);
        let loaded: EngineConfig = SettingsCoordinator::load_setting(Some(&reopened), "engine");
        assert_eq!(loaded.long_press_ms, 450);

        let _ = fs::remove_dir_all(&dir);
    }
}
