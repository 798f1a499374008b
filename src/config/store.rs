//! Durable settings storage
//!
//! One JSON document holds both the broker and webhook settings. It is
//! loaded once at process start and rewritten on every configuration PUT.
//! Writes go to a temp path followed by a rename so a crash mid-write can
//! never leave a torn document behind for the next load.

use crate::config::Settings;
use crate::error::{Error, Result};
use std::fs;
use std::path::PathBuf;

/// File name of the persisted settings document
pub const SETTINGS_FILE: &str = "settings.json";

/// Atomic file-backed store for the settings document
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        SettingsStore { path: dir.into().join(SETTINGS_FILE) }
    }

    /// Load the settings document. A missing file is an empty configuration,
    /// not an error.
    pub fn load(&self) -> Result<Settings> {
        if !self.path.exists() {
            return Ok(Settings::default());
        }
        let content = fs::read_to_string(&self.path)?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("settings document is not valid JSON: {}", e)))
    }

    /// Atomically replace the whole settings document
    pub fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_string_pretty(settings)
            .map_err(|e| Error::Config(format!("failed to serialize settings: {}", e)))?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, body)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path());
        let settings = store.load().unwrap();
        assert!(!settings.mqtt_config.active());
        assert!(!settings.webhook_config.active());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path());

        let mut settings = Settings::default();
        settings.mqtt_config = serde_json::from_value(json!({
            "brokerHostname": "broker.example.com",
            "clientId": "emu-1",
            "password": "secret",
            "active": true,
        }))
        .unwrap();

        store.save(&settings).unwrap();
        let reloaded = store.load().unwrap();
        assert_eq!(reloaded.mqtt_config.broker_hostname.as_deref(), Some("broker.example.com"));
        assert!(reloaded.mqtt_config.active());
        // No temp file left behind after the rename
        assert!(!dir.path().join("settings.json.tmp").exists());
    }
}
