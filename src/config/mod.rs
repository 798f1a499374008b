//! Emulator configuration
//!
//! Named-option mappings for the MQTT broker and webhook destinations,
//! persisted together as one durable `settings.json` document.

pub mod settings;
pub mod store;

pub use settings::{
    prune_empty, Authentication, MqttSettings, ServerConfiguration, Settings, TlsOptions,
    WebhookSettings,
};
pub use store::SettingsStore;
