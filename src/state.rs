//! Shared reader state
//!
//! One `ReaderState` lives for the whole process and is handed to every
//! task by `Arc`. The lifecycle flag is a single atomic word written only
//! by start/stop; all selector cursor movement funnels through one mutex
//! so concurrent sinks never read-advance the same index twice.

use crate::config::{MqttSettings, Settings, SettingsStore, WebhookSettings};
use crate::core::{Epc, TagEvent};
use crate::error::{Error, Result};
use crate::sources::{EpcSelector, ReferenceListStore};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tracing::info;

/// Pace of event emission for the live feed and broker publisher
pub const EVENT_INTERVAL: Duration = Duration::from_secs(2);

/// Broker publisher connection state, as reported by the status endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerConnection {
    Disconnected,
    Connecting,
    Connected,
}

impl BrokerConnection {
    pub fn as_str(self) -> &'static str {
        match self {
            BrokerConnection::Disconnected => "disconnected",
            BrokerConnection::Connecting => "connecting",
            BrokerConnection::Connected => "connected",
        }
    }
}

/// Outcome of the most recent batch delivery attempt
#[derive(Debug, Clone, Default)]
pub struct DeliveryStatus {
    pub last_status_code: u16,
    pub last_delivery_timestamp: Option<String>,
}

/// Process-wide reader state shared by the HTTP layer and all sink tasks
pub struct ReaderState {
    running: AtomicBool,
    selector: Mutex<EpcSelector>,
    mqtt: RwLock<MqttSettings>,
    webhook: RwLock<WebhookSettings>,
    settings_store: SettingsStore,
    lists: ReferenceListStore,
    broker: Mutex<BrokerConnection>,
    delivery: Mutex<DeliveryStatus>,
    publisher_stop: Mutex<Option<Arc<AtomicBool>>>,
}

impl ReaderState {
    /// Load persisted settings and build the initial state. The selector
    /// starts empty; every stream start snapshots the reference lists.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self> {
        let dir = data_dir.as_ref();
        let settings_store = SettingsStore::new(dir);
        let settings = settings_store.load()?;

        Ok(ReaderState {
            running: AtomicBool::new(false),
            selector: Mutex::new(EpcSelector::new()),
            mqtt: RwLock::new(settings.mqtt_config),
            webhook: RwLock::new(settings.webhook_config),
            settings_store,
            lists: ReferenceListStore::new(dir),
            broker: Mutex::new(BrokerConnection::Disconnected),
            delivery: Mutex::new(DeliveryStatus::default()),
            publisher_stop: Mutex::new(None),
        })
    }

    /// Whether the streaming lifecycle is in the `running` state
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Arm the streaming lifecycle: validate the broker configuration,
    /// snapshot the reference lists into a fresh selector (resetting the
    /// cursor and exhaustion flag), and raise the running flag. Idempotent
    /// while already running.
    pub fn start_session(&self) -> Result<()> {
        let mqtt = self.mqtt_settings();
        if mqtt.active() {
            let missing = mqtt.missing_required_fields();
            if !missing.is_empty() {
                return Err(Error::Config(format!(
                    "MQTT config missing required keys: {}",
                    missing.join(", ")
                )));
            }
        }

        *self.selector.lock().unwrap() = EpcSelector::load(&self.lists);
        self.running.store(true, Ordering::Relaxed);
        info!("Streaming session started");
        Ok(())
    }

    /// Clear the running flag. Idempotent.
    pub fn stop_session(&self) {
        self.running.store(false, Ordering::Relaxed);
        info!("Streaming session stopped");
    }

    /// Draw the next EPC from the shared selector. Exhaustion of the unique
    /// list is terminal for the session: the running flag is cleared and
    /// `None` returned.
    pub fn next_epc(&self) -> Option<Epc> {
        let next = self.selector.lock().unwrap().next();
        if next.is_none() {
            info!("Unique reference list exhausted, stopping stream");
            self.stop_session();
        }
        next
    }

    /// Draw the next EPC and wrap it into a timestamped read event
    pub fn next_event(&self) -> Option<TagEvent> {
        self.next_epc().map(|epc| TagEvent::new(&epc))
    }

    /// Snapshot of the current broker settings
    pub fn mqtt_settings(&self) -> MqttSettings {
        self.mqtt.read().unwrap().clone()
    }

    /// Snapshot of the current webhook settings
    pub fn webhook_settings(&self) -> WebhookSettings {
        self.webhook.read().unwrap().clone()
    }

    /// Replace the broker settings wholesale and persist the document
    pub fn replace_mqtt_settings(&self, settings: MqttSettings) -> Result<()> {
        *self.mqtt.write().unwrap() = settings;
        self.persist()
    }

    /// Replace the webhook settings wholesale and persist the document
    pub fn replace_webhook_settings(&self, settings: WebhookSettings) -> Result<()> {
        *self.webhook.write().unwrap() = settings;
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        let settings = Settings {
            mqtt_config: self.mqtt.read().unwrap().clone(),
            webhook_config: self.webhook.read().unwrap().clone(),
        };
        self.settings_store.save(&settings)
    }

    /// The durable reference-list store backing the selector
    pub fn lists(&self) -> &ReferenceListStore {
        &self.lists
    }

    pub fn broker_connection(&self) -> BrokerConnection {
        *self.broker.lock().unwrap()
    }

    pub fn set_broker_connection(&self, connection: BrokerConnection) {
        *self.broker.lock().unwrap() = connection;
    }

    pub fn delivery_status(&self) -> DeliveryStatus {
        self.delivery.lock().unwrap().clone()
    }

    /// Record the outcome of a batch delivery attempt
    pub fn record_delivery(&self, status_code: u16, timestamp: String) {
        let mut delivery = self.delivery.lock().unwrap();
        delivery.last_status_code = status_code;
        delivery.last_delivery_timestamp = Some(timestamp);
    }

    /// Install the stop flag of a freshly spawned publisher task, signalling
    /// the previous task (if any) to wind down. Keeps exactly one publisher
    /// loop alive per active configuration.
    pub fn install_publisher_stop(&self, stop: Option<Arc<AtomicBool>>) {
        let mut slot = self.publisher_stop.lock().unwrap();
        if let Some(old) = slot.take() {
            old.store(true, Ordering::Relaxed);
        }
        *slot = stop;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_stop_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let state = ReaderState::new(dir.path()).unwrap();

        assert!(!state.is_running());
        state.start_session().unwrap();
        state.start_session().unwrap();
        assert!(state.is_running());
        state.stop_session();
        state.stop_session();
        assert!(!state.is_running());
    }

    #[test]
    fn test_start_rejected_when_active_broker_config_incomplete() {
        let dir = tempfile::tempdir().unwrap();
        let state = ReaderState::new(dir.path()).unwrap();

        let mqtt: MqttSettings = serde_json::from_value(serde_json::json!({
            "active": true,
            "clientId": "emu-1",
            "password": "secret",
        }))
        .unwrap();
        state.replace_mqtt_settings(mqtt).unwrap();

        assert!(state.start_session().is_err());
        assert!(!state.is_running());
    }

    #[test]
    fn test_exhausted_unique_list_clears_running_flag() {
        let dir = tempfile::tempdir().unwrap();
        let state = ReaderState::new(dir.path()).unwrap();

        state
            .lists()
            .replace(crate::sources::ListKind::Unique, &[Epc::random().hex()])
            .unwrap();
        state.start_session().unwrap();

        assert!(state.next_event().is_some());
        assert!(state.next_event().is_none());
        assert!(!state.is_running());

        // A new start re-arms the unique list
        state.start_session().unwrap();
        assert!(state.next_event().is_some());
    }
}
