//! Settings model for the broker and webhook destinations
//!
//! Every option is optional on the wire; absent and empty values are
//! equivalent to "unset" and fall back to the documented defaults. A PUT
//! replaces the whole mapping, after pruning empty values.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// MQTT broker connection and publishing options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MqttSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broker_hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broker_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clean_session: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_insecure: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_cert_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_key_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_alive_interval_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_quality_of_service: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disconnect_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub will_topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub will_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub will_quality_of_service: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_https_bridge: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl MqttSettings {
    pub fn active(&self) -> bool {
        self.active.unwrap_or(false)
    }

    pub fn broker_port(&self) -> u16 {
        self.broker_port.unwrap_or(1883)
    }

    pub fn clean_session(&self) -> bool {
        self.clean_session.unwrap_or(true)
    }

    pub fn keep_alive_secs(&self) -> u64 {
        self.keep_alive_interval_seconds.unwrap_or(60)
    }

    pub fn event_topic(&self) -> &str {
        self.event_topic.as_deref().unwrap_or("default/topic")
    }

    pub fn event_qos(&self) -> u8 {
        self.event_quality_of_service.unwrap_or(0)
    }

    pub fn will_qos(&self) -> u8 {
        self.will_quality_of_service.unwrap_or(0)
    }

    pub fn tls_enabled(&self) -> bool {
        self.tls_enabled.unwrap_or(false)
    }

    pub fn tls_insecure(&self) -> bool {
        self.tls_insecure.unwrap_or(false)
    }

    pub fn use_https_bridge(&self) -> bool {
        self.use_https_bridge.unwrap_or(false)
    }

    /// Fields a broker-delivery session cannot start without
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.broker_hostname.as_deref().map_or(true, str::is_empty) {
            missing.push("brokerHostname");
        }
        if self.client_id.as_deref().map_or(true, str::is_empty) {
            missing.push("clientId");
        }
        if self.password.as_deref().map_or(true, str::is_empty) {
            missing.push("password");
        }
        missing
    }
}

/// Basic-auth credentials for the webhook destination
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Authentication {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Transport-security options for the webhook destination
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TlsOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify_peer: Option<bool>,
}

/// Destination endpoint for batched webhook delivery
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Authentication>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<TlsOptions>,
}

/// Batch-delivery (webhook) options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebhookSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_batch_limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_batch_linger_milliseconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_buffer_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_configuration: Option<ServerConfiguration>,
}

impl WebhookSettings {
    pub fn active(&self) -> bool {
        self.active.unwrap_or(false)
    }

    pub fn linger_ms(&self) -> u64 {
        self.event_batch_linger_milliseconds.unwrap_or(1000)
    }

    pub fn batch_limit(&self) -> usize {
        self.event_batch_limit.unwrap_or(10_000)
    }

    pub fn url(&self) -> Option<&str> {
        self.server_configuration.as_ref()?.url.as_deref()
    }

    pub fn credentials(&self) -> Option<(&str, &str)> {
        let auth = self.server_configuration.as_ref()?.authentication.as_ref()?;
        Some((auth.username.as_deref()?, auth.password.as_deref()?))
    }

    pub fn verify_peer(&self) -> bool {
        self.server_configuration
            .as_ref()
            .and_then(|sc| sc.tls.as_ref())
            .and_then(|tls| tls.verify_peer)
            .unwrap_or(true)
    }
}

/// The single persisted configuration document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub mqtt_config: MqttSettings,
    pub webhook_config: WebhookSettings,
}

/// Strip null and empty-string values from a PUT payload so they read as
/// "unset" rather than being stored. Applied recursively to nested maps.
pub fn prune_empty(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let pruned: serde_json::Map<String, Value> = map
                .into_iter()
                .filter_map(|(key, v)| {
                    if v.is_null() || v.as_str().map_or(false, str::is_empty) {
                        return None;
                    }
                    Some((key, prune_empty(v)))
                })
                .collect();
            Value::Object(pruned)
        }
        other => other,
    }
}
