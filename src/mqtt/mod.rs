//! Broker publishing
//!
//! Maintains a long-lived connection to an MQTT broker, republishing each
//! tag event while the streaming lifecycle runs. For brokers that only
//! accept a request/response ingestion API, the publisher substitutes
//! per-event authenticated HTTPS posts over the same event pipeline.

pub mod publisher;
pub mod tls;

pub use publisher::{MqttPublisher, RECONNECT_DELAY};
