//! Broker publisher task
//!
//! One supervised task per active broker configuration. The task owns a
//! snapshot of the settings taken when it was spawned; replacing the
//! settings cancels the task through its stop flag and spawns a fresh one.
//!
//! Connection handling follows a `disconnected -> connecting -> connected`
//! state machine with a fixed reconnect delay. Publish failures are logged
//! and never touch the streaming lifecycle.

use crate::config::MqttSettings;
use crate::mqtt::tls;
use crate::state::{BrokerConnection, ReaderState, EVENT_INTERVAL};
use rumqttc::{AsyncClient, Event, LastWill, MqttOptions, Packet, QoS};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Delay between reconnect attempts while the configuration stays active
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

fn qos_from(level: u8) -> QoS {
    match level {
        1 => QoS::AtLeastOnce,
        2 => QoS::ExactlyOnce,
        _ => QoS::AtMostOnce,
    }
}

/// Publishes tag events to the configured broker (or HTTPS bridge)
pub struct MqttPublisher {
    settings: MqttSettings,
    state: Arc<ReaderState>,
    stop: Arc<AtomicBool>,
}

impl MqttPublisher {
    /// Cancel the previous publisher task (if any) and spawn a replacement
    /// for the current broker configuration. With the active flag clear,
    /// only the cancellation happens.
    pub fn respawn(state: &Arc<ReaderState>) {
        let settings = state.mqtt_settings();
        if !settings.active() {
            state.install_publisher_stop(None);
            state.set_broker_connection(BrokerConnection::Disconnected);
            return;
        }

        let stop = Arc::new(AtomicBool::new(false));
        state.install_publisher_stop(Some(Arc::clone(&stop)));
        let publisher = MqttPublisher { settings, state: Arc::clone(state), stop };
        tokio::spawn(publisher.run());
    }

    async fn run(self) {
        if self.settings.use_https_bridge() {
            self.run_https_bridge().await;
        } else {
            self.run_broker().await;
        }
        self.state.set_broker_connection(BrokerConnection::Disconnected);
    }

    fn stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    async fn run_broker(&self) {
        let Some(host) = self.settings.broker_hostname.clone() else {
            error!("Broker publisher spawned without brokerHostname, giving up");
            return;
        };
        let port = self.settings.broker_port();

        'connect: while !self.stopped() {
            self.state.set_broker_connection(BrokerConnection::Connecting);

            let client_id = self.settings.client_id.clone().unwrap_or_default();
            let mut options = MqttOptions::new(client_id, &host, port);
            options.set_keep_alive(Duration::from_secs(self.settings.keep_alive_secs()));
            options.set_clean_session(self.settings.clean_session());
            if let Some(username) = &self.settings.username {
                options
                    .set_credentials(username, self.settings.password.clone().unwrap_or_default());
            }
            match tls::build_transport(&self.settings) {
                Ok(transport) => {
                    options.set_transport(transport);
                }
                Err(e) => {
                    error!("Invalid broker TLS configuration: {}", e);
                    return;
                }
            }
            if let (Some(topic), Some(message)) =
                (&self.settings.will_topic, &self.settings.will_message)
            {
                options.set_last_will(LastWill::new(
                    topic.clone(),
                    message.clone(),
                    qos_from(self.settings.will_qos()),
                    false,
                ));
            }

            let (client, mut eventloop) = AsyncClient::new(options, 64);
            let mut ticker = tokio::time::interval(EVENT_INTERVAL);

            loop {
                if self.stopped() {
                    self.announce(&client, self.settings.disconnect_message.as_deref()).await;
                    let _ = client.disconnect().await;
                    return;
                }

                tokio::select! {
                    notification = eventloop.poll() => match notification {
                        Ok(Event::Incoming(Packet::ConnAck(_))) => {
                            info!("Connected to MQTT broker {}:{}", host, port);
                            self.state.set_broker_connection(BrokerConnection::Connected);
                            self.announce(&client, self.settings.connect_message.as_deref()).await;
                        }
                        Ok(_) => {}
                        Err(e) => {
                            warn!(
                                "MQTT connection error: {}, retrying in {}s",
                                e,
                                RECONNECT_DELAY.as_secs()
                            );
                            self.state.set_broker_connection(BrokerConnection::Disconnected);
                            tokio::time::sleep(RECONNECT_DELAY).await;
                            continue 'connect;
                        }
                    },
                    _ = ticker.tick() => self.publish_next(&client).await,
                }
            }
        }
    }

    async fn publish_next(&self, client: &AsyncClient) {
        if !self.state.is_running() {
            return;
        }
        let Some(event) = self.state.next_event() else {
            return;
        };
        let payload = match serde_json::to_string(&event) {
            Ok(payload) => payload,
            Err(e) => {
                error!("Failed to serialize tag event: {}", e);
                return;
            }
        };
        let topic = self.settings.event_topic();
        match client.publish(topic, qos_from(self.settings.event_qos()), false, payload).await {
            Ok(()) => debug!("Published tag event to '{}'", topic),
            Err(e) => warn!("Failed to publish tag event to '{}': {}", topic, e),
        }
    }

    /// Publish the connect/disconnect announcement to the will topic
    async fn announce(&self, client: &AsyncClient, message: Option<&str>) {
        let (Some(topic), Some(message)) = (&self.settings.will_topic, message) else {
            return;
        };
        if let Err(e) = client
            .publish(topic.as_str(), qos_from(self.settings.will_qos()), false, message.to_string())
            .await
        {
            warn!("Failed to publish announcement to '{}': {}", topic, e);
        }
    }

    /// Transport substitution for brokers that only accept a strict
    /// request/response ingestion API: one authenticated HTTPS post per
    /// event, awaited in order so event ordering is preserved.
    async fn run_https_bridge(&self) {
        let (Some(host), Some(client_id)) =
            (self.settings.broker_hostname.clone(), self.settings.client_id.clone())
        else {
            error!("HTTPS bridge spawned without brokerHostname/clientId, giving up");
            return;
        };

        let client = match reqwest::Client::builder()
            .danger_accept_invalid_certs(self.settings.tls_insecure())
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to build HTTPS bridge client: {}", e);
                return;
            }
        };

        let url = format!(
            "https://{}/devices/{}/messages/events?api-version=2020-03-13",
            host, client_id
        );
        let token = self.settings.password.clone().unwrap_or_default();
        info!("HTTPS bridge active for {}", host);

        loop {
            if self.stopped() {
                return;
            }

            if self.state.is_running() {
                if let Some(event) = self.state.next_event() {
                    match client
                        .post(&url)
                        .header("Authorization", &token)
                        .json(&event)
                        .send()
                        .await
                    {
                        Ok(response) if response.status().is_success() => {
                            self.state.set_broker_connection(BrokerConnection::Connected);
                            debug!("Event accepted by HTTPS bridge");
                        }
                        Ok(response) => {
                            warn!("HTTPS bridge rejected event: {}", response.status());
                        }
                        Err(e) => {
                            self.state.set_broker_connection(BrokerConnection::Disconnected);
                            warn!("HTTPS bridge send error: {}", e);
                        }
                    }
                }
            }

            tokio::time::sleep(EVENT_INTERVAL).await;
        }
    }
}
