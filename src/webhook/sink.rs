//! Webhook delivery loop
//!
//! Runs for the whole process lifetime, independent of the live feed.
//! Per cycle: idle while delivery is inactive, otherwise open a linger
//! window, pull events from the shared pipeline while the lifecycle runs,
//! then post the accumulated batch. Transport errors are logged and the
//! loop continues; nothing here can stop the lifecycle or another sink.

use crate::config::WebhookSettings;
use crate::core::TagEvent;
use crate::state::ReaderState;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Poll cadence inside an open linger window
pub const WINDOW_POLL_TICK: Duration = Duration::from_millis(50);

/// Poll cadence while delivery is inactive
pub const INACTIVE_POLL: Duration = Duration::from_millis(500);

/// The singleton batch delivery task
pub struct WebhookSink {
    state: Arc<ReaderState>,
}

impl WebhookSink {
    pub fn new(state: Arc<ReaderState>) -> Self {
        WebhookSink { state }
    }

    /// Run the delivery loop. Never returns.
    pub async fn run(self) {
        // One HTTP client for the lifetime of the loop, rebuilt only when
        // the peer-verification setting changes.
        let mut client: Option<(bool, reqwest::Client)> = None;

        loop {
            let settings = self.state.webhook_settings();
            if !settings.active() {
                tokio::time::sleep(INACTIVE_POLL).await;
                continue;
            }

            let Some(events) = collect_window(&self.state, &settings).await else {
                continue;
            };

            let verify_peer = settings.verify_peer();
            let http = match &mut client {
                Some((verify, http)) if *verify == verify_peer => http.clone(),
                slot => {
                    match reqwest::Client::builder()
                        .danger_accept_invalid_certs(!verify_peer)
                        .build()
                    {
                        Ok(http) => {
                            *slot = Some((verify_peer, http.clone()));
                            http
                        }
                        Err(e) => {
                            warn!("Failed to build webhook client: {}", e);
                            continue;
                        }
                    }
                }
            };

            self.send_batch(&http, &settings, &events).await;
        }
    }

    async fn send_batch(
        &self,
        client: &reqwest::Client,
        settings: &WebhookSettings,
        events: &[TagEvent],
    ) {
        let Some(url) = settings.url() else {
            warn!("Webhook delivery active but no destination URL configured");
            return;
        };

        let mut request = client.post(url).json(&events);
        if let Some((username, password)) = settings.credentials() {
            request = request.basic_auth(username, Some(password));
        }

        match request.send().await {
            Ok(response) => {
                let code = response.status().as_u16();
                self.state
                    .record_delivery(code, Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string());
                if response.status().is_success() {
                    debug!("Delivered batch of {} events to webhook", events.len());
                } else {
                    warn!("Webhook rejected batch of {} events: {}", events.len(), code);
                }
            }
            Err(e) => warn!("Webhook delivery error: {}", e),
        }
    }
}

/// Accumulate events for one linger window.
///
/// Returns `None` when the window ends with nothing worth sending: an idle
/// lifecycle with an empty buffer abandons the window early so an idle
/// reader never produces empty keep-alive bursts. A lifecycle stop
/// mid-window with events already buffered flushes those events.
pub async fn collect_window(
    state: &ReaderState,
    settings: &WebhookSettings,
) -> Option<Vec<TagEvent>> {
    let deadline = Instant::now() + Duration::from_millis(settings.linger_ms());
    let mut events = Vec::new();

    while Instant::now() < deadline {
        if !state.is_running() {
            if events.is_empty() {
                return None;
            }
            break;
        }
        if events.len() < settings.batch_limit() {
            if let Some(event) = state.next_event() {
                events.push(event);
            }
        }
        tokio::time::sleep(WINDOW_POLL_TICK).await;
    }

    if events.is_empty() {
        None
    } else {
        Some(events)
    }
}
