//! Batching webhook delivery
//!
//! A singleton background loop that accumulates tag events over a linger
//! window and posts each batch to the configured HTTP endpoint with basic
//! authentication. Bounded staleness: worst-case delivery latency is one
//! linger window.

pub mod sink;

pub use sink::{collect_window, WebhookSink, INACTIVE_POLL, WINDOW_POLL_TICK};
