//! HTTP API layer
//!
//! REST endpoints for lifecycle control, settings, reference-list
//! management and the long-lived live event feed.

pub mod server;
pub mod stubs;

pub use server::{create_server, start_server};
