//! # r700-emu
//!
//! r700-emu is a network-attached RFID reader emulator. It impersonates an
//! Impinj-R700-class reader well enough to exercise downstream ingestion
//! pipelines without any physical hardware on the bench.
//!
//! The emulator synthesizes EPC tag identifiers, wraps them into timestamped
//! inventory events, and fans each event out to three independent sinks:
//!
//! - a pull-based live feed over a long-lived HTTP response
//! - a persistent MQTT broker connection (or an HTTPS bridge for brokers
//!   that only accept request/response ingestion)
//! - a batching webhook delivery loop with basic authentication
//!
//! ## Example
//!
//! ```rust
//! use r700_emu::core::Epc;
//!
//! let epc = Epc::random();
//! assert_eq!(epc.hex().len(), 24);
//! ```

#![allow(clippy::new_without_default)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::must_use_candidate)]

/// EPC identifiers and tag inventory events
pub mod core;

/// Reference-list storage and the EPC source selector
pub mod sources;

/// Durable emulator settings (broker + webhook destinations)
pub mod config;

/// Shared reader state: lifecycle flag, selector, configs, sink statuses
pub mod state;

/// MQTT broker publisher and the HTTPS bridge substitution
pub mod mqtt;

/// Batching webhook delivery sink
pub mod webhook;

/// HTTP API server (live feed, lifecycle control, settings, reference lists)
pub mod http;

pub mod error {
    //! Error types and result definitions

    use std::fmt;

    /// Result type alias for emulator operations
    pub type Result<T> = std::result::Result<T, Error>;

    /// Main error type for the emulator
    #[derive(Debug)]
    pub enum Error {
        /// Configuration error
        Config(String),
        /// Reference-list error
        List(String),
        /// IO error
        Io(std::io::Error),
        /// Other error
        Other(String),
    }

    impl fmt::Display for Error {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Error::Config(msg) => write!(f, "Configuration error: {}", msg),
                Error::List(msg) => write!(f, "Reference list error: {}", msg),
                Error::Io(err) => write!(f, "IO error: {}", err),
                Error::Other(msg) => write!(f, "Error: {}", msg),
            }
        }
    }

    impl std::error::Error for Error {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            match self {
                Error::Io(err) => Some(err),
                _ => None,
            }
        }
    }

    impl From<std::io::Error> for Error {
        fn from(err: std::io::Error) -> Self {
            Error::Io(err)
        }
    }
}

// Re-export commonly used types
pub use error::{Error, Result};
