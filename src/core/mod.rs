//! Core data structures for the emulated reader
//!
//! An [`Epc`] is the synthetic tag identifier the reader pretends to have
//! seen; a [`TagEvent`] is one timestamped inventory detection of it.

pub mod epc;
pub mod event;

pub use epc::{Epc, EpcError};
pub use event::{TagEvent, TagInventoryEvent};
