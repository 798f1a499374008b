//! Tag inventory events
//!
//! The event factory: wraps one EPC into the immutable, timestamped record
//! every sink delivers. The timestamp is fixed at construction, UTC with
//! second precision.

use crate::core::Epc;
use chrono::Utc;
use serde::Serialize;

/// Source label carried by every emitted event
pub const HOSTNAME: &str = "r700-emulator";

/// Event kind carried by every emitted event
pub const EVENT_TYPE: &str = "tagInventory";

/// Per-detection payload nested inside a [`TagEvent`]
#[derive(Debug, Clone, Serialize)]
pub struct TagInventoryEvent {
    /// Base64 rendering of the EPC bytes
    pub epc: String,
    #[serde(rename = "epcHex")]
    pub epc_hex: String,
    #[serde(rename = "antennaPort")]
    pub antenna_port: u8,
    #[serde(rename = "antennaName")]
    pub antenna_name: String,
}

/// One simulated detection of an EPC by the emulated reader
#[derive(Debug, Clone, Serialize)]
pub struct TagEvent {
    /// UTC timestamp, `YYYY-MM-DDThh:mm:ssZ`
    pub timestamp: String,
    pub hostname: String,
    #[serde(rename = "eventType")]
    pub event_type: String,
    #[serde(rename = "tagInventoryEvent")]
    pub tag_inventory_event: TagInventoryEvent,
}

impl TagEvent {
    /// Wrap an EPC into a read event stamped with the current time
    pub fn new(epc: &Epc) -> Self {
        TagEvent {
            timestamp: Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            hostname: HOSTNAME.to_string(),
            event_type: EVENT_TYPE.to_string(),
            tag_inventory_event: TagInventoryEvent {
                epc: epc.b64(),
                epc_hex: epc.hex(),
                antenna_port: 1,
                antenna_name: "Antenna 1".to_string(),
            },
        }
    }
}
