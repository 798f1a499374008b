//! Event sources for the emulated reader
//!
//! Reference lists hold pre-seeded EPC hex strings on durable storage; the
//! selector decides, per event, whether to draw from the one-shot unique
//! list, the forever-cycling repeating list, or random synthesis.

pub mod epc_selector;
pub mod reference_lists;

pub use epc_selector::EpcSelector;
pub use reference_lists::{ListKind, ReferenceListStore};
