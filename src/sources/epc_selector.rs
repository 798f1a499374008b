//! EPC source selection
//!
//! Implements the per-event source priority: drain the unique list exactly
//! once, then fall back to the repeating list, then to random synthesis.
//! Once a drained unique list has no repeating list behind it, `next()`
//! reports exhaustion and the feed halts.
//!
//! The selector snapshots both lists when it is built (at every stream
//! start); edits to the backing files take effect on the next start.

use crate::core::Epc;
use crate::sources::reference_lists::{ListKind, ReferenceListStore};
use tracing::warn;

/// Stateful chooser over the unique list, repeating list and random synthesis
#[derive(Debug, Default)]
pub struct EpcSelector {
    unique: Vec<Epc>,
    repeating: Vec<Epc>,
    cursor: usize,
    unique_exhausted: bool,
}

impl EpcSelector {
    /// An empty selector: every `next()` synthesizes a random EPC
    pub fn new() -> Self {
        EpcSelector::default()
    }

    /// Build a selector from in-memory hex lists. Unparsable entries are
    /// skipped with a warning rather than poisoning the whole list.
    pub fn from_lists(unique: &[String], repeating: &[String]) -> Self {
        EpcSelector {
            unique: parse_entries(unique, "unique"),
            repeating: parse_entries(repeating, "repeating"),
            cursor: 0,
            unique_exhausted: false,
        }
    }

    /// Snapshot both reference-list files into a fresh selector
    pub fn load(store: &ReferenceListStore) -> Self {
        let unique = store.read(ListKind::Unique).unwrap_or_else(|e| {
            warn!("Failed to read unique reference list: {}", e);
            Vec::new()
        });
        let repeating = store.read(ListKind::Repeating).unwrap_or_else(|e| {
            warn!("Failed to read repeating reference list: {}", e);
            Vec::new()
        });
        EpcSelector::from_lists(&unique, &repeating)
    }

    /// Choose the next EPC. `None` is terminal: the unique list is drained
    /// and there is no repeating list to fall back to.
    pub fn next(&mut self) -> Option<Epc> {
        if !self.unique.is_empty() && !self.unique_exhausted {
            let epc = self.unique[self.cursor];
            self.cursor += 1;
            if self.cursor == self.unique.len() {
                // Exhaustion is marked now but the element at the cursor is
                // still delivered; the fall-through happens on the next call.
                self.unique_exhausted = true;
                self.cursor = 0;
            }
            return Some(epc);
        }

        if self.unique_exhausted && self.repeating.is_empty() {
            return None;
        }

        if !self.repeating.is_empty() {
            let epc = self.repeating[self.cursor % self.repeating.len()];
            self.cursor = (self.cursor + 1) % self.repeating.len();
            return Some(epc);
        }

        Some(Epc::random())
    }
}

fn parse_entries(entries: &[String], label: &str) -> Vec<Epc> {
    entries
        .iter()
        .filter_map(|hex| match Epc::from_hex(hex) {
            Ok(epc) => Some(epc),
            Err(e) => {
                warn!("Skipping invalid entry in {} reference list: {}", label, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex_list(epcs: &[Epc]) -> Vec<String> {
        epcs.iter().map(|e| e.hex()).collect()
    }

    #[test]
    fn test_unique_list_drains_once_in_order() {
        let epcs = vec![Epc::random(), Epc::random(), Epc::random()];
        let mut selector = EpcSelector::from_lists(&hex_list(&epcs), &[]);

        for expected in &epcs {
            assert_eq!(selector.next(), Some(*expected));
        }
        assert_eq!(selector.next(), None);
        assert_eq!(selector.next(), None);
    }

    #[test]
    fn test_repeating_list_wraps() {
        let epcs = vec![Epc::random(), Epc::random()];
        let mut selector = EpcSelector::from_lists(&[], &hex_list(&epcs));

        let first_pass: Vec<_> = (0..2).map(|_| selector.next().unwrap()).collect();
        let second_pass: Vec<_> = (0..2).map(|_| selector.next().unwrap()).collect();
        assert_eq!(first_pass, epcs);
        assert_eq!(second_pass, epcs);
    }

    #[test]
    fn test_unique_falls_back_to_repeating() {
        let unique = vec![Epc::random(), Epc::random(), Epc::random()];
        let repeating = vec![Epc::random(), Epc::random()];
        let mut selector = EpcSelector::from_lists(&hex_list(&unique), &hex_list(&repeating));

        for expected in &unique {
            assert_eq!(selector.next(), Some(*expected));
        }
        // Drained unique list never terminates the feed while a repeating
        // list is configured; the repeating pass starts at its first entry.
        for _ in 0..3 {
            assert_eq!(selector.next(), Some(repeating[0]));
            assert_eq!(selector.next(), Some(repeating[1]));
        }
    }

    #[test]
    fn test_no_lists_synthesizes_valid_epcs() {
        let mut selector = EpcSelector::new();
        for _ in 0..50 {
            let epc = selector.next().unwrap();
            assert!(epc.manager <= crate::core::epc::MAX_MANAGER);
            assert!(epc.class <= crate::core::epc::MAX_CLASS);
            assert!(epc.serial <= crate::core::epc::MAX_SERIAL);
        }
    }

    #[test]
    fn test_invalid_entries_are_skipped() {
        let entries =
            vec!["not-hex".to_string(), Epc::random().hex(), "1234".to_string()];
        let mut selector = EpcSelector::from_lists(&entries, &[]);
        assert!(selector.next().is_some());
        assert_eq!(selector.next(), None);
    }
}
