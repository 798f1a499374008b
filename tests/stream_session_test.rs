//! Streaming session tests
//!
//! Exercise the lifecycle and source-selection behavior end to end over a
//! real data directory: unique lists drain exactly once per session,
//! repeating lists wrap, and random synthesis fills in when no list is
//! configured.

use r700_emu::core::Epc;
use r700_emu::sources::ListKind;
use r700_emu::state::ReaderState;

fn test_state() -> (ReaderState, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let state = ReaderState::new(dir.path()).unwrap();
    (state, dir)
}

fn seed_list(state: &ReaderState, kind: ListKind, count: usize) -> Vec<String> {
    let entries: Vec<String> = (0..count).map(|_| Epc::random().hex()).collect();
    state.lists().replace(kind, &entries).unwrap();
    entries
}

#[test]
fn test_unique_list_yields_each_element_once_in_file_order() {
    let (state, _dir) = test_state();
    let entries = seed_list(&state, ListKind::Unique, 5);

    state.start_session().unwrap();
    for expected in &entries {
        let event = state.next_event().expect("unique element expected");
        assert_eq!(&event.tag_inventory_event.epc_hex, expected);
    }

    // Exhaustion is terminal for the session and clears the running flag.
    assert!(state.next_event().is_none());
    assert!(!state.is_running());
    assert!(state.next_event().is_none());
}

#[test]
fn test_restart_re_arms_the_unique_list() {
    let (state, _dir) = test_state();
    let entries = seed_list(&state, ListKind::Unique, 2);

    state.start_session().unwrap();
    state.next_event().unwrap();
    state.next_event().unwrap();
    assert!(state.next_event().is_none());

    state.start_session().unwrap();
    let event = state.next_event().unwrap();
    assert_eq!(event.tag_inventory_event.epc_hex, entries[0]);
}

#[test]
fn test_repeating_list_wraps_over_two_passes() {
    let (state, _dir) = test_state();
    let entries = seed_list(&state, ListKind::Repeating, 4);

    state.start_session().unwrap();
    let observed: Vec<String> = (0..8)
        .map(|_| state.next_event().unwrap().tag_inventory_event.epc_hex)
        .collect();

    assert_eq!(&observed[0..4], entries.as_slice());
    assert_eq!(&observed[4..8], entries.as_slice());
    assert!(state.is_running());
}

#[test]
fn test_no_lists_synthesizes_valid_random_epcs() {
    let (state, _dir) = test_state();
    state.start_session().unwrap();

    for _ in 0..20 {
        let event = state.next_event().unwrap();
        let epc = Epc::from_hex(&event.tag_inventory_event.epc_hex).unwrap();
        assert!(epc.manager <= r700_emu::core::epc::MAX_MANAGER);
        assert!(epc.serial <= r700_emu::core::epc::MAX_SERIAL);
    }
    assert!(state.is_running());
}

#[test]
fn test_list_edits_take_effect_on_next_start() {
    let (state, _dir) = test_state();
    let first = seed_list(&state, ListKind::Repeating, 2);

    state.start_session().unwrap();
    assert_eq!(state.next_event().unwrap().tag_inventory_event.epc_hex, first[0]);

    // Replaced mid-session: the running session keeps its snapshot.
    let second = seed_list(&state, ListKind::Repeating, 2);
    assert_eq!(state.next_event().unwrap().tag_inventory_event.epc_hex, first[1]);

    state.start_session().unwrap();
    assert_eq!(state.next_event().unwrap().tag_inventory_event.epc_hex, second[0]);
}
