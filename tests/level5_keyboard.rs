//! Level 5: Keyboard Tests
//!
//! Delete/Backspace removal, Escape cancellation, select-all and framing
//! shortcuts.

mod common;

use common::harness::{number_node, EditorHarness, A_CENTER, B_CENTER, B_OUT, EMPTY};
use common::ids;
use node_graph_editor::{InteractionMode, Key, Modifiers, SocketRef};

/// Default scene plus node "c" fed by b.out, so "b" has two connections.
fn three_node_chain() -> EditorHarness {
    let mut harness = EditorHarness::new();
    harness.engine.add_node(number_node("c", 400.0, 400.0));
    harness
        .engine
        .connect(&SocketRef::new("b", "out"), &SocketRef::new("c", "in"))
        .unwrap();
    harness.events();
    harness
}

// ============================================================================
// Delete
// ============================================================================

#[test]
fn test_delete_node_removes_connections_first() {
    let mut harness = three_node_chain();
    harness.click(B_CENTER);
    harness.events();

    assert!(harness.press(Key::Delete));

    let log = harness.events();
    assert_eq!(
        log.kinds(),
        [
            "connection_removed",
            "connection_removed",
            "node_removed",
            "selection_changed"
        ]
    );
    let removed: Vec<String> = log
        .connections("connection_removed")
        .iter()
        .map(|c| c.as_str().to_string())
        .collect();
    assert_eq!(removed, ["link-1", "conn-1"]);
    assert_eq!(log.nodes("node_removed"), ids(&["b"]));
    assert_eq!(log.last_selection(), Some(Vec::new()));

    let graph = harness.engine.graph();
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.connection_count(), 0);
    assert!(!graph.socket(&SocketRef::new("a", "out")).unwrap().is_connected());
}

#[test]
fn test_backspace_deletes_too() {
    let mut harness = EditorHarness::new();
    harness.click(A_CENTER);
    assert!(harness.press(Key::Backspace));
    assert!(harness.engine.graph().node("a").is_none());
}

#[test]
fn test_delete_with_empty_selection_does_nothing() {
    let mut harness = EditorHarness::new();
    assert!(!harness.press(Key::Delete));
    assert!(harness.events().is_empty());
    assert_eq!(harness.engine.graph().node_count(), 2);
}

#[test]
fn test_delete_selected_connection_only() {
    let mut harness = EditorHarness::new();
    harness.engine.select_connection("link-1", false);
    harness.events();

    harness.press(Key::Delete);
    assert_eq!(harness.engine.graph().connection_count(), 0);
    assert_eq!(harness.engine.graph().node_count(), 2);
    assert_eq!(
        harness.events().kinds(),
        ["connection_removed", "selection_changed"]
    );
}

#[test]
fn test_delete_all_selected_nodes() {
    let mut harness = three_node_chain();
    harness.engine.select_all();
    harness.events();

    assert_eq!(harness.engine.delete_selected(), 3);
    let log = harness.events();
    assert_eq!(log.count("connection_removed"), 2);
    assert_eq!(log.nodes("node_removed"), ids(&["a", "b", "c"]));
    assert_eq!(harness.engine.graph().node_count(), 0);
}

#[test]
fn test_delete_leaves_nothing_selected() {
    let mut harness = three_node_chain();
    harness.engine.select_node("a", false);
    harness.engine.select_node("c", true);
    harness.events();

    harness.press(Key::Delete);
    assert!(harness.selected().is_empty());
    assert!(harness.selected_connections().is_empty());
    assert_eq!(harness.events().last_selection(), Some(Vec::new()));

    // Survivors are not re-selected by the next delete
    assert_eq!(harness.engine.delete_selected(), 0);
    assert_eq!(harness.engine.graph().node_count(), 1);
}

#[test]
fn test_delete_ignored_while_dragging() {
    let mut harness = EditorHarness::new();
    harness.down(A_CENTER);
    harness.move_to((A_CENTER.0 + 10.0, A_CENTER.1));
    assert!(!harness.press(Key::Delete));
    assert!(harness.engine.graph().node("a").is_some());
    harness.up((A_CENTER.0 + 10.0, A_CENTER.1));
}

#[test]
fn test_remove_node_api_cascades() {
    let mut harness = three_node_chain();
    assert!(harness.engine.remove_node("b"));
    assert!(!harness.engine.remove_node("b"));

    let log = harness.events();
    assert_eq!(
        log.kinds(),
        ["connection_removed", "connection_removed", "node_removed"]
    );
}

#[test]
fn test_removing_selected_node_updates_selection() {
    let mut harness = EditorHarness::new();
    harness.engine.select_all();
    harness.events();

    harness.engine.remove_node("a");
    assert_eq!(harness.selected(), ["b"]);
    assert_eq!(harness.events().last_selection(), Some(ids(&["b"])));
}

// ============================================================================
// Escape
// ============================================================================

#[test]
fn test_escape_cancels_box_selection() {
    let mut harness = EditorHarness::new();
    harness.down(EMPTY);
    harness.move_to((50.0, 50.0));
    assert!(harness.press(Key::Escape));

    assert!(harness.engine.mode().is_idle());
    harness.up((50.0, 50.0));
    assert!(harness.selected().is_empty());
}

#[test]
fn test_escape_cancels_connection_drag() {
    let mut harness = EditorHarness::new();
    harness.down(B_OUT);
    assert!(matches!(harness.engine.mode(), InteractionMode::ConnectingSocket { .. }));
    assert!(harness.press(Key::Escape));
    assert!(harness.engine.connection_preview().is_none());
}

#[test]
fn test_escape_when_idle_is_unhandled() {
    let mut harness = EditorHarness::new();
    assert!(!harness.press(Key::Escape));
}

#[test]
fn test_escape_stops_panning() {
    let mut harness = EditorHarness::new();
    harness.engine.handle_input(
        &node_graph_editor::InputEvent::pointer_down(10.0, 10.0)
            .with_button(node_graph_editor::PointerButton::Middle),
    );
    assert!(harness.engine.is_panning());
    assert!(harness.press(Key::Escape));
    assert!(!harness.engine.is_panning());
}

// ============================================================================
// Shortcuts
// ============================================================================

#[test]
fn test_ctrl_a_selects_all() {
    let mut harness = EditorHarness::new();
    assert!(harness.press_with(Key::Character('a'), Modifiers::CTRL));
    assert_eq!(harness.selected(), ["a", "b"]);
    let log = harness.events();
    assert_eq!(log.nodes("node_selected"), ids(&["a", "b"]));
    assert_eq!(log.count("selection_changed"), 1);
}

#[test]
fn test_cmd_a_selects_all() {
    let mut harness = EditorHarness::new();
    let meta = Modifiers {
        meta: true,
        ..Modifiers::NONE
    };
    assert!(harness.press_with(Key::Character('A'), meta));
    assert_eq!(harness.selected().len(), 2);
}

#[test]
fn test_plain_a_does_nothing() {
    let mut harness = EditorHarness::new();
    assert!(!harness.press(Key::Character('a')));
    assert!(harness.selected().is_empty());
}

#[test]
fn test_f_frames_all_nodes() {
    let mut harness = EditorHarness::new();
    assert!(harness.press(Key::Character('f')));

    // Content (100,100)-(550,300) plus 50 padding is 550x300
    let viewport = harness.engine.viewport();
    let zoom = viewport.zoom();
    assert!((zoom - (800.0f32 / 550.0).min(600.0 / 300.0)).abs() < 1e-4);
    let centre = viewport.world_to_screen((325.0, 200.0));
    assert!((centre.0 - 400.0).abs() < 1e-3 && (centre.1 - 300.0).abs() < 1e-3);

    let log = harness.events();
    assert_eq!(log.count("zoom_changed"), 1);
    assert_eq!(log.count("pan_changed"), 1);
}

#[test]
fn test_f_on_empty_graph_is_unhandled() {
    let mut harness = EditorHarness::empty(Default::default());
    assert!(!harness.press(Key::Character('f')));
}

#[test]
fn test_unknown_key_is_unhandled() {
    let mut harness = EditorHarness::new();
    assert!(!harness.press(Key::Other("F5".into())));
    assert!(!harness.engine.handle_input(&node_graph_editor::InputEvent::KeyUp {
        key: Key::Delete,
        modifiers: Modifiers::NONE,
    }));
}
