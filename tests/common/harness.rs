//! Test harness around an [`InteractionEngine`] with a small default scene.
//!
//! Scene layout in world units (panel 800x600, zoom 1, no pan, so screen
//! and world coordinates coincide until a test changes the view):
//!
//! ```text
//! node "a"  (100, 100) 150x100   in  -> (92, 144)   out -> (258, 144)
//! node "b"  (400, 200) 150x100   in  -> (392, 244)  out -> (558, 244)
//! link-1    a.out -> b.in
//! ```

#![allow(dead_code)]

use super::EventLog;
use node_graph_editor::{
    Connection, DataKind, EditorConfig, InputEvent, InteractionEngine, Key, Modifiers, Node,
    PointerButton, Socket, SocketRef,
};

pub const A_IN: (f32, f32) = (92.0, 144.0);
pub const A_OUT: (f32, f32) = (258.0, 144.0);
pub const B_IN: (f32, f32) = (392.0, 244.0);
pub const B_OUT: (f32, f32) = (558.0, 244.0);
pub const A_CENTER: (f32, f32) = (175.0, 150.0);
pub const B_CENTER: (f32, f32) = (475.0, 250.0);
pub const EMPTY: (f32, f32) = (700.0, 550.0);

/// Node with one Number input `in` and one Number output `out`.
pub fn number_node(id: &str, x: f32, y: f32) -> Node {
    Node::new(id, id.to_uppercase())
        .with_position(x, y)
        .with_size(150.0, 100.0)
        .with_socket(Socket::input("in", "In", DataKind::Number))
        .with_socket(Socket::output("out", "Out", DataKind::Number))
}

pub struct EditorHarness {
    pub engine: InteractionEngine,
}

impl EditorHarness {
    /// Default scene with default config. Setup events are discarded.
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        let mut harness = Self::empty(config);
        harness.engine.add_node(number_node("a", 100.0, 100.0));
        harness.engine.add_node(number_node("b", 400.0, 200.0));
        harness.engine.add_connection(Connection::new(
            "link-1",
            SocketRef::new("a", "out"),
            SocketRef::new("b", "in"),
        ));
        harness.engine.drain_events();
        harness
    }

    /// No nodes, panel 800x600.
    pub fn empty(config: EditorConfig) -> Self {
        let mut engine = InteractionEngine::new(config);
        engine.set_panel_size(800.0, 600.0);
        engine.drain_events();
        Self { engine }
    }

    /// Drain and wrap the queued events.
    pub fn events(&mut self) -> EventLog {
        EventLog::new(self.engine.drain_events())
    }

    // === Pointer ===

    pub fn down(&mut self, at: (f32, f32)) -> bool {
        self.engine.handle_input(&InputEvent::pointer_down(at.0, at.1))
    }

    pub fn down_with(&mut self, at: (f32, f32), modifiers: Modifiers) -> bool {
        self.engine
            .handle_input(&InputEvent::pointer_down(at.0, at.1).with_modifiers(modifiers))
    }

    pub fn move_to(&mut self, at: (f32, f32)) -> bool {
        self.engine.handle_input(&InputEvent::pointer_move(at.0, at.1))
    }

    pub fn up(&mut self, at: (f32, f32)) -> bool {
        self.engine.handle_input(&InputEvent::pointer_up(at.0, at.1))
    }

    pub fn click(&mut self, at: (f32, f32)) {
        self.down(at);
        self.up(at);
    }

    pub fn shift_click(&mut self, at: (f32, f32)) {
        self.down_with(at, Modifiers::SHIFT);
        self.up(at);
    }

    /// Left-button drag in a few intermediate steps.
    pub fn drag(&mut self, from: (f32, f32), to: (f32, f32)) {
        self.down(from);
        for step in 1..=4 {
            let t = step as f32 / 4.0;
            self.move_to((from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t));
        }
        self.up(to);
    }

    pub fn middle_drag(&mut self, from: (f32, f32), to: (f32, f32)) {
        self.engine.handle_input(
            &InputEvent::pointer_down(from.0, from.1).with_button(PointerButton::Middle),
        );
        self.move_to(to);
        self.engine
            .handle_input(&InputEvent::pointer_up(to.0, to.1).with_button(PointerButton::Middle));
    }

    pub fn right_click(&mut self, at: (f32, f32)) -> bool {
        self.engine
            .handle_input(&InputEvent::pointer_down(at.0, at.1).with_button(PointerButton::Right))
    }

    pub fn wheel(&mut self, at: (f32, f32), delta: f32) -> bool {
        self.engine.handle_input(&InputEvent::Wheel {
            position: at,
            delta,
            modifiers: Modifiers::NONE,
        })
    }

    // === Keyboard ===

    pub fn press(&mut self, key: Key) -> bool {
        self.engine.handle_input(&InputEvent::key(key))
    }

    pub fn press_with(&mut self, key: Key, modifiers: Modifiers) -> bool {
        self.engine
            .handle_input(&InputEvent::key(key).with_modifiers(modifiers))
    }

    // === Queries ===

    pub fn position(&self, id: &str) -> (f32, f32) {
        self.engine
            .graph()
            .node(id)
            .map(Node::position)
            .unwrap_or_else(|| panic!("node {} missing", id))
    }

    pub fn selected(&self) -> Vec<String> {
        self.engine
            .selected_nodes()
            .map(|id| id.as_str().to_string())
            .collect()
    }

    pub fn selected_connections(&self) -> Vec<String> {
        self.engine
            .selected_connections()
            .map(|id| id.as_str().to_string())
            .collect()
    }
}
