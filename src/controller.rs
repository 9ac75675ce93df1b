//! Slint glue for the interaction engine.
//!
//! [`NodeEditorController`] shares one [`InteractionEngine`] between the
//! callbacks of a Slint window and converts between Slint's value types and
//! the engine's.
//!
//! ```ignore
//! use node_graph_editor::{EditorConfig, NodeEditorController};
//!
//! slint::include_modules!();
//!
//! let window = MainWindow::new()?;
//! let ctrl = NodeEditorController::new(EditorConfig::default());
//!
//! window.on_compute_link_path(ctrl.compute_link_path_callback());
//! window.on_pointer_pressed({
//!     let ctrl = ctrl.clone();
//!     move |x, y, button, shift, ctrl_key| ctrl.pointer_down(x, y, button, shift, ctrl_key)
//! });
//! window.set_selected_nodes(ctrl.selection_model());
//! ```
//!
//! Requires the `slint` feature.

use crate::config::EditorConfig;
use crate::events::EditorEvent;
use crate::input::{InputEvent, Key, Modifiers, PointerButton};
use crate::interaction::InteractionEngine;
use slint::platform::PointerEventButton;
use slint::{Model, ModelRc, SharedString, VecModel};
use std::cell::RefCell;
use std::rc::Rc;

/// Map a Slint pointer button; buttons the editor does not use map to `None`.
pub fn pointer_button_from_slint(button: PointerEventButton) -> Option<PointerButton> {
    match button {
        PointerEventButton::Left => Some(PointerButton::Left),
        PointerEventButton::Middle => Some(PointerButton::Middle),
        PointerEventButton::Right => Some(PointerButton::Right),
        _ => None,
    }
}

/// Map the text of a Slint key event.
pub fn key_from_slint(text: &str) -> Key {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c == char::from(slint::platform::Key::Delete) => Key::Delete,
        (Some(c), None) if c == char::from(slint::platform::Key::Backspace) => Key::Backspace,
        (Some(c), None) if c == char::from(slint::platform::Key::Escape) => Key::Escape,
        (Some(c), None) => Key::Character(c),
        _ => Key::Other(text.to_string()),
    }
}

/// Cloneable handle sharing one engine across Slint callbacks.
#[derive(Clone)]
pub struct NodeEditorController {
    engine: Rc<RefCell<InteractionEngine>>,
    selection: Rc<VecModel<SharedString>>,
}

impl Default for NodeEditorController {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl NodeEditorController {
    pub fn new(config: EditorConfig) -> Self {
        Self::with_engine(InteractionEngine::new(config))
    }

    pub fn with_engine(engine: InteractionEngine) -> Self {
        let controller = Self {
            engine: Rc::new(RefCell::new(engine)),
            selection: Rc::new(VecModel::default()),
        };
        controller.sync_selection();
        controller
    }

    /// Shared access to the engine, for graph setup and queries.
    pub fn engine(&self) -> Rc<RefCell<InteractionEngine>> {
        self.engine.clone()
    }

    // === Input ===

    pub fn handle_input(&self, event: &InputEvent) -> bool {
        let handled = self.engine.borrow_mut().handle_input(event);
        if handled {
            self.sync_selection();
        }
        handled
    }

    pub fn pointer_down(&self, x: f32, y: f32, button: PointerEventButton, shift: bool, ctrl: bool) -> bool {
        let Some(button) = pointer_button_from_slint(button) else {
            return false;
        };
        self.handle_input(&InputEvent::PointerDown {
            position: (x, y),
            button,
            modifiers: modifiers(shift, ctrl),
        })
    }

    pub fn pointer_move(&self, x: f32, y: f32) -> bool {
        self.handle_input(&InputEvent::pointer_move(x, y))
    }

    pub fn pointer_up(&self, x: f32, y: f32, button: PointerEventButton) -> bool {
        let Some(button) = pointer_button_from_slint(button) else {
            return false;
        };
        self.handle_input(&InputEvent::pointer_up(x, y).with_button(button))
    }

    pub fn scroll(&self, x: f32, y: f32, delta: f32) -> bool {
        self.handle_input(&InputEvent::Wheel {
            position: (x, y),
            delta,
            modifiers: Modifiers::NONE,
        })
    }

    pub fn key_pressed(&self, text: &str, shift: bool, ctrl: bool) -> bool {
        self.handle_input(&InputEvent::key(key_from_slint(text)).with_modifiers(modifiers(shift, ctrl)))
    }

    pub fn resize(&self, width: f32, height: f32) {
        self.engine.borrow_mut().set_panel_size(width, height);
    }

    // === Rendering ===

    /// SVG path of one connection in screen space, empty if unknown.
    pub fn compute_link_path(&self, id: &str) -> SharedString {
        let mut engine = self.engine.borrow_mut();
        let path = engine
            .geometry()
            .links()
            .iter()
            .find(|l| l.id.as_str() == id)
            .map(|l| l.svg_path())
            .unwrap_or_default();
        path.into()
    }

    /// Callback for a `compute-link-path(string) -> string` binding.
    pub fn compute_link_path_callback(&self) -> impl Fn(SharedString) -> SharedString {
        let ctrl = self.clone();
        move |id| ctrl.compute_link_path(id.as_str())
    }

    /// Path of the in-progress connection drag, empty when not connecting.
    pub fn connection_preview_path(&self) -> SharedString {
        self.engine
            .borrow()
            .connection_preview()
            .map(|curve| curve.to_svg_path())
            .unwrap_or_default()
            .into()
    }

    pub fn grid_commands(&self, major: bool) -> SharedString {
        self.engine.borrow().grid_lines().to_svg_path(major).into()
    }

    /// Selection rectangle as `(x, y, width, height)`, zero-sized when inactive.
    pub fn selection_box(&self) -> (f32, f32, f32, f32) {
        self.engine
            .borrow()
            .selection_rect()
            .map_or((0.0, 0.0, 0.0, 0.0), |r| (r.x, r.y, r.width, r.height))
    }

    // === Selection ===

    /// Model of selected node ids, kept current by the input handlers.
    pub fn selection_model(&self) -> ModelRc<SharedString> {
        ModelRc::from(self.selection.clone())
    }

    /// Rewrite the selection model if it differs from the engine.
    pub fn sync_selection(&self) {
        let selected: Vec<SharedString> = self
            .engine
            .borrow()
            .selected_nodes()
            .map(|id| SharedString::from(id.as_str()))
            .collect();
        let unchanged = self.selection.row_count() == selected.len()
            && self.selection.iter().zip(&selected).all(|(a, b)| &a == b);
        if !unchanged {
            self.selection.set_vec(selected);
        }
    }

    pub fn drain_events(&self) -> Vec<EditorEvent> {
        self.engine.borrow_mut().drain_events()
    }
}

fn modifiers(shift: bool, ctrl: bool) -> Modifiers {
    Modifiers {
        shift,
        ctrl,
        ..Modifiers::NONE
    }
}
