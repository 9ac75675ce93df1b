//! Toolkit-independent input events consumed by the interaction engine.
//!
//! Positions are in screen space, relative to the editor panel's top-left
//! corner.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerButton {
    Left,
    Middle,
    Right,
}

/// Modifier key state at the time of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };

    /// Shift or Ctrl extend/toggle the selection instead of replacing it.
    pub fn is_additive(&self) -> bool {
        self.shift || self.ctrl
    }

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn is_command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Keys the editor reacts to. Everything else arrives as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Delete,
    Backspace,
    Escape,
    Character(char),
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    PointerDown {
        position: (f32, f32),
        button: PointerButton,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerMove {
        position: (f32, f32),
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerUp {
        position: (f32, f32),
        button: PointerButton,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Vertical wheel delta in notches; positive zooms in.
    Wheel {
        position: (f32, f32),
        delta: f32,
        #[serde(default)]
        modifiers: Modifiers,
    },
    KeyDown {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
    KeyUp {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// The editor panel changed size.
    Resize { width: f32, height: f32 },
}

impl InputEvent {
    pub fn pointer_down(x: f32, y: f32) -> Self {
        Self::PointerDown {
            position: (x, y),
            button: PointerButton::Left,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn pointer_move(x: f32, y: f32) -> Self {
        Self::PointerMove {
            position: (x, y),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn pointer_up(x: f32, y: f32) -> Self {
        Self::PointerUp {
            position: (x, y),
            button: PointerButton::Left,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn key(key: Key) -> Self {
        Self::KeyDown {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    /// Replace the button of a pointer down/up event.
    pub fn with_button(mut self, new_button: PointerButton) -> Self {
        match &mut self {
            Self::PointerDown { button, .. } | Self::PointerUp { button, .. } => *button = new_button,
            _ => {}
        }
        self
    }

    /// Replace the modifier state of any event that carries one.
    pub fn with_modifiers(mut self, new_modifiers: Modifiers) -> Self {
        match &mut self {
            Self::PointerDown { modifiers, .. }
            | Self::PointerMove { modifiers, .. }
            | Self::PointerUp { modifiers, .. }
            | Self::Wheel { modifiers, .. }
            | Self::KeyDown { modifiers, .. }
            | Self::KeyUp { modifiers, .. } => *modifiers = new_modifiers,
            Self::Resize { .. } => {}
        }
        self
    }

    /// Screen position for pointer and wheel events.
    pub fn position(&self) -> Option<(f32, f32)> {
        match self {
            Self::PointerDown { position, .. }
            | Self::PointerMove { position, .. }
            | Self::PointerUp { position, .. }
            | Self::Wheel { position, .. } => Some(*position),
            _ => None,
        }
    }
}
