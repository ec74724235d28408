//! Raw input as delivered by a backend.

use crate::events::{KeyAction, KeyCode, Modifiers, MouseButton};

/// Whether a mouse button went down or up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonAction {
    Press,
    Release,
}

/// One windowing-system callback, turned into data so it can cross a channel.
///
/// Backend adapters send these to [`Host::event_sender`](crate::Host::event_sender); the host
/// translates them into dispatch calls on its context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawEvent {
    /// The framebuffer was resized.
    Resize { width: i32, height: i32 },
    Key {
        key: KeyCode,
        scancode: i32,
        action: KeyAction,
        modifiers: Modifiers,
    },
    MouseButton {
        button: MouseButton,
        action: ButtonAction,
        modifiers: Modifiers,
    },
    /// The cursor moved; coordinates are in window pixels.
    CursorPos { x: f64, y: f64 },
}
