//! Events.

use crate::rect::Point;
use bitflags::bitflags;

bitflags! {
    /// Modifier key state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// Any shift key.
        const SHIFT = 0x1;
        /// Any control key.
        const CONTROL = 0x2;
        /// Any alt or option key.
        const ALT = 0x4;
        /// Any super, command or meta key.
        const SUPER = 0x8;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseAction {
    Press,
    Release,
    Move,
}

/// A mouse event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    pub action: MouseAction,

    /// The button that changed state; `None` for moves.
    pub button: Option<MouseButton>,

    pub modifiers: Modifiers,

    /// Event location in the receiving view’s coordinate system.
    ///
    /// Filled in by the dispatcher for each view the event visits.
    pub location: Point,

    /// Event location in the window coordinate system.
    pub window_location: Point,
}

impl MouseEvent {
    pub fn press(button: MouseButton, window_location: Point) -> MouseEvent {
        MouseEvent::new(MouseAction::Press, Some(button), window_location)
    }

    pub fn release(button: MouseButton, window_location: Point) -> MouseEvent {
        MouseEvent::new(MouseAction::Release, Some(button), window_location)
    }

    pub fn moved(window_location: Point) -> MouseEvent {
        MouseEvent::new(MouseAction::Move, None, window_location)
    }

    fn new(action: MouseAction, button: Option<MouseButton>, window_location: Point) -> MouseEvent {
        MouseEvent {
            action,
            button,
            modifiers: Modifiers::empty(),
            location: window_location,
            window_location,
        }
    }

    pub fn with_modifiers(self, modifiers: Modifiers) -> MouseEvent {
        MouseEvent { modifiers, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    Press,
    Release,
    /// Auto-repeat while held down.
    Repeat,
}

/// A key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: KeyCode,
    /// Platform-specific scancode, passed through from the backend.
    pub scancode: i32,
    pub action: KeyAction,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: KeyCode, action: KeyAction) -> KeyEvent {
        KeyEvent {
            key,
            scancode: 0,
            action,
            modifiers: Modifiers::empty(),
        }
    }

    pub fn with_modifiers(self, modifiers: Modifiers) -> KeyEvent {
        KeyEvent { modifiers, ..self }
    }
}

/// Keyboard layout-independent identifiers for keyboard keys.
///
/// Keys the backend can’t map end up as `Unknown`; the scancode still identifies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    N0,
    N1,
    N2,
    N3,
    N4,
    N5,
    N6,
    N7,
    N8,
    N9,
    Space,
    Apostrophe,
    Comma,
    Minus,
    Period,
    Slash,
    Semicolon,
    Equal,
    LeftBracket,
    Backslash,
    RightBracket,
    Grave,
    Escape,
    Enter,
    Tab,
    Backspace,
    Insert,
    Delete,
    Right,
    Left,
    Down,
    Up,
    PageUp,
    PageDown,
    Home,
    End,
    CapsLock,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    Numpad0,
    Numpad1,
    Numpad2,
    Numpad3,
    Numpad4,
    Numpad5,
    Numpad6,
    Numpad7,
    Numpad8,
    Numpad9,
    NumpadDecimal,
    NumpadDivide,
    NumpadMultiply,
    NumpadMinus,
    NumpadPlus,
    NumpadEnter,
    LeftShift,
    LeftControl,
    LeftAlt,
    LeftSuper,
    RightShift,
    RightControl,
    RightAlt,
    RightSuper,
    Menu,
    Unknown,
}
