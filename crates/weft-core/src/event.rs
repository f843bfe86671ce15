#![forbid(unsafe_code)]

//! Platform input events delivered to a window.
//!
//! A platform backend translates its native message stream into
//! [`WindowEvent`]s and hands them to the UI one at a time. Positions are in
//! the receiving window's client coordinates.
//!
//! # Design Notes
//!
//! - Mouse events carry modifiers so drag gestures can inspect them
//! - `CaptureLost` is delivered synchronously when the OS revokes capture
//! - `Modifiers` use bitflags for easy combination

use bitflags::bitflags;

use crate::geometry::{Point, Size};

/// Canonical window event.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowEvent {
    /// The mouse moved over (or, while captured, outside) the client area.
    MouseMove(MouseEvent),
    /// A mouse button was pressed.
    MouseDown(MouseEvent),
    /// A mouse button was released.
    MouseUp(MouseEvent),
    /// The wheel was scrolled.
    MouseScroll(ScrollEvent),
    /// The mouse left the client area.
    MouseLeave,
    /// A key was pressed.
    KeyDown(KeyEvent),
    /// A key was released.
    KeyUp(KeyEvent),
    /// Composed text input.
    TextInput(String),
    /// The client area was resized.
    Resized(Size),
    /// The OS revoked mouse capture from this window.
    CaptureLost,
    /// The window lost keyboard focus.
    FocusLost,
    /// The user asked to close the window.
    CloseRequested,
}

bitflags! {
    /// Modifier keys held during an input event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MouseButton {
    /// Primary button.
    #[default]
    Primary,
    /// Secondary button.
    Secondary,
    /// Middle button (scroll wheel click).
    Middle,
}

/// A mouse button or motion event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    /// Client-space position.
    pub position: Point,
    /// Button involved (ignored for moves).
    pub button: MouseButton,
    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
}

impl MouseEvent {
    /// Create a primary-button event at `position`.
    #[must_use]
    pub const fn at(position: Point) -> Self {
        Self {
            position,
            button: MouseButton::Primary,
            modifiers: Modifiers::NONE,
        }
    }

    /// Create an event for a specific button.
    #[must_use]
    pub const fn with_button(mut self, button: MouseButton) -> Self {
        self.button = button;
        self
    }

    /// Create a mouse event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// A wheel event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollEvent {
    /// Client-space position of the pointer.
    pub position: Point,
    /// Horizontal wheel delta in notches (positive scrolls right).
    pub delta_x: f64,
    /// Vertical wheel delta in notches (positive scrolls down).
    pub delta_y: f64,
}

/// Key identifiers the core cares about; everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Escape,
    Tab,
    Enter,
    Left,
    Right,
    Up,
    Down,
    Char(char),
    Other(u32),
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key.
    pub code: KeyCode,
    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Create a key event without modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
        }
    }
}
