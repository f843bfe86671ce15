#![forbid(unsafe_code)]

//! Core types for weft.
//!
//! # Role in weft
//! `weft-core` is the vocabulary shared by every other crate: device
//! independent geometry, element identity, visibility flags and the input
//! events a platform backend delivers to a window. It has no notion of the
//! element tree itself.

pub mod event;
pub mod geometry;
pub mod id;
pub mod visibility;

pub use event::{KeyCode, KeyEvent, Modifiers, MouseButton, MouseEvent, ScrollEvent, WindowEvent};
pub use geometry::{Orientation, Point, Rect, Sides, Size};
pub use id::{ElementId, ElementIdAllocator};
pub use visibility::Visibility;
