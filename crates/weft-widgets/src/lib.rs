#![forbid(unsafe_code)]

//! Weft Widgets
//!
//! The element tree of a weft session and everything built on it.
//!
//! # Key Components
//!
//! - [`Ui`] - the element arena, its scheduler and the session's windows
//! - [`ElementCollection`] - a panel's children in child order and z order
//! - panels - overlay, stack, scroll, split, size limiter, virtual list
//! - windows - screen placement, mouse capture, input routing, hover
//! - tabs - hosts, the tab drag state machine and empty-host cleanup
//! - [`Renderer`] - the drawing seam of the visual pass
//!
//! # Threading
//!
//! A [`Ui`] is single-threaded: every method runs on the thread that owns
//! it and no type here is `Send`. Callbacks posted to the scheduler run
//! during the next [`Ui::update`].

mod backend;
mod collection;
mod error;
mod focus;
mod invariants;
mod node;
mod observer;
mod panel;
mod panels;
mod render;
mod tabs;
mod tree;
mod window;

pub use backend::{
    BackendCall, HeadlessBackend, HeadlessPlatform, Platform, WindowBackend, WindowStyle,
};
pub use collection::ElementCollection;
pub use error::{CollectionError, TreeError};
pub use invariants::{InvariantCode, InvariantIssue, InvariantReport, InvariantSeverity};
pub use node::ElementKind;
pub use observer::{CollectionChange, ObserverHandle, UiEvent};
pub use panels::VIRTUAL_LIST_OVERSCAN;
pub use render::{DrawCommand, PaintRole, RecordingRenderer, Renderer, destination_area};
pub use tabs::{
    DragPhase, DragState, DropDestination, TAB_BUTTON_HEIGHT, TabManager, destination_at,
};
pub use tree::{DEFAULT_ITEM_EXTENT, Ui};
