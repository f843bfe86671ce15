#![forbid(unsafe_code)]

//! Seams to the platform window system.
//!
//! A [`Platform`] creates one [`WindowBackend`] per top-level window. The core
//! only ever asks a backend to move, show, hide, activate, capture the mouse
//! and convert coordinates; native message pumps stay on the other side and
//! feed [`WindowEvent`](weft_core::WindowEvent)s into
//! [`Ui::dispatch_event`](crate::Ui::dispatch_event).
//!
//! [`HeadlessPlatform`] and [`HeadlessBackend`] implement the seam in memory
//! for tests and tools. Clones share state, so a test can keep a handle and
//! inspect what the UI asked for.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use weft_core::{Point, Rect};

/// Presentation of a top-level window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WindowStyle {
    /// A regular decorated window managed by the tab manager.
    #[default]
    Normal,
    /// Borderless, always-on-top window following a dragged tab.
    Ghost,
}

/// One native window.
pub trait WindowBackend: fmt::Debug {
    /// Convert a client point to screen coordinates.
    fn client_to_screen(&self, point: Point) -> Point;

    /// Convert a screen point to client coordinates.
    fn screen_to_client(&self, point: Point) -> Point;

    /// Client area in screen coordinates.
    fn screen_bounds(&self) -> Rect;

    /// Move and resize the client area.
    fn set_screen_bounds(&mut self, bounds: Rect);

    fn show(&mut self);

    fn hide(&mut self);

    /// Raise the window and give it keyboard focus.
    fn activate(&mut self);

    /// Route all mouse input to this window.
    fn set_mouse_capture(&mut self);

    fn release_mouse_capture(&mut self);

    /// Destroy the native window.
    fn close(&mut self);
}

/// Factory of native windows.
pub trait Platform {
    /// Create a hidden window whose client area covers `bounds` (screen
    /// coordinates).
    fn create_window(&mut self, style: WindowStyle, bounds: Rect) -> Box<dyn WindowBackend>;
}

/// A request recorded by a [`HeadlessBackend`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackendCall {
    SetBounds(Rect),
    Show,
    Hide,
    Activate,
    SetCapture,
    ReleaseCapture,
    Close,
}

#[derive(Debug, Default)]
struct HeadlessState {
    style: WindowStyle,
    bounds: Rect,
    visible: bool,
    captured: bool,
    closed: bool,
    calls: Vec<BackendCall>,
}

/// In-memory window backend.
#[derive(Debug, Clone, Default)]
pub struct HeadlessBackend {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessBackend {
    /// A hidden window covering `bounds`.
    #[must_use]
    pub fn new(style: WindowStyle, bounds: Rect) -> Self {
        Self {
            state: Rc::new(RefCell::new(HeadlessState {
                style,
                bounds,
                ..HeadlessState::default()
            })),
        }
    }

    #[must_use]
    pub fn style(&self) -> WindowStyle {
        self.state.borrow().style
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.state.borrow().visible
    }

    #[must_use]
    pub fn has_capture(&self) -> bool {
        self.state.borrow().captured
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.borrow().closed
    }

    /// Every request made so far.
    #[must_use]
    pub fn calls(&self) -> Vec<BackendCall> {
        self.state.borrow().calls.clone()
    }

    fn record(&self, call: BackendCall) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl WindowBackend for HeadlessBackend {
    fn client_to_screen(&self, point: Point) -> Point {
        point + self.state.borrow().bounds.origin()
    }

    fn screen_to_client(&self, point: Point) -> Point {
        point - self.state.borrow().bounds.origin()
    }

    fn screen_bounds(&self) -> Rect {
        self.state.borrow().bounds
    }

    fn set_screen_bounds(&mut self, bounds: Rect) {
        self.state.borrow_mut().bounds = bounds;
        self.record(BackendCall::SetBounds(bounds));
    }

    fn show(&mut self) {
        self.state.borrow_mut().visible = true;
        self.record(BackendCall::Show);
    }

    fn hide(&mut self) {
        self.state.borrow_mut().visible = false;
        self.record(BackendCall::Hide);
    }

    fn activate(&mut self) {
        self.record(BackendCall::Activate);
    }

    fn set_mouse_capture(&mut self) {
        self.state.borrow_mut().captured = true;
        self.record(BackendCall::SetCapture);
    }

    fn release_mouse_capture(&mut self) {
        self.state.borrow_mut().captured = false;
        self.record(BackendCall::ReleaseCapture);
    }

    fn close(&mut self) {
        {
            let mut state = self.state.borrow_mut();
            state.closed = true;
            state.visible = false;
        }
        self.record(BackendCall::Close);
    }
}

/// Platform creating [`HeadlessBackend`]s. Clones share the list of created
/// windows.
#[derive(Debug, Clone, Default)]
pub struct HeadlessPlatform {
    created: Rc<RefCell<Vec<HeadlessBackend>>>,
}

impl HeadlessPlatform {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles to every backend created so far, oldest first.
    #[must_use]
    pub fn backends(&self) -> Vec<HeadlessBackend> {
        self.created.borrow().clone()
    }

    /// Number of windows whose backend is still open.
    #[must_use]
    pub fn open_windows(&self) -> usize {
        self.created.borrow().iter().filter(|b| !b.is_closed()).count()
    }
}

impl Platform for HeadlessPlatform {
    fn create_window(&mut self, style: WindowStyle, bounds: Rect) -> Box<dyn WindowBackend> {
        let backend = HeadlessBackend::new(style, bounds);
        self.created.borrow_mut().push(backend.clone());
        Box::new(backend)
    }
}
