#![forbid(unsafe_code)]

//! Top-level windows, mouse capture and input routing.
//!
//! A window is a root element backed by a [`WindowBackend`]. Its layout
//! rectangle is its client area at the origin; screen placement lives in the
//! backend. Normal windows are tracked front to back by the tab manager,
//! ghost windows (the floating handle of a dragged tab) are not.
//!
//! # Mouse capture
//!
//! Capture is a single global resource. [`Ui::set_mouse_capture`] panics if
//! any element already holds it. When the platform revokes capture
//! ([`WindowEvent::CaptureLost`]) or the window loses focus, whatever
//! gesture owned the capture is reset so nothing stays stuck mid-drag.
//!
//! # Routing
//!
//! Without capture, mouse events follow the hit path under the pointer.
//! With capture, moves and releases go to the capturing element regardless
//! of position: a split separator being dragged or a pressed tab button.

use tracing::{debug, trace};
use weft_core::{
    ElementId, KeyCode, MouseButton, MouseEvent, Orientation, Point, Rect, ScrollEvent, Size,
    WindowEvent,
};

use crate::backend::{WindowBackend, WindowStyle};
use crate::error::TreeError;
use crate::node::{ElementFlags, ElementKind, NodeData, WindowData};
use crate::observer::UiEvent;
use crate::tabs::DragState;
use crate::tree::Capture;
use crate::Ui;

impl Ui {
    /// Open a normal window whose client area covers `bounds` (screen
    /// coordinates) and bring it to the front.
    pub fn create_window(&mut self, bounds: Rect) -> ElementId {
        self.create_window_styled(WindowStyle::Normal, bounds)
    }

    /// Adopt a backend created outside the session's platform.
    pub fn create_window_with_backend(&mut self, backend: Box<dyn WindowBackend>) -> ElementId {
        self.install_window(backend, WindowStyle::Normal)
    }

    pub(crate) fn create_window_styled(&mut self, style: WindowStyle, bounds: Rect) -> ElementId {
        let backend = self.platform.create_window(style, bounds);
        self.install_window(backend, style)
    }

    fn install_window(&mut self, mut backend: Box<dyn WindowBackend>, style: WindowStyle) -> ElementId {
        let size = backend.screen_bounds().size();
        backend.show();
        let window = self.insert_node(NodeData::Window(WindowData {
            backend,
            style,
            hovered: Vec::new(),
            closed: false,
        }));
        if let Some(node) = self.nodes.get_mut(&window) {
            node.layout = Rect::from_size(size);
            node.flags.insert(ElementFlags::FOCUS_SCOPE);
        }
        if style == WindowStyle::Normal {
            self.tabs.windows.insert(0, window);
        }
        self.scheduler.invalidate_children_layout(window);
        self.invalidate_visual(window);
        debug!(target: "weft.window", %window, ?style, ?size, "window created");
        window
    }

    fn window_data(&self, window: ElementId) -> Result<&WindowData, TreeError> {
        self.node(window)?.window().ok_or(TreeError::NotAWindow(window))
    }

    fn window_data_mut(&mut self, window: ElementId) -> Result<&mut WindowData, TreeError> {
        self.node_mut(window)?
            .window_mut()
            .ok_or(TreeError::NotAWindow(window))
    }

    #[must_use]
    pub fn window_style(&self, window: ElementId) -> Option<WindowStyle> {
        self.window_data(window).ok().map(|w| w.style)
    }

    /// Whether `window` is a window that has not been closed.
    #[must_use]
    pub fn is_window_open(&self, window: ElementId) -> bool {
        self.window_data(window).is_ok_and(|w| !w.closed)
    }

    /// Close `window`: the backend closes now, the subtree is disposed on
    /// the next frame.
    pub fn close_window(&mut self, window: ElementId) -> Result<(), TreeError> {
        self.window_data(window)?;
        self.mark_window_closed(window);
        self.dispose(window);
        Ok(())
    }

    fn mark_window_closed(&mut self, window: ElementId) {
        let Ok(data) = self.window_data_mut(window) else {
            return;
        };
        if data.closed {
            return;
        }
        data.closed = true;
        data.backend.close();
        let style = data.style;
        self.tabs.windows.retain(|&w| w != window);
        debug!(target: "weft.window", %window, "window closed");
        // The backend went with the window, so there is nothing to release.
        if let Some(capture) = self.capture.filter(|c| c.window == window) {
            self.capture = None;
            self.abort_captured_gesture(capture.element);
        }
        if matches!(self.tabs.drag, DragState::Free { ghost, .. } if ghost == window) {
            self.cancel_drag();
        }
        if style == WindowStyle::Normal {
            self.emit(UiEvent::WindowClosed { window });
        }
    }

    pub(crate) fn teardown_window(&mut self, window: ElementId) {
        self.mark_window_closed(window);
    }

    /// Move `window` to the front of the window list and activate it.
    pub fn bring_to_front(&mut self, window: ElementId) -> Result<(), TreeError> {
        self.window_data_mut(window)?.backend.activate();
        if let Some(index) = self.tabs.windows.iter().position(|&w| w == window)
            && index > 0
        {
            self.tabs.windows.remove(index);
            self.tabs.windows.insert(0, window);
            trace!(target: "weft.window", %window, "window raised");
        }
        Ok(())
    }

    /// Move and resize `window` on screen.
    pub fn set_window_bounds(&mut self, window: ElementId, bounds: Rect) -> Result<(), TreeError> {
        self.window_data_mut(window)?.backend.set_screen_bounds(bounds);
        self.resize_client(window, bounds.size());
        Ok(())
    }

    fn resize_client(&mut self, window: ElementId, size: Size) {
        if self.set_layout_rect(window, Rect::from_size(size)) {
            self.scheduler.invalidate_children_layout(window);
        }
    }

    /// Screen rectangle of the client area of `window`.
    #[must_use]
    pub fn screen_bounds(&self, window: ElementId) -> Option<Rect> {
        self.window_data(window).ok().map(|w| w.backend.screen_bounds())
    }

    /// The window `element` lives in.
    #[must_use]
    pub fn window_of(&self, element: ElementId) -> Option<ElementId> {
        let mut current = element;
        loop {
            let node = self.nodes.get(&current)?;
            match node.parent {
                Some(parent) => current = parent,
                None => return node.window().map(|_| current),
            }
        }
    }

    pub fn client_to_screen(&self, window: ElementId, point: Point) -> Option<Point> {
        self.window_data(window)
            .ok()
            .map(|w| w.backend.client_to_screen(point))
    }

    pub fn screen_to_client(&self, window: ElementId, point: Point) -> Option<Point> {
        self.window_data(window)
            .ok()
            .map(|w| w.backend.screen_to_client(point))
    }

    /// Layout rectangle of `element` in screen coordinates.
    #[must_use]
    pub fn screen_rect(&self, element: ElementId) -> Option<Rect> {
        let window = self.window_of(element)?;
        let rect = self.layout_rect(element)?;
        let origin = self.client_to_screen(window, rect.origin())?;
        Some(Rect::new(origin.x, origin.y, rect.width, rect.height))
    }

    // ---------------------------------------------------------------------
    // Mouse capture
    // ---------------------------------------------------------------------

    /// Route all mouse input to `element` until released.
    ///
    /// # Panics
    ///
    /// Panics if any element already holds the capture.
    pub fn set_mouse_capture(&mut self, element: ElementId) -> Result<(), TreeError> {
        self.node(element)?;
        let window = self.window_of(element).ok_or(TreeError::Detached(element))?;
        if let Some(held) = self.capture {
            panic!(
                "mouse capture requested by {element} while {} holds it",
                held.element
            );
        }
        self.window_data_mut(window)?.backend.set_mouse_capture();
        self.capture = Some(Capture { window, element });
        trace!(target: "weft.window", %window, %element, "mouse captured");
        Ok(())
    }

    /// Release the capture. Returns the element that held it.
    pub fn release_mouse_capture(&mut self) -> Option<ElementId> {
        let capture = self.capture.take()?;
        if let Ok(data) = self.window_data_mut(capture.window) {
            data.backend.release_mouse_capture();
        }
        trace!(target: "weft.window", element = %capture.element, "mouse released");
        Some(capture.element)
    }

    #[must_use]
    pub fn mouse_capture(&self) -> Option<ElementId> {
        self.capture.map(|c| c.element)
    }

    /// Reset whatever gesture `element` drove with the capture it lost.
    fn abort_captured_gesture(&mut self, element: ElementId) {
        match self.kind(element) {
            Some(ElementKind::Split) => {
                self.end_separator_drag(element);
            }
            Some(ElementKind::TabButton) => {
                self.tabs.pending_press = None;
                if self.drag_state().is_active() {
                    self.cancel_drag();
                }
            }
            _ => {}
        }
    }

    // ---------------------------------------------------------------------
    // Hover
    // ---------------------------------------------------------------------

    /// The elements under the pointer in `window`, outermost first.
    #[must_use]
    pub fn hovered(&self, window: ElementId) -> &[ElementId] {
        self.window_data(window)
            .map(|w| w.hovered.as_slice())
            .unwrap_or_default()
    }

    fn set_hover_path(&mut self, window: ElementId, path: Vec<ElementId>, position: Point) {
        let Ok(data) = self.window_data_mut(window) else {
            return;
        };
        let old = std::mem::replace(&mut data.hovered, path.clone());
        let common = old.iter().zip(&path).take_while(|(a, b)| a == b).count();
        for &element in old[common..].iter().rev() {
            self.emit(UiEvent::MouseLeave { element });
        }
        for &element in &path[common..] {
            self.emit(UiEvent::MouseEnter { element, position });
        }
    }

    /// Drop `child` and everything below it from the hover path of the
    /// window containing `panel`.
    pub(crate) fn forget_hover_below(&mut self, panel: ElementId, child: ElementId) {
        let Some(window) = self.window_of(panel) else {
            return;
        };
        let Ok(data) = self.window_data_mut(window) else {
            return;
        };
        let Some(index) = data.hovered.iter().position(|&e| e == child) else {
            return;
        };
        let gone = data.hovered.split_off(index);
        for element in gone.into_iter().rev() {
            self.emit(UiEvent::MouseLeave { element });
        }
    }

    /// Drop every hover reference to `element`.
    pub(crate) fn forget_hover(&mut self, element: ElementId) {
        let ghost = match self.tabs.drag {
            DragState::Free { ghost, .. } => Some(ghost),
            _ => None,
        };
        for window in self.tabs.windows.clone().into_iter().chain(ghost) {
            if let Ok(data) = self.window_data_mut(window)
                && let Some(index) = data.hovered.iter().position(|&e| e == element)
            {
                data.hovered.truncate(index);
            }
        }
    }

    // ---------------------------------------------------------------------
    // Event dispatch
    // ---------------------------------------------------------------------

    /// Feed one platform event to `window`.
    pub fn dispatch_event(&mut self, window: ElementId, event: WindowEvent) -> Result<(), TreeError> {
        if self.window_data(window)?.closed {
            return Ok(());
        }
        match event {
            WindowEvent::MouseMove(mouse) => self.on_mouse_move(window, mouse),
            WindowEvent::MouseDown(mouse) => self.on_mouse_down(window, mouse),
            WindowEvent::MouseUp(mouse) => self.on_mouse_up(window, mouse),
            WindowEvent::MouseScroll(scroll) => self.on_scroll(window, scroll),
            WindowEvent::MouseLeave => {
                self.set_hover_path(window, Vec::new(), Point::default());
                Ok(())
            }
            WindowEvent::KeyDown(key) => {
                if key.code == KeyCode::Escape && self.drag_state().is_active() {
                    self.cancel_drag();
                }
                let target = self.focused;
                self.emit(UiEvent::KeyDown { target, key });
                Ok(())
            }
            WindowEvent::KeyUp(key) => {
                let target = self.focused;
                self.emit(UiEvent::KeyUp { target, key });
                Ok(())
            }
            WindowEvent::TextInput(text) => {
                let target = self.focused;
                self.emit(UiEvent::TextInput { target, text });
                Ok(())
            }
            WindowEvent::Resized(size) => {
                self.resize_client(window, size);
                Ok(())
            }
            WindowEvent::CaptureLost => {
                if let Some(capture) = self.capture.filter(|c| c.window == window) {
                    debug!(target: "weft.window", %window, element = %capture.element, "capture lost");
                    // The platform already took it; no backend call.
                    self.capture = None;
                    self.abort_captured_gesture(capture.element);
                }
                Ok(())
            }
            WindowEvent::FocusLost => {
                if let Some(capture) = self.capture.filter(|c| c.window == window) {
                    self.release_mouse_capture();
                    self.abort_captured_gesture(capture.element);
                }
                Ok(())
            }
            WindowEvent::CloseRequested => self.close_window(window),
        }
    }

    fn on_mouse_move(&mut self, window: ElementId, mouse: MouseEvent) -> Result<(), TreeError> {
        let Some(capture) = self.capture else {
            let path = self.hit_path(window, mouse.position);
            self.set_hover_path(window, path, mouse.position);
            return Ok(());
        };
        let screen = self
            .client_to_screen(window, mouse.position)
            .ok_or(TreeError::NotAWindow(window))?;
        match self.kind(capture.element) {
            Some(ElementKind::Split) => {
                if let Some(local) = self.screen_to_client(capture.window, screen) {
                    self.drag_separator(capture.element, local)?;
                }
            }
            Some(ElementKind::TabButton) => self.tab_pointer_move(screen)?,
            _ => {}
        }
        Ok(())
    }

    fn on_mouse_down(&mut self, window: ElementId, mouse: MouseEvent) -> Result<(), TreeError> {
        if self.window_style(window) == Some(WindowStyle::Normal) {
            self.bring_to_front(window)?;
        }
        let path = self.hit_path(window, mouse.position);
        if let Some(&target) = path.iter().rev().find(|&&e| self.is_focusable(e)) {
            self.set_focus(target)?;
        }
        if mouse.button != MouseButton::Primary || self.capture.is_some() {
            return Ok(());
        }
        for &element in path.iter().rev() {
            match self.kind(element) {
                Some(ElementKind::TabButton) => {
                    let screen = self
                        .client_to_screen(window, mouse.position)
                        .ok_or(TreeError::NotAWindow(window))?;
                    return self.press_tab_button(element, screen);
                }
                Some(ElementKind::Split) if self.is_on_separator(element, mouse.position) => {
                    self.begin_separator_drag(element, mouse.position)?;
                    return self.set_mouse_capture(element);
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn on_mouse_up(&mut self, window: ElementId, mouse: MouseEvent) -> Result<(), TreeError> {
        let Some(capture) = self.capture else {
            return Ok(());
        };
        if mouse.button != MouseButton::Primary {
            return Ok(());
        }
        match self.kind(capture.element) {
            Some(ElementKind::Split) => {
                if let Some(local) = self
                    .client_to_screen(window, mouse.position)
                    .and_then(|s| self.screen_to_client(capture.window, s))
                {
                    self.drag_separator(capture.element, local)?;
                }
                self.end_separator_drag(capture.element);
                self.release_mouse_capture();
            }
            Some(ElementKind::TabButton) => {
                let screen = self
                    .client_to_screen(window, mouse.position)
                    .ok_or(TreeError::NotAWindow(window))?;
                self.tab_pointer_up(screen)?;
            }
            _ => {
                self.release_mouse_capture();
            }
        }
        Ok(())
    }

    fn on_scroll(&mut self, window: ElementId, scroll: ScrollEvent) -> Result<(), TreeError> {
        let step = self.config.wheel_scroll_step;
        let path = self.hit_path(window, scroll.position);
        for &element in path.iter().rev() {
            match self.kind(element) {
                Some(ElementKind::Scroll) => {
                    self.scroll_by(element, scroll.delta_x * step, scroll.delta_y * step)?;
                    return Ok(());
                }
                Some(ElementKind::VirtualList) => {
                    let (orientation, offset) = match &self.node(element)?.data {
                        NodeData::VirtualList(list) => (list.orientation, list.offset),
                        _ => continue,
                    };
                    let delta = match orientation {
                        Orientation::Horizontal => scroll.delta_x,
                        Orientation::Vertical => scroll.delta_y,
                    };
                    self.set_list_offset(element, offset + delta * step)?;
                    return Ok(());
                }
                _ => {}
            }
        }
        Ok(())
    }
}
