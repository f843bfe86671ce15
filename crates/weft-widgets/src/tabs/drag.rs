#![forbid(unsafe_code)]

//! The tab drag state machine.
//!
//! ```text
//!            press + threshold          leaves strip (+ margin)
//!   Idle ─────────────────────▶ InHost ───────────────────────▶ Free
//!    ▲                            │  ▲                            │
//!    │         release            │  └──── enters a host strip ───┤
//!    ├────────────────────────────┘                               │
//!    └──────────────── release: new window / combine / split ─────┘
//! ```
//!
//! While in a host, moving the pointer along the strip reorders the tab.
//! Leaving the strip removes the tab from its host and shows its button in
//! a ghost window that follows the pointer. Over another host's strip the
//! tab is re-attached; over a host's contents a destination selector offers
//! combining or splitting. All pointer positions are screen coordinates.

use tracing::{debug, warn};
use weft_core::{ElementId, Orientation, Point, Rect, Sides, Size};

use super::manager::PendingPress;
use super::{DragState, DropDestination, TAB_BUTTON_HEIGHT, destination_at};
use crate::backend::WindowStyle;
use crate::error::TreeError;
use crate::node::ElementKind;
use crate::observer::UiEvent;
use crate::Ui;
use crate::tree::report_tree_error;

impl Ui {
    fn set_drag_state(&mut self, state: DragState) {
        let previous = std::mem::replace(&mut self.tabs.drag, state).phase();
        let phase = state.phase();
        if previous != phase {
            debug!(target: "weft.tabs", from = ?previous, to = ?phase, tab = ?state.tab(), "drag state changed");
            self.emit(UiEvent::DragStateChanged { phase });
        }
    }

    /// A primary press on a tab button: activate its tab and wait for the
    /// pointer to travel past the drag threshold.
    pub(crate) fn press_tab_button(&mut self, button: ElementId, screen: Point) -> Result<(), TreeError> {
        let tab = self.button_tab(button).ok_or(TreeError::NotATab(button))?;
        if self.tab_host(tab).is_some() {
            self.activate_tab(tab)?;
        }
        self.set_mouse_capture(button)?;
        self.tabs.pending_press = Some(PendingPress { tab, start: screen });
        Ok(())
    }

    pub(crate) fn tab_pointer_move(&mut self, screen: Point) -> Result<(), TreeError> {
        if let Some(press) = self.tabs.pending_press {
            if screen.distance(press.start) < self.config.drag_threshold {
                return Ok(());
            }
            self.start_drag(press.tab, press.start)?;
        }
        self.drag_to(screen)
    }

    pub(crate) fn tab_pointer_up(&mut self, screen: Point) -> Result<(), TreeError> {
        if self.tabs.pending_press.take().is_some() {
            self.release_mouse_capture();
            return Ok(());
        }
        if self.tabs.drag.is_active() {
            self.drop_tab(screen)
        } else {
            self.release_mouse_capture();
            Ok(())
        }
    }

    /// Start dragging `tab` with the pointer at `screen`. A hosted tab
    /// starts reordering in its strip; an unhosted one floats immediately.
    ///
    /// # Panics
    ///
    /// Panics if a drag is already in progress.
    pub fn start_drag(&mut self, tab: ElementId, screen: Point) -> Result<(), TreeError> {
        assert!(
            !self.tabs.drag.is_active(),
            "start_drag({tab}): a tab drag is already in progress"
        );
        let data = self.tab_data(tab)?;
        let button = data.button;
        let host = data.host;
        self.tabs.pending_press = None;
        let grab = self
            .screen_rect(button)
            .map(|r| screen - r.origin())
            .unwrap_or_default();
        match host {
            Some(host) => {
                if self.capture.is_none() {
                    self.set_mouse_capture(button)?;
                }
                self.set_drag_state(DragState::InHost { tab, host, grab });
                Ok(())
            }
            None => {
                if self.mouse_capture() == Some(button) {
                    self.release_mouse_capture();
                }
                if let Some(parent) = self.parent(button) {
                    self.detach(parent, button, true)?;
                }
                self.float_tab(tab, screen, grab)
            }
        }
    }

    /// Follow the pointer with the current drag.
    pub fn drag_to(&mut self, screen: Point) -> Result<(), TreeError> {
        match self.tabs.drag {
            DragState::Idle => Ok(()),
            DragState::InHost { tab, host, grab } => self.drag_in_host(tab, host, grab, screen),
            DragState::Free { .. } => self.drag_free(screen),
        }
    }

    /// Show the unhosted `tab`'s button in a ghost window under the pointer.
    fn float_tab(&mut self, tab: ElementId, screen: Point, grab: Point) -> Result<(), TreeError> {
        let button = self.tab_data(tab)?.button;
        let laid_out = self.layout_rect(button).unwrap_or_default();
        let size = if laid_out.is_empty() {
            let desired = self.compute_desired_size(button, laid_out.size());
            Size::new(desired.width, desired.height.max(TAB_BUTTON_HEIGHT))
        } else {
            laid_out.size()
        };
        let bounds = Rect::new(screen.x - grab.x, screen.y - grab.y, size.width, size.height);
        let ghost = self.create_window_styled(WindowStyle::Ghost, bounds);
        self.attach(ghost, button, None, true)?;
        if self.capture.is_none() {
            self.set_mouse_capture(button)?;
        }
        debug!(target: "weft.tabs", %tab, %ghost, "tab floating");
        self.set_drag_state(DragState::Free {
            tab,
            ghost,
            grab,
            destination: None,
            last_screen: screen,
        });
        Ok(())
    }

    fn drag_in_host(&mut self, tab: ElementId, host: ElementId, grab: Point, screen: Point) -> Result<(), TreeError> {
        let strip = self.host_data(host)?.strip;
        let button = self.tab_data(tab)?.button;
        let margin = self.config.strip_detach_margin;
        let inside = self
            .screen_rect(strip)
            .is_some_and(|r| r.outer(Sides::all(margin)).contains(screen));
        if !inside {
            debug!(target: "weft.tabs", %tab, %host, "tab left its strip");
            if self.mouse_capture() == Some(button) {
                self.release_mouse_capture();
            }
            self.remove_tab(tab)?;
            self.float_tab(tab, screen, grab)?;
            return self.drag_free(screen);
        }

        let window = self.window_of(strip).ok_or(TreeError::Detached(strip))?;
        let local = self
            .screen_to_client(window, screen)
            .ok_or(TreeError::NotAWindow(window))?;
        let before = self.strip_insertion_point(strip, button, local.along(Orientation::Horizontal));
        let tabs = self.tabs(host);
        let current = tabs
            .iter()
            .position(|&t| t == tab)
            .and_then(|i| tabs.get(i + 1))
            .copied();
        if before != current {
            self.move_tab_before(tab, before)?;
        }
        Ok(())
    }

    /// The tab whose button centre lies right of `x`, ignoring `own`.
    fn strip_insertion_point(&self, strip: ElementId, own: ElementId, x: f64) -> Option<ElementId> {
        self.children(strip)
            .iter()
            .copied()
            .filter(|&b| b != own)
            .find(|&b| self.layout_rect(b).is_some_and(|r| x < r.center().x))
            .and_then(|b| self.button_tab(b))
    }

    /// The frontmost normal window under `screen`, and the point in its
    /// client coordinates. Overlapping windows resolve to the first in
    /// front-to-back order.
    fn window_at(&self, screen: Point) -> Option<(ElementId, Point)> {
        self.tabs
            .windows
            .iter()
            .copied()
            .filter(|&w| self.is_alive(w))
            .find(|&w| self.screen_bounds(w).is_some_and(|b| b.contains(screen)))
            .and_then(|w| Some((w, self.screen_to_client(w, screen)?)))
    }

    fn drag_free(&mut self, screen: Point) -> Result<(), TreeError> {
        let DragState::Free { tab, ghost, grab, .. } = self.tabs.drag else {
            return Ok(());
        };
        if let DragState::Free { last_screen, .. } = &mut self.tabs.drag {
            *last_screen = screen;
        }
        if let Some(bounds) = self.screen_bounds(ghost) {
            let moved = Rect::new(screen.x - grab.x, screen.y - grab.y, bounds.width, bounds.height);
            self.set_window_bounds(ghost, moved)?;
        }

        let Some((window, local)) = self.window_at(screen) else {
            self.set_destination(None);
            return Ok(());
        };
        let path = self.hit_path_where(window, local, |n| n.kind() != ElementKind::DestinationSelector);
        let Some(host) = path
            .iter()
            .rev()
            .copied()
            .find(|&e| self.kind(e) == Some(ElementKind::Host))
        else {
            self.set_destination(None);
            return Ok(());
        };
        let data = self.host_data(host)?;
        if path.contains(&data.strip) {
            return self.reattach(tab, ghost, host, grab, local);
        }
        if path.contains(&data.contents) {
            let area = self.layout_rect(data.contents).unwrap_or_default();
            let destination = destination_at(area, local, self.config.selector_edge_fraction);
            self.show_selector(window, host, area, destination)?;
            self.set_destination(Some((host, destination)));
        } else {
            self.set_destination(None);
        }
        Ok(())
    }

    /// Put a floating tab back into a strip and resume reordering there.
    fn reattach(
        &mut self,
        tab: ElementId,
        ghost: ElementId,
        host: ElementId,
        grab: Point,
        local: Point,
    ) -> Result<(), TreeError> {
        self.set_destination(None);
        let button = self.tab_data(tab)?.button;
        if self.mouse_capture() == Some(button) {
            self.release_mouse_capture();
        }
        if let Some(parent) = self.parent(button) {
            self.detach(parent, button, true)?;
        }
        let strip = self.host_data(host)?.strip;
        let before = self.strip_insertion_point(strip, button, local.x);
        self.insert_tab_before(host, tab, before)?;
        self.activate_tab(tab)?;
        self.close_window(ghost)?;
        self.set_mouse_capture(button)?;
        debug!(target: "weft.tabs", %tab, %host, "tab reattached");
        self.set_drag_state(DragState::InHost { tab, host, grab });
        Ok(())
    }

    fn set_destination(&mut self, next: Option<(ElementId, DropDestination)>) {
        let DragState::Free { destination, .. } = &mut self.tabs.drag else {
            return;
        };
        if *destination == next {
            return;
        }
        *destination = next;
        if next.is_none() {
            self.hide_selector();
        }
        self.emit(UiEvent::DestinationChanged {
            host: next.map(|(host, _)| host),
            destination: next.map(|(_, d)| d),
        });
    }

    /// Release the drag at `screen`, resolving the drop.
    pub fn drop_tab(&mut self, screen: Point) -> Result<(), TreeError> {
        match self.tabs.drag {
            DragState::Idle => Ok(()),
            DragState::InHost { tab, .. } => {
                if self.tab_button(tab).is_some_and(|b| self.mouse_capture() == Some(b)) {
                    self.release_mouse_capture();
                }
                self.set_drag_state(DragState::Idle);
                Ok(())
            }
            DragState::Free { .. } => {
                self.drag_free(screen)?;
                match self.tabs.drag {
                    DragState::Free {
                        tab,
                        ghost,
                        grab,
                        destination,
                        ..
                    } => self.finish_free_drop(tab, ghost, destination, screen - grab),
                    // The last move re-attached the tab to a strip.
                    _ => self.drop_tab(screen),
                }
            }
        }
    }

    fn finish_free_drop(
        &mut self,
        tab: ElementId,
        ghost: ElementId,
        destination: Option<(ElementId, DropDestination)>,
        origin: Point,
    ) -> Result<(), TreeError> {
        let button = self.tab_data(tab)?.button;
        if self.mouse_capture() == Some(button) {
            self.release_mouse_capture();
        }
        self.hide_selector();
        self.set_drag_state(DragState::Idle);
        if let Some(parent) = self.parent(button) {
            self.detach(parent, button, true)?;
        }
        if self.is_window_open(ghost) {
            self.close_window(ghost)?;
        }
        let destination = destination.filter(|&(host, _)| self.is_alive(host));
        debug!(target: "weft.tabs", %tab, ?destination, "tab dropped");
        match destination {
            None | Some((_, DropDestination::NewWindow)) => {
                self.move_tab_to_new_window(tab, origin)?;
            }
            Some((host, DropDestination::Combine)) => {
                self.add_tab(host, tab)?;
                self.activate_tab(tab)?;
            }
            Some((host, split)) => {
                self.split_host(host, tab, split)?;
            }
        }
        Ok(())
    }

    /// Abandon the current drag. A floating tab lands in a new window at
    /// its last position. Returns whether a drag was in progress.
    pub fn cancel_drag(&mut self) -> bool {
        self.tabs.pending_press = None;
        match self.tabs.drag {
            DragState::Idle => false,
            DragState::InHost { tab, .. } => {
                if self.tab_button(tab).is_some_and(|b| self.mouse_capture() == Some(b)) {
                    self.release_mouse_capture();
                }
                self.set_drag_state(DragState::Idle);
                true
            }
            DragState::Free {
                tab,
                ghost,
                grab,
                last_screen,
                ..
            } => {
                if let Err(err) = self.finish_free_drop(tab, ghost, None, last_screen - grab) {
                    warn!(target: "weft.tabs", %tab, %err, "cancelled drag could not place its tab");
                    self.set_drag_state(DragState::Idle);
                }
                true
            }
        }
    }

    /// A host is going away; stop offering it as a drop target.
    pub(crate) fn forget_drop_target(&mut self, host: ElementId) {
        if let DragState::Free {
            destination: Some((target, _)),
            ..
        } = self.tabs.drag
            && target == host
        {
            warn!(target: "weft.tabs", %host, "drop target disposed mid-drag, destination reset");
            self.set_destination(None);
        }
    }

    /// An element is going away; end any drag it takes part in. A ghost
    /// window torn down mid-drag gives its tab a new window instead.
    pub(crate) fn forget_drag_subject(&mut self, element: ElementId) {
        if self.tabs.pending_press.is_some_and(|p| p.tab == element) {
            self.tabs.pending_press = None;
        }
        match self.tabs.drag {
            DragState::InHost { tab, host, .. } if element == tab || element == host => {
                if self.tab_button(tab).is_some_and(|b| self.mouse_capture() == Some(b)) {
                    self.release_mouse_capture();
                }
                self.set_drag_state(DragState::Idle);
            }
            DragState::Free { ghost, .. } if element == ghost => {
                self.cancel_drag();
            }
            DragState::Free { tab, ghost, .. } if element == tab => {
                self.hide_selector();
                self.set_drag_state(DragState::Idle);
                if self.is_window_open(ghost) {
                    report_tree_error(self.close_window(ghost), "close ghost");
                }
            }
            DragState::Free { .. } => self.forget_drop_target(element),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tabs::DragPhase;
    use weft_core::WindowEvent;
    use weft_runtime::{Instant, UiConfig};

    /// A window at the screen origin with one host holding `n` tabs, laid
    /// out.
    fn setup(n: usize) -> (Ui, ElementId, ElementId, Vec<ElementId>) {
        let (mut ui, _, _) = Ui::headless(UiConfig::default());
        let (window, host) = ui.create_window_with_host(Rect::new(0.0, 0.0, 400.0, 300.0));
        let tabs = (0..n)
            .map(|i| {
                let tab = ui.create_tab(format!("tab{i}"));
                ui.add_tab(host, tab).unwrap();
                tab
            })
            .collect();
        ui.update(Instant::now());
        (ui, window, host, tabs)
    }

    fn centre(ui: &Ui, element: ElementId) -> Point {
        ui.screen_rect(element).unwrap().center()
    }

    #[test]
    fn in_host_drag_reorders() {
        let (mut ui, _, host, tabs) = setup(3);
        let first = centre(&ui, ui.tab_button(tabs[0]).unwrap());
        let last = ui.screen_rect(ui.tab_button(tabs[2]).unwrap()).unwrap();
        ui.start_drag(tabs[0], first).unwrap();
        assert_eq!(ui.drag_state().phase(), DragPhase::InHost);
        ui.drag_to(Point::new(last.right() - 1.0, first.y)).unwrap();
        assert_eq!(ui.tabs(host), vec![tabs[1], tabs[2], tabs[0]]);
        ui.drop_tab(Point::new(last.right() - 1.0, first.y)).unwrap();
        assert_eq!(ui.drag_state(), &DragState::Idle);
        assert_eq!(ui.mouse_capture(), None);
        assert!(ui.validate().is_clean());
    }

    #[test]
    #[should_panic(expected = "already in progress")]
    fn second_drag_panics() {
        let (mut ui, _, _, tabs) = setup(2);
        let at = centre(&ui, ui.tab_button(tabs[0]).unwrap());
        ui.start_drag(tabs[0], at).unwrap();
        let _ = ui.start_drag(tabs[1], at);
    }

    #[test]
    fn leaving_the_strip_floats_the_tab() {
        let (mut ui, _, host, tabs) = setup(2);
        let at = centre(&ui, ui.tab_button(tabs[1]).unwrap());
        ui.start_drag(tabs[1], at).unwrap();
        ui.drag_to(Point::new(at.x, 250.0)).unwrap();
        let DragState::Free { tab, ghost, .. } = *ui.drag_state() else {
            panic!("expected a free drag, got {:?}", ui.drag_state());
        };
        assert_eq!(tab, tabs[1]);
        assert_eq!(ui.tabs(host), vec![tabs[0]]);
        assert_eq!(ui.window_style(ghost), Some(WindowStyle::Ghost));
        assert_eq!(ui.parent(ui.tab_button(tabs[1]).unwrap()), Some(ghost));
        assert_eq!(ui.mouse_capture(), ui.tab_button(tabs[1]));
        assert!(!ui.windows().contains(&ghost));
    }

    #[test]
    fn hovering_contents_offers_destinations() {
        let (mut ui, _, host, tabs) = setup(2);
        let at = centre(&ui, ui.tab_button(tabs[1]).unwrap());
        ui.start_drag(tabs[1], at).unwrap();
        ui.drag_to(Point::new(200.0, 160.0)).unwrap();
        assert_eq!(ui.drag_destination(), Some((host, DropDestination::Combine)));
        ui.drag_to(Point::new(395.0, 160.0)).unwrap();
        assert_eq!(ui.drag_destination(), Some((host, DropDestination::SplitRight)));
        let selector = ui.destination_selector().unwrap();
        assert_eq!(ui.selector_destination(selector), Some(DropDestination::SplitRight));

        ui.drop_tab(Point::new(395.0, 160.0)).unwrap();
        let split = ui.parent(host).unwrap();
        assert_eq!(ui.kind(split), Some(ElementKind::Split));
        let new_host = ui.children(split)[1];
        assert_eq!(ui.tabs(new_host), vec![tabs[1]]);
        assert_eq!(ui.parent(selector), None);
        ui.update(Instant::now());
        assert!(ui.validate().is_clean());
    }

    #[test]
    fn returning_to_a_strip_reattaches() {
        let (mut ui, window, host, tabs) = setup(2);
        let at = centre(&ui, ui.tab_button(tabs[1]).unwrap());
        ui.start_drag(tabs[1], at).unwrap();
        ui.drag_to(Point::new(at.x, 250.0)).unwrap();
        assert_eq!(ui.drag_state().phase(), DragPhase::Free);
        ui.drag_to(Point::new(390.0, 10.0)).unwrap();
        assert_eq!(ui.drag_state().phase(), DragPhase::InHost);
        assert_eq!(ui.tabs(host), vec![tabs[0], tabs[1]]);
        assert_eq!(ui.active_tab(host), Some(tabs[1]));
        assert_eq!(ui.window_of(ui.mouse_capture().unwrap()), Some(window));
    }

    #[test]
    fn cancelling_a_free_drag_opens_a_window() {
        let (mut ui, window, _, tabs) = setup(2);
        let at = centre(&ui, ui.tab_button(tabs[1]).unwrap());
        ui.start_drag(tabs[1], at).unwrap();
        ui.drag_to(Point::new(900.0, 900.0)).unwrap();
        assert!(ui.cancel_drag());
        assert_eq!(ui.drag_state(), &DragState::Idle);
        assert_eq!(ui.windows().len(), 2);
        let fresh = ui.windows()[0];
        assert_ne!(fresh, window);
        assert_eq!(ui.window_of(tabs[1]), Some(fresh));
    }

    #[test]
    fn closing_the_ghost_parks_the_tab_at_once() {
        let (mut ui, _, host, tabs) = setup(2);
        let at = centre(&ui, ui.tab_button(tabs[1]).unwrap());
        ui.start_drag(tabs[1], at).unwrap();
        ui.drag_to(Point::new(at.x, 250.0)).unwrap();
        let DragState::Free { ghost, .. } = *ui.drag_state() else {
            panic!("expected a free drag, got {:?}", ui.drag_state());
        };

        ui.dispatch_event(ghost, WindowEvent::CloseRequested).unwrap();
        assert_eq!(ui.drag_state(), &DragState::Idle);
        assert_eq!(ui.mouse_capture(), None);
        let parked = ui.tab_host(tabs[1]).unwrap();
        assert_ne!(parked, host);
        assert!(ui.window_of(parked).is_some_and(|w| ui.is_window_open(w)));

        ui.update(Instant::now());
        assert!(!ui.exists(ghost));
        assert!(ui.validate().is_clean());
    }
}
