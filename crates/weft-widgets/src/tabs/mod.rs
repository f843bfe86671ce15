#![forbid(unsafe_code)]

//! Tabs, hosts and the tab manager.
//!
//! A host is a vertical stack of two fixed children: a horizontal strip of
//! tab buttons and a contents panel holding the tabs. Every tab is paired
//! with one button, and the two collections always have the same length and
//! order. Exactly one tab of a non-empty host is active; the others stay in
//! the tree with no visibility.
//!
//! Removing a tab from a host records the host as changed. A single cleanup
//! callback per frame then merges empty hosts away (see [`cleanup`]). Drag
//! and drop of tabs between hosts and windows lives in [`drag`].

mod cleanup;
mod drag;
mod manager;
mod selector;

use tracing::debug;
use weft_core::{ElementId, Orientation, Point, Rect, Visibility};
use weft_layout::{AxisParams, LayoutParams};

pub use manager::{DragPhase, DragState, TabManager};
pub use selector::destination_at;

use crate::error::{CollectionError, TreeError};
use crate::invariants::{InvariantCode, InvariantReport};
use crate::node::{ElementFlags, HostData, NodeData, TabButtonData, TabData};
use crate::observer::UiEvent;
use crate::Ui;
use crate::tree::report_tree_error;

/// Height of the tab-button strip.
pub const TAB_BUTTON_HEIGHT: f64 = 24.0;

/// Where a free-floating tab lands when dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropDestination {
    /// A brand-new top-level window.
    NewWindow,
    /// Into the hovered host, next to its tabs.
    Combine,
    /// A new host left of the hovered one.
    SplitLeft,
    /// A new host right of the hovered one.
    SplitRight,
    /// A new host above the hovered one.
    SplitTop,
    /// A new host below the hovered one.
    SplitBottom,
}

impl DropDestination {
    /// Orientation of the split this destination creates.
    #[must_use]
    pub const fn split_orientation(self) -> Option<Orientation> {
        match self {
            Self::SplitLeft | Self::SplitRight => Some(Orientation::Horizontal),
            Self::SplitTop | Self::SplitBottom => Some(Orientation::Vertical),
            Self::NewWindow | Self::Combine => None,
        }
    }

    /// Whether the new host takes the min side of the split.
    #[must_use]
    pub const fn new_host_first(self) -> bool {
        matches!(self, Self::SplitLeft | Self::SplitTop)
    }
}

impl Ui {
    /// A tab with its button, hosted nowhere yet.
    pub fn create_tab(&mut self, label: impl Into<String>) -> ElementId {
        let button = self.insert_node(NodeData::TabButton(TabButtonData {
            tab: None,
            active: false,
        }));
        let tab = self.insert_node(NodeData::Tab(TabData {
            label: label.into(),
            button,
            host: None,
        }));
        if let Some(node) = self.nodes.get_mut(&button) {
            if let NodeData::TabButton(data) = &mut node.data {
                data.tab = Some(tab);
            }
            node.params = LayoutParams {
                horizontal: AxisParams::automatic(),
                vertical: AxisParams::fill(),
            };
        }
        if let Some(node) = self.nodes.get_mut(&tab) {
            node.flags.insert(ElementFlags::FOCUS_SCOPE);
        }
        // Both were just created.
        report_tree_error(self.set_logical_parent(button, Some(tab)), "link tab button");
        tab
    }

    /// An empty host: a button strip above a contents panel.
    pub fn create_host(&mut self) -> ElementId {
        let strip = self.create_stack(Orientation::Horizontal);
        let contents = self.create_panel();
        let host = self.insert_node(NodeData::Host(HostData {
            strip,
            contents,
            active: None,
        }));
        if let Some(node) = self.nodes.get_mut(&strip) {
            node.params = LayoutParams {
                horizontal: AxisParams::fill(),
                vertical: AxisParams::fixed_at_min(TAB_BUTTON_HEIGHT),
            };
        }
        // Fresh elements cannot fail these preconditions.
        report_tree_error(self.attach(host, strip, None, true), "attach tab strip");
        report_tree_error(self.attach(host, contents, None, true), "attach tab contents");
        host
    }

    /// A normal window at `bounds` holding one empty host.
    pub fn create_window_with_host(&mut self, bounds: Rect) -> (ElementId, ElementId) {
        let window = self.create_window(bounds);
        let host = self.create_host();
        report_tree_error(self.attach(window, host, None, true), "attach window host");
        (window, host)
    }

    pub(crate) fn host_data(&self, host: ElementId) -> Result<HostData, TreeError> {
        self.node(host)?.host().copied().ok_or(TreeError::NotAHost(host))
    }

    fn host_data_mut(&mut self, host: ElementId) -> Result<&mut HostData, TreeError> {
        match &mut self.node_mut(host)?.data {
            NodeData::Host(data) => Ok(data),
            _ => Err(TreeError::NotAHost(host)),
        }
    }

    pub(crate) fn tab_data(&self, tab: ElementId) -> Result<&TabData, TreeError> {
        self.node(tab)?.tab().ok_or(TreeError::NotATab(tab))
    }

    fn tab_data_mut(&mut self, tab: ElementId) -> Result<&mut TabData, TreeError> {
        match &mut self.node_mut(tab)?.data {
            NodeData::Tab(data) => Ok(data),
            _ => Err(TreeError::NotATab(tab)),
        }
    }

    /// Tabs of `host` in order.
    #[must_use]
    pub fn tabs(&self, host: ElementId) -> Vec<ElementId> {
        self.host_data(host)
            .map(|h| self.children(h.contents).to_vec())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn active_tab(&self, host: ElementId) -> Option<ElementId> {
        self.host_data(host).ok().and_then(|h| h.active)
    }

    #[must_use]
    pub fn tab_button(&self, tab: ElementId) -> Option<ElementId> {
        self.tab_data(tab).ok().map(|t| t.button)
    }

    /// The tab a button belongs to.
    #[must_use]
    pub fn button_tab(&self, button: ElementId) -> Option<ElementId> {
        match &self.nodes.get(&button)?.data {
            NodeData::TabButton(data) => data.tab,
            _ => None,
        }
    }

    #[must_use]
    pub fn tab_host(&self, tab: ElementId) -> Option<ElementId> {
        self.tab_data(tab).ok().and_then(|t| t.host)
    }

    /// The strip of tab buttons of `host`.
    #[must_use]
    pub fn tab_strip(&self, host: ElementId) -> Option<ElementId> {
        self.host_data(host).ok().map(|h| h.strip)
    }

    /// The panel holding the tabs of `host`.
    #[must_use]
    pub fn tab_contents(&self, host: ElementId) -> Option<ElementId> {
        self.host_data(host).ok().map(|h| h.contents)
    }

    pub fn set_tab_label(&mut self, tab: ElementId, label: impl Into<String>) -> Result<(), TreeError> {
        let data = self.tab_data_mut(tab)?;
        data.label = label.into();
        let button = data.button;
        self.invalidate_desired_size(button);
        self.invalidate_visual(button);
        Ok(())
    }

    /// Append `tab` to `host`.
    pub fn add_tab(&mut self, host: ElementId, tab: ElementId) -> Result<(), TreeError> {
        self.insert_tab_before(host, tab, None)
    }

    /// Insert `tab` into `host` before `before` (`None` appends). The first
    /// tab of an empty host becomes active; any other arrives hidden.
    pub fn insert_tab_before(
        &mut self,
        host: ElementId,
        tab: ElementId,
        before: Option<ElementId>,
    ) -> Result<(), TreeError> {
        let host_data = self.host_data(host)?;
        let tab_data = self.tab_data(tab)?;
        if let Some(current) = tab_data.host {
            return Err(TreeError::TabAlreadyHosted { tab, host: current });
        }
        let button = tab_data.button;
        let before_button = match before {
            None => None,
            Some(anchor) => {
                if self.tab_host(anchor) != Some(host) {
                    return Err(TreeError::TabNotInHost {
                        tab: anchor,
                        host: Some(host),
                    });
                }
                self.tab_button(anchor)
            }
        };
        if let Some(parent) = self.parent(button) {
            return Err(CollectionError::AlreadyParented {
                element: button,
                parent,
            }
            .into());
        }

        if let Some(parent) = self.parent(tab) {
            return Err(CollectionError::AlreadyParented { element: tab, parent }.into());
        }

        let shown = self.node(tab)?.visibility;
        if host_data.active.is_some() {
            self.set_visibility(tab, Visibility::NONE)?;
        }
        if let Err(err) = self.attach(host_data.contents, tab, before, true) {
            self.set_visibility(tab, shown)?;
            return Err(err);
        }
        if let Err(err) = self.attach(host_data.strip, button, before_button, true) {
            self.detach(host_data.contents, tab, true)?;
            self.set_visibility(tab, shown)?;
            return Err(err);
        }
        self.tab_data_mut(tab)?.host = Some(host);
        debug!(target: "weft.tabs", %host, %tab, "tab added");
        if host_data.active.is_none() {
            self.set_active_tab(host, Some(tab));
        }
        Ok(())
    }

    /// Take `tab` (and its button) out of its host. If it was active, the tab
    /// now at its index becomes active, or the previous one if it was last.
    pub fn remove_tab(&mut self, tab: ElementId) -> Result<(), TreeError> {
        let tab_data = self.tab_data(tab)?;
        let button = tab_data.button;
        let host = tab_data.host.ok_or(TreeError::TabNotInHost { tab, host: None })?;
        let host_data = self.host_data(host)?;
        let index = self.detach(host_data.contents, tab, true)?;
        self.detach(host_data.strip, button, true)?;
        self.tab_data_mut(tab)?.host = None;
        self.set_button_active(button, false);
        self.set_visibility(tab, Visibility::FULL)?;
        debug!(target: "weft.tabs", %host, %tab, index, "tab removed");

        if host_data.active == Some(tab) {
            let remaining = self.children(host_data.contents);
            let next = remaining
                .get(index)
                .or_else(|| index.checked_sub(1).and_then(|i| remaining.get(i)))
                .copied();
            self.set_active_tab(host, next);
        }
        self.mark_host_changed(host);
        Ok(())
    }

    /// Reorder `tab` before `before` (`None` moves it last) within its host.
    pub fn move_tab_before(&mut self, tab: ElementId, before: Option<ElementId>) -> Result<(), TreeError> {
        let host = self
            .tab_host(tab)
            .ok_or(TreeError::TabNotInHost { tab, host: None })?;
        let host_data = self.host_data(host)?;
        let before_button = match before {
            None => None,
            Some(anchor) if self.tab_host(anchor) == Some(host) => self.tab_button(anchor),
            Some(anchor) => {
                return Err(TreeError::TabNotInHost {
                    tab: anchor,
                    host: Some(host),
                });
            }
        };
        let button = self.tab_data(tab)?.button;
        self.move_child_before(host_data.contents, tab, before)?;
        self.move_child_before(host_data.strip, button, before_button)?;
        Ok(())
    }

    /// Show `tab` in its host and restore the focus it remembered.
    pub fn activate_tab(&mut self, tab: ElementId) -> Result<(), TreeError> {
        let host = self
            .tab_data(tab)?
            .host
            .ok_or(TreeError::TabNotInHost { tab, host: None })?;
        self.set_active_tab(host, Some(tab));
        Ok(())
    }

    fn set_active_tab(&mut self, host: ElementId, next: Option<ElementId>) {
        let Ok(host_data) = self.host_data_mut(host) else {
            return;
        };
        let previous = host_data.active;
        if previous == next {
            return;
        }
        host_data.active = next;
        if let Some(previous) = previous
            && let Ok(data) = self.tab_data(previous)
        {
            let button = data.button;
            if data.host == Some(host) {
                report_tree_error(self.set_visibility(previous, Visibility::NONE), "hide previous tab");
            }
            self.set_button_active(button, false);
        }
        if let Some(next) = next
            && let Ok(data) = self.tab_data(next)
        {
            let button = data.button;
            report_tree_error(self.set_visibility(next, Visibility::FULL), "show active tab");
            self.set_button_active(button, true);
        }
        debug!(target: "weft.tabs", %host, ?previous, ?next, "active tab changed");
        self.emit(UiEvent::ActiveTabChanged {
            host,
            previous,
            current: next,
        });
        if let Some(next) = next {
            self.restore_scope_focus(next);
        }
    }

    fn set_button_active(&mut self, button: ElementId, active: bool) {
        if let Some(NodeData::TabButton(data)) = self.nodes.get_mut(&button).map(|n| &mut n.data)
            && data.active != active
        {
            data.active = active;
            self.invalidate_visual(button);
        }
    }

    /// Remove `tab` from its host and dispose it with its button.
    pub fn close_tab(&mut self, tab: ElementId) -> Result<(), TreeError> {
        if self.tab_data(tab)?.host.is_some() {
            self.remove_tab(tab)?;
        }
        self.dispose(tab);
        Ok(())
    }

    /// Move `tab` into a new window whose client area starts at `screen`.
    pub fn move_tab_to_new_window(&mut self, tab: ElementId, screen: Point) -> Result<ElementId, TreeError> {
        let data = self.tab_data(tab)?;
        let button = data.button;
        if data.host.is_some() {
            self.remove_tab(tab)?;
        }
        if let Some(parent) = self.parent(button) {
            self.detach(parent, button, true)?;
        }
        let bounds = Rect::new(
            screen.x,
            screen.y,
            self.config.new_window_width,
            self.config.new_window_height,
        );
        let (window, host) = self.create_window_with_host(bounds);
        self.add_tab(host, tab)?;
        debug!(target: "weft.tabs", %tab, %window, "tab moved to new window");
        Ok(window)
    }

    /// Place `tab` next to `host` according to `destination`. Split
    /// destinations replace `host` in its parent with a split holding
    /// `host` and a new host for the tab. Returns the host that received
    /// the tab.
    pub fn split_host(
        &mut self,
        host: ElementId,
        tab: ElementId,
        destination: DropDestination,
    ) -> Result<ElementId, TreeError> {
        self.host_data(host)?;
        if self.tab_host(tab).is_some() {
            self.remove_tab(tab)?;
        }
        let Some(orientation) = destination.split_orientation() else {
            if destination == DropDestination::NewWindow {
                let origin = self
                    .screen_rect(host)
                    .map(|r| r.origin())
                    .unwrap_or_default();
                let window = self.move_tab_to_new_window(tab, origin)?;
                return self.children(window).first().copied().ok_or(TreeError::NotAHost(window));
            }
            self.add_tab(host, tab)?;
            self.activate_tab(tab)?;
            return Ok(host);
        };
        let parent = self.parent(host).ok_or(TreeError::Detached(host))?;
        let split = self.create_managed_split(orientation);
        let params = self.node(host)?.params;
        self.set_params(split, params)?;
        self.replace_child(parent, host, split)?;
        self.set_params(host, LayoutParams::fill())?;
        let new_host = self.create_host();
        let (first, second) = if destination.new_host_first() {
            (new_host, host)
        } else {
            (host, new_host)
        };
        self.add_child(split, first)?;
        self.add_child(split, second)?;
        self.add_tab(new_host, tab)?;
        debug!(target: "weft.tabs", %host, %new_host, %split, ?destination, "host split");
        Ok(new_host)
    }

    pub(crate) fn validate_host(&self, host: ElementId, report: &mut InvariantReport) {
        let Ok(data) = self.host_data(host) else {
            return;
        };
        let tabs = self.children(data.contents);
        let buttons = self.children(data.strip);
        if tabs.len() != buttons.len() {
            report.error(
                InvariantCode::HostCardinality,
                host,
                None,
                format!("host {host} has {} tabs but {} buttons", tabs.len(), buttons.len()),
            );
        }
        for (index, (&tab, &button)) in tabs.iter().zip(buttons).enumerate() {
            if self.tab_button(tab) != Some(button) {
                report.error(
                    InvariantCode::HostOrder,
                    host,
                    Some(tab),
                    format!("host {host} shows {button} at {index} for tab {tab}"),
                );
            }
        }
        let active_ok = match data.active {
            None => tabs.is_empty(),
            Some(active) => tabs.contains(&active),
        };
        if !active_ok {
            report.error(
                InvariantCode::ActiveTab,
                host,
                data.active,
                format!("host {host} has {} tabs and active tab {:?}", tabs.len(), data.active),
            );
        }
    }

    pub(crate) fn teardown_tab(&mut self, tab: ElementId) {
        let Ok(data) = self.tab_data(tab) else {
            return;
        };
        let button = data.button;
        if data.host.is_some() {
            report_tree_error(self.remove_tab(tab), "unhost disposed tab");
        }
        self.dispose(button);
    }

    pub(crate) fn teardown_host(&mut self, host: ElementId) {
        self.forget_drop_target(host);
        self.tabs.changed_hosts.remove(&host);
        for tab in self.tabs(host) {
            if let Ok(data) = self.tab_data_mut(tab) {
                data.host = None;
            }
        }
    }
}
