#![forbid(unsafe_code)]

//! Session-wide tab manager state.

use std::collections::BTreeSet;

use weft_core::{ElementId, Point};

use super::DropDestination;
use crate::node::NodeData;
use crate::Ui;

/// Coarse phase of the drag state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DragPhase {
    #[default]
    Idle,
    /// The tab button moves within its own strip, reordering.
    InHost,
    /// The tab floats in a ghost window.
    Free,
}

/// State of the tab drag state machine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    InHost {
        tab: ElementId,
        host: ElementId,
        /// Pointer offset into the button.
        grab: Point,
    },
    Free {
        tab: ElementId,
        ghost: ElementId,
        grab: Point,
        destination: Option<(ElementId, DropDestination)>,
        /// Last pointer position, screen coordinates.
        last_screen: Point,
    },
}

impl DragState {
    #[must_use]
    pub const fn phase(&self) -> DragPhase {
        match self {
            Self::Idle => DragPhase::Idle,
            Self::InHost { .. } => DragPhase::InHost,
            Self::Free { .. } => DragPhase::Free,
        }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// The tab being dragged.
    #[must_use]
    pub const fn tab(&self) -> Option<ElementId> {
        match self {
            Self::Idle => None,
            Self::InHost { tab, .. } | Self::Free { tab, .. } => Some(*tab),
        }
    }
}

/// A pressed tab button that has not moved far enough to drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PendingPress {
    pub tab: ElementId,
    pub start: Point,
}

/// Windows, the active drag and pending host cleanup of one session.
#[derive(Debug, Default)]
pub struct TabManager {
    /// Normal windows, front first.
    pub(crate) windows: Vec<ElementId>,
    pub(crate) drag: DragState,
    pub(crate) pending_press: Option<PendingPress>,
    pub(crate) selector: Option<ElementId>,
    pub(crate) changed_hosts: BTreeSet<ElementId>,
    pub(crate) cleanup_posted: bool,
}

impl TabManager {
    /// Normal windows, front first.
    #[must_use]
    pub fn windows(&self) -> &[ElementId] {
        &self.windows
    }

    #[must_use]
    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    /// Hosts emptied since the last cleanup.
    #[must_use]
    pub fn changed_hosts(&self) -> usize {
        self.changed_hosts.len()
    }
}

impl Ui {
    #[must_use]
    pub fn tab_manager(&self) -> &TabManager {
        &self.tabs
    }

    /// Normal windows, front first.
    #[must_use]
    pub fn windows(&self) -> &[ElementId] {
        self.tabs.windows()
    }

    /// Every host in every normal window, windows front first and hosts in
    /// depth-first child order.
    #[must_use]
    pub fn hosts(&self) -> Vec<ElementId> {
        let mut hosts = Vec::new();
        for &window in &self.tabs.windows {
            let mut stack = vec![window];
            while let Some(element) = stack.pop() {
                let Some(node) = self.nodes.get(&element) else {
                    continue;
                };
                if let NodeData::Host(_) = node.data {
                    hosts.push(element);
                    continue;
                }
                stack.extend(node.children().iter().rev());
            }
        }
        hosts
    }

    #[must_use]
    pub fn drag_state(&self) -> &DragState {
        &self.tabs.drag
    }

    /// Host and destination a free-floating tab would drop on.
    #[must_use]
    pub fn drag_destination(&self) -> Option<(ElementId, DropDestination)> {
        match self.tabs.drag {
            DragState::Free { destination, .. } => destination,
            _ => None,
        }
    }
}
