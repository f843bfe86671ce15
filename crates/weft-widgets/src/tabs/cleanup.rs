#![forbid(unsafe_code)]

//! Merging empty hosts away.
//!
//! Hosts that lose a tab are collected during a frame and examined once, by
//! a callback posted to the scheduler's task pass. An empty host inside a
//! managed split is replaced by its sibling, which inherits the split's
//! slot and layout parameters; an empty host that is the last content of a
//! window closes the window.

use tracing::{debug, trace};
use weft_core::ElementId;

use crate::node::ElementKind;
use crate::tree::report_tree_error;
use crate::Ui;

impl Ui {
    /// Record that `host` lost a tab and make sure a cleanup runs this frame.
    pub(crate) fn mark_host_changed(&mut self, host: ElementId) {
        self.tabs.changed_hosts.insert(host);
        if !self.tabs.cleanup_posted {
            self.tabs.cleanup_posted = true;
            self.scheduler.post(|ui: &mut Ui| {
                ui.run_host_cleanup();
            });
        }
    }

    /// Collapse every changed host that is now empty. Returns how many
    /// hosts were removed.
    pub fn run_host_cleanup(&mut self) -> usize {
        self.tabs.cleanup_posted = false;
        let changed = std::mem::take(&mut self.tabs.changed_hosts);
        let mut removed = 0;
        for host in changed {
            if self.is_alive(host) && self.tabs(host).is_empty() {
                removed += self.collapse(host);
            }
        }
        if removed > 0 {
            debug!(target: "weft.tabs", removed, "empty hosts collapsed");
        }
        removed
    }

    /// Remove the empty `element` (a host or a split left with nothing to
    /// show) from its parent. Returns the number of hosts removed.
    fn collapse(&mut self, element: ElementId) -> usize {
        let hosts = usize::from(self.kind(element) == Some(ElementKind::Host));
        let Some(parent) = self.parent(element) else {
            self.dispose(element);
            return hosts;
        };
        trace!(target: "weft.tabs", %element, %parent, "collapsing");
        match self.kind(parent) {
            Some(ElementKind::Split) => {
                let sibling = self.children(parent).iter().copied().find(|&c| c != element);
                match sibling {
                    Some(sibling) => hosts + self.replace_split_with(parent, element, sibling),
                    None => {
                        report_tree_error(self.detach(parent, element, true), "collapse in split");
                        self.dispose(element);
                        hosts + self.collapse(parent)
                    }
                }
            }
            Some(ElementKind::Window) => {
                let others = self.children(parent).iter().any(|&c| {
                    c != element
                        && matches!(self.kind(c), Some(ElementKind::Host | ElementKind::Split))
                });
                if others {
                    report_tree_error(self.detach(parent, element, true), "collapse in window");
                    self.dispose(element);
                } else {
                    report_tree_error(self.close_window(parent), "close emptied window");
                }
                hosts
            }
            // Hosts placed inside arbitrary panels are the application's.
            _ => 0,
        }
    }

    /// Replace `split` with `sibling`, dropping `empty`.
    ///
    /// # Panics
    ///
    /// Panics if a managed split holds something other than hosts and
    /// splits.
    fn replace_split_with(&mut self, split: ElementId, empty: ElementId, sibling: ElementId) -> usize {
        let sibling_kind = self.kind(sibling);
        assert!(
            !self.is_managed_split(split)
                || matches!(sibling_kind, Some(ElementKind::Host | ElementKind::Split)),
            "managed split {split} holds {sibling} ({sibling_kind:?}) which is neither a host nor a split"
        );
        let params = self.params(split);
        report_tree_error(self.detach(split, empty, true), "detach emptied host");
        report_tree_error(self.detach(split, sibling, true), "detach surviving sibling");
        if let Some(grand) = self.parent(split) {
            report_tree_error(self.replace_child(grand, split, sibling), "promote surviving sibling");
        }
        if let Some(params) = params {
            report_tree_error(self.set_params(sibling, params), "carry split parameters");
        }
        self.dispose(empty);
        self.dispose(split);
        let hosts = usize::from(self.kind(empty) == Some(ElementKind::Host));
        if sibling_kind == Some(ElementKind::Host) && self.tabs(sibling).is_empty() {
            hosts + self.collapse(sibling)
        } else {
            hosts
        }
    }
}
