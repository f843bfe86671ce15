#![forbid(unsafe_code)]

//! The destination selector shown over a host while a tab floats above it.

use tracing::trace;
use weft_core::{ElementId, Point, Rect, Visibility};
use weft_layout::{AxisParams, LayoutParams};

use super::DropDestination;
use crate::error::TreeError;
use crate::node::{ElementKind, NodeData};
use crate::Ui;
use crate::tree::report_tree_error;

/// Destination offered at `point` over `area`.
///
/// Each edge owns a band `fraction` of the area deep; inside a band the
/// drop splits towards that edge, anywhere else it combines. Where bands
/// overlap the nearest edge wins, ties going to left, right, top, bottom in
/// that order.
#[must_use]
pub fn destination_at(area: Rect, point: Point, fraction: f64) -> DropDestination {
    if area.width <= 0.0 || area.height <= 0.0 {
        return DropDestination::Combine;
    }
    let fx = (point.x - area.left()) / area.width;
    let fy = (point.y - area.top()) / area.height;
    let edges = [
        (fx, DropDestination::SplitLeft),
        (1.0 - fx, DropDestination::SplitRight),
        (fy, DropDestination::SplitTop),
        (1.0 - fy, DropDestination::SplitBottom),
    ];
    let nearest = edges
        .iter()
        .copied()
        .reduce(|best, edge| if edge.0 < best.0 { edge } else { best });
    match nearest {
        Some((distance, destination)) if distance < fraction => destination,
        _ => DropDestination::Combine,
    }
}

impl Ui {
    /// The selector element, while one is shown.
    #[must_use]
    pub fn destination_selector(&self) -> Option<ElementId> {
        self.tabs.selector
    }

    /// Destination a selector currently highlights.
    #[must_use]
    pub fn selector_destination(&self, selector: ElementId) -> Option<DropDestination> {
        match &self.nodes.get(&selector)?.data {
            NodeData::Selector(data) => data.hovered,
            _ => None,
        }
    }

    /// Cover `area` of `window` with the selector, highlighting
    /// `destination` for `host`.
    pub(crate) fn show_selector(
        &mut self,
        window: ElementId,
        host: ElementId,
        area: Rect,
        destination: DropDestination,
    ) -> Result<(), TreeError> {
        let selector = match self.tabs.selector.filter(|&s| self.is_alive(s)) {
            Some(selector) => selector,
            None => {
                let selector = self.create_element(ElementKind::DestinationSelector);
                self.set_zindex(selector, i32::MAX)?;
                self.set_visibility(selector, Visibility::RENDER | Visibility::LAYOUT)?;
                self.tabs.selector = Some(selector);
                selector
            }
        };
        if let Some(parent) = self.parent(selector)
            && parent != window
        {
            self.detach(parent, selector, true)?;
        }

        let params = LayoutParams {
            horizontal: AxisParams::fixed_at_min(area.width).with_margins(area.left(), 0.0),
            vertical: AxisParams::fixed_at_min(area.height).with_margins(area.top(), 0.0),
        };
        if self.params(selector) != Some(params) {
            self.set_params(selector, params)?;
        }
        if self.parent(selector).is_none() {
            self.attach(window, selector, None, true)?;
        }
        if let NodeData::Selector(data) = &mut self.node_mut(selector)?.data {
            let next = (Some(host), Some(destination));
            if (data.host, data.hovered) == next {
                return Ok(());
            }
            data.host = Some(host);
            data.hovered = Some(destination);
        }
        trace!(target: "weft.tabs", %selector, %host, ?destination, "selector updated");
        self.invalidate_visual(selector);
        Ok(())
    }

    /// Take the selector off screen and dispose it.
    pub(crate) fn hide_selector(&mut self) {
        let Some(selector) = self.tabs.selector.take() else {
            return;
        };
        if let Some(parent) = self.parent(selector) {
            report_tree_error(self.detach(parent, selector, true), "detach selector");
        }
        self.dispose(selector);
    }

    pub(crate) fn teardown_selector(&mut self, selector: ElementId) {
        if self.tabs.selector == Some(selector) {
            self.tabs.selector = None;
        }
    }
}
