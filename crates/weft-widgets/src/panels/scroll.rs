#![forbid(unsafe_code)]

//! Scroll viewports.
//!
//! A scroll panel lays its children out over a content area at least as
//! large as the viewport and shifts them by the scroll offset. The offset is
//! clamped to `[0, content - viewport]` on each axis whenever it is set and
//! again on every layout, so shrinking content never leaves the view past
//! its end.

use weft_core::{ElementId, Point, Rect, Size};
use weft_layout::{clamp_offset, scroll_into_view};

use crate::error::TreeError;
use crate::node::{NodeData, ScrollData};
use crate::Ui;

impl Ui {
    /// An empty scroll viewport at offset zero.
    pub fn create_scroll(&mut self) -> ElementId {
        self.insert_node(NodeData::Scroll(ScrollData {
            offset: Point::default(),
            content: Size::ZERO,
        }))
    }

    fn scroll_data(&self, scroll: ElementId) -> Result<ScrollData, TreeError> {
        match self.node(scroll)?.data {
            NodeData::Scroll(data) => Ok(data),
            _ => Err(TreeError::NotAPanel(scroll)),
        }
    }

    /// Current scroll offset.
    #[must_use]
    pub fn scroll_offset(&self, scroll: ElementId) -> Option<Point> {
        self.scroll_data(scroll).ok().map(|d| d.offset)
    }

    /// Size of the scrolled content as of the last layout.
    #[must_use]
    pub fn scroll_content_size(&self, scroll: ElementId) -> Option<Size> {
        self.scroll_data(scroll).ok().map(|d| d.content)
    }

    /// Content extent: the children's desired size, never smaller than the
    /// viewport.
    fn measure_content(&mut self, scroll: ElementId, viewport: Size) -> Size {
        let desired = self.compute_desired_size(scroll, viewport);
        Size::new(desired.width.max(viewport.width), desired.height.max(viewport.height))
    }

    /// Scroll to `offset`, clamped to the content.
    pub fn scroll_to(&mut self, scroll: ElementId, offset: Point) -> Result<Point, TreeError> {
        let current = self.scroll_data(scroll)?;
        let viewport = self.node(scroll)?.layout.size();
        let content = self.measure_content(scroll, viewport);
        let clamped = Point::new(
            clamp_offset(offset.x, content.width, viewport.width),
            clamp_offset(offset.y, content.height, viewport.height),
        );
        if clamped != current.offset {
            if let NodeData::Scroll(data) = &mut self.node_mut(scroll)?.data {
                data.offset = clamped;
            }
            self.scheduler.invalidate_children_layout(scroll);
            self.invalidate_visual(scroll);
        }
        Ok(clamped)
    }

    /// Scroll by a delta in DIPs.
    pub fn scroll_by(&mut self, scroll: ElementId, dx: f64, dy: f64) -> Result<Point, TreeError> {
        let current = self.scroll_data(scroll)?.offset;
        self.scroll_to(scroll, current.offset(dx, dy))
    }

    /// Scroll the nearest scroll ancestor of `element` just enough to show
    /// it. Returns the scroll panel that moved, if any.
    pub fn scroll_into_view(&mut self, element: ElementId) -> Result<Option<ElementId>, TreeError> {
        let target = self.node(element)?.layout;
        let Some(scroll) = self
            .ancestors(element)
            .into_iter()
            .find(|&a| matches!(self.nodes.get(&a).map(|n| &n.data), Some(NodeData::Scroll(_))))
        else {
            return Ok(None);
        };
        let viewport = self.node(scroll)?.layout;
        let offset = self.scroll_data(scroll)?.offset;
        // Element rectangles are already shifted by the current offset.
        let content_origin = Point::new(viewport.left() - offset.x, viewport.top() - offset.y);
        let start = target.origin() - content_origin;
        let next = Point::new(
            scroll_into_view(offset.x, viewport.width, start.x, start.x + target.width),
            scroll_into_view(offset.y, viewport.height, start.y, start.y + target.height),
        );
        self.scroll_to(scroll, next)?;
        Ok(Some(scroll))
    }

    pub(crate) fn arrange_scroll(&mut self, scroll: ElementId, children: &[ElementId], client: Rect) {
        let viewport = client.size();
        let content = self.measure_content(scroll, viewport);
        let Ok(data) = self.scroll_data(scroll) else {
            return;
        };
        let offset = Point::new(
            clamp_offset(data.offset.x, content.width, viewport.width),
            clamp_offset(data.offset.y, content.height, viewport.height),
        );
        if let Some(NodeData::Scroll(data)) = self.nodes.get_mut(&scroll).map(|n| &mut n.data) {
            data.offset = offset;
            data.content = content;
        }
        let area = Rect::new(
            client.left() - offset.x,
            client.top() - offset.y,
            content.width,
            content.height,
        );
        for &child in children {
            self.layout_child(scroll, child, area);
        }
    }
}
