#![forbid(unsafe_code)]

//! Virtualized lists of uniform items.
//!
//! Only items intersecting the viewport, padded by
//! [`VIRTUAL_LIST_OVERSCAN`] items on each side, exist as elements. Each
//! realized item is a leaf tagged with its index; callers fill it in when
//! they observe its insertion. Items scrolled out of range are detached and
//! handed to deferred disposal during the list's own layout.

use tracing::trace;
use weft_core::{ElementId, Orientation, Rect, Size};
use weft_layout::{VirtualRange, clamp_offset, item_span, visible_range};

use crate::error::TreeError;
use crate::node::{LeafData, NodeData, VirtualListData};
use crate::Ui;
use crate::tree::report_tree_error;

/// Items realized beyond each edge of the viewport.
pub const VIRTUAL_LIST_OVERSCAN: usize = 1;

impl Ui {
    /// An empty list along `orientation` whose items are `item_extent` long.
    pub fn create_virtual_list(&mut self, orientation: Orientation, item_extent: f64) -> ElementId {
        self.insert_node(NodeData::VirtualList(VirtualListData {
            orientation,
            item_count: 0,
            item_extent: item_extent.max(0.0),
            offset: 0.0,
            realized: Default::default(),
        }))
    }

    fn list_data(&self, list: ElementId) -> Result<&VirtualListData, TreeError> {
        match &self.node(list)?.data {
            NodeData::VirtualList(data) => Ok(data),
            _ => Err(TreeError::NotAPanel(list)),
        }
    }

    fn list_data_mut(&mut self, list: ElementId) -> Result<&mut VirtualListData, TreeError> {
        match &mut self.node_mut(list)?.data {
            NodeData::VirtualList(data) => Ok(data),
            _ => Err(TreeError::NotAPanel(list)),
        }
    }

    #[must_use]
    pub fn item_count(&self, list: ElementId) -> Option<usize> {
        self.list_data(list).ok().map(|d| d.item_count)
    }

    pub fn set_item_count(&mut self, list: ElementId, count: usize) -> Result<(), TreeError> {
        let data = self.list_data_mut(list)?;
        if data.item_count == count {
            return Ok(());
        }
        data.item_count = count;
        self.invalidate_desired_size(list);
        self.scheduler.invalidate_children_layout(list);
        Ok(())
    }

    #[must_use]
    pub fn list_offset(&self, list: ElementId) -> Option<f64> {
        self.list_data(list).ok().map(|d| d.offset)
    }

    /// Scroll the list to `offset` along its orientation, clamped to the
    /// content.
    pub fn set_list_offset(&mut self, list: ElementId, offset: f64) -> Result<f64, TreeError> {
        let viewport = self.node(list)?.layout;
        let data = self.list_data_mut(list)?;
        let content = data.item_count as f64 * data.item_extent;
        let clamped = clamp_offset(offset, content, viewport.size().along(data.orientation));
        if clamped != data.offset {
            data.offset = clamped;
            self.scheduler.invalidate_children_layout(list);
            self.invalidate_visual(list);
        }
        Ok(clamped)
    }

    /// Items that should be realized for the current viewport.
    #[must_use]
    pub fn visible_items(&self, list: ElementId) -> Option<VirtualRange> {
        let data = self.list_data(list).ok()?;
        let viewport = self.nodes.get(&list)?.layout.size().along(data.orientation);
        Some(visible_range(
            data.item_count,
            data.item_extent,
            data.offset,
            viewport,
            VIRTUAL_LIST_OVERSCAN,
        ))
    }

    /// Realized items as `(index, element)`, in index order.
    #[must_use]
    pub fn realized_items(&self, list: ElementId) -> Vec<(usize, ElementId)> {
        self.list_data(list)
            .map(|d| d.realized.iter().map(|(&i, &e)| (i, e)).collect())
            .unwrap_or_default()
    }

    /// The item index a realized list item stands for.
    #[must_use]
    pub fn item_index(&self, element: ElementId) -> Option<usize> {
        match &self.nodes.get(&element)?.data {
            NodeData::Leaf(leaf) => leaf.item_index,
            _ => None,
        }
    }

    pub(crate) fn arrange_virtual_list(&mut self, list: ElementId, client: Rect) {
        let Ok(data) = self.list_data(list) else {
            return;
        };
        let o = data.orientation;
        let extent = data.item_extent;
        let count = data.item_count;
        let viewport = client.size().along(o);
        let offset = clamp_offset(data.offset, count as f64 * extent, viewport);
        let range = visible_range(count, extent, offset, viewport, VIRTUAL_LIST_OVERSCAN);

        let stale: Vec<(usize, ElementId)> = data
            .realized
            .iter()
            .filter(|(i, _)| !range.contains(**i))
            .map(|(&i, &e)| (i, e))
            .collect();
        if let Ok(data) = self.list_data_mut(list) {
            data.offset = offset;
            for (index, _) in &stale {
                data.realized.remove(index);
            }
        }
        for (index, item) in stale {
            trace!(target: "weft.tree", %list, index, %item, "item unrealized");
            report_tree_error(self.detach(list, item, false), "unrealize item");
            self.dispose(item);
        }

        for index in range.realized.clone() {
            let Ok(data) = self.list_data(list) else {
                return;
            };
            if data.realized.contains_key(&index) {
                continue;
            }
            let before = data.realized.range(index + 1..).next().map(|(_, &e)| e);
            let item = self.insert_node(NodeData::Leaf(LeafData {
                label: None,
                desired: Size::from_axes(o, extent, 0.0),
                item_index: Some(index),
            }));
            if self.attach(list, item, before, false).is_err() {
                continue;
            }
            if let Ok(data) = self.list_data_mut(list) {
                data.realized.insert(index, item);
            }
            trace!(target: "weft.tree", %list, index, %item, "item realized");
        }

        let cross_start = client.min_along(o.flip());
        let cross_len = client.max_along(o.flip()) - cross_start;
        for (index, item) in self.realized_items(list) {
            let (start, len) = item_span(index, extent);
            let main_start = client.min_along(o) + start - offset;
            self.set_layout_rect(item, Rect::from_spans(o, main_start, len, cross_start, cross_len));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_runtime::{Instant, UiConfig};

    fn list(count: usize) -> (Ui, ElementId) {
        let (mut ui, _, _) = Ui::headless(UiConfig::default());
        let window = ui.create_window(Rect::new(0.0, 0.0, 100.0, 100.0));
        let list = ui.create_virtual_list(Orientation::Vertical, 20.0);
        ui.add_child(window, list).unwrap();
        ui.set_item_count(list, count).unwrap();
        ui.update(Instant::now());
        (ui, list)
    }

    #[test]
    fn realizes_viewport_plus_overscan() {
        let (ui, list) = list(100);
        let indices: Vec<usize> = ui.realized_items(list).iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, (0..6).collect::<Vec<_>>());
        let (_, third) = ui.realized_items(list)[3];
        assert_eq!(ui.item_index(third), Some(3));
        assert_eq!(ui.layout_rect(third), Some(Rect::new(0.0, 60.0, 100.0, 20.0)));
    }

    #[test]
    fn scrolling_recycles_items_through_disposal() {
        let (mut ui, list) = list(100);
        let first = ui.realized_items(list)[0].1;
        assert_eq!(ui.set_list_offset(list, 500.0), Ok(500.0));
        ui.update(Instant::now());
        let indices: Vec<usize> = ui.realized_items(list).iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, (24..31).collect::<Vec<_>>());
        assert!(!ui.is_alive(first));
        assert_eq!(ui.children(list).len(), 7);
        ui.update(Instant::now());
        assert!(!ui.exists(first));
        assert!(ui.validate().is_clean());
    }

    #[test]
    fn offset_is_clamped_to_item_count() {
        let (mut ui, list) = list(10);
        assert_eq!(ui.set_list_offset(list, 1_000.0), Ok(100.0));
        ui.set_item_count(list, 2).unwrap();
        ui.update(Instant::now());
        assert_eq!(ui.list_offset(list), Some(0.0));
        assert_eq!(ui.realized_items(list).len(), 2);
    }
}
