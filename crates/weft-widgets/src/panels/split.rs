#![forbid(unsafe_code)]

//! Split panels and separator propagation.
//!
//! A split panel holds at most two children, `child1` in the min region and
//! `child2` in the max region, around a separator whose position is a
//! normalized share of the non-separator space.
//!
//! Moving a separator resizes one side of each child. Nested splits of the
//! same orientation re-derive their own position so that their separators
//! stay put in absolute pixels; this recurses through any depth of nesting.
//! A nested split squeezed to nothing saturates instead of dividing by zero.

use tracing::debug;
use weft_core::{ElementId, Orientation, Point, Rect};
use weft_layout::split::{POSITION_EPSILON, SplitGeometry};
use weft_layout::{ChangedSide, position_from_pointer, propagate_position, split_regions};

use crate::error::TreeError;
use crate::node::{NodeData, SplitData};
use crate::Ui;

impl Ui {
    /// A split along `orientation` with the separator centred.
    pub fn create_split(&mut self, orientation: Orientation) -> ElementId {
        let separator_size = self.config.separator_size;
        self.insert_node(NodeData::Split(SplitData {
            orientation,
            position: 0.5,
            separator_size,
            managed: false,
            grab: None,
        }))
    }

    /// A split owned by the tab manager, whose children must be hosts or
    /// splits.
    pub(crate) fn create_managed_split(&mut self, orientation: Orientation) -> ElementId {
        let split = self.create_split(orientation);
        if let Some(NodeData::Split(data)) = self.nodes.get_mut(&split).map(|n| &mut n.data) {
            data.managed = true;
        }
        split
    }

    fn split_data(&self, split: ElementId) -> Result<SplitData, TreeError> {
        match self.node(split)?.data {
            NodeData::Split(data) => Ok(data),
            _ => Err(TreeError::NotAPanel(split)),
        }
    }

    fn split_data_mut(&mut self, split: ElementId) -> Result<&mut SplitData, TreeError> {
        match &mut self.node_mut(split)?.data {
            NodeData::Split(data) => Ok(data),
            _ => Err(TreeError::NotAPanel(split)),
        }
    }

    #[must_use]
    pub fn separator_position(&self, split: ElementId) -> Option<f64> {
        self.split_data(split).ok().map(|d| d.position)
    }

    #[must_use]
    pub fn split_orientation(&self, split: ElementId) -> Option<Orientation> {
        self.split_data(split).ok().map(|d| d.orientation)
    }

    /// Whether the tab manager created this split.
    #[must_use]
    pub fn is_managed_split(&self, split: ElementId) -> bool {
        self.split_data(split).is_ok_and(|d| d.managed)
    }

    /// Change the separator thickness.
    pub fn set_separator_size(&mut self, split: ElementId, size: f64) -> Result<(), TreeError> {
        let data = self.split_data_mut(split)?;
        data.separator_size = size.max(0.0);
        self.invalidate_desired_size(split);
        self.scheduler.invalidate_children_layout(split);
        Ok(())
    }

    /// Regions of `split` as of its current layout rectangle.
    #[must_use]
    pub fn split_geometry(&self, split: ElementId) -> Option<SplitGeometry> {
        let data = self.split_data(split).ok()?;
        let rect = self.nodes.get(&split)?.layout;
        Some(split_regions(rect, data.orientation, data.position, data.separator_size))
    }

    /// The min-side region.
    #[must_use]
    pub fn region1(&self, split: ElementId) -> Option<Rect> {
        self.split_geometry(split).map(|g| g.region1)
    }

    /// The max-side region.
    #[must_use]
    pub fn region2(&self, split: ElementId) -> Option<Rect> {
        self.split_geometry(split).map(|g| g.region2)
    }

    /// Move the separator to `position` (clamped to `[0, 1]`), keeping the
    /// absolute separators of nested same-orientation splits in place.
    pub fn set_separator_position(&mut self, split: ElementId, position: f64) -> Result<(), TreeError> {
        let data = self.split_data(split)?;
        let position = if position.is_nan() { data.position } else { position.clamp(0.0, 1.0) };
        if (position - data.position).abs() <= f64::EPSILON {
            return Ok(());
        }
        let rect = self.node(split)?.layout;
        let before = split_regions(rect, data.orientation, data.position, data.separator_size);
        let after = split_regions(rect, data.orientation, position, data.separator_size);
        self.split_data_mut(split)?.position = position;
        debug!(target: "weft.tree", %split, from = data.position, to = position, "separator moved");

        self.propagate_into_children(split, data.orientation, &before, &after);
        self.scheduler.invalidate_children_layout(split);
        self.invalidate_visual(split);
        Ok(())
    }

    fn propagate_into_children(
        &mut self,
        split: ElementId,
        orientation: Orientation,
        before: &SplitGeometry,
        after: &SplitGeometry,
    ) {
        let children = self.children(split).to_vec();
        let regions = [(before.region1, after.region1), (before.region2, after.region2)];
        for (child, (old_region, new_region)) in children.into_iter().zip(regions) {
            self.propagate_into(child, orientation, old_region, new_region);
        }
    }

    /// Re-derive the position of `element` (if it is a split along
    /// `orientation`) after its region changed from `old_region` to
    /// `new_region`, then recurse into its children.
    fn propagate_into(&mut self, element: ElementId, orientation: Orientation, old_region: Rect, new_region: Rect) {
        let Ok(data) = self.split_data(element) else {
            return;
        };
        if data.orientation != orientation {
            return;
        }
        let Some(params) = self.params(element) else {
            return;
        };
        let old_desired = self.compute_desired_size(element, params.child_available(old_region.size()));
        let old_rect = weft_layout::layout_child(&params, old_desired, old_region);
        let new_desired = self.compute_desired_size(element, params.child_available(new_region.size()));
        let new_rect = weft_layout::layout_child(&params, new_desired, new_region);

        let old_start = old_rect.min_along(orientation);
        let new_start = new_rect.min_along(orientation);
        let old_extent = old_rect.max_along(orientation) - old_start;
        let new_extent = new_rect.max_along(orientation) - new_start;
        let start_moved = (new_start - old_start).abs() > POSITION_EPSILON;
        let end_moved = (new_rect.max_along(orientation) - old_rect.max_along(orientation)).abs()
            > POSITION_EPSILON;
        if !start_moved && !end_moved {
            return;
        }
        let side = if start_moved { ChangedSide::Min } else { ChangedSide::Max };
        let position = propagate_position(
            data.position,
            old_extent,
            new_extent,
            data.separator_size,
            side,
        );

        let before = split_regions(old_rect, orientation, data.position, data.separator_size);
        let after = split_regions(new_rect, orientation, position, data.separator_size);
        if let Ok(nested) = self.split_data_mut(element) {
            nested.position = position;
        }
        self.propagate_into_children(element, orientation, &before, &after);
        self.scheduler.invalidate_children_layout(element);
    }

    // ---------------------------------------------------------------------
    // Separator dragging
    // ---------------------------------------------------------------------

    /// Whether `point` (client coordinates) lies on the separator of `split`.
    #[must_use]
    pub fn is_on_separator(&self, split: ElementId, point: Point) -> bool {
        self.split_geometry(split)
            .is_some_and(|g| g.separator.contains(point))
    }

    /// Start dragging the separator from `point`. The caller owns capture.
    pub(crate) fn begin_separator_drag(&mut self, split: ElementId, point: Point) -> Result<(), TreeError> {
        let geometry = self.split_geometry(split).ok_or(TreeError::NotAPanel(split))?;
        let data = self.split_data_mut(split)?;
        let o = data.orientation;
        data.grab = Some(point.along(o) - geometry.separator.min_along(o));
        Ok(())
    }

    /// Follow the pointer while a separator drag is active. Returns whether
    /// a drag was active.
    pub(crate) fn drag_separator(&mut self, split: ElementId, point: Point) -> Result<bool, TreeError> {
        let data = self.split_data(split)?;
        let Some(grab) = data.grab else {
            return Ok(false);
        };
        let rect = self.node(split)?.layout;
        let position = position_from_pointer(
            rect,
            data.orientation,
            data.separator_size,
            point.along(data.orientation),
            grab,
        );
        self.set_separator_position(split, position)?;
        Ok(true)
    }

    /// Stop a separator drag. Returns whether one was active.
    pub(crate) fn end_separator_drag(&mut self, split: ElementId) -> bool {
        self.split_data_mut(split)
            .map(|d| d.grab.take().is_some())
            .unwrap_or(false)
    }
}
