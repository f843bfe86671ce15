#![forbid(unsafe_code)]

//! Desired-size computation, child layout and hit testing.
//!
//! Every element kind measures and arranges through the same two entry
//! points: [`Ui::compute_desired_size`] and the scheduler-driven children
//! layout. The per-kind algorithms live in `weft-layout`; this module walks
//! the tree, feeds those solvers, and writes the resulting rectangles back.
//!
//! A changed rectangle queues a post-layout notification for the child and
//! marks its visuals stale. When the notification is delivered a panel lays
//! out its own children, so a change propagates breadth-first within the same
//! layout pass.

use tracing::trace;
use weft_core::{ElementId, Orientation, Point, Rect, Size};
use weft_layout::{
    LayoutParams, OverlayMeasure, SizeLimits, StackItem, StackMeasure, clamp_size, distribute,
    layout_on_axis, split_regions,
};

use crate::node::{ElementKind, Node, NodeData};
use crate::tabs::TAB_BUTTON_HEIGHT;
use crate::Ui;

/// Horizontal space a tab button reserves per label character.
const TAB_BUTTON_CHAR_WIDTH: f64 = 7.0;
/// Horizontal padding around a tab button label.
const TAB_BUTTON_PADDING: f64 = 24.0;

/// What measuring one node needs, copied out of the arena.
enum Measure {
    Fixed(Size),
    Overlay,
    Stack(Orientation),
    Split {
        orientation: Orientation,
        position: f64,
        separator_size: f64,
    },
    Limiter(SizeLimits),
    Virtual {
        orientation: Orientation,
        main: f64,
        item_extent: f64,
    },
}

impl Ui {
    // ---------------------------------------------------------------------
    // Measuring
    // ---------------------------------------------------------------------

    /// Desired size of `element` given `available` space.
    ///
    /// Results are cached per element for the last `available` they were
    /// computed against; the cache is dropped by
    /// [`Ui::invalidate_desired_size`] whenever anything that feeds it
    /// changes, so repeated calls with the same budget return the same size.
    pub fn compute_desired_size(&mut self, element: ElementId, available: Size) -> Size {
        let Some(node) = self.nodes.get(&element) else {
            return Size::ZERO;
        };
        if let Some((cached_for, desired)) = node.desired
            && cached_for == available
        {
            return desired;
        }
        let desired = self.measure(element, available);
        if let Some(node) = self.nodes.get_mut(&element) {
            node.desired = Some((available, desired));
        }
        desired
    }

    fn measure(&mut self, element: ElementId, available: Size) -> Size {
        let Some(node) = self.nodes.get(&element) else {
            return Size::ZERO;
        };
        let children = node.children().to_vec();
        let plan = match &node.data {
            NodeData::Leaf(leaf) => Measure::Fixed(leaf.desired),
            NodeData::TabButton(button) => {
                let chars = button
                    .tab
                    .and_then(|tab| self.label(tab))
                    .map_or(0, |label| label.chars().count());
                Measure::Fixed(Size::new(
                    chars as f64 * TAB_BUTTON_CHAR_WIDTH + TAB_BUTTON_PADDING,
                    TAB_BUTTON_HEIGHT,
                ))
            }
            NodeData::Selector(_) => Measure::Fixed(Size::ZERO),
            NodeData::Panel | NodeData::Tab(_) | NodeData::Window(_) | NodeData::Scroll(_) => {
                Measure::Overlay
            }
            NodeData::Stack(orientation) => Measure::Stack(*orientation),
            NodeData::Host(_) => Measure::Stack(Orientation::Vertical),
            NodeData::Split(split) => Measure::Split {
                orientation: split.orientation,
                position: split.position,
                separator_size: split.separator_size,
            },
            NodeData::Limiter(limits) => Measure::Limiter(*limits),
            NodeData::VirtualList(list) => Measure::Virtual {
                orientation: list.orientation,
                main: list.item_count as f64 * list.item_extent,
                item_extent: list.item_extent,
            },
        };

        match plan {
            Measure::Fixed(size) => size,
            Measure::Overlay => self.measure_overlay(&children, available),
            Measure::Stack(o) => self.measure_stack(&children, o, available),
            Measure::Split {
                orientation: o,
                position,
                separator_size,
            } => {
                let geometry = split_regions(Rect::from_size(available), o, position, separator_size);
                let mut main = geometry.separator.size().along(o);
                let mut cross: f64 = 0.0;
                for (&child, region) in children.iter().zip([geometry.region1, geometry.region2]) {
                    let Some(params) = self.layout_params_if_visible(child) else {
                        continue;
                    };
                    let desired =
                        self.compute_desired_size(child, params.child_available(region.size()));
                    let span = params.span_requirement(desired);
                    main += span.along(o);
                    cross = cross.max(span.across(o));
                }
                Size::from_axes(o, main, cross)
            }
            Measure::Limiter(limits) => {
                let inner = self.measure_overlay(&children, limits.clamp_available(available));
                clamp_size(inner, &limits)
            }
            Measure::Virtual {
                orientation: o,
                main,
                item_extent,
            } => {
                let budget = Size::from_axes(o, item_extent, available.across(o));
                let mut cross: f64 = 0.0;
                for child in children {
                    if self.layout_params_if_visible(child).is_some() {
                        cross = cross.max(self.compute_desired_size(child, budget).across(o));
                    }
                }
                Size::from_axes(o, main, cross)
            }
        }
    }

    fn layout_params_if_visible(&self, element: ElementId) -> Option<LayoutParams> {
        self.nodes
            .get(&element)
            .filter(|n| n.visibility.is_layout())
            .map(|n| n.params)
    }

    fn measure_overlay(&mut self, children: &[ElementId], available: Size) -> Size {
        let mut measure = OverlayMeasure::new();
        for &child in children {
            let Some(params) = self.layout_params_if_visible(child) else {
                continue;
            };
            let desired = self.compute_desired_size(child, params.child_available(available));
            measure.add(&params, desired);
        }
        measure.finish()
    }

    fn measure_stack(&mut self, children: &[ElementId], o: Orientation, available: Size) -> Size {
        let visible: Vec<(ElementId, LayoutParams)> = children
            .iter()
            .filter_map(|&c| self.layout_params_if_visible(c).map(|p| (c, p)))
            .collect();
        let total_weight: f64 = visible
            .iter()
            .filter(|(_, p)| !p.along(o).size.is_fixed())
            .map(|(_, p)| p.along(o).size.weight())
            .sum();
        let mut measure = StackMeasure::new(o, available, total_weight);
        for (child, params) in visible.iter().filter(|(_, p)| p.along(o).size.is_fixed()) {
            let desired = self.compute_desired_size(*child, measure.fixed_budget(params));
            measure.add_fixed(params, desired);
        }
        for (child, params) in visible.iter().filter(|(_, p)| !p.along(o).size.is_fixed()) {
            let desired = self.compute_desired_size(*child, measure.proportional_budget(params));
            measure.add_proportional(params, desired);
        }
        measure.finish()
    }

    // ---------------------------------------------------------------------
    // Arranging
    // ---------------------------------------------------------------------

    /// Map `child` into `client` from its parameters and desired size, and
    /// store the result as its layout rectangle.
    ///
    /// # Panics
    ///
    /// Panics if `child` is not a current child of `panel`; laying out a
    /// foreign element means the tree is corrupted.
    pub fn layout_child(&mut self, panel: ElementId, child: ElementId, client: Rect) -> Rect {
        let owned = self
            .nodes
            .get(&panel)
            .and_then(|n| n.collection.as_ref())
            .is_some_and(|c| c.contains(child));
        assert!(owned, "layout_child: {child} is not a child of {panel}");
        let Some(params) = self.nodes.get(&child).map(|n| n.params) else {
            return Rect::default();
        };
        let desired = self.compute_desired_size(child, params.child_available(client.size()));
        let rect = weft_layout::layout_child(&params, desired, client);
        self.set_layout_rect(child, rect);
        rect
    }

    /// Store `rect` as the layout of `element`. Returns whether it changed.
    pub(crate) fn set_layout_rect(&mut self, element: ElementId, rect: Rect) -> bool {
        let Some(node) = self.nodes.get_mut(&element) else {
            return false;
        };
        if node.layout == rect {
            return false;
        }
        node.layout = rect;
        self.scheduler.notify_layout_changed(element);
        self.scheduler.invalidate_visual(element);
        true
    }

    /// Lay out the children of `panel` inside its current rectangle.
    pub(crate) fn arrange_children(&mut self, panel: ElementId) {
        let Some(node) = self.nodes.get(&panel) else {
            return;
        };
        if !node.kind().is_panel() {
            return;
        }
        let client = node.layout;
        let children: Vec<ElementId> = node
            .children()
            .iter()
            .copied()
            .filter(|&c| self.nodes.get(&c).is_some_and(|n| n.visibility.is_layout()))
            .collect();
        trace!(target: "weft.tree", %panel, children = children.len(), "arranging children");

        match node.kind() {
            ElementKind::Panel | ElementKind::Tab | ElementKind::Window => {
                for child in children {
                    self.layout_child(panel, child, client);
                }
            }
            ElementKind::Stack => {
                let o = match node.data {
                    NodeData::Stack(o) => o,
                    _ => Orientation::Horizontal,
                };
                self.arrange_stack(panel, &children, o, client);
            }
            ElementKind::Host => self.arrange_stack(panel, &children, Orientation::Vertical, client),
            ElementKind::Limiter => {
                let limits = match node.data {
                    NodeData::Limiter(limits) => limits,
                    _ => return,
                };
                let size = clamp_size(client.size(), &limits);
                let limited = Rect::new(client.left(), client.top(), size.width, size.height);
                for child in children {
                    self.layout_child(panel, child, limited);
                }
            }
            ElementKind::Scroll => self.arrange_scroll(panel, &children, client),
            ElementKind::Split => {
                let split = match &node.data {
                    NodeData::Split(split) => *split,
                    _ => return,
                };
                let geometry =
                    split_regions(client, split.orientation, split.position, split.separator_size);
                // Slots are positional, so hidden children keep their region.
                let slots = node.children().to_vec();
                for (child, region) in slots.into_iter().zip([geometry.region1, geometry.region2]) {
                    if children.contains(&child) {
                        self.layout_child(panel, child, region);
                    }
                }
            }
            ElementKind::VirtualList => self.arrange_virtual_list(panel, client),
            ElementKind::Leaf | ElementKind::TabButton | ElementKind::DestinationSelector => {}
        }
    }

    fn arrange_stack(&mut self, panel: ElementId, children: &[ElementId], o: Orientation, client: Rect) {
        let mut entries = Vec::with_capacity(children.len());
        for &child in children {
            let Some(params) = self.nodes.get(&child).map(|n| n.params) else {
                continue;
            };
            let desired = self.compute_desired_size(child, params.child_available(client.size()));
            entries.push((child, params, desired));
        }
        let items: Vec<StackItem> = entries
            .iter()
            .map(|(_, params, desired)| StackItem::from_params(params, o, *desired))
            .collect();
        let start = client.min_along(o);
        let spans = distribute(&items, start, client.max_along(o) - start);
        let cross_min = client.min_along(o.flip());
        let cross_max = client.max_along(o.flip());
        for ((child, params, desired), (main_start, main_len)) in entries.into_iter().zip(spans) {
            let (cross_start, cross_len) =
                layout_on_axis(params.across(o), desired.across(o), cross_min, cross_max);
            let rect = Rect::from_spans(o, main_start, main_len, cross_start, cross_len);
            assert!(
                self.children(panel).contains(&child),
                "arrange_stack: {child} is not a child of {panel}"
            );
            self.set_layout_rect(child, rect);
        }
    }

    // ---------------------------------------------------------------------
    // Hit testing
    // ---------------------------------------------------------------------

    /// Topmost interact-visible child of `panel` containing `point`.
    #[must_use]
    pub fn hit_test(&self, panel: ElementId, point: Point) -> Option<ElementId> {
        self.hit_test_where(panel, point, |_| true)
    }

    pub(crate) fn hit_test_where(
        &self,
        panel: ElementId,
        point: Point,
        accept: impl Fn(&Node) -> bool,
    ) -> Option<ElementId> {
        let node = self.nodes.get(&panel)?;
        node.z_order().iter().rev().copied().find(|child| {
            self.nodes.get(child).is_some_and(|n| {
                n.visibility.is_interact()
                    && n.layout.contains(point)
                    && !self.scheduler.is_marked_for_disposal(*child)
                    && accept(n)
            })
        })
    }

    /// The chain of elements under `point`, from `root` down to the deepest
    /// hit.
    #[must_use]
    pub fn hit_path(&self, root: ElementId, point: Point) -> Vec<ElementId> {
        self.hit_path_where(root, point, |_| true)
    }

    pub(crate) fn hit_path_where(
        &self,
        root: ElementId,
        point: Point,
        accept: impl Fn(&Node) -> bool + Copy,
    ) -> Vec<ElementId> {
        if !self.nodes.contains_key(&root) {
            return Vec::new();
        }
        let mut path = vec![root];
        let mut current = root;
        while let Some(child) = self.hit_test_where(current, point, accept) {
            path.push(child);
            current = child;
        }
        path
    }
}
