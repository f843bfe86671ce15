#![forbid(unsafe_code)]

//! Layout primitives and solvers.
//!
//! Everything in this crate is a pure function of its inputs: no element
//! tree, no caches, no clocks. The widget layer feeds resolved layout
//! parameters and measured desired sizes in and gets rectangles out, which
//! keeps every solver idempotent by construction.
//!
//! # Per-axis placement
//!
//! A child is placed on each axis independently from an [`AxisParams`]:
//!
//! | anchors      | result                                                        |
//! |--------------|---------------------------------------------------------------|
//! | min and max  | size centered between the two margins (proportion 1.0 fills)  |
//! | min only     | starts after `margin_min`, the max side takes the rest        |
//! | max only     | ends before `margin_max`, the min side takes the rest         |
//! | neither      | margins act as weights splitting the free space               |

pub mod limit;
pub mod scroll;
pub mod split;
pub mod stack;
pub mod virtualize;

pub use limit::{SizeLimits, clamp_size};
pub use scroll::{clamp_offset, max_offset, scroll_into_view};
pub use split::{
    ChangedSide, POSITION_EPSILON, SplitGeometry, position_from_pointer, propagate_position,
    split_regions,
};
pub use stack::{StackItem, StackMeasure, distribute};
pub use virtualize::{VirtualRange, item_span, visible_range};
pub use weft_core::geometry::{Orientation, Point, Rect, Sides, Size};

/// How an element's extent along one axis is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SizeSpec {
    /// An exact size in DIPs.
    Pixels(f64),
    /// A fraction (0.0 to 1.0) of the space left after anchored margins, or a
    /// weight among siblings inside a stack panel.
    Proportion(f64),
    /// The element's own desired size.
    Automatic,
}

impl SizeSpec {
    /// Whether the size is resolved before proportional space is shared out.
    #[inline]
    #[must_use]
    pub const fn is_fixed(self) -> bool {
        matches!(self, Self::Pixels(_) | Self::Automatic)
    }

    /// Proportion weight, zero for fixed sizes.
    #[inline]
    #[must_use]
    pub fn weight(self) -> f64 {
        match self {
            Self::Proportion(w) => w.max(0.0),
            Self::Pixels(_) | Self::Automatic => 0.0,
        }
    }

    /// Resolve a fixed size; `desired` feeds [`SizeSpec::Automatic`].
    #[inline]
    #[must_use]
    pub fn fixed_extent(self, desired: f64) -> Option<f64> {
        match self {
            Self::Pixels(p) => Some(p.max(0.0)),
            Self::Automatic => Some(desired.max(0.0)),
            Self::Proportion(_) => None,
        }
    }
}

impl Default for SizeSpec {
    fn default() -> Self {
        Self::Proportion(1.0)
    }
}

/// Layout parameters of an element along one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AxisParams {
    /// Margin on the min (left/top) side.
    pub margin_min: f64,
    /// Margin on the max (right/bottom) side.
    pub margin_max: f64,
    /// Size along this axis.
    pub size: SizeSpec,
    /// Whether the min margin is a fixed pixel distance.
    pub anchor_min: bool,
    /// Whether the max margin is a fixed pixel distance.
    pub anchor_max: bool,
}

impl AxisParams {
    /// Fill the whole client span.
    #[must_use]
    pub const fn fill() -> Self {
        Self {
            margin_min: 0.0,
            margin_max: 0.0,
            size: SizeSpec::Proportion(1.0),
            anchor_min: true,
            anchor_max: true,
        }
    }

    /// Fixed pixel size anchored at the min side.
    #[must_use]
    pub const fn fixed_at_min(size: f64) -> Self {
        Self {
            margin_min: 0.0,
            margin_max: 0.0,
            size: SizeSpec::Pixels(size),
            anchor_min: true,
            anchor_max: false,
        }
    }

    /// Desired size anchored at the min side.
    #[must_use]
    pub const fn automatic() -> Self {
        Self {
            margin_min: 0.0,
            margin_max: 0.0,
            size: SizeSpec::Automatic,
            anchor_min: true,
            anchor_max: false,
        }
    }

    /// Replace both margins.
    #[must_use]
    pub const fn with_margins(mut self, min: f64, max: f64) -> Self {
        self.margin_min = min;
        self.margin_max = max;
        self
    }

    /// Replace the anchors.
    #[must_use]
    pub const fn with_anchors(mut self, min: bool, max: bool) -> Self {
        self.anchor_min = min;
        self.anchor_max = max;
        self
    }

    /// Replace the size.
    #[must_use]
    pub const fn with_size(mut self, size: SizeSpec) -> Self {
        self.size = size;
        self
    }

    /// Sum of the margins that are fixed pixel distances.
    #[inline]
    #[must_use]
    pub fn anchored_margins(&self) -> f64 {
        let min = if self.anchor_min { self.margin_min } else { 0.0 };
        let max = if self.anchor_max { self.margin_max } else { 0.0 };
        min + max
    }

    /// Budget handed to the child when measuring it against `available`.
    ///
    /// Pixel and automatic children see everything left after anchored
    /// margins; proportional children see their share of it.
    #[must_use]
    pub fn child_available(&self, available: f64) -> f64 {
        let leftover = (available - self.anchored_margins()).max(0.0);
        match self.size {
            SizeSpec::Pixels(p) => p.max(0.0),
            SizeSpec::Automatic => leftover,
            SizeSpec::Proportion(w) => leftover * w.clamp(0.0, 1.0),
        }
    }

    /// Client extent needed to give this child its desired size.
    #[must_use]
    pub fn span_requirement(&self, desired: f64) -> f64 {
        let margins = self.anchored_margins();
        match self.size {
            SizeSpec::Pixels(p) => margins + p.max(0.0),
            SizeSpec::Automatic => margins + desired.max(0.0),
            SizeSpec::Proportion(w) => {
                let w = w.clamp(0.0, 1.0);
                if w <= POSITION_EPSILON {
                    margins
                } else {
                    margins + desired.max(0.0) / w
                }
            }
        }
    }
}

impl Default for AxisParams {
    fn default() -> Self {
        Self::fill()
    }
}

/// Layout parameters of an element on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutParams {
    pub horizontal: AxisParams,
    pub vertical: AxisParams,
}

impl LayoutParams {
    /// Fill the client area on both axes.
    #[must_use]
    pub const fn fill() -> Self {
        Self {
            horizontal: AxisParams::fill(),
            vertical: AxisParams::fill(),
        }
    }

    /// Fixed pixel size anchored top-left.
    #[must_use]
    pub const fn fixed(width: f64, height: f64) -> Self {
        Self {
            horizontal: AxisParams::fixed_at_min(width),
            vertical: AxisParams::fixed_at_min(height),
        }
    }

    /// Desired size anchored top-left.
    #[must_use]
    pub const fn automatic() -> Self {
        Self {
            horizontal: AxisParams::automatic(),
            vertical: AxisParams::automatic(),
        }
    }

    /// Parameters along `orientation`.
    #[inline]
    #[must_use]
    pub const fn along(&self, orientation: Orientation) -> &AxisParams {
        match orientation {
            Orientation::Horizontal => &self.horizontal,
            Orientation::Vertical => &self.vertical,
        }
    }

    /// Parameters across `orientation`.
    #[inline]
    #[must_use]
    pub const fn across(&self, orientation: Orientation) -> &AxisParams {
        self.along(orientation.flip())
    }

    /// Whether either axis sizes itself from the desired size.
    #[inline]
    #[must_use]
    pub fn depends_on_desired(&self) -> bool {
        matches!(self.horizontal.size, SizeSpec::Automatic)
            || matches!(self.vertical.size, SizeSpec::Automatic)
    }

    /// Budget for measuring the child against `available`.
    #[must_use]
    pub fn child_available(&self, available: Size) -> Size {
        Size::new(
            self.horizontal.child_available(available.width),
            self.vertical.child_available(available.height),
        )
    }

    /// Client size needed to give the child its desired size.
    #[must_use]
    pub fn span_requirement(&self, desired: Size) -> Size {
        Size::new(
            self.horizontal.span_requirement(desired.width),
            self.vertical.span_requirement(desired.height),
        )
    }
}

/// Place a child on one axis inside `[client_min, client_max]`.
///
/// Returns `(start, length)`. The length may exceed the client span for
/// oversized pixel children; clipping is the renderer's job.
#[must_use]
pub fn layout_on_axis(params: &AxisParams, desired: f64, client_min: f64, client_max: f64) -> (f64, f64) {
    let extent = (client_max - client_min).max(0.0);
    let margin_min = if params.anchor_min { params.margin_min } else { 0.0 };
    let margin_max = if params.anchor_max { params.margin_max } else { 0.0 };
    let leftover = (extent - margin_min - margin_max).max(0.0);
    let size = match params.size {
        SizeSpec::Pixels(p) => p.max(0.0),
        SizeSpec::Automatic => desired.max(0.0),
        SizeSpec::Proportion(w) => leftover * w.clamp(0.0, 1.0),
    };

    let start = match (params.anchor_min, params.anchor_max) {
        (true, true) => client_min + margin_min + (leftover - size) * 0.5,
        (true, false) => client_min + margin_min,
        (false, true) => client_max - margin_max - size,
        (false, false) => {
            let free = extent - size;
            let weights = params.margin_min.max(0.0) + params.margin_max.max(0.0);
            if weights > POSITION_EPSILON {
                client_min + free * params.margin_min.max(0.0) / weights
            } else {
                client_min + free * 0.5
            }
        }
    };
    (start, size)
}

/// Map a child into `client` using its parameters and desired size.
#[must_use]
pub fn layout_child(params: &LayoutParams, desired: Size, client: Rect) -> Rect {
    let (x, width) = layout_on_axis(&params.horizontal, desired.width, client.left(), client.right());
    let (y, height) = layout_on_axis(&params.vertical, desired.height, client.top(), client.bottom());
    Rect::new(x, y, width, height)
}

/// Accumulates the desired size of an overlay panel from its children.
///
/// Children of a plain panel overlap, so the panel needs the largest span
/// any single child requires on each axis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OverlayMeasure {
    size: Size,
}

impl OverlayMeasure {
    /// Start an empty measurement.
    #[must_use]
    pub const fn new() -> Self {
        Self { size: Size::ZERO }
    }

    /// Account for one measured child.
    pub fn add(&mut self, params: &LayoutParams, child_desired: Size) {
        let span = params.span_requirement(child_desired);
        self.size.width = self.size.width.max(span.width);
        self.size.height = self.size.height.max(span.height);
    }

    /// The accumulated desired size.
    #[must_use]
    pub const fn finish(self) -> Size {
        self.size
    }
}
