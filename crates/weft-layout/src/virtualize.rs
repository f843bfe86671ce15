#![forbid(unsafe_code)]

//! Visible-range computation for virtualized lists with uniform items.

use std::ops::Range;

/// Items that must be realized for the current viewport.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VirtualRange {
    /// Indices to realize, including overscan.
    pub realized: Range<usize>,
    /// Indices that actually intersect the viewport.
    pub visible: Range<usize>,
}

impl VirtualRange {
    /// Whether `index` should be realized.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.realized.contains(&index)
    }
}

/// Compute which of `count` items of `item_extent` intersect a viewport of
/// length `viewport` scrolled to `offset`, padded by `overscan` items on each
/// side.
#[must_use]
pub fn visible_range(
    count: usize,
    item_extent: f64,
    offset: f64,
    viewport: f64,
    overscan: usize,
) -> VirtualRange {
    if count == 0 || item_extent <= 0.0 || viewport <= 0.0 {
        return VirtualRange::default();
    }
    let offset = offset.max(0.0);
    let first = ((offset / item_extent).floor() as usize).min(count);
    let end = (((offset + viewport) / item_extent).ceil() as usize).min(count);
    let visible = first..end.max(first);
    let realized = first.saturating_sub(overscan)..end.saturating_add(overscan).min(count);
    VirtualRange { realized, visible }
}

/// Start and length of item `index` along the main axis.
#[inline]
#[must_use]
pub fn item_span(index: usize, item_extent: f64) -> (f64, f64) {
    (index as f64 * item_extent, item_extent)
}
