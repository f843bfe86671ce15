#![forbid(unsafe_code)]

//! Split panel geometry and separator propagation.
//!
//! A split panel divides its client span into `region1 | separator | region2`
//! along its orientation. The separator position `p` is the normalized share
//! of the non-separator space given to `region1`:
//!
//! ```text
//! avail   = extent - separator
//! region1 = avail * p
//! region2 = avail * (1 - p)
//! ```
//!
//! # Propagation
//!
//! When an ancestor split of the same orientation moves its separator, a
//! nested split's region changes on exactly one side. To keep the nested
//! separator at the same absolute pixel position the nested ratio is
//! re-derived from the extent before (`A`) and after (`A'`) the change:
//!
//! ```text
//! max side moved:  p' = p * A / A'
//! min side moved:  p' = 1 - (1 - p) * A / A'
//! ```
//!
//! When `A'` degenerates (the nested region was squeezed to nothing) the
//! ratio saturates toward the side that moved instead of dividing by zero.

use crate::{Orientation, Rect};

/// Tolerance below which spans are treated as degenerate.
pub const POSITION_EPSILON: f64 = 1e-6;

/// Computed regions of a split panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitGeometry {
    pub region1: Rect,
    pub separator: Rect,
    pub region2: Rect,
}

/// Divide `client` according to `position`.
#[must_use]
pub fn split_regions(
    client: Rect,
    orientation: Orientation,
    position: f64,
    separator_size: f64,
) -> SplitGeometry {
    let position = position.clamp(0.0, 1.0);
    let start = client.min_along(orientation);
    let extent = client.max_along(orientation) - start;
    let separator_size = separator_size.max(0.0).min(extent.max(0.0));
    let avail = (extent - separator_size).max(0.0);
    let len1 = avail * position;
    let len2 = avail - len1;
    let cross_start = client.min_along(orientation.flip());
    let cross_len = client.max_along(orientation.flip()) - cross_start;

    SplitGeometry {
        region1: Rect::from_spans(orientation, start, len1, cross_start, cross_len),
        separator: Rect::from_spans(orientation, start + len1, separator_size, cross_start, cross_len),
        region2: Rect::from_spans(
            orientation,
            start + len1 + separator_size,
            len2,
            cross_start,
            cross_len,
        ),
    }
}

/// Separator position that puts the separator's min edge at
/// `pointer - grab_offset`.
#[must_use]
pub fn position_from_pointer(
    client: Rect,
    orientation: Orientation,
    separator_size: f64,
    pointer: f64,
    grab_offset: f64,
) -> f64 {
    let start = client.min_along(orientation);
    let extent = client.max_along(orientation) - start;
    let avail = extent - separator_size.max(0.0);
    if avail <= POSITION_EPSILON {
        return 0.5;
    }
    ((pointer - grab_offset - start) / avail).clamp(0.0, 1.0)
}

/// Which side of a nested split's region moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangedSide {
    /// The min (left/top) boundary moved; the nested split is `child2` of
    /// the panel whose separator moved.
    Min,
    /// The max (right/bottom) boundary moved; the nested split is `child1`.
    Max,
}

/// Re-derive a nested split's position so its separator keeps its absolute
/// pixel position after its extent changed from `old_extent` to
/// `new_extent`.
#[must_use]
pub fn propagate_position(
    position: f64,
    old_extent: f64,
    new_extent: f64,
    separator_size: f64,
    side: ChangedSide,
) -> f64 {
    let position = position.clamp(0.0, 1.0);
    let old_avail = (old_extent - separator_size.max(0.0)).max(0.0);
    let new_avail = (new_extent - separator_size.max(0.0)).max(0.0);

    if new_avail <= POSITION_EPSILON {
        return match side {
            ChangedSide::Max if position <= POSITION_EPSILON => 0.0,
            ChangedSide::Max => 1.0,
            ChangedSide::Min if position >= 1.0 - POSITION_EPSILON => 1.0,
            ChangedSide::Min => 0.0,
        };
    }

    let ratio = old_avail / new_avail;
    let next = match side {
        ChangedSide::Max => position * ratio,
        ChangedSide::Min => 1.0 - (1.0 - position) * ratio,
    };
    next.clamp(0.0, 1.0)
}
