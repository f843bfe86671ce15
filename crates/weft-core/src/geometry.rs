#![forbid(unsafe_code)]

//! Geometric primitives in device-independent units.
//!
//! All coordinates are `f64` DIPs with the origin at the top-left of the
//! owning window's client area. Widths and heights are never negative once
//! a value has passed through a constructor; degenerate spans collapse to
//! zero instead.

/// A point in client or screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise translation.
    #[inline]
    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Coordinate along `orientation`'s main axis.
    #[inline]
    #[must_use]
    pub const fn along(self, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::Horizontal => self.x,
            Orientation::Vertical => self.y,
        }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Self) -> Self::Output {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Self) -> Self::Output {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// The zero size.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Create a new size.
    #[inline]
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Extent along `orientation`'s main axis.
    #[inline]
    #[must_use]
    pub const fn along(self, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::Horizontal => self.width,
            Orientation::Vertical => self.height,
        }
    }

    /// Extent across `orientation`'s main axis.
    #[inline]
    #[must_use]
    pub const fn across(self, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::Horizontal => self.height,
            Orientation::Vertical => self.width,
        }
    }

    /// Build a size from main-axis and cross-axis extents.
    #[inline]
    #[must_use]
    pub const fn from_axes(orientation: Orientation, main: f64, cross: f64) -> Self {
        match orientation {
            Orientation::Horizontal => Self::new(main, cross),
            Orientation::Vertical => Self::new(cross, main),
        }
    }

    /// Clamp both extents to be non-negative.
    #[inline]
    #[must_use]
    pub fn non_negative(self) -> Self {
        Self::new(self.width.max(0.0), self.height.max(0.0))
    }
}

/// An axis-aligned rectangle used for layout bounds, clipping and hit testing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: f64,
    /// Top edge (inclusive).
    pub y: f64,
    /// Width in DIPs.
    pub width: f64,
    /// Height in DIPs.
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle. Negative extents collapse to zero.
    #[inline]
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Create a rectangle at the origin with the given size.
    #[inline]
    #[must_use]
    pub fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    /// Create a rectangle from two opposite corners.
    #[must_use]
    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    /// Left edge (alias for x).
    #[inline]
    #[must_use]
    pub const fn left(&self) -> f64 {
        self.x
    }

    /// Top edge (alias for y).
    #[inline]
    #[must_use]
    pub const fn top(&self) -> f64 {
        self.y
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Top-left corner.
    #[inline]
    #[must_use]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Width and height.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Center point.
    #[inline]
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Check if the rectangle has zero area.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Check if a point is inside the rectangle (right/bottom exclusive).
    #[inline]
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Translate the rectangle.
    #[inline]
    #[must_use]
    pub fn translate(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Create a new rectangle inside the current one with the given margin.
    #[must_use]
    pub fn inner(&self, margin: Sides) -> Rect {
        Rect::new(
            self.x + margin.left,
            self.y + margin.top,
            self.width - margin.left - margin.right,
            self.height - margin.top - margin.bottom,
        )
    }

    /// Grow the rectangle outward by `margin`.
    #[must_use]
    pub fn outer(&self, margin: Sides) -> Rect {
        Rect::new(
            self.x - margin.left,
            self.y - margin.top,
            self.width + margin.left + margin.right,
            self.height + margin.top + margin.bottom,
        )
    }

    /// Compute the intersection with another rectangle, returning `None` if
    /// no overlap.
    #[must_use]
    pub fn intersection_opt(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Some(Rect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }

    /// Compute the intersection with another rectangle.
    ///
    /// Returns an empty rectangle if the rectangles don't overlap.
    #[inline]
    #[must_use]
    pub fn intersection(&self, other: &Rect) -> Rect {
        self.intersection_opt(other).unwrap_or_default()
    }

    /// Smallest rectangle containing both.
    #[must_use]
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::from_edges(
            self.x.min(other.x),
            self.y.min(other.y),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// Start coordinate along `orientation`.
    #[inline]
    #[must_use]
    pub fn min_along(&self, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::Horizontal => self.x,
            Orientation::Vertical => self.y,
        }
    }

    /// End coordinate along `orientation`.
    #[inline]
    #[must_use]
    pub fn max_along(&self, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::Horizontal => self.right(),
            Orientation::Vertical => self.bottom(),
        }
    }

    /// Build a rectangle from spans on the main and cross axes.
    #[must_use]
    pub fn from_spans(
        orientation: Orientation,
        main_start: f64,
        main_len: f64,
        cross_start: f64,
        cross_len: f64,
    ) -> Rect {
        match orientation {
            Orientation::Horizontal => Rect::new(main_start, cross_start, main_len, cross_len),
            Orientation::Vertical => Rect::new(cross_start, main_start, cross_len, main_len),
        }
    }

    /// Approximate equality within `epsilon` on every component.
    #[must_use]
    pub fn approx_eq(&self, other: &Rect, epsilon: f64) -> bool {
        (self.x - other.x).abs() <= epsilon
            && (self.y - other.y).abs() <= epsilon
            && (self.width - other.width).abs() <= epsilon
            && (self.height - other.height).abs() <= epsilon
    }
}

/// Sides for padding/margin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sides {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Sides {
    /// Same value on all four sides.
    #[must_use]
    pub const fn all(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Horizontal total (left + right).
    #[must_use]
    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    /// Vertical total (top + bottom).
    #[must_use]
    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// Layout direction of stack and split panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Orientation {
    /// Left to right.
    #[default]
    Horizontal,
    /// Top to bottom.
    Vertical,
}

impl Orientation {
    /// The perpendicular orientation.
    #[must_use]
    pub const fn flip(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_extents_collapse() {
        let r = Rect::new(10.0, 10.0, -5.0, 3.0);
        assert_eq!(r.width, 0.0);
        assert!(r.is_empty());
    }

    #[test]
    fn contains_is_right_exclusive() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(Point::new(0.0, 0.0)));
        assert!(r.contains(Point::new(9.99, 9.99)));
        assert!(!r.contains(Point::new(10.0, 5.0)));
    }

    #[test]
    fn intersection_of_disjoint_is_none() {
        let a = Rect::new(0.0, 0.0, 5.0, 5.0);
        let b = Rect::new(6.0, 6.0, 5.0, 5.0);
        assert_eq!(a.intersection_opt(&b), None);
        assert!(a.intersection(&b).is_empty());
    }

    #[test]
    fn inner_and_outer_are_inverse() {
        let r = Rect::new(5.0, 5.0, 100.0, 50.0);
        let m = Sides::all(4.0);
        assert!(r.inner(m).outer(m).approx_eq(&r, 1e-9));
    }

    #[test]
    fn spans_respect_orientation() {
        let h = Rect::from_spans(Orientation::Horizontal, 1.0, 2.0, 3.0, 4.0);
        assert_eq!(h, Rect::new(1.0, 3.0, 2.0, 4.0));
        let v = Rect::from_spans(Orientation::Vertical, 1.0, 2.0, 3.0, 4.0);
        assert_eq!(v, Rect::new(3.0, 1.0, 4.0, 2.0));
        assert_eq!(v.min_along(Orientation::Vertical), 1.0);
        assert_eq!(v.max_along(Orientation::Vertical), 3.0);
    }

    #[test]
    fn size_axes_round_trip() {
        let s = Size::from_axes(Orientation::Vertical, 7.0, 3.0);
        assert_eq!(s, Size::new(3.0, 7.0));
        assert_eq!(s.along(Orientation::Vertical), 7.0);
        assert_eq!(s.across(Orientation::Vertical), 3.0);
    }
}
