#![forbid(unsafe_code)]

//! Stack panel solver.
//!
//! Children are laid out one after another along the main axis. Sizing is
//! two-pass:
//!
//! 1. Pixel and automatic children (and every child's margins) are resolved
//!    first, so a proportional child never sees negative space.
//! 2. Whatever is left is divided among proportional children by weight.
//!
//! Margins inside a stack are always pixel distances; the anchor flags only
//! matter on the cross axis.

use crate::{LayoutParams, Orientation, POSITION_EPSILON, Size, SizeSpec};

/// One child as seen by the main-axis distributor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackItem {
    pub margin_min: f64,
    pub margin_max: f64,
    pub size: SizeSpec,
    /// Measured desired extent along the main axis.
    pub desired: f64,
}

impl StackItem {
    /// Project a child's parameters onto the stack's main axis.
    #[must_use]
    pub fn from_params(params: &LayoutParams, orientation: Orientation, desired: Size) -> Self {
        let axis = params.along(orientation);
        Self {
            margin_min: axis.margin_min.max(0.0),
            margin_max: axis.margin_max.max(0.0),
            size: axis.size,
            desired: desired.along(orientation),
        }
    }
}

/// Distribute `extent` along the main axis starting at `start`.
///
/// Returns one `(start, length)` pair per item, in order.
#[must_use]
pub fn distribute(items: &[StackItem], start: f64, extent: f64) -> Vec<(f64, f64)> {
    let mut fixed_total = 0.0;
    let mut total_weight = 0.0;
    for item in items {
        fixed_total += item.margin_min + item.margin_max;
        match item.size.fixed_extent(item.desired) {
            Some(len) => fixed_total += len,
            None => total_weight += item.size.weight(),
        }
    }
    let remaining = (extent - fixed_total).max(0.0);

    let mut cursor = start;
    items
        .iter()
        .map(|item| {
            cursor += item.margin_min;
            let len = match item.size.fixed_extent(item.desired) {
                Some(len) => len,
                None if total_weight > POSITION_EPSILON => {
                    remaining * item.size.weight() / total_weight
                }
                None => 0.0,
            };
            let span = (cursor, len);
            cursor += len + item.margin_max;
            span
        })
        .collect()
}

/// Running desired-size measurement for a stack panel.
///
/// Callers first register every child's main-axis weight with
/// [`StackMeasure::new`], then measure fixed children (using
/// [`StackMeasure::fixed_budget`]) before proportional ones (using
/// [`StackMeasure::proportional_budget`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackMeasure {
    orientation: Orientation,
    available: Size,
    used_main: f64,
    cross: f64,
    total_weight: f64,
    proportional_main: f64,
}

impl StackMeasure {
    /// Start a measurement against `available` with the given total
    /// proportional weight.
    #[must_use]
    pub fn new(orientation: Orientation, available: Size, total_weight: f64) -> Self {
        Self {
            orientation,
            available,
            used_main: 0.0,
            cross: 0.0,
            total_weight: total_weight.max(0.0),
            proportional_main: 0.0,
        }
    }

    fn remaining_main(&self) -> f64 {
        (self.available.along(self.orientation) - self.used_main).max(0.0)
    }

    /// Budget for measuring the next fixed child.
    #[must_use]
    pub fn fixed_budget(&self, params: &LayoutParams) -> Size {
        let main = params.along(self.orientation);
        let cross = params.across(self.orientation);
        let main_budget = (self.remaining_main() - main.margin_min - main.margin_max).max(0.0);
        let main_budget = match main.size {
            SizeSpec::Pixels(p) => p.max(0.0),
            _ => main_budget,
        };
        Size::from_axes(
            self.orientation,
            main_budget,
            cross.child_available(self.available.across(self.orientation)),
        )
    }

    /// Account for a measured fixed child.
    pub fn add_fixed(&mut self, params: &LayoutParams, desired: Size) {
        let main = params.along(self.orientation);
        let cross = params.across(self.orientation);
        let len = main
            .size
            .fixed_extent(desired.along(self.orientation))
            .unwrap_or(0.0);
        self.used_main += main.margin_min.max(0.0) + main.margin_max.max(0.0) + len;
        self.cross = self
            .cross
            .max(cross.span_requirement(desired.across(self.orientation)));
    }

    /// Budget for measuring a proportional child, once all fixed children
    /// are accounted for.
    #[must_use]
    pub fn proportional_budget(&self, params: &LayoutParams) -> Size {
        let main = params.along(self.orientation);
        let cross = params.across(self.orientation);
        let share = if self.total_weight > POSITION_EPSILON {
            self.remaining_main() * main.size.weight() / self.total_weight
        } else {
            0.0
        };
        let share = (share - main.margin_min.max(0.0) - main.margin_max.max(0.0)).max(0.0);
        Size::from_axes(
            self.orientation,
            share,
            cross.child_available(self.available.across(self.orientation)),
        )
    }

    /// Account for a measured proportional child.
    ///
    /// The stack must be long enough that this child's share of the
    /// proportional space covers its desired extent.
    pub fn add_proportional(&mut self, params: &LayoutParams, desired: Size) {
        let main = params.along(self.orientation);
        let cross = params.across(self.orientation);
        let weight = main.size.weight();
        self.used_main += main.margin_min.max(0.0) + main.margin_max.max(0.0);
        if weight > POSITION_EPSILON && self.total_weight > POSITION_EPSILON {
            let needed = desired.along(self.orientation).max(0.0) * self.total_weight / weight;
            self.proportional_main = self.proportional_main.max(needed);
        }
        self.cross = self
            .cross
            .max(cross.span_requirement(desired.across(self.orientation)));
    }

    /// The accumulated desired size.
    #[must_use]
    pub fn finish(self) -> Size {
        Size::from_axes(
            self.orientation,
            self.used_main + self.proportional_main,
            self.cross,
        )
    }
}
