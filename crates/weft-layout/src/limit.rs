#![forbid(unsafe_code)]

//! Size limiter solver.

use crate::Size;

/// Inclusive bounds on a desired size. `None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SizeLimits {
    pub min: Size,
    pub max_width: Option<f64>,
    pub max_height: Option<f64>,
}

impl SizeLimits {
    /// Bounds with both a minimum and a maximum.
    #[must_use]
    pub const fn new(min: Size, max: Size) -> Self {
        Self {
            min,
            max_width: Some(max.width),
            max_height: Some(max.height),
        }
    }

    /// Clamp an available budget so a child is never offered more than the
    /// maximum.
    #[must_use]
    pub fn clamp_available(&self, available: Size) -> Size {
        Size::new(
            self.max_width.map_or(available.width, |m| available.width.min(m)),
            self.max_height.map_or(available.height, |m| available.height.min(m)),
        )
    }
}

/// Clamp `desired` into `limits`. When min exceeds max, max wins.
#[must_use]
pub fn clamp_size(desired: Size, limits: &SizeLimits) -> Size {
    let clamp = |value: f64, min: f64, max: Option<f64>| {
        let value = value.max(min);
        max.map_or(value, |max| value.min(max)).max(0.0)
    };
    Size::new(
        clamp(desired.width, limits.min.width, limits.max_width),
        clamp(desired.height, limits.min.height, limits.max_height),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_both_ways() {
        let limits = SizeLimits::new(Size::new(10.0, 10.0), Size::new(50.0, 50.0));
        assert_eq!(clamp_size(Size::new(5.0, 80.0), &limits), Size::new(10.0, 50.0));
    }

    #[test]
    fn unbounded_max_keeps_large_values() {
        let limits = SizeLimits {
            min: Size::new(1.0, 1.0),
            max_width: None,
            max_height: Some(20.0),
        };
        assert_eq!(clamp_size(Size::new(500.0, 500.0), &limits), Size::new(500.0, 20.0));
        assert_eq!(
            limits.clamp_available(Size::new(100.0, 100.0)),
            Size::new(100.0, 20.0)
        );
    }

    #[test]
    fn max_wins_over_min() {
        let limits = SizeLimits::new(Size::new(60.0, 0.0), Size::new(40.0, 10.0));
        assert_eq!(clamp_size(Size::ZERO, &limits).width, 40.0);
    }
}
