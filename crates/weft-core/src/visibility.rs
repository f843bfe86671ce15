#![forbid(unsafe_code)]

//! Element visibility flags.

use bitflags::bitflags;

bitflags! {
    /// Which passes an element participates in.
    ///
    /// The three bits are independent: an element can take part in layout
    /// while being invisible (`LAYOUT` only), or be painted while ignoring
    /// the mouse (`RENDER` without `INTERACT`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Visibility: u8 {
        /// Not rendered, not laid out, not hit-testable.
        const NONE     = 0b000;
        /// Painted during the visual pass.
        const RENDER   = 0b001;
        /// Occupies space in its parent's layout.
        const LAYOUT   = 0b010;
        /// Receives hit tests and mouse input.
        const INTERACT = 0b100;
        /// All passes.
        const FULL     = Self::RENDER.bits() | Self::LAYOUT.bits() | Self::INTERACT.bits();
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Self::FULL
    }
}

impl Visibility {
    /// Participates in layout.
    #[inline]
    #[must_use]
    pub const fn is_layout(self) -> bool {
        self.contains(Self::LAYOUT)
    }

    /// Participates in rendering.
    #[inline]
    #[must_use]
    pub const fn is_render(self) -> bool {
        self.contains(Self::RENDER)
    }

    /// Participates in hit testing.
    #[inline]
    #[must_use]
    pub const fn is_interact(self) -> bool {
        self.contains(Self::INTERACT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_fully_visible() {
        let v = Visibility::default();
        assert!(v.is_layout() && v.is_render() && v.is_interact());
    }

    #[test]
    fn bits_are_independent() {
        let v = Visibility::LAYOUT;
        assert!(v.is_layout());
        assert!(!v.is_render());
        assert!(!v.is_interact());
    }
}
