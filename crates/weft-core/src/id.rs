#![forbid(unsafe_code)]

//! Stable element identity.
//!
//! Elements are addressed by monotonically allocated [`ElementId`]s. IDs are
//! never reused within one UI session, so a stale handle held by a weak
//! relation (logical parent, focus cache, drag destination) can only resolve
//! to "gone", never to an unrelated element.

use std::fmt;
use std::num::NonZeroU64;

/// Stable identifier for an element in the arena.
///
/// `0` is reserved so IDs are always non-zero and `Option<ElementId>` stays
/// the size of a `u64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ElementId(NonZeroU64);

impl ElementId {
    /// Lowest valid element ID.
    pub const MIN: Self = Self(NonZeroU64::MIN);

    /// Create an element ID, rejecting 0.
    #[must_use]
    pub const fn new(raw: u64) -> Option<Self> {
        match NonZeroU64::new(raw) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }

    /// Get the raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }

    /// Return the next ID, or `None` on overflow.
    #[must_use]
    pub const fn checked_next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(next) => Some(Self(next)),
            None => None,
        }
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// Deterministic allocator for element IDs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementIdAllocator {
    next: ElementId,
}

impl ElementIdAllocator {
    /// Start allocating from a known ID.
    #[must_use]
    pub const fn with_next(next: ElementId) -> Self {
        Self { next }
    }

    /// Peek at the next ID without consuming.
    #[must_use]
    pub const fn peek(&self) -> ElementId {
        self.next
    }

    /// Allocate the next ID and advance.
    ///
    /// # Panics
    ///
    /// Panics once the 64-bit ID space is exhausted; reusing an ID would let
    /// stale handles alias a live element.
    pub fn allocate(&mut self) -> ElementId {
        let current = self.next;
        let Some(next) = current.checked_next() else {
            panic!("element id space exhausted after {current}");
        };
        self.next = next;
        current
    }
}

impl Default for ElementIdAllocator {
    fn default() -> Self {
        Self {
            next: ElementId::MIN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_is_rejected() {
        assert!(ElementId::new(0).is_none());
        assert_eq!(ElementId::new(7).map(ElementId::get), Some(7));
    }

    #[test]
    fn display_is_prefixed() {
        assert_eq!(ElementId::MIN.to_string(), "E1");
    }

    #[test]
    #[should_panic(expected = "element id space exhausted")]
    fn exhaustion_panics() {
        let last = ElementId::new(u64::MAX).expect("max is non-zero");
        let mut alloc = ElementIdAllocator::with_next(last);
        let _ = alloc.allocate();
    }

    proptest! {
        #[test]
        fn allocator_produces_monotonic_ids(start in 1u64..1_000_000, count in 1usize..64) {
            let start = ElementId::new(start).expect("start must be valid");
            let mut allocator = ElementIdAllocator::with_next(start);
            let mut prev = 0u64;
            for _ in 0..count {
                let current = allocator.allocate().get();
                prop_assert!(current > prev);
                prev = current;
            }
            prop_assert_eq!(allocator.peek().get(), prev + 1);
        }
    }
}
