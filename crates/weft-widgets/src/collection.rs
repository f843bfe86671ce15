#![forbid(unsafe_code)]

//! Dual-ordered child list of a panel.
//!
//! An [`ElementCollection`] keeps two orderings of the same members:
//!
//! - **child order**, the sequence layout algorithms walk (a stack lays its
//!   children out in this order);
//! - **z order**, back to front, derived from the child order by a stable
//!   sort on each member's z-index. Painting walks it forwards, hit testing
//!   backwards.
//!
//! The collection is pure bookkeeping: it does not know about tree-parent
//! pointers, notifications or disposal. [`Ui`](crate::Ui) wraps every
//! mutation with the changing/changed protocol and keeps parent pointers in
//! sync.
//!
//! # Invariants
//!
//! 1. `children` and `z_order` hold exactly the same set, without duplicates.
//! 2. `z_order` is sorted by z-index; equal z-indices keep child order.

use ahash::AHashMap;
use weft_core::ElementId;

use crate::error::CollectionError;

/// Ordered children of one panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementCollection {
    owner: ElementId,
    children: Vec<ElementId>,
    z_order: Vec<ElementId>,
    zindex: AHashMap<ElementId, i32>,
}

impl ElementCollection {
    /// Empty collection owned by `owner`.
    #[must_use]
    pub fn new(owner: ElementId) -> Self {
        Self {
            owner,
            children: Vec::new(),
            z_order: Vec::new(),
            zindex: AHashMap::new(),
        }
    }

    /// The owning panel.
    #[must_use]
    pub fn owner(&self) -> ElementId {
        self.owner
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    #[must_use]
    pub fn contains(&self, element: ElementId) -> bool {
        self.zindex.contains_key(&element)
    }

    /// Members in child order.
    #[must_use]
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    /// Members back to front.
    #[must_use]
    pub fn z_order(&self) -> &[ElementId] {
        &self.z_order
    }

    /// Position of `element` in child order.
    #[must_use]
    pub fn index_of(&self, element: ElementId) -> Option<usize> {
        self.children.iter().position(|&c| c == element)
    }

    /// Recorded z-index of a member.
    #[must_use]
    pub fn zindex_of(&self, element: ElementId) -> Option<i32> {
        self.zindex.get(&element).copied()
    }

    fn check_new(&self, element: ElementId) -> Result<(), CollectionError> {
        if element == self.owner {
            return Err(CollectionError::SelfInsertion { element });
        }
        if self.contains(element) {
            return Err(CollectionError::AlreadyParented {
                element,
                parent: self.owner,
            });
        }
        Ok(())
    }

    fn anchor_index(&self, before: Option<ElementId>) -> Result<usize, CollectionError> {
        match before {
            None => Ok(self.children.len()),
            Some(anchor) => self
                .index_of(anchor)
                .ok_or(CollectionError::AnchorNotAChild {
                    panel: self.owner,
                    anchor,
                }),
        }
    }

    fn member_index(&self, element: ElementId) -> Result<usize, CollectionError> {
        self.index_of(element).ok_or(CollectionError::NotAChild {
            panel: self.owner,
            element,
        })
    }

    fn rebuild_z_order(&mut self) {
        self.z_order.clone_from(&self.children);
        let zindex = &self.zindex;
        self.z_order
            .sort_by_key(|e| zindex.get(e).copied().unwrap_or_default());
    }

    /// Append `element` with z-index `z`. Returns its child index.
    pub fn add(&mut self, element: ElementId, z: i32) -> Result<usize, CollectionError> {
        self.insert_before(None, element, z)
    }

    /// Insert `element` before `before` (`None` appends). Returns its child
    /// index.
    pub fn insert_before(
        &mut self,
        before: Option<ElementId>,
        element: ElementId,
        z: i32,
    ) -> Result<usize, CollectionError> {
        self.check_new(element)?;
        let index = self.anchor_index(before)?;
        self.children.insert(index, element);
        self.zindex.insert(element, z);
        self.rebuild_z_order();
        Ok(index)
    }

    /// Remove a member. Returns the child index it had.
    pub fn remove(&mut self, element: ElementId) -> Result<usize, CollectionError> {
        let index = self.member_index(element)?;
        self.children.remove(index);
        self.zindex.remove(&element);
        self.z_order.retain(|&e| e != element);
        Ok(index)
    }

    /// Change the z-index of a member. Only the z order changes.
    pub fn set_zindex(&mut self, element: ElementId, z: i32) -> Result<(), CollectionError> {
        self.member_index(element)?;
        self.zindex.insert(element, z);
        self.rebuild_z_order();
        Ok(())
    }

    /// Move a member before `before` (`None` moves it to the end). Returns
    /// its new child index.
    pub fn move_before(
        &mut self,
        element: ElementId,
        before: Option<ElementId>,
    ) -> Result<usize, CollectionError> {
        let from = self.member_index(element)?;
        if before == Some(element) {
            return Ok(from);
        }
        self.anchor_index(before)?;
        self.children.remove(from);
        let to = match before {
            None => self.children.len(),
            Some(anchor) => self.member_index(anchor)?,
        };
        self.children.insert(to, element);
        self.rebuild_z_order();
        Ok(to)
    }

    /// Remove every member, returning them in child order.
    pub fn clear(&mut self) -> Vec<ElementId> {
        self.z_order.clear();
        self.zindex.clear();
        std::mem::take(&mut self.children)
    }

    /// Whether both orderings hold the same members.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        if self.children.len() != self.z_order.len() || self.children.len() != self.zindex.len() {
            return false;
        }
        let mut a = self.children.clone();
        let mut b = self.z_order.clone();
        a.sort_unstable();
        b.sort_unstable();
        a == b && a.windows(2).all(|w| w[0] != w[1]) && a.iter().all(|e| self.zindex.contains_key(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn id(n: u64) -> ElementId {
        ElementId::new(n).expect("non-zero")
    }

    fn collection() -> ElementCollection {
        ElementCollection::new(id(100))
    }

    #[test]
    fn z_order_is_stable_within_equal_index() {
        let mut c = collection();
        c.add(id(1), 0).unwrap();
        c.add(id(2), 5).unwrap();
        c.add(id(3), 0).unwrap();
        assert_eq!(c.children(), &[id(1), id(2), id(3)]);
        assert_eq!(c.z_order(), &[id(1), id(3), id(2)]);
    }

    #[test]
    fn move_before_rederives_z_ties() {
        let mut c = collection();
        for n in 1..=3 {
            c.add(id(n), 0).unwrap();
        }
        assert_eq!(c.move_before(id(3), Some(id(1))).unwrap(), 0);
        assert_eq!(c.children(), &[id(3), id(1), id(2)]);
        assert_eq!(c.z_order(), &[id(3), id(1), id(2)]);
        assert_eq!(c.move_before(id(3), None).unwrap(), 2);
        assert_eq!(c.children(), &[id(1), id(2), id(3)]);
    }

    #[test]
    fn set_zindex_only_touches_z_order() {
        let mut c = collection();
        c.add(id(1), 0).unwrap();
        c.add(id(2), 0).unwrap();
        c.set_zindex(id(1), 3).unwrap();
        assert_eq!(c.children(), &[id(1), id(2)]);
        assert_eq!(c.z_order(), &[id(2), id(1)]);
    }

    #[test]
    fn precondition_errors() {
        let mut c = collection();
        c.add(id(1), 0).unwrap();
        assert_eq!(
            c.add(id(1), 0),
            Err(CollectionError::AlreadyParented {
                element: id(1),
                parent: id(100)
            })
        );
        assert_eq!(
            c.add(id(100), 0),
            Err(CollectionError::SelfInsertion { element: id(100) })
        );
        assert_eq!(
            c.remove(id(9)),
            Err(CollectionError::NotAChild {
                panel: id(100),
                element: id(9)
            })
        );
        assert_eq!(
            c.insert_before(Some(id(9)), id(2), 0),
            Err(CollectionError::AnchorNotAChild {
                panel: id(100),
                anchor: id(9)
            })
        );
        assert!(!c.contains(id(2)));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(u64, i32),
        InsertBefore(u64, u64, i32),
        Remove(u64),
        SetZ(u64, i32),
        MoveBefore(u64, Option<u64>),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (1u64..10, -3i32..3).prop_map(|(e, z)| Op::Add(e, z)),
            (1u64..10, 1u64..10, -3i32..3).prop_map(|(a, e, z)| Op::InsertBefore(a, e, z)),
            (1u64..10).prop_map(Op::Remove),
            (1u64..10, -3i32..3).prop_map(|(e, z)| Op::SetZ(e, z)),
            (1u64..10, proptest::option::of(1u64..10)).prop_map(|(e, b)| Op::MoveBefore(e, b)),
        ]
    }

    proptest! {
        #[test]
        fn orderings_stay_consistent(ops in proptest::collection::vec(op(), 0..60)) {
            let mut c = collection();
            for op in ops {
                let _ = match op {
                    Op::Add(e, z) => c.add(id(e), z).map(|_| ()),
                    Op::InsertBefore(a, e, z) => c.insert_before(Some(id(a)), id(e), z).map(|_| ()),
                    Op::Remove(e) => c.remove(id(e)).map(|_| ()),
                    Op::SetZ(e, z) => c.set_zindex(id(e), z),
                    Op::MoveBefore(e, b) => c.move_before(id(e), b.map(id)).map(|_| ()),
                };
                prop_assert!(c.is_consistent());
                let zs: Vec<i32> = c.z_order().iter().filter_map(|&e| c.zindex_of(e)).collect();
                prop_assert!(zs.windows(2).all(|w| w[0] <= w[1]));
            }
        }
    }
}
