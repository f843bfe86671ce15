#![forbid(unsafe_code)]

//! Typed errors of structural tree operations.

use std::fmt;

use weft_core::ElementId;

/// Precondition failures of an [`ElementCollection`](crate::ElementCollection)
/// mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionError {
    /// The element already has a tree parent.
    AlreadyParented {
        element: ElementId,
        parent: ElementId,
    },
    /// The element is not a member of this collection.
    NotAChild {
        panel: ElementId,
        element: ElementId,
    },
    /// The `before` anchor is not a member of this collection.
    AnchorNotAChild {
        panel: ElementId,
        anchor: ElementId,
    },
    /// A panel cannot contain itself or one of its ancestors.
    SelfInsertion { element: ElementId },
    /// The panel already holds as many children as it can lay out.
    CapacityExceeded { panel: ElementId, capacity: usize },
}

impl fmt::Display for CollectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyParented { element, parent } => {
                write!(f, "element {element} already belongs to panel {parent}")
            }
            Self::NotAChild { panel, element } => {
                write!(f, "element {element} is not a child of panel {panel}")
            }
            Self::AnchorNotAChild { panel, anchor } => {
                write!(f, "anchor {anchor} is not a child of panel {panel}")
            }
            Self::SelfInsertion { element } => {
                write!(f, "panel {element} cannot contain itself or an ancestor")
            }
            Self::CapacityExceeded { panel, capacity } => {
                write!(f, "panel {panel} is full ({capacity} children)")
            }
        }
    }
}

impl std::error::Error for CollectionError {}

/// Failures of element-tree operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    /// The id does not name a live element.
    UnknownElement(ElementId),
    /// The element cannot hold children.
    NotAPanel(ElementId),
    /// The element is not a leaf.
    NotALeaf(ElementId),
    /// A collection precondition failed.
    Collection(CollectionError),
    /// The element is not a tab.
    NotATab(ElementId),
    /// The element is not a host.
    NotAHost(ElementId),
    /// The element is not a window.
    NotAWindow(ElementId),
    /// The element is not inside any window.
    Detached(ElementId),
    /// The tab is already shown by a host.
    TabAlreadyHosted { tab: ElementId, host: ElementId },
    /// The tab is not shown by the expected host (or by any host).
    TabNotInHost { tab: ElementId, host: Option<ElementId> },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownElement(id) => write!(f, "element {id} does not exist"),
            Self::NotAPanel(id) => write!(f, "element {id} is not a panel"),
            Self::NotALeaf(id) => write!(f, "element {id} is not a leaf"),
            Self::Collection(err) => write!(f, "{err}"),
            Self::NotATab(id) => write!(f, "element {id} is not a tab"),
            Self::NotAHost(id) => write!(f, "element {id} is not a host"),
            Self::NotAWindow(id) => write!(f, "element {id} is not a window"),
            Self::Detached(id) => write!(f, "element {id} is not inside a window"),
            Self::TabAlreadyHosted { tab, host } => {
                write!(f, "tab {tab} is already hosted by {host}")
            }
            Self::TabNotInHost {
                tab,
                host: Some(host),
            } => write!(f, "tab {tab} is not hosted by {host}"),
            Self::TabNotInHost { tab, host: None } => write!(f, "tab {tab} is not hosted"),
        }
    }
}

impl std::error::Error for TreeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Collection(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CollectionError> for TreeError {
    fn from(err: CollectionError) -> Self {
        Self::Collection(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> ElementId {
        ElementId::new(n).expect("non-zero")
    }

    #[test]
    fn collection_error_is_wrapped_with_source() {
        let err: TreeError = CollectionError::NotAChild {
            panel: id(1),
            element: id(2),
        }
        .into();
        assert_eq!(err.to_string(), "element E2 is not a child of panel E1");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn unhosted_tab_message() {
        let err = TreeError::TabNotInHost {
            tab: id(4),
            host: None,
        };
        assert_eq!(err.to_string(), "tab E4 is not hosted");
    }
}
