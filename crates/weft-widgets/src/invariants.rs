#![forbid(unsafe_code)]

//! Structured invariant report over a live element tree.
//!
//! [`Ui::validate`](crate::Ui::validate) walks every node and reports each
//! broken bookkeeping rule as an [`InvariantIssue`]. A healthy tree yields an
//! empty report; tests call it after every mutation step.

use std::fmt;

use weft_core::ElementId;

/// Which rule a finding violates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InvariantCode {
    /// Child order and z order of a collection disagree.
    CollectionMismatch,
    /// A collection member's parent pointer names another panel.
    ParentMismatch,
    /// A parent pointer names a panel that does not list the element.
    MissingChild,
    /// A collection lists an element that does not exist.
    DanglingChild,
    /// A host's strip and contents have different sizes.
    HostCardinality,
    /// A host's strip and contents disagree on tab order.
    HostOrder,
    /// A non-empty host has no valid active tab, or more than one visible.
    ActiveTab,
    /// A split panel holds more than two children.
    SplitChildren,
    /// A tab and its button do not point at each other.
    TabButtonPairing,
}

/// How bad a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InvariantSeverity {
    Warning,
    Error,
}

/// One finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantIssue {
    pub code: InvariantCode,
    pub severity: InvariantSeverity,
    pub element: Option<ElementId>,
    pub related: Option<ElementId>,
    pub message: String,
}

impl fmt::Display for InvariantIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

/// Every finding of one validation run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InvariantReport {
    pub issues: Vec<InvariantIssue>,
}

impl InvariantReport {
    /// True if any error-level finding exists.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.issues
            .iter()
            .any(|issue| issue.severity == InvariantSeverity::Error)
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub(crate) fn error(
        &mut self,
        code: InvariantCode,
        element: ElementId,
        related: Option<ElementId>,
        message: String,
    ) {
        self.issues.push(InvariantIssue {
            code,
            severity: InvariantSeverity::Error,
            element: Some(element),
            related,
            message,
        });
    }

    /// Codes of all findings, sorted and deduplicated.
    #[must_use]
    pub fn codes(&self) -> Vec<InvariantCode> {
        let mut codes: Vec<_> = self.issues.iter().map(|issue| issue.code).collect();
        codes.sort_unstable();
        codes.dedup();
        codes
    }
}

impl fmt::Display for InvariantReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return write!(f, "no invariant issues");
        }
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}
