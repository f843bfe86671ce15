#![forbid(unsafe_code)]

//! Logical focus and focus scopes.
//!
//! One element at a time holds logical focus. Every focus scope between the
//! focused element and the root remembers it, so switching back to a scope
//! (activating a tab, say) can restore focus where the user left it.
//!
//! Scope resolution follows the logical parent when one is set and the tree
//! parent otherwise. A tab button, for instance, lives in the host's strip
//! but belongs to its tab's scope.

use tracing::trace;
use weft_core::ElementId;

use crate::error::TreeError;
use crate::node::ElementFlags;
use crate::observer::UiEvent;
use crate::Ui;

impl Ui {
    fn set_flag(&mut self, element: ElementId, flag: ElementFlags, on: bool) -> Result<(), TreeError> {
        self.node_mut(element)?.flags.set(flag, on);
        Ok(())
    }

    /// Let `element` take focus when clicked.
    pub fn set_focusable(&mut self, element: ElementId, focusable: bool) -> Result<(), TreeError> {
        self.set_flag(element, ElementFlags::FOCUSABLE, focusable)
    }

    /// Make `element` remember its last focused descendant.
    pub fn set_focus_scope(&mut self, element: ElementId, scope: bool) -> Result<(), TreeError> {
        self.set_flag(element, ElementFlags::FOCUS_SCOPE, scope)?;
        if !scope {
            self.node_mut(element)?.scope_focus = None;
        }
        Ok(())
    }

    #[must_use]
    pub fn is_focus_scope(&self, element: ElementId) -> bool {
        self.nodes
            .get(&element)
            .is_some_and(|n| n.flags.contains(ElementFlags::FOCUS_SCOPE))
    }

    #[must_use]
    pub fn is_focusable(&self, element: ElementId) -> bool {
        self.nodes
            .get(&element)
            .is_some_and(|n| n.flags.contains(ElementFlags::FOCUSABLE))
    }

    /// The element holding logical focus.
    #[must_use]
    pub fn focused(&self) -> Option<ElementId> {
        self.focused
    }

    /// The descendant `scope` last saw focused.
    #[must_use]
    pub fn scope_focus(&self, scope: ElementId) -> Option<ElementId> {
        self.nodes
            .get(&scope)
            .and_then(|n| n.scope_focus)
            .filter(|&e| self.is_alive(e))
    }

    /// Focus scopes enclosing `element`, nearest first, following logical
    /// parents before tree parents.
    #[must_use]
    pub fn focus_scopes(&self, element: ElementId) -> Vec<ElementId> {
        let mut scopes = Vec::new();
        let mut current = self.focus_parent(element);
        // A logical-parent cycle cannot be longer than the arena.
        let mut budget = self.nodes.len();
        while let Some(id) = current
            && budget > 0
        {
            if self.is_focus_scope(id) {
                scopes.push(id);
            }
            current = self.focus_parent(id);
            budget -= 1;
        }
        scopes
    }

    fn focus_parent(&self, element: ElementId) -> Option<ElementId> {
        self.logical_parent(element).or_else(|| self.parent(element))
    }

    /// Give `element` logical focus and record it in every enclosing scope.
    pub fn set_focus(&mut self, element: ElementId) -> Result<(), TreeError> {
        if !self.is_alive(element) {
            return Err(TreeError::UnknownElement(element));
        }
        for scope in self.focus_scopes(element) {
            if let Some(node) = self.nodes.get_mut(&scope) {
                node.scope_focus = Some(element);
            }
        }
        let previous = self.focused.replace(element);
        if previous != Some(element) {
            trace!(target: "weft.tree", ?previous, current = %element, "focus changed");
            self.emit(UiEvent::FocusChanged {
                previous,
                current: Some(element),
            });
        }
        Ok(())
    }

    /// Drop logical focus. Scope memories are kept.
    pub fn clear_focus(&mut self) {
        if let Some(previous) = self.focused.take() {
            self.emit(UiEvent::FocusChanged {
                previous: Some(previous),
                current: None,
            });
        }
    }

    /// Focus whatever `scope` last remembered. Returns the restored element.
    pub(crate) fn restore_scope_focus(&mut self, scope: ElementId) -> Option<ElementId> {
        let remembered = self.scope_focus(scope)?;
        self.set_focus(remembered).ok()?;
        Some(remembered)
    }

    /// Drop every reference to an element leaving the tree.
    pub(crate) fn forget_focus(&mut self, element: ElementId) {
        for node in self.nodes.values_mut() {
            if node.scope_focus == Some(element) {
                node.scope_focus = None;
            }
        }
        if self.focused == Some(element) {
            self.clear_focus();
        }
    }
}
