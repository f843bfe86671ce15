#![forbid(unsafe_code)]

//! Observer registration for tree and tab-manager notifications.
//!
//! Observers receive a shared reference to every [`UiEvent`] while the
//! mutation that produced it is in progress. They cannot touch the tree from
//! inside the callback; anything that needs to react structurally should
//! record the event and act after the call returns, or post a callback to
//! the scheduler.

use std::fmt;

use weft_core::{ElementId, KeyEvent, Point, Rect};

use crate::tabs::{DragPhase, DropDestination};

/// Handle returned by [`Ui::subscribe`](crate::Ui::subscribe). Pass it to
/// [`Ui::unsubscribe`](crate::Ui::unsubscribe) to stop receiving events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[must_use = "dropping the handle makes the observer impossible to remove"]
pub struct ObserverHandle(u64);

/// A structural change of an element collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionChange {
    /// `element` is inserted at child `index`.
    Insert { element: ElementId, index: usize },
    /// `element` leaves child `index`.
    Remove { element: ElementId, index: usize },
    /// `element` moves to child `index`.
    Move { element: ElementId, index: usize },
    /// `element` gets a new z-index.
    ZIndex { element: ElementId, zindex: i32 },
}

/// Notifications emitted by a [`Ui`](crate::Ui).
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// A collection of `panel` is about to change.
    CollectionChanging {
        panel: ElementId,
        change: CollectionChange,
    },
    /// A collection of `panel` has changed.
    CollectionChanged {
        panel: ElementId,
        change: CollectionChange,
    },
    /// An element received a new layout rectangle.
    LayoutChanged { element: ElementId, rect: Rect },
    /// A host switched its visible tab.
    ActiveTabChanged {
        host: ElementId,
        previous: Option<ElementId>,
        current: Option<ElementId>,
    },
    /// The tab drag state machine changed state.
    DragStateChanged { phase: DragPhase },
    /// The destination under a free-floating tab changed.
    DestinationChanged {
        host: Option<ElementId>,
        destination: Option<DropDestination>,
    },
    /// A top-level window was closed.
    WindowClosed { window: ElementId },
    /// Logical focus moved.
    FocusChanged {
        previous: Option<ElementId>,
        current: Option<ElementId>,
    },
    /// The pointer entered an element.
    MouseEnter { element: ElementId, position: Point },
    /// The pointer left an element.
    MouseLeave { element: ElementId },
    /// A key was pressed while `target` held focus (or nothing did).
    KeyDown {
        target: Option<ElementId>,
        key: KeyEvent,
    },
    /// A key was released while `target` held focus.
    KeyUp {
        target: Option<ElementId>,
        key: KeyEvent,
    },
    /// Composed text arrived while `target` held focus.
    TextInput {
        target: Option<ElementId>,
        text: String,
    },
}

type ObserverFn = Box<dyn FnMut(&UiEvent)>;

/// Registered observers, notified in subscription order.
#[derive(Default)]
pub(crate) struct Observers {
    next: u64,
    entries: Vec<(ObserverHandle, ObserverFn)>,
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.entries.len())
            .finish()
    }
}

impl Observers {
    pub(crate) fn subscribe(&mut self, observer: ObserverFn) -> ObserverHandle {
        self.next += 1;
        let handle = ObserverHandle(self.next);
        self.entries.push((handle, observer));
        handle
    }

    pub(crate) fn unsubscribe(&mut self, handle: ObserverHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(h, _)| *h != handle);
        self.entries.len() != before
    }

    pub(crate) fn emit(&mut self, event: &UiEvent) {
        for (_, observer) in &mut self.entries {
            observer(event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
