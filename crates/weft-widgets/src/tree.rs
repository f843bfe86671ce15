#![forbid(unsafe_code)]

//! The element arena and its structural operations.
//!
//! [`Ui`] owns every element of one UI session in an arena keyed by
//! [`ElementId`]. Tree parents are ids stored on the child, children are ids
//! stored in the parent's [`ElementCollection`](crate::ElementCollection), so
//! the tree holds no reference cycles and a stale id can only ever fail a
//! lookup.
//!
//! # Structural mutation
//!
//! Every collection mutation runs the same protocol:
//!
//! 1. check preconditions (a typed [`TreeError`] on failure, nothing changed);
//! 2. emit [`UiEvent::CollectionChanging`];
//! 3. edit the collection and the child's parent pointer together;
//! 4. emit [`UiEvent::CollectionChanged`];
//! 5. invalidate the panel's desired size, children layout and visuals.
//!
//! # Lifetime
//!
//! Elements are never freed synchronously. [`Ui::dispose`] marks an element;
//! the next [`Ui::update`] tears it down (detaching it, marking its children,
//! dropping focus, hover, capture and drag references) and frees it after the
//! scheduler has purged it from every queue.

use std::collections::BTreeMap;
use std::fmt;

use ahash::AHashMap;
use tracing::{debug, error, trace};
use weft_core::{ElementId, ElementIdAllocator, Orientation, Rect, Size, Visibility};
use weft_layout::{LayoutParams, SizeLimits};
use weft_runtime::{FrameHost, FrameReport, Instant, Scheduler, TaskOutcome, TaskToken, UiConfig};

use crate::backend::{HeadlessPlatform, Platform};
use crate::error::{CollectionError, TreeError};
use crate::invariants::{InvariantCode, InvariantReport};
use crate::node::{ElementKind, LeafData, Node, NodeData, SelectorData, TabButtonData};
use crate::observer::{CollectionChange, ObserverHandle, Observers, UiEvent};
use crate::render::{RecordingRenderer, Renderer};
use crate::tabs::TabManager;

/// Item extent of a virtual list built by [`Ui::create_element`].
pub const DEFAULT_ITEM_EXTENT: f64 = 20.0;

/// The element that currently holds the mouse, and the window it lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Capture {
    pub window: ElementId,
    pub element: ElementId,
}

/// One UI session: the element arena, its scheduler, its windows and the tab
/// manager.
pub struct Ui {
    pub(crate) nodes: BTreeMap<ElementId, Node>,
    /// Reverse index of `Node::logical_parent`.
    logical_children: AHashMap<ElementId, Vec<ElementId>>,
    ids: ElementIdAllocator,
    pub(crate) scheduler: Scheduler<Ui>,
    pub(crate) config: UiConfig,
    pub(crate) platform: Box<dyn Platform>,
    pub(crate) renderer: Box<dyn Renderer>,
    pub(crate) observers: Observers,
    pub(crate) focused: Option<ElementId>,
    pub(crate) capture: Option<Capture>,
    pub(crate) tabs: TabManager,
}

impl fmt::Debug for Ui {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ui")
            .field("elements", &self.nodes.len())
            .field("scheduler", &self.scheduler)
            .field("focused", &self.focused)
            .field("capture", &self.capture)
            .field("tabs", &self.tabs)
            .finish_non_exhaustive()
    }
}

impl Ui {
    /// A session using `platform` for windows and `renderer` for drawing.
    #[must_use]
    pub fn new(config: UiConfig, platform: Box<dyn Platform>, renderer: Box<dyn Renderer>) -> Self {
        Self {
            nodes: BTreeMap::new(),
            logical_children: AHashMap::new(),
            ids: ElementIdAllocator::default(),
            scheduler: Scheduler::from_config(&config),
            config,
            platform,
            renderer,
            observers: Observers::default(),
            focused: None,
            capture: None,
            tabs: TabManager::default(),
        }
    }

    /// A session backed by in-memory collaborators, plus handles to inspect
    /// them.
    #[must_use]
    pub fn headless(config: UiConfig) -> (Self, HeadlessPlatform, RecordingRenderer) {
        let platform = HeadlessPlatform::new();
        let renderer = RecordingRenderer::new();
        let ui = Self::new(config, Box::new(platform.clone()), Box::new(renderer.clone()));
        (ui, platform, renderer)
    }

    #[must_use]
    pub fn config(&self) -> &UiConfig {
        &self.config
    }

    /// Run one frame: disposal, tasks, layout, render.
    pub fn update(&mut self, now: Instant) -> FrameReport {
        Scheduler::run_frame(self, now)
    }

    /// When the platform loop should call [`Ui::update`] next, or `None`
    /// when there is nothing to do until the next input event.
    #[must_use]
    pub fn next_wakeup(&self, now: Instant) -> Option<Instant> {
        self.scheduler.next_wakeup(now)
    }

    // ---------------------------------------------------------------------
    // Tasks
    // ---------------------------------------------------------------------

    /// Run `callback` during the first frame at or after `due`.
    pub fn schedule_task(
        &mut self,
        due: Instant,
        callback: impl FnMut(&mut Ui, Instant) -> TaskOutcome + 'static,
    ) -> TaskToken {
        self.scheduler.schedule_task(due, callback)
    }

    /// Like [`Ui::schedule_task`], cancelled when `element` is disposed.
    pub fn schedule_element_task(
        &mut self,
        element: ElementId,
        due: Instant,
        callback: impl FnMut(&mut Ui, Instant) -> TaskOutcome + 'static,
    ) -> TaskToken {
        self.scheduler.schedule_element_task(element, due, callback)
    }

    pub fn cancel_task(&mut self, token: TaskToken) -> bool {
        self.scheduler.cancel_task(token)
    }

    #[must_use]
    pub fn is_task_scheduled(&self, token: TaskToken) -> bool {
        self.scheduler.is_scheduled(token)
    }

    /// Run `callback` once at the start of the next frame's task pass.
    pub fn post(&mut self, callback: impl FnOnce(&mut Ui) + 'static) {
        self.scheduler.post(callback);
    }

    // ---------------------------------------------------------------------
    // Observers
    // ---------------------------------------------------------------------

    /// Register an observer for every [`UiEvent`].
    pub fn subscribe(&mut self, observer: impl FnMut(&UiEvent) + 'static) -> ObserverHandle {
        self.observers.subscribe(Box::new(observer))
    }

    /// Remove an observer. Returns whether it was registered.
    pub fn unsubscribe(&mut self, handle: ObserverHandle) -> bool {
        self.observers.unsubscribe(handle)
    }

    pub(crate) fn emit(&mut self, event: UiEvent) {
        self.observers.emit(&event);
    }

    // ---------------------------------------------------------------------
    // Arena
    // ---------------------------------------------------------------------

    pub(crate) fn insert_node(&mut self, data: NodeData) -> ElementId {
        let id = self.ids.allocate();
        trace!(target: "weft.tree", element = %id, kind = ?data.kind(), "element created");
        self.nodes.insert(id, Node::new(id, data));
        id
    }

    pub(crate) fn node(&self, id: ElementId) -> Result<&Node, TreeError> {
        self.nodes.get(&id).ok_or(TreeError::UnknownElement(id))
    }

    pub(crate) fn node_mut(&mut self, id: ElementId) -> Result<&mut Node, TreeError> {
        self.nodes.get_mut(&id).ok_or(TreeError::UnknownElement(id))
    }

    /// Build an element of `kind` with default settings.
    pub fn create_element(&mut self, kind: ElementKind) -> ElementId {
        match kind {
            ElementKind::Leaf => self.create_leaf(Size::ZERO),
            ElementKind::Panel => self.create_panel(),
            ElementKind::Stack => self.create_stack(Orientation::default()),
            ElementKind::Scroll => self.create_scroll(),
            ElementKind::Split => self.create_split(Orientation::default()),
            ElementKind::Limiter => self.create_limiter(SizeLimits::default()),
            ElementKind::VirtualList => {
                self.create_virtual_list(Orientation::Vertical, DEFAULT_ITEM_EXTENT)
            }
            ElementKind::Window => {
                let bounds = Rect::new(
                    0.0,
                    0.0,
                    self.config.new_window_width,
                    self.config.new_window_height,
                );
                self.create_window(bounds)
            }
            ElementKind::Host => self.create_host(),
            ElementKind::Tab => self.create_tab(""),
            ElementKind::TabButton => self.insert_node(NodeData::TabButton(TabButtonData {
                tab: None,
                active: false,
            })),
            ElementKind::DestinationSelector => {
                self.insert_node(NodeData::Selector(SelectorData {
                    host: None,
                    hovered: None,
                }))
            }
        }
    }

    /// A childless element reporting `desired` as its desired size.
    pub fn create_leaf(&mut self, desired: Size) -> ElementId {
        self.insert_node(NodeData::Leaf(LeafData {
            label: None,
            desired,
            item_index: None,
        }))
    }

    /// A panel whose children overlap.
    pub fn create_panel(&mut self) -> ElementId {
        self.insert_node(NodeData::Panel)
    }

    /// Change the desired size a leaf reports.
    pub fn set_desired_size(&mut self, leaf: ElementId, desired: Size) -> Result<(), TreeError> {
        match &mut self.node_mut(leaf)?.data {
            NodeData::Leaf(data) => data.desired = desired,
            _ => return Err(TreeError::NotALeaf(leaf)),
        }
        self.invalidate_desired_size(leaf);
        Ok(())
    }

    /// Attach a text label to a leaf.
    pub fn set_label(&mut self, leaf: ElementId, label: impl Into<String>) -> Result<(), TreeError> {
        match &mut self.node_mut(leaf)?.data {
            NodeData::Leaf(data) => data.label = Some(label.into()),
            _ => return Err(TreeError::NotALeaf(leaf)),
        }
        self.invalidate_visual(leaf);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    #[must_use]
    pub fn kind(&self, element: ElementId) -> Option<ElementKind> {
        self.nodes.get(&element).map(Node::kind)
    }

    /// Whether `element` exists and is not waiting for disposal.
    #[must_use]
    pub fn is_alive(&self, element: ElementId) -> bool {
        self.nodes.contains_key(&element) && !self.scheduler.is_marked_for_disposal(element)
    }

    /// Whether `element` still occupies a slot in the arena.
    #[must_use]
    pub fn exists(&self, element: ElementId) -> bool {
        self.nodes.contains_key(&element)
    }

    #[must_use]
    pub fn element_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.nodes.get(&element).and_then(|n| n.parent)
    }

    /// The logical parent, or `None` if it was never set or no longer exists.
    #[must_use]
    pub fn logical_parent(&self, element: ElementId) -> Option<ElementId> {
        self.nodes
            .get(&element)
            .and_then(|n| n.logical_parent)
            .filter(|lp| self.nodes.contains_key(lp))
    }

    /// Link `element` to a logical parent for focus-scope resolution.
    pub fn set_logical_parent(
        &mut self,
        element: ElementId,
        logical_parent: Option<ElementId>,
    ) -> Result<(), TreeError> {
        if let Some(lp) = logical_parent {
            self.node(lp)?;
        }
        let previous = std::mem::replace(&mut self.node_mut(element)?.logical_parent, logical_parent);
        if let Some(previous) = previous
            && let Some(linked) = self.logical_children.get_mut(&previous)
        {
            linked.retain(|&e| e != element);
        }
        if let Some(lp) = logical_parent {
            self.logical_children.entry(lp).or_default().push(element);
        }
        Ok(())
    }

    /// Children in child order. Empty for leaves and unknown ids.
    #[must_use]
    pub fn children(&self, element: ElementId) -> &[ElementId] {
        self.nodes.get(&element).map(Node::children).unwrap_or_default()
    }

    /// Children back to front.
    #[must_use]
    pub fn z_order(&self, element: ElementId) -> &[ElementId] {
        self.nodes.get(&element).map(Node::z_order).unwrap_or_default()
    }

    /// Layout rectangle in window client coordinates.
    #[must_use]
    pub fn layout_rect(&self, element: ElementId) -> Option<Rect> {
        self.nodes.get(&element).map(|n| n.layout)
    }

    #[must_use]
    pub fn params(&self, element: ElementId) -> Option<LayoutParams> {
        self.nodes.get(&element).map(|n| n.params)
    }

    #[must_use]
    pub fn visibility(&self, element: ElementId) -> Option<Visibility> {
        self.nodes.get(&element).map(|n| n.visibility)
    }

    #[must_use]
    pub fn zindex(&self, element: ElementId) -> Option<i32> {
        self.nodes.get(&element).map(|n| n.zindex)
    }

    /// Label of a leaf, or of a tab or its button.
    #[must_use]
    pub fn label(&self, element: ElementId) -> Option<&str> {
        match &self.nodes.get(&element)?.data {
            NodeData::Leaf(leaf) => leaf.label.as_deref(),
            NodeData::Tab(tab) => Some(&tab.label),
            NodeData::TabButton(button) => self.label(button.tab?),
            _ => None,
        }
    }

    /// Whether `ancestor` is `element` or one of its tree ancestors.
    #[must_use]
    pub fn is_ancestor_or_self(&self, ancestor: ElementId, element: ElementId) -> bool {
        let mut current = Some(element);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Tree ancestors of `element`, nearest first.
    #[must_use]
    pub fn ancestors(&self, element: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut current = self.parent(element);
        while let Some(id) = current {
            out.push(id);
            current = self.parent(id);
        }
        out
    }

    // ---------------------------------------------------------------------
    // Element settings
    // ---------------------------------------------------------------------

    /// Replace the layout parameters of `element`.
    pub fn set_params(&mut self, element: ElementId, params: LayoutParams) -> Result<(), TreeError> {
        let node = self.node_mut(element)?;
        if node.params == params {
            return Ok(());
        }
        node.params = params;
        self.invalidate_desired_size(element);
        Ok(())
    }

    pub fn set_visibility(&mut self, element: ElementId, visibility: Visibility) -> Result<(), TreeError> {
        let node = self.node_mut(element)?;
        if node.visibility == visibility {
            return Ok(());
        }
        let layout_changed = node.visibility.is_layout() != visibility.is_layout();
        node.visibility = visibility;
        if layout_changed {
            self.invalidate_desired_size(element);
        }
        let painted = self.parent(element).unwrap_or(element);
        self.invalidate_visual(painted);
        Ok(())
    }

    /// Change the z-index of `element`, re-sorting its parent's z order.
    pub fn set_zindex(&mut self, element: ElementId, zindex: i32) -> Result<(), TreeError> {
        let node = self.node_mut(element)?;
        if node.zindex == zindex {
            return Ok(());
        }
        node.zindex = zindex;
        let Some(panel) = node.parent else {
            return Ok(());
        };
        let change = CollectionChange::ZIndex { element, zindex };
        self.emit(UiEvent::CollectionChanging { panel, change });
        self.collection_mut(panel)?.set_zindex(element, zindex)?;
        self.emit(UiEvent::CollectionChanged { panel, change });
        self.invalidate_visual(panel);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Structural operations
    // ---------------------------------------------------------------------

    fn collection_mut(&mut self, panel: ElementId) -> Result<&mut crate::ElementCollection, TreeError> {
        self.node_mut(panel)?
            .collection
            .as_mut()
            .ok_or(TreeError::NotAPanel(panel))
    }

    /// Append `child` to `panel`.
    pub fn add_child(&mut self, panel: ElementId, child: ElementId) -> Result<(), TreeError> {
        self.attach(panel, child, None, true).map(|_| ())
    }

    /// Insert `child` into `panel` before `before` (`None` appends).
    pub fn insert_child_before(
        &mut self,
        panel: ElementId,
        child: ElementId,
        before: Option<ElementId>,
    ) -> Result<(), TreeError> {
        self.attach(panel, child, before, true).map(|_| ())
    }

    /// Detach `child` from `panel`. The child is not disposed.
    pub fn remove_child(&mut self, panel: ElementId, child: ElementId) -> Result<(), TreeError> {
        self.detach(panel, child, true).map(|_| ())
    }

    /// Move `child` before `before` (`None` moves it to the end) in child
    /// order. The z order of equal z-indices follows.
    pub fn move_child_before(
        &mut self,
        panel: ElementId,
        child: ElementId,
        before: Option<ElementId>,
    ) -> Result<(), TreeError> {
        let collection = self
            .node(panel)?
            .collection
            .as_ref()
            .ok_or(TreeError::NotAPanel(panel))?;
        let from = collection.index_of(child).ok_or(CollectionError::NotAChild {
            panel,
            element: child,
        })?;
        if let Some(anchor) = before
            && !collection.contains(anchor)
        {
            return Err(CollectionError::AnchorNotAChild { panel, anchor }.into());
        }
        self.emit(UiEvent::CollectionChanging {
            panel,
            change: CollectionChange::Move {
                element: child,
                index: from,
            },
        });
        let to = self.collection_mut(panel)?.move_before(child, before)?;
        self.emit(UiEvent::CollectionChanged {
            panel,
            change: CollectionChange::Move {
                element: child,
                index: to,
            },
        });
        trace!(target: "weft.tree", %panel, %child, from, to, "child moved");
        self.after_structure_change(panel);
        Ok(())
    }

    /// Put `new` in the slot `old` occupies in `parent`. `old` is detached,
    /// not disposed.
    pub fn replace_child(&mut self, parent: ElementId, old: ElementId, new: ElementId) -> Result<(), TreeError> {
        let collection = self
            .node(parent)?
            .collection
            .as_ref()
            .ok_or(TreeError::NotAPanel(parent))?;
        let index = collection.index_of(old).ok_or(CollectionError::NotAChild {
            panel: parent,
            element: old,
        })?;
        if let Some(existing) = self.node(new)?.parent {
            return Err(CollectionError::AlreadyParented {
                element: new,
                parent: existing,
            }
            .into());
        }
        let zindex = self.node(old)?.zindex;
        self.detach(parent, old, true)?;
        let before = self.children(parent).get(index).copied();
        self.attach(parent, new, before, true)?;
        if self.node(new)?.zindex != zindex {
            self.set_zindex(new, zindex)?;
        }
        Ok(())
    }

    /// Insert without checking the ancestor chain twice; `invalidate` is
    /// false only for panels realizing children during their own layout.
    pub(crate) fn attach(
        &mut self,
        panel: ElementId,
        child: ElementId,
        before: Option<ElementId>,
        invalidate: bool,
    ) -> Result<usize, TreeError> {
        let child_node = self.node(child)?;
        if self.scheduler.is_marked_for_disposal(child) {
            return Err(TreeError::UnknownElement(child));
        }
        if let Some(parent) = child_node.parent {
            return Err(CollectionError::AlreadyParented {
                element: child,
                parent,
            }
            .into());
        }
        let zindex = child_node.zindex;
        let panel_node = self.node(panel)?;
        let kind = panel_node.kind();
        let collection = panel_node
            .collection
            .as_ref()
            .ok_or(TreeError::NotAPanel(panel))?;
        if self.is_ancestor_or_self(child, panel) {
            return Err(CollectionError::SelfInsertion { element: child }.into());
        }
        if kind == ElementKind::Split && collection.len() >= 2 {
            return Err(CollectionError::CapacityExceeded { panel, capacity: 2 }.into());
        }
        let index = match before {
            None => collection.len(),
            Some(anchor) => collection
                .index_of(anchor)
                .ok_or(CollectionError::AnchorNotAChild { panel, anchor })?,
        };

        let change = CollectionChange::Insert {
            element: child,
            index,
        };
        self.emit(UiEvent::CollectionChanging { panel, change });
        self.collection_mut(panel)?.insert_before(before, child, zindex)?;
        self.node_mut(child)?.parent = Some(panel);
        self.emit(UiEvent::CollectionChanged { panel, change });
        trace!(target: "weft.tree", %panel, %child, index, "child attached");

        if invalidate {
            self.after_structure_change(panel);
        } else {
            self.invalidate_visual(panel);
        }
        Ok(index)
    }

    pub(crate) fn detach(&mut self, panel: ElementId, child: ElementId, invalidate: bool) -> Result<usize, TreeError> {
        let collection = self
            .node(panel)?
            .collection
            .as_ref()
            .ok_or(TreeError::NotAPanel(panel))?;
        let index = collection.index_of(child).ok_or(CollectionError::NotAChild {
            panel,
            element: child,
        })?;

        let change = CollectionChange::Remove {
            element: child,
            index,
        };
        self.emit(UiEvent::CollectionChanging { panel, change });
        self.collection_mut(panel)?.remove(child)?;
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = None;
        }
        self.emit(UiEvent::CollectionChanged { panel, change });
        self.forget_hover_below(panel, child);
        trace!(target: "weft.tree", %panel, %child, index, "child detached");

        if invalidate {
            self.after_structure_change(panel);
        } else {
            self.invalidate_visual(panel);
        }
        Ok(index)
    }

    fn after_structure_change(&mut self, panel: ElementId) {
        self.invalidate_desired_size(panel);
        self.scheduler.invalidate_children_layout(panel);
        self.invalidate_visual(panel);
    }

    /// Hand `element` to deferred disposal. Returns false if it does not
    /// exist or is already marked.
    pub fn dispose(&mut self, element: ElementId) -> bool {
        if !self.nodes.contains_key(&element) {
            return false;
        }
        let marked = self.scheduler.mark_for_disposal(element);
        if marked {
            debug!(target: "weft.tree", %element, "element marked for disposal");
        }
        marked
    }

    // ---------------------------------------------------------------------
    // Invalidation
    // ---------------------------------------------------------------------

    /// Schedule a new layout of `element` by its parent (or of its own
    /// children when it has no parent).
    pub fn invalidate_layout(&mut self, element: ElementId) {
        match self.parent(element) {
            Some(parent) => self.scheduler.invalidate_children_layout(parent),
            None if self.nodes.contains_key(&element) => {
                self.scheduler.invalidate_children_layout(element);
            }
            None => {}
        }
    }

    /// Mark the visuals of `element` stale.
    pub fn invalidate_visual(&mut self, element: ElementId) {
        if self.nodes.contains_key(&element) {
            self.scheduler.invalidate_visual(element);
        }
    }

    /// Drop cached desired sizes of `element` and its ancestors.
    ///
    /// Children layout is scheduled for each ancestor up to the first one
    /// whose own size does not follow its desired size.
    pub fn invalidate_desired_size(&mut self, element: ElementId) {
        let mut schedule = true;
        let mut current = element;
        loop {
            let Some(node) = self.nodes.get_mut(&current) else {
                break;
            };
            node.desired = None;
            let automatic = node.params.depends_on_desired();
            let is_panel = node.kind().is_panel();
            let Some(parent) = node.parent else {
                if schedule && is_panel {
                    self.scheduler.invalidate_children_layout(current);
                }
                break;
            };
            if schedule {
                self.scheduler.invalidate_children_layout(parent);
            }
            schedule &= automatic;
            current = parent;
        }
    }

    // ---------------------------------------------------------------------
    // Validation
    // ---------------------------------------------------------------------

    /// Check parent/child bookkeeping, host pairing and split cardinality.
    #[must_use]
    pub fn validate(&self) -> InvariantReport {
        let mut report = InvariantReport::default();
        for (&id, node) in &self.nodes {
            if let Some(parent) = node.parent {
                let listed = self
                    .nodes
                    .get(&parent)
                    .and_then(|p| p.collection.as_ref())
                    .is_some_and(|c| c.contains(id));
                if !listed {
                    report.error(
                        InvariantCode::MissingChild,
                        id,
                        Some(parent),
                        format!("{id} names {parent} as parent but is not among its children"),
                    );
                }
            }
            let Some(collection) = &node.collection else {
                continue;
            };
            if !collection.is_consistent() {
                report.error(
                    InvariantCode::CollectionMismatch,
                    id,
                    None,
                    format!("child order and z order of {id} differ"),
                );
            }
            for &child in collection.children() {
                match self.nodes.get(&child) {
                    None => report.error(
                        InvariantCode::DanglingChild,
                        id,
                        Some(child),
                        format!("{id} lists freed element {child}"),
                    ),
                    Some(c) if c.parent != Some(id) => report.error(
                        InvariantCode::ParentMismatch,
                        child,
                        Some(id),
                        format!("{child} is listed by {id} but its parent is {:?}", c.parent),
                    ),
                    Some(_) => {}
                }
            }
            if node.kind() == ElementKind::Split && collection.len() > 2 {
                report.error(
                    InvariantCode::SplitChildren,
                    id,
                    None,
                    format!("split {id} has {} children", collection.len()),
                );
            }
            if let NodeData::Host(_) = node.data {
                self.validate_host(id, &mut report);
            }
            if let NodeData::Tab(tab) = &node.data {
                let paired = self
                    .nodes
                    .get(&tab.button)
                    .is_some_and(|b| matches!(b.data, NodeData::TabButton(TabButtonData { tab: Some(t), .. }) if t == id));
                if !paired {
                    report.error(
                        InvariantCode::TabButtonPairing,
                        id,
                        Some(tab.button),
                        format!("tab {id} and button {} are not paired", tab.button),
                    );
                }
            }
        }
        report
    }
}

impl FrameHost for Ui {
    fn scheduler(&mut self) -> &mut Scheduler<Self> {
        &mut self.scheduler
    }

    fn dispose_element(&mut self, element: ElementId) {
        let Some(node) = self.nodes.get(&element) else {
            return;
        };
        let kind = node.kind();
        debug!(target: "weft.tree", %element, ?kind, "tearing down");

        // Kind-specific teardown first: a tab leaves its host as a pair.
        match kind {
            ElementKind::Tab => self.teardown_tab(element),
            ElementKind::Window => self.teardown_window(element),
            ElementKind::Host => self.teardown_host(element),
            ElementKind::DestinationSelector => self.teardown_selector(element),
            _ => {}
        }
        // Before the children go: a ghost window hands its button back.
        self.forget_drag_subject(element);

        if let Some(parent) = self.parent(element) {
            let detached = self.detach(parent, element, true);
            if detached.is_err()
                && let Some(node) = self.nodes.get_mut(&element)
            {
                node.parent = None;
            }
            report_tree_error(detached, "detach on disposal");
        }

        let children = self
            .nodes
            .get_mut(&element)
            .and_then(|n| n.collection.as_mut())
            .map(|c| c.clear())
            .unwrap_or_default();
        for child in children {
            if let Some(node) = self.nodes.get_mut(&child) {
                node.parent = None;
            }
            self.scheduler.mark_for_disposal(child);
        }

        self.forget_focus(element);
        self.forget_hover(element);
        if self.capture.is_some_and(|c| c.element == element) {
            self.release_mouse_capture();
        }
        for linked in self.logical_children.remove(&element).unwrap_or_default() {
            if let Some(node) = self.nodes.get_mut(&linked)
                && node.logical_parent == Some(element)
            {
                node.logical_parent = None;
            }
        }
        if let Some(lp) = self.nodes.get(&element).and_then(|n| n.logical_parent)
            && let Some(linked) = self.logical_children.get_mut(&lp)
        {
            linked.retain(|&e| e != element);
        }
    }

    fn free_element(&mut self, element: ElementId) {
        if self.nodes.remove(&element).is_some() {
            trace!(target: "weft.tree", %element, "element freed");
        }
    }

    fn update_children_layout(&mut self, panel: ElementId) {
        self.arrange_children(panel);
    }

    fn layout_changed(&mut self, element: ElementId) {
        let Some(node) = self.nodes.get(&element) else {
            return;
        };
        let rect = node.layout;
        let is_panel = node.kind().is_panel();
        self.emit(UiEvent::LayoutChanged { element, rect });
        if is_panel {
            self.arrange_children(element);
        }
    }

    fn render_root(&self, element: ElementId) -> Option<ElementId> {
        let mut current = element;
        loop {
            let node = self.nodes.get(&current)?;
            match node.parent {
                Some(parent) => current = parent,
                None => return node.window().map(|_| current),
            }
        }
    }

    fn render_window(&mut self, window: ElementId) {
        self.paint_window(window);
    }
}

/// Log an edit that can only fail on a corrupted tree.
pub(crate) fn report_tree_error<T>(result: Result<T, TreeError>, operation: &'static str) {
    if let Err(err) = result {
        error!(target: "weft.tree", operation, %err, "tree edit failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use weft_runtime::Duration;

    fn ui() -> Ui {
        Ui::headless(UiConfig::default()).0
    }

    #[test]
    fn attach_sets_parent_and_emits_protocol() {
        let mut ui = ui();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        let _handle = ui.subscribe(move |e| sink.borrow_mut().push(e.clone()));
        let panel = ui.create_panel();
        let leaf = ui.create_leaf(Size::new(10.0, 10.0));
        ui.add_child(panel, leaf).unwrap();
        assert_eq!(ui.parent(leaf), Some(panel));
        let change = CollectionChange::Insert {
            element: leaf,
            index: 0,
        };
        assert_eq!(
            *events.borrow(),
            vec![
                UiEvent::CollectionChanging { panel, change },
                UiEvent::CollectionChanged { panel, change },
            ]
        );
    }

    #[test]
    fn failed_preconditions_change_nothing() {
        let mut ui = ui();
        let a = ui.create_panel();
        let b = ui.create_panel();
        let leaf = ui.create_leaf(Size::ZERO);
        ui.add_child(a, b).unwrap();
        ui.add_child(b, leaf).unwrap();
        assert_eq!(
            ui.add_child(a, leaf),
            Err(TreeError::Collection(CollectionError::AlreadyParented {
                element: leaf,
                parent: b
            }))
        );
        assert_eq!(
            ui.add_child(b, a),
            Err(TreeError::Collection(CollectionError::SelfInsertion { element: a }))
        );
        assert_eq!(ui.add_child(leaf, a), Err(TreeError::NotAPanel(leaf)));
        assert_eq!(
            ui.remove_child(a, leaf),
            Err(TreeError::Collection(CollectionError::NotAChild {
                panel: a,
                element: leaf
            }))
        );
        assert!(ui.validate().is_clean());
    }

    #[test]
    fn split_holds_two_children() {
        let mut ui = ui();
        let split = ui.create_split(Orientation::Horizontal);
        for _ in 0..2 {
            let leaf = ui.create_leaf(Size::ZERO);
            ui.add_child(split, leaf).unwrap();
        }
        let third = ui.create_leaf(Size::ZERO);
        assert_eq!(
            ui.add_child(split, third),
            Err(TreeError::Collection(CollectionError::CapacityExceeded {
                panel: split,
                capacity: 2
            }))
        );
    }

    #[test]
    fn replace_child_keeps_slot() {
        let mut ui = ui();
        let panel = ui.create_stack(Orientation::Vertical);
        let leaves: Vec<_> = (0..3).map(|_| ui.create_leaf(Size::ZERO)).collect();
        for &leaf in &leaves {
            ui.add_child(panel, leaf).unwrap();
        }
        let fresh = ui.create_leaf(Size::ZERO);
        ui.replace_child(panel, leaves[1], fresh).unwrap();
        assert_eq!(ui.children(panel), &[leaves[0], fresh, leaves[2]]);
        assert_eq!(ui.parent(leaves[1]), None);
    }

    #[test]
    fn disposal_detaches_and_frees_subtree() {
        let mut ui = ui();
        let root = ui.create_panel();
        let mid = ui.create_panel();
        let leaf = ui.create_leaf(Size::ZERO);
        ui.add_child(root, mid).unwrap();
        ui.add_child(mid, leaf).unwrap();
        assert!(ui.dispose(mid));
        assert!(!ui.dispose(mid));
        assert!(!ui.is_alive(mid));
        let report = ui.update(Instant::now());
        assert_eq!(report.disposed, 2);
        assert!(ui.children(root).is_empty());
        assert!(!ui.exists(mid));
        assert!(!ui.exists(leaf));
        assert!(ui.validate().is_clean());
    }

    #[test]
    fn logical_parent_is_dangle_safe() {
        let mut ui = ui();
        let a = ui.create_panel();
        let b = ui.create_leaf(Size::ZERO);
        ui.set_logical_parent(b, Some(a)).unwrap();
        assert_eq!(ui.logical_parent(b), Some(a));
        ui.dispose(a);
        ui.update(Instant::now());
        assert_eq!(ui.logical_parent(b), None);
    }

    #[test]
    fn desired_size_invalidation_stops_at_fixed_ancestor() {
        let mut ui = ui();
        let outer = ui.create_panel();
        let inner = ui.create_panel();
        let leaf = ui.create_leaf(Size::new(5.0, 5.0));
        ui.add_child(outer, inner).unwrap();
        ui.add_child(inner, leaf).unwrap();
        ui.update(Instant::now());
        ui.set_desired_size(leaf, Size::new(6.0, 6.0)).unwrap();
        assert!(ui.scheduler.is_children_layout_pending(inner));
        // `inner` fills its parent, so its own rectangle does not depend on
        // what it wants.
        assert!(!ui.scheduler.is_children_layout_pending(outer));
    }

    #[test]
    fn element_tasks_die_with_their_element() {
        let mut ui = ui();
        let start = Instant::now();
        let due = start + Duration::from_millis(50);
        let leaf = ui.create_leaf(Size::new(10.0, 10.0));
        let runs = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&runs);
        let free = ui.schedule_task(due, move |_, _| {
            log.borrow_mut().push("free");
            TaskOutcome::Done
        });
        let log = Rc::clone(&runs);
        let bound = ui.schedule_element_task(leaf, due, move |_, _| {
            log.borrow_mut().push("bound");
            TaskOutcome::Done
        });
        let log = Rc::clone(&runs);
        ui.post(move |_| log.borrow_mut().push("posted"));
        assert_eq!(ui.next_wakeup(start), Some(start));

        ui.dispose(leaf);
        ui.update(start);
        assert_eq!(*runs.borrow(), ["posted"]);
        assert!(ui.is_task_scheduled(free));
        assert!(!ui.is_task_scheduled(bound));

        ui.update(due);
        assert_eq!(*runs.borrow(), ["posted", "free"]);
        assert!(!ui.is_task_scheduled(free));
        assert!(!ui.cancel_task(free));
    }

    #[test]
    fn failed_detach_on_disposal_is_logged() {
        use std::sync::{Arc, Mutex};
        use tracing_subscriber::layer::SubscriberExt;

        struct Errors(Arc<Mutex<Vec<String>>>);
        impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for Errors {
            fn on_event(&self, event: &tracing::Event<'_>, _: tracing_subscriber::layer::Context<'_, S>) {
                if *event.metadata().level() == tracing::Level::ERROR {
                    self.0.lock().unwrap().push(event.metadata().target().to_string());
                }
            }
        }

        let seen = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(Errors(seen.clone()));
        let mut ui = ui();
        let panel = ui.create_panel();
        let leaf = ui.create_leaf(Size::ZERO);
        ui.add_child(panel, leaf).unwrap();
        // Drop the leaf from the collection behind the tree's back.
        ui.nodes.get_mut(&panel).unwrap().collection.as_mut().unwrap().clear();

        tracing::subscriber::with_default(subscriber, || {
            ui.dispose(leaf);
            ui.update(Instant::now());
        });
        assert!(!ui.exists(leaf));
        assert_eq!(*seen.lock().unwrap(), ["weft.tree"]);
    }
}
