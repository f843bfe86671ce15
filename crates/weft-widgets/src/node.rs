#![forbid(unsafe_code)]

//! Arena nodes and the closed set of element kinds.

use std::collections::BTreeMap;

use bitflags::bitflags;
use weft_core::{ElementId, Orientation, Point, Rect, Size, Visibility};
use weft_layout::{LayoutParams, SizeLimits};

use crate::collection::ElementCollection;
use crate::tabs::DropDestination;
use crate::backend::{WindowBackend, WindowStyle};

/// Every kind of element the tree knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// A childless element with a style-supplied desired size.
    Leaf,
    /// Children overlap inside the panel's rectangle.
    Panel,
    /// Children follow each other along an orientation.
    Stack,
    /// Children are offset by a clamped scroll position.
    Scroll,
    /// Two children around a draggable separator.
    Split,
    /// Clamps its children between a minimum and maximum size.
    Limiter,
    /// Realizes only the items of a uniform list that are in view.
    VirtualList,
    /// A top-level platform window.
    Window,
    /// A strip of tab buttons above the active tab.
    Host,
    /// One tab's content.
    Tab,
    /// The clickable, draggable handle of a tab.
    TabButton,
    /// Overlay offering drop destinations while a tab floats.
    DestinationSelector,
}

impl ElementKind {
    /// Whether elements of this kind own an element collection.
    #[must_use]
    pub const fn is_panel(self) -> bool {
        !matches!(self, Self::Leaf | Self::TabButton | Self::DestinationSelector)
    }
}

bitflags! {
    /// Behavioural flags of an element.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ElementFlags: u8 {
        /// Remembers which descendant last held focus.
        const FOCUS_SCOPE = 0b01;
        /// Takes focus when clicked.
        const FOCUSABLE   = 0b10;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LeafData {
    pub label: Option<String>,
    pub desired: Size,
    pub item_index: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ScrollData {
    pub offset: Point,
    pub content: Size,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SplitData {
    pub orientation: Orientation,
    pub position: f64,
    pub separator_size: f64,
    /// Created by the tab manager; its children must be hosts or splits.
    pub managed: bool,
    /// Pointer offset into the separator while it is being dragged.
    pub grab: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct VirtualListData {
    pub orientation: Orientation,
    pub item_count: usize,
    pub item_extent: f64,
    pub offset: f64,
    pub realized: BTreeMap<usize, ElementId>,
}

#[derive(Debug)]
pub(crate) struct WindowData {
    pub backend: Box<dyn WindowBackend>,
    pub style: WindowStyle,
    pub hovered: Vec<ElementId>,
    pub closed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HostData {
    pub strip: ElementId,
    pub contents: ElementId,
    pub active: Option<ElementId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TabData {
    pub label: String,
    pub button: ElementId,
    pub host: Option<ElementId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TabButtonData {
    pub tab: Option<ElementId>,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SelectorData {
    pub host: Option<ElementId>,
    pub hovered: Option<DropDestination>,
}

/// Kind-specific state of a node.
#[derive(Debug)]
pub(crate) enum NodeData {
    Leaf(LeafData),
    Panel,
    Stack(Orientation),
    Scroll(ScrollData),
    Split(SplitData),
    Limiter(SizeLimits),
    VirtualList(VirtualListData),
    Window(WindowData),
    Host(HostData),
    Tab(TabData),
    TabButton(TabButtonData),
    Selector(SelectorData),
}

impl NodeData {
    pub(crate) const fn kind(&self) -> ElementKind {
        match self {
            Self::Leaf(_) => ElementKind::Leaf,
            Self::Panel => ElementKind::Panel,
            Self::Stack(_) => ElementKind::Stack,
            Self::Scroll(_) => ElementKind::Scroll,
            Self::Split(_) => ElementKind::Split,
            Self::Limiter(_) => ElementKind::Limiter,
            Self::VirtualList(_) => ElementKind::VirtualList,
            Self::Window(_) => ElementKind::Window,
            Self::Host(_) => ElementKind::Host,
            Self::Tab(_) => ElementKind::Tab,
            Self::TabButton(_) => ElementKind::TabButton,
            Self::Selector(_) => ElementKind::DestinationSelector,
        }
    }
}

/// One element in the arena.
#[derive(Debug)]
pub(crate) struct Node {
    pub data: NodeData,
    /// Owning panel; `None` for windows and detached elements.
    pub parent: Option<ElementId>,
    /// Non-owning link used for focus-scope resolution.
    pub logical_parent: Option<ElementId>,
    pub layout: Rect,
    pub params: LayoutParams,
    pub visibility: Visibility,
    pub zindex: i32,
    pub flags: ElementFlags,
    /// Last focused descendant, for focus scopes.
    pub scope_focus: Option<ElementId>,
    pub collection: Option<ElementCollection>,
    /// Cached `(available, desired)` pair.
    pub desired: Option<(Size, Size)>,
}

impl Node {
    pub(crate) fn new(id: ElementId, data: NodeData) -> Self {
        let collection = data.kind().is_panel().then(|| ElementCollection::new(id));
        Self {
            data,
            parent: None,
            logical_parent: None,
            layout: Rect::default(),
            params: LayoutParams::fill(),
            visibility: Visibility::FULL,
            zindex: 0,
            flags: ElementFlags::empty(),
            scope_focus: None,
            collection,
            desired: None,
        }
    }

    pub(crate) const fn kind(&self) -> ElementKind {
        self.data.kind()
    }

    pub(crate) fn children(&self) -> &[ElementId] {
        self.collection
            .as_ref()
            .map(ElementCollection::children)
            .unwrap_or_default()
    }

    pub(crate) fn z_order(&self) -> &[ElementId] {
        self.collection
            .as_ref()
            .map(ElementCollection::z_order)
            .unwrap_or_default()
    }

    pub(crate) fn host(&self) -> Option<&HostData> {
        match &self.data {
            NodeData::Host(host) => Some(host),
            _ => None,
        }
    }

    pub(crate) fn tab(&self) -> Option<&TabData> {
        match &self.data {
            NodeData::Tab(tab) => Some(tab),
            _ => None,
        }
    }

    pub(crate) fn split(&self) -> Option<&SplitData> {
        match &self.data {
            NodeData::Split(split) => Some(split),
            _ => None,
        }
    }

    pub(crate) fn window(&self) -> Option<&WindowData> {
        match &self.data {
            NodeData::Window(window) => Some(window),
            _ => None,
        }
    }

    pub(crate) fn window_mut(&mut self) -> Option<&mut WindowData> {
        match &mut self.data {
            NodeData::Window(window) => Some(window),
            _ => None,
        }
    }
}
