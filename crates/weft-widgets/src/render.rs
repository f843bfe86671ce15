#![forbid(unsafe_code)]

//! The renderer seam and the visual pass.
//!
//! The scheduler coalesces dirty elements to their windows and asks the tree
//! to paint each window once. Painting walks the window subtree back to
//! front (z order), skips elements that are not render-visible or are
//! waiting for disposal, and clips every panel's children to its rectangle.
//! What the primitives look like is the [`Renderer`]'s business.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use weft_core::{ElementId, Orientation, Point, Rect, Size};
use weft_runtime::Scheduler;

use crate::node::{Node, NodeData};
use crate::tabs::DropDestination;
use crate::Ui;

/// What a filled rectangle stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaintRole {
    Background,
    Panel,
    Leaf,
    TabButton,
    ActiveTabButton,
    Separator,
    /// The area a destination selector covers.
    DropZone,
    /// Where the tab would land for the hovered destination.
    DropHighlight,
}

/// Drawing backend used by the visual pass.
pub trait Renderer {
    fn begin_drawing(&mut self, window: ElementId, size: Size);
    fn push_clip(&mut self, rect: Rect);
    fn pop_clip(&mut self);
    fn fill_rect(&mut self, element: ElementId, rect: Rect, role: PaintRole);
    fn draw_text(&mut self, element: ElementId, origin: Point, text: &str);
    fn end_drawing(&mut self, window: ElementId);
}

/// One call recorded by a [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Begin { window: ElementId, size: Size },
    PushClip(Rect),
    PopClip,
    Fill {
        element: ElementId,
        rect: Rect,
        role: PaintRole,
    },
    Text {
        element: ElementId,
        origin: Point,
        text: String,
    },
    End { window: ElementId },
}

/// Renderer that records every call. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    commands: Rc<RefCell<Vec<DrawCommand>>>,
}

impl RecordingRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn commands(&self) -> Vec<DrawCommand> {
        self.commands.borrow().clone()
    }

    pub fn clear(&self) {
        self.commands.borrow_mut().clear();
    }

    /// Windows drawn so far, in drawing order.
    #[must_use]
    pub fn frames(&self) -> Vec<ElementId> {
        self.commands
            .borrow()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Begin { window, .. } => Some(*window),
                _ => None,
            })
            .collect()
    }

    /// Rectangles filled with `role`.
    #[must_use]
    pub fn fills(&self, role: PaintRole) -> Vec<(ElementId, Rect)> {
        self.commands
            .borrow()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Fill {
                    element,
                    rect,
                    role: r,
                } if *r == role => Some((*element, *rect)),
                _ => None,
            })
            .collect()
    }

    fn push(&self, command: DrawCommand) {
        self.commands.borrow_mut().push(command);
    }
}

impl Renderer for RecordingRenderer {
    fn begin_drawing(&mut self, window: ElementId, size: Size) {
        self.push(DrawCommand::Begin { window, size });
    }

    fn push_clip(&mut self, rect: Rect) {
        self.push(DrawCommand::PushClip(rect));
    }

    fn pop_clip(&mut self) {
        self.push(DrawCommand::PopClip);
    }

    fn fill_rect(&mut self, element: ElementId, rect: Rect, role: PaintRole) {
        self.push(DrawCommand::Fill {
            element,
            rect,
            role,
        });
    }

    fn draw_text(&mut self, element: ElementId, origin: Point, text: &str) {
        self.push(DrawCommand::Text {
            element,
            origin,
            text: text.to_owned(),
        });
    }

    fn end_drawing(&mut self, window: ElementId) {
        self.push(DrawCommand::End { window });
    }
}

/// Area a tab dropped at `destination` would take inside `rect`.
#[must_use]
pub fn destination_area(rect: Rect, destination: DropDestination) -> Rect {
    let half = |o: Orientation| (rect.max_along(o) - rect.min_along(o)) * 0.5;
    match destination {
        DropDestination::Combine | DropDestination::NewWindow => rect,
        DropDestination::SplitLeft => Rect::new(rect.left(), rect.top(), half(Orientation::Horizontal), rect.height),
        DropDestination::SplitRight => {
            let w = half(Orientation::Horizontal);
            Rect::new(rect.right() - w, rect.top(), w, rect.height)
        }
        DropDestination::SplitTop => Rect::new(rect.left(), rect.top(), rect.width, half(Orientation::Vertical)),
        DropDestination::SplitBottom => {
            let h = half(Orientation::Vertical);
            Rect::new(rect.left(), rect.bottom() - h, rect.width, h)
        }
    }
}

impl Ui {
    pub(crate) fn paint_window(&mut self, window: ElementId) {
        let Self {
            nodes,
            scheduler,
            renderer,
            ..
        } = self;
        let Some(node) = nodes.get(&window) else {
            return;
        };
        if node.window().is_none_or(|w| w.closed) {
            return;
        }
        let painter = Painter { nodes, scheduler };
        renderer.begin_drawing(window, node.layout.size());
        painter.paint(renderer.as_mut(), window);
        renderer.end_drawing(window);
    }
}

struct Painter<'a> {
    nodes: &'a BTreeMap<ElementId, Node>,
    scheduler: &'a Scheduler<Ui>,
}

impl Painter<'_> {
    fn paint(&self, renderer: &mut dyn Renderer, element: ElementId) {
        let Some(node) = self.nodes.get(&element) else {
            return;
        };
        if !node.visibility.is_render() || self.scheduler.is_marked_for_disposal(element) {
            return;
        }
        let rect = node.layout;
        match &node.data {
            NodeData::Window(_) => renderer.fill_rect(element, rect, PaintRole::Background),
            NodeData::Leaf(leaf) => {
                renderer.fill_rect(element, rect, PaintRole::Leaf);
                if let Some(label) = &leaf.label {
                    renderer.draw_text(element, rect.origin(), label);
                }
            }
            NodeData::TabButton(button) => {
                let role = if button.active {
                    PaintRole::ActiveTabButton
                } else {
                    PaintRole::TabButton
                };
                renderer.fill_rect(element, rect, role);
                let label = button
                    .tab
                    .and_then(|t| self.nodes.get(&t))
                    .and_then(|t| t.tab())
                    .map(|t| t.label.as_str());
                if let Some(label) = label {
                    renderer.draw_text(element, rect.origin(), label);
                }
            }
            NodeData::Selector(selector) => {
                renderer.fill_rect(element, rect, PaintRole::DropZone);
                if let Some(destination) = selector.hovered {
                    renderer.fill_rect(
                        element,
                        destination_area(rect, destination),
                        PaintRole::DropHighlight,
                    );
                }
            }
            NodeData::Panel | NodeData::Host(_) => renderer.fill_rect(element, rect, PaintRole::Panel),
            _ => {}
        }

        if !node.z_order().is_empty() {
            renderer.push_clip(rect);
            for &child in node.z_order() {
                let parent = self.nodes.get(&child).and_then(|c| c.parent);
                assert_eq!(parent, Some(element), "paint: {child} is not a child of {element}");
                self.paint(renderer, child);
            }
            renderer.pop_clip();
        }

        if let NodeData::Split(split) = &node.data {
            let geometry = weft_layout::split_regions(rect, split.orientation, split.position, split.separator_size);
            renderer.fill_rect(element, geometry.separator, PaintRole::Separator);
        }
    }
}
