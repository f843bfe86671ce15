#![forbid(unsafe_code)]

//! Stack panels lay their children out one after another.

use weft_core::{ElementId, Orientation};

use crate::error::TreeError;
use crate::node::NodeData;
use crate::Ui;

impl Ui {
    /// A stack along `orientation`.
    pub fn create_stack(&mut self, orientation: Orientation) -> ElementId {
        self.insert_node(NodeData::Stack(orientation))
    }

    #[must_use]
    pub fn stack_orientation(&self, stack: ElementId) -> Option<Orientation> {
        match self.nodes.get(&stack)?.data {
            NodeData::Stack(o) => Some(o),
            _ => None,
        }
    }

    pub fn set_stack_orientation(&mut self, stack: ElementId, orientation: Orientation) -> Result<(), TreeError> {
        match &mut self.node_mut(stack)?.data {
            NodeData::Stack(o) if *o == orientation => return Ok(()),
            NodeData::Stack(o) => *o = orientation,
            _ => return Err(TreeError::NotAPanel(stack)),
        }
        self.invalidate_desired_size(stack);
        self.scheduler.invalidate_children_layout(stack);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_core::{Rect, Size};
    use weft_layout::LayoutParams;
    use weft_runtime::{Instant, UiConfig};

    #[test]
    fn flipping_orientation_relays_children() {
        let (mut ui, _, _) = Ui::headless(UiConfig::default());
        let window = ui.create_window(Rect::new(0.0, 0.0, 100.0, 100.0));
        let stack = ui.create_stack(Orientation::Horizontal);
        ui.add_child(window, stack).unwrap();
        let a = ui.create_leaf(Size::ZERO);
        let b = ui.create_leaf(Size::ZERO);
        for leaf in [a, b] {
            ui.set_params(leaf, LayoutParams::fill()).unwrap();
            ui.add_child(stack, leaf).unwrap();
        }
        ui.update(Instant::now());
        assert_eq!(ui.layout_rect(b), Some(Rect::new(50.0, 0.0, 50.0, 100.0)));
        ui.set_stack_orientation(stack, Orientation::Vertical).unwrap();
        ui.update(Instant::now());
        assert_eq!(ui.stack_orientation(stack), Some(Orientation::Vertical));
        assert_eq!(ui.layout_rect(b), Some(Rect::new(0.0, 50.0, 100.0, 50.0)));
    }
}
