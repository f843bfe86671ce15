#![forbid(unsafe_code)]

//! Size limiters clamp their content between a minimum and a maximum size.

use weft_core::ElementId;
use weft_layout::SizeLimits;

use crate::error::TreeError;
use crate::node::NodeData;
use crate::Ui;

impl Ui {
    /// A limiter enforcing `limits` on its children.
    pub fn create_limiter(&mut self, limits: SizeLimits) -> ElementId {
        self.insert_node(NodeData::Limiter(limits))
    }

    #[must_use]
    pub fn limits(&self, limiter: ElementId) -> Option<SizeLimits> {
        match self.nodes.get(&limiter)?.data {
            NodeData::Limiter(limits) => Some(limits),
            _ => None,
        }
    }

    pub fn set_limits(&mut self, limiter: ElementId, limits: SizeLimits) -> Result<(), TreeError> {
        match &mut self.node_mut(limiter)?.data {
            NodeData::Limiter(current) if *current == limits => return Ok(()),
            NodeData::Limiter(current) => *current = limits,
            _ => return Err(TreeError::NotAPanel(limiter)),
        }
        self.invalidate_desired_size(limiter);
        self.scheduler.invalidate_children_layout(limiter);
        Ok(())
    }
}
