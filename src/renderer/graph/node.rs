//! Render Node Trait
//!
//! A render node declares one or more frame-graph passes for the current
//! frame. Nodes are owned by their feature and borrowed by the
//! [`FrameBuilder`](super::builder::FrameBuilder) for the duration of a frame.

use super::frame::FrameData;
use super::graph::FrameGraph;
use super::stage::RenderStage;
use crate::errors::Result;

pub trait RenderNode {
    /// Returns node name, used for debugging and logging
    fn name(&self) -> &'static str;

    /// Injection point of the node.
    fn stage(&self) -> RenderStage;

    /// Declares the node's passes.
    ///
    /// May publish outputs through `frame.resources`. An `Err` skips the node
    /// for this frame only.
    fn record(&mut self, graph: &mut FrameGraph, frame: &mut FrameData) -> Result<()>;
}
