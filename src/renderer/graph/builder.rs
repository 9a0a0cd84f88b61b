//! Frame Builder
//!
//! `FrameBuilder` collects the render nodes of one frame and records them in
//! stage order. Nodes within a stage keep their insertion order.

use smallvec::SmallVec;

use super::frame::FrameData;
use super::graph::FrameGraph;
use super::node::RenderNode;
use super::stage::RenderStage;

struct NodeEntry<'a> {
    stage: RenderStage,
    /// Insertion order within the frame (stable sort key).
    order: u16,
    node: &'a mut dyn RenderNode,
}

/// Collects borrowed render nodes for one frame.
///
/// ```ignore
/// let mut builder = FrameBuilder::new();
/// builder.add_node(&mut aom_pass).add_node(&mut blur_pass);
/// builder.record(&mut graph, &mut frame);
/// ```
pub struct FrameBuilder<'a> {
    nodes: SmallVec<[NodeEntry<'a>; 16]>,
    next_order: u16,
}

impl Default for FrameBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> FrameBuilder<'a> {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: SmallVec::new(),
            next_order: 0,
        }
    }

    /// Adds a node at the stage it reports.
    #[inline]
    pub fn add_node(&mut self, node: &'a mut dyn RenderNode) -> &mut Self {
        let stage = node.stage();
        self.add_node_at(stage, node)
    }

    /// Adds a node at an explicit stage.
    #[inline]
    pub fn add_node_at(&mut self, stage: RenderStage, node: &'a mut dyn RenderNode) -> &mut Self {
        self.nodes.push(NodeEntry {
            stage,
            order: self.next_order,
            node,
        });
        self.next_order = self.next_order.wrapping_add(1);
        self
    }

    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn has_stage(&self, stage: RenderStage) -> bool {
        self.nodes.iter().any(|e| e.stage == stage)
    }

    /// Node names in recording order.
    #[must_use]
    pub fn ordered_names(&self) -> Vec<&'static str> {
        let mut entries: Vec<_> = self
            .nodes
            .iter()
            .map(|e| (e.stage.order(), e.order, e.node.name()))
            .collect();
        entries.sort_unstable_by_key(|(stage, order, _)| (*stage, *order));
        entries.into_iter().map(|(_, _, name)| name).collect()
    }

    /// Records every node into `graph`, in stage order.
    ///
    /// A failing node is logged and skipped; the rest of the frame is still
    /// recorded. Returns the number of nodes that recorded successfully.
    pub fn record(mut self, graph: &mut FrameGraph, frame: &mut FrameData) -> usize {
        self.nodes
            .sort_unstable_by_key(|e| (e.stage.order(), e.order));

        let mut recorded = 0;
        for entry in self.nodes {
            log::debug!(
                "Recording '{}' at {}",
                entry.node.name(),
                entry.stage.name()
            );
            match entry.node.record(graph, frame) {
                Ok(()) => recorded += 1,
                Err(e) => log::error!("{}: {e}", entry.node.name()),
            }
        }
        recorded
    }
}
