//! Frame Composer
//!
//! `FrameComposer` is the glue object between the feature setup and graph
//! execution of one frame.
//!
//! # Three-phase frame
//!
//! 1. **Setup**: [`Renderer::begin_frame`](crate::renderer::Renderer::begin_frame)
//!    imports the host targets and lets every feature enqueue its nodes.
//! 2. **Compose**: callers may add extra nodes with [`FrameComposer::add_node`].
//! 3. **Execute**: [`FrameComposer::render`] records the nodes in stage order,
//!    executes the graph, recycles transient textures and releases the
//!    ones that have sat idle too long.
//!
//! ```ignore
//! let output = renderer
//!     .begin_frame(camera, FrameTargets::new(1920, 1080))
//!     .add_node(&mut blur_pass)
//!     .render()?;
//! ```

use super::builder::FrameBuilder;
use super::frame::{FrameData, ResourceData};
use super::graph::{ExecutedGraph, FrameGraph};
use super::node::RenderNode;
use super::transient_pool::{TransientTextureDesc, TransientTexturePool};
use crate::errors::Result;

/// Host render targets available this frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameTargets {
    pub color: TransientTextureDesc,
    pub has_depth: bool,
    pub has_normals: bool,
    /// The camera renders straight into the swapchain image.
    pub color_is_back_buffer: bool,
}

impl FrameTargets {
    pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
    pub const NORMALS_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Snorm;

    /// Off-screen color with depth, without normals.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            color: TransientTextureDesc::render_target(
                "_CameraColorTexture",
                width,
                height,
                Self::COLOR_FORMAT,
            ),
            has_depth: true,
            has_normals: false,
            color_is_back_buffer: false,
        }
    }

    #[must_use]
    pub fn with_normals(mut self, has_normals: bool) -> Self {
        self.has_normals = has_normals;
        self
    }

    #[must_use]
    pub fn with_back_buffer(mut self, is_back_buffer: bool) -> Self {
        self.color_is_back_buffer = is_back_buffer;
        self
    }

    /// Imports the targets into `graph`.
    pub(crate) fn import(&self, graph: &mut FrameGraph) -> ResourceData {
        let color = graph.import_texture(self.color);

        let depth = self.has_depth.then(|| {
            graph.import_texture(TransientTextureDesc {
                format: Self::DEPTH_FORMAT,
                label: "_CameraDepthTexture",
                ..self.color
            })
        });

        let normals = self.has_normals.then(|| {
            graph.import_texture(TransientTextureDesc {
                format: Self::NORMALS_FORMAT,
                label: "_CameraNormalsTexture",
                ..self.color
            })
        });

        ResourceData {
            camera_color: color,
            active_color: color,
            camera_depth: depth,
            camera_normals: normals,
            ssao_texture: None,
            is_active_target_back_buffer: self.color_is_back_buffer,
        }
    }
}

/// Result of one rendered frame.
#[derive(Debug, Clone)]
pub struct FrameOutput {
    pub executed: ExecutedGraph,
    /// Host resources after every node published its outputs.
    pub resources: ResourceData,
    /// Nodes that recorded without error.
    pub recorded_nodes: usize,
}

pub struct FrameComposer<'a> {
    graph: FrameGraph,
    frame: FrameData,
    pool: &'a mut TransientTexturePool,
    builder: FrameBuilder<'a>,
}

impl<'a> FrameComposer<'a> {
    pub(crate) fn new(
        graph: FrameGraph,
        frame: FrameData,
        pool: &'a mut TransientTexturePool,
        builder: FrameBuilder<'a>,
    ) -> Self {
        Self {
            graph,
            frame,
            pool,
            builder,
        }
    }

    /// Adds a caller-owned node at the stage it reports.
    #[inline]
    #[must_use]
    pub fn add_node(mut self, node: &'a mut dyn RenderNode) -> Self {
        self.builder.add_node(node);
        self
    }

    #[inline]
    #[must_use]
    pub fn frame(&self) -> &FrameData {
        &self.frame
    }

    /// Node names in the order they will be recorded.
    #[must_use]
    pub fn scheduled_nodes(&self) -> Vec<&'static str> {
        self.builder.ordered_names()
    }

    /// Records, executes and ends the frame.
    pub fn render(self) -> Result<FrameOutput> {
        let Self {
            mut graph,
            mut frame,
            pool,
            builder,
        } = self;

        let recorded_nodes = builder.record(&mut graph, &mut frame);
        let executed = graph.execute(pool);
        pool.end_frame();

        Ok(FrameOutput {
            executed: executed?,
            resources: frame.resources,
            recorded_nodes,
        })
    }
}
