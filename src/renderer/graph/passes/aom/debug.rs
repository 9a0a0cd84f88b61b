//! AOM debug visualisation: draws the occlusion result over the final image.

use super::constants::ShaderPass;
use super::setup::select_effect;
use crate::errors::{AomError, Result};
use crate::renderer::graph::{
    Access, FrameData, FrameGraph, LoadAction, MaterialId, RenderNode, RenderStage, StoreAction,
};
use crate::resources::aom::AomSettings;

#[derive(Debug, Default)]
pub struct AomDebugPass {
    material: Option<MaterialId>,
}

impl AomDebugPass {
    pub const NAME: &'static str = "Blit AOM Debug";

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the pass should be enqueued this frame.
    pub fn setup(&mut self, material: Option<MaterialId>, settings: &AomSettings) -> bool {
        self.material = material;
        material.is_some() && settings.debug_mode && select_effect(settings).is_some()
    }
}

impl RenderNode for AomDebugPass {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn stage(&self) -> RenderStage {
        RenderStage::AfterPostProcessing
    }

    fn record(&mut self, graph: &mut FrameGraph, frame: &mut FrameData) -> Result<()> {
        let material = self
            .material
            .ok_or(AomError::MissingMaterial { pass: Self::NAME })?;
        let color = frame.resources.active_color;

        graph
            .add_pass(Self::NAME)
            .allow_pass_culling(false)
            .use_texture(color, Access::READ_WRITE)
            .set_render_func(move |ctx| {
                ctx.cmd.blit(
                    color,
                    color,
                    LoadAction::Load,
                    StoreAction::Store,
                    material,
                    ShaderPass::Debug.index(),
                );
            });

        Ok(())
    }
}
