//! Iterative Blur Pass
//!
//! A ping-pong blur of the active color at reduced resolution:
//!
//! ```text
//! color ──► rt1 ──► rt2 ──► rt1 ──► … ──► rt1 ──► color
//!  Begin       Iterate (1 + 2 × blur_passes)      Final
//! ```
//!
//! The blur kernel lives in the material's pass 0; `_SampleOffset` scales
//! the tap distance.

use serde::{Deserialize, Serialize};

use crate::errors::{AomError, Result};
use crate::renderer::graph::{
    Access, FrameData, FrameGraph, LoadAction, Material, RenderNode, RenderStage, StoreAction,
    TransientTextureDesc,
};

const SAMPLE_OFFSET: &str = "_SampleOffset";

/// User-facing blur parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlurSettings {
    /// Ping-pong iterations, `2..=15`.
    pub blur_passes: u32,
    /// Resolution shift, `0..=4` (`screen >> down_sample`).
    pub down_sample: u32,
    /// Tap distance, `0..=10`.
    pub offset: f32,
    pub stage: RenderStage,
    /// Steps relative to `stage`.
    pub stage_offset: i8,
}

impl Default for BlurSettings {
    fn default() -> Self {
        Self {
            blur_passes: 3,
            down_sample: 1,
            offset: 0.2,
            stage: RenderStage::BeforePostProcessing,
            stage_offset: 0,
        }
    }
}

impl BlurSettings {
    #[must_use]
    pub fn clamped(mut self) -> Self {
        self.blur_passes = self.blur_passes.clamp(2, 15);
        self.down_sample = self.down_sample.min(4);
        self.offset = self.offset.clamp(0.0, 10.0);
        self
    }

    /// Size of the temporaries for a `width × height` screen, at least 1×1.
    #[must_use]
    pub fn target_size(&self, width: u32, height: u32) -> (u32, u32) {
        (
            (width >> self.down_sample).max(1),
            (height >> self.down_sample).max(1),
        )
    }

    /// Total blits recorded by the iterate pass.
    #[inline]
    #[must_use]
    pub fn iterate_blit_count(&self) -> usize {
        1 + 2 * self.blur_passes as usize
    }
}

pub struct BlurPass {
    material: Option<Material>,
    settings: BlurSettings,
}

impl BlurPass {
    pub const BEGIN: &'static str = "Blur Pass Begin";
    pub const ITERATE: &'static str = "Blur Pass Iterate";
    pub const FINAL: &'static str = "Blur Pass Final";

    #[must_use]
    pub fn new(material: Option<Material>, settings: BlurSettings) -> Self {
        Self {
            material,
            settings: settings.clamped(),
        }
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &BlurSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: BlurSettings) {
        self.settings = settings.clamped();
    }

    #[inline]
    #[must_use]
    pub fn material(&self) -> Option<&Material> {
        self.material.as_ref()
    }

    pub fn set_material(&mut self, material: Option<Material>) {
        self.material = material;
    }
}

impl RenderNode for BlurPass {
    fn name(&self) -> &'static str {
        "BlurPass"
    }

    fn stage(&self) -> RenderStage {
        self.settings.stage.offset(self.settings.stage_offset)
    }

    fn record(&mut self, graph: &mut FrameGraph, frame: &mut FrameData) -> Result<()> {
        let material = self
            .material
            .as_mut()
            .ok_or(AomError::MissingMaterial { pass: "BlurPass" })?;
        let material_id = material.id();

        let (w, h) = self
            .settings
            .target_size(frame.camera.pixel_width, frame.camera.pixel_height);
        let format = wgpu::TextureFormat::Rgba8Unorm;
        let rt1 = graph.create_texture(TransientTextureDesc::render_target(
            "_BlurTempRt1",
            w,
            h,
            format,
        ));
        let rt2 = graph.create_texture(TransientTextureDesc::render_target(
            "_BlurTempRt2",
            w,
            h,
            format,
        ));
        let color = frame.resources.active_color;

        graph
            .add_pass(Self::BEGIN)
            .use_texture(color, Access::READ)
            .use_texture(rt1, Access::WRITE)
            .set_render_func(move |ctx| {
                ctx.cmd.blit(
                    color,
                    rt1,
                    LoadAction::DontCare,
                    StoreAction::Store,
                    material_id,
                    0,
                );
            });

        material.set_float(SAMPLE_OFFSET, self.settings.offset);

        let blur_passes = self.settings.blur_passes;
        graph
            .add_pass(Self::ITERATE)
            .use_texture(rt1, Access::READ_WRITE)
            .use_texture(rt2, Access::READ_WRITE)
            .set_render_func(move |ctx| {
                let mut blit = |source, target| {
                    ctx.cmd.blit(
                        source,
                        target,
                        LoadAction::DontCare,
                        StoreAction::Store,
                        material_id,
                        0,
                    );
                };
                blit(rt1, rt2);
                for _ in 0..blur_passes {
                    blit(rt1, rt2);
                    blit(rt2, rt1);
                }
            });

        graph
            .add_pass(Self::FINAL)
            .use_texture(rt1, Access::READ)
            .use_texture(color, Access::WRITE)
            .set_render_func(move |ctx| {
                ctx.cmd.blit(
                    rt1,
                    color,
                    LoadAction::Load,
                    StoreAction::Store,
                    material_id,
                    0,
                );
            });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_are_clamped() {
        let settings = BlurSettings {
            blur_passes: 40,
            down_sample: 9,
            offset: -1.0,
            ..BlurSettings::default()
        }
        .clamped();
        assert_eq!(settings.blur_passes, 15);
        assert_eq!(settings.down_sample, 4);
        assert_eq!(settings.offset, 0.0);

        let settings = BlurSettings {
            blur_passes: 0,
            ..BlurSettings::default()
        }
        .clamped();
        assert_eq!(settings.blur_passes, 2);
    }

    #[test]
    fn target_size_shifts_and_never_collapses() {
        let settings = BlurSettings {
            down_sample: 2,
            ..BlurSettings::default()
        };
        assert_eq!(settings.target_size(1920, 1080), (480, 270));
        assert_eq!(settings.target_size(2, 2), (1, 1));
    }
}
