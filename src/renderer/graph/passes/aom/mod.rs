//! Ambient Occlusion Master
//!
//! Screen-space ambient occlusion with four interchangeable algorithms
//! (SSAO, HDAO, HBAO, GTAO) sharing one full-screen shader, followed by a
//! quality-dependent blur chain.
//!
//! # Frame flow
//!
//! ```text
//! depth (+ normals) ──► AO pass ──► slot 0 ──► blur chain ──► final slot
//!                                                              │
//!                     after opaque: composite onto color ◄─────┤
//!            otherwise: publish _ScreenSpaceOcclusionTexture ◄─┘
//! ```
//!
//! The feature ([`AmbientOcclusionMaster`]) resolves the settings every frame
//! and enqueues [`AomPass`] at the stage picked by the rendering path, plus
//! [`AomDebugPass`] when debug visualisation is on.

pub mod constants;
pub mod debug;
pub mod feature;
pub mod keywords;
pub mod parameters;
pub mod setup;
pub mod textures;

pub use constants::{BlurSequence, ShaderPass};
pub use debug::AomDebugPass;
pub use feature::AmbientOcclusionMaster;
pub use parameters::{ParameterUpload, ParametersService};
pub use setup::{PassInput, PassSetup};
pub use textures::{AomTextures, TextureLayout, TextureSlot};

use glam::Vec4;
use smallvec::SmallVec;

use self::constants::{keywords as kw, properties, MAX_TEXTURES};
use crate::errors::{AomError, Result};
use crate::renderer::graph::{
    Access, FrameData, FrameGraph, LoadAction, Material, MaterialId, RenderNode, RenderStage,
    StoreAction, TextureHandle,
};
use crate::resources::aom::{AomSettings, DepthSource};
use crate::resources::blue_noise::BlueNoiseSequence;

/// One full-screen draw of the AOM chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlitStep {
    /// `None` for the occlusion pass, which only samples depth and normals.
    pub source: Option<TextureHandle>,
    pub target: TextureHandle,
    pub load: LoadAction,
    pub pass: ShaderPass,
}

/// Resolves the occlusion draw and the blur chain to graph handles.
///
/// Every step discards the target's previous contents except an after-opaque
/// composite, which blends over the loaded color.
pub fn plan_steps(
    textures: &AomTextures,
    sequence: BlurSequence,
    effect_pass: ShaderPass,
) -> Result<SmallVec<[BlitStep; MAX_TEXTURES]>> {
    let slot = |index: usize| {
        textures
            .get(index)
            .ok_or_else(|| AomError::InvalidTexture(format!("AOM buffer slot {index} was not planned")))
    };

    let mut steps = SmallVec::new();
    steps.push(BlitStep {
        source: None,
        target: slot(0)?,
        load: LoadAction::DontCare,
        pass: effect_pass,
    });

    for (source, target, pass) in sequence.steps() {
        steps.push(BlitStep {
            source: Some(slot(source)?),
            target: slot(target)?,
            load: if pass.is_after_opaque() {
                LoadAction::Load
            } else {
                LoadAction::DontCare
            },
            pass,
        });
    }

    Ok(steps)
}

/// Checks `sequence` against `layout`, then declares the buffers and plans
/// the chain. On error nothing has been added to `graph`.
pub fn declare_chain(
    graph: &mut FrameGraph,
    layout: &TextureLayout,
    sequence: BlurSequence,
    effect_pass: ShaderPass,
    active_color: TextureHandle,
) -> Result<(AomTextures, SmallVec<[BlitStep; MAX_TEXTURES]>)> {
    layout.check_sequence(sequence)?;
    let textures = layout.create(graph, active_color);
    let steps = plan_steps(&textures, sequence, effect_pass)?;
    Ok((textures, steps))
}

// ============================================================================
// AomPass
// ============================================================================

/// The main AOM node: occlusion, blur and composite/publish.
pub struct AomPass {
    material: Option<Material>,
    settings: AomSettings,
    setup: Option<PassSetup>,
    params: ParametersService,
    last_upload: ParameterUpload,
    last_layout: Option<TextureLayout>,
}

impl AomPass {
    pub const NAME: &'static str = "Blit AOM";

    #[must_use]
    pub fn new(blue_noise: BlueNoiseSequence) -> Self {
        Self {
            material: None,
            settings: AomSettings::default(),
            setup: None,
            params: ParametersService::new(blue_noise),
            last_upload: ParameterUpload::default(),
            last_layout: None,
        }
    }

    /// Replaces the material. The parameter memo is dropped so the new
    /// material receives a full upload.
    pub fn set_material(&mut self, material: Option<Material>) {
        self.material = material;
        self.params.invalidate();
    }

    #[inline]
    #[must_use]
    pub fn material(&self) -> Option<&Material> {
        self.material.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn material_id(&self) -> Option<MaterialId> {
        self.material.as_ref().map(Material::id)
    }

    /// Configures the next recording. Returns `true` when the pass should be
    /// enqueued: the effect is active.
    pub fn setup(&mut self, settings: &AomSettings) -> bool {
        self.setup = PassSetup::resolve(settings);
        self.settings.clone_from(settings);
        self.setup.is_some()
    }

    #[inline]
    #[must_use]
    pub fn pass_setup(&self) -> Option<PassSetup> {
        self.setup
    }

    /// Parameter groups written by the last recording.
    #[inline]
    #[must_use]
    pub fn last_upload(&self) -> ParameterUpload {
        self.last_upload
    }

    /// Buffer plan of the last recording.
    #[inline]
    #[must_use]
    pub fn last_layout(&self) -> Option<TextureLayout> {
        self.last_layout
    }

    pub(crate) fn release(&mut self) {
        self.material = None;
        self.setup = None;
        self.params.invalidate();
    }
}

impl RenderNode for AomPass {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn stage(&self) -> RenderStage {
        self.setup
            .map_or(RenderStage::AfterPrePasses, |setup| setup.stage)
    }

    fn record(&mut self, graph: &mut FrameGraph, frame: &mut FrameData) -> Result<()> {
        let Some(setup) = self.setup else {
            return Ok(());
        };
        let material = self
            .material
            .as_mut()
            .ok_or(AomError::MissingMaterial { pass: Self::NAME })?;

        let camera = &frame.camera;
        let layout = TextureLayout::plan(
            &self.settings,
            setup.after_opaque,
            camera.pixel_width,
            camera.pixel_height,
            frame.caps.supports_r8,
        );
        let sequence = BlurSequence::new(self.settings.blur_quality, setup.after_opaque);
        let (textures, steps) = declare_chain(
            graph,
            &layout,
            sequence,
            setup.effect_pass,
            frame.resources.active_color,
        )?;

        self.last_upload = self
            .params
            .setup(material, &self.settings, camera, setup.depth_source);
        self.last_layout = Some(layout);

        let normals = match setup.depth_source {
            DepthSource::DepthNormals => {
                if frame.resources.camera_normals.is_none() {
                    log::warn!("AOM: depth-normals requested but the host has no normals texture");
                }
                frame.resources.camera_normals
            }
            DepthSource::Depth => None,
        };

        let material_id = material.id();
        let after_opaque = setup.after_opaque;
        let direct_lighting_strength = self.settings.direct_lighting_strength;
        let camera_color = frame.resources.camera_color;
        let final_texture = textures.final_texture();

        let mut pass = graph.add_pass(Self::NAME);
        pass.allow_pass_culling(false)
            .allow_global_state_modification(true);

        for handle in textures.iter() {
            pass.use_texture(handle, Access::READ_WRITE);
        }
        if let Some(depth) = frame.resources.camera_depth {
            pass.use_texture(depth, Access::READ);
        }
        if let Some(normals) = normals {
            pass.use_texture(normals, Access::READ);
        }
        if !after_opaque && let Some(final_texture) = final_texture {
            pass.set_global_texture_after_pass(final_texture, properties::AO_TEXTURE);
        }

        pass.set_render_func(move |ctx| {
            if let Some(desc) = ctx.texture_desc(camera_color) {
                let (w, h) = (desc.width as f32, desc.height as f32);
                ctx.cmd
                    .set_global_vector(properties::SOURCE_SIZE, Vec4::new(w, h, 1.0 / w, 1.0 / h));
            }
            if let Some(normals) = normals {
                ctx.cmd
                    .set_material_texture(material_id, properties::CAMERA_NORMALS_TEXTURE, normals);
            }

            for step in &steps {
                match step.source {
                    None => ctx.cmd.draw_fullscreen(
                        step.target,
                        step.load,
                        StoreAction::Store,
                        material_id,
                        step.pass.index(),
                    ),
                    Some(source) => ctx.cmd.blit(
                        source,
                        step.target,
                        step.load,
                        StoreAction::Store,
                        material_id,
                        step.pass.index(),
                    ),
                }
            }

            if !after_opaque {
                ctx.cmd.set_global_keyword(kw::SCREEN_SPACE_OCCLUSION, true);
                ctx.cmd.set_global_vector(
                    properties::AMBIENT_OCCLUSION_PARAM,
                    Vec4::new(1.0, 0.0, 0.0, direct_lighting_strength),
                );
            }
        });

        if !after_opaque {
            frame.resources.ssao_texture = final_texture;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::graph::TransientTextureDesc;
    use crate::resources::aom::BlurQuality;

    fn layout(quality: BlurQuality, after_opaque: bool) -> (FrameGraph, AomTextures, TextureHandle) {
        let settings = AomSettings {
            blur_quality: quality,
            ..AomSettings::default()
        };
        let mut graph = FrameGraph::new();
        let color = graph.import_texture(TransientTextureDesc::render_target(
            "color",
            64,
            64,
            wgpu::TextureFormat::Rgba16Float,
        ));
        let textures =
            TextureLayout::plan(&settings, after_opaque, 64, 64, true).create(&mut graph, color);
        (graph, textures, color)
    }

    #[test]
    fn after_opaque_chain_ends_on_color_with_load() {
        let (_graph, textures, color) = layout(BlurQuality::Medium, true);
        let steps = plan_steps(
            &textures,
            BlurSequence::new(BlurQuality::Medium, true),
            ShaderPass::Ssao,
        )
        .unwrap();

        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].source, None);
        assert_eq!(steps[0].load, LoadAction::DontCare);

        let last = steps.last().unwrap();
        assert_eq!(last.target, color);
        assert_eq!(last.load, LoadAction::Load);
        assert_eq!(last.pass, ShaderPass::GaussianAfterOpaque);
    }

    #[test]
    fn published_chain_never_loads() {
        let (_graph, textures, color) = layout(BlurQuality::High, false);
        let steps = plan_steps(
            &textures,
            BlurSequence::new(BlurQuality::High, false),
            ShaderPass::Gtao,
        )
        .unwrap();

        assert_eq!(steps.len(), 4);
        assert!(steps.iter().all(|s| s.load == LoadAction::DontCare));
        assert!(steps.iter().all(|s| s.target != color));
    }

    #[test]
    fn mismatched_sequence_is_rejected() {
        // Planned for Low, replayed with High: slots 1 and 2 are missing.
        let (_graph, textures, _) = layout(BlurQuality::Low, false);
        let result = plan_steps(
            &textures,
            BlurSequence::new(BlurQuality::High, false),
            ShaderPass::Ssao,
        );
        assert!(matches!(result, Err(AomError::InvalidTexture(_))));
    }

    #[test]
    fn mismatched_sequence_declares_no_buffers() {
        let settings = AomSettings {
            blur_quality: BlurQuality::Low,
            ..AomSettings::default()
        };
        let layout = TextureLayout::plan(&settings, false, 64, 64, true);
        let mut graph = FrameGraph::new();
        let color = graph.import_texture(TransientTextureDesc::render_target(
            "color",
            64,
            64,
            wgpu::TextureFormat::Rgba16Float,
        ));

        let result = declare_chain(
            &mut graph,
            &layout,
            BlurSequence::new(BlurQuality::High, false),
            ShaderPass::Ssao,
            color,
        );
        assert!(matches!(result, Err(AomError::InvalidTexture(_))));
        assert_eq!(graph.texture_count(), 1);

        let (textures, steps) = declare_chain(
            &mut graph,
            &layout,
            BlurSequence::new(BlurQuality::Low, false),
            ShaderPass::Ssao,
            color,
        )
        .unwrap();
        assert_eq!(graph.texture_count(), 3);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].target, textures.final_texture().unwrap());
    }
}
