//! Per-frame pass configuration: which algorithm runs, where it is injected
//! and which host inputs it needs.

use bitflags::bitflags;

use super::constants::ShaderPass;
use crate::renderer::graph::RenderStage;
use crate::resources::aom::{
    AmbientOcclusionMode, AmbientOcclusionSettings, AomSettings, DepthSource, RenderingPath,
};

bitflags! {
    /// Host prepasses a pass depends on.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct PassInput: u8 {
        const DEPTH  = 1 << 0;
        const NORMAL = 1 << 1;
        const COLOR  = 1 << 2;
    }
}

/// Active algorithm and its parameter block.
#[derive(Clone, Copy)]
pub struct EffectVariant<'a> {
    pub mode: AmbientOcclusionMode,
    pub pass: ShaderPass,
    pub settings: &'a dyn AmbientOcclusionSettings,
}

impl std::fmt::Debug for EffectVariant<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectVariant")
            .field("mode", &self.mode)
            .field("pass", &self.pass)
            .finish_non_exhaustive()
    }
}

/// Maps the configured mode to its shader pass and parameter block.
///
/// Returns `None` when the mode is `None` or when intensity, radius or
/// falloff is not strictly positive.
#[must_use]
pub fn select_effect(settings: &AomSettings) -> Option<EffectVariant<'_>> {
    let pass = match settings.mode {
        AmbientOcclusionMode::None => return None,
        AmbientOcclusionMode::Ssao => ShaderPass::Ssao,
        AmbientOcclusionMode::Hdao => ShaderPass::Hdao,
        AmbientOcclusionMode::Hbao => ShaderPass::Hbao,
        AmbientOcclusionMode::Gtao => ShaderPass::Gtao,
    };

    let block = settings.active_settings()?;
    block.is_active().then_some(EffectVariant {
        mode: settings.mode,
        pass,
        settings: block,
    })
}

/// Debug visualisation needs the occlusion texture, so it disables
/// after-opaque compositing.
#[inline]
#[must_use]
pub fn is_after_opaque(settings: &AomSettings) -> bool {
    settings.after_opaque && !settings.debug_mode
}

#[must_use]
pub fn injection_stage(path: RenderingPath, after_opaque: bool) -> RenderStage {
    match (path, after_opaque) {
        (RenderingPath::Deferred, true) => RenderStage::AfterOpaques,
        (RenderingPath::Deferred, false) => RenderStage::AfterGbuffer,
        (RenderingPath::Forward, true) => RenderStage::BeforeTransparents,
        (RenderingPath::Forward, false) => RenderStage::AfterPrePasses,
    }
}

/// Deferred always has a normal buffer, and HDAO requires one.
#[must_use]
pub fn effective_depth_source(settings: &AomSettings) -> DepthSource {
    if settings.rendering_path == RenderingPath::Deferred
        || settings.mode == AmbientOcclusionMode::Hdao
    {
        DepthSource::DepthNormals
    } else {
        settings.depth_source
    }
}

#[must_use]
pub fn required_input(depth_source: DepthSource) -> PassInput {
    match depth_source {
        DepthSource::Depth => PassInput::DEPTH,
        DepthSource::DepthNormals => PassInput::NORMAL,
    }
}

/// Everything the main pass needs to know before recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassSetup {
    pub effect_pass: ShaderPass,
    pub stage: RenderStage,
    pub after_opaque: bool,
    pub depth_source: DepthSource,
    pub input: PassInput,
}

impl PassSetup {
    /// `None` when the effect is inactive this frame.
    #[must_use]
    pub fn resolve(settings: &AomSettings) -> Option<Self> {
        let variant = select_effect(settings)?;
        let after_opaque = is_after_opaque(settings);
        let depth_source = effective_depth_source(settings);

        Some(Self {
            effect_pass: variant.pass,
            stage: injection_stage(settings.rendering_path, after_opaque),
            after_opaque,
            depth_source,
            input: required_input(depth_source),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_mode_selects_nothing() {
        assert!(select_effect(&AomSettings::default()).is_none());
    }

    #[test]
    fn hdao_forces_depth_normals() {
        let settings = AomSettings {
            mode: AmbientOcclusionMode::Hdao,
            ..AomSettings::default()
        };
        let setup = PassSetup::resolve(&settings).unwrap();
        assert_eq!(setup.depth_source, DepthSource::DepthNormals);
        assert_eq!(setup.input, PassInput::NORMAL);
        assert_eq!(setup.effect_pass, ShaderPass::Hdao);
    }
}
