//! Renderer feature wiring the AOM passes into a frame.

use std::any::Any;

use super::constants::AOM_SHADER_NAME;
use super::{AomDebugPass, AomPass};
use crate::errors::{AomError, Result};
use crate::renderer::graph::{FrameBuilder, Material};
use crate::renderer::{FeatureContext, RendererFeature, ShaderLibrary};
use crate::resources::aom::{AomOverrides, AomSettings};
use crate::resources::blue_noise::BlueNoiseSequence;

/// Ambient Occlusion Master feature.
///
/// Holds the default settings and optional per-scene overrides. Every frame
/// the two are merged, and the main pass (plus the debug pass) is enqueued
/// when the resolved settings describe an active effect.
///
/// The shader is looked up lazily: while it is missing the feature logs an
/// error and enqueues nothing, and it retries on the next frame.
pub struct AmbientOcclusionMaster {
    defaults: AomSettings,
    overrides: Option<AomOverrides>,
    resolved: AomSettings,
    pass: AomPass,
    debug_pass: AomDebugPass,
}

impl AmbientOcclusionMaster {
    pub const NAME: &'static str = "AmbientOcclusionMaster";

    #[must_use]
    pub fn new(defaults: AomSettings) -> Self {
        Self::with_blue_noise(defaults, BlueNoiseSequence::default())
    }

    #[must_use]
    pub fn with_blue_noise(defaults: AomSettings, blue_noise: BlueNoiseSequence) -> Self {
        let defaults = defaults.clamped();
        Self {
            resolved: defaults.clone(),
            defaults,
            overrides: None,
            pass: AomPass::new(blue_noise),
            debug_pass: AomDebugPass::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn defaults(&self) -> &AomSettings {
        &self.defaults
    }

    pub fn set_defaults(&mut self, defaults: AomSettings) {
        self.defaults = defaults.clamped();
    }

    pub fn set_overrides(&mut self, overrides: Option<AomOverrides>) {
        self.overrides = overrides;
    }

    #[inline]
    #[must_use]
    pub fn overrides(&self) -> Option<&AomOverrides> {
        self.overrides.as_ref()
    }

    /// Settings used by the most recent frame.
    #[inline]
    #[must_use]
    pub fn resolved_settings(&self) -> &AomSettings {
        &self.resolved
    }

    #[inline]
    #[must_use]
    pub fn pass(&self) -> &AomPass {
        &self.pass
    }

    fn ensure_material(&mut self, shaders: &ShaderLibrary) -> Result<()> {
        if self.pass.material().is_some() {
            return Ok(());
        }
        let shader = shaders
            .find(AOM_SHADER_NAME)
            .ok_or_else(|| AomError::MissingShader(AOM_SHADER_NAME.to_string()))?;
        log::debug!("{}: created material for '{}'", Self::NAME, shader.name());
        self.pass.set_material(Some(Material::new(shader.name())));
        Ok(())
    }
}

impl Default for AmbientOcclusionMaster {
    fn default() -> Self {
        Self::new(AomSettings::default())
    }
}

impl RendererFeature for AmbientOcclusionMaster {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn create(&mut self, shaders: &ShaderLibrary) {
        // Reported as an error once frames start; retried every frame.
        if let Err(e) = self.ensure_material(shaders) {
            log::debug!("{}: {e}", Self::NAME);
        }
    }

    fn add_render_passes<'a>(&'a mut self, builder: &mut FrameBuilder<'a>, ctx: &FeatureContext<'_>) {
        self.resolved = AomSettings::resolve(&self.defaults, self.overrides.as_ref());
        if !self.resolved.is_effect_active() {
            return;
        }
        if let Err(e) = self.ensure_material(ctx.shaders) {
            log::error!("{}: {e}, no passes enqueued", Self::NAME);
            return;
        }

        let Self {
            resolved,
            pass,
            debug_pass,
            ..
        } = self;

        if !pass.setup(resolved) {
            return;
        }
        let material = pass.material_id();
        builder.add_node(pass);

        if debug_pass.setup(material, resolved) {
            builder.add_node(debug_pass);
        }
    }

    fn dispose(&mut self) {
        self.pass.release();
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
