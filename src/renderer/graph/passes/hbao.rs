//! Standalone HBAO Post Effect
//!
//! A self-contained horizon-based AO pass, independent of the Ambient
//! Occlusion Master. It works on full-resolution copies of the active color:
//!
//! ```text
//! color ──copy──► final
//! color ──p0──► ao ──p1──► blur ──p2 (blend)──► final ──► new camera color
//! ```
//!
//! The pass cannot read back the swapchain image, so it refuses to run when
//! the active target is the back buffer.

use serde::{Deserialize, Serialize};

use crate::errors::{AomError, Result};
use crate::renderer::graph::{
    Access, CameraData, FrameData, FrameGraph, LoadAction, Material, RenderNode, RenderStage,
    StoreAction, TransientTextureDesc,
};
use crate::resources::aom_uniforms::{depth_to_view_params, focal_length, fov_correction};

mod properties {
    pub const INTENSITY: &str = "_Intensity";
    pub const RADIUS: &str = "_Radius";
    pub const INV_RADIUS_2: &str = "_InvRadius2";
    pub const MAX_RADIUS: &str = "_MaxRadius";
    pub const ANGLE_BIAS: &str = "_AngleBias";
    pub const MAX_DISTANCE: &str = "_MaxDistance";
    pub const FALL_OFF: &str = "_FallOff";
    pub const BLUR_SIZE: &str = "_BlurSize";
    pub const DEPTH_TO_VIEW_PARAMS: &str = "_DepthToViewParams";
    pub const FOV_CORRECTION: &str = "_FOVCorrection";
    pub const CAMERA_NORMALS_TEXTURE: &str = "_CameraNormalsTexture";
}

/// HBAO post-effect parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HbaoPassSettings {
    /// `0..=5`
    pub intensity: f32,
    /// World-space radius, `0.25..=5`.
    pub radius: f32,
    /// `16..=256`
    pub max_radius_pixels: f32,
    /// `0..=0.5`
    pub angle_bias: f32,
    /// `0..=2000`
    pub max_distance: f32,
    /// `0..=500`
    pub distance_falloff: f32,
    /// `0..=1`
    pub blur_size: f32,
}

impl Default for HbaoPassSettings {
    fn default() -> Self {
        Self {
            intensity: 1.0,
            radius: 1.2,
            max_radius_pixels: 256.0,
            angle_bias: 0.05,
            max_distance: 150.0,
            distance_falloff: 50.0,
            blur_size: 1.0,
        }
    }
}

impl HbaoPassSettings {
    #[must_use]
    pub fn clamped(mut self) -> Self {
        self.intensity = self.intensity.clamp(0.0, 5.0);
        self.radius = self.radius.clamp(0.25, 5.0);
        self.max_radius_pixels = self.max_radius_pixels.clamp(16.0, 256.0);
        self.angle_bias = self.angle_bias.clamp(0.0, 0.5);
        self.max_distance = self.max_distance.clamp(0.0, 2000.0);
        self.distance_falloff = self.distance_falloff.clamp(0.0, 500.0);
        self.blur_size = self.blur_size.clamp(0.0, 1.0);
        self
    }

    /// Writes the material properties for `camera`.
    pub fn apply(&self, material: &mut Material, camera: &CameraData) {
        let focal = focal_length(camera.fov_degrees, camera.pixel_width, camera.pixel_height, 1);

        material.set_float(properties::INTENSITY, self.intensity);
        material.set_float(properties::RADIUS, self.radius);
        material.set_float(properties::INV_RADIUS_2, 1.0 / (self.radius * self.radius));
        material.set_float(properties::MAX_RADIUS, self.max_radius_pixels);
        material.set_float(properties::ANGLE_BIAS, self.angle_bias);
        material.set_float(properties::MAX_DISTANCE, self.max_distance);
        material.set_float(properties::FALL_OFF, self.distance_falloff);
        material.set_float(properties::BLUR_SIZE, self.blur_size);
        material.set_vector(properties::DEPTH_TO_VIEW_PARAMS, depth_to_view_params(focal));
        material.set_float(
            properties::FOV_CORRECTION,
            fov_correction(camera.fov_degrees, camera.pixel_height),
        );
    }
}

pub struct HbaoPass {
    material: Option<Material>,
    settings: HbaoPassSettings,
}

impl HbaoPass {
    pub const NAME: &'static str = "HBAO Pass";
    pub const COPY: &'static str = "HBAO Copy Color";

    #[must_use]
    pub fn new(material: Option<Material>, settings: HbaoPassSettings) -> Self {
        Self {
            material,
            settings: settings.clamped(),
        }
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &HbaoPassSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: HbaoPassSettings) {
        self.settings = settings.clamped();
    }

    #[inline]
    #[must_use]
    pub fn material(&self) -> Option<&Material> {
        self.material.as_ref()
    }

    /// Drops the material.
    pub fn dispose(&mut self) {
        self.material = None;
    }
}

impl RenderNode for HbaoPass {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn stage(&self) -> RenderStage {
        RenderStage::AfterPostProcessing
    }

    fn record(&mut self, graph: &mut FrameGraph, frame: &mut FrameData) -> Result<()> {
        if frame.resources.is_active_target_back_buffer {
            return Err(AomError::UnsupportedTarget {
                pass: Self::NAME,
                reason: "requires an intermediate color texture, active target is the back buffer",
            });
        }
        let material = self
            .material
            .as_mut()
            .ok_or(AomError::MissingMaterial { pass: Self::NAME })?;

        let source = frame.resources.active_color;
        let desc = *graph
            .texture_desc(source)
            .ok_or_else(|| AomError::InvalidTexture(format!("{source:?} (active color)")))?;

        let ao = graph.create_texture(TransientTextureDesc {
            label: "OcclusionTexture0",
            ..desc
        });
        let blur = graph.create_texture(TransientTextureDesc {
            label: "OcclusionTexture1",
            ..desc
        });
        let final_texture = graph.create_texture(TransientTextureDesc {
            label: "OcclusionTexture2",
            ..desc
        });

        graph
            .add_pass(Self::COPY)
            .use_texture(source, Access::READ)
            .use_texture(final_texture, Access::WRITE)
            .set_render_func(move |ctx| ctx.cmd.copy(source, final_texture));

        self.settings.apply(material, &frame.camera);
        let material_id = material.id();
        let normals = frame.resources.camera_normals;

        let mut pass = graph.add_pass(Self::NAME);
        pass.allow_pass_culling(false);
        if let Some(depth) = frame.resources.camera_depth {
            pass.use_texture(depth, Access::READ);
        }
        if let Some(normals) = normals {
            pass.use_texture(normals, Access::READ);
        }
        pass.use_texture(source, Access::READ)
            .use_texture(ao, Access::READ_WRITE)
            .use_texture(blur, Access::READ_WRITE)
            .use_texture(final_texture, Access::READ_WRITE)
            .set_render_func(move |ctx| {
                if let Some(normals) = normals {
                    ctx.cmd.set_material_texture(
                        material_id,
                        properties::CAMERA_NORMALS_TEXTURE,
                        normals,
                    );
                }
                ctx.cmd.blit(source, ao, LoadAction::DontCare, StoreAction::Store, material_id, 0);
                ctx.cmd.blit(ao, blur, LoadAction::DontCare, StoreAction::Store, material_id, 1);
                ctx.cmd.blit(blur, final_texture, LoadAction::Load, StoreAction::Store, material_id, 2);
            });

        frame.resources.camera_color = final_texture;
        frame.resources.active_color = final_texture;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_survive_clamping() {
        let settings = HbaoPassSettings::default();
        assert_eq!(settings.clamped(), settings);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let settings = HbaoPassSettings {
            radius: 0.0,
            max_radius_pixels: 1024.0,
            angle_bias: 0.9,
            ..HbaoPassSettings::default()
        }
        .clamped();
        assert_eq!(settings.radius, 0.25);
        assert_eq!(settings.max_radius_pixels, 256.0);
        assert_eq!(settings.angle_bias, 0.5);
    }
}
