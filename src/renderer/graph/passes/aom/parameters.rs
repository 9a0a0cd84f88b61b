//! AOM material parameters.
//!
//! Three groups are written each frame:
//!
//! 1. **Camera reconstruction** (every frame): per-eye view-projection and the
//!    view-space frustum corners used to rebuild positions from depth.
//! 2. **General** (on change): noise, projection and normal-source keywords,
//!    `_Downsample`.
//! 3. **Effect** (on change): the active algorithm's uniform bundle and
//!    keywords.
//!
//! The effect memo is keyed by algorithm: a bundle of a different mode never
//! compares equal, so the first frame after a mode switch always uploads.

use glam::{Mat4, Vec3, Vec4};

use super::constants::properties;
use super::keywords::{self, GeneralParameters};
use crate::renderer::graph::material::EyeArray;
use crate::renderer::graph::{CameraData, Material, MaterialTexture};
use crate::resources::aom::{AmbientOcclusionMode, AomSettings, DepthSource, NoiseMethod};
use crate::resources::aom_uniforms::{
    EffectUniforms, GtaoUniforms, HbaoUniforms, HdaoUniforms, SsaoUniforms, UniformViewport,
};
use crate::resources::blue_noise::BlueNoiseSequence;

// ============================================================================
// Camera reconstruction
// ============================================================================

/// Frustum reconstruction data of every eye.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraUniforms {
    pub view_projections: EyeArray<Mat4>,
    pub top_left_corner: EyeArray<Vec4>,
    pub x_extent: EyeArray<Vec4>,
    pub y_extent: EyeArray<Vec4>,
    pub z_extent: EyeArray<Vec4>,
    /// `(1 / near, 0, 0, 0)`
    pub projection_params2: Vec4,
}

impl CameraUniforms {
    #[must_use]
    pub fn new(camera: &CameraData) -> Self {
        let mut uniforms = Self {
            view_projections: EyeArray::new(),
            top_left_corner: EyeArray::new(),
            x_extent: EyeArray::new(),
            y_extent: EyeArray::new(),
            z_extent: EyeArray::new(),
            projection_params2: Vec4::new(1.0 / camera.near_clip, 0.0, 0.0, 0.0),
        };

        for eye in &camera.eyes {
            uniforms
                .view_projections
                .push(eye.projection * eye.view);

            // Rotation-only view: corners are relative to the camera position.
            let mut centered_view = eye.view;
            centered_view.w_axis = Vec4::W;
            let inv = (eye.projection * centered_view).inverse();

            let top_left = inv.project_point3(Vec3::new(-1.0, 1.0, -1.0));
            let top_right = inv.project_point3(Vec3::new(1.0, 1.0, -1.0));
            let bottom_left = inv.project_point3(Vec3::new(-1.0, -1.0, -1.0));
            let far_centre = inv.project_point3(Vec3::new(0.0, 0.0, 1.0));

            uniforms.top_left_corner.push(top_left.extend(0.0));
            uniforms.x_extent.push((top_right - top_left).extend(0.0));
            uniforms.y_extent.push((bottom_left - top_left).extend(0.0));
            uniforms.z_extent.push(far_centre.extend(0.0));
        }

        uniforms
    }

    pub fn upload(&self, material: &mut Material) {
        material.set_vector(properties::PROJECTION_PARAMS_2, self.projection_params2);
        material.set_matrix_array(properties::CAMERA_VIEW_PROJECTIONS, &self.view_projections);
        material.set_vector_array(properties::CAMERA_VIEW_TOP_LEFT_CORNER, &self.top_left_corner);
        material.set_vector_array(properties::CAMERA_VIEW_X_EXTENT, &self.x_extent);
        material.set_vector_array(properties::CAMERA_VIEW_Y_EXTENT, &self.y_extent);
        material.set_vector_array(properties::CAMERA_VIEW_Z_EXTENT, &self.z_extent);
    }
}

// ============================================================================
// Effect bundles
// ============================================================================

/// Derives the active algorithm's bundle. `None` when the mode is `None`.
#[must_use]
pub fn derive_effect_uniforms(settings: &AomSettings, camera: &CameraData) -> Option<EffectUniforms> {
    let viewport = UniformViewport {
        fov_degrees: camera.fov_degrees,
        width: camera.pixel_width,
        height: camera.pixel_height,
        divider: settings.downsample_divider(),
    };

    match settings.mode {
        AmbientOcclusionMode::None => None,
        AmbientOcclusionMode::Ssao => Some(EffectUniforms::Ssao(SsaoUniforms::new(
            &settings.ssao,
            settings.noise_method,
        ))),
        AmbientOcclusionMode::Hdao => Some(EffectUniforms::Hdao(HdaoUniforms::new(
            &settings.hdao,
            &viewport,
        ))),
        AmbientOcclusionMode::Hbao => Some(EffectUniforms::Hbao(HbaoUniforms::new(
            &settings.hbao,
            &viewport,
        ))),
        AmbientOcclusionMode::Gtao => Some(EffectUniforms::Gtao(GtaoUniforms::new(
            &settings.gtao,
            &viewport,
        ))),
    }
}

fn upload_effect(material: &mut Material, uniforms: &EffectUniforms) {
    match uniforms {
        EffectUniforms::Ssao(u) => {
            material.set_vector(properties::SSAO_PARAMETERS, u.params);
        }
        EffectUniforms::Hdao(u) => {
            material.set_vector(properties::HDAO_PARAMETERS, u.params);
            material.set_vector(properties::HDAO_PARAMETERS_2, u.params2);
            material.set_vector(properties::DEPTH_TO_VIEW_PARAMS, u.depth_to_view);
        }
        EffectUniforms::Hbao(u) => {
            material.set_vector(properties::HBAO_PARAMETERS, u.params);
            material.set_vector(properties::HBAO_PARAMETERS_2, u.params2);
            material.set_vector(properties::DEPTH_TO_VIEW_PARAMS, u.depth_to_view);
        }
        EffectUniforms::Gtao(u) => {
            material.set_vector(properties::GTAO_PARAMETERS, u.params);
            material.set_vector(properties::GTAO_PARAMETERS_2, u.params2);
            material.set_vector(properties::DEPTH_TO_VIEW_PARAMS, u.depth_to_view);
        }
    }
    keywords::update_effect_keywords(material, uniforms);
}

// ============================================================================
// Service
// ============================================================================

/// What [`ParametersService::setup`] wrote this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParameterUpload {
    pub general_dirty: bool,
    pub effect_dirty: bool,
    pub blue_noise: bool,
}

/// Cross-frame memo of the last uploaded parameters.
pub struct ParametersService {
    general_memo: Option<GeneralParameters>,
    effect_memo: Option<EffectUniforms>,
    blue_noise: BlueNoiseSequence,
}

impl ParametersService {
    #[must_use]
    pub fn new(blue_noise: BlueNoiseSequence) -> Self {
        Self {
            general_memo: None,
            effect_memo: None,
            blue_noise,
        }
    }

    /// Compares `next` with the memo and stores it. Returns `true` when the
    /// bundle has to be uploaded.
    pub fn is_effect_dirty(&mut self, next: &EffectUniforms) -> bool {
        let dirty = !self
            .effect_memo
            .as_ref()
            .is_some_and(|prev| prev.same_bytes(next));
        self.effect_memo = Some(*next);
        dirty
    }

    fn is_general_dirty(&mut self, next: GeneralParameters) -> bool {
        let dirty = self.general_memo != Some(next);
        self.general_memo = Some(next);
        dirty
    }

    /// Forgets every memo, forcing a full upload next frame.
    pub fn invalidate(&mut self) {
        self.general_memo = None;
        self.effect_memo = None;
    }

    /// Writes this frame's parameters into `material`.
    pub fn setup(
        &mut self,
        material: &mut Material,
        settings: &AomSettings,
        camera: &CameraData,
        depth_source: DepthSource,
    ) -> ParameterUpload {
        let mut upload = ParameterUpload::default();

        CameraUniforms::new(camera).upload(material);

        if settings.noise_method == NoiseMethod::BlueNoise {
            match self.blue_noise.advance(camera.pixel_width, camera.pixel_height) {
                Some(sample) => {
                    material.set_texture(
                        properties::BLUE_NOISE_TEXTURE,
                        MaterialTexture::Asset(sample.texture),
                    );
                    material.set_vector(properties::BLUE_NOISE_PARAMETERS, sample.params);
                    upload.blue_noise = true;
                }
                None => log::warn!("AOM: blue noise selected but no noise textures registered"),
            }
        }

        let general = GeneralParameters {
            noise_method: settings.noise_method,
            orthographic: camera.orthographic,
            downsample: settings.downsample,
            depth_source,
            normal_quality: settings.normal_quality,
            debug_mode: settings.debug_mode,
        };
        if self.is_general_dirty(general) {
            keywords::update_general_keywords(material, &general);
            material.set_float(
                properties::DOWNSAMPLE,
                1.0 / settings.downsample_divider() as f32,
            );
            upload.general_dirty = true;
        }

        if let Some(uniforms) = derive_effect_uniforms(settings, camera)
            && self.is_effect_dirty(&uniforms)
        {
            log::trace!("AOM: uploading {} parameters", uniforms.mode().name());
            upload_effect(material, &uniforms);
            upload.effect_dirty = true;
        }

        upload
    }
}
