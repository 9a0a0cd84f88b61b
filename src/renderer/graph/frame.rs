//! Per-Frame Host Data
//!
//! [`FrameData`] is the read-mostly context every render node receives while
//! recording: the camera description and the graph handles of the host's
//! frame resources. Nodes may publish outputs back through
//! [`ResourceData`] (e.g. the occlusion texture or a new camera color).

use glam::{Mat4, Vec3};
use smallvec::{SmallVec, smallvec};

use super::graph::TextureHandle;

/// View and projection of one eye.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeMatrices {
    pub view: Mat4,
    pub projection: Mat4,
}

/// Camera description, rebuilt every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraData {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub near_clip: f32,
    pub far_clip: f32,
    pub orthographic: bool,
    /// One entry, or two for single-pass stereo.
    pub eyes: SmallVec<[EyeMatrices; 2]>,
}

impl CameraData {
    /// Mono perspective camera looking from `eye` to `target` (GL clip space).
    #[must_use]
    pub fn perspective(
        fov_degrees: f32,
        pixel_width: u32,
        pixel_height: u32,
        near_clip: f32,
        far_clip: f32,
        eye: Vec3,
        target: Vec3,
    ) -> Self {
        let aspect = pixel_width.max(1) as f32 / pixel_height.max(1) as f32;
        let projection =
            Mat4::perspective_rh_gl(fov_degrees.to_radians(), aspect, near_clip, far_clip);
        let view = Mat4::look_at_rh(eye, target, Vec3::Y);

        Self {
            fov_degrees,
            pixel_width,
            pixel_height,
            near_clip,
            far_clip,
            orthographic: false,
            eyes: smallvec![EyeMatrices { view, projection }],
        }
    }

    #[inline]
    #[must_use]
    pub fn eye_count(&self) -> usize {
        self.eyes.len()
    }
}

/// Graph handles of the host frame resources.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceData {
    /// Scene color produced so far. Passes may replace it.
    pub camera_color: TextureHandle,
    /// Target the current stage renders into.
    pub active_color: TextureHandle,
    pub camera_depth: Option<TextureHandle>,
    pub camera_normals: Option<TextureHandle>,
    /// Occlusion texture published for later lighting passes.
    pub ssao_texture: Option<TextureHandle>,
    /// The active target is the swapchain image.
    pub is_active_target_back_buffer: bool,
}

/// Device capabilities that influence resource formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceCaps {
    /// `R8Unorm` is renderable.
    pub supports_r8: bool,
}

impl Default for DeviceCaps {
    fn default() -> Self {
        Self { supports_r8: true }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameData {
    pub camera: CameraData,
    pub resources: ResourceData,
    pub caps: DeviceCaps,
}
