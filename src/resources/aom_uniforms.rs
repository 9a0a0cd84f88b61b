//! AOM GPU Uniform Data
//!
//! Per-algorithm uniform blocks derived from [`AomSettings`](super::aom::AomSettings)
//! and the camera, plus the math helpers that produce them.
//!
//! Every block is `#[repr(C)]` + [`bytemuck::Pod`] so the dirty check can
//! compare the previous and current bundle byte for byte. Keyword selectors
//! (sample and direction counts) are packed next to the vectors, which makes
//! a keyword change dirty the block as well.
//!
//! # Reference Resolution
//!
//! Pixel-space radii are authored against a 540×960 reference and scaled by
//! `sqrt(pixels / reference_pixels)` at runtime.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec4};

use super::aom::{
    AmbientOcclusionMode, GtaoSettings, HbaoSettings, HdaoSettings, NoiseMethod, SsaoSettings,
};

/// Pixel count of the 540×960 reference resolution.
pub const REFERENCE_PIXEL_COUNT: f32 = 540.0 * 960.0;

/// Lower bound of any resolution-scaled pixel radius.
pub const MIN_RADIUS_PIXELS: f32 = 4.0;

/// Threshold above which HDAO samples the normal buffer.
pub const HDAO_NORMAL_INTENSITY_EPSILON: f32 = 0.001;

// ============================================================================
// Math helpers
// ============================================================================

/// `1 / tan(fov / 2)` for a vertical field of view in degrees.
#[inline]
#[must_use]
pub fn inv_half_tan_fov(fov_degrees: f32) -> f32 {
    1.0 / (fov_degrees.to_radians() * 0.5).tan()
}

/// Focal length in normalized device units.
///
/// `x` is corrected by the aspect ratio of the (possibly downsampled) target.
#[must_use]
pub fn focal_length(fov_degrees: f32, width: u32, height: u32, divider: u32) -> Vec2 {
    let inv = inv_half_tan_fov(fov_degrees);
    let divider = divider.max(1) as f32;
    let aspect_correction = (height as f32 / divider) / (width as f32 / divider);
    Vec2::new(inv * aspect_correction, inv)
}

/// Reconstruction vector mapping `uv * depth` to view space:
/// `(2/f.x, 2/f.y, -1/f.x, -1/f.y)`.
#[must_use]
pub fn depth_to_view_params(focal_len: Vec2) -> Vec4 {
    let inv = Vec2::ONE / focal_len;
    Vec4::new(2.0 * inv.x, 2.0 * inv.y, -inv.x, -inv.y)
}

/// Ratio between the target pixel count and the reference pixel count.
#[inline]
#[must_use]
pub fn resolution_ratio(width: u32, height: u32) -> f32 {
    (width as f32 * height as f32) / REFERENCE_PIXEL_COUNT
}

/// Scales a reference pixel radius to the target resolution, never below 4.
#[must_use]
pub fn max_radius_pixels(width: u32, height: u32, reference_pixels: u32) -> f32 {
    (reference_pixels as f32 * resolution_ratio(width, height).sqrt()).max(MIN_RADIUS_PIXELS)
}

/// HDAO ring offset scale: `max(4, 4 * sqrt(ratio))`.
#[must_use]
pub fn hdao_offset_correction(width: u32, height: u32) -> f32 {
    (MIN_RADIUS_PIXELS * resolution_ratio(width, height).sqrt()).max(MIN_RADIUS_PIXELS)
}

/// Projected-radius correction: `height * invHalfTanFOV * 0.25`.
#[must_use]
pub fn fov_correction(fov_degrees: f32, height: u32) -> f32 {
    height as f32 * inv_half_tan_fov(fov_degrees) * 0.25
}

/// Viewport description the uniform blocks are derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformViewport {
    pub fov_degrees: f32,
    pub width: u32,
    pub height: u32,
    /// Resolution divider of the AO buffers (1 or 2).
    pub divider: u32,
}

impl UniformViewport {
    #[must_use]
    pub fn depth_to_view(&self) -> Vec4 {
        depth_to_view_params(focal_length(
            self.fov_degrees,
            self.width,
            self.height,
            self.divider,
        ))
    }
}

// ============================================================================
// GPU uniform blocks
// ============================================================================

/// `_SsaoParameters` + sample-count selector.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SsaoUniforms {
    /// `(intensity, radius, falloff, 0)`
    pub params: Vec4,
    pub sample_count: u32,
    pub(crate) __pad: [u32; 3],
}

impl SsaoUniforms {
    #[must_use]
    pub fn new(settings: &SsaoSettings, noise: NoiseMethod) -> Self {
        // Blue noise converges with fewer samples, so the kernel is widened.
        let radius_multiplier = if noise == NoiseMethod::BlueNoise { 1.5 } else { 1.0 };
        Self {
            params: Vec4::new(
                settings.intensity,
                settings.radius * radius_multiplier,
                settings.falloff,
                0.0,
            ),
            sample_count: settings.samples as u32,
            __pad: [0; 3],
        }
    }
}

/// `_HdaoParameters`, `_HdaoParameters2`, `_DepthToViewParams`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct HdaoUniforms {
    /// `(intensity, reject radius, accept radius, falloff)`
    pub params: Vec4,
    /// `(offset correction, normal intensity, 0, 0)`
    pub params2: Vec4,
    pub depth_to_view: Vec4,
    pub sample_count: u32,
    pub use_normals: u32,
    pub(crate) __pad: [u32; 2],
}

impl HdaoUniforms {
    #[must_use]
    pub fn new(settings: &HdaoSettings, viewport: &UniformViewport) -> Self {
        Self {
            params: Vec4::new(
                settings.intensity,
                settings.radius,
                settings.accept_radius,
                settings.falloff,
            ),
            params2: Vec4::new(
                hdao_offset_correction(viewport.width, viewport.height),
                settings.normal_intensity,
                0.0,
                0.0,
            ),
            depth_to_view: viewport.depth_to_view(),
            sample_count: settings.samples as u32,
            use_normals: u32::from(settings.normal_intensity > HDAO_NORMAL_INTENSITY_EPSILON),
            __pad: [0; 2],
        }
    }
}

/// `_HbaoParameters`, `_HbaoParameters2`, `_DepthToViewParams`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct HbaoUniforms {
    /// `(intensity, radius, 1 / (samples + 1), falloff)`
    pub params: Vec4,
    /// `(max radius px, angle bias, fov correction, 1 / radius²)`
    pub params2: Vec4,
    pub depth_to_view: Vec4,
    pub directions: u32,
    pub samples: u32,
    pub(crate) __pad: [u32; 2],
}

impl HbaoUniforms {
    #[must_use]
    pub fn new(settings: &HbaoSettings, viewport: &UniformViewport) -> Self {
        let samples = settings.samples.count();
        Self {
            params: Vec4::new(
                settings.intensity,
                settings.radius,
                1.0 / (samples as f32 + 1.0),
                settings.falloff,
            ),
            params2: Vec4::new(
                max_radius_pixels(viewport.width, viewport.height, settings.max_radius_pixels),
                settings.angle_bias,
                fov_correction(viewport.fov_degrees, viewport.height),
                1.0 / (settings.radius * settings.radius),
            ),
            depth_to_view: viewport.depth_to_view(),
            directions: settings.directions.count(),
            samples,
            __pad: [0; 2],
        }
    }
}

/// `_GtaoParameters`, `_GtaoParameters2`, `_DepthToViewParams`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GtaoUniforms {
    /// `(intensity, radius, 1 / (samples + 1), falloff)`
    pub params: Vec4,
    /// `(max radius px, 1 / radius², fov correction, directions)`
    pub params2: Vec4,
    pub depth_to_view: Vec4,
    pub samples: u32,
    pub(crate) __pad: [u32; 3],
}

impl GtaoUniforms {
    #[must_use]
    pub fn new(settings: &GtaoSettings, viewport: &UniformViewport) -> Self {
        let samples = settings.samples.count();
        Self {
            params: Vec4::new(
                settings.intensity,
                settings.radius,
                1.0 / (samples as f32 + 1.0),
                settings.falloff,
            ),
            params2: Vec4::new(
                max_radius_pixels(viewport.width, viewport.height, settings.max_radius_pixels),
                1.0 / (settings.radius * settings.radius),
                fov_correction(viewport.fov_degrees, viewport.height),
                settings.directions as f32,
            ),
            depth_to_view: viewport.depth_to_view(),
            samples,
            __pad: [0; 3],
        }
    }
}

// ============================================================================
// Tagged bundle
// ============================================================================

/// The uniform bundle of exactly one algorithm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectUniforms {
    Ssao(SsaoUniforms),
    Hdao(HdaoUniforms),
    Hbao(HbaoUniforms),
    Gtao(GtaoUniforms),
}

impl EffectUniforms {
    /// Algorithm this bundle belongs to.
    #[must_use]
    pub const fn mode(&self) -> AmbientOcclusionMode {
        match self {
            Self::Ssao(_) => AmbientOcclusionMode::Ssao,
            Self::Hdao(_) => AmbientOcclusionMode::Hdao,
            Self::Hbao(_) => AmbientOcclusionMode::Hbao,
            Self::Gtao(_) => AmbientOcclusionMode::Gtao,
        }
    }

    /// Raw bytes as uploaded to the GPU.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Ssao(u) => bytemuck::bytes_of(u),
            Self::Hdao(u) => bytemuck::bytes_of(u),
            Self::Hbao(u) => bytemuck::bytes_of(u),
            Self::Gtao(u) => bytemuck::bytes_of(u),
        }
    }

    /// Byte-equality within the same algorithm. Bundles of different
    /// algorithms are never equal.
    #[must_use]
    pub fn same_bytes(&self, other: &Self) -> bool {
        self.mode() == other.mode() && self.as_bytes() == other.as_bytes()
    }
}
