//! Shader interface of the Ambient Occlusion Master shader: pass indices,
//! keyword and property names, and the blur sequencing tables.

use crate::resources::aom::BlurQuality;

pub const AOM_SHADER_NAME: &str = "hidden/aom/ambient_occlusion_master";

/// Slot of the final (full resolution) buffer in the texture tables.
pub const FINAL_TEXTURE_INDEX: usize = 3;

/// Maximum number of AOM buffers (AO, blur, blur 2, final).
pub const MAX_TEXTURES: usize = 4;

/// Full-screen passes of the AOM shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ShaderPass {
    Ssao = 0,
    Hdao = 1,
    Hbao = 2,
    Gtao = 3,
    BilateralBlurHorizontal = 4,
    BilateralBlurVertical = 5,
    BilateralBlurFinal = 6,
    BilateralAfterOpaque = 7,
    GaussianBlurHorizontal = 8,
    GaussianBlurVertical = 9,
    GaussianAfterOpaque = 10,
    KawaseBlur = 11,
    KawaseAfterOpaque = 12,
    Debug = 13,
}

impl ShaderPass {
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self as u32
    }

    /// Passes that composite straight onto the color target.
    #[inline]
    #[must_use]
    pub const fn is_after_opaque(self) -> bool {
        matches!(
            self,
            Self::BilateralAfterOpaque | Self::GaussianAfterOpaque | Self::KawaseAfterOpaque
        )
    }
}

// ─── Blur sequencing ──────────────────────────────────────────────────────────

const BILATERAL_TEXTURE_INDICES: &[usize] = &[0, 1, 2, 3];
const BILATERAL_PASSES: &[ShaderPass] = &[
    ShaderPass::BilateralBlurHorizontal,
    ShaderPass::BilateralBlurVertical,
    ShaderPass::BilateralBlurFinal,
];
const BILATERAL_AFTER_OPAQUE_PASSES: &[ShaderPass] = &[
    ShaderPass::BilateralBlurHorizontal,
    ShaderPass::BilateralBlurVertical,
    ShaderPass::BilateralAfterOpaque,
];

// Gaussian's second stage writes straight into the final slot.
const GAUSSIAN_TEXTURE_INDICES: &[usize] = &[0, 1, 3, 3];
const GAUSSIAN_PASSES: &[ShaderPass] = &[
    ShaderPass::GaussianBlurHorizontal,
    ShaderPass::GaussianBlurVertical,
];
const GAUSSIAN_AFTER_OPAQUE_PASSES: &[ShaderPass] = &[
    ShaderPass::GaussianBlurHorizontal,
    ShaderPass::GaussianAfterOpaque,
];

const KAWASE_TEXTURE_INDICES: &[usize] = &[0, 3];
const KAWASE_PASSES: &[ShaderPass] = &[ShaderPass::KawaseBlur];
const KAWASE_AFTER_OPAQUE_PASSES: &[ShaderPass] = &[ShaderPass::KawaseAfterOpaque];

/// Blur passes of one quality level. Pass `i` reads
/// `texture_indices[i]` and writes `texture_indices[i + 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlurSequence {
    pub texture_indices: &'static [usize],
    pub passes: &'static [ShaderPass],
}

impl BlurSequence {
    #[must_use]
    pub const fn new(quality: BlurQuality, after_opaque: bool) -> Self {
        match quality {
            BlurQuality::High => Self {
                texture_indices: BILATERAL_TEXTURE_INDICES,
                passes: if after_opaque {
                    BILATERAL_AFTER_OPAQUE_PASSES
                } else {
                    BILATERAL_PASSES
                },
            },
            BlurQuality::Medium => Self {
                texture_indices: GAUSSIAN_TEXTURE_INDICES,
                passes: if after_opaque {
                    GAUSSIAN_AFTER_OPAQUE_PASSES
                } else {
                    GAUSSIAN_PASSES
                },
            },
            BlurQuality::Low => Self {
                texture_indices: KAWASE_TEXTURE_INDICES,
                passes: if after_opaque {
                    KAWASE_AFTER_OPAQUE_PASSES
                } else {
                    KAWASE_PASSES
                },
            },
        }
    }

    /// `(source slot, target slot, shader pass)` per blit.
    pub fn steps(&self) -> impl Iterator<Item = (usize, usize, ShaderPass)> + '_ {
        self.passes
            .iter()
            .enumerate()
            .map(|(i, pass)| (self.texture_indices[i], self.texture_indices[i + 1], *pass))
    }

    /// Distinct buffer slots the sequence touches, in ascending order.
    #[must_use]
    pub fn used_slots(&self) -> smallvec::SmallVec<[usize; MAX_TEXTURES]> {
        let mut slots: smallvec::SmallVec<[usize; MAX_TEXTURES]> = smallvec::SmallVec::new();
        for (source, target, _) in self.steps() {
            for slot in [source, target] {
                if !slots.contains(&slot) {
                    slots.push(slot);
                }
            }
        }
        slots.sort_unstable();
        slots
    }
}

// ─── Keywords ─────────────────────────────────────────────────────────────────

pub mod keywords {
    pub const ORTHOGRAPHIC_CAMERA: &str = "_ORTHOGRAPHIC_PROJECTION";

    pub const PSEUDO_RANDOM_NOISE: &str = "_PSEUDO_RANDOM_NOISE";
    pub const BLUE_NOISE: &str = "_BLUE_NOISE";

    pub const SOURCE_DEPTH_LOW: &str = "_DEPTH_NORMALS_LOW";
    pub const SOURCE_DEPTH_MEDIUM: &str = "_DEPTH_NORMALS_MEDIUM";
    pub const SOURCE_DEPTH_HIGH: &str = "_DEPTH_NORMALS_HIGH";
    pub const SOURCE_DEPTH_NORMALS: &str = "_DEPTH_NORMALS_PREPASS";
    pub const HDAO_USE_NORMALS: &str = "_HDAO_USE_NORMALS";

    pub const SAMPLE_COUNT_LOW: &str = "_SAMPLE_COUNT_LOW";
    pub const SAMPLE_COUNT_MEDIUM: &str = "_SAMPLE_COUNT_MEDIUM";
    pub const SAMPLE_COUNT_HIGH: &str = "_SAMPLE_COUNT_HIGH";
    pub const SAMPLE_COUNT_ULTRA: &str = "_SAMPLE_COUNT_ULTRA";

    pub const DIRECTIONS_2: &str = "_DIRECTIONS_2";
    pub const DIRECTIONS_4: &str = "_DIRECTIONS_4";
    pub const DIRECTIONS_6: &str = "_DIRECTIONS_6";

    pub const SAMPLES_2: &str = "_SAMPLES_2";
    pub const SAMPLES_4: &str = "_SAMPLES_4";
    pub const SAMPLES_6: &str = "_SAMPLES_6";
    pub const SAMPLES_8: &str = "_SAMPLES_8";
    pub const SAMPLES_12: &str = "_SAMPLES_12";
    pub const SAMPLES_16: &str = "_SAMPLES_16";

    /// Global keyword read by lit shaders.
    pub const SCREEN_SPACE_OCCLUSION: &str = "_SCREEN_SPACE_OCCLUSION";

    /// Every keyword owned by a single algorithm.
    pub const EFFECT_KEYWORDS: &[&str] = &[
        HDAO_USE_NORMALS,
        SAMPLE_COUNT_LOW,
        SAMPLE_COUNT_MEDIUM,
        SAMPLE_COUNT_HIGH,
        SAMPLE_COUNT_ULTRA,
        DIRECTIONS_2,
        DIRECTIONS_4,
        DIRECTIONS_6,
        SAMPLES_2,
        SAMPLES_4,
        SAMPLES_6,
        SAMPLES_8,
        SAMPLES_12,
        SAMPLES_16,
    ];
}

// ─── Properties ───────────────────────────────────────────────────────────────

pub mod properties {
    pub const SSAO_PARAMETERS: &str = "_SsaoParameters";
    pub const HDAO_PARAMETERS: &str = "_HdaoParameters";
    pub const HDAO_PARAMETERS_2: &str = "_HdaoParameters2";
    pub const HBAO_PARAMETERS: &str = "_HbaoParameters";
    pub const HBAO_PARAMETERS_2: &str = "_HbaoParameters2";
    pub const GTAO_PARAMETERS: &str = "_GtaoParameters";
    pub const GTAO_PARAMETERS_2: &str = "_GtaoParameters2";
    pub const DEPTH_TO_VIEW_PARAMS: &str = "_DepthToViewParams";

    pub const DOWNSAMPLE: &str = "_Downsample";
    pub const SOURCE_SIZE: &str = "_SourceSize";

    pub const PROJECTION_PARAMS_2: &str = "_ProjectionParams2";
    pub const CAMERA_VIEW_PROJECTIONS: &str = "_CameraViewProjections";
    pub const CAMERA_VIEW_TOP_LEFT_CORNER: &str = "_CameraViewTopLeftCorner";
    pub const CAMERA_VIEW_X_EXTENT: &str = "_CameraViewXExtent";
    pub const CAMERA_VIEW_Y_EXTENT: &str = "_CameraViewYExtent";
    pub const CAMERA_VIEW_Z_EXTENT: &str = "_CameraViewZExtent";

    pub const BLUE_NOISE_PARAMETERS: &str = "_AOMBlueNoiseParameters";
    pub const BLUE_NOISE_TEXTURE: &str = "_BlueNoiseTexture";
    pub const CAMERA_NORMALS_TEXTURE: &str = "_CameraNormalsTexture";

    /// Global occlusion texture sampled by lit shaders.
    pub const AO_TEXTURE: &str = "_ScreenSpaceOcclusionTexture";
    /// Global `(1, 0, 0, direct lighting strength)`.
    pub const AMBIENT_OCCLUSION_PARAM: &str = "_AmbientOcclusionParam";
}
