//! Ambient Occlusion Master (AOM) Configuration
//!
//! This module defines the AOM settings as pure data structures, following the
//! same pattern as the other post-processing settings of the engine: plain
//! serializable values that the render pass reads once per frame.
//!
//! # Layers
//!
//! | Type | Role |
//! |------|------|
//! | [`AomSettings`] | Fully resolved configuration consumed by the passes |
//! | [`AomOverrides`] | Sparse per-scene overrides (every field optional) |
//! | [`SsaoSettings`] … [`GtaoSettings`] | Per-algorithm parameter blocks |
//!
//! Settings are resolved every frame with [`AomSettings::resolve`], so a
//! changed override takes effect on the next recorded frame.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut settings = AomSettings::default();
//! settings.mode = AmbientOcclusionMode::Hbao;
//! settings.blur_quality = BlurQuality::Medium;
//! settings.hbao.set_max_radius_pixels(64);
//!
//! // Or from a JSON document (missing fields keep their defaults)
//! let settings = AomSettings::from_json(r#"{ "mode": "Gtao", "downsample": true }"#)?;
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::Result;

// ============================================================================
// Enumerations
// ============================================================================

/// Ambient occlusion algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AmbientOcclusionMode {
    /// Effect disabled.
    #[default]
    None,
    /// Classic hemisphere sampling SSAO.
    Ssao,
    /// High-definition AO (depth + normal ring sampling).
    Hdao,
    /// Horizon-based AO.
    Hbao,
    /// Ground-truth AO.
    Gtao,
}

impl AmbientOcclusionMode {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Ssao => "SSAO",
            Self::Hdao => "HDAO",
            Self::Hbao => "HBAO",
            Self::Gtao => "GTAO",
        }
    }

    /// Returns all available modes.
    #[must_use]
    pub const fn all() -> &'static [AmbientOcclusionMode] {
        &[Self::None, Self::Ssao, Self::Hdao, Self::Hbao, Self::Gtao]
    }
}

/// Blur applied to the raw occlusion buffer.
///
/// | Quality | Filter | Blit passes | Buffers |
/// |---------|--------|-------------|---------|
/// | `High` | Bilateral | 3 | 4 |
/// | `Medium` | Gaussian | 2 | 3 |
/// | `Low` | Kawase | 1 | 2 |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlurQuality {
    /// Depth-aware bilateral blur.
    #[default]
    High,
    /// Separable gaussian blur.
    Medium,
    /// Single-pass Kawase blur.
    Low,
}

impl BlurQuality {
    /// Whether intermediate buffers may be single channel.
    ///
    /// The bilateral filter packs depth next to occlusion and therefore needs
    /// all four channels.
    #[inline]
    #[must_use]
    pub const fn allows_single_channel(self) -> bool {
        !matches!(self, Self::High)
    }
}

/// Per-pixel sampling noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NoiseMethod {
    #[default]
    InterleavedGradient,
    PseudoRandom,
    /// Precomputed blue-noise texture array, cycled every frame.
    BlueNoise,
}

/// Host rendering path. Decides the injection point of the pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RenderingPath {
    #[default]
    Forward,
    Deferred,
}

/// Where view-space normals come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DepthSource {
    /// Normals reconstructed from depth.
    #[default]
    Depth,
    /// Normals read from the depth-normal prepass.
    DepthNormals,
}

/// Reconstruction quality when normals are derived from depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NormalQuality {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SsaoSamples {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HdaoSamples {
    Low,
    #[default]
    Medium,
    High,
    Ultra,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HbaoDirections {
    #[default]
    Directions2,
    Directions4,
    Directions6,
}

impl HbaoDirections {
    #[must_use]
    pub const fn count(self) -> u32 {
        match self {
            Self::Directions2 => 2,
            Self::Directions4 => 4,
            Self::Directions6 => 6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HbaoSamples {
    Samples2,
    #[default]
    Samples4,
    Samples6,
    Samples8,
}

impl HbaoSamples {
    #[must_use]
    pub const fn count(self) -> u32 {
        match self {
            Self::Samples2 => 2,
            Self::Samples4 => 4,
            Self::Samples6 => 6,
            Self::Samples8 => 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GtaoSamples {
    Samples2,
    #[default]
    Samples4,
    Samples6,
    Samples8,
    Samples12,
    Samples16,
}

impl GtaoSamples {
    #[must_use]
    pub const fn count(self) -> u32 {
        match self {
            Self::Samples2 => 2,
            Self::Samples4 => 4,
            Self::Samples6 => 6,
            Self::Samples8 => 8,
            Self::Samples12 => 12,
            Self::Samples16 => 16,
        }
    }
}

// ============================================================================
// Common capability
// ============================================================================

/// Parameters shared by every AO algorithm.
///
/// An effect is only scheduled when all three are strictly positive.
pub trait AmbientOcclusionSettings {
    fn intensity(&self) -> f32;
    fn radius(&self) -> f32;
    fn falloff(&self) -> f32;

    /// Returns `true` when the effect would produce visible occlusion.
    #[inline]
    fn is_active(&self) -> bool {
        self.intensity() > 0.0 && self.radius() > 0.0 && self.falloff() > 0.0
    }
}

macro_rules! impl_ao_settings {
    ($ty:ty) => {
        impl AmbientOcclusionSettings for $ty {
            #[inline]
            fn intensity(&self) -> f32 {
                self.intensity
            }

            #[inline]
            fn radius(&self) -> f32 {
                self.radius
            }

            #[inline]
            fn falloff(&self) -> f32 {
                self.falloff
            }
        }
    };
}

// ============================================================================
// Per-algorithm settings
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SsaoSettings {
    pub intensity: f32,
    pub radius: f32,
    pub falloff: f32,
    pub samples: SsaoSamples,
}

impl Default for SsaoSettings {
    fn default() -> Self {
        Self {
            intensity: 3.0,
            radius: 0.1,
            falloff: 100.0,
            samples: SsaoSamples::Medium,
        }
    }
}

impl_ao_settings!(SsaoSettings);

/// HDAO settings.
///
/// `radius` is the *reject* radius: samples further than this are ignored.
/// `accept_radius` is the minimum depth delta that counts as occlusion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HdaoSettings {
    pub intensity: f32,
    pub radius: f32,
    pub falloff: f32,
    pub accept_radius: f32,
    /// Weight of the normal-based term. Values at or below `0.001`
    /// disable normal sampling entirely.
    pub normal_intensity: f32,
    pub samples: HdaoSamples,
}

impl Default for HdaoSettings {
    fn default() -> Self {
        Self {
            intensity: 3.0,
            radius: 0.8,
            falloff: 100.0,
            accept_radius: 0.003,
            normal_intensity: 0.1,
            samples: HdaoSamples::Medium,
        }
    }
}

impl_ao_settings!(HdaoSettings);

impl HdaoSettings {
    #[inline]
    #[must_use]
    pub fn uses_normals(&self) -> bool {
        self.normal_intensity > 0.001
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HbaoSettings {
    pub intensity: f32,
    pub radius: f32,
    pub falloff: f32,
    /// Maximum screen-space radius at the 540×960 reference resolution.
    pub max_radius_pixels: u32,
    pub angle_bias: f32,
    pub directions: HbaoDirections,
    pub samples: HbaoSamples,
}

impl Default for HbaoSettings {
    fn default() -> Self {
        Self {
            intensity: 3.0,
            radius: 0.3,
            falloff: 100.0,
            max_radius_pixels: 40,
            angle_bias: 0.1,
            directions: HbaoDirections::Directions2,
            samples: HbaoSamples::Samples4,
        }
    }
}

impl_ao_settings!(HbaoSettings);

impl HbaoSettings {
    /// Sets the reference max radius. Clamped to 4..=256.
    pub fn set_max_radius_pixels(&mut self, pixels: u32) {
        self.max_radius_pixels = pixels.clamp(4, 256);
    }

    /// Sets the horizon angle bias. Clamped to 0.0..=0.9.
    pub fn set_angle_bias(&mut self, bias: f32) {
        self.angle_bias = bias.clamp(0.0, 0.9);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GtaoSettings {
    pub intensity: f32,
    pub radius: f32,
    pub falloff: f32,
    pub max_radius_pixels: u32,
    /// Number of slice directions, 1..=6.
    pub directions: u32,
    pub samples: GtaoSamples,
}

impl Default for GtaoSettings {
    fn default() -> Self {
        Self {
            intensity: 3.0,
            radius: 0.3,
            falloff: 100.0,
            max_radius_pixels: 40,
            directions: 2,
            samples: GtaoSamples::Samples4,
        }
    }
}

impl_ao_settings!(GtaoSettings);

impl GtaoSettings {
    /// Sets the reference max radius. Clamped to 4..=256.
    pub fn set_max_radius_pixels(&mut self, pixels: u32) {
        self.max_radius_pixels = pixels.clamp(4, 256);
    }

    /// Sets the slice direction count. Clamped to 1..=6.
    pub fn set_directions(&mut self, directions: u32) {
        self.directions = directions.clamp(1, 6);
    }
}

// ============================================================================
// AomSettings
// ============================================================================

/// Fully resolved Ambient Occlusion Master configuration.
///
/// # Fields
///
/// | Field                      | Description                                   | Default |
/// |----------------------------|-----------------------------------------------|---------|
/// | `mode`                     | Active algorithm                              | `None` |
/// | `direct_lighting_strength` | How much AO darkens direct lighting           | `0.25` |
/// | `noise_method`             | Per-pixel sampling noise                      | `InterleavedGradient` |
/// | `blur_quality`             | Blur filter                                   | `High` |
/// | `debug_mode`               | Visualise the occlusion buffer                | `false` |
/// | `rendering_path`           | Host rendering path                           | `Forward` |
/// | `after_opaque`             | Composite straight onto the color target      | `true` |
/// | `downsample`               | Half-resolution AO and blur buffers           | `false` |
/// | `depth_source`             | Normal source                                 | `Depth` |
/// | `normal_quality`           | Depth-reconstructed normal quality            | `Medium` |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AomSettings {
    pub mode: AmbientOcclusionMode,

    pub ssao: SsaoSettings,
    pub hdao: HdaoSettings,
    pub hbao: HbaoSettings,
    pub gtao: GtaoSettings,

    pub direct_lighting_strength: f32,
    pub noise_method: NoiseMethod,
    pub blur_quality: BlurQuality,

    pub debug_mode: bool,
    pub rendering_path: RenderingPath,
    pub after_opaque: bool,
    pub downsample: bool,
    pub depth_source: DepthSource,
    pub normal_quality: NormalQuality,
}

impl Default for AomSettings {
    fn default() -> Self {
        Self {
            mode: AmbientOcclusionMode::None,
            ssao: SsaoSettings::default(),
            hdao: HdaoSettings::default(),
            hbao: HbaoSettings::default(),
            gtao: GtaoSettings::default(),
            direct_lighting_strength: 0.25,
            noise_method: NoiseMethod::InterleavedGradient,
            blur_quality: BlurQuality::High,
            debug_mode: false,
            rendering_path: RenderingPath::Forward,
            after_opaque: true,
            downsample: false,
            depth_source: DepthSource::Depth,
            normal_quality: NormalQuality::Medium,
        }
    }
}

impl AomSettings {
    /// Creates new settings with default values (effect disabled).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses settings from a JSON document. Missing fields keep defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        Ok(settings.clamped())
    }

    /// Resolves the effective settings for this frame.
    ///
    /// Every present override replaces the matching default.
    #[must_use]
    pub fn resolve(defaults: &AomSettings, overrides: Option<&AomOverrides>) -> AomSettings {
        let Some(o) = overrides else {
            return defaults.clone();
        };

        AomSettings {
            mode: o.mode.unwrap_or(defaults.mode),
            ssao: o.ssao.unwrap_or(defaults.ssao),
            hdao: o.hdao.unwrap_or(defaults.hdao),
            hbao: o.hbao.unwrap_or(defaults.hbao),
            gtao: o.gtao.unwrap_or(defaults.gtao),
            direct_lighting_strength: o
                .direct_lighting_strength
                .unwrap_or(defaults.direct_lighting_strength),
            noise_method: o.noise_method.unwrap_or(defaults.noise_method),
            blur_quality: o.blur_quality.unwrap_or(defaults.blur_quality),
            debug_mode: o.debug_mode.unwrap_or(defaults.debug_mode),
            rendering_path: o.rendering_path.unwrap_or(defaults.rendering_path),
            after_opaque: o.after_opaque.unwrap_or(defaults.after_opaque),
            downsample: o.downsample.unwrap_or(defaults.downsample),
            depth_source: o.depth_source.unwrap_or(defaults.depth_source),
            normal_quality: o.normal_quality.unwrap_or(defaults.normal_quality),
        }
        .clamped()
    }

    /// Returns a copy with every ranged parameter clamped to its valid range.
    #[must_use]
    pub fn clamped(mut self) -> Self {
        self.direct_lighting_strength = self.direct_lighting_strength.clamp(0.0, 1.0);
        self.hbao.set_max_radius_pixels(self.hbao.max_radius_pixels);
        self.hbao.set_angle_bias(self.hbao.angle_bias);
        self.gtao.set_max_radius_pixels(self.gtao.max_radius_pixels);
        self.gtao.set_directions(self.gtao.directions);
        self
    }

    /// Returns the parameter block of the active mode, or `None` when the
    /// effect is disabled.
    #[must_use]
    pub fn active_settings(&self) -> Option<&dyn AmbientOcclusionSettings> {
        match self.mode {
            AmbientOcclusionMode::None => None,
            AmbientOcclusionMode::Ssao => Some(&self.ssao),
            AmbientOcclusionMode::Hdao => Some(&self.hdao),
            AmbientOcclusionMode::Hbao => Some(&self.hbao),
            AmbientOcclusionMode::Gtao => Some(&self.gtao),
        }
    }

    /// Pass-activation predicate: a mode is selected and its intensity,
    /// radius and falloff are all positive.
    #[must_use]
    pub fn is_effect_active(&self) -> bool {
        self.active_settings().is_some_and(|s| s.is_active())
    }

    /// Resolution divider for the AO and blur buffers.
    #[inline]
    #[must_use]
    pub fn downsample_divider(&self) -> u32 {
        if self.downsample { 2 } else { 1 }
    }
}

// ============================================================================
// AomOverrides
// ============================================================================

/// Sparse overrides layered on top of the default [`AomSettings`].
///
/// Typically owned by a scene or camera volume. Per-algorithm blocks are
/// replaced as a whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AomOverrides {
    pub mode: Option<AmbientOcclusionMode>,
    pub ssao: Option<SsaoSettings>,
    pub hdao: Option<HdaoSettings>,
    pub hbao: Option<HbaoSettings>,
    pub gtao: Option<GtaoSettings>,
    pub direct_lighting_strength: Option<f32>,
    pub noise_method: Option<NoiseMethod>,
    pub blur_quality: Option<BlurQuality>,
    pub debug_mode: Option<bool>,
    pub rendering_path: Option<RenderingPath>,
    pub after_opaque: Option<bool>,
    pub downsample: Option<bool>,
    pub depth_source: Option<DepthSource>,
    pub normal_quality: Option<NormalQuality>,
}

impl AomOverrides {
    /// Parses overrides from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
