//! CPU-side data of the ambient occlusion passes, independent of the GPU:
//! - aom: user settings, per-algorithm blocks and overrides
//! - aom_uniforms: uniform blocks and the math that derives them
//! - blue_noise: per-frame blue-noise tile sequencing
//! - version_tracker: change counters

pub mod aom;
pub mod aom_uniforms;
pub mod blue_noise;
pub mod version_tracker;

pub use aom::{
    AmbientOcclusionMode, AmbientOcclusionSettings, AomOverrides, AomSettings, BlurQuality,
    DepthSource, GtaoSettings, HbaoSettings, HdaoSettings, NoiseMethod, NormalQuality,
    RenderingPath, SsaoSettings,
};
pub use aom_uniforms::EffectUniforms;
pub use blue_noise::{BlueNoiseSample, BlueNoiseSequence, BlueNoiseTexture};
pub use version_tracker::ChangeTracker;
