//! Keyword selection for the AOM material.

use smallvec::SmallVec;

use super::constants::keywords;
use crate::renderer::graph::Material;
use crate::resources::aom::{DepthSource, NoiseMethod, NormalQuality};
use crate::resources::aom_uniforms::EffectUniforms;

/// Inputs of the mode-independent keywords. Compared as a whole to skip
/// redundant keyword writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeneralParameters {
    pub noise_method: NoiseMethod,
    pub orthographic: bool,
    pub downsample: bool,
    pub depth_source: DepthSource,
    pub normal_quality: NormalQuality,
    pub debug_mode: bool,
}

impl GeneralParameters {
    fn reconstructs_normals(&self, quality: NormalQuality) -> bool {
        self.depth_source == DepthSource::Depth && self.normal_quality == quality
    }
}

pub fn update_general_keywords(material: &mut Material, params: &GeneralParameters) {
    material.set_keyword(keywords::ORTHOGRAPHIC_CAMERA, params.orthographic);

    material.set_keyword(
        keywords::SOURCE_DEPTH_LOW,
        params.reconstructs_normals(NormalQuality::Low),
    );
    material.set_keyword(
        keywords::SOURCE_DEPTH_MEDIUM,
        params.reconstructs_normals(NormalQuality::Medium),
    );
    material.set_keyword(
        keywords::SOURCE_DEPTH_HIGH,
        params.reconstructs_normals(NormalQuality::High),
    );
    material.set_keyword(
        keywords::SOURCE_DEPTH_NORMALS,
        params.depth_source == DepthSource::DepthNormals,
    );

    material.set_keyword(
        keywords::PSEUDO_RANDOM_NOISE,
        params.noise_method == NoiseMethod::PseudoRandom,
    );
    material.set_keyword(
        keywords::BLUE_NOISE,
        params.noise_method == NoiseMethod::BlueNoise,
    );
}

/// Keywords enabled by one algorithm's bundle.
#[must_use]
pub fn effect_keywords(uniforms: &EffectUniforms) -> SmallVec<[&'static str; 2]> {
    let mut enabled = SmallVec::new();
    match uniforms {
        EffectUniforms::Ssao(u) => {
            enabled.push(sample_count_keyword(u.sample_count));
        }
        EffectUniforms::Hdao(u) => {
            enabled.push(sample_count_keyword(u.sample_count));
            if u.use_normals != 0 {
                enabled.push(keywords::HDAO_USE_NORMALS);
            }
        }
        EffectUniforms::Hbao(u) => {
            enabled.push(match u.directions {
                2 => keywords::DIRECTIONS_2,
                4 => keywords::DIRECTIONS_4,
                _ => keywords::DIRECTIONS_6,
            });
            enabled.push(samples_keyword(u.samples));
        }
        EffectUniforms::Gtao(u) => {
            enabled.push(samples_keyword(u.samples));
        }
    }
    enabled
}

/// Enables the bundle's keywords and disables every other algorithm keyword,
/// so nothing leaks across a mode switch.
pub fn update_effect_keywords(material: &mut Material, uniforms: &EffectUniforms) {
    let enabled = effect_keywords(uniforms);
    for &keyword in keywords::EFFECT_KEYWORDS {
        material.set_keyword(keyword, enabled.contains(&keyword));
    }
}

// Discriminants of SsaoSamples / HdaoSamples.
fn sample_count_keyword(level: u32) -> &'static str {
    match level {
        0 => keywords::SAMPLE_COUNT_LOW,
        1 => keywords::SAMPLE_COUNT_MEDIUM,
        2 => keywords::SAMPLE_COUNT_HIGH,
        _ => keywords::SAMPLE_COUNT_ULTRA,
    }
}

fn samples_keyword(samples: u32) -> &'static str {
    match samples {
        2 => keywords::SAMPLES_2,
        4 => keywords::SAMPLES_4,
        6 => keywords::SAMPLES_6,
        8 => keywords::SAMPLES_8,
        12 => keywords::SAMPLES_12,
        _ => keywords::SAMPLES_16,
    }
}
