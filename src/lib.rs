//! # Myth AOM
//!
//! Screen-space ambient occlusion passes for a frame-graph renderer.
//!
//! - [`AmbientOcclusionMaster`]: SSAO, HDAO, HBAO and GTAO behind one
//!   feature, with bilateral, gaussian or kawase blur.
//! - [`BlurPass`]: iterative ping-pong blur of the active color.
//! - [`HbaoPass`]: standalone HBAO post effect.
//!
//! ```rust,ignore
//! use myth_aom::prelude::*;
//!
//! let mut renderer = Renderer::new(DeviceCaps::default());
//! renderer.shaders_mut().register(Shader::new(AOM_SHADER_NAME, 14));
//! renderer.add_feature(Box::new(AmbientOcclusionMaster::new(AomSettings {
//!     mode: AmbientOcclusionMode::Gtao,
//!     ..AomSettings::default()
//! })));
//!
//! let camera = CameraData::perspective(60.0, 1920, 1080, 0.1, 100.0, Vec3::Z, Vec3::ZERO);
//! let output = renderer.begin_frame(camera, FrameTargets::new(1920, 1080)).render()?;
//! ```

pub mod errors;
pub mod renderer;
pub mod resources;

pub use errors::{AomError, Result};
pub use renderer::graph::passes::{
    AmbientOcclusionMaster, AomDebugPass, AomPass, BlurPass, BlurSettings, HbaoPass,
    HbaoPassSettings,
};
pub use renderer::{Renderer, RendererFeature, Shader, ShaderLibrary};
pub use resources::{AomOverrides, AomSettings};

pub mod prelude {
    pub use crate::errors::{AomError, Result};
    pub use crate::renderer::graph::passes::aom::constants::AOM_SHADER_NAME;
    pub use crate::renderer::graph::passes::{
        AmbientOcclusionMaster, BlurPass, BlurSettings, HbaoPass, HbaoPassSettings,
    };
    pub use crate::renderer::graph::{
        CameraData, DeviceCaps, FrameOutput, FrameTargets, Material, RenderStage,
    };
    pub use crate::renderer::{Renderer, Shader};
    pub use crate::resources::aom::*;
    pub use glam::Vec3;
}
