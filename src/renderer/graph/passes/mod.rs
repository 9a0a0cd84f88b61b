//! Render node implementations.

pub mod aom;
pub mod blur;
pub mod hbao;

pub use aom::{AmbientOcclusionMaster, AomDebugPass, AomPass};
pub use blur::{BlurPass, BlurSettings};
pub use hbao::{HbaoPass, HbaoPassSettings};
