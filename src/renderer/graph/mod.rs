//! Frame-graph host
//!
//! Provides:
//! - FrameGraph / PassBuilder: per-frame pass declaration, culling, execution
//! - TransientTexturePool: descriptor-keyed texture recycling
//! - CommandBuffer: recorded blits and global state changes
//! - Material: keyword and property block of a full-screen shader
//! - FrameData: camera and host frame resources
//! - RenderNode / FrameBuilder / RenderStage: node ordering
//! - passes: blur, HBAO and Ambient Occlusion Master

pub mod builder;
pub mod command;
pub mod composer;
pub mod frame;
pub mod graph;
pub mod material;
pub mod node;
pub mod passes;
pub mod stage;
pub mod transient_pool;

pub use builder::FrameBuilder;
pub use command::{Command, CommandBuffer, LoadAction, StoreAction};
pub use composer::{FrameComposer, FrameOutput, FrameTargets};
pub use frame::{CameraData, DeviceCaps, EyeMatrices, FrameData, ResourceData};
pub use graph::{Access, ExecutedGraph, ExecutedPass, FrameGraph, PassBuilder, RasterContext, TextureHandle};
pub use material::{AssetTextureId, Material, MaterialId, MaterialTexture};
pub use node::RenderNode;
pub use stage::RenderStage;
pub use transient_pool::{TransientTextureDesc, TransientTextureId, TransientTexturePool};
