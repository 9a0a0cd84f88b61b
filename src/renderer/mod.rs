//! Renderer
//!
//! A minimal frame-graph host: owns the registered [`RendererFeature`]s, the
//! [`ShaderLibrary`] and the transient texture pool, and drives one frame at
//! a time through a [`FrameComposer`].
//!
//! Frame-local failures never abort a frame: a feature that cannot set up
//! enqueues nothing, and a node whose recording fails is logged and skipped.

pub mod graph;

use std::any::Any;

use rustc_hash::FxHashMap;

use self::graph::{
    CameraData, DeviceCaps, FrameBuilder, FrameComposer, FrameData, FrameGraph, FrameTargets,
    TransientTexturePool,
};

// ============================================================================
// Shaders
// ============================================================================

/// A compiled full-screen shader, known by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shader {
    name: String,
    pass_count: u32,
}

impl Shader {
    #[must_use]
    pub fn new(name: impl Into<String>, pass_count: u32) -> Self {
        Self {
            name: name.into(),
            pass_count,
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn pass_count(&self) -> u32 {
        self.pass_count
    }
}

/// Shaders available to features. May be filled after features are added;
/// features look shaders up lazily every frame.
#[derive(Debug, Default)]
pub struct ShaderLibrary {
    shaders: FxHashMap<String, Shader>,
}

impl ShaderLibrary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, shader: Shader) {
        self.shaders.insert(shader.name.clone(), shader);
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Shader> {
        self.shaders.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Shader> {
        self.shaders.remove(name)
    }
}

// ============================================================================
// Features
// ============================================================================

/// Read-only context handed to features while they enqueue passes.
pub struct FeatureContext<'a> {
    pub shaders: &'a ShaderLibrary,
    pub frame: &'a FrameData,
}

/// A pluggable effect that enqueues render nodes every frame.
pub trait RendererFeature: Any {
    fn name(&self) -> &'static str;

    /// Called once when the feature is added to a renderer.
    fn create(&mut self, _shaders: &ShaderLibrary) {}

    /// Enqueues this frame's nodes.
    fn add_render_passes<'a>(&'a mut self, builder: &mut FrameBuilder<'a>, ctx: &FeatureContext<'_>);

    /// Releases owned resources.
    fn dispose(&mut self) {}

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

// ============================================================================
// Renderer
// ============================================================================

#[derive(Default)]
pub struct Renderer {
    features: Vec<Box<dyn RendererFeature>>,
    shaders: ShaderLibrary,
    pool: TransientTexturePool,
    caps: DeviceCaps,
}

impl Renderer {
    #[must_use]
    pub fn new(caps: DeviceCaps) -> Self {
        Self {
            caps,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn shaders(&self) -> &ShaderLibrary {
        &self.shaders
    }

    pub fn shaders_mut(&mut self) -> &mut ShaderLibrary {
        &mut self.shaders
    }

    #[must_use]
    pub fn pool(&self) -> &TransientTexturePool {
        &self.pool
    }

    /// How many frames an unused transient texture is kept before release.
    pub fn set_max_idle_frames(&mut self, frames: u32) {
        self.pool.set_max_idle_frames(frames);
    }

    /// Adds a feature and runs its one-time `create`.
    pub fn add_feature(&mut self, mut feature: Box<dyn RendererFeature>) {
        feature.create(&self.shaders);
        log::debug!("Renderer: added feature '{}'", feature.name());
        self.features.push(feature);
    }

    /// Mutable access to the first feature of type `T`.
    pub fn feature_mut<T: RendererFeature>(&mut self) -> Option<&mut T> {
        self.features
            .iter_mut()
            .find_map(|f| f.as_any_mut().downcast_mut::<T>())
    }

    /// Starts a frame: imports the targets and collects feature nodes.
    pub fn begin_frame(&mut self, camera: CameraData, targets: FrameTargets) -> FrameComposer<'_> {
        let Self {
            features,
            shaders,
            pool,
            caps,
        } = self;

        let mut graph = FrameGraph::new();
        let resources = targets.import(&mut graph);
        let frame = FrameData {
            camera,
            resources,
            caps: *caps,
        };

        let mut builder = FrameBuilder::new();
        {
            let ctx = FeatureContext {
                shaders,
                frame: &frame,
            };
            for feature in features.iter_mut() {
                feature.add_render_passes(&mut builder, &ctx);
            }
        }

        FrameComposer::new(graph, frame, pool, builder)
    }

    /// Releases every feature's resources.
    pub fn dispose(&mut self) {
        for feature in &mut self.features {
            feature.dispose();
        }
    }
}
