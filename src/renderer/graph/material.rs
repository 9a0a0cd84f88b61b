//! Post-Process Material
//!
//! A [`Material`] is the CPU-side property block of a full-screen shader:
//! enabled keywords plus named vectors, floats, arrays and textures. Passes
//! write properties while recording; the backend reads them when a blit
//! references the material by [`MaterialId`].
//!
//! Every write bumps the material's [`ChangeTracker`] and a per-property
//! upload counter, so redundant uploads are observable.

use std::sync::atomic::{AtomicU32, Ordering};

use glam::{Mat4, Vec4};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use super::graph::TextureHandle;
use crate::resources::version_tracker::ChangeTracker;

static NEXT_MATERIAL_ID: AtomicU32 = AtomicU32::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(u32);

/// Persistent (non-graph) texture owned by the host, e.g. a noise tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetTextureId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialTexture {
    Graph(TextureHandle),
    Asset(AssetTextureId),
}

/// Per-eye array property (one entry, or two for single-pass stereo).
pub type EyeArray<T> = SmallVec<[T; 2]>;

#[derive(Debug)]
pub struct Material {
    id: MaterialId,
    shader: String,
    keywords: FxHashSet<&'static str>,
    vectors: FxHashMap<&'static str, Vec4>,
    floats: FxHashMap<&'static str, f32>,
    vector_arrays: FxHashMap<&'static str, EyeArray<Vec4>>,
    matrix_arrays: FxHashMap<&'static str, EyeArray<Mat4>>,
    textures: FxHashMap<&'static str, MaterialTexture>,
    uploads: FxHashMap<&'static str, u32>,
    tracker: ChangeTracker,
}

impl Material {
    #[must_use]
    pub fn new(shader: impl Into<String>) -> Self {
        Self {
            id: MaterialId(NEXT_MATERIAL_ID.fetch_add(1, Ordering::Relaxed)),
            shader: shader.into(),
            keywords: FxHashSet::default(),
            vectors: FxHashMap::default(),
            floats: FxHashMap::default(),
            vector_arrays: FxHashMap::default(),
            matrix_arrays: FxHashMap::default(),
            textures: FxHashMap::default(),
            uploads: FxHashMap::default(),
            tracker: ChangeTracker::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> MaterialId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn shader(&self) -> &str {
        &self.shader
    }

    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.tracker.version()
    }

    fn touch(&mut self, name: &'static str) {
        *self.uploads.entry(name).or_insert(0) += 1;
        self.tracker.changed();
    }

    // ─── Keywords ────────────────────────────────────────────────────────

    pub fn set_keyword(&mut self, name: &'static str, enabled: bool) {
        if enabled {
            self.keywords.insert(name);
        } else {
            self.keywords.remove(name);
        }
        self.touch(name);
    }

    #[must_use]
    pub fn is_keyword_enabled(&self, name: &str) -> bool {
        self.keywords.contains(name)
    }

    /// Enabled keywords, sorted for stable comparison.
    #[must_use]
    pub fn enabled_keywords(&self) -> Vec<&'static str> {
        let mut keywords: Vec<_> = self.keywords.iter().copied().collect();
        keywords.sort_unstable();
        keywords
    }

    // ─── Properties ──────────────────────────────────────────────────────

    pub fn set_vector(&mut self, name: &'static str, value: Vec4) {
        self.vectors.insert(name, value);
        self.touch(name);
    }

    #[must_use]
    pub fn vector(&self, name: &str) -> Option<Vec4> {
        self.vectors.get(name).copied()
    }

    pub fn set_float(&mut self, name: &'static str, value: f32) {
        self.floats.insert(name, value);
        self.touch(name);
    }

    #[must_use]
    pub fn float(&self, name: &str) -> Option<f32> {
        self.floats.get(name).copied()
    }

    pub fn set_vector_array(&mut self, name: &'static str, values: &[Vec4]) {
        self.vector_arrays.insert(name, SmallVec::from_slice(values));
        self.touch(name);
    }

    #[must_use]
    pub fn vector_array(&self, name: &str) -> Option<&[Vec4]> {
        self.vector_arrays.get(name).map(SmallVec::as_slice)
    }

    pub fn set_matrix_array(&mut self, name: &'static str, values: &[Mat4]) {
        self.matrix_arrays.insert(name, SmallVec::from_slice(values));
        self.touch(name);
    }

    #[must_use]
    pub fn matrix_array(&self, name: &str) -> Option<&[Mat4]> {
        self.matrix_arrays.get(name).map(SmallVec::as_slice)
    }

    pub fn set_texture(&mut self, name: &'static str, texture: MaterialTexture) {
        self.textures.insert(name, texture);
        self.touch(name);
    }

    #[must_use]
    pub fn texture(&self, name: &str) -> Option<MaterialTexture> {
        self.textures.get(name).copied()
    }

    /// How many times `name` has been written since creation.
    #[must_use]
    pub fn upload_count(&self, name: &str) -> u32 {
        self.uploads.get(name).copied().unwrap_or(0)
    }
}
