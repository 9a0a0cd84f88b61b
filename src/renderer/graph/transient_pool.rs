//! Transient Texture Pool
//!
//! Descriptor-keyed recycling of short-lived, per-frame textures. The frame
//! graph allocates one texture per transient resource that survives culling;
//! at frame end every allocation goes back to the free list for reuse, and
//! free textures left unused for more than `max_idle_frames` frames are
//! released (after a resize the old sizes age out).
//!
//! # Design
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              TransientTexturePool                    │
//! │                                                     │
//! │  active: [PooledTexture]  ←── indexed by Id         │
//! │  free:   HashMap<Key, Vec<PooledTexture>>           │
//! │                                                     │
//! │  allocate() → Id    (graph execute, &mut self)      │
//! │  desc(Id)           (render functions, &self)       │
//! │  end_frame()        (reset + trim, &mut self)       │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! Requesting the same descriptor twice in consecutive frames returns the same
//! physical texture; nothing is duplicated. Textures are virtual here: the
//! pool tracks identity and layout, the GPU backing belongs to the host.

use rustc_hash::FxHashMap;

// ─── Public Types ─────────────────────────────────────────────────────────────

/// Lightweight handle to a transient texture allocated from the pool.
///
/// Valid only for the current frame. After [`TransientTexturePool::reset`]
/// is called, outstanding IDs become invalid.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TransientTextureId(u32);

/// Stable identity of the physical texture behind a [`TransientTextureId`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct PhysicalTextureId(u64);

/// Descriptor for requesting a transient texture.
///
/// Plain value: two equal descriptors (ignoring the label) always map to the
/// same pool bucket.
#[derive(Clone, Copy, Debug)]
pub struct TransientTextureDesc {
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
    pub usage: wgpu::TextureUsages,
    pub filter: wgpu::FilterMode,
    pub label: &'static str,
}

impl TransientTextureDesc {
    /// Render-target descriptor with bilinear filtering.
    #[must_use]
    pub fn render_target(
        label: &'static str,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            filter: wgpu::FilterMode::Linear,
            label,
        }
    }

    /// Pool key: every field except the label.
    #[must_use]
    pub fn key(&self) -> PoolKey {
        PoolKey {
            width: self.width,
            height: self.height,
            format: self.format,
            usage: self.usage,
            filter: self.filter,
        }
    }
}

impl PartialEq for TransientTextureDesc {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for TransientTextureDesc {}

impl std::hash::Hash for TransientTextureDesc {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// Key for texture recycling. Usage is part of the key: a texture with a
/// different usage set is never handed out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PoolKey {
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
    usage: wgpu::TextureUsages,
    filter: wgpu::FilterMode,
}

// ─── Internal Types ───────────────────────────────────────────────────────────

struct PooledTexture {
    physical: PhysicalTextureId,
    desc: TransientTextureDesc,
    /// Number of frames this texture has been sitting in the free pool
    /// without being reused. Used by [`TransientTexturePool::trim`].
    idle_frames: u32,
}

// ─── Pool Implementation ──────────────────────────────────────────────────────

pub struct TransientTexturePool {
    /// Textures currently allocated this frame.
    active: Vec<PooledTexture>,
    /// Free textures available for reuse, grouped by pool key.
    free: FxHashMap<PoolKey, Vec<PooledTexture>>,
    next_physical: u64,
    max_idle_frames: u32,
}

impl TransientTexturePool {
    /// Frames a free texture may stay unused before [`end_frame`](Self::end_frame)
    /// releases it.
    pub const DEFAULT_MAX_IDLE_FRAMES: u32 = 2;

    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: Vec::new(),
            free: FxHashMap::default(),
            next_physical: 0,
            max_idle_frames: Self::DEFAULT_MAX_IDLE_FRAMES,
        }
    }

    #[inline]
    #[must_use]
    pub fn max_idle_frames(&self) -> u32 {
        self.max_idle_frames
    }

    pub fn set_max_idle_frames(&mut self, frames: u32) {
        self.max_idle_frames = frames;
    }

    /// Allocate a transient texture matching the given descriptor.
    ///
    /// If a compatible texture is available in the free pool it is reused;
    /// otherwise a new one is created.
    pub fn allocate(&mut self, desc: &TransientTextureDesc) -> TransientTextureId {
        let key = desc.key();

        let pooled = match self.free.get_mut(&key).and_then(Vec::pop) {
            Some(mut t) => {
                t.idle_frames = 0;
                t.desc = *desc;
                t
            }
            None => {
                let physical = PhysicalTextureId(self.next_physical);
                self.next_physical += 1;
                log::debug!(
                    "Transient pool: new texture '{}' {}x{} {:?}",
                    desc.label,
                    desc.width,
                    desc.height,
                    desc.format
                );
                PooledTexture {
                    physical,
                    desc: *desc,
                    idle_frames: 0,
                }
            }
        };

        let id = TransientTextureId(self.active.len() as u32);
        self.active.push(pooled);
        id
    }

    #[must_use]
    #[inline]
    pub fn desc(&self, id: TransientTextureId) -> Option<&TransientTextureDesc> {
        self.active.get(id.0 as usize).map(|t| &t.desc)
    }

    #[must_use]
    #[inline]
    pub fn physical_id(&self, id: TransientTextureId) -> Option<PhysicalTextureId> {
        self.active.get(id.0 as usize).map(|t| t.physical)
    }

    /// Number of textures handed out this frame.
    #[must_use]
    #[inline]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    // ── Frame boundary ─────────────────────────────────────────────────────

    /// Return all active textures to the free pool.
    ///
    /// Call this at the end of every frame. After this call, all
    /// previously returned [`TransientTextureId`]s become invalid.
    pub fn reset(&mut self) {
        for t in self.active.drain(..) {
            self.free.entry(t.desc.key()).or_default().push(t);
        }
    }

    /// Release textures that have been idle for more than `max_idle_frames`.
    ///
    /// Call this periodically (e.g., after a resolution change) to avoid
    /// holding stale memory.
    pub fn trim(&mut self, max_idle_frames: u32) {
        for bucket in self.free.values_mut() {
            for t in bucket.iter_mut() {
                t.idle_frames += 1;
            }
            bucket.retain(|t| t.idle_frames <= max_idle_frames);
        }
        self.free.retain(|_, bucket| !bucket.is_empty());
    }

    /// Frame boundary used by the composer: recycle this frame's textures,
    /// then release the ones idle for longer than `max_idle_frames`.
    pub fn end_frame(&mut self) {
        self.reset();
        self.trim(self.max_idle_frames);
    }

    /// Returns the total number of textures managed by the pool
    /// (both active and free).
    #[must_use]
    pub fn total_texture_count(&self) -> usize {
        self.active.len() + self.free.values().map(Vec::len).sum::<usize>()
    }
}

impl Default for TransientTexturePool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(label: &'static str) -> TransientTextureDesc {
        TransientTextureDesc::render_target(label, 64, 32, wgpu::TextureFormat::R8Unorm)
    }

    #[test]
    fn label_is_not_part_of_identity() {
        assert_eq!(desc("a"), desc("b"));
        assert_eq!(desc("a").key(), desc("b").key());
    }

    #[test]
    fn reuse_after_reset() {
        let mut pool = TransientTexturePool::new();
        let first = pool.allocate(&desc("ao"));
        let physical = pool.physical_id(first);
        pool.reset();

        let second = pool.allocate(&desc("ao"));
        assert_eq!(pool.physical_id(second), physical);
        assert_eq!(pool.total_texture_count(), 1);
    }

    #[test]
    fn end_frame_keeps_textures_in_use() {
        let mut pool = TransientTexturePool::new();
        let first = pool.allocate(&desc("ao"));
        let physical = pool.physical_id(first);
        pool.end_frame();

        for _ in 0..10 {
            let id = pool.allocate(&desc("ao"));
            assert_eq!(pool.physical_id(id), physical);
            pool.end_frame();
        }
        assert_eq!(pool.total_texture_count(), 1);
    }

    #[test]
    fn end_frame_releases_stale_sizes() {
        let mut pool = TransientTexturePool::new();
        pool.set_max_idle_frames(2);
        pool.allocate(&desc("ao"));
        pool.end_frame();

        // The old size survives while it may still come back.
        let resized =
            TransientTextureDesc::render_target("ao", 128, 64, wgpu::TextureFormat::R8Unorm);
        pool.allocate(&resized);
        pool.end_frame();
        assert_eq!(pool.total_texture_count(), 2);

        pool.allocate(&resized);
        pool.end_frame();
        assert_eq!(pool.total_texture_count(), 1);
    }

    #[test]
    fn trim_drops_idle_textures() {
        let mut pool = TransientTexturePool::new();
        pool.allocate(&desc("ao"));
        pool.reset();
        pool.trim(0);
        assert_eq!(pool.total_texture_count(), 0);
    }
}
