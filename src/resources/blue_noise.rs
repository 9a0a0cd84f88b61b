//! Blue-Noise Sequencer
//!
//! Cycles through a set of precomputed blue-noise tiles, one per frame, and
//! produces the `_AOMBlueNoiseParameters` vector:
//!
//! ```text
//! (pixel_width / tile_width, pixel_height / tile_height, offset_x, offset_y)
//! ```
//!
//! Offsets are drawn from a seedable [`StdRng`] so runs are reproducible.

use glam::Vec4;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

use crate::renderer::graph::AssetTextureId;

/// A single noise tile, as registered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlueNoiseTexture {
    pub texture: AssetTextureId,
    pub width: u32,
    pub height: u32,
}

/// Output of one [`BlueNoiseSequence::advance`] step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlueNoiseSample {
    pub texture: AssetTextureId,
    pub params: Vec4,
}

pub struct BlueNoiseSequence {
    textures: Vec<BlueNoiseTexture>,
    index: usize,
    rng: StdRng,
}

impl Default for BlueNoiseSequence {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl BlueNoiseSequence {
    pub const DEFAULT_SEED: u64 = 0x0A0C_0A0C;

    #[must_use]
    pub fn new(textures: Vec<BlueNoiseTexture>) -> Self {
        Self::with_seed(textures, Self::DEFAULT_SEED)
    }

    #[must_use]
    pub fn with_seed(textures: Vec<BlueNoiseTexture>, seed: u64) -> Self {
        Self {
            textures,
            index: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Index of the tile returned by the last `advance`.
    #[inline]
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.index
    }

    /// Moves to the next tile and returns it with fresh offsets.
    ///
    /// Returns `None` when no tiles are registered.
    pub fn advance(&mut self, pixel_width: u32, pixel_height: u32) -> Option<BlueNoiseSample> {
        if self.textures.is_empty() {
            return None;
        }

        self.index = (self.index + 1) % self.textures.len();
        let tile = self.textures[self.index];

        let params = Vec4::new(
            pixel_width as f32 / tile.width.max(1) as f32,
            pixel_height as f32 / tile.height.max(1) as f32,
            self.rng.random_range(0.0..1.0f32),
            self.rng.random_range(0.0..1.0f32),
        );

        Some(BlueNoiseSample {
            texture: tile.texture,
            params,
        })
    }
}
