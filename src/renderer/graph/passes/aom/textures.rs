//! AOM buffer planning.
//!
//! | Blur quality | Slots used | Intermediate format |
//! |--------------|------------|---------------------|
//! | `High` | 0, 1, 2, 3 | `Rgba8Unorm` |
//! | `Medium` | 0, 1, 3 | `R8Unorm` if supported |
//! | `Low` | 0, 3 | `R8Unorm` if supported |
//!
//! Slots 0..=2 are sized `base / divider`. Slot 3 (final) is always full
//! resolution and, when compositing after opaques, aliases the active color
//! target instead of being allocated.

use super::constants::{BlurSequence, FINAL_TEXTURE_INDEX, MAX_TEXTURES};
use crate::errors::{AomError, Result};
use crate::renderer::graph::{FrameGraph, TextureHandle, TransientTextureDesc};
use crate::resources::aom::AomSettings;

const SLOT_LABELS: [&str; MAX_TEXTURES] = [
    "_AOM_OcclusionTexture0",
    "_AOM_OcclusionTexture1",
    "_AOM_OcclusionTexture2",
    "_ScreenSpaceOcclusionTexture",
];

/// How one buffer slot is backed this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Allocate(TransientTextureDesc),
    /// Reuse the camera's active color target.
    AliasActiveColor,
}

/// Buffer plan of one frame. Equal inputs always give equal plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureLayout {
    slots: [Option<TextureSlot>; MAX_TEXTURES],
}

impl TextureLayout {
    #[must_use]
    pub fn plan(
        settings: &AomSettings,
        after_opaque: bool,
        width: u32,
        height: u32,
        supports_r8: bool,
    ) -> Self {
        let divider = settings.downsample_divider();

        let final_format = if supports_r8 {
            wgpu::TextureFormat::R8Unorm
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        };
        let intermediate_format = if supports_r8 && settings.blur_quality.allows_single_channel() {
            wgpu::TextureFormat::R8Unorm
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        };

        let sequence = BlurSequence::new(settings.blur_quality, after_opaque);
        let mut slots = [None; MAX_TEXTURES];

        for slot in sequence.used_slots() {
            slots[slot] = Some(if slot == FINAL_TEXTURE_INDEX {
                if after_opaque {
                    TextureSlot::AliasActiveColor
                } else {
                    TextureSlot::Allocate(TransientTextureDesc::render_target(
                        SLOT_LABELS[slot],
                        width,
                        height,
                        final_format,
                    ))
                }
            } else {
                TextureSlot::Allocate(TransientTextureDesc::render_target(
                    SLOT_LABELS[slot],
                    width / divider,
                    height / divider,
                    intermediate_format,
                ))
            });
        }

        Self { slots }
    }

    #[inline]
    #[must_use]
    pub fn slot(&self, index: usize) -> Option<TextureSlot> {
        self.slots.get(index).copied().flatten()
    }

    /// Buffers taking part in the blur chain, aliased ones included.
    #[must_use]
    pub fn buffer_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Buffers that need a fresh transient allocation.
    #[must_use]
    pub fn allocation_count(&self) -> usize {
        self.slots
            .iter()
            .flatten()
            .filter(|s| matches!(s, TextureSlot::Allocate(_)))
            .count()
    }

    /// Fails when the occlusion draw or `sequence` needs a slot this layout
    /// did not plan.
    pub fn check_sequence(&self, sequence: BlurSequence) -> Result<()> {
        match std::iter::once(0)
            .chain(sequence.used_slots())
            .find(|&slot| self.slot(slot).is_none())
        {
            Some(slot) => Err(AomError::InvalidTexture(format!(
                "AOM buffer slot {slot} was not planned"
            ))),
            None => Ok(()),
        }
    }

    /// Declares the planned buffers in `graph`.
    pub fn create(&self, graph: &mut FrameGraph, active_color: TextureHandle) -> AomTextures {
        let mut handles = [None; MAX_TEXTURES];
        for (handle, slot) in handles.iter_mut().zip(&self.slots) {
            *handle = slot.map(|slot| match slot {
                TextureSlot::Allocate(desc) => graph.create_texture(desc),
                TextureSlot::AliasActiveColor => active_color,
            });
        }
        AomTextures { handles }
    }
}

/// Graph handles of the planned buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AomTextures {
    handles: [Option<TextureHandle>; MAX_TEXTURES],
}

impl AomTextures {
    #[inline]
    #[must_use]
    pub fn get(&self, slot: usize) -> Option<TextureHandle> {
        self.handles.get(slot).copied().flatten()
    }

    #[inline]
    #[must_use]
    pub fn ao(&self) -> Option<TextureHandle> {
        self.get(0)
    }

    #[inline]
    #[must_use]
    pub fn final_texture(&self) -> Option<TextureHandle> {
        self.get(FINAL_TEXTURE_INDEX)
    }

    pub fn iter(&self) -> impl Iterator<Item = TextureHandle> + '_ {
        self.handles.iter().flatten().copied()
    }
}
