//! Command Recording
//!
//! Render functions record into a [`CommandBuffer`]; the host backend replays
//! the commands against the GPU. Keeping the list inspectable lets the frame
//! composer (and tests) verify blit ordering and load/store actions.

use glam::Vec4;
use smallvec::SmallVec;

use super::graph::TextureHandle;
use super::material::MaterialId;

/// What happens to the target's previous contents when a blit starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadAction {
    /// Keep the existing contents (composite on top).
    Load,
    /// Contents are fully overwritten and may be discarded.
    DontCare,
}

impl LoadAction {
    #[must_use]
    pub fn to_wgpu(self) -> wgpu::LoadOp<wgpu::Color> {
        match self {
            Self::Load => wgpu::LoadOp::Load,
            Self::DontCare => wgpu::LoadOp::DontCare(wgpu::LoadOpDontCare::default()),
        }
    }
}

/// What happens to the target when the blit ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreAction {
    Store,
    Discard,
}

impl StoreAction {
    #[must_use]
    pub fn to_wgpu(self) -> wgpu::StoreOp {
        match self {
            Self::Store => wgpu::StoreOp::Store,
            Self::Discard => wgpu::StoreOp::Discard,
        }
    }
}

/// A single recorded command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Full-screen draw sampling `source` into `target`.
    Blit {
        source: TextureHandle,
        target: TextureHandle,
        load: LoadAction,
        store: StoreAction,
        material: MaterialId,
        pass: u32,
    },
    /// Full-screen draw without a bound source texture.
    DrawFullscreen {
        target: TextureHandle,
        load: LoadAction,
        store: StoreAction,
        material: MaterialId,
        pass: u32,
    },
    Copy {
        source: TextureHandle,
        target: TextureHandle,
    },
    SetGlobalTexture {
        name: &'static str,
        texture: TextureHandle,
    },
    SetGlobalVector {
        name: &'static str,
        value: Vec4,
    },
    SetGlobalKeyword {
        name: &'static str,
        enabled: bool,
    },
    SetMaterialTexture {
        material: MaterialId,
        name: &'static str,
        texture: TextureHandle,
    },
}

impl Command {
    /// Commands that change state visible to later passes.
    #[must_use]
    pub fn is_global_state(&self) -> bool {
        matches!(
            self,
            Self::SetGlobalTexture { .. } | Self::SetGlobalVector { .. } | Self::SetGlobalKeyword { .. }
        )
    }
}

/// Ordered list of commands recorded by one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandBuffer {
    commands: SmallVec<[Command; 8]>,
}

impl CommandBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn blit(
        &mut self,
        source: TextureHandle,
        target: TextureHandle,
        load: LoadAction,
        store: StoreAction,
        material: MaterialId,
        pass: u32,
    ) {
        self.push(Command::Blit {
            source,
            target,
            load,
            store,
            material,
            pass,
        });
    }

    pub fn draw_fullscreen(
        &mut self,
        target: TextureHandle,
        load: LoadAction,
        store: StoreAction,
        material: MaterialId,
        pass: u32,
    ) {
        self.push(Command::DrawFullscreen {
            target,
            load,
            store,
            material,
            pass,
        });
    }

    pub fn copy(&mut self, source: TextureHandle, target: TextureHandle) {
        self.push(Command::Copy { source, target });
    }

    pub fn set_global_texture(&mut self, name: &'static str, texture: TextureHandle) {
        self.push(Command::SetGlobalTexture { name, texture });
    }

    pub fn set_global_vector(&mut self, name: &'static str, value: Vec4) {
        self.push(Command::SetGlobalVector { name, value });
    }

    pub fn set_global_keyword(&mut self, name: &'static str, enabled: bool) {
        self.push(Command::SetGlobalKeyword { name, enabled });
    }

    pub fn set_material_texture(
        &mut self,
        material: MaterialId,
        name: &'static str,
        texture: TextureHandle,
    ) {
        self.push(Command::SetMaterialTexture {
            material,
            name,
            texture,
        });
    }

    /// Drops every global-state command and returns how many were removed.
    pub fn strip_global_state(&mut self) -> usize {
        let before = self.commands.len();
        self.commands.retain(|c| !c.is_global_state());
        before - self.commands.len()
    }

    #[inline]
    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }
}
