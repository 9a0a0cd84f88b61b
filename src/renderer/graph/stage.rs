//! Render Stage Definitions
//!
//! `RenderStage` defines the standard injection points of the host pipeline.
//! Features choose a stage for each node they enqueue; the frame builder
//! records nodes stage by stage.

use serde::{Deserialize, Serialize};

/// Render stage enumeration.
///
/// Nodes within the same stage execute in insertion order.
///
/// # Stage Overview
///
/// | Stage | Runs after | Typical content |
/// |-------|------------|-----------------|
/// | `AfterPrePasses` | Depth / depth-normal prepass | Forward AO producing a sampled texture |
/// | `AfterGbuffer` | G-buffer fill | Deferred AO producing a sampled texture |
/// | `AfterOpaques` | Deferred lighting | Deferred AO composited onto color |
/// | `BeforeTransparents` | Opaque + skybox | Forward AO composited onto color |
/// | `BeforePostProcessing` | Transparent objects | Blur, HBAO post effect |
/// | `AfterPostProcessing` | Tone mapping | Debug visualisation |
#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum RenderStage {
    AfterPrePasses = 0,
    AfterGbuffer = 1,
    AfterOpaques = 2,
    BeforeTransparents = 3,
    BeforePostProcessing = 4,
    AfterPostProcessing = 5,
}

impl RenderStage {
    /// Returns the numeric index of the stage (used for sorting).
    #[inline]
    #[must_use]
    pub const fn order(self) -> u8 {
        self as u8
    }

    pub const ALL: [Self; 6] = [
        Self::AfterPrePasses,
        Self::AfterGbuffer,
        Self::AfterOpaques,
        Self::BeforeTransparents,
        Self::BeforePostProcessing,
        Self::AfterPostProcessing,
    ];

    /// Shifts the stage by `offset` steps, saturating at both ends.
    #[must_use]
    pub fn offset(self, offset: i8) -> Self {
        let index = (i16::from(self.order()) + i16::from(offset)).clamp(0, 5);
        Self::ALL[index as usize]
    }

    /// Stage name (for debugging).
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AfterPrePasses => "AfterPrePasses",
            Self::AfterGbuffer => "AfterGbuffer",
            Self::AfterOpaques => "AfterOpaques",
            Self::BeforeTransparents => "BeforeTransparents",
            Self::BeforePostProcessing => "BeforePostProcessing",
            Self::AfterPostProcessing => "AfterPostProcessing",
        }
    }
}
