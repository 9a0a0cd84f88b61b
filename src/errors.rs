//! Error Types
//!
//! This module defines the error types used by the ambient occlusion passes.
//!
//! # Overview
//!
//! The main error type [`AomError`] covers every frame-local failure mode:
//! - Missing shaders or materials (retried on the next frame)
//! - Invalid render targets (e.g. the back buffer)
//! - Invalid texture handles handed over by the frame graph
//! - Configuration parsing errors
//!
//! None of these are fatal. The [`Renderer`](crate::renderer::Renderer) logs
//! them and skips the failing pass for the current frame only.
//!
//! ```rust,ignore
//! use myth_aom::errors::{AomError, Result};
//!
//! fn record_pass() -> Result<()> {
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for ambient occlusion passes.
#[derive(Error, Debug)]
pub enum AomError {
    // ========================================================================
    // Shader & Material Errors
    // ========================================================================
    /// The shader could not be found in the shader library.
    #[error("Shader not found: {0}")]
    MissingShader(String),

    /// The pass was asked to record without a material.
    #[error("{pass}: missing material, pass will not execute")]
    MissingMaterial {
        /// Name of the pass that was skipped
        pass: &'static str,
    },

    // ========================================================================
    // Render Target Errors
    // ========================================================================
    /// The active render target cannot be used by this pass.
    #[error("{pass}: unsupported render target ({reason})")]
    UnsupportedTarget {
        /// Name of the pass that was skipped
        pass: &'static str,
        /// Why the target was rejected
        reason: &'static str,
    },

    /// A texture handle did not resolve to a graph resource.
    #[error("Invalid texture handle: {0}")]
    InvalidTexture(String),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Alias for `Result<T, AomError>`.
pub type Result<T> = std::result::Result<T, AomError>;
