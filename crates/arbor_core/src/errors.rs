//! Error Types
//!
//! This module defines the error type shared by every Arbor crate.
//!
//! # Overview
//!
//! [`ArborError`] covers the failure modes of the rendering core:
//! - Structural misuse of the scene graph (invalid reparenting, stale handles)
//! - Shader uniform contract violations
//! - Resource limits (too many simultaneously bound point lights)
//! - Mesh construction and upload errors
//! - Configuration parsing and validation
//!
//! None of these are retried by the engine. They are reported synchronously
//! at the call site and the application decides how to recover.
//!
//! # Usage
//!
//! ```rust,ignore
//! use arbor_core::errors::{ArborError, Result};
//!
//! fn reparent() -> Result<()> {
//!     Err(ArborError::InvalidOperation("scene root cannot have a parent".into()))
//! }
//! ```

use thiserror::Error;

/// The main error type for the Arbor engine.
#[derive(Error, Debug)]
pub enum ArborError {
    // ========================================================================
    // Scene Graph Errors
    // ========================================================================
    /// A structural operation that would corrupt the tree (cycles, moving or
    /// removing the scene root).
    #[error("Invalid scene operation: {0}")]
    InvalidOperation(String),

    /// The node handle does not refer to a live node.
    #[error("Node not found (stale or foreign handle)")]
    NodeNotFound,

    // ========================================================================
    // Shader Errors
    // ========================================================================
    /// The uniform name was not declared before `compile()`.
    #[error("Unknown uniform: {0}")]
    UnknownUniform(String),

    /// The value passed to a uniform does not match its declared kind.
    #[error("Uniform '{name}' expects {expected} but received {found}")]
    UniformTypeMismatch {
        /// Uniform name
        name: String,
        /// Declared kind
        expected: &'static str,
        /// Kind of the supplied value
        found: &'static str,
    },

    /// The shader was used before `compile()`.
    #[error("Shader has not been compiled")]
    ShaderNotCompiled,

    /// The backend rejected the shader sources.
    #[error("Shader compilation failed: {0}")]
    ShaderCompile(String),

    // ========================================================================
    // Lighting Errors
    // ========================================================================
    /// Every point-light slot is already taken.
    #[error("Too many point lights bound (max {max})")]
    TooManyLights {
        /// Number of available slots
        max: usize,
    },

    // ========================================================================
    // Mesh Errors
    // ========================================================================
    /// `render()` was called on a mesh whose buffers were never created.
    #[error("Mesh has not been uploaded to the GPU")]
    MeshNotUploaded,

    /// A vertex attribute does not have one entry per vertex.
    #[error("Mesh attribute '{attribute}' has {found} entries, expected {expected}")]
    MeshAttributeMismatch {
        /// Attribute name
        attribute: &'static str,
        /// Vertex count
        expected: usize,
        /// Attribute length
        found: usize,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// A setting holds an unusable value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Settings JSON could not be parsed.
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

/// Alias for `Result<T, ArborError>`.
pub type Result<T> = std::result::Result<T, ArborError>;
