//! GPU-facing resources.
//!
//! - [`backend`]: the [`GraphicsBackend`] boundary and [`GpuContext`] bind tracking
//! - [`recording`]: a headless backend that records commands
//! - [`shader`]: programs with a declared, compile-time resolved uniform set
//! - [`mesh`]: interleaved vertex data and its GPU buffers

pub mod backend;
pub mod mesh;
pub mod recording;
pub mod shader;

pub use backend::{
    BufferId, BufferTarget, DrawIndexed, GpuContext, GraphicsBackend, ProgramId, TextureId, UniformKind,
    UniformLocation, UniformValue,
};
pub use mesh::{Mesh, MeshBuilder, VertexAttribute, VertexLayout};
pub use recording::{BackendCommand, RecordingBackend};
pub use shader::Shader;
