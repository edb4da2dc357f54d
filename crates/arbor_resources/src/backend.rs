//! GPU Backend Boundary
//!
//! [`GraphicsBackend`] is the only place where GPU state changes happen:
//! program binds, uniform uploads, buffer creation and draw calls. Everything
//! above it (shaders, meshes, the render engine) talks to a [`GpuContext`],
//! which wraps a backend and skips redundant program binds.
//!
//! # Data Flow
//! ```text
//! RenderEngine → Shader / Mesh → GpuContext (bind tracking) → GraphicsBackend
//! ```

use glam::{Mat4, Vec3};

use arbor_core::errors::Result;

/// Linked shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u32);

/// Resolved uniform location inside a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub i32);

/// GPU buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

/// Texture owned by the texture collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    Vertex,
    Index,
}

/// Declared type of a uniform; selects the typed setter used for uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformKind {
    Int,
    Float,
    Vec3,
    Mat4,
}

impl UniformKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Vec3 => "vec3",
            Self::Mat4 => "mat4",
        }
    }
}

/// A value to upload into a uniform slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec3(Vec3),
    Mat4(Mat4),
}

impl UniformValue {
    #[must_use]
    pub fn kind(&self) -> UniformKind {
        match self {
            Self::Int(_) => UniformKind::Int,
            Self::Float(_) => UniformKind::Float,
            Self::Vec3(_) => UniformKind::Vec3,
            Self::Mat4(_) => UniformKind::Mat4,
        }
    }
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self {
        Self::Vec3(v)
    }
}

impl From<Mat4> for UniformValue {
    fn from(v: Mat4) -> Self {
        Self::Mat4(v)
    }
}

/// One indexed draw of an uploaded mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawIndexed {
    pub vertex_buffer: BufferId,
    pub index_buffer: BufferId,
    pub index_count: u32,
    /// Bytes between consecutive vertices in the interleaved buffer
    pub stride: u32,
}

/// The GPU collaborator.
///
/// Implementations translate these calls into a concrete graphics API.
/// [`RecordingBackend`](crate::recording::RecordingBackend) records them
/// instead, for headless runs and tests.
pub trait GraphicsBackend {
    /// Compiles and links a program from vertex and fragment sources.
    fn compile_program(&mut self, vertex_source: &str, fragment_source: &str) -> Result<ProgramId>;

    /// Looks up a uniform. `None` means the driver optimised it away.
    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation>;

    /// Makes `program` current; `None` unbinds.
    fn use_program(&mut self, program: Option<ProgramId>);

    fn set_uniform(&mut self, location: UniformLocation, value: &UniformValue);

    fn create_buffer(&mut self, target: BufferTarget, contents: &[u8]) -> BufferId;

    fn bind_texture(&mut self, texture: TextureId, unit: u32);

    fn draw_indexed(&mut self, draw: &DrawIndexed);
}

/// A backend plus the bind state the engine tracks on top of it.
pub struct GpuContext<B: GraphicsBackend> {
    backend: B,
    current_program: Option<ProgramId>,
}

impl<B: GraphicsBackend> GpuContext<B> {
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            current_program: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    #[must_use]
    pub fn into_inner(self) -> B {
        self.backend
    }

    /// Program the backend currently has bound, as far as this context knows.
    #[inline]
    #[must_use]
    pub fn current_program(&self) -> Option<ProgramId> {
        self.current_program
    }

    /// Binds `program` unless it is already current. Returns whether a
    /// backend call was issued.
    pub fn use_program(&mut self, program: Option<ProgramId>) -> bool {
        if self.current_program == program {
            return false;
        }
        self.backend.use_program(program);
        self.current_program = program;
        true
    }
}
