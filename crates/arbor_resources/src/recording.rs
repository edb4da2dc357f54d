//! Headless backend that records every GPU command.
//!
//! Used by the integration tests and the demo app to observe exactly what
//! the engine would have sent to a real graphics API.

use rustc_hash::{FxHashMap, FxHashSet};

use arbor_core::errors::{ArborError, Result};

use crate::backend::{
    BufferId, BufferTarget, DrawIndexed, GraphicsBackend, ProgramId, TextureId, UniformLocation, UniformValue,
};

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCommand {
    CompileProgram(ProgramId),
    UseProgram(Option<ProgramId>),
    SetUniform {
        location: UniformLocation,
        /// Name the location was resolved from
        name: String,
        value: UniformValue,
    },
    CreateBuffer {
        buffer: BufferId,
        target: BufferTarget,
        size: usize,
    },
    BindTexture {
        texture: TextureId,
        unit: u32,
    },
    DrawIndexed(DrawIndexed),
}

#[derive(Debug, Default)]
pub struct RecordingBackend {
    commands: Vec<BackendCommand>,
    next_program: u32,
    next_buffer: u32,
    next_location: i32,
    locations: FxHashMap<(ProgramId, String), UniformLocation>,
    location_names: FxHashMap<UniformLocation, String>,
    optimized_out: FxHashSet<String>,
}

impl RecordingBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks uniforms the simulated driver strips from every program, so
    /// `uniform_location` returns `None` for them.
    #[must_use]
    pub fn with_optimized_out<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.optimized_out.extend(names.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn commands(&self) -> &[BackendCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<BackendCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Every value uploaded to the uniform `name`, in order.
    #[must_use]
    pub fn uniform_values(&self, name: &str) -> Vec<UniformValue> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                BackendCommand::SetUniform { name: n, value, .. } if n == name => Some(*value),
                _ => None,
            })
            .collect()
    }

    /// Most recent value uploaded to the uniform `name`.
    #[must_use]
    pub fn last_uniform(&self, name: &str) -> Option<UniformValue> {
        self.commands.iter().rev().find_map(|c| match c {
            BackendCommand::SetUniform { name: n, value, .. } if n == name => Some(*value),
            _ => None,
        })
    }

    #[must_use]
    pub fn draw_calls(&self) -> Vec<DrawIndexed> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                BackendCommand::DrawIndexed(draw) => Some(*draw),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn program_binds(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, BackendCommand::UseProgram(Some(_))))
            .count()
    }
}

impl GraphicsBackend for RecordingBackend {
    fn compile_program(&mut self, vertex_source: &str, fragment_source: &str) -> Result<ProgramId> {
        if vertex_source.trim().is_empty() {
            return Err(ArborError::ShaderCompile("empty vertex shader source".into()));
        }
        if fragment_source.trim().is_empty() {
            return Err(ArborError::ShaderCompile("empty fragment shader source".into()));
        }
        self.next_program += 1;
        let program = ProgramId(self.next_program);
        self.commands.push(BackendCommand::CompileProgram(program));
        Ok(program)
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        if self.optimized_out.contains(name) {
            return None;
        }
        let key = (program, name.to_string());
        if let Some(location) = self.locations.get(&key) {
            return Some(*location);
        }
        let location = UniformLocation(self.next_location);
        self.next_location += 1;
        self.locations.insert(key, location);
        self.location_names.insert(location, name.to_string());
        Some(location)
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        self.commands.push(BackendCommand::UseProgram(program));
    }

    fn set_uniform(&mut self, location: UniformLocation, value: &UniformValue) {
        let name = self.location_names.get(&location).cloned().unwrap_or_default();
        self.commands.push(BackendCommand::SetUniform {
            location,
            name,
            value: *value,
        });
    }

    fn create_buffer(&mut self, target: BufferTarget, contents: &[u8]) -> BufferId {
        self.next_buffer += 1;
        let buffer = BufferId(self.next_buffer);
        self.commands.push(BackendCommand::CreateBuffer {
            buffer,
            target,
            size: contents.len(),
        });
        buffer
    }

    fn bind_texture(&mut self, texture: TextureId, unit: u32) {
        self.commands.push(BackendCommand::BindTexture { texture, unit });
    }

    fn draw_indexed(&mut self, draw: &DrawIndexed) {
        self.commands.push(BackendCommand::DrawIndexed(*draw));
    }
}
