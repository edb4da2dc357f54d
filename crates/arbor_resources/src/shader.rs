//! Shader programs with a fixed, declared uniform set.
//!
//! Every uniform a shader will ever receive is declared up front together
//! with its [`UniformKind`]. `compile()` resolves each declaration to a
//! location exactly once; afterwards [`Shader::uniform`] only accepts
//! declared names with matching value kinds, so a typo in a uniform name is
//! an error instead of a silently missing upload.
//!
//! ```rust,ignore
//! let mut shader = Shader::new(VERTEX_SRC, FRAGMENT_SRC)
//!     .with_uniform("ARBOR_Transformation", UniformKind::Mat4)
//!     .with_uniform("ARBOR_TexSampler", UniformKind::Int);
//! shader.compile(&mut ctx)?;
//!
//! shader.bind(&mut ctx)?;
//! shader.uniform(&mut ctx, "ARBOR_TexSampler", 0)?;
//! ```

use rustc_hash::FxHashMap;

use arbor_core::errors::{ArborError, Result};

use crate::backend::{GpuContext, GraphicsBackend, ProgramId, UniformKind, UniformLocation, UniformValue};

#[derive(Debug, Clone, Copy)]
struct UniformSlot {
    /// `None` when the driver optimised the uniform away
    location: Option<UniformLocation>,
    kind: UniformKind,
}

#[derive(Debug, Clone)]
pub struct Shader {
    vertex_source: String,
    fragment_source: String,
    declarations: Vec<(String, UniformKind)>,
    program: Option<ProgramId>,
    slots: FxHashMap<String, UniformSlot>,
}

impl Shader {
    #[must_use]
    pub fn new(vertex_source: impl Into<String>, fragment_source: impl Into<String>) -> Self {
        Self {
            vertex_source: vertex_source.into(),
            fragment_source: fragment_source.into(),
            declarations: Vec::new(),
            program: None,
            slots: FxHashMap::default(),
        }
    }

    /// Declares a uniform. Re-declaring a name replaces its kind.
    #[must_use]
    pub fn with_uniform(mut self, name: impl Into<String>, kind: UniformKind) -> Self {
        self.declare(name.into(), kind);
        self
    }

    #[must_use]
    pub fn with_uniforms<I, S>(mut self, uniforms: I) -> Self
    where
        I: IntoIterator<Item = (S, UniformKind)>,
        S: Into<String>,
    {
        for (name, kind) in uniforms {
            self.declare(name.into(), kind);
        }
        self
    }

    fn declare(&mut self, name: String, kind: UniformKind) {
        if let Some(existing) = self.declarations.iter_mut().find(|(n, _)| *n == name) {
            existing.1 = kind;
        } else {
            self.declarations.push((name, kind));
        }
    }

    /// Compiles the program and resolves every declared uniform.
    ///
    /// Compiling again (e.g. after a context loss) replaces the program and
    /// re-resolves all locations.
    pub fn compile<B: GraphicsBackend>(&mut self, ctx: &mut GpuContext<B>) -> Result<()> {
        let program = ctx
            .backend_mut()
            .compile_program(&self.vertex_source, &self.fragment_source)?;

        let mut slots = FxHashMap::default();
        for (name, kind) in &self.declarations {
            let location = ctx.backend_mut().uniform_location(program, name);
            if location.is_none() {
                log::warn!("Uniform '{name}' is not active in the compiled program; uploads will be skipped");
            }
            slots.insert(name.clone(), UniformSlot { location, kind: *kind });
        }

        log::debug!(
            "Compiled shader program {:?} with {} uniforms",
            program,
            slots.len()
        );
        self.program = Some(program);
        self.slots = slots;
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn is_compiled(&self) -> bool {
        self.program.is_some()
    }

    #[inline]
    #[must_use]
    pub fn program(&self) -> Option<ProgramId> {
        self.program
    }

    #[must_use]
    pub fn has_uniform(&self, name: &str) -> bool {
        self.declarations.iter().any(|(n, _)| n == name)
    }

    /// Makes this shader current. Binding an already current shader issues
    /// no backend call.
    pub fn bind<B: GraphicsBackend>(&self, ctx: &mut GpuContext<B>) -> Result<()> {
        let program = self.program.ok_or(ArborError::ShaderNotCompiled)?;
        ctx.use_program(Some(program));
        Ok(())
    }

    pub fn unbind<B: GraphicsBackend>(&self, ctx: &mut GpuContext<B>) {
        ctx.use_program(None);
    }

    /// Uploads `value` to the declared uniform `name`.
    pub fn uniform<B: GraphicsBackend>(
        &self,
        ctx: &mut GpuContext<B>,
        name: &str,
        value: impl Into<UniformValue>,
    ) -> Result<()> {
        if self.program.is_none() {
            return Err(ArborError::ShaderNotCompiled);
        }
        let slot = self
            .slots
            .get(name)
            .ok_or_else(|| ArborError::UnknownUniform(name.to_string()))?;

        let value = value.into();
        if value.kind() != slot.kind {
            return Err(ArborError::UniformTypeMismatch {
                name: name.to_string(),
                expected: slot.kind.name(),
                found: value.kind().name(),
            });
        }

        if let Some(location) = slot.location {
            ctx.backend_mut().set_uniform(location, &value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordingBackend;
    use glam::Vec3;

    const VS: &str = "void main() {}";
    const FS: &str = "void main() {}";

    fn compiled(backend: RecordingBackend) -> (Shader, GpuContext<RecordingBackend>) {
        let mut ctx = GpuContext::new(backend);
        let mut shader = Shader::new(VS, FS)
            .with_uniform("Color", UniformKind::Vec3)
            .with_uniform("Sampler", UniformKind::Int);
        shader.compile(&mut ctx).unwrap();
        (shader, ctx)
    }

    #[test]
    fn declared_uniform_is_uploaded() {
        let (shader, mut ctx) = compiled(RecordingBackend::new());
        shader.uniform(&mut ctx, "Color", Vec3::X).unwrap();
        assert_eq!(ctx.backend().last_uniform("Color"), Some(UniformValue::Vec3(Vec3::X)));
    }

    #[test]
    fn undeclared_uniform_is_rejected() {
        let (shader, mut ctx) = compiled(RecordingBackend::new());
        let err = shader.uniform(&mut ctx, "Colour", Vec3::X).unwrap_err();
        assert!(matches!(err, ArborError::UnknownUniform(ref n) if n == "Colour"));
    }

    #[test]
    fn wrong_value_kind_is_rejected() {
        let (shader, mut ctx) = compiled(RecordingBackend::new());
        let err = shader.uniform(&mut ctx, "Sampler", 1.0_f32).unwrap_err();
        assert!(matches!(
            err,
            ArborError::UniformTypeMismatch { expected: "int", found: "float", .. }
        ));
    }

    #[test]
    fn use_before_compile_fails() {
        let mut ctx = GpuContext::new(RecordingBackend::new());
        let shader = Shader::new(VS, FS).with_uniform("Sampler", UniformKind::Int);
        assert!(matches!(shader.bind(&mut ctx), Err(ArborError::ShaderNotCompiled)));
        assert!(matches!(
            shader.uniform(&mut ctx, "Sampler", 0),
            Err(ArborError::ShaderNotCompiled)
        ));
    }

    #[test]
    fn compile_errors_propagate() {
        let mut ctx = GpuContext::new(RecordingBackend::new());
        let mut shader = Shader::new("", FS);
        assert!(matches!(shader.compile(&mut ctx), Err(ArborError::ShaderCompile(_))));
        assert!(!shader.is_compiled());
    }

    #[test]
    fn inactive_uniform_is_accepted_but_not_uploaded() {
        let (shader, mut ctx) = compiled(RecordingBackend::new().with_optimized_out(["Color"]));
        shader.uniform(&mut ctx, "Color", Vec3::ONE).unwrap();
        assert!(ctx.backend().uniform_values("Color").is_empty());
    }

    #[test]
    fn binding_twice_issues_one_backend_call() {
        let (shader, mut ctx) = compiled(RecordingBackend::new());
        shader.bind(&mut ctx).unwrap();
        shader.bind(&mut ctx).unwrap();
        assert_eq!(ctx.backend().program_binds(), 1);

        shader.unbind(&mut ctx);
        shader.bind(&mut ctx).unwrap();
        assert_eq!(ctx.backend().program_binds(), 2);
    }

    #[test]
    fn redeclaring_replaces_kind() {
        let shader = Shader::new(VS, FS)
            .with_uniform("Value", UniformKind::Int)
            .with_uniform("Value", UniformKind::Float);
        assert_eq!(shader.declarations.len(), 1);
        assert_eq!(shader.declarations[0].1, UniformKind::Float);
    }
}
