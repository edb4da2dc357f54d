//! # Arbor
//!
//! A small scene-graph rendering engine: hierarchical transforms with lazy
//! matrix caches, a flat per-type node index, and a render engine that binds
//! lights and per-object uniforms against a pluggable graphics backend.
//!
//! ## Crate Layout
//!
//! | Crate | Contents |
//! |-------|----------|
//! | [`arbor_core`](core) | math helpers, [`ArborError`], [`EngineSettings`], [`FrameClock`] |
//! | [`arbor_resources`](resources) | [`GraphicsBackend`], [`GpuContext`], [`Shader`], [`Mesh`] |
//! | [`arbor_scene`](scene) | [`Scene`], nodes, views, cameras, lights |
//! | [`arbor_render`](render) | [`RenderEngine`], light binding, depth sorting |
//!
//! ## Example
//!
//! ```rust,ignore
//! use arbor::prelude::*;
//!
//! let settings = EngineSettings::default();
//! let mut ctx = GpuContext::new(RecordingBackend::new());
//! let mut shader = Shader::new(VS, FS).with_uniforms(standard_uniforms(&settings));
//! shader.compile(&mut ctx)?;
//!
//! let mut scene = Scene::with_view(
//!     Some(View::new_perspective(60.0, Vec2::new(800.0, 600.0), 0.1, 100.0)),
//!     Some(Camera::new_look_at(Vec3::ZERO, Vec3::ZERO, 10.0)),
//! );
//! let pivot = scene.add_transform(Transform::from_position(Vec3::X), Some(scene.root()))?;
//! scene.add_render(mesh, false, Some(pivot))?;
//!
//! let mut engine = RenderEngine::new(shader, settings)?;
//! scene.update();
//! engine.render(&scene, &mut ctx)?;
//! ```

pub use arbor_core as core;
pub use arbor_render as render;
pub use arbor_resources as resources;
pub use arbor_scene as scene;

pub use arbor_core::{ArborError, EngineSettings, FrameClock, LightOverflowPolicy, Result};
pub use arbor_render::{FrameStats, RenderEngine};
pub use arbor_resources::{GpuContext, GraphicsBackend, Mesh, RecordingBackend, Shader};
pub use arbor_scene::{NodeHandle, Scene};

pub mod prelude {
    pub use arbor_core::math::{Mat4, Vec2, Vec3, Vec4};
    pub use arbor_core::{ArborError, EngineSettings, FrameClock, LightOverflowPolicy, Result};
    pub use arbor_render::{DepthSort, FrameStats, RenderEngine, SortMethod, standard_uniforms};
    pub use arbor_resources::{
        GpuContext, GraphicsBackend, Mesh, RecordingBackend, Shader, TextureId, UniformKind, UniformValue,
    };
    pub use arbor_scene::{
        Attenuation, Camera, Light, NodeHandle, NodeKind, NodeType, Scene, SceneNode, Transform, View,
    };
}
