//! Per-frame render driver.
//!
//! # Frame Flow
//! ```text
//! flat index → sort → bind shader → sampler/camera uniforms → lights
//!            → per node: Transformation, LocalTransformation, mesh draw
//! ```
//!
//! The engine only reads the scene. Matrices are taken from the caches that
//! `Scene::update` filled, or resolved on the fly for nodes that are stale.

use glam::Mat4;

use arbor_core::errors::{ArborError, Result};
use arbor_core::settings::EngineSettings;
use arbor_resources::backend::{GpuContext, GraphicsBackend};
use arbor_resources::shader::Shader;
use arbor_scene::node::{Node, NodeType};
use arbor_scene::{NodeHandle, Scene};

use crate::lighting::LightBinder;
use crate::sort::{DepthSort, DrawLists, SortMethod};
use crate::uniforms::UniformNames;

/// Counters of one rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub opaque: usize,
    pub transparent: usize,
    pub lights_bound: usize,
    pub draw_calls: usize,
}

pub struct RenderEngine {
    shader: Shader,
    settings: EngineSettings,
    names: UniformNames,
    lights: LightBinder,
    sort_method: Option<Box<dyn SortMethod>>,
    /// `settings.texture_unit`, shared by the sampler uniform and mesh binds.
    texture_unit: u32,
}

impl RenderEngine {
    /// Creates an engine drawing with `shader`, which must be compiled
    /// before the first [`render`](Self::render). Depth sorting is enabled
    /// when `settings.depth_sort` is set.
    pub fn new(shader: Shader, settings: EngineSettings) -> Result<Self> {
        settings.validate()?;
        let texture_unit = u32::try_from(settings.texture_unit)
            .map_err(|_| ArborError::Config(format!("invalid texture_unit {}", settings.texture_unit)))?;
        let names = UniformNames::new(&settings);
        let lights = LightBinder::new(settings.max_point_lights, settings.light_overflow);
        let sort_method: Option<Box<dyn SortMethod>> = if settings.depth_sort {
            Some(Box::new(DepthSort))
        } else {
            None
        };
        Ok(Self {
            shader,
            settings,
            names,
            lights,
            sort_method,
            texture_unit,
        })
    }

    /// Replaces the draw-order policy.
    #[must_use]
    pub fn with_sort_method(mut self, sort_method: impl SortMethod + 'static) -> Self {
        self.sort_method = Some(Box::new(sort_method));
        self
    }

    /// Draws in flat-index order.
    #[must_use]
    pub fn without_sorting(mut self) -> Self {
        self.sort_method = None;
        self
    }

    #[inline]
    #[must_use]
    pub fn shader(&self) -> &Shader {
        &self.shader
    }

    #[inline]
    pub fn shader_mut(&mut self) -> &mut Shader {
        &mut self.shader
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    #[inline]
    #[must_use]
    pub fn uniform_names(&self) -> &UniformNames {
        &self.names
    }

    #[inline]
    #[must_use]
    pub fn lights(&self) -> &LightBinder {
        &self.lights
    }

    /// Opaque and transparent render nodes in draw order.
    #[must_use]
    pub fn sorted_render_nodes(&self, scene: &Scene) -> Result<DrawLists> {
        let opaque = scene.flat_nodes(NodeType::RenderOpaque).to_vec();
        let transparent = scene.flat_nodes(NodeType::RenderTransparent).to_vec();
        match &self.sort_method {
            Some(method) => method.sort(scene, opaque, transparent),
            None => Ok((opaque, transparent)),
        }
    }

    /// Draws one frame of `scene`. The first error aborts the frame.
    pub fn render<B: GraphicsBackend>(&mut self, scene: &Scene, ctx: &mut GpuContext<B>) -> Result<FrameStats> {
        let (opaque, transparent) = self.sorted_render_nodes(scene)?;
        let mut stats = FrameStats {
            opaque: opaque.len(),
            transparent: transparent.len(),
            ..Default::default()
        };

        self.shader.bind(ctx)?;
        self.shader.uniform(ctx, &self.names.tex_sampler, self.settings.texture_unit)?;
        if let Some(camera) = scene.camera() {
            self.shader.uniform(ctx, &self.names.camera_pos, camera.world_position())?;
        }

        self.lights.release_departed(scene, &self.shader, ctx, &self.names)?;
        for &light in scene.flat_nodes(NodeType::Light) {
            if self.lights.bind(scene, light, &self.shader, ctx, &self.names)? {
                stats.lights_bound += 1;
            }
        }

        for &handle in opaque.iter().chain(&transparent) {
            self.draw_node(scene, handle, ctx)?;
            stats.draw_calls += 1;
        }

        log::trace!(
            "Frame: {} opaque, {} transparent, {} lights, {} draws",
            stats.opaque,
            stats.transparent,
            stats.lights_bound,
            stats.draw_calls
        );
        Ok(stats)
    }

    fn draw_node<B: GraphicsBackend>(&self, scene: &Scene, handle: NodeHandle, ctx: &mut GpuContext<B>) -> Result<()> {
        let render_node = scene
            .get_node(handle)
            .and_then(Node::render_node)
            .ok_or(ArborError::NodeNotFound)?;
        let render = scene.resolve_render_matrix(handle)?.unwrap_or(Mat4::IDENTITY);
        let transform = scene.resolve_transform_matrix(handle)?.unwrap_or(Mat4::IDENTITY);

        self.shader.uniform(ctx, &self.names.transformation, render)?;
        self.shader.uniform(ctx, &self.names.local_transformation, transform)?;
        render_node.mesh().render(ctx, self.texture_unit)
    }
}
