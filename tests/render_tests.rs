//! Render engine tests
//!
//! Tests for:
//! - Default depth sort and custom sort methods
//! - Per-frame shader binding and uniform upload
//! - Light binding and point-light slot allocation
//! - Error propagation (uncompiled shader, missing uniforms, mesh upload)

use std::sync::Arc;

use arbor::core::errors::ArborError;
use arbor::core::settings::{EngineSettings, LightOverflowPolicy};
use arbor::render::{DepthSort, FrameStats, RenderEngine, SortMethod, standard_uniforms};
use arbor::resources::backend::{GpuContext, TextureId, UniformKind, UniformValue};
use arbor::resources::recording::{BackendCommand, RecordingBackend};
use arbor::resources::{Mesh, Shader};
use arbor::scene::light::{Attenuation, Light};
use arbor::scene::node::NodeType;
use arbor::scene::transform::Transform;
use arbor::scene::view::{Camera, View};
use arbor::scene::{NodeHandle, Scene};
use glam::{Mat4, Vec2, Vec3};

// ============================================================================
// Helper
// ============================================================================

const VS: &str = "void main() { gl_Position = vec4(0.0); }";
const FS: &str = "void main() {}";

fn context() -> GpuContext<RecordingBackend> {
    let _ = env_logger::builder().is_test(true).try_init();
    GpuContext::new(RecordingBackend::new())
}

fn engine(ctx: &mut GpuContext<RecordingBackend>, settings: EngineSettings) -> RenderEngine {
    let mut shader = Shader::new(VS, FS).with_uniforms(standard_uniforms(&settings));
    shader.compile(ctx).unwrap();
    RenderEngine::new(shader, settings).unwrap()
}

fn uploaded_mesh(ctx: &mut GpuContext<RecordingBackend>) -> Arc<Mesh> {
    let mut mesh = Mesh::builder(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]])
        .texture(TextureId(1))
        .build()
        .unwrap();
    mesh.upload(ctx);
    Arc::new(mesh)
}

/// Camera at the origin looking down -z: view depth equals -z.
fn camera_scene() -> Scene {
    Scene::with_view(
        Some(View::new_perspective(60.0, Vec2::new(800.0, 600.0), 0.1, 100.0)),
        Some(Camera::new_look_from(Vec3::ZERO, Vec3::ZERO)),
    )
}

fn add_at_depth(scene: &mut Scene, mesh: &Arc<Mesh>, depth: f32, transparent: bool) -> NodeHandle {
    let pivot = scene
        .add_transform(Transform::from_position(Vec3::new(0.0, 0.0, -depth)), Some(scene.root()))
        .unwrap();
    scene.add_render(mesh.clone(), transparent, Some(pivot)).unwrap()
}

fn add_point_light(scene: &mut Scene, position: Vec3) -> NodeHandle {
    let pivot = scene
        .add_transform(Transform::from_position(position), Some(scene.root()))
        .unwrap();
    scene
        .add_light(Light::new_point(Vec3::ONE, 2.0, Attenuation::default()), Some(pivot))
        .unwrap()
}

fn depths(scene: &Scene, nodes: &[NodeHandle]) -> Vec<f32> {
    nodes.iter().map(|&h| scene.view_depth(h).unwrap().round()).collect()
}

// ============================================================================
// Sorting
// ============================================================================

#[test]
fn depth_sort_orders_opaque_front_to_back_transparent_back_to_front() {
    let mut ctx = context();
    let mesh = uploaded_mesh(&mut ctx);
    let mut scene = camera_scene();
    for depth in [5.0, 1.0, 3.0] {
        add_at_depth(&mut scene, &mesh, depth, false);
    }
    for depth in [2.0, 4.0] {
        add_at_depth(&mut scene, &mesh, depth, true);
    }
    scene.update();

    let (opaque, transparent) = DepthSort.sort(
        &scene,
        scene.flat_nodes(NodeType::RenderOpaque).to_vec(),
        scene.flat_nodes(NodeType::RenderTransparent).to_vec(),
    )
    .unwrap();
    assert_eq!(depths(&scene, &opaque), vec![1.0, 3.0, 5.0]);
    assert_eq!(depths(&scene, &transparent), vec![4.0, 2.0]);

    let engine = engine(&mut ctx, EngineSettings::default());
    assert_eq!(engine.sorted_render_nodes(&scene).unwrap(), (opaque, transparent));
}

#[test]
fn sorting_can_be_disabled_or_replaced() {
    let mut ctx = context();
    let mesh = uploaded_mesh(&mut ctx);
    let mut scene = camera_scene();
    let a = add_at_depth(&mut scene, &mesh, 5.0, false);
    let b = add_at_depth(&mut scene, &mesh, 1.0, false);

    let settings = EngineSettings {
        depth_sort: false,
        ..Default::default()
    };
    let unsorted = engine(&mut ctx, settings);
    assert_eq!(unsorted.sorted_render_nodes(&scene).unwrap().0, vec![a, b]);

    let reversed = engine(&mut ctx, EngineSettings::default()).with_sort_method(
        |_: &Scene, mut opaque: Vec<NodeHandle>, transparent: Vec<NodeHandle>| {
            opaque.reverse();
            (opaque, transparent)
        },
    );
    assert_eq!(reversed.sorted_render_nodes(&scene).unwrap().0, vec![b, a]);
}

// ============================================================================
// Frame Rendering
// ============================================================================

#[test]
fn frame_draws_every_node_with_its_matrices() {
    let mut ctx = context();
    let mesh = uploaded_mesh(&mut ctx);
    let mut scene = camera_scene();
    let near = add_at_depth(&mut scene, &mesh, 2.0, false);
    let far = add_at_depth(&mut scene, &mesh, 8.0, false);
    let glass = add_at_depth(&mut scene, &mesh, 4.0, true);
    scene.update();

    let mut engine = engine(&mut ctx, EngineSettings::default());
    ctx.backend_mut().clear();
    let stats = engine.render(&scene, &mut ctx).unwrap();

    assert_eq!(
        stats,
        FrameStats {
            opaque: 2,
            transparent: 1,
            lights_bound: 0,
            draw_calls: 3,
        }
    );
    let backend = ctx.backend();
    assert_eq!(backend.draw_calls().len(), 3);
    assert_eq!(backend.program_binds(), 1);
    assert_eq!(backend.last_uniform("ARBOR_TexSampler"), Some(UniformValue::Int(0)));
    assert_eq!(
        backend.last_uniform("ARBOR_CameraPos"),
        Some(UniformValue::Vec3(Vec3::ZERO))
    );

    let mut expected_render = Vec::new();
    let mut expected_local = Vec::new();
    for h in [near, far, glass] {
        expected_render.push(UniformValue::Mat4(scene.resolve_render_matrix(h).unwrap().unwrap()));
        expected_local.push(UniformValue::Mat4(scene.resolve_transform_matrix(h).unwrap().unwrap()));
    }
    assert_eq!(backend.uniform_values("ARBOR_Transformation"), expected_render);
    assert_eq!(backend.uniform_values("ARBOR_LocalTransformation"), expected_local);
}

#[test]
fn mesh_texture_binds_to_configured_sampler_unit() {
    let mut ctx = context();
    let mesh = uploaded_mesh(&mut ctx);
    let mut scene = camera_scene();
    add_at_depth(&mut scene, &mesh, 3.0, false);
    scene.update();

    let settings = EngineSettings {
        texture_unit: 2,
        ..Default::default()
    };
    let mut engine = engine(&mut ctx, settings);
    ctx.backend_mut().clear();
    engine.render(&scene, &mut ctx).unwrap();

    let backend = ctx.backend();
    assert_eq!(backend.last_uniform("ARBOR_TexSampler"), Some(UniformValue::Int(2)));
    let units: Vec<u32> = backend
        .commands()
        .iter()
        .filter_map(|c| match c {
            BackendCommand::BindTexture { unit, .. } => Some(*unit),
            _ => None,
        })
        .collect();
    assert_eq!(units, vec![2]);
}

#[test]
fn shader_is_bound_once_across_frames() {
    let mut ctx = context();
    let mesh = uploaded_mesh(&mut ctx);
    let mut scene = camera_scene();
    add_at_depth(&mut scene, &mesh, 1.0, false);
    add_at_depth(&mut scene, &mesh, 2.0, false);
    scene.update();

    let mut engine = engine(&mut ctx, EngineSettings::default());
    engine.render(&scene, &mut ctx).unwrap();
    engine.render(&scene, &mut ctx).unwrap();
    assert_eq!(ctx.backend().program_binds(), 1);
    assert_eq!(ctx.backend().draw_calls().len(), 4);
}

#[test]
fn untransformed_node_uploads_identity() {
    let mut ctx = context();
    let mesh = uploaded_mesh(&mut ctx);
    let mut scene = Scene::new();
    scene.add_render(mesh, false, Some(scene.root())).unwrap();

    let mut engine = engine(&mut ctx, EngineSettings::default());
    engine.render(&scene, &mut ctx).unwrap();
    assert_eq!(
        ctx.backend().last_uniform("ARBOR_Transformation"),
        Some(UniformValue::Mat4(Mat4::IDENTITY))
    );
    // No camera, no camera uniform
    assert!(ctx.backend().uniform_values("ARBOR_CameraPos").is_empty());
}

#[test]
fn render_does_not_mutate_scene() {
    let mut ctx = context();
    let mesh = uploaded_mesh(&mut ctx);
    let mut scene = camera_scene();
    let node = add_at_depth(&mut scene, &mesh, 3.0, false);

    let mut engine = engine(&mut ctx, EngineSettings::default());
    engine.render(&scene, &mut ctx).unwrap();
    // Never updated, so the cache is still cold
    assert!(scene.get_node(node).unwrap().cached_transform_matrix().is_none());
}

// ============================================================================
// Lights
// ============================================================================

#[test]
fn ambient_and_directional_lights_upload_uniforms() {
    let mut ctx = context();
    let mut scene = camera_scene();
    let root = scene.root();
    scene
        .add_light(Light::new_ambient(Vec3::new(0.1, 0.2, 0.3), 0.5), Some(root))
        .unwrap();
    scene
        .add_light(
            Light::new_directional(Vec3::ONE, 0.8, Vec3::new(0.0, -1.0, 0.0)).with_specular_power(16.0),
            Some(root),
        )
        .unwrap();

    let mut engine = engine(&mut ctx, EngineSettings::default());
    let stats = engine.render(&scene, &mut ctx).unwrap();
    assert_eq!(stats.lights_bound, 2);

    let backend = ctx.backend();
    assert_eq!(
        backend.last_uniform("ARBOR_AmbientLight.color"),
        Some(UniformValue::Vec3(Vec3::new(0.1, 0.2, 0.3)))
    );
    assert_eq!(backend.last_uniform("ARBOR_AmbientLight.intensity"), Some(UniformValue::Float(0.5)));
    assert_eq!(
        backend.last_uniform("ARBOR_DirectionalLight.normal"),
        Some(UniformValue::Vec3(Vec3::new(0.0, -1.0, 0.0)))
    );
    assert_eq!(
        backend.last_uniform("ARBOR_DirectionalLight.specularPower"),
        Some(UniformValue::Float(16.0))
    );
}

#[test]
fn point_lights_take_lowest_slots_and_overflow_fails() {
    let mut ctx = context();
    let mut scene = camera_scene();
    let lights: Vec<NodeHandle> = (0..4)
        .map(|i| add_point_light(&mut scene, Vec3::new(i as f32, 0.0, 0.0)))
        .collect();
    scene.update();

    let mut engine = engine(&mut ctx, EngineSettings::default());
    let stats = engine.render(&scene, &mut ctx).unwrap();
    assert_eq!(stats.lights_bound, 4);

    let mut slots: Vec<usize> = lights
        .iter()
        .map(|&l| engine.lights().slots().slot_of(l).unwrap())
        .collect();
    slots.sort_unstable();
    assert_eq!(slots, vec![0, 1, 2, 3]);

    let slot = engine.lights().slots().slot_of(lights[2]).unwrap();
    assert_eq!(
        ctx.backend().last_uniform(&format!("ARBOR_PointLights[{slot}].position")),
        Some(UniformValue::Vec3(Vec3::new(2.0, 0.0, 0.0)))
    );

    add_point_light(&mut scene, Vec3::ZERO);
    let err = engine.render(&scene, &mut ctx).unwrap_err();
    assert!(matches!(err, ArborError::TooManyLights { max: 4 }));
}

#[test]
fn overflow_skip_policy_renders_anyway() {
    let mut ctx = context();
    let mesh = uploaded_mesh(&mut ctx);
    let mut scene = camera_scene();
    for i in 0..5 {
        add_point_light(&mut scene, Vec3::splat(i as f32));
    }
    add_at_depth(&mut scene, &mesh, 1.0, false);

    let settings = EngineSettings {
        light_overflow: LightOverflowPolicy::Skip,
        ..Default::default()
    };
    let mut engine = engine(&mut ctx, settings);
    let stats = engine.render(&scene, &mut ctx).unwrap();
    assert_eq!(stats.lights_bound, 4);
    assert_eq!(stats.draw_calls, 1);
}

#[test]
fn departed_light_frees_its_slot_for_reuse() {
    let mut ctx = context();
    let mut scene = camera_scene();
    let lights: Vec<NodeHandle> = (0..4)
        .map(|i| add_point_light(&mut scene, Vec3::new(0.0, i as f32, 0.0)))
        .collect();

    let mut engine = engine(&mut ctx, EngineSettings::default());
    engine.render(&scene, &mut ctx).unwrap();
    let freed = engine.lights().slots().slot_of(lights[1]).unwrap();

    scene.remove_node(lights[1]).unwrap();
    let newcomer = add_point_light(&mut scene, Vec3::new(9.0, 9.0, 9.0));
    ctx.backend_mut().clear();
    engine.render(&scene, &mut ctx).unwrap();

    assert_eq!(engine.lights().slots().slot_of(newcomer), Some(freed));
    assert_eq!(engine.lights().slots().slot_of(lights[1]), None);

    let backend = ctx.backend();
    let intensity = format!("ARBOR_PointLights[{freed}].intensity");
    // Zeroed on release, then overwritten by the newcomer
    assert_eq!(
        backend.uniform_values(&intensity),
        vec![UniformValue::Float(0.0), UniformValue::Float(2.0)]
    );
    assert_eq!(
        backend.last_uniform(&format!("ARBOR_PointLights[{freed}].position")),
        Some(UniformValue::Vec3(Vec3::new(9.0, 9.0, 9.0)))
    );
}

#[test]
fn detached_light_is_released_next_frame() {
    let mut ctx = context();
    let mut scene = camera_scene();
    let light = add_point_light(&mut scene, Vec3::ONE);
    let pivot = scene.get_node(light).unwrap().parent().unwrap();

    let mut engine = engine(&mut ctx, EngineSettings::default());
    engine.render(&scene, &mut ctx).unwrap();
    assert_eq!(engine.lights().slots().bound_count(), 1);

    scene.detach(pivot).unwrap();
    let stats = engine.render(&scene, &mut ctx).unwrap();
    assert_eq!(stats.lights_bound, 0);
    assert_eq!(engine.lights().slots().bound_count(), 0);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn uncompiled_shader_fails_frame() {
    let mut ctx = context();
    let settings = EngineSettings::default();
    let shader = Shader::new(VS, FS).with_uniforms(standard_uniforms(&settings));
    let mut engine = RenderEngine::new(shader, settings).unwrap();

    let scene = Scene::new();
    assert!(matches!(
        engine.render(&scene, &mut ctx),
        Err(ArborError::ShaderNotCompiled)
    ));
}

#[test]
fn undeclared_engine_uniform_is_reported() {
    let mut ctx = context();
    let mut shader = Shader::new(VS, FS).with_uniform("ARBOR_Transformation", UniformKind::Mat4);
    shader.compile(&mut ctx).unwrap();
    let mut engine = RenderEngine::new(shader, EngineSettings::default()).unwrap();

    let err = engine.render(&Scene::new(), &mut ctx).unwrap_err();
    assert!(matches!(err, ArborError::UnknownUniform(ref name) if name == "ARBOR_TexSampler"));
}

#[test]
fn mesh_must_be_uploaded() {
    let mut ctx = context();
    let mut scene = Scene::new();
    let mesh = Arc::new(Mesh::builder(vec![[0.0; 3]; 3]).build().unwrap());
    scene.add_render(mesh, false, Some(scene.root())).unwrap();

    let mut engine = engine(&mut ctx, EngineSettings::default());
    assert!(matches!(
        engine.render(&scene, &mut ctx),
        Err(ArborError::MeshNotUploaded)
    ));
}

#[test]
fn settings_from_json_drive_engine() -> anyhow::Result<()> {
    let mut ctx = context();
    let settings = EngineSettings::from_json(r#"{ "max_point_lights": 2, "uniform_prefix": "GAME_" }"#)?;
    let engine = engine(&mut ctx, settings);
    assert_eq!(engine.uniform_names().point_lights.len(), 2);
    assert_eq!(engine.uniform_names().camera_pos, "GAME_CameraPos");
    assert_eq!(engine.lights().slots().max(), 2);

    let invalid = EngineSettings {
        max_point_lights: 0,
        ..Default::default()
    };
    let shader = Shader::new(VS, FS);
    assert!(matches!(RenderEngine::new(shader, invalid), Err(ArborError::Config(_))));
    Ok(())
}
