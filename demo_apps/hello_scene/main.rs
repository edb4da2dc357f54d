//! Headless demo: a lit, rotating scene rendered against the recording
//! backend for a fixed number of frames.
//!
//! Run with `RUST_LOG=debug` to see structural changes and per-frame stats.

use std::sync::Arc;

use arbor::prelude::*;

const VERTEX_SHADER: &str = r"
    #version 330
    layout(location = 0) in vec3 position;
    uniform mat4 ARBOR_Transformation;
    void main() { gl_Position = ARBOR_Transformation * vec4(position, 1.0); }
";

const FRAGMENT_SHADER: &str = r"
    #version 330
    out vec4 color;
    void main() { color = vec4(1.0); }
";

const FRAMES: u64 = 120;

fn quad(ctx: &mut GpuContext<RecordingBackend>) -> Result<Arc<Mesh>> {
    let mut mesh = Mesh::builder(vec![
        [-0.5, -0.5, 0.0],
        [0.5, -0.5, 0.0],
        [0.5, 0.5, 0.0],
        [-0.5, 0.5, 0.0],
    ])
    .texture_coords(vec![[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]])
    .indices(vec![0, 1, 2, 2, 3, 0])
    .build()?;
    mesh.upload(ctx);
    Ok(Arc::new(mesh))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let settings = EngineSettings::default();
    let mut ctx = GpuContext::new(RecordingBackend::new());

    let mut shader = Shader::new(VERTEX_SHADER, FRAGMENT_SHADER).with_uniforms(standard_uniforms(&settings));
    shader.compile(&mut ctx)?;
    let mut engine = RenderEngine::new(shader, settings)?;

    let mut scene = Scene::with_view(
        Some(View::new_perspective(60.0, Vec2::new(1280.0, 720.0), 0.1, 100.0)),
        Some(Camera::new_look_at(Vec3::ZERO, Vec3::new(0.3, 0.0, 0.0), 8.0)),
    );
    let root = scene.root();
    let mesh = quad(&mut ctx)?;

    let spinner = scene.add_transform(Transform::default(), Some(root))?;
    for x in [-2.0, 0.0, 2.0] {
        let offset = Transform::from_position(Vec3::new(x, 0.0, 0.0));
        let arm = scene.add_transform(offset, Some(spinner))?;
        scene.add_render(mesh.clone(), false, Some(arm))?;
    }
    let label = scene.add_billboard(Transform::from_position(Vec3::new(0.0, 2.0, 0.0)), Some(root))?;
    scene.add_render(mesh.clone(), true, Some(label))?;

    scene.add_light(Light::new_ambient(Vec3::ONE, 0.2), Some(root))?;
    scene.add_light(Light::new_directional(Vec3::ONE, 0.6, Vec3::new(-1.0, -1.0, -1.0)), Some(root))?;
    let lamp = scene.add_transform(Transform::from_position(Vec3::new(0.0, 3.0, 3.0)), Some(root))?;
    scene.add_light(
        Light::new_point(
            Vec3::new(1.0, 0.8, 0.6),
            1.5,
            Attenuation {
                constant: 1.0,
                linear: 0.1,
                exponent: 0.01,
            },
        ),
        Some(lamp),
    )?;

    let mut clock = FrameClock::new(None, 30);
    let mut totals = FrameStats::default();
    while clock.frame_count < FRAMES {
        clock.tick();
        scene.node(spinner).rotate(Vec3::new(0.0, 0.02, 0.0));
        if let Some(camera) = scene.camera_mut() {
            let r = camera.rotation();
            camera.set_rotation(r + Vec3::new(0.0, 0.005, 0.0));
        }

        scene.update();
        let stats = engine.render(&scene, &mut ctx)?;
        totals.draw_calls += stats.draw_calls;
        totals.lights_bound = stats.lights_bound;
        totals.opaque = stats.opaque;
        totals.transparent = stats.transparent;
    }

    log::info!(
        "Rendered {} frames: {} draw calls, {} opaque + {} transparent per frame, {} lights",
        clock.frame_count,
        totals.draw_calls,
        totals.opaque,
        totals.transparent,
        totals.lights_bound
    );
    log::info!(
        "Frame time avg {:?}, best {:?}, worst {:?} ({:.0} fps)",
        clock.average(),
        clock.best(),
        clock.worst(),
        clock.fps()
    );
    log::info!("Backend recorded {} commands", ctx.backend().commands().len());
    Ok(())
}
