use std::error::Error;
use std::fs;
use std::path::PathBuf;

use softpipe::prelude::*;

const ANIMATION_FRAMES: usize = 24;

/// Populate the demo scene: a rotated cube, a textured plane, a diamond and the
/// light marker.
fn create_scene(scene: &mut Scene) -> Result<(), PipelineError> {
    let cube = scene.create_node_with_builtin("cube", "cube", 150.0, None, None)?;
    scene.rotate(cube, Vec3::new(1.6, -3.87, 0.0), TransformOp::Set);

    let group = scene.create_node_with_builtin("satellites", "empty", 1.0, None, None)?;
    let diamond = scene.create_node_with_builtin("diamond", "diamond", 60.0, None, Some(group))?;
    scene.translate(diamond, Vec3::new(-280.0, 180.0, 0.0), TransformOp::Set);
    let plane = scene.create_node_with_builtin("plane", "plane", 70.0, Some("rgb"), Some(group))?;
    scene.translate(plane, Vec3::new(280.0, -180.0, 0.0), TransformOp::Set);

    scene.create_light_node("light", "diamond", 10.0)?;
    scene.set_lights(
        LightUpdate::new()
            .ambient(0.5)
            .point(0.6)
            .position(Vec3::new(200.0, 200.0, 300.0))
            .specular(4.0, 10.0),
    );
    scene.graph_mut().set_interactive_node(cube);
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let out_dir = PathBuf::from(std::env::args().nth(1).unwrap_or_else(|| "frames".into()));
    fs::create_dir_all(&out_dir)?;

    let mut settings = RenderSettings::new(DEFAULT_WIDTH, DEFAULT_HEIGHT);
    settings
        .projection(ProjectionType::Perspective)
        .backface_culling(true);
    let mut scene = Scene::init_pipeline(settings)?;
    create_scene(&mut scene)?;

    let mut rasterizer = ScanlineRasterizer::new();
    let mut surface = ImageSurface::new(DEFAULT_WIDTH as u32, DEFAULT_HEIGHT as u32);
    let mut loader = AssetLoader::new(scene.settings().init);
    loader.request_pending_textures(&scene);
    loader.finish(&mut scene);

    for mode in ShadingMode::ALL {
        scene.set_shading_mode(mode);
        scene.render_frame(&mut rasterizer, &mut surface);
        let path = out_dir.join(format!("shading-{mode}.png"));
        surface.save(&path)?;
        log::info!("wrote {}", path.display());
    }

    let mut animator = Animator::new(DEFAULT_WIDTH, DEFAULT_HEIGHT);
    if let Some(cube) = scene.graph().find("cube") {
        animator.assign(&mut scene, cube, Animation::Rotate { speed: Vec3::new(0.0, 0.1, 0.02) });
    }
    if let Some(group) = scene.graph().find("satellites") {
        animator.assign(&mut scene, group, Animation::Move { velocity: Vec3::new(12.0, 5.0, 0.0) });
    }

    let frame_loop = FrameLoop::new(true);
    let mut limiter = FrameLimiter::new(FPS);
    for frame in 0..ANIMATION_FRAMES {
        frame_loop.tick(&mut scene, &mut rasterizer, &mut surface, &mut animator, &mut loader);
        surface.save(out_dir.join(format!("frame-{frame:03}.png")))?;
        limiter.wait_and_get_delta();
    }

    let stats = scene.stats();
    println!(
        "{} frames, last {} polygons in {:?} (avg {:.1} fps)",
        stats.frames, stats.polygons, stats.duration, stats.average_fps
    );
    Ok(())
}
