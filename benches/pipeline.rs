use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use softpipe::bench::{FrameBuffer, ModelView, PolygonFill, Rasterizer, ScanlineRasterizer, Shader};
use softpipe::colors::{ColorEntry, WHITE};
use softpipe::light::{LightUpdate, Lights};
use softpipe::math::Vec3;
use softpipe::render::ShadingMode;
use softpipe::scene::SceneGraph;
use softpipe::transform::TransformOp;

const BUFFER_WIDTH: usize = 800;
const BUFFER_HEIGHT: usize = 600;

fn create_buffer() -> FrameBuffer {
    FrameBuffer::new(BUFFER_WIDTH, BUFFER_HEIGHT, WHITE).expect("valid canvas")
}

fn benchmark_reset(c: &mut Criterion) {
    let mut group = c.benchmark_group("framebuffer_reset");
    let color = ColorEntry::new("red", [255, 0, 0, 255]);

    for (name, side) in [("small", 50), ("medium", 200), ("full", BUFFER_HEIGHT as i32)] {
        group.bench_with_input(BenchmarkId::new("dirty", name), &side, |b, &side| {
            let mut fb = create_buffer();
            b.iter(|| {
                fb.set(0, 0, 0.0, &color, false, true);
                fb.set(side - 1, side - 1, 0.0, &color, false, true);
                black_box(fb.reset());
            });
        });
    }

    group.finish();
}

fn benchmark_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("polygon_fill");

    // Eye space for the shader, screen space for the rasterizer.
    let eye = vec![
        Vec3::new(-300.0, -200.0, 0.0),
        Vec3::new(300.0, -200.0, 50.0),
        Vec3::new(300.0, 200.0, 0.0),
        Vec3::new(-300.0, 200.0, -50.0),
    ];
    let screen = vec![
        Vec3::new(100.0, 500.0, 0.0),
        Vec3::new(700.0, 500.0, 50.0),
        Vec3::new(700.0, 100.0, 0.0),
        Vec3::new(100.0, 100.0, -50.0),
    ];
    let vertex_normals = vec![
        Vec3::new(-0.3, -0.3, 1.0).normalize(),
        Vec3::new(0.3, -0.3, 1.0).normalize(),
        Vec3::new(0.3, 0.3, 1.0).normalize(),
        Vec3::new(-0.3, 0.3, 1.0).normalize(),
    ];
    let polygon_normals = vec![Vec3::new(0.0, 0.0, 1.0)];
    let polygons = vec![vec![0, 1, 2, 3]];

    for mode in ShadingMode::ALL {
        group.bench_function(mode.name(), |b| {
            let mut fb = create_buffer();
            let mut rasterizer = ScanlineRasterizer::new();
            let mut color = ColorEntry::new("grey", [128, 128, 128, 255]);
            let mut shader = Shader::new(mode, Lights::default());
            shader.set_lights(
                &LightUpdate::new()
                    .ambient(0.3)
                    .point(0.7)
                    .position(Vec3::new(200.0, 200.0, 300.0))
                    .specular(0.5, 8.0),
            );
            shader.set_model(&ModelView {
                vertices: &eye,
                vertex_normals: &vertex_normals,
                polygon_normals: &polygon_normals,
                polygons: &polygons,
            });
            let fill = PolygonFill {
                vertices: &screen,
                polygon: &polygons[0],
                texture: None,
            };
            b.iter(|| {
                fb.reset();
                shader.set_polygon(0);
                rasterizer.fill_polygon(black_box(&fill), &mut color, &mut shader, &mut fb);
            });
        });
    }

    group.finish();
}

fn benchmark_modelview(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_modelview");

    for depth in [1usize, 8, 32] {
        group.bench_with_input(BenchmarkId::new("chain", depth), &depth, |b, &depth| {
            let mut graph = SceneGraph::new();
            let root = graph.create_node("node 0", None, None).expect("unique name");
            let mut leaf = root;
            for i in 1..depth {
                leaf = graph
                    .create_node(format!("node {i}"), None, Some(leaf))
                    .expect("unique name");
            }
            b.iter(|| {
                graph.rotate(root, Vec3::new(0.01, 0.02, 0.0), TransformOp::By);
                black_box(graph.update_modelview(leaf));
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_reset, benchmark_fill, benchmark_modelview);
criterion_main!(benches);
