//! Scene orchestration.
//!
//! The [`Scene`] owns the scene graph, the framebuffer, the shader and the
//! projection, and drives one frame at a time:
//!
//! 1. reset the framebuffer and clear the region it reports on the surface
//! 2. draw the optional grid
//! 3. for every ready, visible node: update its modelview, transform and project
//!    the vertices, rotate the normals, draw debug normals, render the polygons
//! 4. present the dirty region
//!
//! Nodes whose model is still loading are skipped and keep the scene unsettled,
//! so the frame loop calls [`Scene::render_frame`] again.

pub mod graph;
pub mod node;

pub use graph::SceneGraph;
pub use node::{CacheState, Node, NodeId};

use std::time::{Duration, Instant};

use crate::colors::{ColorEntry, Rgba};
use crate::config::{GridSettings, RenderSettings};
use crate::error::PipelineError;
use crate::library::MeshLibrary;
use crate::light::{LightUpdate, Lights};
use crate::math::{Mat4, Vec3};
use crate::model::{Model, ModelBuffers};
use crate::projection::{Projection, ProjectionType};
use crate::render::{
    DepthView, FrameBuffer, ModelView, PolygonFill, PresentSurface, Rasterizer, Shader,
    ShadingMode, TextureMapping,
};
use crate::transform::{TransformKind, TransformOp};

const GRID_COLOR: Rgba = [128, 128, 128, 255];

/// Statistics of the last rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    /// Frames rendered since the pipeline was initialized.
    pub frames: u64,
    /// Polygons drawn in the last frame.
    pub polygons: usize,
    /// Nodes skipped in the last frame because their model was still loading.
    pub pending_nodes: usize,
    pub duration: Duration,
    /// Exponential tail average of the frame rate.
    pub average_fps: f32,
}

/// Borrowed state needed while drawing one frame.
struct RenderContext<'a> {
    framebuffer: &'a mut FrameBuffer,
    shader: &'a mut Shader,
    rasterizer: &'a mut dyn Rasterizer,
    settings: &'a RenderSettings,
    line_color: &'a ColorEntry,
    viewport_projection: Mat4,
}

impl RenderContext<'_> {
    /// Draw the polygons of a transformed and projected model. Returns the
    /// number of polygons drawn.
    fn render_model(&mut self, model: &mut Model) -> usize {
        let toggles = self.settings.toggles;
        if !(toggles.texturing && model.texture().is_some()) {
            model.reset_colors();
        }
        let Some(ModelBuffers {
            mesh,
            transformed_vertices,
            projected_vertices,
            vertex_normals,
            polygon_normals,
            colors,
            texture,
        }) = model.buffers()
        else {
            return 0;
        };

        let polygons = mesh.polygons();
        self.shader.set_model(&ModelView {
            vertices: transformed_vertices,
            vertex_normals,
            polygon_normals,
            polygons: &polygons.vertices,
        });
        let texture = texture.filter(|_| toggles.texturing);

        let mut drawn = 0;
        for (p, polygon) in polygons.vertices.iter().enumerate() {
            if polygon.len() < 3 {
                log::trace!("skipping polygon {p} with {} vertices", polygon.len());
                continue;
            }
            if toggles.backface_culling && polygon_normals.get(p).is_some_and(|n| n.z < 0.0) {
                continue;
            }
            let color = match polygons.colors.get(p) {
                Some(&c) => colors.get_mut(c),
                None => None,
            };
            let Some(color) = color else {
                log::warn!("polygon {p} has no valid color index");
                continue;
            };
            if !self.shader.set_polygon(p) {
                continue;
            }

            if toggles.fill {
                let mapping = texture.and_then(|texture| {
                    polygons.texture_coords_of(p).map(|corners| TextureMapping {
                        texture,
                        coords: mesh.texture_coords(),
                        corners,
                    })
                });
                let fill = PolygonFill {
                    vertices: projected_vertices,
                    polygon,
                    texture: mapping,
                };
                self.rasterizer
                    .fill_polygon(&fill, color, self.shader, self.framebuffer);
            } else if !toggles.show_edges {
                self.rasterizer
                    .stroke_polygon(projected_vertices, polygon, color, self.framebuffer);
            }
            if toggles.show_edges {
                self.rasterizer.stroke_polygon(
                    projected_vertices,
                    polygon,
                    self.line_color,
                    self.framebuffer,
                );
            }
            drawn += 1;
        }
        drawn
    }

    /// Draw vertex normals from each projected vertex and polygon normals from
    /// the polygon's projected center.
    fn render_normals(&mut self, model: &Model) {
        let Some(mesh) = model.mesh() else {
            return;
        };
        let vertices = model.projected_vertices();
        let vertex_normals = model.transformed_vertex_normals();
        let polygon_normals = model.transformed_polygon_normals();

        for (p, polygon) in mesh.polygons().vertices.iter().enumerate() {
            let Some(&normal) = polygon_normals.get(p) else {
                continue;
            };
            if polygon.is_empty() || (self.settings.toggles.backface_culling && normal.z < 0.0) {
                continue;
            }
            let mut center = Vec3::ZERO;
            for &v in polygon {
                if let (Some(&start), Some(&n)) = (vertices.get(v), vertex_normals.get(v)) {
                    self.draw_normal(start, n);
                    center += start;
                }
            }
            self.draw_normal(center / polygon.len() as f32, normal);
        }
    }

    fn draw_normal(&mut self, start: Vec3, normal: Vec3) {
        // Directions skip the translation and the perspective divide.
        let direction =
            self.viewport_projection.transform_direction(normal) * self.settings.normal_length;
        self.rasterizer
            .draw_line(start, start + direction, self.line_color, self.framebuffer);
    }

    /// Grid in the `z = 0` plane of world space.
    fn draw_grid(&mut self, color: &ColorEntry) {
        let GridSettings { range, step } = self.settings.grid;
        if step <= 0.0 || range < 0.0 {
            log::warn!("invalid grid: range {range}, step {step}");
            return;
        }
        let m = self.viewport_projection;
        let lines = (2.0 * range / step).floor() as i32;
        for k in 0..=lines {
            let i = -range + k as f32 * step;
            let vertical = (Vec3::new(i, -range, 0.0), Vec3::new(i, range, 0.0));
            let horizontal = (Vec3::new(-range, i, 0.0), Vec3::new(range, i, 0.0));
            for (from, to) in [vertical, horizontal] {
                self.rasterizer.draw_line(
                    m.project_point(from),
                    m.project_point(to),
                    color,
                    self.framebuffer,
                );
            }
        }
    }
}

/// Transform, project and rotate the normals of `model`, in pipeline order.
fn prepare_model(
    model: &mut Model,
    world: &Mat4,
    world_rotation: &Mat4,
    viewport_projection: &Mat4,
) -> Result<(), PipelineError> {
    model.apply_matrix_to_vertices(world)?;
    model.project_transformed_vertices(viewport_projection)?;
    model.apply_matrix_to_normals(world_rotation)
}

pub struct Scene {
    graph: SceneGraph,
    library: MeshLibrary,
    framebuffer: FrameBuffer,
    shader: Shader,
    projection: Projection,
    viewport_projection: Mat4,
    settings: RenderSettings,
    line_color: ColorEntry,
    grid_color: ColorEntry,
    up_to_date: bool,
    stats: FrameStats,
}

impl Scene {
    /// Build the framebuffer, projection and shader for `settings`.
    ///
    /// Fails with [`PipelineError::InvalidCanvas`] for a zero-sized canvas.
    pub fn init_pipeline(settings: RenderSettings) -> Result<Self, PipelineError> {
        let (width, height) = (settings.width, settings.height);
        let framebuffer = FrameBuffer::new(width, height, settings.background)?
            .with_z_epsilon(settings.z_epsilon);
        let projection = Projection::new(settings.projection, width, height);
        log::info!(
            "pipeline initialized: {width}x{height}, {} projection, {} shading",
            settings.projection,
            settings.shading
        );

        Ok(Self {
            graph: SceneGraph::new(),
            library: MeshLibrary::new(settings.init),
            framebuffer,
            shader: Shader::new(settings.shading, Lights::default()),
            viewport_projection: projection.viewport_projection(),
            projection,
            line_color: ColorEntry::new("line", settings.line_color),
            grid_color: ColorEntry::new("grey", GRID_COLOR),
            settings,
            up_to_date: false,
            stats: FrameStats::default(),
        })
    }

    // ============ Accessors ============

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// Direct graph access. Transforms made through it do not move the light;
    /// use [`Scene::transform`] for that.
    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        self.up_to_date = false;
        &mut self.graph
    }

    pub fn library_mut(&mut self) -> &mut MeshLibrary {
        &mut self.library
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    pub fn shader(&self) -> &Shader {
        &self.shader
    }

    pub fn lights(&self) -> &Lights {
        self.shader.lights()
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn viewport_projection(&self) -> Mat4 {
        self.viewport_projection
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn is_up_to_date(&self) -> bool {
        self.up_to_date
    }

    /// `false` requests a redraw on the next [`Scene::render_frame`].
    pub fn set_up_to_date(&mut self, up_to_date: bool) {
        self.up_to_date = up_to_date;
    }

    // ============ Nodes ============

    pub fn create_node(
        &mut self,
        name: impl Into<String>,
        model: Option<Model>,
        parent: Option<NodeId>,
        visible: bool,
    ) -> Result<NodeId, PipelineError> {
        let id = self.graph.create_node(name, model, parent)?;
        self.graph.set_visible(id, visible);
        self.up_to_date = false;
        Ok(id)
    }

    /// Create a visible node for a built-in model, sharing the mesh with every
    /// other node using the same model, scale and texture. `"empty"` makes a
    /// group node.
    ///
    /// A textured model stays not ready until [`Scene::load_pending_textures`]
    /// or the asset loader delivers the texture.
    pub fn create_node_with_builtin(
        &mut self,
        name: impl Into<String>,
        builtin: &str,
        scale: f32,
        texture_source: Option<&str>,
        parent: Option<NodeId>,
    ) -> Result<NodeId, PipelineError> {
        let mesh = match texture_source {
            Some(source) => self.library.builtin_textured(builtin, scale, source)?,
            None => self.library.builtin(builtin, scale)?,
        };
        let model = mesh.map(|mesh| Model::with_mesh(builtin, mesh));
        self.create_node(name, model, parent, true)
    }

    /// Create the invisible node that marks the point light, placed at the
    /// current light position.
    pub fn create_light_node(
        &mut self,
        name: impl Into<String>,
        builtin: &str,
        scale: f32,
    ) -> Result<NodeId, PipelineError> {
        let model = self
            .library
            .builtin(builtin, scale)?
            .map(|mesh| Model::with_mesh(builtin, mesh));
        let position = self.shader.lights().position;
        let id = self.graph.create_light_node(name, model, position)?;
        self.up_to_date = false;
        Ok(id)
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        self.graph.set_visible(id, visible);
        self.up_to_date = false;
    }

    /// Load every texture a model is waiting for, synchronously. Failed loads
    /// leave the model untextured. Returns the number of textures attached.
    pub fn load_pending_textures(&mut self) -> usize {
        let mut attached = 0;
        for index in 0..self.graph.len() {
            let Some(model) = self.graph.node_mut(NodeId(index)).model_mut() else {
                continue;
            };
            let Some(source) = model.pending_texture().map(str::to_owned) else {
                continue;
            };
            match self.library.texture(&source) {
                Ok(texture) => {
                    model.set_texture(texture);
                    attached += 1;
                }
                Err(err) => {
                    log::warn!("texture '{source}' failed to load: {err}");
                    model.texture_failed();
                }
            }
            self.up_to_date = false;
        }
        attached
    }

    // ============ Transforms ============

    /// Change a node's transform. Translating the light node moves the light.
    pub fn transform(&mut self, id: NodeId, kind: TransformKind, value: Vec3, op: TransformOp) {
        self.graph.transform(id, kind, value, op);
        if kind == TransformKind::Translate && self.graph.is_light_node(id) {
            let position = self.graph.node(id).transform().translation();
            self.shader.set_light_position(position);
        }
        self.up_to_date = false;
    }

    pub fn translate(&mut self, id: NodeId, value: Vec3, op: TransformOp) {
        self.transform(id, TransformKind::Translate, value, op);
    }

    pub fn rotate(&mut self, id: NodeId, value: Vec3, op: TransformOp) {
        self.transform(id, TransformKind::Rotate, value, op);
    }

    pub fn scale(&mut self, id: NodeId, value: Vec3, op: TransformOp) {
        self.transform(id, TransformKind::Scale, value, op);
    }

    pub fn shear(&mut self, id: NodeId, value: Vec3, op: TransformOp) {
        self.transform(id, TransformKind::Shear, value, op);
    }

    /// Transform the interactive node. Returns `false` if there is none.
    pub fn transform_interactive(
        &mut self,
        kind: TransformKind,
        value: Vec3,
        op: TransformOp,
    ) -> bool {
        match self.graph.interactive_node() {
            Some(id) => {
                self.transform(id, kind, value, op);
                true
            }
            None => false,
        }
    }

    // ============ Lights and modes ============

    /// Update the light parameters given in `update`; moving the light also
    /// moves the light node.
    pub fn set_lights(&mut self, update: LightUpdate) {
        self.shader.set_lights(&update);
        if update.moves_light() {
            if let Some(light) = self.graph.light_node() {
                let position = self.shader.lights().position;
                self.graph.translate(light, position, TransformOp::Set);
            }
        }
        self.up_to_date = false;
    }

    pub fn set_projection_type(&mut self, kind: ProjectionType) {
        self.projection.set_kind(kind);
        self.viewport_projection = self.projection.viewport_projection();
        self.settings.projection = kind;
        log::info!("projection set to {kind}");
        self.up_to_date = false;
    }

    /// Parse and set a projection by name (`ortho`, `frustum`, `perspective`).
    pub fn set_projection_by_name(&mut self, name: &str) -> Result<(), PipelineError> {
        let kind = name.parse()?;
        self.set_projection_type(kind);
        Ok(())
    }

    pub fn set_shading_mode(&mut self, mode: ShadingMode) {
        self.shader.set_mode(mode);
        self.settings.shading = mode;
        log::info!("shading set to {mode}");
        self.up_to_date = false;
    }

    pub fn set_shading_by_name(&mut self, name: &str) -> Result<(), PipelineError> {
        let mode = name.parse()?;
        self.set_shading_mode(mode);
        Ok(())
    }

    // ============ Toggles ============

    pub fn toggle_fill(&mut self) {
        self.settings.toggles.fill = !self.settings.toggles.fill;
        self.up_to_date = false;
    }

    pub fn toggle_normals(&mut self) {
        self.settings.toggles.show_normals = !self.settings.toggles.show_normals;
        self.up_to_date = false;
    }

    pub fn toggle_edges(&mut self) {
        self.settings.toggles.show_edges = !self.settings.toggles.show_edges;
        self.up_to_date = false;
    }

    pub fn toggle_z_buffer(&mut self) {
        self.settings.toggles.show_z_buffer = !self.settings.toggles.show_z_buffer;
        self.up_to_date = false;
    }

    pub fn set_depth_view(&mut self, view: DepthView) {
        self.settings.depth_view = view;
        self.up_to_date = false;
    }

    pub fn toggle_backface_culling(&mut self) {
        self.settings.toggles.backface_culling = !self.settings.toggles.backface_culling;
        self.up_to_date = false;
    }

    pub fn toggle_texturing(&mut self) {
        self.settings.toggles.texturing = !self.settings.toggles.texturing;
        self.up_to_date = false;
    }

    pub fn toggle_grid(&mut self) {
        self.settings.toggles.show_grid = !self.settings.toggles.show_grid;
        self.up_to_date = false;
    }

    /// Switch every model between its original polygons and the triangulation.
    pub fn toggle_triangulation(&mut self) {
        self.graph.toggle_triangulation();
        self.settings.init.triangulate = !self.settings.init.triangulate;
        self.up_to_date = false;
    }

    /// Merge duplicate vertices in every model. Returns the number merged.
    pub fn clean(&mut self) -> usize {
        self.up_to_date = false;
        self.graph.clean()
    }

    // ============ Rendering ============

    /// Render one frame unless the scene is up to date.
    ///
    /// Returns `true` when the scene is settled: nothing was pending, so the
    /// caller can stop requesting frames until something changes.
    pub fn render_frame(
        &mut self,
        rasterizer: &mut dyn Rasterizer,
        surface: &mut dyn PresentSurface,
    ) -> bool {
        if self.up_to_date {
            return true;
        }
        let started = Instant::now();

        if let Some(rect) = self.framebuffer.reset() {
            surface.clear(rect);
        }

        let mut ctx = RenderContext {
            framebuffer: &mut self.framebuffer,
            shader: &mut self.shader,
            rasterizer,
            settings: &self.settings,
            line_color: &self.line_color,
            viewport_projection: self.viewport_projection,
        };
        if self.settings.toggles.show_grid {
            ctx.draw_grid(&self.grid_color);
        }

        let mut polygons = 0;
        let mut pending = 0;
        for i in 0..self.graph.render_order().len() {
            let id = self.graph.render_order()[i];
            if !self.graph.node(id).is_ready() {
                log::trace!("node '{}' not ready", self.graph.node(id).name());
                pending += 1;
                continue;
            }
            let world = self.graph.update_modelview(id);
            let node = self.graph.node_mut(id);
            if !node.is_visible() {
                continue;
            }
            let world_rotation = node.world_rotation();
            let Some(model) = node.model_mut() else {
                continue;
            };
            if prepare_model(model, &world, &world_rotation, &ctx.viewport_projection).is_err() {
                continue;
            }
            if ctx.settings.toggles.show_normals {
                ctx.render_normals(model);
            }
            polygons += ctx.render_model(model);
        }

        let toggles = self.settings.toggles;
        let depth_view = toggles.show_z_buffer.then_some(self.settings.depth_view);
        self.framebuffer.display(surface, depth_view);

        self.up_to_date = pending == 0;
        self.record_frame(started.elapsed(), polygons, pending);
        self.up_to_date
    }

    fn record_frame(&mut self, duration: Duration, polygons: usize, pending_nodes: usize) {
        let fps = if duration.is_zero() {
            0.0
        } else {
            1.0 / duration.as_secs_f32()
        };
        let average_fps = if self.stats.frames == 0 {
            fps
        } else {
            self.stats.average_fps * 0.95 + fps * 0.05
        };
        self.stats = FrameStats {
            frames: self.stats.frames + 1,
            polygons,
            pending_nodes,
            duration,
            average_fps,
        };
        log::debug!(
            "frame {}: {polygons} polys, {pending_nodes} pending, {duration:?} ({fps:.1} fps <{average_fps:.1}>)",
            self.stats.frames
        );
    }
}
