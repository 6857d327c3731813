//! Per-instance transform buffers for a shared mesh.
//!
//! A [`Model`] owns the working copies a frame needs: transformed and projected
//! vertices, transformed normals and the working color table. The mesh itself is
//! shared through an [`Rc`] and only cloned when this instance changes it.
//!
//! Models start out "not ready" while their mesh or texture is still loading.
//! Every pipeline operation checks readiness and is a logged no-op until then.

use std::rc::Rc;

use crate::colors::ColorEntry;
use crate::error::PipelineError;
use crate::math::{Mat4, Vec3};
use crate::mesh::Mesh;
use crate::texture::Texture;

/// Texture state of a model.
#[derive(Debug, Clone, Default)]
pub enum TextureSlot {
    /// The model is drawn untextured.
    #[default]
    None,
    /// The named texture is still loading.
    Pending(String),
    Ready(Rc<Texture>),
}

/// Borrowed buffers needed to draw one model.
pub struct ModelBuffers<'a> {
    pub mesh: &'a Mesh,
    pub transformed_vertices: &'a [Vec3],
    pub projected_vertices: &'a [Vec3],
    pub vertex_normals: &'a [Vec3],
    pub polygon_normals: &'a [Vec3],
    pub colors: &'a mut [ColorEntry],
    pub texture: Option<&'a Texture>,
}

#[derive(Debug, Clone, Default)]
pub struct Model {
    name: String,
    mesh: Option<Rc<Mesh>>,
    texture: TextureSlot,
    transformed_vertices: Vec<Vec3>,
    projected_vertices: Vec<Vec3>,
    transformed_vertex_normals: Vec<Vec3>,
    transformed_polygon_normals: Vec<Vec3>,
    colors: Vec<ColorEntry>,
}

impl Model {
    /// Create a model whose mesh has not arrived yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Create a model for an already built mesh.
    pub fn with_mesh(name: impl Into<String>, mesh: Rc<Mesh>) -> Self {
        let mut model = Self::new(name);
        model.set_mesh(mesh);
        model
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // ============ Loading ============

    /// Attach the mesh and size every buffer to it.
    ///
    /// A mesh naming a texture leaves the model waiting for [`Model::set_texture`].
    pub fn set_mesh(&mut self, mesh: Rc<Mesh>) {
        if mesh.has_texture() && matches!(self.texture, TextureSlot::None) {
            self.texture = TextureSlot::Pending(mesh.texture_source().to_string());
        }
        self.colors = mesh.colors().to_vec();
        self.mesh = Some(mesh);
        self.resize_buffers();
    }

    pub fn set_texture(&mut self, texture: Rc<Texture>) {
        self.texture = TextureSlot::Ready(texture);
    }

    /// Give up on a pending texture; the model is drawn untextured.
    pub fn texture_failed(&mut self) {
        if let TextureSlot::Pending(source) = &self.texture {
            log::warn!(
                "model '{}': texture '{source}' unavailable, drawing untextured",
                self.name
            );
        }
        self.texture = TextureSlot::None;
    }

    /// Name of the texture this model still waits for.
    pub fn pending_texture(&self) -> Option<&str> {
        match &self.texture {
            TextureSlot::Pending(source) => Some(source),
            _ => None,
        }
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        self.mesh.as_deref()
    }

    /// The shared mesh handle.
    pub fn shared_mesh(&self) -> Option<&Rc<Mesh>> {
        self.mesh.as_ref()
    }

    pub fn texture(&self) -> Option<&Texture> {
        match &self.texture {
            TextureSlot::Ready(texture) => Some(texture),
            _ => None,
        }
    }

    /// Mesh assigned, all buffers sized, and no texture still loading.
    pub fn is_ready(&self) -> bool {
        let Some(mesh) = &self.mesh else {
            return false;
        };
        let vertex_count = mesh.vertices().len();
        self.transformed_vertices.len() == vertex_count
            && self.projected_vertices.len() == vertex_count
            && self.transformed_vertex_normals.len() == mesh.vertex_normals().len()
            && self.transformed_polygon_normals.len() == mesh.polygon_normals().len()
            && !matches!(self.texture, TextureSlot::Pending(_))
    }

    fn resize_buffers(&mut self) {
        let Some(mesh) = &self.mesh else {
            return;
        };
        let vertex_count = mesh.vertices().len();
        self.transformed_vertices = mesh.vertices().to_vec();
        self.projected_vertices = vec![Vec3::ZERO; vertex_count];
        self.transformed_vertex_normals = mesh.vertex_normals().to_vec();
        self.transformed_polygon_normals = mesh.polygon_normals().to_vec();
    }

    fn ensure_ready(&self, operation: &str) -> Result<(), PipelineError> {
        if self.is_ready() {
            Ok(())
        } else {
            log::error!("model '{}': {operation} called before ready", self.name);
            Err(PipelineError::NotReady(self.name.clone()))
        }
    }

    // ============ Transform Pipeline ============

    /// `transformed[i] = m * vertices[i]`.
    pub fn apply_matrix_to_vertices(&mut self, m: &Mat4) -> Result<(), PipelineError> {
        self.ensure_ready("apply_matrix_to_vertices")?;
        let Some(mesh) = &self.mesh else {
            return Ok(());
        };
        for (out, v) in self.transformed_vertices.iter_mut().zip(mesh.vertices()) {
            *out = m.transform_point(*v);
        }
        Ok(())
    }

    /// `transformed[i] = m * transformed[i]`, for applying several matrices in turn.
    pub fn apply_matrix_to_transformed_vertices(&mut self, m: &Mat4) -> Result<(), PipelineError> {
        self.ensure_ready("apply_matrix_to_transformed_vertices")?;
        for v in &mut self.transformed_vertices {
            *v = m.transform_point(*v);
        }
        Ok(())
    }

    /// Rotate vertex and polygon normals by `rotation`. Translation never applies
    /// to normals.
    pub fn apply_matrix_to_normals(&mut self, rotation: &Mat4) -> Result<(), PipelineError> {
        self.ensure_ready("apply_matrix_to_normals")?;
        let Some(mesh) = &self.mesh else {
            return Ok(());
        };
        for (out, n) in self
            .transformed_vertex_normals
            .iter_mut()
            .zip(mesh.vertex_normals())
        {
            *out = rotation.transform_direction(*n);
        }
        for (out, n) in self
            .transformed_polygon_normals
            .iter_mut()
            .zip(mesh.polygon_normals())
        {
            *out = rotation.transform_direction(*n);
        }
        Ok(())
    }

    /// `projected[i] = p * transformed[i]`, with x and y divided by w.
    pub fn project_transformed_vertices(&mut self, p: &Mat4) -> Result<(), PipelineError> {
        self.ensure_ready("project_transformed_vertices")?;
        for (out, v) in self
            .projected_vertices
            .iter_mut()
            .zip(&self.transformed_vertices)
        {
            *out = p.project_point(*v);
        }
        Ok(())
    }

    // ============ Buffers ============

    pub fn transformed_vertices(&self) -> &[Vec3] {
        &self.transformed_vertices
    }

    pub fn projected_vertices(&self) -> &[Vec3] {
        &self.projected_vertices
    }

    pub fn transformed_vertex_normals(&self) -> &[Vec3] {
        &self.transformed_vertex_normals
    }

    pub fn transformed_polygon_normals(&self) -> &[Vec3] {
        &self.transformed_polygon_normals
    }

    pub fn colors(&self) -> &[ColorEntry] {
        &self.colors
    }

    /// Reset the working colors of this instance from their originals.
    pub fn reset_colors(&mut self) {
        self.colors.iter_mut().for_each(ColorEntry::reset);
    }

    /// Split borrow of everything needed to draw this model, `None` if no mesh.
    pub fn buffers(&mut self) -> Option<ModelBuffers<'_>> {
        let mesh = self.mesh.as_deref()?;
        let texture = match &self.texture {
            TextureSlot::Ready(texture) => Some(texture.as_ref()),
            _ => None,
        };
        Some(ModelBuffers {
            mesh,
            transformed_vertices: &self.transformed_vertices,
            projected_vertices: &self.projected_vertices,
            vertex_normals: &self.transformed_vertex_normals,
            polygon_normals: &self.transformed_polygon_normals,
            colors: &mut self.colors,
            texture,
        })
    }

    // ============ Mesh Customization ============

    /// Toggle the mesh representation for this instance only.
    pub fn toggle_triangulation(&mut self) {
        if let Some(mesh) = &mut self.mesh {
            Rc::make_mut(mesh).toggle_triangulation();
            self.resize_buffers();
        }
    }

    /// Merge duplicate vertices of this instance's mesh.
    pub fn clean(&mut self) -> usize {
        let Some(mesh) = &mut self.mesh else {
            return 0;
        };
        let merged = Rc::make_mut(mesh).clean();
        self.resize_buffers();
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::InitOptions;
    use crate::primitives;
    use approx::assert_relative_eq;

    fn diamond_model() -> Model {
        let mesh = Rc::new(primitives::diamond(1.0).build(InitOptions::default()));
        Model::with_mesh("diamond", mesh)
    }

    #[test]
    fn new_model_is_not_ready() {
        let mut model = Model::new("pending");
        assert!(!model.is_ready());
        assert!(matches!(
            model.apply_matrix_to_vertices(&Mat4::identity()),
            Err(PipelineError::NotReady(_))
        ));
    }

    #[test]
    fn textured_mesh_waits_for_texture() {
        let mesh = Rc::new(
            primitives::plane(1.0)
                .texture_source("rgb")
                .build(InitOptions::default()),
        );
        let mut model = Model::with_mesh("plane", mesh);
        assert_eq!(model.pending_texture(), Some("rgb"));
        assert!(!model.is_ready());

        let texture = Texture::load("rgb").expect("known pattern");
        model.set_texture(Rc::new(texture));
        assert!(model.is_ready());
    }

    #[test]
    fn failed_texture_falls_back_to_untextured() {
        let mesh = Rc::new(
            primitives::plane(1.0)
                .texture_source("missing.png")
                .build(InitOptions::default()),
        );
        let mut model = Model::with_mesh("plane", mesh);
        model.texture_failed();
        assert!(model.is_ready());
        assert!(model.texture().is_none());
    }

    #[test]
    fn vertices_get_translation_normals_do_not() {
        let mut model = diamond_model();
        let m = Mat4::translation(Vec3::new(10.0, 0.0, 0.0)) * Mat4::rotation_z(0.0);
        model.apply_matrix_to_vertices(&m).expect("ready");
        model.apply_matrix_to_normals(&m).expect("ready");

        assert_relative_eq!(model.transformed_vertices()[2], Vec3::new(11.0, 0.0, 0.0));
        let original = model.mesh().map(|m| m.polygon_normals()[0]).unwrap_or_default();
        assert_relative_eq!(model.transformed_polygon_normals()[0], original);
    }

    #[test]
    fn cumulative_application() {
        let mut model = diamond_model();
        let shift = Mat4::translation(Vec3::new(1.0, 0.0, 0.0));
        model.apply_matrix_to_vertices(&shift).expect("ready");
        model
            .apply_matrix_to_transformed_vertices(&shift)
            .expect("ready");
        assert_relative_eq!(model.transformed_vertices()[0], Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn projection_writes_projected_buffer() {
        let mut model = diamond_model();
        model
            .apply_matrix_to_vertices(&Mat4::identity())
            .expect("ready");
        let p = Mat4::scaling(Vec3::new(2.0, 3.0, 1.0));
        model.project_transformed_vertices(&p).expect("ready");
        assert_relative_eq!(model.projected_vertices()[4], Vec3::new(0.0, 3.0, 0.0));
        assert_relative_eq!(model.transformed_vertices()[4], Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn toggling_one_instance_leaves_the_shared_mesh_alone() {
        let mesh = Rc::new(primitives::cube(1.0).build(InitOptions::default()));
        let mut a = Model::with_mesh("a", Rc::clone(&mesh));
        let b = Model::with_mesh("b", Rc::clone(&mesh));

        a.toggle_triangulation();
        assert!(a.is_ready());
        assert_eq!(a.transformed_polygon_normals().len(), 12);
        assert_eq!(b.mesh().map(|m| m.polygons().len()), Some(6));
        assert!(!mesh.is_triangulated());
    }
}
