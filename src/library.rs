//! Named cache of built meshes and loaded textures.
//!
//! Every instance of the same named model shares one [`Rc<Mesh>`], and every
//! model naming the same texture source shares one [`Rc<Texture>`]. A model only
//! gets its own copy when it changes the mesh (see [`Model::toggle_triangulation`]).
//!
//! [`Model::toggle_triangulation`]: crate::model::Model::toggle_triangulation

use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use crate::error::LoadError;
use crate::mesh::{InitOptions, Mesh, MeshBuilder};
use crate::primitives;
use crate::texture::Texture;

#[derive(Debug, Clone, Default)]
pub struct MeshLibrary {
    meshes: HashMap<String, Rc<Mesh>>,
    textures: HashMap<String, Rc<Texture>>,
    init: InitOptions,
}

impl MeshLibrary {
    pub fn new(init: InitOptions) -> Self {
        Self {
            init,
            ..Self::default()
        }
    }

    pub fn init_options(&self) -> InitOptions {
        self.init
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<Rc<Mesh>> {
        self.meshes.get(key).cloned()
    }

    /// Build `builder` under `key` unless a mesh is already cached there.
    pub fn insert(&mut self, key: impl Into<String>, builder: MeshBuilder) -> Rc<Mesh> {
        let init = self.init;
        Rc::clone(
            self.meshes
                .entry(key.into())
                .or_insert_with(|| Rc::new(builder.build(init))),
        )
    }

    /// Cache a mesh built elsewhere, for example by the asset loader.
    pub fn insert_built(&mut self, key: impl Into<String>, mesh: Mesh) -> Rc<Mesh> {
        let mesh = Rc::new(mesh);
        self.meshes.insert(key.into(), Rc::clone(&mesh));
        mesh
    }

    /// Shared mesh of a built-in model; `None` for `"empty"`.
    pub fn builtin(&mut self, name: &str, scale: f32) -> Result<Option<Rc<Mesh>>, LoadError> {
        let key = format!("{name}@{scale}");
        if let Some(mesh) = self.get(&key) {
            return Ok(Some(mesh));
        }
        Ok(primitives::by_name(name, scale)?.map(|builder| self.insert(key, builder)))
    }

    /// Like [`MeshLibrary::builtin`] with a texture source attached.
    pub fn builtin_textured(
        &mut self,
        name: &str,
        scale: f32,
        texture_source: &str,
    ) -> Result<Option<Rc<Mesh>>, LoadError> {
        let key = format!("{name}@{scale}#{texture_source}");
        if let Some(mesh) = self.get(&key) {
            return Ok(Some(mesh));
        }
        Ok(primitives::by_name(name, scale)?
            .map(|builder| self.insert(key, builder.texture_source(texture_source))))
    }

    /// Read an OBJ file synchronously and cache it under its path.
    pub fn obj<P: AsRef<Path>>(&mut self, path: P) -> Result<Rc<Mesh>, LoadError> {
        let key = path.as_ref().display().to_string();
        if let Some(mesh) = self.get(&key) {
            return Ok(mesh);
        }
        let builder = MeshBuilder::from_obj(path)?;
        Ok(self.insert(key, builder))
    }

    /// Shared texture for `source`, loading it on first use.
    pub fn texture(&mut self, source: &str) -> Result<Rc<Texture>, LoadError> {
        if let Some(texture) = self.textures.get(source) {
            return Ok(Rc::clone(texture));
        }
        let texture = Texture::load(source)?;
        log::info!("loaded texture '{source}'");
        Ok(self.insert_texture(source, texture))
    }

    pub fn insert_texture(&mut self, source: impl Into<String>, texture: Texture) -> Rc<Texture> {
        let texture = Rc::new(texture);
        self.textures.insert(source.into(), Rc::clone(&texture));
        texture
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instances_share_one_mesh() {
        let mut library = MeshLibrary::default();
        let a = library.builtin("diamond", 50.0).ok().flatten();
        let b = library.builtin("diamond", 50.0).ok().flatten();
        let (Some(a), Some(b)) = (a, b) else {
            panic!("diamond is built in");
        };
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn scale_and_texture_are_part_of_the_key() {
        let mut library = MeshLibrary::default();
        let _ = library.builtin("cube", 1.0);
        let _ = library.builtin("cube", 2.0);
        let textured = library.builtin_textured("cube", 2.0, "rgb");
        assert_eq!(library.len(), 3);
        let mesh = textured.ok().flatten().expect("cube is built in");
        assert!(mesh.has_texture());
    }

    #[test]
    fn empty_is_a_group_and_unknown_fails() {
        let mut library = MeshLibrary::default();
        assert!(matches!(library.builtin("empty", 1.0), Ok(None)));
        assert!(library.is_empty());
        assert!(matches!(
            library.builtin("teapot", 1.0),
            Err(LoadError::UnknownModel(_))
        ));
    }

    #[test]
    fn textures_are_shared_by_source() {
        let mut library = MeshLibrary::default();
        let a = library.texture("checkerboard").expect("procedural");
        let b = library.texture("checkerboard").expect("procedural");
        assert!(Rc::ptr_eq(&a, &b));
        assert!(library.texture("missing.png").is_err());
    }

    #[test]
    fn init_options_apply_to_built_meshes() {
        let mut library = MeshLibrary::new(InitOptions {
            triangulate: true,
            clean: false,
        });
        let mesh = library.builtin("cube", 1.0).ok().flatten().expect("built in");
        assert!(mesh.is_triangulated());
        assert_eq!(mesh.polygons().len(), 12);
    }
}
