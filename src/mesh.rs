//! Mesh data: vertices, polygons, colors, normals and texture coordinates.
//!
//! A [`Mesh`] is built once through a [`MeshBuilder`] and then shared between all
//! models that display it. Two polygon representations are kept side by side: the
//! polygons as supplied, and their triangle-fan decomposition. A flag selects which
//! one is active; toggling never rebuilds either array, it only recomputes normals
//! for the newly active set.
//!
//! # Defaults
//!
//! A builder starts from explicit defaults and only the fields set on it override
//! them:
//!
//! | Field | Default |
//! |-------|---------|
//! | colors | [`default_color_table`] |
//! | texture coordinates | unit quad `(0,0) (0,1) (1,1) (1,0)` |
//! | polygon texture coordinates | corner `v` uses index `v % 4` (only with a texture) |
//! | normals | computed from the geometry |

use std::io::BufRead;
use std::path::Path;

use crate::colors::{default_color_table, find_color_index, ColorEntry};
use crate::error::LoadError;
use crate::math::{Vec2, Vec3};

/// Tolerance used by [`Mesh::clean`] when deciding that two vertices coincide.
pub const CLEAN_EPSILON: f32 = 1e-4;

/// Texture coordinates used when a texture is named but the mesh has none.
pub const DEFAULT_TEXTURE_COORDS: [Vec2; 4] = [
    Vec2::new(0.0, 0.0),
    Vec2::new(0.0, 1.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(1.0, 0.0),
];

/// Options applied once when a mesh is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InitOptions {
    /// Make the triangle representation active after building.
    pub triangulate: bool,
    /// Merge coincident vertices before triangulating.
    pub clean: bool,
}

/// How [`Mesh::set_color_for_all_polygons`] assigns colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coloring {
    /// Every polygon gets the same color index.
    Uniform(usize),
    /// Polygons cycle through the color table.
    Cycle,
}

/// One polygon representation: indices into the vertex, color and texture
/// coordinate tables, all parallel per polygon.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolygonSet {
    pub vertices: Vec<Vec<usize>>,
    pub colors: Vec<usize>,
    /// Empty when the mesh is untextured, otherwise one entry per polygon.
    pub texture_coords: Vec<Vec<usize>>,
}

impl PolygonSet {
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Texture coordinate indices of polygon `p`, if present and consistent.
    pub fn texture_coords_of(&self, p: usize) -> Option<&[usize]> {
        let coords = self.texture_coords.get(p)?;
        (coords.len() == self.vertices[p].len()).then_some(coords.as_slice())
    }

    /// Fan-triangulate every polygon: `(v0,v1,v2), (v0,v2,v3), ...`.
    ///
    /// Each triangle inherits its polygon's color and the matching texture
    /// coordinate corners. Polygons with fewer than three vertices are dropped.
    fn triangulate(&self) -> PolygonSet {
        let textured = !self.texture_coords.is_empty();
        let mut out = PolygonSet::default();

        for (p, polygon) in self.vertices.iter().enumerate() {
            if polygon.len() < 3 {
                log::warn!(
                    "skipping degenerate polygon {p} with {} vertices during triangulation",
                    polygon.len()
                );
                continue;
            }
            let color = self.colors.get(p).copied().unwrap_or(0);
            let coords = if textured { self.texture_coords_of(p) } else { None };

            for k in 1..polygon.len() - 1 {
                out.vertices.push(vec![polygon[0], polygon[k], polygon[k + 1]]);
                out.colors.push(color);
                if textured {
                    out.texture_coords.push(match coords {
                        Some(c) => vec![c[0], c[k], c[k + 1]],
                        None => Vec::new(),
                    });
                }
            }
        }
        out
    }

    fn rewire(&mut self, remap: &[usize]) {
        for polygon in &mut self.vertices {
            for index in polygon.iter_mut() {
                if let Some(&target) = remap.get(*index) {
                    *index = target;
                }
            }
        }
    }
}

/// Geometry and appearance of a model, shared between its instances.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    name: String,
    vertices: Vec<Vec3>,
    original: PolygonSet,
    triangles: PolygonSet,
    triangulated: bool,
    colors: Vec<ColorEntry>,
    vertex_normals: Vec<Vec3>,
    polygon_normals: Vec<Vec3>,
    texture_coords: Vec<Vec2>,
    texture_source: String,
}

impl Mesh {
    // ============ Accessors ============

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// The active polygon representation.
    pub fn polygons(&self) -> &PolygonSet {
        if self.triangulated {
            &self.triangles
        } else {
            &self.original
        }
    }

    /// The polygons as supplied to the builder (after cleaning).
    pub fn original_polygons(&self) -> &PolygonSet {
        &self.original
    }

    /// The triangle-fan decomposition of [`Mesh::original_polygons`].
    pub fn triangle_polygons(&self) -> &PolygonSet {
        &self.triangles
    }

    pub fn is_triangulated(&self) -> bool {
        self.triangulated
    }

    pub fn colors(&self) -> &[ColorEntry] {
        &self.colors
    }

    pub fn vertex_normals(&self) -> &[Vec3] {
        &self.vertex_normals
    }

    pub fn polygon_normals(&self) -> &[Vec3] {
        &self.polygon_normals
    }

    pub fn texture_coords(&self) -> &[Vec2] {
        &self.texture_coords
    }

    /// Image file name or procedural texture name, empty when untextured.
    pub fn texture_source(&self) -> &str {
        &self.texture_source
    }

    pub fn has_texture(&self) -> bool {
        !self.texture_source.is_empty()
    }

    /// Color table entry by name.
    pub fn color_by_name(&self, name: &str) -> Option<&ColorEntry> {
        find_color_index(&self.colors, name).map(|i| &self.colors[i])
    }

    /// Index of the first vertex within `epsilon` of `vertex` on every axis.
    pub fn vertex_exists(&self, vertex: Vec3, epsilon: f32) -> Option<usize> {
        self.vertices
            .iter()
            .position(|v| vectors_equal(*v, vertex, epsilon))
    }

    // ============ Operations ============

    /// Swap the active representation between polygons and triangles, then
    /// recompute normals for the one now active.
    pub fn toggle_triangulation(&mut self) {
        self.triangulated = !self.triangulated;
        self.compute_normals();
    }

    /// Restore the working colors of every color table entry.
    pub fn reset_colors(&mut self) {
        self.colors.iter_mut().for_each(ColorEntry::reset);
    }

    /// Assign colors to every polygon of both representations.
    pub fn set_color_for_all_polygons(&mut self, coloring: Coloring) {
        let table_len = self.colors.len().max(1);
        for set in [&mut self.original, &mut self.triangles] {
            set.colors = (0..set.len())
                .map(|p| match coloring {
                    Coloring::Uniform(index) => index,
                    Coloring::Cycle => p % table_len,
                })
                .collect();
        }
    }

    /// Merge vertices that coincide within [`CLEAN_EPSILON`] into the lowest index
    /// and rewire both polygon representations. Returns the number of merged
    /// vertices.
    ///
    /// The vertex array keeps its length; merged duplicates are simply no longer
    /// referenced.
    pub fn clean(&mut self) -> usize {
        let count = self.vertices.len();
        let mut remap: Vec<usize> = (0..count).collect();
        let mut merged = 0;

        for i in 0..count {
            if remap[i] != i {
                continue;
            }
            for j in (i + 1)..count {
                if remap[j] == j && vectors_equal(self.vertices[i], self.vertices[j], CLEAN_EPSILON)
                {
                    remap[j] = i;
                    merged += 1;
                }
            }
        }

        if merged > 0 {
            self.original.rewire(&remap);
            self.triangles.rewire(&remap);
            self.compute_normals();
        }
        log::debug!("mesh '{}': merged {merged} duplicate vertices", self.name);
        merged
    }

    // ============ Normals ============

    /// Recompute polygon and vertex normals for the active representation.
    pub fn compute_normals(&mut self) {
        let polygons = if self.triangulated {
            &self.triangles
        } else {
            &self.original
        };
        self.polygon_normals = polygons
            .vertices
            .iter()
            .map(|polygon| polygon_normal(&self.vertices, polygon))
            .collect();
        self.vertex_normals =
            vertex_normals(&self.vertices, &polygons.vertices, &self.polygon_normals);
    }

    fn normals_match(&self) -> bool {
        self.vertex_normals.len() == self.vertices.len()
            && self.polygon_normals.len() == self.polygons().len()
    }
}

/// Unit normal of a polygon, from the cross product of two consecutive edges.
///
/// Successive vertex triples are tried until the edges are not parallel. Returns
/// [`Vec3::ZERO`] when no such triple exists or an index is out of range.
pub fn polygon_normal(vertices: &[Vec3], polygon: &[usize]) -> Vec3 {
    let n = polygon.len();
    for i in 0..n {
        let corner = |k: usize| vertices.get(polygon[(i + k) % n]).copied();
        let (Some(a), Some(b), Some(c)) = (corner(0), corner(1), corner(2)) else {
            return Vec3::ZERO;
        };
        let normal = (b - a).cross(c - b);
        if normal.magnitude() > f32::EPSILON {
            return normal.normalize();
        }
    }
    Vec3::ZERO
}

/// Per-vertex normals as the angle-weighted sum of adjacent polygon normals.
fn vertex_normals(vertices: &[Vec3], polygons: &[Vec<usize>], normals: &[Vec3]) -> Vec<Vec3> {
    let mut sums = vec![Vec3::ZERO; vertices.len()];

    for (polygon, normal) in polygons.iter().zip(normals) {
        let n = polygon.len();
        for k in 0..n {
            let (prev, here, next) = (polygon[(k + n - 1) % n], polygon[k], polygon[(k + 1) % n]);
            let (Some(&p), Some(&h), Some(&q)) =
                (vertices.get(prev), vertices.get(here), vertices.get(next))
            else {
                continue;
            };
            let weight = (p - h).angle_between(q - h);
            sums[here] += *normal * weight;
        }
    }

    sums.iter().map(Vec3::normalize).collect()
}

/// Component-wise comparison within `epsilon` (exact when `epsilon` is zero).
pub fn vectors_equal(a: Vec3, b: Vec3, epsilon: f32) -> bool {
    approx::abs_diff_eq!(a, b, epsilon = epsilon)
}

/// Builder that starts from the defaults listed in the module docs.
#[derive(Debug, Clone, Default)]
pub struct MeshBuilder {
    name: String,
    vertices: Vec<Vec3>,
    polygons: Vec<Vec<usize>>,
    polygon_colors: Vec<usize>,
    colors: Option<Vec<ColorEntry>>,
    vertex_normals: Vec<Vec3>,
    polygon_normals: Vec<Vec3>,
    texture_coords: Option<Vec<Vec2>>,
    polygon_texture_coords: Vec<Vec<usize>>,
    texture_source: String,
}

impl MeshBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn vertices(mut self, vertices: Vec<Vec3>) -> Self {
        self.vertices = vertices;
        self
    }

    pub fn polygons(mut self, polygons: Vec<Vec<usize>>) -> Self {
        self.polygons = polygons;
        self
    }

    pub fn polygon_colors(mut self, colors: Vec<usize>) -> Self {
        self.polygon_colors = colors;
        self
    }

    /// Give every polygon the color `index`.
    pub fn uniform_color(mut self, index: usize) -> Self {
        self.polygon_colors = vec![index; self.polygons.len()];
        self
    }

    pub fn colors(mut self, colors: Vec<ColorEntry>) -> Self {
        self.colors = Some(colors);
        self
    }

    pub fn vertex_normals(mut self, normals: Vec<Vec3>) -> Self {
        self.vertex_normals = normals;
        self
    }

    pub fn polygon_normals(mut self, normals: Vec<Vec3>) -> Self {
        self.polygon_normals = normals;
        self
    }

    pub fn texture_coords(mut self, coords: Vec<Vec2>) -> Self {
        self.texture_coords = Some(coords);
        self
    }

    pub fn polygon_texture_coords(mut self, coords: Vec<Vec<usize>>) -> Self {
        self.polygon_texture_coords = coords;
        self
    }

    /// Image file name (contains a dot) or procedural texture name.
    pub fn texture_source(mut self, source: impl Into<String>) -> Self {
        self.texture_source = source.into();
        self
    }

    /// Multiply every vertex by `factor`.
    pub fn scale(mut self, factor: f32) -> Self {
        self.vertices.iter_mut().for_each(|v| *v = *v * factor);
        self
    }

    /// Load vertices, polygons and texture coordinates from an OBJ file.
    pub fn from_obj<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let (models, _materials) = tobj::load_obj(path, &obj_load_options())?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_tobj(name, models)
    }

    /// Load OBJ data from a reader. Material libraries are ignored.
    pub fn from_obj_reader<R: BufRead>(
        name: impl Into<String>,
        reader: &mut R,
    ) -> Result<Self, LoadError> {
        let (models, _materials) = tobj::load_obj_buf(reader, &obj_load_options(), |_| {
            Err(tobj::LoadError::OpenFileFailed)
        })?;
        Self::from_tobj(name.into(), models)
    }

    fn from_tobj(name: String, models: Vec<tobj::Model>) -> Result<Self, LoadError> {
        let mut builder = MeshBuilder::new(name);

        for model in &models {
            let mesh = &model.mesh;
            let base = builder.vertices.len();
            let coords = builder.texture_coords.get_or_insert_with(Vec::new);
            let coord_base = coords.len();

            builder.vertices.extend(
                mesh.positions
                    .chunks_exact(3)
                    .map(|p| Vec3::new(p[0], p[1], p[2])),
            );
            coords.extend(
                mesh.texcoords
                    .chunks_exact(2)
                    .map(|t| Vec2::new(t[0], t[1])),
            );

            let arities: Vec<usize> = if mesh.face_arities.is_empty() {
                vec![3; mesh.indices.len() / 3]
            } else {
                mesh.face_arities.iter().map(|&a| a as usize).collect()
            };

            let mut cursor = 0;
            for arity in arities {
                let Some(indices) = mesh.indices.get(cursor..cursor + arity) else {
                    log::warn!("OBJ model '{}' ends inside a face", model.name);
                    break;
                };
                builder
                    .polygons
                    .push(indices.iter().map(|&i| base + i as usize).collect());
                let corner_coords = mesh
                    .texcoord_indices
                    .get(cursor..cursor + arity)
                    .map(|c| c.iter().map(|&i| coord_base + i as usize).collect())
                    .unwrap_or_default();
                builder.polygon_texture_coords.push(corner_coords);
                cursor += arity;
            }
        }

        if builder.vertices.is_empty() || builder.polygons.is_empty() {
            return Err(LoadError::EmptyMesh(builder.name));
        }
        if builder.polygon_texture_coords.iter().all(Vec::is_empty) {
            builder.polygon_texture_coords.clear();
            builder.texture_coords = None;
        }
        builder.polygon_colors = vec![0; builder.polygons.len()];
        Ok(builder)
    }

    /// Fill in defaults, validate, optionally clean, triangulate, compute missing
    /// normals and reset colors.
    pub fn build(self, options: InitOptions) -> Mesh {
        let name = self.name;
        let colors = self.colors.unwrap_or_else(default_color_table);
        let textured = !self.texture_source.is_empty();

        let texture_coords = self
            .texture_coords
            .unwrap_or_else(|| DEFAULT_TEXTURE_COORDS.to_vec());

        let mut polygon_colors = self.polygon_colors;
        if polygon_colors.len() < self.polygons.len() {
            log::warn!(
                "mesh '{name}': {} polygons but {} colors, using color 0 for the rest",
                self.polygons.len(),
                polygon_colors.len()
            );
            polygon_colors.resize(self.polygons.len(), 0);
        }
        polygon_colors.truncate(self.polygons.len());
        for (p, color) in polygon_colors.iter_mut().enumerate() {
            if *color >= colors.len() {
                log::warn!("mesh '{name}': polygon {p} uses unknown color index {color}");
                *color = 0;
            }
        }

        let polygon_texture_coords = if !textured {
            Vec::new()
        } else if self.polygon_texture_coords.is_empty() {
            self.polygons
                .iter()
                .map(|polygon| (0..polygon.len()).map(|v| v % 4).collect())
                .collect()
        } else {
            self.polygon_texture_coords
        };

        let mut polygons = self.polygons;
        let mut polygon_texture_coords = polygon_texture_coords;
        let mut polygon_normals = self.polygon_normals;
        let keep: Vec<bool> = polygons
            .iter()
            .enumerate()
            .map(|(p, polygon)| match polygon.iter().find(|&&v| v >= self.vertices.len()) {
                Some(bad) => {
                    log::warn!("mesh '{name}': polygon {p} references missing vertex {bad}, dropped");
                    false
                }
                None => true,
            })
            .collect();
        if keep.contains(&false) {
            let original_count = polygons.len();
            polygons = retain_kept(polygons, &keep);
            polygon_colors = retain_kept(polygon_colors, &keep);
            if polygon_texture_coords.len() == original_count {
                polygon_texture_coords = retain_kept(polygon_texture_coords, &keep);
            }
            if polygon_normals.len() == original_count {
                polygon_normals = retain_kept(polygon_normals, &keep);
            }
        }

        for (p, polygon) in polygons.iter().enumerate() {
            if textured {
                match polygon_texture_coords.get(p) {
                    Some(coords) if coords.len() == polygon.len() => {
                        if let Some(bad) = coords.iter().find(|&&c| c >= texture_coords.len()) {
                            log::warn!(
                                "mesh '{name}': polygon {p} references missing texture coordinate {bad}"
                            );
                        }
                    }
                    _ => log::warn!(
                        "mesh '{name}': polygon {p} has mismatched texture coordinates, drawn untextured"
                    ),
                }
            }
        }

        let mut mesh = Mesh {
            name,
            vertices: self.vertices,
            original: PolygonSet {
                vertices: polygons,
                colors: polygon_colors,
                texture_coords: polygon_texture_coords,
            },
            triangles: PolygonSet::default(),
            triangulated: false,
            colors,
            vertex_normals: self.vertex_normals,
            polygon_normals,
            texture_coords,
            texture_source: self.texture_source,
        };

        if options.clean {
            mesh.clean();
        }
        mesh.triangles = mesh.original.triangulate();
        mesh.triangulated = options.triangulate;

        if !mesh.normals_match() {
            mesh.compute_normals();
        }
        mesh.reset_colors();
        mesh
    }
}

/// Keep the entries whose flag in `keep` is set.
fn retain_kept<T>(items: Vec<T>, keep: &[bool]) -> Vec<T> {
    items
        .into_iter()
        .zip(keep)
        .filter_map(|(item, &kept)| kept.then_some(item))
        .collect()
}

fn obj_load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: false,
        single_index: false,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives;
    use approx::assert_relative_eq;

    fn quad() -> MeshBuilder {
        MeshBuilder::new("quad")
            .vertices(vec![
                Vec3::new(-1.0, -1.0, 0.0),
                Vec3::new(1.0, -1.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(-1.0, 1.0, 0.0),
            ])
            .polygons(vec![vec![0, 1, 2, 3]])
            .polygon_colors(vec![4])
    }

    // ============ Triangulation ============

    #[test]
    fn quad_triangulates_into_two_fan_triangles() {
        let mesh = quad().build(InitOptions {
            triangulate: true,
            clean: false,
        });
        let triangles = mesh.polygons();
        assert_eq!(triangles.vertices, vec![vec![0, 1, 2], vec![0, 2, 3]]);
        assert_eq!(triangles.colors, vec![4, 4]);
    }

    #[test]
    fn diamond_triangulation_keeps_all_triangles() {
        let mesh = primitives::diamond(200.0).build(InitOptions::default());
        assert_eq!(mesh.vertices().len(), 7);
        assert_eq!(mesh.original_polygons().len(), 8);
        assert_eq!(mesh.triangle_polygons().len(), 8);
        assert_eq!(
            mesh.triangle_polygons().vertices,
            mesh.original_polygons().vertices
        );
        assert_relative_eq!(mesh.vertices()[2], Vec3::new(200.0, 0.0, 0.0));
    }

    #[test]
    fn toggle_twice_restores_identical_arrays() {
        let mut mesh = quad()
            .texture_source("rgb")
            .build(InitOptions::default());
        let before = mesh.polygons().clone();

        mesh.toggle_triangulation();
        assert!(mesh.is_triangulated());
        assert_eq!(mesh.polygons().len(), 2);
        assert_eq!(mesh.polygon_normals().len(), 2);

        mesh.toggle_triangulation();
        assert!(!mesh.is_triangulated());
        assert_eq!(mesh.polygons(), &before);
        assert_eq!(mesh.polygon_normals().len(), 1);
    }

    #[test]
    fn degenerate_polygon_is_skipped_when_triangulating() {
        let mesh = quad()
            .polygons(vec![vec![0, 1], vec![0, 1, 2]])
            .polygon_colors(vec![1, 2])
            .build(InitOptions::default());
        assert_eq!(mesh.triangle_polygons().vertices, vec![vec![0, 1, 2]]);
        assert_eq!(mesh.triangle_polygons().colors, vec![2]);
    }

    #[test]
    fn triangles_carry_texture_corners() {
        let mesh = quad()
            .texture_source("rgb")
            .polygon_texture_coords(vec![vec![0, 3, 2, 1]])
            .build(InitOptions::default());
        assert_eq!(
            mesh.triangle_polygons().texture_coords,
            vec![vec![0, 3, 2], vec![0, 2, 1]]
        );
    }

    // ============ Defaults ============

    #[test]
    fn default_texture_coords_cycle_through_quad() {
        let mesh = MeshBuilder::new("hex")
            .vertices(vec![Vec3::ZERO; 5])
            .polygons(vec![vec![0, 1, 2, 3, 4]])
            .texture_source("checkerboard")
            .build(InitOptions::default());
        assert_eq!(mesh.polygons().texture_coords, vec![vec![0, 1, 2, 3, 0]]);
        assert_eq!(mesh.texture_coords(), &DEFAULT_TEXTURE_COORDS);
    }

    #[test]
    fn untextured_mesh_has_no_polygon_texture_coords() {
        let mesh = quad().build(InitOptions::default());
        assert!(mesh.polygons().texture_coords.is_empty());
        assert_eq!(mesh.colors().len(), 11);
    }

    #[test]
    fn missing_colors_are_padded() {
        let mesh = quad()
            .polygons(vec![vec![0, 1, 2], vec![0, 2, 3]])
            .polygon_colors(vec![3])
            .build(InitOptions::default());
        assert_eq!(mesh.polygons().colors, vec![3, 0]);
    }

    #[test]
    fn polygons_with_missing_vertices_are_dropped() {
        let mesh = quad()
            .polygons(vec![vec![0, 1, 9], vec![0, 2, 3]])
            .polygon_colors(vec![1, 2])
            .texture_source("rgb")
            .polygon_texture_coords(vec![vec![0, 1, 2], vec![0, 2, 3]])
            .build(InitOptions::default());
        let polygons = mesh.polygons();
        assert_eq!(polygons.vertices, vec![vec![0, 2, 3]]);
        assert_eq!(polygons.colors, vec![2]);
        assert_eq!(polygons.texture_coords, vec![vec![0, 2, 3]]);
        assert_eq!(mesh.polygon_normals().len(), 1);
    }

    #[test]
    fn set_color_cycles_through_table() {
        let mut mesh = quad()
            .polygons(vec![vec![0, 1, 2], vec![0, 2, 3]])
            .build(InitOptions::default());
        mesh.set_color_for_all_polygons(Coloring::Cycle);
        assert_eq!(mesh.polygons().colors, vec![0, 1]);
        mesh.set_color_for_all_polygons(Coloring::Uniform(5));
        assert_eq!(mesh.polygons().colors, vec![5, 5]);
    }

    // ============ Normals ============

    #[test]
    fn polygon_normal_follows_winding() {
        let mesh = quad().build(InitOptions::default());
        assert_relative_eq!(mesh.polygon_normals()[0], Vec3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(mesh.vertex_normals()[2], Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn polygon_normal_skips_collinear_start() {
        let vertices = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(2.0, 1.0, 0.0),
        ];
        let normal = polygon_normal(&vertices, &[0, 1, 2, 3]);
        assert_relative_eq!(normal, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn degenerate_polygon_normal_is_zero() {
        let vertices = vec![Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)];
        assert_eq!(polygon_normal(&vertices, &[0, 1, 2]), Vec3::ZERO);
    }

    #[test]
    fn vertex_normal_averages_adjacent_faces() {
        let mesh = primitives::cube(1.0).build(InitOptions::default());
        let corner = mesh.vertex_normals()[0];
        let expected = Vec3::new(-1.0, -1.0, -1.0).normalize();
        assert_relative_eq!(corner, expected, epsilon = 1e-5);
    }

    // ============ Cleaning ============

    #[test]
    fn clean_merges_to_lowest_index() {
        let mut mesh = MeshBuilder::new("dup")
            .vertices(vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(1.0, 0.0, 0.00001),
                Vec3::new(1.0, 1.0, 0.0),
            ])
            .polygons(vec![vec![0, 1, 2], vec![3, 4, 2]])
            .build(InitOptions::default());

        assert_eq!(mesh.clean(), 1);
        assert_eq!(mesh.polygons().vertices[1], vec![1, 4, 2]);
        assert_eq!(mesh.triangle_polygons().vertices[1], vec![1, 4, 2]);
        assert_eq!(mesh.vertex_exists(Vec3::new(1.0, 1.0, 0.0), 0.0), Some(4));
    }

    #[test]
    fn clean_on_init() {
        let mesh = MeshBuilder::new("dup")
            .vertices(vec![Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO])
            .polygons(vec![vec![2, 1, 0]])
            .build(InitOptions {
                triangulate: false,
                clean: true,
            });
        assert_eq!(mesh.polygons().vertices[0], vec![0, 1, 0]);
    }

    // ============ OBJ ============

    #[test]
    fn obj_faces_keep_their_arity() {
        let obj = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v 2 0 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
f 1/1 2/2 3/3 4/4
f 2/1 5/2 3/3
";
        let mut reader = std::io::Cursor::new(obj.as_bytes());
        let mesh = MeshBuilder::from_obj_reader("obj", &mut reader)
            .expect("valid obj")
            .texture_source("rgb")
            .build(InitOptions::default());

        assert_eq!(mesh.vertices().len(), 5);
        assert_eq!(
            mesh.polygons().vertices,
            vec![vec![0, 1, 2, 3], vec![1, 4, 2]]
        );
        assert_eq!(mesh.polygons().texture_coords[0], vec![0, 1, 2, 3]);
        assert_eq!(mesh.texture_coords().len(), 4);
    }

    #[test]
    fn obj_without_faces_is_rejected() {
        let mut reader = std::io::Cursor::new("v 0 0 0\n".as_bytes());
        assert!(matches!(
            MeshBuilder::from_obj_reader("points", &mut reader),
            Err(LoadError::EmptyMesh(_))
        ));
    }
}
