//! Built-in meshes.
//!
//! Each function returns a [`MeshBuilder`] so callers can still add a texture or
//! change colors before building.

use crate::error::LoadError;
use crate::math::Vec3;
use crate::mesh::MeshBuilder;

/// Names accepted by [`by_name`]. `"empty"` is a group without geometry.
pub const BUILTIN_NAMES: [&str; 5] = ["diamond", "cube", "plane", "insideOutPoly", "empty"];

/// Look up a built-in mesh by name.
///
/// Returns `Ok(None)` for `"empty"`, which stands for a grouping node.
pub fn by_name(name: &str, scale: f32) -> Result<Option<MeshBuilder>, LoadError> {
    let builder = match name {
        "diamond" => diamond(scale),
        "cube" => cube(scale),
        "plane" => plane(scale),
        "insideOutPoly" => inside_out_polygon(scale),
        "empty" => return Ok(None),
        _ => return Err(LoadError::UnknownModel(name.to_string())),
    };
    Ok(Some(builder))
}

/// Octahedron with its tips on the axes, eight triangles alternating red and grey.
pub fn diamond(scale: f32) -> MeshBuilder {
    MeshBuilder::new("diamond")
        .vertices(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::new(0.0, 0.0, 1.0),
        ])
        .polygons(vec![
            vec![1, 6, 4],
            vec![3, 6, 1],
            vec![6, 3, 2],
            vec![6, 2, 4],
            vec![4, 2, 5],
            vec![5, 1, 4],
            vec![3, 5, 2],
            vec![3, 1, 5],
        ])
        .polygon_colors(vec![0, 7, 0, 7, 0, 7, 0, 7])
        .scale(scale)
}

/// Axis-aligned cube with edge length `2 * scale`, one color per face.
pub fn cube(scale: f32) -> MeshBuilder {
    MeshBuilder::new("cube")
        .vertices(vec![
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
        ])
        .polygons(vec![
            vec![4, 5, 6, 7], // front
            vec![1, 0, 3, 2], // back
            vec![5, 1, 2, 6], // right
            vec![0, 4, 7, 3], // left
            vec![7, 6, 2, 3], // top
            vec![0, 1, 5, 4], // bottom
        ])
        .polygon_colors(vec![0, 1, 2, 3, 4, 5])
        .scale(scale)
}

/// Square in the x-y plane facing +z, with texture corners matching an upright
/// image.
pub fn plane(scale: f32) -> MeshBuilder {
    // 3----2
    // |    |
    // 0----1
    MeshBuilder::new("plane")
        .vertices(vec![
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(-1.0, 1.0, 0.0),
        ])
        .polygons(vec![vec![0, 1, 2, 3]])
        .polygon_colors(vec![9])
        .polygon_texture_coords(vec![vec![0, 3, 2, 1]])
        .scale(scale)
}

/// A single concave ten-sided polygon for exercising the scan converter.
pub fn inside_out_polygon(scale: f32) -> MeshBuilder {
    //     7
    // 9_8/\6_5  3_2
    // |       \/  |
    // |        4  |
    // 0___________1
    const EDGE: f32 = 100.0;
    const X0: f32 = -300.0;
    let at = |x: f32, y: f32| Vec3::new(x * EDGE + X0, y * EDGE, 0.0);

    MeshBuilder::new("inside_out_polygon")
        .vertices(vec![
            at(0.0, 0.0),
            at(7.0, 0.0),
            at(7.0, 2.0),
            at(6.0, 2.0),
            at(5.0, 1.0),
            at(4.0, 2.0),
            at(3.0, 2.0),
            at(2.0, 3.0),
            at(1.0, 2.0),
            at(0.0, 2.0),
        ])
        .polygons(vec![(0..10).collect()])
        .polygon_colors(vec![6])
        .scale(scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::InitOptions;
    use approx::assert_relative_eq;

    #[test]
    fn lookup_by_name() {
        assert!(matches!(by_name("cube", 2.0), Ok(Some(_))));
        assert!(matches!(by_name("empty", 1.0), Ok(None)));
        assert!(matches!(by_name("teapot", 1.0), Err(LoadError::UnknownModel(_))));
        for name in BUILTIN_NAMES {
            assert!(by_name(name, 1.0).is_ok());
        }
    }

    #[test]
    fn cube_faces_point_outwards() {
        let mesh = cube(1.0).build(InitOptions::default());
        let normals = mesh.polygon_normals();
        assert_relative_eq!(normals[0], Vec3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(normals[1], Vec3::new(0.0, 0.0, -1.0));
        assert_relative_eq!(normals[2], Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(normals[3], Vec3::new(-1.0, 0.0, 0.0));
        assert_relative_eq!(normals[4], Vec3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(normals[5], Vec3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn diamond_faces_point_outwards() {
        let mesh = diamond(1.0).build(InitOptions::default());
        for (polygon, normal) in mesh.polygons().vertices.iter().zip(mesh.polygon_normals()) {
            let centroid = polygon
                .iter()
                .fold(Vec3::ZERO, |acc, &v| acc + mesh.vertices()[v]);
            assert!(centroid.dot(*normal) > 0.0);
        }
    }

    #[test]
    fn concave_polygon_triangulates_into_eight_triangles() {
        let mesh = inside_out_polygon(1.0).build(InitOptions {
            triangulate: true,
            clean: false,
        });
        assert_eq!(mesh.polygons().len(), 8);
        assert_eq!(mesh.polygons().colors, vec![6; 8]);
    }
}
