//! Projection and viewport parameters.
//!
//! The [`Projection`] struct is the single source of truth for the projection
//! type and canvas size. It generates the projection matrix, the viewport matrix
//! and their product used by the model pipeline.
//!
//! Every projection keeps eye-space z as depth, so the z-buffer compares the same
//! quantity whatever the type.

use std::fmt;
use std::str::FromStr;

use crate::error::PipelineError;
use crate::math::{Mat4, Vec3};

/// Vertical field of view of [`ProjectionType::Perspective`], in radians.
pub const PERSPECTIVE_FOV_Y: f32 = 1.0;

/// Distance of the frustum near plane from the eye.
pub const FRUSTUM_NEAR: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionType {
    #[default]
    Ortho,
    Frustum,
    Perspective,
}

impl ProjectionType {
    pub const ALL: [ProjectionType; 3] = [
        ProjectionType::Ortho,
        ProjectionType::Frustum,
        ProjectionType::Perspective,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ProjectionType::Ortho => "ortho",
            ProjectionType::Frustum => "frustum",
            ProjectionType::Perspective => "perspective",
        }
    }
}

impl fmt::Display for ProjectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProjectionType {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProjectionType::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| PipelineError::UnknownProjection(s.to_string()))
    }
}

/// Projection type plus the canvas it maps onto.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    kind: ProjectionType,
    width: f32,
    height: f32,
}

impl Projection {
    pub fn new(kind: ProjectionType, width: usize, height: usize) -> Self {
        Self {
            kind,
            width: width as f32,
            height: height as f32,
        }
    }

    pub fn kind(&self) -> ProjectionType {
        self.kind
    }

    pub fn set_kind(&mut self, kind: ProjectionType) {
        self.kind = kind;
    }

    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f32 {
        self.width / self.height
    }

    /// Eye-to-normalized-device matrix.
    ///
    /// Ortho maps `[-width, width] x [-height, height]` onto the unit square.
    /// Frustum and perspective pull the eye back by `width` so the `z = 0` plane
    /// maps like ortho in frustum mode.
    pub fn matrix(&self) -> Mat4 {
        let pull_back = Mat4::translation(Vec3::new(0.0, 0.0, -self.width));
        match self.kind {
            ProjectionType::Ortho => Mat4::orthographic(self.width, self.height),
            ProjectionType::Frustum => {
                let top = self.height / self.width;
                Mat4::frustum(-1.0, 1.0, -top, top, FRUSTUM_NEAR) * pull_back
            }
            ProjectionType::Perspective => {
                Mat4::perspective(PERSPECTIVE_FOV_Y, self.aspect_ratio()) * pull_back
            }
        }
    }

    /// Normalized-device-to-pixel matrix, origin top-left.
    pub fn viewport(&self) -> Mat4 {
        Mat4::viewport(self.width, self.height)
    }

    /// `viewport * projection`, applied to transformed vertices.
    pub fn viewport_projection(&self) -> Mat4 {
        self.viewport() * self.matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-3;

    #[test]
    fn names_round_trip_and_unknown_fails() {
        for kind in ProjectionType::ALL {
            assert_eq!(kind.to_string().parse::<ProjectionType>().ok(), Some(kind));
        }
        assert!(matches!(
            "fisheye".parse::<ProjectionType>(),
            Err(PipelineError::UnknownProjection(_))
        ));
    }

    #[test]
    fn ortho_centers_the_origin_and_keeps_depth() {
        let projection = Projection::new(ProjectionType::Ortho, 800, 600);
        let m = projection.viewport_projection();
        assert_relative_eq!(
            m.project_point(Vec3::new(0.0, 0.0, -7.0)),
            Vec3::new(400.0, 300.0, -7.0)
        );
        assert_relative_eq!(
            m.project_point(Vec3::new(800.0, 600.0, 0.0)),
            Vec3::new(800.0, 0.0, 0.0)
        );
    }

    #[test]
    fn frustum_matches_ortho_on_the_z0_plane() {
        let ortho = Projection::new(ProjectionType::Ortho, 800, 600).viewport_projection();
        let frustum = Projection::new(ProjectionType::Frustum, 800, 600).viewport_projection();
        let p = Vec3::new(200.0, -150.0, 0.0);
        let a = ortho.project_point(p);
        let b = frustum.project_point(p);
        assert_relative_eq!(a.x, b.x, epsilon = EPSILON);
        assert_relative_eq!(a.y, b.y, epsilon = EPSILON);
    }

    #[test]
    fn perspective_shrinks_distant_points() {
        let m = Projection::new(ProjectionType::Perspective, 800, 600).viewport_projection();
        let near = m.project_point(Vec3::new(100.0, 0.0, 0.0));
        let far = m.project_point(Vec3::new(100.0, 0.0, -400.0));
        assert!(far.x - 400.0 < near.x - 400.0);
        assert!(far.z < near.z);
    }
}
