//! 4D vector for homogeneous coordinates.

use super::vec3::Vec3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec4 {
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Create a point (w=1) from a Vec3.
    pub const fn point(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z, 1.0)
    }

    /// Create a direction vector (w=0) from a Vec3.
    pub const fn direction(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z, 0.0)
    }

    /// Convert to Vec3, discarding w.
    pub const fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Convert to screen space: x and y are divided by w, z keeps eye-space depth.
    ///
    /// Points with w at (or numerically near) zero are left undivided, there is no
    /// clipping stage to reject them.
    pub fn to_screen(self) -> Vec3 {
        if self.w != 1.0 && self.w.abs() > f32::EPSILON {
            Vec3::new(self.x / self.w, self.y / self.w, self.z)
        } else {
            Vec3::new(self.x, self.y, self.z)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_screen_divides_xy_only() {
        let v = Vec4::new(4.0, -2.0, -7.0, 2.0);
        assert_eq!(v.to_screen(), Vec3::new(2.0, -1.0, -7.0));
    }

    #[test]
    fn to_screen_skips_zero_w() {
        let v = Vec4::new(4.0, -2.0, -7.0, 0.0);
        assert_eq!(v.to_screen(), Vec3::new(4.0, -2.0, -7.0));
    }
}
