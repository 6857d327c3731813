//! Light state and the lighting equation.
//!
//! The scene has an ambient term and one white point light with a specular
//! highlight. The light position is not transformed or projected; it lives in
//! the same eye space as the transformed vertices.

use crate::colors::{scale_and_offset, Rgba};
use crate::math::Vec3;

/// Direction towards the viewer used for specular highlights.
pub const VIEW_DIRECTION: Vec3 = Vec3::TOWARDS_VIEWER;

/// Ambient, point and specular light parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lights {
    pub ambient: f32,
    pub point: f32,
    pub position: Vec3,
    pub specular: f32,
    pub exponent: f32,
}

impl Default for Lights {
    fn default() -> Self {
        Self {
            ambient: 0.0,
            point: 0.0,
            position: Vec3::ZERO,
            specular: 0.0,
            exponent: 1.0,
        }
    }
}

/// Partial update of [`Lights`]. Fields left `None` keep their current value,
/// position components included.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LightUpdate {
    pub ambient: Option<f32>,
    pub point: Option<f32>,
    pub position: [Option<f32>; 3],
    pub specular: Option<f32>,
    pub exponent: Option<f32>,
}

impl LightUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ambient(mut self, intensity: f32) -> Self {
        self.ambient = Some(intensity);
        self
    }

    pub fn point(mut self, intensity: f32) -> Self {
        self.point = Some(intensity);
        self
    }

    pub fn position(mut self, position: Vec3) -> Self {
        self.position = [Some(position.x), Some(position.y), Some(position.z)];
        self
    }

    pub fn specular(mut self, intensity: f32, exponent: f32) -> Self {
        self.specular = Some(intensity);
        self.exponent = Some(exponent);
        self
    }

    /// Whether the update touches the light position.
    pub fn moves_light(&self) -> bool {
        self.position.iter().any(Option::is_some)
    }
}

/// Light arriving at one surface point.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Intensity {
    pub diffuse: f32,
    pub ambient_diffuse: f32,
    pub specular: f32,
}

impl Intensity {
    pub fn total(&self) -> f32 {
        self.ambient_diffuse + self.specular
    }

    /// Lit color: `ambient_diffuse * rgba + specular * white`, clamped.
    #[inline]
    pub fn apply(&self, rgba: Rgba) -> Rgba {
        lit_color(rgba, self.ambient_diffuse, self.specular)
    }
}

/// `ambient_diffuse * rgba + specular * white`, clamped to the channel range.
#[inline]
pub fn lit_color(rgba: Rgba, ambient_diffuse: f32, specular: f32) -> Rgba {
    scale_and_offset(rgba, ambient_diffuse, specular * 255.0)
}

impl Lights {
    /// Merge a partial update.
    pub fn apply(&mut self, update: &LightUpdate) {
        self.ambient = update.ambient.unwrap_or(self.ambient);
        self.point = update.point.unwrap_or(self.point);
        self.specular = update.specular.unwrap_or(self.specular);
        self.exponent = update.exponent.unwrap_or(self.exponent);
        for (axis, value) in update.position.iter().enumerate() {
            if let Some(value) = value {
                self.position[axis] = *value;
            }
        }
    }

    /// Sum of all light intensities, the upper bound of [`Intensity::total`].
    pub fn total(&self) -> f32 {
        self.ambient + self.point + self.specular
    }

    /// Evaluate the lighting equation at `point` with unit `normal`.
    ///
    /// The specular term is zero on surfaces facing away from the light
    /// (`n · l <= 0`): the mirrored light direction can still point at the
    /// viewer there, but no light reaches the surface to be reflected.
    pub fn intensity(&self, point: Vec3, normal: Vec3) -> Intensity {
        let light_direction = (self.position - point).normalize();
        let n_dot_l = normal.dot(light_direction);
        let diffuse = n_dot_l.max(0.0);
        let ambient_diffuse = self.ambient + self.point * diffuse;

        let specular = if self.specular > 0.0 && n_dot_l > 0.0 {
            let reflect = normal * (2.0 * n_dot_l) - light_direction;
            self.specular * reflect.dot(VIEW_DIRECTION).max(0.0).powf(self.exponent)
        } else {
            0.0
        };

        Intensity {
            diffuse,
            ambient_diffuse,
            specular,
        }
    }
}
