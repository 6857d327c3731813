//! Local transform state of a scene-graph node.
//!
//! Provides a [`Transform`] struct with a fluent API for translation, rotation
//! (Euler angles), scale and shear. Delta updates are additive for every
//! component, scale included.

use crate::math::{Mat4, Vec3};

/// Which component of a [`Transform`] an update targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformKind {
    Translate,
    Rotate,
    Scale,
    Shear,
}

/// Whether an update adds to the current value or replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransformOp {
    #[default]
    By,
    Set,
}

/// A 3D transform with translation, rotation (Euler angles), scale and shear.
///
/// Provides a fluent API where mutating methods return `&mut Self` for chaining:
///
/// ```ignore
/// transform
///     .set_translation(Vec3::new(5.0, 2.0, 0.0))
///     .rotate(Vec3::new(0.0, 0.1, 0.0))
///     .set_scale(Vec3::splat(2.0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    translation: Vec3,
    rotation: Vec3, // radians, applied X then Y then Z
    scale: Vec3,
    shear: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            shear: Vec3::ZERO,
        }
    }
}

impl Transform {
    /// Create a new transform with default values (translation=0, rotation=0, scale=1, shear=0).
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an update to one component.
    pub fn apply(&mut self, kind: TransformKind, value: Vec3, op: TransformOp) -> &mut Self {
        let target = match kind {
            TransformKind::Translate => &mut self.translation,
            TransformKind::Rotate => &mut self.rotation,
            TransformKind::Scale => &mut self.scale,
            TransformKind::Shear => &mut self.shear,
        };
        match op {
            TransformOp::By => *target += value,
            TransformOp::Set => *target = value,
        }
        self
    }

    // ============ Translation ============

    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    pub fn set_translation(&mut self, translation: Vec3) -> &mut Self {
        self.apply(TransformKind::Translate, translation, TransformOp::Set)
    }

    pub fn translate(&mut self, delta: Vec3) -> &mut Self {
        self.apply(TransformKind::Translate, delta, TransformOp::By)
    }

    // ============ Rotation ============

    /// Get the rotation (Euler angles in radians).
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Vec3) -> &mut Self {
        self.apply(TransformKind::Rotate, rotation, TransformOp::Set)
    }

    pub fn rotate(&mut self, delta: Vec3) -> &mut Self {
        self.apply(TransformKind::Rotate, delta, TransformOp::By)
    }

    // ============ Scale & Shear ============

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vec3) -> &mut Self {
        self.apply(TransformKind::Scale, scale, TransformOp::Set)
    }

    pub fn shear(&self) -> Vec3 {
        self.shear
    }

    pub fn set_shear(&mut self, shear: Vec3) -> &mut Self {
        self.apply(TransformKind::Shear, shear, TransformOp::Set)
    }

    // ============ Matrix Generation ============

    /// Rotation part only: RotationX * RotationY * RotationZ.
    pub fn rotation_matrix(&self) -> Mat4 {
        Mat4::rotation_xyz(self.rotation)
    }

    /// Generate the local modelview matrix.
    ///
    /// Order: Translation * Rotation * Scale * Shear
    /// (shear applied first, then scale, rotations, translation)
    pub fn to_matrix(&self, rotation: &Mat4) -> Mat4 {
        let local = Mat4::translation(self.translation) * *rotation * Mat4::scaling(self.scale);
        if self.shear == Vec3::ZERO {
            local
        } else {
            local * Mat4::shearing(self.shear)
        }
    }
}
