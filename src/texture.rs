//! Textures: image files and procedural patterns.
//!
//! A texture source containing a dot is treated as an image file name, anything
//! else names a procedural pattern.

use std::path::Path;

use crate::colors::{ColorEntry, Rgba};
use crate::error::LoadError;
use crate::math::Vec2;

/// Generated patterns available by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProceduralPattern {
    /// Red along u, green along v, blue in the remaining diagonal.
    Rgb,
    /// Black and white squares, `cells` per side.
    Checkerboard { cells: u32 },
}

#[derive(Debug, Clone, PartialEq)]
enum TextureData {
    Image {
        pixels: Vec<Rgba>,
        width: u32,
        height: u32,
    },
    Procedural(ProceduralPattern),
}

/// Represents a 2D texture for texture mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    name: String,
    data: TextureData,
}

impl Texture {
    /// Returns true when `source` names a procedural pattern rather than a file.
    pub fn is_procedural_source(source: &str) -> bool {
        !source.contains('.')
    }

    /// Load from a texture source: an image path or a procedural pattern name.
    pub fn load(source: &str) -> Result<Self, LoadError> {
        if Self::is_procedural_source(source) {
            Self::procedural(source)
        } else {
            Self::from_file(source)
        }
    }

    /// Load a texture from an image file (PNG, JPG, etc.)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let img = image::open(path)?.to_rgba8();
        let (width, height) = img.dimensions();
        let pixels = img.pixels().map(|p| p.0).collect();

        Self::from_rgba(path.to_string_lossy(), width, height, pixels)
    }

    /// Wrap raw RGBA pixels stored row by row from the top-left corner.
    ///
    /// Fails with [`LoadError::InvalidTexture`] if either dimension is zero or
    /// the pixel count doesn't match them.
    pub fn from_rgba(
        name: impl Into<String>,
        width: u32,
        height: u32,
        pixels: Vec<Rgba>,
    ) -> Result<Self, LoadError> {
        let name = name.into();
        let expected = width as usize * height as usize;
        if expected == 0 || pixels.len() != expected {
            return Err(LoadError::InvalidTexture {
                name,
                width,
                height,
                pixels: pixels.len(),
            });
        }
        Ok(Self {
            name,
            data: TextureData::Image {
                pixels,
                width,
                height,
            },
        })
    }

    /// Procedural pattern by name: `rgb` or `checkerboard`.
    pub fn procedural(name: &str) -> Result<Self, LoadError> {
        let pattern = match name {
            "rgb" => ProceduralPattern::Rgb,
            "checkerboard" => ProceduralPattern::Checkerboard { cells: 8 },
            _ => return Err(LoadError::UnknownTexture(name.to_string())),
        };
        Ok(Self {
            name: name.to_string(),
            data: TextureData::Procedural(pattern),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_procedural(&self) -> bool {
        matches!(self.data, TextureData::Procedural(_))
    }

    /// Sample the texture at `uv` into `color.rgba` using nearest-neighbor filtering.
    ///
    /// # UV Coordinate Convention
    /// - UV coordinates are in [0,1] range, values outside are clamped
    /// - (0,0) = bottom-left, but images are stored top-left origin
    /// - We flip V to correct for this: v_corrected = 1.0 - v
    #[inline]
    pub fn sample(&self, uv: Vec2, color: &mut ColorEntry) {
        let u = uv.x.clamp(0.0, 1.0);
        let v = uv.y.clamp(0.0, 1.0);

        color.rgba = match &self.data {
            TextureData::Image {
                pixels,
                width,
                height,
            } => {
                // u = 1 and v = 0 land on the last texel instead of past it
                let x = ((u * *width as f32) as u32).min(width - 1);
                let y = (((1.0 - v) * *height as f32) as u32).min(height - 1);
                pixels[(y * width + x) as usize]
            }
            TextureData::Procedural(pattern) => sample_procedural(*pattern, u, v),
        };
    }
}

fn sample_procedural(pattern: ProceduralPattern, u: f32, v: f32) -> Rgba {
    match pattern {
        ProceduralPattern::Rgb => [
            (u * 255.0) as u8,
            (v * 255.0) as u8,
            ((1.0 - u + v) * 0.5 * 255.0) as u8,
            255,
        ],
        ProceduralPattern::Checkerboard { cells } => {
            let cell = |t: f32| ((t * cells as f32) as u32).min(cells.saturating_sub(1));
            if (cell(u) + cell(v)) % 2 == 0 {
                [255, 255, 255, 255]
            } else {
                [0, 0, 0, 255]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_two() -> Texture {
        // top row: red, green; bottom row: blue, white
        Texture::from_rgba(
            "test",
            2,
            2,
            vec![
                [255, 0, 0, 255],
                [0, 255, 0, 255],
                [0, 0, 255, 255],
                [255, 255, 255, 255],
            ],
        )
        .expect("four pixels for 2x2")
    }

    #[test]
    fn sample_flips_v() {
        let texture = two_by_two();
        let mut color = ColorEntry::new("grey", [128, 128, 128, 255]);

        texture.sample(Vec2::new(0.0, 0.0), &mut color);
        assert_eq!(color.rgba, [0, 0, 255, 255]);

        texture.sample(Vec2::new(0.0, 1.0), &mut color);
        assert_eq!(color.rgba, [255, 0, 0, 255]);
    }

    #[test]
    fn sample_at_one_stays_inside() {
        let texture = two_by_two();
        let mut color = ColorEntry::new("grey", [128, 128, 128, 255]);
        texture.sample(Vec2::new(1.0, 1.0), &mut color);
        assert_eq!(color.rgba, [0, 255, 0, 255]);
    }

    #[test]
    fn sample_leaves_shaded_color_alone() {
        let texture = two_by_two();
        let mut color = ColorEntry::new("grey", [128, 128, 128, 255]);
        texture.sample(Vec2::new(0.9, 0.1), &mut color);
        assert_eq!(color.rgba, [255, 255, 255, 255]);
        assert_eq!(color.rgba_shaded, [128, 128, 128, 255]);
    }

    #[test]
    fn procedural_rgb_corners() {
        let texture = Texture::load("rgb").expect("known pattern");
        assert!(texture.is_procedural());
        let mut color = ColorEntry::new("white", [255, 255, 255, 255]);
        texture.sample(Vec2::new(1.0, 0.0), &mut color);
        assert_eq!(color.rgba, [255, 0, 0, 255]);
        texture.sample(Vec2::new(0.0, 1.0), &mut color);
        assert_eq!(color.rgba, [0, 255, 255, 255]);
    }

    #[test]
    fn checkerboard_alternates() {
        let texture = Texture::procedural("checkerboard").expect("known pattern");
        let mut a = ColorEntry::new("a", [0, 0, 0, 0]);
        let mut b = ColorEntry::new("b", [0, 0, 0, 0]);
        texture.sample(Vec2::new(0.01, 0.01), &mut a);
        texture.sample(Vec2::new(0.15, 0.01), &mut b);
        assert_ne!(a.rgba, b.rgba);
    }

    #[test]
    fn mismatched_pixel_count_is_rejected() {
        assert!(matches!(
            Texture::from_rgba("short", 2, 2, vec![[0, 0, 0, 255]; 3]),
            Err(LoadError::InvalidTexture { pixels: 3, .. })
        ));
        assert!(matches!(
            Texture::from_rgba("empty", 0, 4, Vec::new()),
            Err(LoadError::InvalidTexture { width: 0, .. })
        ));
    }

    #[test]
    fn source_kind_by_dot() {
        assert!(Texture::is_procedural_source("rgb"));
        assert!(!Texture::is_procedural_source("brick.png"));
        assert!(matches!(
            Texture::load("plaid"),
            Err(LoadError::UnknownTexture(_))
        ));
    }
}
