//! Polygon and line rasterization.
//!
//! The scene drives a [`Rasterizer`] through three operations: filling a polygon
//! with per-fragment shading, stroking its outline, and drawing single lines.
//! Implementations call back into [`Shader`] for fragment colors and into
//! [`FrameBuffer`] for the depth test and the write.
//!
//! Available algorithms:
//! - [`ScanlineRasterizer`]: edge-table scan conversion with even-odd spans

mod scanline;

pub use scanline::{ScanlineRasterizer, LINE_DEPTH_BIAS};

use super::framebuffer::FrameBuffer;
use super::shader::Shader;
use crate::colors::ColorEntry;
use crate::math::{Vec2, Vec3};
use crate::texture::Texture;

/// Texture coordinates of one polygon.
#[derive(Debug, Clone, Copy)]
pub struct TextureMapping<'a> {
    pub texture: &'a Texture,
    /// Texture coordinate table of the mesh.
    pub coords: &'a [Vec2],
    /// Index into `coords` per polygon corner, parallel to the polygon.
    pub corners: &'a [usize],
}

/// One polygon ready for scan conversion, in screen space.
#[derive(Debug, Clone, Copy)]
pub struct PolygonFill<'a> {
    /// Projected vertices of the model; `z` carries eye-space depth.
    pub vertices: &'a [Vec3],
    /// Vertex indices of the polygon corners, in order.
    pub polygon: &'a [usize],
    pub texture: Option<TextureMapping<'a>>,
}

/// Trait for polygon rasterization algorithms.
///
/// Implementors may keep scratch buffers between calls, hence `&mut self`.
pub trait Rasterizer {
    /// Scan-convert a polygon, shading every visible fragment.
    ///
    /// For each span the shader is prepared with the two crossed edges; for each
    /// pixel the depth is tested, the texture sampled into `color.rgba`, the shader
    /// writes `color.rgba_shaded`, and the framebuffer stores it.
    fn fill_polygon(
        &mut self,
        fill: &PolygonFill<'_>,
        color: &mut ColorEntry,
        shader: &mut Shader,
        framebuffer: &mut FrameBuffer,
    );

    /// Draw the closed outline of a polygon.
    fn stroke_polygon(
        &mut self,
        vertices: &[Vec3],
        polygon: &[usize],
        color: &ColorEntry,
        framebuffer: &mut FrameBuffer,
    );

    /// Draw a depth-tested line between two screen-space points.
    fn draw_line(&mut self, from: Vec3, to: Vec3, color: &ColorEntry, framebuffer: &mut FrameBuffer);
}
