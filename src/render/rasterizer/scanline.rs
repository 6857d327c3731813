//! Edge-table scanline rasterization.
//!
//! # Algorithm Overview
//!
//! 1. **Build edges**: every polygon side that is not horizontal becomes an edge
//!    covering the half-open row range `[ceil(y_top), ceil(y_bottom))`, so a
//!    vertex shared by two edges is counted once per row.
//! 2. **Intersect**: for each row, every edge covering it yields a crossing with
//!    its x, depth, texture coordinate and its position on the edge.
//! 3. **Pair**: crossings sorted by x are paired `(0, 1), (2, 3), ...` (even-odd
//!    rule), which also handles concave polygons.
//! 4. **Fill spans**: per span the shader is prepared from the two crossings,
//!    then every pixel is depth tested, textured, shaded and written.
//!
//! Depth and texture coordinates are interpolated linearly in screen space.
//!
//! Lines use Bresenham's algorithm with the depth interpolated along the line.

use super::{PolygonFill, Rasterizer, TextureMapping};
use crate::colors::ColorEntry;
use crate::math::{Vec2, Vec3};
use crate::render::framebuffer::FrameBuffer;
use crate::render::shader::{ScanlineEdges, Shader};

/// Depth added to lines so they win over the faces they outline.
pub const LINE_DEPTH_BIAS: f32 = 1.0;

/// A non-horizontal polygon side, oriented top to bottom.
#[derive(Debug, Clone, Copy)]
struct Edge {
    /// Vertex indices of the top and bottom end.
    vertices: [usize; 2],
    top: Vec3,
    bottom: Vec3,
    /// Texture coordinates of the top and bottom end.
    uv: [Vec2; 2],
    /// First covered row and one past the last.
    rows: (i32, i32),
}

impl Edge {
    fn crossing(&self, y: f32) -> Crossing {
        let t = (y - self.top.y) / (self.bottom.y - self.top.y);
        Crossing {
            x: self.top.x + (self.bottom.x - self.top.x) * t,
            z: self.top.z + (self.bottom.z - self.top.z) * t,
            uv: self.uv[0].lerp(self.uv[1], t),
            vertices: self.vertices,
            weights: [1.0 - t, t],
        }
    }
}

/// Where a row crosses an edge.
#[derive(Debug, Clone, Copy)]
struct Crossing {
    x: f32,
    z: f32,
    uv: Vec2,
    vertices: [usize; 2],
    weights: [f32; 2],
}

/// Scanline rasterizer with reusable edge and crossing buffers.
#[derive(Debug, Clone)]
pub struct ScanlineRasterizer {
    line_depth_bias: f32,
    edges: Vec<Edge>,
    crossings: Vec<Crossing>,
}

impl Default for ScanlineRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanlineRasterizer {
    pub fn new() -> Self {
        Self {
            line_depth_bias: LINE_DEPTH_BIAS,
            edges: Vec::new(),
            crossings: Vec::new(),
        }
    }

    pub fn with_line_depth_bias(mut self, bias: f32) -> Self {
        self.line_depth_bias = bias;
        self
    }

    /// Collect the non-horizontal edges of the polygon. Returns the covered rows.
    fn build_edges(&mut self, fill: &PolygonFill<'_>) -> Option<(i32, i32)> {
        self.edges.clear();
        let corners = fill.polygon.len();
        let mut rows: Option<(i32, i32)> = None;

        for corner in 0..corners {
            let next = (corner + 1) % corners;
            let (a, b) = (fill.polygon[corner], fill.polygon[next]);
            let (Some(&pa), Some(&pb)) = (fill.vertices.get(a), fill.vertices.get(b)) else {
                log::warn!("polygon references missing vertex ({a} or {b})");
                return None;
            };
            let (ua, ub) = match &fill.texture {
                Some(mapping) => (corner_uv(mapping, corner), corner_uv(mapping, next)),
                None => (Vec2::ZERO, Vec2::ZERO),
            };

            let (top, bottom, vertices, uv) = if pa.y <= pb.y {
                (pa, pb, [a, b], [ua, ub])
            } else {
                (pb, pa, [b, a], [ub, ua])
            };
            let first = top.y.ceil() as i32;
            let end = bottom.y.ceil() as i32;
            if first >= end {
                continue;
            }

            rows = Some(match rows {
                Some((lo, hi)) => (lo.min(first), hi.max(end)),
                None => (first, end),
            });
            self.edges.push(Edge {
                vertices,
                top,
                bottom,
                uv,
                rows: (first, end),
            });
        }
        rows
    }

    /// Crossings of row `y`, sorted by x.
    fn intersect(&mut self, y: i32) {
        self.crossings.clear();
        let row = y as f32;
        self.crossings.extend(
            self.edges
                .iter()
                .filter(|edge| edge.rows.0 <= y && y < edge.rows.1)
                .map(|edge| edge.crossing(row)),
        );
        self.crossings.sort_by(|a, b| a.x.total_cmp(&b.x));
    }

    #[allow(clippy::too_many_arguments)]
    fn fill_span(
        y: i32,
        left: &Crossing,
        right: &Crossing,
        texture: Option<&TextureMapping<'_>>,
        color: &mut ColorEntry,
        shader: &mut Shader,
        framebuffer: &mut FrameBuffer,
    ) {
        // Interpolation runs over the whole span; only the visible part is walked.
        let x_start = left.x.ceil() as i32;
        let x_end = right.x.floor() as i32;
        let first = x_start.max(0);
        let last = x_end.min(framebuffer.width() as i32 - 1);
        if x_end < x_start || last < first {
            return;
        }

        let width = right.x - left.x;
        let (dz, duv) = if width.abs() < f32::EPSILON {
            (0.0, Vec2::ZERO)
        } else {
            ((right.z - left.z) / width, (right.uv - left.uv) * (1.0 / width))
        };
        let offset = first as f32 - left.x;
        let mut z = left.z + dz * offset;
        let mut uv = left.uv + duv * offset;

        let edges = ScanlineEdges {
            vertex_indices: [left.vertices, right.vertices],
            weights: [left.weights, right.weights],
        };
        shader.prepare_scanline(&edges, (x_end - x_start) as usize);
        if first > x_start {
            shader.skip_on_scanline((first - x_start) as usize);
        }

        for x in first..=last {
            if framebuffer.z_test(x, y, z) {
                if let Some(mapping) = texture {
                    mapping.texture.sample(uv, color);
                }
                shader.shade(color);
                framebuffer.set(x, y, z, color, false, true);
            }
            shader.step_on_scanline();
            z += dz;
            uv = uv + duv;
        }
    }
}

/// Texture coordinate of polygon corner `corner`, origin if the table is short.
fn corner_uv(mapping: &TextureMapping<'_>, corner: usize) -> Vec2 {
    mapping
        .corners
        .get(corner)
        .and_then(|&index| mapping.coords.get(index))
        .copied()
        .unwrap_or_default()
}

impl Rasterizer for ScanlineRasterizer {
    fn fill_polygon(
        &mut self,
        fill: &PolygonFill<'_>,
        color: &mut ColorEntry,
        shader: &mut Shader,
        framebuffer: &mut FrameBuffer,
    ) {
        if fill.polygon.len() < 3 {
            return;
        }
        let Some((first, end)) = self.build_edges(fill) else {
            return;
        };
        let first = first.max(0);
        let end = end.min(framebuffer.height() as i32);

        for y in first..end {
            self.intersect(y);
            for pair in self.crossings.chunks_exact(2) {
                Self::fill_span(
                    y,
                    &pair[0],
                    &pair[1],
                    fill.texture.as_ref(),
                    color,
                    shader,
                    framebuffer,
                );
            }
        }
    }

    fn stroke_polygon(
        &mut self,
        vertices: &[Vec3],
        polygon: &[usize],
        color: &ColorEntry,
        framebuffer: &mut FrameBuffer,
    ) {
        let corners = polygon.len();
        for corner in 0..corners {
            let next = polygon[(corner + 1) % corners];
            if let (Some(&from), Some(&to)) = (vertices.get(polygon[corner]), vertices.get(next)) {
                self.draw_line(from, to, color, framebuffer);
            }
        }
    }

    fn draw_line(&mut self, from: Vec3, to: Vec3, color: &ColorEntry, framebuffer: &mut FrameBuffer) {
        let (x0, y0) = (from.x.round() as i32, from.y.round() as i32);
        let (x1, y1) = (to.x.round() as i32, to.y.round() as i32);
        let z0 = from.z + self.line_depth_bias;
        let z1 = to.z + self.line_depth_bias;

        let dx = (x1 - x0).abs();
        let dy = (y1 - y0).abs();
        let steps = dx.max(dy);
        if steps == 0 {
            framebuffer.set(x0, y0, z0.max(z1), color, true, true);
            return;
        }

        let x_incr_direction = if x0 < x1 { 1 } else { -1 };
        let y_incr_direction = if y0 < y1 { 1 } else { -1 };
        let dz = (z1 - z0) / steps as f32;

        let mut err = dx - dy;
        let mut x = x0;
        let mut y = y0;
        let mut z = z0;

        loop {
            framebuffer.set(x, y, z, color, true, true);
            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 > -dy {
                err -= dy;
                x += x_incr_direction;
            }
            if e2 < dx {
                err += dx;
                y += y_incr_direction;
            }
            z += dz;
        }
    }
}
