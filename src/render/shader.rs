//! Fragment shading and its scanline interpolation contract.
//!
//! A [`Shader`] has exactly one active [`ShadingMode`]. The mode selects all four
//! operations together:
//!
//! - `init`: per polygon, after [`Shader::set_polygon`]
//! - `prepare_scanline`: per span, interpolates along the two polygon edges to
//!   the span ends and computes the per-pixel delta
//! - `step_on_scanline`: per pixel, advances the running value by one delta
//! - `shade`: per pixel, writes `rgba_shaded` of the fragment color
//!
//! Gouraud interpolates lit intensities; phong and toon interpolate the
//! unnormalized normal and the eye-space position and normalize once per
//! fragment.

use std::fmt;
use std::ops::{Add, Mul, Sub};
use std::str::FromStr;

use crate::colors::ColorEntry;
use crate::error::PipelineError;
use crate::light::{lit_color, Intensity, LightUpdate, Lights};
use crate::math::{Vec2, Vec3};

/// Number of discrete intensity bands used by toon shading.
pub const TOON_BANDS: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadingMode {
    /// Pre-lit color verbatim.
    #[default]
    None,
    Flat,
    Gouraud,
    Phong,
    Toon,
}

impl ShadingMode {
    pub const ALL: [ShadingMode; 5] = [
        ShadingMode::None,
        ShadingMode::Flat,
        ShadingMode::Gouraud,
        ShadingMode::Phong,
        ShadingMode::Toon,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShadingMode::None => "none",
            ShadingMode::Flat => "flat",
            ShadingMode::Gouraud => "gouraud",
            ShadingMode::Phong => "phong",
            ShadingMode::Toon => "toon",
        }
    }

    /// Whether the mode takes the point light into account.
    pub fn uses_light_location(self) -> bool {
        !matches!(self, ShadingMode::None)
    }
}

impl fmt::Display for ShadingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShadingMode {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShadingMode::ALL
            .into_iter()
            .find(|mode| mode.name() == s)
            .ok_or_else(|| PipelineError::UnknownShadingMode(s.to_string()))
    }
}

/// Geometry of the model the shader is bound to, in eye space.
#[derive(Debug, Clone, Copy)]
pub struct ModelView<'a> {
    pub vertices: &'a [Vec3],
    pub vertex_normals: &'a [Vec3],
    pub polygon_normals: &'a [Vec3],
    pub polygons: &'a [Vec<usize>],
}

/// The two polygon edges a scanline span runs between.
///
/// `vertex_indices[side]` are the end vertices of the edge at the start
/// (`side = 0`) or end (`side = 1`) of the span; `weights[side]` give the
/// position on that edge, `value = w0 * value(v0) + w1 * value(v1)`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScanlineEdges {
    pub vertex_indices: [[usize; 2]; 2],
    pub weights: [[f32; 2]; 2],
}

impl ScanlineEdges {
    /// Edge-stage interpolation of a per-vertex attribute on `side`.
    #[inline]
    fn edge_value<T>(&self, values: &[T], side: usize) -> T
    where
        T: Copy + Add<Output = T> + Mul<f32, Output = T>,
    {
        let [a, b] = self.vertex_indices[side];
        let [wa, wb] = self.weights[side];
        values[a] * wa + values[b] * wb
    }
}

/// A value running linearly across a scanline span.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Interpolated<T> {
    value: T,
    delta: T,
}

impl<T> Interpolated<T>
where
    T: Copy + Add<Output = T> + Sub<Output = T> + Mul<f32, Output = T>,
{
    /// Start at `start`, reach `end` after `steps` calls to [`Interpolated::step`].
    fn across(start: T, end: T, steps: usize) -> Self {
        let scale = if steps == 0 { 0.0 } else { 1.0 / steps as f32 };
        Self {
            value: start,
            delta: (end - start) * scale,
        }
    }

    #[inline]
    fn step(&mut self) {
        self.value = self.value + self.delta;
    }

    fn advance(&mut self, steps: usize) {
        self.value = self.value + self.delta * steps as f32;
    }
}

#[inline]
fn intensity_pair(intensity: Intensity) -> Vec2 {
    Vec2::new(intensity.ambient_diffuse, intensity.specular)
}

#[derive(Debug, Clone, Default)]
pub struct Shader {
    mode: ShadingMode,
    lights: Lights,

    // Bound model, copied so the shader outlives the borrow.
    vertices: Vec<Vec3>,
    vertex_normals: Vec<Vec3>,
    polygon_normals: Vec<Vec3>,
    polygon_indices: Vec<usize>,
    polygon_offsets: Vec<usize>,
    model_bound: bool,
    polygon: Option<usize>,

    polygon_intensity: Intensity,
    // (ambient_diffuse, specular) per vertex index.
    vertex_intensities: Vec<Vec2>,
    scan_intensity: Interpolated<Vec2>,
    scan_normal: Interpolated<Vec3>,
    scan_position: Interpolated<Vec3>,
}

impl Shader {
    pub fn new(mode: ShadingMode, lights: Lights) -> Self {
        Self {
            mode,
            lights,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> ShadingMode {
        self.mode
    }

    /// Switch all four operations to `mode`. The current polygon must be bound again.
    pub fn set_mode(&mut self, mode: ShadingMode) {
        self.mode = mode;
        self.polygon = None;
    }

    pub fn uses_light_location(&self) -> bool {
        self.mode.uses_light_location()
    }

    pub fn lights(&self) -> &Lights {
        &self.lights
    }

    pub fn set_lights(&mut self, update: &LightUpdate) {
        self.lights.apply(update);
    }

    pub fn set_light_position(&mut self, position: Vec3) {
        self.lights.position = position;
    }

    // ============ Binding ============

    /// Bind the geometry of the model about to be drawn.
    pub fn set_model(&mut self, view: &ModelView<'_>) {
        self.vertices.clear();
        self.vertices.extend_from_slice(view.vertices);
        self.vertex_normals.clear();
        self.vertex_normals.extend_from_slice(view.vertex_normals);
        self.polygon_normals.clear();
        self.polygon_normals.extend_from_slice(view.polygon_normals);

        self.polygon_indices.clear();
        self.polygon_offsets.clear();
        self.polygon_offsets.push(0);
        for polygon in view.polygons {
            self.polygon_indices.extend_from_slice(polygon);
            self.polygon_offsets.push(self.polygon_indices.len());
        }

        self.vertex_intensities.clear();
        self.vertex_intensities.resize(self.vertices.len(), Vec2::ZERO);
        self.model_bound = true;
        self.polygon = None;
    }

    /// Bind polygon `index` of the current model and run the mode's `init`.
    ///
    /// Returns `false` (and logs) without a bound model, for an unknown index, or
    /// when the polygon references a vertex or normal the model does not have.
    pub fn set_polygon(&mut self, index: usize) -> bool {
        if !self.model_bound {
            log::error!("shader: set_polygon({index}) without a bound model");
            return false;
        }
        if index + 1 >= self.polygon_offsets.len() {
            log::error!("shader: polygon {index} out of range");
            return false;
        }
        if !self.init(index) {
            log::warn!("shader: polygon {index} references a missing vertex or normal");
            self.polygon = None;
            return false;
        }
        self.polygon = Some(index);
        true
    }

    fn polygon_vertices(&self, index: usize) -> &[usize] {
        &self.polygon_indices[self.polygon_offsets[index]..self.polygon_offsets[index + 1]]
    }

    // ============ Mode Operations ============

    /// Per-polygon setup. Returns `false` if an attribute the mode reads is
    /// missing for one of the polygon's vertices.
    fn init(&mut self, index: usize) -> bool {
        let needs_normals = !matches!(self.mode, ShadingMode::None | ShadingMode::Flat);
        let in_range = self.polygon_vertices(index).iter().all(|&v| {
            v < self.vertices.len() && (!needs_normals || v < self.vertex_normals.len())
        });
        if !in_range {
            return false;
        }

        match self.mode {
            ShadingMode::None | ShadingMode::Phong | ShadingMode::Toon => {}
            ShadingMode::Flat => {
                let corners = self.polygon_vertices(index);
                let sum = corners
                    .iter()
                    .filter_map(|&v| self.vertices.get(v))
                    .fold(Vec3::ZERO, |sum, &p| sum + p);
                let centroid = sum / corners.len().max(1) as f32;
                let normal = self.polygon_normals.get(index).copied().unwrap_or_default();
                self.polygon_intensity = self.lights.intensity(centroid, normal.normalize());
            }
            ShadingMode::Gouraud => {
                let start = self.polygon_offsets[index];
                let end = self.polygon_offsets[index + 1];
                for &v in &self.polygon_indices[start..end] {
                    let (Some(&point), Some(&normal)) =
                        (self.vertices.get(v), self.vertex_normals.get(v))
                    else {
                        return false;
                    };
                    let intensity = self.lights.intensity(point, normal.normalize());
                    if let Some(slot) = self.vertex_intensities.get_mut(v) {
                        *slot = intensity_pair(intensity);
                    }
                }
            }
        }
        true
    }

    /// Interpolate along both edges to the span ends, then set up `steps` steps
    /// across the span.
    pub fn prepare_scanline(&mut self, edges: &ScanlineEdges, steps: usize) {
        match self.mode {
            ShadingMode::None | ShadingMode::Flat => {}
            ShadingMode::Gouraud => {
                let start = edges.edge_value(&self.vertex_intensities, 0);
                let end = edges.edge_value(&self.vertex_intensities, 1);
                self.scan_intensity = Interpolated::across(start, end, steps);
            }
            ShadingMode::Phong | ShadingMode::Toon => {
                // Edge-stage normals stay unnormalized; shade normalizes once.
                let start = edges.edge_value(&self.vertex_normals, 0);
                let end = edges.edge_value(&self.vertex_normals, 1);
                self.scan_normal = Interpolated::across(start, end, steps);

                let start = edges.edge_value(&self.vertices, 0);
                let end = edges.edge_value(&self.vertices, 1);
                self.scan_position = Interpolated::across(start, end, steps);
            }
        }
    }

    /// Advance by `steps` pixels at once, for the part of a span left of the
    /// framebuffer.
    pub fn skip_on_scanline(&mut self, steps: usize) {
        match self.mode {
            ShadingMode::None | ShadingMode::Flat => {}
            ShadingMode::Gouraud => self.scan_intensity.advance(steps),
            ShadingMode::Phong | ShadingMode::Toon => {
                self.scan_normal.advance(steps);
                self.scan_position.advance(steps);
            }
        }
    }

    /// Advance to the next pixel of the span.
    #[inline]
    pub fn step_on_scanline(&mut self) {
        match self.mode {
            ShadingMode::None | ShadingMode::Flat => {}
            ShadingMode::Gouraud => self.scan_intensity.step(),
            ShadingMode::Phong | ShadingMode::Toon => {
                self.scan_normal.step();
                self.scan_position.step();
            }
        }
    }

    /// Write the lit color of the current fragment into `color.rgba_shaded`.
    #[inline]
    pub fn shade(&self, color: &mut ColorEntry) {
        color.rgba_shaded = match self.mode {
            ShadingMode::None => color.rgba,
            ShadingMode::Flat => self.polygon_intensity.apply(color.rgba),
            ShadingMode::Gouraud => {
                let pair = self.scan_intensity.value;
                lit_color(color.rgba, pair.x, pair.y)
            }
            ShadingMode::Phong => self.fragment_intensity().apply(color.rgba),
            ShadingMode::Toon => {
                let level = self.toon_level(self.fragment_intensity().total());
                lit_color(color.rgba, level, 0.0)
            }
        };
    }

    fn fragment_intensity(&self) -> Intensity {
        let normal = self.scan_normal.value.normalize();
        self.lights.intensity(self.scan_position.value, normal)
    }

    /// Quantize a total intensity to the middle of its band.
    fn toon_level(&self, total: f32) -> f32 {
        let range = self.lights.total();
        if range <= 0.0 {
            return 0.0;
        }
        let band = ((total / range).clamp(0.0, 1.0) * TOON_BANDS)
            .floor()
            .min(TOON_BANDS - 1.0);
        (band + 0.5) / TOON_BANDS * range
    }

    // ============ Inspection ============

    /// Current (ambient_diffuse, specular) pair on the gouraud scanline.
    pub fn scanline_intensity(&self) -> Vec2 {
        self.scan_intensity.value
    }

    /// Current interpolated (unnormalized) normal on the phong scanline.
    pub fn scanline_normal(&self) -> Vec3 {
        self.scan_normal.value
    }

    pub fn polygon(&self) -> Option<usize> {
        self.polygon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    fn lights() -> Lights {
        Lights {
            ambient: 0.2,
            point: 0.6,
            position: Vec3::new(0.0, 0.0, 100.0),
            ..Lights::default()
        }
    }

    struct Fixture {
        vertices: Vec<Vec3>,
        vertex_normals: Vec<Vec3>,
        polygon_normals: Vec<Vec3>,
        polygons: Vec<Vec<usize>>,
    }

    impl Fixture {
        /// Two vertices at the origin, one side-facing and one facing the light.
        fn two_normals() -> Self {
            Self {
                vertices: vec![Vec3::ZERO, Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0)],
                vertex_normals: vec![
                    Vec3::new(1.0, 0.0, 0.0),
                    Vec3::new(0.0, 0.0, 1.0),
                    Vec3::new(0.0, 0.0, 1.0),
                ],
                polygon_normals: vec![Vec3::new(0.0, 0.0, 1.0)],
                polygons: vec![vec![0, 1, 2]],
            }
        }

        fn view(&self) -> ModelView<'_> {
            ModelView {
                vertices: &self.vertices,
                vertex_normals: &self.vertex_normals,
                polygon_normals: &self.polygon_normals,
                polygons: &self.polygons,
            }
        }
    }

    /// Span from vertex 0 (start) to vertex 1 (end), both exactly on their edge.
    fn vertex_span() -> ScanlineEdges {
        ScanlineEdges {
            vertex_indices: [[0, 2], [1, 2]],
            weights: [[1.0, 0.0], [1.0, 0.0]],
        }
    }

    fn bound(mode: ShadingMode, fixture: &Fixture) -> Shader {
        let mut shader = Shader::new(mode, lights());
        shader.set_model(&fixture.view());
        assert!(shader.set_polygon(0));
        shader
    }

    // ============================================================
    // Mode selection
    // ============================================================

    #[test]
    fn modes_parse_by_name() {
        for mode in ShadingMode::ALL {
            assert_eq!(mode.name().parse::<ShadingMode>().ok(), Some(mode));
        }
        assert!(matches!(
            "cel".parse::<ShadingMode>(),
            Err(PipelineError::UnknownShadingMode(_))
        ));
    }

    #[test]
    fn only_none_ignores_the_light() {
        assert!(!ShadingMode::None.uses_light_location());
        assert!(ShadingMode::Toon.uses_light_location());
    }

    #[test]
    fn set_polygon_requires_a_model() {
        let mut shader = Shader::new(ShadingMode::Flat, lights());
        assert!(!shader.set_polygon(0));

        let fixture = Fixture::two_normals();
        shader.set_model(&fixture.view());
        assert!(!shader.set_polygon(1));
        assert!(shader.set_polygon(0));
    }

    #[test]
    fn polygon_with_missing_vertex_is_refused_in_every_mode() {
        let mut fixture = Fixture::two_normals();
        fixture.polygons.push(vec![0, 1, 9]);
        fixture.polygon_normals.push(Vec3::new(0.0, 0.0, 1.0));
        for mode in ShadingMode::ALL {
            let mut shader = Shader::new(mode, lights());
            shader.set_model(&fixture.view());
            assert!(!shader.set_polygon(1), "{mode}");
            assert_eq!(shader.polygon(), None);
            assert!(shader.set_polygon(0), "{mode}");
        }
    }

    #[test]
    fn gouraud_needs_vertex_normals_flat_does_not() {
        let mut fixture = Fixture::two_normals();
        fixture.vertex_normals.truncate(2);
        let mut shader = Shader::new(ShadingMode::Gouraud, lights());
        shader.set_model(&fixture.view());
        assert!(!shader.set_polygon(0));

        shader.set_mode(ShadingMode::Flat);
        assert!(shader.set_polygon(0));
    }

    // ============================================================
    // Shading
    // ============================================================

    #[test]
    fn none_copies_the_prelit_color() {
        let fixture = Fixture::two_normals();
        let shader = bound(ShadingMode::None, &fixture);
        let mut color = ColorEntry::new("red", [255, 0, 0, 255]);
        color.rgba = [1, 2, 3, 255];
        shader.shade(&mut color);
        assert_eq!(color.rgba_shaded, [1, 2, 3, 255]);
    }

    #[test]
    fn flat_is_uniform_over_the_polygon() {
        let fixture = Fixture::two_normals();
        let mut shader = bound(ShadingMode::Flat, &fixture);
        let mut color = ColorEntry::new("white", [200, 200, 200, 255]);

        shader.prepare_scanline(&vertex_span(), 4);
        shader.shade(&mut color);
        let first = color.rgba_shaded;
        shader.step_on_scanline();
        shader.shade(&mut color);
        assert_eq!(color.rgba_shaded, first);
        // Centroid sits almost straight below the light: 0.2 + 0.6 of 200.
        assert!((159..=160).contains(&first[0]));
    }

    #[test]
    fn gouraud_interpolates_with_constant_delta() {
        let fixture = Fixture::two_normals();
        let mut shader = bound(ShadingMode::Gouraud, &fixture);
        shader.prepare_scanline(&vertex_span(), 10);

        let mut previous = shader.scanline_intensity().x;
        assert_relative_eq!(previous, 0.2, epsilon = EPSILON);
        for _ in 0..10 {
            shader.step_on_scanline();
            let current = shader.scanline_intensity().x;
            assert_relative_eq!(current - previous, 0.06, epsilon = EPSILON);
            previous = current;
        }
        assert_relative_eq!(previous, 0.8, epsilon = EPSILON);
    }

    #[test]
    fn skipping_matches_stepping() {
        let fixture = Fixture::two_normals();
        let mut stepped = bound(ShadingMode::Gouraud, &fixture);
        stepped.prepare_scanline(&vertex_span(), 10);
        for _ in 0..4 {
            stepped.step_on_scanline();
        }
        let mut skipped = bound(ShadingMode::Gouraud, &fixture);
        skipped.prepare_scanline(&vertex_span(), 10);
        skipped.skip_on_scanline(4);
        assert_relative_eq!(
            skipped.scanline_intensity().x,
            stepped.scanline_intensity().x,
            epsilon = EPSILON
        );
        assert_relative_eq!(skipped.scanline_intensity().x, 0.44, epsilon = EPSILON);
    }

    #[test]
    fn gouraud_edge_weights_blend_vertices() {
        let fixture = Fixture::two_normals();
        let mut shader = bound(ShadingMode::Gouraud, &fixture);
        let edges = ScanlineEdges {
            vertex_indices: [[0, 1], [0, 1]],
            weights: [[0.5, 0.5], [0.5, 0.5]],
        };
        shader.prepare_scanline(&edges, 3);
        assert_relative_eq!(shader.scanline_intensity().x, 0.5, epsilon = EPSILON);
    }

    #[test]
    fn phong_normalizes_only_per_fragment() {
        let fixture = Fixture::two_normals();
        let mut shader = bound(ShadingMode::Phong, &fixture);
        let edges = ScanlineEdges {
            vertex_indices: [[0, 1], [0, 1]],
            weights: [[0.5, 0.5], [0.5, 0.5]],
        };
        shader.prepare_scanline(&edges, 1);
        // Edge-stage blend of two unit normals keeps its shorter length.
        assert_relative_eq!(
            shader.scanline_normal(),
            Vec3::new(0.5, 0.0, 0.5),
            epsilon = EPSILON
        );

        let mut color = ColorEntry::new("white", [255, 255, 255, 255]);
        shader.shade(&mut color);
        let expected = 0.2 + 0.6 * std::f32::consts::FRAC_1_SQRT_2;
        assert_eq!(color.rgba_shaded[0], (255.0 * expected) as u8);
    }

    #[test]
    fn toon_quantizes_into_bands() {
        let fixture = Fixture::two_normals();
        let mut shader = bound(ShadingMode::Toon, &fixture);
        shader.prepare_scanline(&vertex_span(), 10);
        let mut color = ColorEntry::new("white", [200, 200, 200, 255]);

        let mut levels = Vec::new();
        for _ in 0..=10 {
            shader.shade(&mut color);
            levels.push(color.rgba_shaded[0]);
            shader.step_on_scanline();
        }
        levels.dedup();
        assert!(levels.len() <= TOON_BANDS as usize);
        assert!(levels.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn light_update_is_partial() {
        let mut shader = Shader::new(ShadingMode::Flat, lights());
        shader.set_lights(&LightUpdate::new().ambient(0.5));
        assert_eq!(shader.lights().ambient, 0.5);
        assert_eq!(shader.lights().point, 0.6);
    }
}
