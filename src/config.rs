//! Render settings.
//!
//! [`RenderSettings`] gathers every tunable of a [`Scene`](crate::scene::Scene):
//! canvas, projection and shading, the debug toggles and the overlay parameters.
//! Build one with [`Default`] and the fluent setters:
//!
//! ```ignore
//! let mut settings = RenderSettings::new(800, 600);
//! settings
//!     .projection(ProjectionType::Perspective)
//!     .shading(ShadingMode::Phong)
//!     .show_edges(true);
//! ```

use crate::colors::{Rgba, BLACK, WHITE};
use crate::mesh::InitOptions;
use crate::projection::ProjectionType;
use crate::render::framebuffer::{DepthView, DEFAULT_Z_EPSILON};
use crate::render::shader::ShadingMode;

pub const DEFAULT_WIDTH: usize = 800;
pub const DEFAULT_HEIGHT: usize = 600;

/// Debug and rendering switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toggles {
    /// Fill polygons; outlines only when off.
    pub fill: bool,
    pub show_normals: bool,
    /// Outline filled polygons in the line color.
    pub show_edges: bool,
    /// Present the depth buffer instead of the colors.
    pub show_z_buffer: bool,
    pub backface_culling: bool,
    pub texturing: bool,
    pub show_grid: bool,
}

impl Default for Toggles {
    fn default() -> Self {
        Self {
            fill: true,
            show_normals: false,
            show_edges: false,
            show_z_buffer: false,
            backface_culling: false,
            texturing: true,
            show_grid: false,
        }
    }
}

/// Grid overlay in the `z = 0` plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSettings {
    /// Half extent along x and y.
    pub range: f32,
    pub step: f32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            range: 500.0,
            step: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub width: usize,
    pub height: usize,
    pub background: Rgba,
    pub projection: ProjectionType,
    pub shading: ShadingMode,
    pub toggles: Toggles,
    pub depth_view: DepthView,
    /// Applied to meshes built for this scene.
    pub init: InitOptions,
    pub normal_length: f32,
    pub grid: GridSettings,
    pub line_color: Rgba,
    pub z_epsilon: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            background: WHITE,
            projection: ProjectionType::default(),
            shading: ShadingMode::default(),
            toggles: Toggles::default(),
            depth_view: DepthView::default(),
            init: InitOptions::default(),
            normal_length: 50.0,
            grid: GridSettings::default(),
            line_color: BLACK,
            z_epsilon: DEFAULT_Z_EPSILON,
        }
    }
}

impl RenderSettings {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn background(&mut self, rgba: Rgba) -> &mut Self {
        self.background = rgba;
        self
    }

    pub fn projection(&mut self, projection: ProjectionType) -> &mut Self {
        self.projection = projection;
        self
    }

    pub fn shading(&mut self, shading: ShadingMode) -> &mut Self {
        self.shading = shading;
        self
    }

    pub fn fill(&mut self, on: bool) -> &mut Self {
        self.toggles.fill = on;
        self
    }

    pub fn show_normals(&mut self, on: bool) -> &mut Self {
        self.toggles.show_normals = on;
        self
    }

    pub fn show_edges(&mut self, on: bool) -> &mut Self {
        self.toggles.show_edges = on;
        self
    }

    pub fn show_z_buffer(&mut self, on: bool, view: DepthView) -> &mut Self {
        self.toggles.show_z_buffer = on;
        self.depth_view = view;
        self
    }

    pub fn backface_culling(&mut self, on: bool) -> &mut Self {
        self.toggles.backface_culling = on;
        self
    }

    pub fn texturing(&mut self, on: bool) -> &mut Self {
        self.toggles.texturing = on;
        self
    }

    pub fn show_grid(&mut self, on: bool) -> &mut Self {
        self.toggles.show_grid = on;
        self
    }

    pub fn init_options(&mut self, init: InitOptions) -> &mut Self {
        self.init = init;
        self
    }

    pub fn normal_length(&mut self, length: f32) -> &mut Self {
        self.normal_length = length;
        self
    }

    pub fn grid(&mut self, range: f32, step: f32) -> &mut Self {
        self.grid = GridSettings { range, step };
        self
    }

    pub fn line_color(&mut self, rgba: Rgba) -> &mut Self {
        self.line_color = rgba;
        self
    }

    pub fn z_epsilon(&mut self, epsilon: f32) -> &mut Self {
        self.z_epsilon = epsilon;
        self
    }
}
