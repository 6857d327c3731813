//! Owning color and depth buffers with dirty-rectangle tracking.
//!
//! Pixels are stored as RGBA bytes, row-major with the origin in the top-left
//! corner. The depth buffer stores eye-space z: the camera looks down -z, so
//! larger values are closer to the viewer and [`DEPTH_SENTINEL`] marks a pixel
//! nothing has been written to since the last [`FrameBuffer::reset`].
//!
//! Only the region touched since the last reset is cleared and presented. The
//! background row is precomputed once and copied in bulk per dirty row.

use super::surface::PresentSurface;
use crate::colors::{ColorEntry, Rgba};
use crate::error::PipelineError;

/// Depth of a pixel that has not been written this frame.
pub const DEPTH_SENTINEL: f32 = -10_000.0;

/// Default tolerance for z-buffer fights.
pub const DEFAULT_Z_EPSILON: f32 = 0.01;

/// Pixel rectangle with inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

impl Rect {
    pub fn new(x_min: i32, y_min: i32, x_max: i32, y_max: i32) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// The whole `width` x `height` area.
    pub fn full(width: usize, height: usize) -> Self {
        Self::new(0, 0, width as i32 - 1, height as i32 - 1)
    }

    /// Sentinel with min past the far edge and max before the near edge, so the
    /// first [`Rect::include`] snaps both corners to the point.
    pub fn empty(width: usize, height: usize) -> Self {
        Self::new(width as i32, height as i32, -1, -1)
    }

    pub fn is_empty(&self) -> bool {
        self.x_max < self.x_min || self.y_max < self.y_min
    }

    /// Number of columns, 0 when empty.
    pub fn width(&self) -> usize {
        (self.x_max - self.x_min + 1).max(0) as usize
    }

    /// Number of rows, 0 when empty.
    pub fn height(&self) -> usize {
        (self.y_max - self.y_min + 1).max(0) as usize
    }

    /// Grow to contain `(x, y)`. Each axis is updated independently.
    pub fn include(&mut self, x: i32, y: i32) {
        self.x_min = self.x_min.min(x);
        self.x_max = self.x_max.max(x);
        self.y_min = self.y_min.min(y);
        self.y_max = self.y_max.max(y);
    }
}

/// How the z-buffer debug view turns depth into color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepthView {
    /// Replace color by a grey level, near is dark.
    #[default]
    Greyscale,
    /// Multiply color by the far-ness of the pixel.
    Darken,
}

#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
    depth: Vec<f32>,
    background_row: Vec<u8>,
    sentinel_row: Vec<f32>,
    dirty: Rect,
    z_epsilon: f32,
}

impl FrameBuffer {
    /// Create a buffer filled with `background` (alpha forced opaque).
    ///
    /// The dirty rectangle starts as the whole buffer so the first reset clears
    /// everything.
    pub fn new(width: usize, height: usize, background: Rgba) -> Result<Self, PipelineError> {
        if width == 0 || height == 0 {
            return Err(PipelineError::InvalidCanvas { width, height });
        }
        let background = [background[0], background[1], background[2], 255];
        let background_row: Vec<u8> = background.repeat(width);
        let sentinel_row = vec![DEPTH_SENTINEL; width];

        Ok(Self {
            width,
            height,
            pixels: background_row.repeat(height),
            depth: vec![DEPTH_SENTINEL; width * height],
            background_row,
            sentinel_row,
            dirty: Rect::full(width, height),
            z_epsilon: DEFAULT_Z_EPSILON,
        })
    }

    pub fn with_z_epsilon(mut self, epsilon: f32) -> Self {
        self.z_epsilon = epsilon;
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn z_epsilon(&self) -> f32 {
        self.z_epsilon
    }

    /// Region touched since the last reset.
    pub fn dirty_rect(&self) -> Rect {
        self.dirty
    }

    /// Raw RGBA bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = (y * self.width + x) * 4;
        let mut rgba = [0; 4];
        rgba.copy_from_slice(&self.pixels[index..index + 4]);
        Some(rgba)
    }

    pub fn depth(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.depth[y * self.width + x])
    }

    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Restore background and sentinel depth inside the dirty rectangle.
    ///
    /// Returns the cleared rectangle for the presentation surface, or `None` if
    /// nothing was drawn since the last reset.
    pub fn reset(&mut self) -> Option<Rect> {
        let dirty = std::mem::replace(&mut self.dirty, Rect::empty(self.width, self.height));
        if dirty.is_empty() {
            return None;
        }

        let x0 = dirty.x_min as usize;
        let columns = dirty.width();
        for y in dirty.y_min as usize..=dirty.y_max as usize {
            let row = y * self.width;
            self.depth[row + x0..row + x0 + columns].copy_from_slice(&self.sentinel_row[..columns]);
            let start = (row + x0) * 4;
            self.pixels[start..start + columns * 4]
                .copy_from_slice(&self.background_row[..columns * 4]);
        }
        Some(dirty)
    }

    /// Whether a fragment at depth `z` would be visible at `(x, y)`.
    ///
    /// Passes when nothing was written there this frame, or when `z` is nearer than
    /// the stored depth by more than the epsilon. Near-ties keep the first writer.
    /// Does not write.
    #[inline]
    pub fn z_test(&self, x: i32, y: i32, z: f32) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let stored = self.depth[y as usize * self.width + x as usize];
        stored == DEPTH_SENTINEL || z > stored + self.z_epsilon
    }

    /// Write the shaded color of `color` and depth `z` at `(x, y)`.
    ///
    /// Out-of-range coordinates are ignored. The z-test may be skipped when the
    /// caller already ran it, and the dirty update when the caller tracks it.
    #[inline]
    pub fn set(
        &mut self,
        x: i32,
        y: i32,
        z: f32,
        color: &ColorEntry,
        do_z_test: bool,
        adjust_dirty: bool,
    ) {
        if !self.in_bounds(x, y) {
            return;
        }
        if do_z_test && !self.z_test(x, y, z) {
            return;
        }
        if adjust_dirty {
            self.dirty.include(x, y);
        }
        let index = y as usize * self.width + x as usize;
        self.depth[index] = z;
        self.pixels[index * 4..index * 4 + 4].copy_from_slice(&color.rgba_shaded);
    }

    /// Hand the dirty region to `surface`. Nothing happens if it is empty.
    ///
    /// With `depth_view` set, a depth-visualized copy is presented instead; the
    /// buffers themselves are left untouched.
    pub fn display(&self, surface: &mut dyn PresentSurface, depth_view: Option<DepthView>) {
        if self.dirty.is_empty() {
            return;
        }
        match depth_view {
            None => surface.present(&self.pixels, self.width, self.dirty),
            Some(view) => {
                let pixels = self.depth_visualization(view);
                surface.present(&pixels, self.width, self.dirty);
            }
        }
    }

    /// Copy of the pixels with written depths min-max normalized into color.
    pub fn depth_visualization(&self, view: DepthView) -> Vec<u8> {
        let mut pixels = self.pixels.clone();
        let written = || self.depth.iter().copied().filter(|&z| z != DEPTH_SENTINEL);
        let (min, max) = written().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), z| {
            (lo.min(z), hi.max(z))
        });
        if min > max {
            return pixels;
        }
        let range = if max - min == 0.0 { 1.0 } else { max - min };

        for (z, rgba) in self.depth.iter().zip(pixels.chunks_exact_mut(4)) {
            if *z == DEPTH_SENTINEL {
                continue;
            }
            let farness = 1.0 - (z - min) / range;
            match view {
                DepthView::Greyscale => {
                    let grey = (farness * 255.0).round() as u8;
                    rgba[..3].fill(grey);
                }
                DepthView::Darken => {
                    for channel in &mut rgba[..3] {
                        *channel = (*channel as f32 * farness).round() as u8;
                    }
                }
            }
        }
        pixels
    }
}
