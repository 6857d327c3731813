//! Presentation surfaces the framebuffer flips its dirty region onto.

use std::path::Path;

use image::{Rgba as Pixel, RgbaImage};

use super::framebuffer::Rect;

/// Something that can show framebuffer pixels: a window, a canvas, an image.
pub trait PresentSurface {
    /// Clear `rect` before the frame that will redraw it.
    fn clear(&mut self, rect: Rect);

    /// Copy `rect` out of `pixels`, a row-major RGBA buffer `width` pixels wide.
    fn present(&mut self, pixels: &[u8], width: usize, rect: Rect);
}

/// Surface backed by an in-memory RGBA image.
#[derive(Debug, Clone)]
pub struct ImageSurface {
    image: RgbaImage,
    presented_frames: usize,
}

impl ImageSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
            presented_frames: 0,
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Number of non-empty presents so far.
    pub fn presented_frames(&self) -> usize {
        self.presented_frames
    }

    pub fn save(&self, path: impl AsRef<Path>) -> image::ImageResult<()> {
        self.image.save(path)
    }

    /// `rect` limited to the image, as `u32` ranges.
    fn clip(&self, rect: Rect) -> Option<(std::ops::RangeInclusive<u32>, std::ops::RangeInclusive<u32>)> {
        if rect.is_empty() || rect.x_max < 0 || rect.y_max < 0 {
            return None;
        }
        let x_max = (rect.x_max as u32).min(self.image.width().checked_sub(1)?);
        let y_max = (rect.y_max as u32).min(self.image.height().checked_sub(1)?);
        let x_min = rect.x_min.max(0) as u32;
        let y_min = rect.y_min.max(0) as u32;
        if x_min > x_max || y_min > y_max {
            return None;
        }
        Some((x_min..=x_max, y_min..=y_max))
    }
}

impl PresentSurface for ImageSurface {
    fn clear(&mut self, rect: Rect) {
        let Some((xs, ys)) = self.clip(rect) else {
            return;
        };
        for y in ys {
            for x in xs.clone() {
                self.image.put_pixel(x, y, Pixel([0, 0, 0, 0]));
            }
        }
    }

    fn present(&mut self, pixels: &[u8], width: usize, rect: Rect) {
        let Some((xs, ys)) = self.clip(rect) else {
            return;
        };
        for y in ys {
            for x in xs.clone() {
                let index = (y as usize * width + x as usize) * 4;
                if let Some(rgba) = pixels.get(index..index + 4) {
                    self.image
                        .put_pixel(x, y, Pixel([rgba[0], rgba[1], rgba[2], rgba[3]]));
                }
            }
        }
        self.presented_frames += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn present_copies_only_the_rect() {
        let mut surface = ImageSurface::new(3, 2);
        let pixels = [200u8; 3 * 2 * 4];
        surface.present(&pixels, 3, Rect::new(1, 0, 2, 0));

        assert_eq!(surface.image().get_pixel(0, 0), &Pixel([0, 0, 0, 0]));
        assert_eq!(surface.image().get_pixel(2, 0), &Pixel([200, 200, 200, 200]));
        assert_eq!(surface.image().get_pixel(1, 1), &Pixel([0, 0, 0, 0]));
        assert_eq!(surface.presented_frames(), 1);
    }

    #[test]
    fn clear_is_clipped_to_the_image() {
        let mut surface = ImageSurface::new(2, 2);
        surface.present(&[9u8; 16], 2, Rect::new(0, 0, 1, 1));
        surface.clear(Rect::new(1, 1, 10, 10));
        assert_eq!(surface.image().get_pixel(0, 0), &Pixel([9, 9, 9, 9]));
        assert_eq!(surface.image().get_pixel(1, 1), &Pixel([0, 0, 0, 0]));
    }

    #[test]
    fn empty_rect_presents_nothing() {
        let mut surface = ImageSurface::new(2, 2);
        surface.present(&[9u8; 16], 2, Rect::empty(2, 2));
        assert_eq!(surface.presented_frames(), 0);
    }
}
