//! Rasterization back end: buffers, shading and presentation.

pub mod framebuffer;
pub mod rasterizer;
pub mod shader;
pub mod surface;

pub use framebuffer::{DepthView, FrameBuffer, Rect, DEFAULT_Z_EPSILON, DEPTH_SENTINEL};
pub use rasterizer::{
    PolygonFill, Rasterizer, ScanlineRasterizer, TextureMapping, LINE_DEPTH_BIAS,
};
pub use shader::{ModelView, ScanlineEdges, Shader, ShadingMode};
pub use surface::{ImageSurface, PresentSurface};
