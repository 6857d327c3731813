//! A CPU-side 3D rendering pipeline.
//!
//! Meshes are arranged in a hierarchical scene graph, taken through model,
//! world, projection and viewport space, and shaded into a color and depth
//! buffer pair. Only the region touched since the last frame is cleared and
//! presented. All rendering is done on the CPU, on a single thread; loading is
//! the only work done in the background.
//!
//! # Quick Start
//!
//! ```ignore
//! use softpipe::prelude::*;
//!
//! let mut scene = Scene::init_pipeline(RenderSettings::new(800, 600))?;
//! let cube = scene.create_node_with_builtin("cube", "cube", 100.0, None, None)?;
//! scene.rotate(cube, Vec3::new(0.5, 0.5, 0.0), TransformOp::Set);
//!
//! let mut surface = ImageSurface::new(800, 600);
//! scene.render_frame(&mut ScanlineRasterizer::new(), &mut surface);
//! surface.save("cube.png")?;
//! ```

// Public API - exposed to library consumers
pub mod animation;
pub mod colors;
pub mod config;
pub mod error;
pub mod frame_loop;
pub mod library;
pub mod light;
pub mod loader;
pub mod math;
pub mod mesh;
pub mod model;
pub mod primitives;
pub mod projection;
pub mod render;
pub mod scene;
pub mod texture;
pub mod transform;

// Re-export commonly needed types at crate root for convenience
pub use error::{LoadError, PipelineError};
pub use mesh::{InitOptions, Mesh, MeshBuilder};
pub use model::Model;
pub use projection::{Projection, ProjectionType};
pub use render::ShadingMode;
pub use scene::{NodeId, Scene, SceneGraph};
pub use transform::{Transform, TransformKind, TransformOp};

/// Prelude module for convenient imports.
///
/// # Example
/// ```ignore
/// use softpipe::prelude::*;
/// ```
pub mod prelude {
    // Scene
    pub use crate::config::{RenderSettings, Toggles, DEFAULT_HEIGHT, DEFAULT_WIDTH};
    pub use crate::library::MeshLibrary;
    pub use crate::model::Model;
    pub use crate::scene::{FrameStats, NodeId, Scene, SceneGraph};

    // Frame driving
    pub use crate::animation::{Animation, Animator};
    pub use crate::frame_loop::{FrameLimiter, FrameLoop, FPS};
    pub use crate::loader::AssetLoader;

    // Errors
    pub use crate::error::{LoadError, PipelineError};

    // Projection, shading, lights
    pub use crate::light::{LightUpdate, Lights};
    pub use crate::projection::ProjectionType;
    pub use crate::render::{DepthView, ShadingMode};

    // Transform
    pub use crate::transform::{TransformKind, TransformOp};

    // Math
    pub use crate::math::{Mat4, Vec2, Vec3, Vec4};

    // Rendering
    pub use crate::render::{ImageSurface, PresentSurface, Rasterizer, ScanlineRasterizer};
}

/// Module exposing internals for benchmarking. Not part of the stable API.
pub mod bench {
    pub use crate::render::{
        FrameBuffer, ModelView, PolygonFill, Rasterizer, ScanlineRasterizer, Shader,
    };
}
