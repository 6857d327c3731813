//! Error types.

use thiserror::Error;

/// Errors raised by the pipeline and scene API.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid canvas size {width}x{height}")]
    InvalidCanvas { width: usize, height: usize },

    #[error("Unknown projection type: {0}")]
    UnknownProjection(String),

    #[error("Unknown shading mode: {0}")]
    UnknownShadingMode(String),

    #[error("Unknown node: {0}")]
    UnknownNode(String),

    #[error("Node name already in use: {0}")]
    DuplicateNode(String),

    #[error("Model '{0}' is not ready")]
    NotReady(String),

    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Errors raised while loading meshes and textures.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("OBJ error: {0}")]
    Obj(#[from] tobj::LoadError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Mesh '{0}' has no geometry")]
    EmptyMesh(String),

    #[error("Unknown built-in model: {0}")]
    UnknownModel(String),

    #[error("Texture '{name}' is {width}x{height} but has {pixels} pixels")]
    InvalidTexture {
        name: String,
        width: u32,
        height: u32,
        pixels: usize,
    },

    #[error("Unknown procedural texture: {0}")]
    UnknownTexture(String),
}
