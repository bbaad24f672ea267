//! Error type for the rendering engine.

use thiserror::Error;

use crate::object::MaterialId;

/// Errors returned by [`crate::Raytracer`] and its configuration.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid render configuration: {0}")]
    InvalidConfig(String),

    #[error("Frame buffer has {actual} cells, expected {expected} (width x height)")]
    BufferSize { expected: usize, actual: usize },

    #[error("Object references unknown material {0:?}")]
    UnknownMaterial(MaterialId),

    #[error("View matrix is not invertible")]
    SingularViewMatrix,

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Render worker panicked: {0}")]
    WorkerPanicked(String),

    #[error("Non-finite radiance sampled at pixel ({x}, {y})")]
    NonFiniteSample { x: u32, y: u32 },
}

pub type Result<T> = std::result::Result<T, RenderError>;
