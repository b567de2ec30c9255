use thiserror::Error;

use crate::scene::RecordId;

/// Failures surfaced by [`SceneStore`](crate::scene::SceneStore) in strict mode.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("drift error of {shape} ({id}): {cause:#}")]
    Drift {
        shape: String,
        id: RecordId,
        cause: anyhow::Error,
    },

    #[error("unknown shape type {shape:?} on record {id}")]
    UnknownShape { shape: String, id: RecordId },
}

/// Failures surfaced by [`LayeredRenderer`](crate::render::LayeredRenderer).
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("{shape} draw failed ({id}): {cause:#}")]
    Draw {
        shape: String,
        id: RecordId,
        cause: anyhow::Error,
    },

    #[error("unknown shape type {shape:?} on record {id}")]
    UnknownShape { shape: String, id: RecordId },

    #[error("cannot allocate a {width}x{height} surface")]
    SurfaceAllocation { width: u32, height: u32 },

    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("image encoding failed: {0}")]
    Encode(String),
}
