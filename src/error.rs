//! Error types for the Easel Core Engine

use thiserror::Error;

/// Engine error type
#[derive(Error, Debug)]
pub enum EngineError {
    /// Surface dimension exceeds maximum allowed size
    #[error("Surface size {0}x{1} exceeds maximum allowed {2}x{2}")]
    SurfaceTooLarge(u32, u32, u32),

    /// Invalid surface dimensions
    #[error("Invalid surface dimensions: {0}x{1}")]
    InvalidSurfaceSize(u32, u32),

    /// Layer not found
    #[error("Layer not found: {0}")]
    LayerNotFound(uuid::Uuid),

    /// Layer index out of bounds
    #[error("Layer index {0} out of bounds (max: {1})")]
    LayerIndexOutOfBounds(usize, usize),

    /// Image decoding failed
    #[error("Image load failed: {0}")]
    ImageLoad(#[from] image::ImageError),

    /// File I/O error
    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::SerializationError(err.to_string())
    }
}
