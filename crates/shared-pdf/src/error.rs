//! Error types for document rendering and recognition

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Render failure: {0}")]
    RenderFailure(String),

    #[error("Recognition failure: {0}")]
    RecognitionFailure(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
