use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the model loading path.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file has no extension: {0:?}")]
    MissingExtension(PathBuf),

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to read glTF: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("primitive has no position data")]
    MissingPositions,

    #[error("model contains no triangle geometry")]
    NoGeometry,
}
