//! Library error type.

use std::path::PathBuf;

use thiserror::Error;

/// Library error type for slideshow operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The scan root does not exist.
    #[error("invalid image directory: {}", .0.display())]
    BadRoot(PathBuf),

    /// The scan completed but found no images.
    #[error("no images found in {}", root.display())]
    EmptyCatalog { root: PathBuf },

    /// A selection index fell outside the catalog bounds.
    #[error("image index {index} out of range for catalog of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// History ring capacity must be at least one slot.
    #[error("history capacity must be at least 1 (got {0})")]
    InvalidCapacity(usize),

    /// History navigation before any image was shown.
    #[error("no image has been shown yet")]
    NoCurrentImage,

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML/serde configuration error.
    #[error(transparent)]
    Config(#[from] serde_yaml::Error),
}
