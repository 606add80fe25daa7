//! Error types for icon rendering and endpoint probing

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for crate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while rendering, saving, or fetching icons
#[derive(Error, Debug)]
pub enum Error {
    /// The imaging backend failed to encode or decode an image
    #[error("Imaging failed: {0}")]
    Imaging(String),

    /// The raster cannot be represented in the target container
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// Canvas width or height was zero
    #[error("Invalid canvas dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Palette size outside 1..=256
    #[error("Invalid palette size {0} (expected 1..=256)")]
    InvalidPalette(usize),

    /// Failed to write an encoded icon
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A single endpoint attempt failed
    #[error("Network error: {0}")]
    Network(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Imaging(err.to_string())
    }
}

impl From<gif::EncodingError> for Error {
    fn from(err: gif::EncodingError) -> Self {
        Error::Imaging(err.to_string())
    }
}

#[cfg(feature = "probe")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err.to_string())
    }
}
