//! Error types for environment loading

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Failed to decode environment image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Environment image is empty ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("Loader thread went away before delivering a result")]
    Disconnected,
}

impl From<reqwest::Error> for LoadError {
    fn from(e: reqwest::Error) -> Self {
        LoadError::Http(e.to_string())
    }
}
