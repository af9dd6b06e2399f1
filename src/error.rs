//! Error types for emblem-burst

use thiserror::Error;

/// Everything that can stop the program before or outside the render loop
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// SDL reports its failures as plain strings
    #[error("Display error: {0}")]
    Display(String),
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Self::Display(msg)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
