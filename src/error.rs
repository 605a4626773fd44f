//! Error types for the banner renderer

use thiserror::Error;

/// Result type alias for renderer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while validating settings or producing a banner
#[derive(Error, Debug)]
pub enum Error {
    /// The settings snapshot cannot be rendered as given
    #[error("Invalid banner settings: {0}")]
    InvalidSettings(String),

    /// A color string could not be parsed
    #[error("Invalid color '{0}'")]
    InvalidColor(String),

    /// A font family could not be fetched or parsed
    #[error("Failed to load font: {0}")]
    FontLoadError(String),

    /// SVG icon markup could not be decoded
    #[error("Failed to decode icon: {0}")]
    IconDecodeError(String),

    /// Failed to allocate or encode the drawing surface
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// A resource wait exceeded its budget
    #[error("Operation timed out after {0}ms")]
    Timeout(u64),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

#[cfg(feature = "remote-fonts")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::NetworkError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}
