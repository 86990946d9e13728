use thiserror::Error;

/// Main error type for the caption plugin
#[derive(Error, Debug)]
pub enum CaptionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Invalid segment URL: {0}")]
    InvalidUrl(String),

    #[error("HLS controller error: {0}")]
    Controller(String),

    #[error("Subtitle rendition not found: {0}")]
    RenditionNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for CaptionError {
    fn from(err: reqwest::Error) -> Self {
        CaptionError::Http(err.to_string())
    }
}

impl From<url::ParseError> for CaptionError {
    fn from(err: url::ParseError) -> Self {
        CaptionError::InvalidUrl(err.to_string())
    }
}

impl From<toml::de::Error> for CaptionError {
    fn from(err: toml::de::Error) -> Self {
        CaptionError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for CaptionError {
    fn from(err: toml::ser::Error) -> Self {
        CaptionError::Config(err.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, CaptionError>;
