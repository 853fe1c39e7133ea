use thiserror::Error;

#[derive(Debug, Error)]
pub enum SkynetError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid message context: {0}")]
    InvalidContext(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SkynetError {
    /// Short error code string, stable across releases.
    pub fn code(&self) -> &'static str {
        match self {
            SkynetError::Config(_) => "CONFIG_ERROR",
            SkynetError::InvalidContext(_) => "INVALID_CONTEXT",
            SkynetError::Serialization(_) => "SERIALIZATION_ERROR",
            SkynetError::Io(_) => "IO_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, SkynetError>;
