use thiserror::Error;

/// Top-level error type for Usher.
#[derive(Debug, Error)]
pub enum UsherError {
    /// Error from the text-generation collaborator.
    #[error("generation error: {0}")]
    Generation(String),

    /// Error from the outbound messaging transport.
    #[error("transport error: {0}")]
    Transport(String),

    /// Error from the business directory.
    #[error("directory error: {0}")]
    Directory(String),

    /// Session store error.
    #[error("session error: {0}")]
    Session(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
