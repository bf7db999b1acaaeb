//! Error types for HastaIO

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// HastaIO error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Device used before `initialize`
    #[error("Device not initialized: {0}")]
    NotInitialized(&'static str),

    /// Communication timeout
    #[error("Communication timeout")]
    Timeout,

    /// Device could not be acquired or stopped responding
    #[error("Device unavailable: {0}")]
    Unavailable(String),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Unknown device type in configuration
    #[error("Unknown device type: {0}")]
    UnknownDevice(String),
}
