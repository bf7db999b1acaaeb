//! Error types for DhruvaFetch

use thiserror::Error;

use crate::command::ParseError;

/// DhruvaFetch error type
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Could not understand command: {0}")]
    Parse(#[from] ParseError),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Object not found: search area exhausted after {waypoints} waypoints")]
    ObjectNotFound { waypoints: usize },

    #[error("Object lost during approach and no waypoints left to search")]
    ObjectLost,

    #[error("Grasp failed after {attempts} attempts")]
    GraspFailed { attempts: u32 },

    #[error("Timeout during {step}")]
    Timeout { step: &'static str },

    #[error("Busy: a mission is already running")]
    Busy,

    #[error("Mission aborted")]
    Aborted,

    #[error("Device error during {step}: {source}")]
    Device {
        step: &'static str,
        #[source]
        source: hasta_io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    /// Controller bookkeeping broke (worker gone, mission without a report)
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for FetchError {
    fn from(e: toml::de::Error) -> Self {
        FetchError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
