//! Error types for brain operations.

use thiserror::Error;

/// Errors that can occur while a brain generates text.
#[derive(Debug, Error)]
pub enum BrainError {
    /// The brain is missing or has invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The backend could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered but the request could not be completed.
    #[error("processing failed: {0}")]
    ProcessingFailed(String),

    /// The brain is temporarily unavailable.
    #[error("brain unavailable: {0}")]
    Unavailable(String),

    /// The brain has been shut down.
    #[error("brain shut down")]
    ShutDown,

    /// A timeout occurred during processing.
    #[error("processing timed out")]
    Timeout,
}
