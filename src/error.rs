//! Error types for the debate engine

use thiserror::Error;

/// Result type alias for debate engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the debate engine
#[derive(Debug, Error)]
pub enum Error {
    /// The generation service answered with a non-success status or was unreachable
    #[error("Generation service error: {0}")]
    Service(String),

    /// A generation call exceeded its deadline
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Persona not found
    #[error("Persona not found: {0}")]
    NotFound(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generation service error
    pub fn service(msg: impl Into<String>) -> Self {
        Self::Service(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a not-found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an other error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Whether this error came from the generation service (unreachable, non-2xx or timeout).
    ///
    /// These are always collapsed into fallback values by the orchestrator and
    /// the enhancer instead of being surfaced to callers.
    pub fn is_service_failure(&self) -> bool {
        matches!(self, Self::Service(_) | Self::Timeout(_) | Self::Http(_))
    }
}

impl From<sled::Error> for Error {
    fn from(err: sled::Error) -> Self {
        Self::storage(err.to_string())
    }
}
