//! Error types for the ledger

use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed input to a ledger operation (empty participant list,
    /// non-positive amount, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Group does not exist in the repository
    #[error("Group not found: {0}")]
    GroupNotFound(String),

    /// Group secret did not verify
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Repository backend failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}
