//! Error types for data store operations

use std::error::Error;
use std::fmt;

/// Error type for data store operations
#[derive(Debug)]
pub enum StoreError {
    /// Store is misconfigured
    Configuration(String),

    /// Could not reach the data service
    Connection(String),

    /// The request did not complete in time
    Timeout(String),

    /// Credentials missing, invalid or expired
    Authentication(String),

    /// Signed in, but not allowed to touch this row or file
    Authorization(String),

    /// Row or file does not exist
    NotFound(String),

    /// Row already exists
    AlreadyExists(String),

    /// The data service rejected the request
    Query { status: u16, message: String },

    /// Serialization/deserialization error
    Serialization(String),

    /// Other error
    Other(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            StoreError::Connection(msg) => write!(f, "Connection error: {}", msg),
            StoreError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            StoreError::Authentication(msg) => write!(f, "Authentication error: {}", msg),
            StoreError::Authorization(msg) => write!(f, "Authorization error: {}", msg),
            StoreError::NotFound(msg) => write!(f, "Not found: {}", msg),
            StoreError::AlreadyExists(msg) => write!(f, "Already exists: {}", msg),
            StoreError::Query { status, message } => {
                write!(f, "Query failed ({}): {}", status, message)
            }
            StoreError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            StoreError::Other(msg) => write!(f, "Other error: {}", msg),
        }
    }
}

impl Error for StoreError {}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Other(err.to_string())
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            StoreError::Timeout(err.to_string())
        } else if err.is_connect() || err.is_request() {
            StoreError::Connection(err.to_string())
        } else if err.is_decode() {
            StoreError::Serialization(err.to_string())
        } else {
            StoreError::Other(err.to_string())
        }
    }
}

impl From<StoreError> for crate::RememberMeError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Connection(msg) => crate::RememberMeError::Connection(msg),
            StoreError::Timeout(msg) => crate::RememberMeError::Timeout(msg),
            StoreError::Authentication(msg) => crate::RememberMeError::Authentication(msg),
            StoreError::Configuration(msg) => crate::RememberMeError::Configuration(msg),
            StoreError::Query { status, message } => crate::RememberMeError::Api { status, message },
            other => crate::RememberMeError::Storage(other.to_string()),
        }
    }
}
