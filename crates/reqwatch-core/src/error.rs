//! Shared error type across reqwatch crates.

use thiserror::Error;

/// Which side of the HTTP boundary an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad input from the caller (400).
    Client,
    /// Fault inside the service (500).
    Server,
}

impl ErrorClass {
    /// HTTP status code used when the error is written to a response.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorClass::Client => 400,
            ErrorClass::Server => 500,
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ReqwatchError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum ReqwatchError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("duplicate metrics collector registration attempted: {0}")]
    AlreadyRegistered(String),
    #[error("invalid metric: {0}")]
    InvalidMetric(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl ReqwatchError {
    /// Map the error to the status class reported to HTTP callers.
    pub fn status_class(&self) -> ErrorClass {
        match self {
            ReqwatchError::BadRequest(_) => ErrorClass::Client,
            ReqwatchError::AlreadyRegistered(_)
            | ReqwatchError::InvalidMetric(_)
            | ReqwatchError::Internal(_) => ErrorClass::Server,
        }
    }
}
