//! Error types for the relay.
//!
//! Uses `thiserror` for ergonomic error definitions with automatic `From` conversions.

use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// Main error type for the relay server.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Wire-protocol errors at the transport boundary.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid request: {0}")]
    Parse(String),

    #[error("transport error: {0}")]
    Transport(Cow<'static, str>),
}

/// Adapter-boundary errors.
///
/// Every adapter operation reports failure through one of these variants;
/// nothing else crosses the adapter/handler boundary.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The driver refused or could not open a connection.
    #[error("{0}")]
    ConnectionFailed(DriverError),

    /// The driver rejected the query.
    #[error("{0}")]
    QueryFailed(DriverError),

    /// The requested database family matches none of the known adapters.
    #[error("Unknown database type [{0}]")]
    UnrecognizedType(String),

    /// The connection string is not addressed to this driver family.
    ///
    /// Control-flow signal for the caller; a downstream connect attempt
    /// surfaces the user-facing failure.
    #[error("connection string is not addressed to the '{0}' driver")]
    NotApplicable(&'static str),

    /// The connection string could not be parsed at all. Non-fatal: a
    /// downstream connect failure supersedes it.
    #[error("malformed connection string: {0}")]
    Malformed(Cow<'static, str>),
}

/// Raw failure reported by a wire driver.
///
/// Codes are kept as strings because several backends report
/// SQLSTATE-style alphanumeric codes rather than integers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DriverError {
    pub code: String,
    pub message: String,
}

impl DriverError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// A failure without a usable driver code.
    pub fn bare(message: impl Into<String>) -> Self {
        Self::new("", message)
    }

    fn has_code(&self) -> bool {
        !self.code.is_empty() && self.code != "0"
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_code() {
            write!(f, "[{}] {}", self.code, self.message)
        } else {
            f.write_str(&self.message)
        }
    }
}

impl std::error::Error for DriverError {}

/// Result type alias for RelayError.
pub type Result<T> = std::result::Result<T, RelayError>;

/// Result type alias for AdapterError.
pub type AdapterResult<T> = std::result::Result<T, AdapterError>;

/// Result type alias for DriverError.
pub type DriverResult<T> = std::result::Result<T, DriverError>;
