//! Error types for the platform client.

use std::fmt;

use thiserror::Error;

/// The remote call an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListMonitors,
    FetchMonitor,
    ConvertToCode,
    TagMonitor,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Operation::ListMonitors => "list monitors",
            Operation::FetchMonitor => "fetch monitor",
            Operation::ConvertToCode => "convert monitor to code",
            Operation::TagMonitor => "tag monitor",
        };
        f.write_str(label)
    }
}

/// Errors returned by [`MonitorApi`](crate::MonitorApi) calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The platform answered with something other than 200.
    #[error("{operation} failed with status {status}")]
    Status { operation: Operation, status: u16 },

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// The client could not be built from the given settings.
    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_connect() {
            ApiError::Connection(err.to_string())
        } else if err.is_decode() {
            ApiError::Parse(err.to_string())
        } else {
            ApiError::Http(err.to_string())
        }
    }
}
