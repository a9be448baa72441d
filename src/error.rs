//! Error types

use thiserror::Error;

/// Errors that can occur while fetching and rendering connections
#[derive(Debug, Error)]
pub enum FahrplanError {
    /// The API host could not be reached
    #[error("Could not reach network: {0}")]
    Network(String),

    /// The request did not complete in time
    #[error("Request timed out after {timeout_secs} seconds")]
    Timeout {
        /// The configured timeout in seconds
        timeout_secs: u64,
    },

    /// The API answered with a non-success status
    #[error("Request failed: HTTP {status}{}", detail(.message))]
    RequestFailed {
        /// HTTP status code
        status: u16,
        /// Error text from the API body, when it sent one
        message: Option<String>,
    },

    /// The response body is not the JSON document we expect
    #[error("Invalid API response ({0})")]
    InvalidResponse(String),

    /// A single connection record could not be decoded
    #[error("Invalid connection #{index}: {source}")]
    InvalidConnection {
        /// 1-based position in the result list
        index: usize,
        /// Underlying decoding error, names the offending field
        #[source]
        source: serde_json::Error,
    },

    /// A connection record decoded but lacks data needed for display
    #[error("Invalid connection #{index}: {field} is missing")]
    MissingField {
        /// 1-based position in the result list
        index: usize,
        /// Name of the field
        field: &'static str,
    },

    /// A timestamp could not be parsed
    #[error("Invalid connection #{index}: bad timestamp in {field}: {value:?}")]
    InvalidTimestamp {
        /// 1-based position in the result list
        index: usize,
        /// Name of the field
        field: &'static str,
        /// Raw value as received
        value: String,
    },

    /// A capacity code outside the documented range
    #[error("Invalid connection #{index}: unknown occupancy code {code:?} in {field}")]
    UnknownOccupancy {
        /// 1-based position in the result list
        index: usize,
        /// Name of the field
        field: &'static str,
        /// Raw code as received
        code: String,
    },

    /// Structured arguments were rejected, or help/version was requested
    #[error("{0}")]
    Usage(#[from] clap::Error),

    /// A required command line argument was not given
    #[error("\"{0}\" not provided")]
    MissingArgument(&'static str),

    /// Client configuration is unusable
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Writing the table failed
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

fn detail(message: &Option<String>) -> String {
    message.as_ref().map(|m| format!(" ({m})")).unwrap_or_default()
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, FahrplanError>;
