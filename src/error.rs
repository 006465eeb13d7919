//! Error types for scylla-kit.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for scylla-kit operations.
#[derive(Error, Debug)]
pub enum KitError {
    /// Cluster connection errors (host unreachable, auth failed, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// CQL statement errors (syntax errors, missing tables, empty results, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// ScyllaDB Cloud API errors (auth, HTTP status, unexpected payloads, etc.)
    #[error("API error: {0}")]
    Api(String),

    /// Configuration errors (invalid config file, missing required fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input errors (unreadable files, aborted prompts, bad arguments)
    #[error("Input error: {0}")]
    Input(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl KitError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates an API error with the given message.
    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an input error with the given message.
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::Query(_) => "Query Error",
            Self::Api(_) => "API Error",
            Self::Config(_) => "Configuration Error",
            Self::Input(_) => "Input Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

impl From<std::io::Error> for KitError {
    fn from(err: std::io::Error) -> Self {
        Self::Input(err.to_string())
    }
}

/// Result type alias using KitError.
pub type Result<T> = std::result::Result<T, KitError>;
