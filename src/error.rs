use std::io;
use thiserror::Error;

/// Custom error type for the dbdiag application
#[derive(Error, Debug)]
pub enum DiagError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Counter unavailable: {0}")]
    CounterUnavailable(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Query timed out: {0}")]
    QueryTimeout(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Engine error: {0}")]
    Engine(#[from] rusqlite::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for the dbdiag application
pub type Result<T> = std::result::Result<T, DiagError>;

impl DiagError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        DiagError::Config(msg.into())
    }

    /// Create a counter-unavailable error
    pub fn counter_unavailable<S: Into<String>>(msg: S) -> Self {
        DiagError::CounterUnavailable(msg.into())
    }

    /// Create a query error
    pub fn query<S: Into<String>>(msg: S) -> Self {
        DiagError::Query(msg.into())
    }

    /// Create a query-timeout error
    pub fn query_timeout<S: Into<String>>(msg: S) -> Self {
        DiagError::QueryTimeout(msg.into())
    }

    /// Create an authentication error
    pub fn auth<S: Into<String>>(msg: S) -> Self {
        DiagError::Auth(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        DiagError::Other(msg.into())
    }
}
