//! Error taxonomy: configuration and extraction problems fail fast and
//! synchronously at the call site; backend problems travel as future
//! rejections; cancellation is its own terminal state, never an error.

use thiserror::Error;

/// Raised synchronously from constructors and config parsing. Never
/// silently defaulted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no proxy configured for '{0}'")]
    MissingProxy(String),

    #[error("unknown proxy kind: {0}")]
    UnknownProxy(String),

    #[error("malformed property path '{path}': {reason}")]
    MalformedPath { path: String, reason: &'static str },
}

/// Raised synchronously from [`crate::Reader::read`]. A configured metadata
/// path that is absent from the payload is a config/programmer error, not a
/// recoverable runtime condition.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReadError {
    #[error("configured total path '{0}' missing from payload")]
    MissingTotal(String),

    #[error("configured message path '{0}' missing from payload")]
    MissingMessage(String),

    #[error("expected {expected} at '{path}', got {got}")]
    WrongShape { path: String, expected: &'static str, got: &'static str },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WriteError {
    #[error("empty write payload")]
    Empty,

    #[error("cannot serialize field '{field}': {reason}")]
    Field { field: String, reason: String },
}

/// The rejection payload carried by request/operation/batch futures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DataError {
    /// The backend reported a failure for this request.
    #[error("backend error: {0}")]
    Backend(String),

    #[error("entity not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
