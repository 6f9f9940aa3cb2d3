//! Error types for revtrack.

use thiserror::Error;

/// Top-level result type for revtrack operations.
pub type Result<T> = std::result::Result<T, RevtrackError>;

/// Top-level error type for revtrack.
#[derive(Debug, Error)]
pub enum RevtrackError {
    /// Listing the document source failed (missing folder, permissions, network).
    #[error("document source unavailable: {0}")]
    SourceUnavailable(String),

    /// Reading or writing the tracking store failed.
    #[error("tracking store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("malformed timestamp: {0}")]
    MalformedTimestamp(#[from] TimestampError),

    #[error("malformed identity: {0}")]
    MalformedIdentity(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A date/time value that could not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse {field} '{value}' as a date or date-time")]
pub struct TimestampError {
    /// Which field carried the value (`created_at`, `modified_at`, ...).
    pub field: String,
    pub value: String,
}

impl TimestampError {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}
