//! Core error types for wayfarer-core.
//!
//! The taxonomy follows how callers are expected to react: a missing trip or
//! day plan is final, while parse failures, timeouts and unreachable
//! upstream services can be retried by re-invoking generation.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for wayfarer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Referenced trip or day plan does not exist (404-equivalent).
    #[error("{kind} '{id}' not found")]
    ContextNotFound { kind: ContextKind, id: String },

    /// The text generator answered with something that is not a valid
    /// activity list.
    #[error(transparent)]
    GenerationParse(#[from] GenerationParseError),

    /// Weather, places or generation service could not be reached.
    #[error("Upstream service '{service}' unavailable: {message}")]
    UpstreamUnavailable { service: String, message: String },

    /// The text generator did not answer in time.
    #[error("Text generation timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Shorthand for an unreachable collaborator.
    pub fn upstream(service: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::UpstreamUnavailable {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Whether re-invoking the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CoreError::GenerationParse(_)
                | CoreError::Timeout { .. }
                | CoreError::UpstreamUnavailable { .. }
        )
    }

    /// Whether the error means the referenced context is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::ContextNotFound { .. })
    }
}

/// Which piece of context a lookup failed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    Trip,
    DayPlan,
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextKind::Trip => f.write_str("Trip"),
            ContextKind::DayPlan => f.write_str("Day plan"),
        }
    }
}

/// Generator output that could not be coerced into an activity list.
///
/// Always carries the raw response so callers can show it to the user for
/// manual correction.
#[derive(Error, Debug, Clone)]
#[error("Generator response could not be parsed: {reason}")]
pub struct GenerationParseError {
    pub reason: String,
    pub raw_response: String,
}

impl GenerationParseError {
    pub fn new(reason: impl Into<String>, raw_response: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            raw_response: raw_response.into(),
        }
    }
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Stored JSON column could not be decoded
    #[error("Corrupt {column} column for row '{id}': {message}")]
    CorruptRow {
        column: &'static str,
        id: String,
        message: String,
    },

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to resolve the data directory
    #[error("Failed to access data directory: {0}")]
    DataDir(String),

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// OS keyring access failed
    #[error("Credential store error: {0}")]
    Credentials(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Time slot is not a zero-padded 24-hour "HH:MM" string
    #[error("Invalid time slot '{0}': expected HH:MM")]
    InvalidTimeSlot(String),

    /// Decision targets a slot absent from the current diff
    #[error("Time slot '{0}' is not part of the current comparison")]
    UnknownSlot(String),

    /// Required text was empty
    #[error("'{0}' must not be empty")]
    Empty(&'static str),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) if e.code == rusqlite::ErrorCode::DatabaseBusy => {
                DatabaseError::Locked
            }
            rusqlite::Error::SqliteFailure(e, _msg) if e.code == rusqlite::ErrorCode::DatabaseLocked => {
                DatabaseError::Locked
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
