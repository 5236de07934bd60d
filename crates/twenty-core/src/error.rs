//! Core error types for twenty-core.
//!
//! Nothing in this crate is allowed to crash the timer: configuration
//! problems clamp, scheduling problems degrade, stale wake-ups drop. The
//! types here exist so callers can report what went wrong, not so they
//! can abort.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for twenty-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Alarm scheduling errors
    #[error("Alarm error: {0}")]
    Alarm(#[from] AlarmError),

    /// Notification posting errors
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
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

    /// Failed to encode state for persistence
    #[error("Failed to encode state: {0}")]
    Encode(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Alarm scheduling errors.
#[derive(Error, Debug)]
pub enum AlarmError {
    /// The platform refused to schedule an exact, doze-exempt wake-up.
    /// Callers fall back to inexact scheduling.
    #[error("Platform denied exact wake-up scheduling")]
    ExactSchedulingDenied,

    /// The alarm backend failed outright.
    #[error("Alarm backend error: {0}")]
    Backend(String),
}

/// Notification posting errors.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The notification backend rejected or dropped the notification.
    #[error("Failed to post notification: {0}")]
    PostFailed(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
