//! Error types for kidcheck.
//!
//! This module defines all error types used throughout the kidcheck crate.
//! Validation failures are ordinary, user-correctable errors; nothing here is
//! fatal beyond the underlying storage or file system refusing to cooperate.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for kidcheck operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Validation Errors ===
    /// A required form field was left blank.
    #[error("missing required field: {field}")]
    MissingField {
        /// Human-readable name of the field.
        field: &'static str,
    },

    /// A field was present but unusable.
    #[error("invalid {field}: {message}")]
    InvalidValue {
        /// Human-readable name of the field.
        field: &'static str,
        /// Why the value was rejected.
        message: String,
    },

    // === Lookup Errors ===
    /// No child profile is registered under the given id.
    #[error("child not found: '{id}'. If this is the first visit, please register first")]
    ChildNotFound {
        /// The id that was looked up.
        id: String,
    },

    // === Access Errors ===
    /// The team area is locked.
    #[error("team area is locked; run `kidcheck unlock` first")]
    Locked,

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV encoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for kidcheck operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a missing-field error.
    #[must_use]
    pub fn missing(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    /// Create an invalid-value error.
    #[must_use]
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            message: message.into(),
        }
    }

    /// Create a child-not-found error.
    #[must_use]
    pub fn child_not_found(id: impl Into<String>) -> Self {
        Self::ChildNotFound { id: id.into() }
    }

    /// Check if this error is a user-correctable validation failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::MissingField { .. } | Self::InvalidValue { .. })
    }

    /// Check if this error indicates an unknown child.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ChildNotFound { .. })
    }
}
