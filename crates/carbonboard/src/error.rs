//! Error types for carbonboard.
//!
//! This module defines all error types used throughout the carbonboard crate,
//! and how each kind surfaces as an HTTP status.

use std::path::PathBuf;

use axum::http::StatusCode;
use thiserror::Error;

/// The main error type for carbonboard operations.
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

    // === Request Errors ===
    /// A submitted field could not be coerced to the expected type.
    #[error("invalid value for '{field}': {message}")]
    InvalidInput {
        /// Name of the offending form or path field.
        field: &'static str,
        /// Description of what was wrong with it.
        message: String,
    },

    // === Rendering Errors ===
    /// A template failed to load or render.
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

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

    // === Generic Errors ===
    /// An internal error occurred (bug, poisoned lock, cancelled task).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for carbonboard operations.
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

    /// Create an invalid input error for the given field.
    #[must_use]
    pub fn invalid_input(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            message: message.into(),
        }
    }

    /// Check if this error came from the data store.
    #[must_use]
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            Self::DatabaseOpen { .. }
                | Self::DatabaseQuery(_)
                | Self::DatabaseMigration { .. }
                | Self::Internal(_)
        )
    }

    /// Check if this error was caused by malformed request input.
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }

    /// The HTTP status this error should be reported with.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        if self.is_invalid_input() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::internal("test error");
        assert_eq!(err.to_string(), "internal error: test error");

        let err = Error::invalid_input("co2", "not a number");
        assert_eq!(err.to_string(), "invalid value for 'co2': not a number");
    }

    #[test]
    fn test_is_store_error() {
        assert!(Error::internal("poisoned").is_store_error());
        assert!(Error::DatabaseMigration {
            message: "x".to_string()
        }
        .is_store_error());
        assert!(!Error::invalid_input("id", "bad").is_store_error());
    }

    #[test]
    fn test_is_invalid_input() {
        assert!(Error::invalid_input("id", "bad").is_invalid_input());
        assert!(!Error::internal("x").is_invalid_input());
    }

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(
            Error::invalid_input("co2", "abc").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::internal("boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let err: Error = rusqlite::Error::QueryReturnedNoRows.into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
            assert!(err.is_store_error());
        }
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_from_template_error() {
        let env = minijinja::Environment::new();
        if let Err(tmpl_err) = env.get_template("missing.html") {
            let err: Error = tmpl_err.into();
            assert!(matches!(err, Error::Template(_)));
            assert!(!err.is_store_error());
        }
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "invalid bind address".to_string(),
        };
        assert!(err.to_string().contains("invalid bind address"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
