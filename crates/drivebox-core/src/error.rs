//! Unified application error types for DriveBox.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
///
/// Every error carries exactly one of these stable tags; callers branch on
/// the kind, never on the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested folder, file, or user was not found (or is not owned
    /// by the caller — ownership failures are indistinguishable from
    /// absence on purpose).
    NotFound,
    /// A folder or file name contains forbidden characters or is empty.
    InvalidName,
    /// A namespace path string is malformed.
    InvalidPath,
    /// A sibling folder or file with the same name already exists.
    NameCollision,
    /// The user's byte budget cannot absorb the requested reservation.
    QuotaExceeded,
    /// Writing an object to the blob store failed.
    BlobWriteFailed,
    /// Reading an object from the blob store failed.
    BlobReadFailed,
    /// A structural mutation lost a race and should be retried.
    TransactionConflict,
    /// Input validation failed.
    Validation,
    /// A database error occurred.
    Database,
    /// A configuration error occurred.
    Configuration,
    /// A compensating action failed and left cross-store state
    /// inconsistent; requires operator intervention.
    Consistency,
    /// An internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::InvalidName => write!(f, "INVALID_NAME"),
            Self::InvalidPath => write!(f, "INVALID_PATH"),
            Self::NameCollision => write!(f, "NAME_COLLISION"),
            Self::QuotaExceeded => write!(f, "QUOTA_EXCEEDED"),
            Self::BlobWriteFailed => write!(f, "BLOB_WRITE_FAILED"),
            Self::BlobReadFailed => write!(f, "BLOB_READ_FAILED"),
            Self::TransactionConflict => write!(f, "TRANSACTION_CONFLICT"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Database => write!(f, "DATABASE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Consistency => write!(f, "CONSISTENCY"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout DriveBox.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. This provides a single error type for
/// the entire application boundary.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create an invalid-name error.
    pub fn invalid_name(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidName, message)
    }

    /// Create an invalid-path error.
    pub fn invalid_path(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidPath, message)
    }

    /// Create a name-collision error.
    pub fn name_collision(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NameCollision, message)
    }

    /// Create a quota-exceeded error.
    pub fn quota_exceeded(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::QuotaExceeded, message)
    }

    /// Create a blob-write error.
    pub fn blob_write(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BlobWriteFailed, message)
    }

    /// Create a transaction-conflict error.
    pub fn transaction_conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TransactionConflict, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a consistency error.
    pub fn consistency(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Consistency, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Whether the operation that produced this error may be retried.
    pub fn is_retryable(&self) -> bool {
        self.kind == ErrorKind::TransactionConflict
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::BlobReadFailed, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags_are_stable() {
        assert_eq!(ErrorKind::NameCollision.to_string(), "NAME_COLLISION");
        assert_eq!(ErrorKind::QuotaExceeded.to_string(), "QUOTA_EXCEEDED");
        assert_eq!(ErrorKind::BlobWriteFailed.to_string(), "BLOB_WRITE_FAILED");
        assert_eq!(
            ErrorKind::TransactionConflict.to_string(),
            "TRANSACTION_CONFLICT"
        );
    }

    #[test]
    fn test_display_includes_kind_and_message() {
        let err = AppError::not_found("Folder not found");
        assert_eq!(err.to_string(), "NOT_FOUND: Folder not found");
    }

    #[test]
    fn test_only_conflicts_are_retryable() {
        assert!(AppError::transaction_conflict("lost the race").is_retryable());
        assert!(!AppError::quota_exceeded("over budget").is_retryable());
    }
}
