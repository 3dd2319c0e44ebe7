//! Error handling
//!
//! Every failure surfaced by the data-access layer is a [`ShelterError`].
//! Each variant belongs to one of four kinds (see [`ErrorKind`]) so callers
//! can decide how to react without matching on every variant.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::Column;

/// Coarse classification of a [`ShelterError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A field failed validation; storage was not touched
    InvalidField,
    /// An update carried no fields; not a failure
    NoOpUpdate,
    /// The resource identifier is outside the supported space
    UnrecognizedResource,
    /// The storage engine failed or could not be provisioned
    Storage,
}

/// Operation being routed, used in error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Query,
    Insert,
    Update,
    Delete,
    GetType,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Operation::Query => "query",
            Operation::Insert => "insert",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::GetType => "get type",
        };
        f.write_str(name)
    }
}

/// Errors that can occur in the data-access layer
#[derive(Error, Debug)]
pub enum ShelterError {
    /// A supplied field violates a record invariant
    #[error("Invalid value for '{field}': {reason}")]
    InvalidField { field: Column, reason: String },

    /// An update with no fields to change
    #[error("Update has no fields to change")]
    NoOpUpdate,

    /// The identifier matched neither the collection nor an item
    #[error("Cannot {operation} unknown URI '{uri}'")]
    UnrecognizedResource { uri: String, operation: Operation },

    /// The data directory could not be created
    #[error("Failed to create data directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The database could not be opened or provisioned
    #[error("Storage unavailable at '{path}': {source}")]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// The on-disk schema is newer than this build understands
    #[error("Unsupported schema migration from version {from} to {to}")]
    UnsupportedMigration { from: i32, to: i32 },

    /// A stored row holds a value the model cannot represent
    #[error("Corrupt row {id}: {details}")]
    CorruptRow { id: i64, details: String },

    /// SQLite database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl ShelterError {
    pub fn invalid(field: Column, reason: impl Into<String>) -> Self {
        ShelterError::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    pub fn unrecognized(uri: impl Into<String>, operation: Operation) -> Self {
        ShelterError::UnrecognizedResource {
            uri: uri.into(),
            operation,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ShelterError::InvalidField { .. } => ErrorKind::InvalidField,
            ShelterError::NoOpUpdate => ErrorKind::NoOpUpdate,
            ShelterError::UnrecognizedResource { .. } => ErrorKind::UnrecognizedResource,
            ShelterError::CreateDirectory { .. }
            | ShelterError::StorageUnavailable { .. }
            | ShelterError::UnsupportedMigration { .. }
            | ShelterError::CorruptRow { .. }
            | ShelterError::Database(_) => ErrorKind::Storage,
        }
    }

    /// Check if the provisioning of the store failed
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(
            self,
            ShelterError::CreateDirectory { .. }
                | ShelterError::StorageUnavailable { .. }
                | ShelterError::UnsupportedMigration { .. }
        )
    }

    /// Check if the user can fix this by changing their input
    pub fn is_user_correctable(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidField | ErrorKind::NoOpUpdate)
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            ShelterError::InvalidField { field: Column::Name, .. } => {
                Some("Every pet needs a name.")
            }
            ShelterError::InvalidField { field: Column::Gender, .. } => {
                Some("Gender must be unknown (0), male (1) or female (2).")
            }
            ShelterError::InvalidField { field: Column::Weight, .. } => {
                Some("Weight must be zero or a positive whole number.")
            }
            ShelterError::CreateDirectory { .. } => {
                Some("Check that the parent directory exists and you have write permissions.")
            }
            ShelterError::StorageUnavailable { .. } => {
                Some("Check that the data directory is writable and not on a full disk.")
            }
            ShelterError::UnsupportedMigration { .. } => {
                Some("The database was written by a newer version. Upgrade before opening it.")
            }
            _ => None,
        }
    }
}

/// Result type for data-access operations
pub type Result<T> = std::result::Result<T, ShelterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            ShelterError::invalid(Column::Name, "required").kind(),
            ErrorKind::InvalidField
        );
        assert_eq!(ShelterError::NoOpUpdate.kind(), ErrorKind::NoOpUpdate);
        assert_eq!(
            ShelterError::unrecognized("content://x/cats", Operation::Query).kind(),
            ErrorKind::UnrecognizedResource
        );
        assert_eq!(
            ShelterError::Database(rusqlite::Error::InvalidQuery).kind(),
            ErrorKind::Storage
        );
    }

    #[test]
    fn test_storage_unavailable() {
        let err = ShelterError::CreateDirectory {
            path: PathBuf::from("/readonly/shelter"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.is_storage_unavailable());
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert!(err.recovery_suggestion().is_some());

        let err = ShelterError::Database(rusqlite::Error::InvalidQuery);
        assert!(!err.is_storage_unavailable());
    }

    #[test]
    fn test_user_correctable() {
        assert!(ShelterError::invalid(Column::Weight, "negative").is_user_correctable());
        assert!(ShelterError::NoOpUpdate.is_user_correctable());
        assert!(
            !ShelterError::unrecognized("content://x/pets/abc", Operation::Delete)
                .is_user_correctable()
        );
    }

    #[test]
    fn test_error_display() {
        let err = ShelterError::invalid(Column::Gender, "must be 0, 1 or 2, got 5");
        let msg = err.to_string();
        assert!(msg.contains("gender"));
        assert!(msg.contains("got 5"));

        let err = ShelterError::unrecognized("content://x/cats", Operation::Insert);
        assert_eq!(err.to_string(), "Cannot insert unknown URI 'content://x/cats'");
    }
}
