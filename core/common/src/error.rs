//! Common error types for the PDF vault.

use thiserror::Error;

/// Top-level error type for vault operations.
///
/// Variants mirror the user-facing operations: each structural mutation has
/// its own failure kind so the caller can report it at the point of failure.
#[derive(Debug, Error)]
pub enum Error {
    /// Folder creation failed on disk.
    #[error("Creation error: {0}")]
    Creation(String),

    /// File or folder deletion failed on disk.
    #[error("Deletion error: {0}")]
    Deletion(String),

    /// Rename failed on disk.
    #[error("Rename error: {0}")]
    Rename(String),

    /// Requested name is not a valid path component.
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// Requested name is already taken in the destination directory.
    #[error("Name conflict: {0}")]
    NameConflict(String),

    /// Move failed on disk.
    #[error("Move error: {0}")]
    Move(String),

    /// Move destination already holds an entry with the same name.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A single file of an import batch could not be imported.
    #[error("Import error: {0}")]
    Import(String),

    /// The vault root could not be scanned at all.
    #[error("Scan error: {0}")]
    Scan(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Coarse grouping of [`Error`] variants by the operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Creation,
    Deletion,
    Rename,
    Move,
    Import,
    Scan,
    Other,
}

impl Error {
    /// Map this error onto its operation group.
    ///
    /// `InvalidName` and `NameConflict` are rename failures; `Conflict` is a
    /// move failure.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Creation(_) => ErrorCategory::Creation,
            Error::Deletion(_) => ErrorCategory::Deletion,
            Error::Rename(_) | Error::InvalidName(_) | Error::NameConflict(_) => {
                ErrorCategory::Rename
            }
            Error::Move(_) | Error::Conflict(_) => ErrorCategory::Move,
            Error::Import(_) => ErrorCategory::Import,
            Error::Scan(_) => ErrorCategory::Scan,
            Error::Io(_)
            | Error::Serialization(_)
            | Error::InvalidInput(_)
            | Error::NotFound(_) => ErrorCategory::Other,
        }
    }

    /// Whether the underlying cause is a denied permission.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied)
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rename_subcases_share_category() {
        assert_eq!(
            Error::InvalidName("a/b".into()).category(),
            ErrorCategory::Rename
        );
        assert_eq!(
            Error::NameConflict("x".into()).category(),
            ErrorCategory::Rename
        );
        assert_eq!(Error::Rename("x".into()).category(), ErrorCategory::Rename);
    }

    #[test]
    fn test_conflict_is_move_category() {
        assert_eq!(Error::Conflict("x".into()).category(), ErrorCategory::Move);
    }

    #[test]
    fn test_permission_denied_detection() {
        let err: Error = std::io::Error::from(std::io::ErrorKind::PermissionDenied).into();
        assert!(err.is_permission_denied());

        let err: Error = std::io::Error::from(std::io::ErrorKind::NotFound).into();
        assert!(!err.is_permission_denied());
        assert!(!Error::Scan("root".into()).is_permission_denied());
    }
}
