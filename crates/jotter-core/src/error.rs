//! Note service errors
//!
//! Every Note Service operation fails with one of these. The HTTP layer maps
//! each variant to a status code.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors returned by note operations
#[derive(Error, Debug)]
pub enum NoteError {
    /// No note with this id exists
    #[error("Note not found: {0}")]
    NotFound(String),

    /// The note exists but belongs to another owner
    #[error("Not authorized")]
    Unauthorized,

    /// The request is malformed
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The persistence layer failed
    #[error(transparent)]
    Store(#[from] StorageError),
}

impl NoteError {
    pub fn not_found(id: impl ToString) -> Self {
        NoteError::NotFound(id.to_string())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        NoteError::Validation(message.into())
    }

    /// Operator hint for store failures
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            NoteError::Store(err) => err.recovery_suggestion(),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for NoteError {
    fn from(error: rusqlite::Error) -> Self {
        NoteError::Store(StorageError::Database(error))
    }
}

/// Result type for note operations
pub type NoteResult<T> = Result<T, NoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            NoteError::not_found("abc").to_string(),
            "Note not found: abc"
        );
        assert_eq!(NoteError::Unauthorized.to_string(), "Not authorized");
        assert!(NoteError::validation("bad").to_string().contains("bad"));
    }

    #[test]
    fn test_recovery_suggestion_comes_from_store() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = NoteError::from(StorageError::from_io(io_err, "/data".into()));
        assert!(err
            .recovery_suggestion()
            .is_some_and(|hint| hint.contains("permissions")));

        assert!(NoteError::Unauthorized.recovery_suggestion().is_none());
    }
}
