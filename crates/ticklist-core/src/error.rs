//! Error types for ticklist.

use thiserror::Error;

use crate::validation::FieldError;

/// Result type alias using ticklist's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for ticklist operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Todo not found for the caller
    #[error("Todo not found: {0}")]
    TodoNotFound(uuid::Uuid),

    /// Tag not found for the caller
    #[error("Tag not found: {0}")]
    TagNotFound(uuid::Uuid),

    /// Request failed field-level validation
    #[error("Validation failed: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    /// Write would violate a uniqueness rule
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Invariant broken inside the service; never shown to callers
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Build a validation error for a single field.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation(vec![FieldError::new(field, message)])
    }

    /// Whether this error means the requested row does not exist for the caller.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::TodoNotFound(_) | Error::TagNotFound(_))
    }

    /// Whether the wrapped database error is a unique-constraint violation.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Error::Database(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_display_todo_not_found() {
        let id = Uuid::nil();
        let err = Error::TodoNotFound(id);
        assert_eq!(err.to_string(), format!("Todo not found: {}", id));
    }

    #[test]
    fn test_error_display_validation_joins_fields() {
        let err = Error::Validation(vec![
            FieldError::new("title", "Title is required"),
            FieldError::new("description", "Too long"),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: title: Title is required; description: Too long"
        );
    }

    #[test]
    fn test_field_helper_builds_single_error() {
        match Error::field("names", "Provide at least one tag name") {
            Error::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "names");
            }
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_is_not_found_covers_entity_variants() {
        assert!(Error::TodoNotFound(Uuid::nil()).is_not_found());
        assert!(Error::TagNotFound(Uuid::nil()).is_not_found());
        assert!(!Error::Internal("x".into()).is_not_found());
    }

    #[test]
    fn test_row_not_found_is_not_a_unique_violation() {
        let err = Error::Database(sqlx::Error::RowNotFound);
        assert!(!err.is_unique_violation());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
