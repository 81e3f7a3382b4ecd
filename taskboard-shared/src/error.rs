/// Core error taxonomy
///
/// Every failure the access-control and ordering core can report. Surfaces map
/// these onto their own presentation (HTTP status codes, redirects, messages).
///
/// | Variant        | Meaning                                         |
/// |----------------|-------------------------------------------------|
/// | `Unauthorized` | no authenticated actor                          |
/// | `Forbidden`    | authenticated but lacking the required role     |
/// | `NotFound`     | identifier resolves to nothing                  |
/// | `Validation`   | bad input, nothing was written                  |
/// | `Store`        | the entity store failed                         |
///
/// A refused collaborator removal is deliberately absent: it is an outcome,
/// see [`crate::collaborators::RemovalOutcome`].
use crate::store::StoreError;

/// Result alias for core operations
pub type TrackerResult<T> = Result<T, TrackerError>;

/// Error type for core operations
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// No authenticated actor
    #[error("Authentication required")]
    Unauthorized,

    /// Actor lacks the required membership or role
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Identifier resolves to nothing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input for a single field
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// Entity store failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl TrackerError {
    /// Builds a field-level validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        TrackerError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Builds a not-found error for the named resource
    pub fn not_found(what: impl Into<String>) -> Self {
        TrackerError::NotFound(what.into())
    }
}

impl From<sqlx::Error> for TrackerError {
    fn from(err: sqlx::Error) -> Self {
        TrackerError::Store(StoreError::Database(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = TrackerError::validation("username", "No such user.");
        assert_eq!(err.to_string(), "Invalid username: No such user.");
    }

    #[test]
    fn test_sqlx_error_becomes_store_error() {
        let err: TrackerError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, TrackerError::Store(StoreError::Database(_))));
    }
}
