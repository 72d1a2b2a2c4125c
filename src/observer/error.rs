use thiserror::Error;

use crate::database::manager::DatabaseError;

/// Observer system errors with structured error types
#[derive(Debug, Error, Clone)]
pub enum ObserverError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("{message}")]
    InvalidField { field: String, message: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Timeout error: {0}")]
    TimeoutError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl ObserverError {
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ObserverError::InvalidField { field: field.into(), message: message.into() }
    }
}

impl From<DatabaseError> for ObserverError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ObserverError::NotFound(msg),
            other => ObserverError::DatabaseError(other.to_string()),
        }
    }
}
