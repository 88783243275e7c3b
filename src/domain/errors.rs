//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    /// Resource not found, with a human-readable description
    #[error("{0}")]
    NotFound(String),
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),
    /// Operation not allowed in the current state (e.g. copy already borrowed)
    #[error("{0}")]
    Conflict(String),
    /// Missing or invalid credentials
    #[error("{0}")]
    Unauthorized(String),
    /// Database/persistence error
    #[error("Database error: {0}")]
    Database(String),
    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(what: &str) -> Self {
        DomainError::NotFound(format!("{} not found", what))
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    /// Stable identifier exposed next to the message in error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::NotFound(_) => "not_found",
            DomainError::Validation(_) => "validation",
            DomainError::Conflict(_) => "conflict",
            DomainError::Unauthorized(_) => "unauthorized",
            DomainError::Database(_) | DomainError::Internal(_) => "internal",
        }
    }
}

// Conversion from SeaORM errors (used in infrastructure layer)
impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        DomainError::Database(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_resource() {
        let err = DomainError::not_found("Book copy");
        assert_eq!(err.to_string(), "Book copy not found");
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn database_errors_are_reported_as_internal() {
        let err = DomainError::from(sea_orm::DbErr::Custom("disk full".into()));
        assert_eq!(err.kind(), "internal");
        assert!(err.to_string().contains("disk full"));
    }
}
