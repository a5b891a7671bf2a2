//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Record missing or not visible in the active department
    #[error("Not found: {0}")]
    NotFound(String),

    /// The operation is not valid for this record
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// A scoped operation was attempted without a selected department
    #[error("A department must be selected first")]
    DepartmentSelectionRequired,

    /// User not authorized
    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    /// Unique constraint violated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Whether the caller can fix the error by changing the request
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::Configuration(_) | Self::Internal(_))
    }
}

#[cfg(test)]
mod tests {
    use domain::{DepartmentId, UserId};

    use super::*;

    #[test]
    fn domain_errors_are_transparent() {
        let err: ApplicationError = DomainError::NotAMember {
            user_id: UserId::new(),
            department_id: DepartmentId::new(),
        }
        .into();
        assert!(err.to_string().contains("is not a member"));
        assert!(err.is_client_error());
    }

    #[test]
    fn internal_errors_are_server_errors() {
        assert!(!ApplicationError::Internal("db".to_string()).is_client_error());
        assert!(!ApplicationError::Configuration("x".to_string()).is_client_error());
        assert!(ApplicationError::DepartmentSelectionRequired.is_client_error());
    }
}
