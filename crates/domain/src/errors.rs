//! Domain-level errors

use thiserror::Error;

use crate::value_objects::{DepartmentId, UserId};

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// The user tried to act in a department they do not belong to
    #[error("User {user_id} is not a member of department {department_id}")]
    NotAMember {
        user_id: UserId,
        department_id: DepartmentId,
    },

    /// Department or category code does not follow the code rules
    #[error("Invalid code: {0}")]
    InvalidCode(String),

    /// Asset code could not be built or parsed
    #[error("Invalid asset code: {0}")]
    InvalidAssetCode(String),

    /// Unknown inventory record kind
    #[error("Unknown record kind: {0}")]
    UnknownKind(String),

    /// Entity not found
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),

    /// Operation not permitted
    #[error("Operation not permitted: {0}")]
    NotPermitted(String),
}

impl DomainError {
    /// Create a not found error
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .iter()
            .map(|(field, errs)| {
                let reasons: Vec<String> = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map_or_else(|| e.code.to_string(), ToString::to_string)
                    })
                    .collect();
                format!("{field}: {}", reasons.join(", "))
            })
            .collect();
        fields.sort();
        Self::ValidationError(fields.join("; "))
    }
}
