//! Department entity - An organisational unit that owns inventory records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    errors::DomainError,
    value_objects::{DepartmentId, validate_code_segment},
};

/// A department of the university
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    /// Short unique code, 2-10 uppercase letters or digits (`LABS`)
    pub code: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a department
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewDepartment {
    #[validate(length(min = 1, max = 120, message = "must be 1-120 characters"))]
    pub name: String,
    pub code: String,
}

impl Department {
    /// Validate the input and create a department with a fresh id
    ///
    /// The code is trimmed and upper-cased before it is checked.
    pub fn create(input: NewDepartment) -> Result<Self, DomainError> {
        input.validate()?;
        let code = input.code.trim().to_ascii_uppercase();
        validate_code_segment(&code)?;

        Ok(Self {
            id: DepartmentId::new(),
            name: input.name.trim().to_string(),
            code,
            created_at: Utc::now(),
        })
    }
}
