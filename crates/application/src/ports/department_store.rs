//! Department and membership storage port

use async_trait::async_trait;
use domain::{Department, DepartmentId, UserId};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for departments and their members
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DepartmentStore: Send + Sync {
    /// Insert a department; a taken code is a `Conflict`
    async fn create(&self, department: &Department) -> Result<(), ApplicationError>;

    async fn get(&self, id: DepartmentId) -> Result<Option<Department>, ApplicationError>;

    async fn get_by_code(&self, code: &str) -> Result<Option<Department>, ApplicationError>;

    /// All departments ordered by code
    async fn list(&self) -> Result<Vec<Department>, ApplicationError>;

    /// Add a member; adding an existing member is a no-op
    async fn add_member(
        &self,
        department_id: DepartmentId,
        user_id: UserId,
    ) -> Result<(), ApplicationError>;

    /// Returns `false` if the user was not a member
    async fn remove_member(
        &self,
        department_id: DepartmentId,
        user_id: UserId,
    ) -> Result<bool, ApplicationError>;

    async fn is_member(
        &self,
        department_id: DepartmentId,
        user_id: UserId,
    ) -> Result<bool, ApplicationError>;

    /// Departments the user belongs to, ordered by code
    async fn departments_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Department>, ApplicationError>;
}
