//! Sharing relation storage port

use async_trait::async_trait;
use domain::{DepartmentId, RecordId, SharingRelation};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for the department sharing join tables
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SharingStore: Send + Sync {
    /// Replace the whole sharing set of one record in a single transaction
    async fn replace(
        &self,
        relation: SharingRelation,
        entity_id: RecordId,
        departments: &[DepartmentId],
    ) -> Result<(), ApplicationError>;

    /// Departments the record is shared with
    async fn list(
        &self,
        relation: SharingRelation,
        entity_id: RecordId,
    ) -> Result<Vec<DepartmentId>, ApplicationError>;
}
