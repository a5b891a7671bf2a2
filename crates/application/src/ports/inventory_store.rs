//! Scoped inventory storage port
//!
//! Every read takes the caller's [`DepartmentContext`]; implementations must
//! build their visibility condition with [`domain::resolve_filter`] and must
//! not add department conditions of their own.

use async_trait::async_trait;
use domain::{
    DepartmentContext, DepartmentId, InventoryItem, NewInventoryItem, RecordId, ScopedEntityKind,
};
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::error::ApplicationError;

/// Largest page a caller may request
pub const MAX_PAGE_SIZE: u32 = 200;

/// Offset pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub offset: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

impl Pagination {
    /// Build a pagination, clamping `limit` to 1..=[`MAX_PAGE_SIZE`]
    pub fn new(offset: u32, limit: u32) -> Self {
        Self {
            offset,
            limit: limit.clamp(1, MAX_PAGE_SIZE),
        }
    }
}

/// One page of results plus the total visible count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u32,
    pub limit: u32,
}

/// Port for scoped inventory records
#[cfg_attr(test, automock)]
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Insert a prepared record
    ///
    /// Assets get their code generated inside the insert transaction.
    async fn insert(&self, item: &NewInventoryItem) -> Result<InventoryItem, ApplicationError>;

    /// Records of `kind` visible under `context`, oldest first
    async fn list(
        &self,
        kind: ScopedEntityKind,
        context: &DepartmentContext,
        pagination: Pagination,
    ) -> Result<Page<InventoryItem>, ApplicationError>;

    /// One record, `None` if missing or not visible
    async fn get(
        &self,
        kind: ScopedEntityKind,
        id: RecordId,
        context: &DepartmentContext,
    ) -> Result<Option<InventoryItem>, ApplicationError>;

    async fn count(
        &self,
        kind: ScopedEntityKind,
        context: &DepartmentContext,
    ) -> Result<u64, ApplicationError>;

    /// Overwrite the owning department. Visibility is checked by the caller.
    async fn set_department(
        &self,
        kind: ScopedEntityKind,
        id: RecordId,
        department_id: Option<DepartmentId>,
    ) -> Result<bool, ApplicationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_object_safe(_: &dyn InventoryStore) {}

    #[test]
    fn pagination_clamps_limit() {
        assert_eq!(Pagination::new(5, 0).limit, 1);
        assert_eq!(Pagination::new(5, 10_000).limit, MAX_PAGE_SIZE);
        assert_eq!(Pagination::new(5, 20), Pagination {
            offset: 5,
            limit: 20
        });
    }

    #[test]
    fn default_page_size() {
        assert_eq!(Pagination::default().limit, 50);
    }
}
