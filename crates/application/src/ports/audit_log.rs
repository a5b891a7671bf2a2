//! Port for audit log persistence

use async_trait::async_trait;
use domain::{AuditEntry, AuditEventType, DepartmentId};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Criteria for querying audit entries
#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
    pub event_type: Option<AuditEventType>,
    pub actor: Option<String>,
    pub department_id: Option<DepartmentId>,
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
    pub success: Option<bool>,
    pub limit: Option<u32>,
}

impl AuditQuery {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_event_type(mut self, event_type: AuditEventType) -> Self {
        self.event_type = Some(event_type);
        self
    }

    #[must_use]
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    #[must_use]
    pub const fn with_department(mut self, department_id: DepartmentId) -> Self {
        self.department_id = Some(department_id);
        self
    }

    #[must_use]
    pub fn with_resource(
        mut self,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Self {
        self.resource_type = Some(resource_type.into());
        self.resource_id = Some(resource_id.into());
        self
    }

    #[must_use]
    pub const fn with_success(mut self, success: bool) -> Self {
        self.success = Some(success);
        self
    }

    #[must_use]
    pub const fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Port for the append-only audit log
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AuditLogPort: Send + Sync {
    async fn log(&self, entry: &AuditEntry) -> Result<(), ApplicationError>;

    /// Entries matching `query`, newest first
    async fn query(&self, query: &AuditQuery) -> Result<Vec<AuditEntry>, ApplicationError>;

    async fn count(&self, query: &AuditQuery) -> Result<u64, ApplicationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_builder() {
        let dept = DepartmentId::new();
        let query = AuditQuery::new()
            .with_event_type(AuditEventType::Sharing)
            .with_actor("admin")
            .with_department(dept)
            .with_success(false)
            .with_limit(100);

        assert_eq!(query.event_type, Some(AuditEventType::Sharing));
        assert_eq!(query.actor.as_deref(), Some("admin"));
        assert_eq!(query.department_id, Some(dept));
        assert_eq!(query.success, Some(false));
        assert_eq!(query.limit, Some(100));
    }
}
