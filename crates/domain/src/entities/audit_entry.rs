//! Audit log entry entity - Records who changed what in which department

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    scope::ScopedEntityKind,
    value_objects::{DepartmentId, RecordId, UserId},
};

/// Type of audit event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    /// Department selected, denied or cleared for a session
    DepartmentSelection,
    /// Scoped record created or transferred
    DataChange,
    /// Sharing relation rewritten
    Sharing,
    /// Department or membership administration
    Administration,
    /// Permission checks that failed
    Authorization,
    /// System lifecycle events
    System,
}

impl AuditEventType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DepartmentSelection => "department_selection",
            Self::DataChange => "data_change",
            Self::Sharing => "sharing",
            Self::Administration => "administration",
            Self::Authorization => "authorization",
            Self::System => "system",
        }
    }
}

impl std::fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AuditEventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Self::DepartmentSelection,
            Self::DataChange,
            Self::Sharing,
            Self::Administration,
            Self::Authorization,
            Self::System,
        ]
        .into_iter()
        .find(|t| t.as_str() == s)
        .ok_or_else(|| format!("unknown audit event type '{s}'"))
    }
}

/// Audit log entry recording a system event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Auto-incrementing ID (set by database)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub timestamp: DateTime<Utc>,
    pub event_type: AuditEventType,
    /// Who performed the action
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    /// Department the actor was acting in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<DepartmentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    pub action: String,
    /// Additional details, free text or JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub success: bool,
    /// Request ID for correlation with request logs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<Uuid>,
}

impl AuditEntry {
    /// Create a new successful audit entry
    pub fn success(event_type: AuditEventType, action: impl Into<String>) -> Self {
        Self {
            id: None,
            timestamp: Utc::now(),
            event_type,
            actor: None,
            department_id: None,
            resource_type: None,
            resource_id: None,
            action: action.into(),
            details: None,
            success: true,
            request_id: None,
        }
    }

    /// Create a new failed audit entry
    pub fn failure(event_type: AuditEventType, action: impl Into<String>) -> Self {
        Self {
            success: false,
            ..Self::success(event_type, action)
        }
    }

    #[must_use]
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    #[must_use]
    pub const fn with_department(mut self, department_id: Option<DepartmentId>) -> Self {
        self.department_id = department_id;
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
    pub const fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = Some(request_id);
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Set details from a serializable value
    #[must_use]
    pub fn with_json_details<T: Serialize>(mut self, details: &T) -> Self {
        self.details = serde_json::to_string(details).ok();
        self
    }
}

/// Builder for the audit entries the inventory writes
#[derive(Debug, Clone, Copy, Default)]
pub struct AuditBuilder;

impl AuditBuilder {
    pub fn department_selected(
        actor: UserId,
        department_id: DepartmentId,
        bypass: bool,
    ) -> AuditEntry {
        let entry = AuditEntry::success(AuditEventType::DepartmentSelection, "select")
            .with_actor(actor.to_string())
            .with_department(Some(department_id))
            .with_resource("department", department_id.to_string());
        if bypass {
            entry.with_details("admin bypass active")
        } else {
            entry
        }
    }

    pub fn department_selection_denied(actor: UserId, department_id: DepartmentId) -> AuditEntry {
        AuditEntry::failure(AuditEventType::DepartmentSelection, "select")
            .with_actor(actor.to_string())
            .with_resource("department", department_id.to_string())
            .with_details("not a member")
    }

    /// Selection dropped because membership was revoked
    pub fn stale_selection_cleared(actor: UserId, department_id: DepartmentId) -> AuditEntry {
        AuditEntry::success(AuditEventType::DepartmentSelection, "revalidate")
            .with_actor(actor.to_string())
            .with_resource("department", department_id.to_string())
            .with_details("membership revoked, selection cleared")
    }

    pub fn context_cleared(actor: UserId, department_id: Option<DepartmentId>) -> AuditEntry {
        AuditEntry::success(AuditEventType::DepartmentSelection, "clear")
            .with_actor(actor.to_string())
            .with_department(department_id)
    }

    pub fn record_created(
        actor: UserId,
        acting_in: Option<DepartmentId>,
        kind: ScopedEntityKind,
        id: RecordId,
        owner: Option<DepartmentId>,
    ) -> AuditEntry {
        let owner = owner.map_or_else(|| "orphan".to_string(), |d| d.to_string());
        AuditEntry::success(AuditEventType::DataChange, "create")
            .with_actor(actor.to_string())
            .with_department(acting_in)
            .with_resource(kind.as_str(), id.to_string())
            .with_details(format!("owner: {owner}"))
    }

    pub fn ownership_transferred(
        actor: UserId,
        acting_in: Option<DepartmentId>,
        kind: ScopedEntityKind,
        id: RecordId,
        to: Option<DepartmentId>,
    ) -> AuditEntry {
        let to = to.map_or_else(|| "orphan".to_string(), |d| d.to_string());
        AuditEntry::success(AuditEventType::DataChange, "transfer")
            .with_actor(actor.to_string())
            .with_department(acting_in)
            .with_resource(kind.as_str(), id.to_string())
            .with_details(format!("new owner: {to}"))
    }

    pub fn shares_synced(
        actor: UserId,
        acting_in: Option<DepartmentId>,
        kind: ScopedEntityKind,
        id: RecordId,
        departments: &[DepartmentId],
    ) -> AuditEntry {
        AuditEntry::success(AuditEventType::Sharing, "sync")
            .with_actor(actor.to_string())
            .with_department(acting_in)
            .with_resource(kind.as_str(), id.to_string())
            .with_json_details(&departments)
    }

    pub fn department_created(
        actor: UserId,
        department_id: DepartmentId,
        code: &str,
    ) -> AuditEntry {
        AuditEntry::success(AuditEventType::Administration, "create_department")
            .with_actor(actor.to_string())
            .with_resource("department", department_id.to_string())
            .with_details(code)
    }

    pub fn member_added(actor: UserId, department_id: DepartmentId, member: UserId) -> AuditEntry {
        AuditEntry::success(AuditEventType::Administration, "add_member")
            .with_actor(actor.to_string())
            .with_resource("department", department_id.to_string())
            .with_details(member.to_string())
    }

    pub fn member_removed(
        actor: UserId,
        department_id: DepartmentId,
        member: UserId,
    ) -> AuditEntry {
        AuditEntry::success(AuditEventType::Administration, "remove_member")
            .with_actor(actor.to_string())
            .with_resource("department", department_id.to_string())
            .with_details(member.to_string())
    }

    /// An admin-only operation attempted without the bypass
    pub fn admin_required(
        actor: UserId,
        acting_in: Option<DepartmentId>,
        action: &str,
    ) -> AuditEntry {
        AuditEntry::failure(AuditEventType::Authorization, "admin_required")
            .with_actor(actor.to_string())
            .with_department(acting_in)
            .with_details(action)
    }

    pub fn system_startup(version: &str) -> AuditEntry {
        AuditEntry::success(AuditEventType::System, "startup").with_details(version)
    }

    pub fn system_shutdown(reason: &str) -> AuditEntry {
        AuditEntry::success(AuditEventType::System, "shutdown").with_details(reason)
    }
}
