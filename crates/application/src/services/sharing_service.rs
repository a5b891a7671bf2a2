//! Sharing Service - Maintains the department sharing sets of buildings,
//! categories and assets

use std::{collections::BTreeSet, sync::Arc};

use domain::{
    AuditBuilder, DepartmentContext, DepartmentId, DepartmentOwned, InventoryItem, RecordId,
    ScopedEntityKind, SharingRelation,
};
use tracing::{info, instrument};

use crate::{
    error::ApplicationError,
    ports::{AuditLogPort, DepartmentStore, InventoryStore, SharingStore},
    request_context::RequestContext,
};

/// Service for sharing relations
pub struct SharingService {
    sharing: Arc<dyn SharingStore>,
    inventory: Arc<dyn InventoryStore>,
    departments: Arc<dyn DepartmentStore>,
    audit_log: Arc<dyn AuditLogPort>,
}

impl std::fmt::Debug for SharingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharingService").finish_non_exhaustive()
    }
}

impl SharingService {
    pub fn new(
        sharing: Arc<dyn SharingStore>,
        inventory: Arc<dyn InventoryStore>,
        departments: Arc<dyn DepartmentStore>,
        audit_log: Arc<dyn AuditLogPort>,
    ) -> Self {
        Self {
            sharing,
            inventory,
            departments,
            audit_log,
        }
    }

    /// Departments a visible record is shared with
    #[instrument(skip(self, scope))]
    pub async fn list_shares(
        &self,
        kind: ScopedEntityKind,
        id: RecordId,
        scope: &DepartmentContext,
    ) -> Result<Vec<DepartmentId>, ApplicationError> {
        let relation = Self::relation_for(kind)?;
        self.require_visible(kind, id, scope).await?;
        self.sharing.list(relation, id).await
    }

    /// Replace the sharing set of a record owned by the active department
    ///
    /// Departments holding a share may see the record but not change its
    /// sharing set. Duplicates are dropped and every department must exist. The stored set
    /// is replaced atomically.
    #[instrument(skip(self, ctx, departments, scope), fields(user_id = %ctx.user_id()))]
    pub async fn sync_shares(
        &self,
        ctx: &RequestContext,
        kind: ScopedEntityKind,
        id: RecordId,
        departments: Vec<DepartmentId>,
        scope: &DepartmentContext,
    ) -> Result<Vec<DepartmentId>, ApplicationError> {
        let relation = Self::relation_for(kind)?;
        let item = self.require_visible(kind, id, scope).await?;
        if !item.is_manageable_by(scope) {
            return Err(ApplicationError::NotAuthorized(format!(
                "only the owning department can change the shares of {kind} {id}"
            )));
        }

        let departments: Vec<DepartmentId> = departments
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        for department in &departments {
            if self.departments.get(*department).await?.is_none() {
                return Err(ApplicationError::NotFound(format!("department {department}")));
            }
        }

        self.sharing.replace(relation, id, &departments).await?;
        info!(%relation, %id, shares = departments.len(), "Sharing set replaced");

        self.audit_log
            .log(
                &AuditBuilder::shares_synced(
                    ctx.user_id(),
                    scope.active_department(),
                    kind,
                    id,
                    &departments,
                )
                .with_request_id(ctx.request_id()),
            )
            .await?;

        Ok(departments)
    }

    fn relation_for(kind: ScopedEntityKind) -> Result<SharingRelation, ApplicationError> {
        kind.sharing_relation().ok_or_else(|| {
            ApplicationError::InvalidOperation(format!("{} cannot be shared", kind.collection()))
        })
    }

    async fn require_visible(
        &self,
        kind: ScopedEntityKind,
        id: RecordId,
        scope: &DepartmentContext,
    ) -> Result<InventoryItem, ApplicationError> {
        self.inventory
            .get(kind, id, scope)
            .await?
            .ok_or_else(|| ApplicationError::NotFound(format!("{kind} {id}")))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use domain::{Building, Department};

    use super::*;
    use crate::ports::{
        MockAuditLogPort, MockDepartmentStore, MockInventoryStore, MockSharingStore,
    };

    fn building(id: RecordId, owner: DepartmentId) -> InventoryItem {
        InventoryItem::Building(Building {
            id,
            location_id: None,
            name: "West Building".to_string(),
            code: "WB-01".to_string(),
            department_id: Some(owner),
            created_at: Utc::now(),
        })
    }

    /// Every record is visible and owned by `owner`
    fn owned_inventory(owner: DepartmentId) -> MockInventoryStore {
        let mut inventory = MockInventoryStore::new();
        inventory
            .expect_get()
            .returning(move |_, id, _| Ok(Some(building(id, owner))));
        inventory
    }

    fn known_departments() -> MockDepartmentStore {
        let mut departments = MockDepartmentStore::new();
        departments.expect_get().returning(|id| {
            Ok(Some(Department {
                id,
                name: "Dept".to_string(),
                code: "DEPT".to_string(),
                created_at: Utc::now(),
            }))
        });
        departments
    }

    fn quiet_audit() -> MockAuditLogPort {
        let mut audit = MockAuditLogPort::new();
        audit.expect_log().returning(|_| Ok(()));
        audit
    }

    fn scope(department: DepartmentId) -> DepartmentContext {
        DepartmentContext::for_department(department, None)
    }

    #[tokio::test]
    async fn sync_deduplicates_and_replaces() {
        let owner = DepartmentId::new();
        let labs = DepartmentId::new();
        let mut sharing = MockSharingStore::new();
        sharing
            .expect_replace()
            .withf(move |relation, _, departments| {
                *relation == SharingRelation::Building
                    && departments.len() == 1
                    && departments[0] == labs
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let svc = SharingService::new(
            Arc::new(sharing),
            Arc::new(owned_inventory(owner)),
            Arc::new(known_departments()),
            Arc::new(quiet_audit()),
        );
        let stored = svc
            .sync_shares(
                &RequestContext::new(domain::UserId::new()),
                ScopedEntityKind::Building,
                RecordId::new(),
                vec![labs, labs],
                &scope(owner),
            )
            .await
            .unwrap();

        assert_eq!(stored, vec![labs]);
    }

    #[tokio::test]
    async fn sync_on_invisible_record_is_not_found() {
        let mut inventory = MockInventoryStore::new();
        inventory.expect_get().returning(|_, _, _| Ok(None));
        let mut sharing = MockSharingStore::new();
        sharing.expect_replace().never();

        let svc = SharingService::new(
            Arc::new(sharing),
            Arc::new(inventory),
            Arc::new(known_departments()),
            Arc::new(quiet_audit()),
        );
        let err = svc
            .sync_shares(
                &RequestContext::new(domain::UserId::new()),
                ScopedEntityKind::Category,
                RecordId::new(),
                vec![DepartmentId::new()],
                &scope(DepartmentId::new()),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::NotFound(_)));
    }

    #[tokio::test]
    async fn unshareable_kind_is_rejected() {
        let svc = SharingService::new(
            Arc::new(MockSharingStore::new()),
            Arc::new(MockInventoryStore::new()),
            Arc::new(MockDepartmentStore::new()),
            Arc::new(MockAuditLogPort::new()),
        );
        let err = svc
            .list_shares(ScopedEntityKind::Room, RecordId::new(), &scope(DepartmentId::new()))
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::InvalidOperation(_)));
    }

    #[tokio::test]
    async fn sync_with_unknown_department_is_not_found() {
        let owner = DepartmentId::new();
        let mut departments = MockDepartmentStore::new();
        departments.expect_get().returning(|_| Ok(None));
        let mut sharing = MockSharingStore::new();
        sharing.expect_replace().never();

        let svc = SharingService::new(
            Arc::new(sharing),
            Arc::new(owned_inventory(owner)),
            Arc::new(departments),
            Arc::new(quiet_audit()),
        );
        let err = svc
            .sync_shares(
                &RequestContext::new(domain::UserId::new()),
                ScopedEntityKind::Asset,
                RecordId::new(),
                vec![DepartmentId::new()],
                &scope(owner),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_reads_relation_for_kind() {
        let owner = DepartmentId::new();
        let labs = DepartmentId::new();
        let mut sharing = MockSharingStore::new();
        sharing
            .expect_list()
            .withf(|relation, _| *relation == SharingRelation::Category)
            .returning(move |_, _| Ok(vec![labs]));

        let svc = SharingService::new(
            Arc::new(sharing),
            Arc::new(owned_inventory(owner)),
            Arc::new(known_departments()),
            Arc::new(quiet_audit()),
        );
        let shares = svc
            .list_shares(ScopedEntityKind::Category, RecordId::new(), &scope(labs))
            .await
            .unwrap();

        assert_eq!(shares, vec![labs]);
    }

    #[tokio::test]
    async fn share_recipient_cannot_change_shares() {
        let owner = DepartmentId::new();
        let recipient = DepartmentId::new();
        let mut sharing = MockSharingStore::new();
        sharing.expect_replace().never();

        let svc = SharingService::new(
            Arc::new(sharing),
            Arc::new(owned_inventory(owner)),
            Arc::new(known_departments()),
            Arc::new(MockAuditLogPort::new()),
        );
        let err = svc
            .sync_shares(
                &RequestContext::new(domain::UserId::new()),
                ScopedEntityKind::Building,
                RecordId::new(),
                vec![DepartmentId::new()],
                &scope(recipient),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::NotAuthorized(_)));
    }

    #[tokio::test]
    async fn bypass_may_change_shares_of_any_record() {
        let owner = DepartmentId::new();
        let admin = DepartmentId::new();
        let mut sharing = MockSharingStore::new();
        sharing.expect_replace().times(1).returning(|_, _, _| Ok(()));

        let svc = SharingService::new(
            Arc::new(sharing),
            Arc::new(owned_inventory(owner)),
            Arc::new(known_departments()),
            Arc::new(quiet_audit()),
        );
        let stored = svc
            .sync_shares(
                &RequestContext::new(domain::UserId::new()),
                ScopedEntityKind::Category,
                RecordId::new(),
                Vec::new(),
                &DepartmentContext::for_department(admin, Some(admin)),
            )
            .await
            .unwrap();

        assert!(stored.is_empty());
    }
}
