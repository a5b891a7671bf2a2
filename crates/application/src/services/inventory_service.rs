//! Inventory Service - Scoped create, read and transfer of inventory records

use std::sync::Arc;

use domain::{
    AuditBuilder, DepartmentContext, DepartmentId, DepartmentOwned, InventoryItem,
    NewInventoryItem, RecordId, ScopedEntityKind,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::{
    error::ApplicationError,
    ports::{AuditLogPort, DepartmentStore, InventoryStore, Page, Pagination},
    request_context::RequestContext,
};

/// Visible record count of one kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindCount {
    pub kind: ScopedEntityKind,
    pub count: u64,
}

/// Per-kind counts for the dashboard, scoped like every other read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryStatistics {
    pub department_id: Option<DepartmentId>,
    pub bypass: bool,
    pub counts: Vec<KindCount>,
}

impl InventoryStatistics {
    pub fn count_of(&self, kind: ScopedEntityKind) -> u64 {
        self.counts
            .iter()
            .find(|c| c.kind == kind)
            .map_or(0, |c| c.count)
    }
}

/// Service for scoped inventory records
pub struct InventoryService {
    store: Arc<dyn InventoryStore>,
    departments: Arc<dyn DepartmentStore>,
    audit_log: Arc<dyn AuditLogPort>,
}

impl std::fmt::Debug for InventoryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryService").finish_non_exhaustive()
    }
}

impl InventoryService {
    pub fn new(
        store: Arc<dyn InventoryStore>,
        departments: Arc<dyn DepartmentStore>,
        audit_log: Arc<dyn AuditLogPort>,
    ) -> Self {
        Self {
            store,
            departments,
            audit_log,
        }
    }

    /// Create a record, defaulting its owner to the active department
    #[instrument(
        skip(self, ctx, scope, input),
        fields(user_id = %ctx.user_id(), kind = %input.kind())
    )]
    pub async fn create(
        &self,
        ctx: &RequestContext,
        scope: &DepartmentContext,
        input: NewInventoryItem,
    ) -> Result<InventoryItem, ApplicationError> {
        let mut prepared = input.prepare(scope)?;
        if let Some(owner) = prepared.department_id() {
            self.require_department(owner).await?;
        }
        self.resolve_references(&mut prepared, scope).await?;

        let item = self.store.insert(&prepared).await?;
        info!(id = %item.id(), owner = ?item.department_id(), "Inventory record created");

        self.audit_log
            .log(
                &AuditBuilder::record_created(
                    ctx.user_id(),
                    scope.active_department(),
                    item.kind(),
                    item.id(),
                    item.department_id(),
                )
                .with_request_id(ctx.request_id()),
            )
            .await?;

        Ok(item)
    }

    #[instrument(skip(self, scope))]
    pub async fn list(
        &self,
        kind: ScopedEntityKind,
        scope: &DepartmentContext,
        pagination: Pagination,
    ) -> Result<Page<InventoryItem>, ApplicationError> {
        self.store.list(kind, scope, pagination).await
    }

    /// One visible record; invisible records are reported as missing
    #[instrument(skip(self, scope))]
    pub async fn get(
        &self,
        kind: ScopedEntityKind,
        id: RecordId,
        scope: &DepartmentContext,
    ) -> Result<InventoryItem, ApplicationError> {
        self.store
            .get(kind, id, scope)
            .await?
            .ok_or_else(|| ApplicationError::NotFound(format!("{kind} {id}")))
    }

    #[instrument(skip(self, scope))]
    pub async fn count(
        &self,
        kind: ScopedEntityKind,
        scope: &DepartmentContext,
    ) -> Result<u64, ApplicationError> {
        self.store.count(kind, scope).await
    }

    /// Visible counts for every kind
    #[instrument(skip(self, scope))]
    pub async fn statistics(
        &self,
        scope: &DepartmentContext,
    ) -> Result<InventoryStatistics, ApplicationError> {
        let mut counts = Vec::with_capacity(ScopedEntityKind::ALL.len());
        for kind in ScopedEntityKind::ALL {
            counts.push(KindCount {
                kind,
                count: self.store.count(kind, scope).await?,
            });
        }
        debug!(kinds = counts.len(), "Statistics computed");

        Ok(InventoryStatistics {
            department_id: scope.active_department(),
            bypass: scope.is_bypass_active(),
            counts,
        })
    }

    /// Move a record to another department, or orphan it with `None`
    ///
    /// Only the owning department or the admin bypass may transfer.
    #[instrument(skip(self, ctx, scope), fields(user_id = %ctx.user_id()))]
    pub async fn transfer(
        &self,
        ctx: &RequestContext,
        kind: ScopedEntityKind,
        id: RecordId,
        department_id: Option<DepartmentId>,
        scope: &DepartmentContext,
    ) -> Result<InventoryItem, ApplicationError> {
        let mut item = self.get(kind, id, scope).await?;
        if !item.is_manageable_by(scope) {
            return Err(ApplicationError::NotAuthorized(format!(
                "only the owning department can transfer {kind} {id}"
            )));
        }
        if let Some(target) = department_id {
            self.require_department(target).await?;
        }

        if !self.store.set_department(kind, id, department_id).await? {
            return Err(ApplicationError::NotFound(format!("{kind} {id}")));
        }
        item.set_department_id(department_id);
        info!(%id, to = ?department_id, "Ownership transferred");

        self.audit_log
            .log(
                &AuditBuilder::ownership_transferred(
                    ctx.user_id(),
                    scope.active_department(),
                    kind,
                    id,
                    department_id,
                )
                .with_request_id(ctx.request_id()),
            )
            .await?;

        Ok(item)
    }

    /// Read every parent the input points at under `scope`
    ///
    /// An invisible parent is reported as missing. Assets take their category
    /// code from the scoped read.
    async fn resolve_references(
        &self,
        input: &mut NewInventoryItem,
        scope: &DepartmentContext,
    ) -> Result<(), ApplicationError> {
        for (kind, id) in input.references() {
            let parent = self.get(kind, id, scope).await?;
            if let (NewInventoryItem::Asset(asset), InventoryItem::Category(category)) =
                (&mut *input, &parent)
            {
                asset.category_code = Some(category.code.clone());
            }
        }
        Ok(())
    }

    async fn require_department(&self, id: DepartmentId) -> Result<(), ApplicationError> {
        match self.departments.get(id).await? {
            Some(_) => Ok(()),
            None => Err(ApplicationError::NotFound(format!("department {id}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use domain::{Category, Department, NewAsset, NewNews, News, Room};
    use mockall::predicate::eq;

    use super::*;
    use crate::ports::{MockAuditLogPort, MockDepartmentStore, MockInventoryStore};

    fn quiet_audit() -> MockAuditLogPort {
        let mut audit = MockAuditLogPort::new();
        audit.expect_log().returning(|_| Ok(()));
        audit
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

    fn news(department_id: Option<DepartmentId>) -> InventoryItem {
        InventoryItem::News(News {
            id: RecordId::new(),
            title: "Notice".to_string(),
            body: String::new(),
            department_id,
            created_at: Utc::now(),
        })
    }

    fn service(
        store: MockInventoryStore,
        departments: MockDepartmentStore,
        audit: MockAuditLogPort,
    ) -> InventoryService {
        InventoryService::new(Arc::new(store), Arc::new(departments), Arc::new(audit))
    }

    #[tokio::test]
    async fn create_defaults_owner_to_active_department() {
        let dept = DepartmentId::new();
        let scope = DepartmentContext::for_department(dept, None);

        let mut store = MockInventoryStore::new();
        store
            .expect_insert()
            .withf(move |item| item.department_id() == Some(dept))
            .times(1)
            .returning(|item| Ok(news(item.department_id())));
        let mut audit = MockAuditLogPort::new();
        audit
            .expect_log()
            .withf(|e| e.action == "create" && e.resource_type.as_deref() == Some("news"))
            .times(1)
            .returning(|_| Ok(()));

        let svc = service(store, known_departments(), audit);
        let item = svc
            .create(
                &RequestContext::new(domain::UserId::new()),
                &scope,
                NewInventoryItem::News(NewNews {
                    title: "Notice".to_string(),
                    body: String::new(),
                    department_id: None,
                }),
            )
            .await
            .unwrap();

        assert_eq!(item.department_id(), Some(dept));
    }

    #[tokio::test]
    async fn create_rejects_unknown_explicit_owner() {
        let mut departments = MockDepartmentStore::new();
        departments.expect_get().returning(|_| Ok(None));
        let mut store = MockInventoryStore::new();
        store.expect_insert().never();

        let svc = service(store, departments, quiet_audit());
        let err = svc
            .create(
                &RequestContext::new(domain::UserId::new()),
                &DepartmentContext::none(),
                NewInventoryItem::News(NewNews {
                    title: "Notice".to_string(),
                    body: String::new(),
                    department_id: Some(DepartmentId::new()),
                }),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::NotFound(_)));
    }

    #[tokio::test]
    async fn get_reports_invisible_record_as_not_found() {
        let mut store = MockInventoryStore::new();
        store.expect_get().returning(|_, _, _| Ok(None));

        let svc = service(store, known_departments(), quiet_audit());
        let err = svc
            .get(
                ScopedEntityKind::Asset,
                RecordId::new(),
                &DepartmentContext::for_department(DepartmentId::new(), None),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::NotFound(_)));
    }

    #[tokio::test]
    async fn statistics_counts_every_kind_with_the_callers_scope() {
        let dept = DepartmentId::new();
        let scope = DepartmentContext::for_department(dept, None);

        let mut store = MockInventoryStore::new();
        store
            .expect_count()
            .withf(move |_, ctx| ctx.active_department() == Some(dept))
            .times(ScopedEntityKind::ALL.len())
            .returning(|kind, _| Ok(if kind == ScopedEntityKind::Asset { 3 } else { 1 }));

        let svc = service(store, known_departments(), quiet_audit());
        let stats = svc.statistics(&scope).await.unwrap();

        assert_eq!(stats.counts.len(), ScopedEntityKind::ALL.len());
        assert_eq!(stats.count_of(ScopedEntityKind::Asset), 3);
        assert_eq!(stats.count_of(ScopedEntityKind::News), 1);
        assert_eq!(stats.department_id, Some(dept));
        assert!(!stats.bypass);
    }

    #[tokio::test]
    async fn transfer_requires_visibility() {
        let mut store = MockInventoryStore::new();
        store.expect_get().returning(|_, _, _| Ok(None));
        store.expect_set_department().never();

        let svc = service(store, known_departments(), quiet_audit());
        let err = svc
            .transfer(
                &RequestContext::new(domain::UserId::new()),
                ScopedEntityKind::News,
                RecordId::new(),
                Some(DepartmentId::new()),
                &DepartmentContext::for_department(DepartmentId::new(), None),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::NotFound(_)));
    }

    #[tokio::test]
    async fn transfer_writes_new_owner() {
        let from = DepartmentId::new();
        let to = DepartmentId::new();
        let existing = news(Some(from));
        let id = existing.id();

        let mut store = MockInventoryStore::new();
        store
            .expect_get()
            .returning(move |_, _, _| Ok(Some(existing.clone())));
        store
            .expect_set_department()
            .with(eq(ScopedEntityKind::News), eq(id), eq(Some(to)))
            .times(1)
            .returning(|_, _, _| Ok(true));

        let svc = service(store, known_departments(), quiet_audit());
        let item = svc
            .transfer(
                &RequestContext::new(domain::UserId::new()),
                ScopedEntityKind::News,
                id,
                Some(to),
                &DepartmentContext::for_department(from, None),
            )
            .await
            .unwrap();

        assert_eq!(item.department_id(), Some(to));
    }

    #[tokio::test]
    async fn transfer_by_share_recipient_is_refused() {
        let owner = DepartmentId::new();
        let recipient = DepartmentId::new();
        let existing = news(Some(owner));
        let id = existing.id();

        let mut store = MockInventoryStore::new();
        store
            .expect_get()
            .returning(move |_, _, _| Ok(Some(existing.clone())));
        store.expect_set_department().never();

        let svc = service(store, known_departments(), MockAuditLogPort::new());
        let err = svc
            .transfer(
                &RequestContext::new(domain::UserId::new()),
                ScopedEntityKind::News,
                id,
                Some(recipient),
                &DepartmentContext::for_department(recipient, None),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::NotAuthorized(_)));
    }

    fn new_asset(category_id: Option<RecordId>, room_id: Option<RecordId>) -> NewInventoryItem {
        NewInventoryItem::Asset(NewAsset {
            name: "Oscilloscope".to_string(),
            category_id,
            sub_category_id: None,
            room_id,
            department_id: None,
            category_code: None,
        })
    }

    #[tokio::test]
    async fn create_rejects_invisible_parent() {
        let dept = DepartmentId::new();
        let mut store = MockInventoryStore::new();
        store
            .expect_get()
            .withf(|kind, _, _| *kind == ScopedEntityKind::Room)
            .returning(|_, _, _| Ok(None));
        store.expect_insert().never();

        let svc = service(store, known_departments(), MockAuditLogPort::new());
        let err = svc
            .create(
                &RequestContext::new(domain::UserId::new()),
                &DepartmentContext::for_department(dept, None),
                new_asset(None, Some(RecordId::new())),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::NotFound(_)));
    }

    #[tokio::test]
    async fn create_takes_category_code_from_scoped_read() {
        let dept = DepartmentId::new();
        let category_id = RecordId::new();
        let room_id = RecordId::new();

        let mut store = MockInventoryStore::new();
        store
            .expect_get()
            .withf(move |_, _, ctx| ctx.active_department() == Some(dept))
            .times(2)
            .returning(move |kind, id, _| {
                Ok(Some(match kind {
                    ScopedEntityKind::Category => InventoryItem::Category(Category {
                        id,
                        name: "Computers".to_string(),
                        code: "COMP".to_string(),
                        department_id: Some(dept),
                        created_at: Utc::now(),
                    }),
                    _ => InventoryItem::Room(Room {
                        id,
                        level_id: RecordId::new(),
                        name: "Lab 1".to_string(),
                        department_id: Some(dept),
                        created_at: Utc::now(),
                    }),
                }))
            });
        store
            .expect_insert()
            .withf(|item| {
                matches!(item, NewInventoryItem::Asset(asset)
                    if asset.category_code.as_deref() == Some("COMP"))
            })
            .times(1)
            .returning(|item| Ok(news(item.department_id())));

        let svc = service(store, known_departments(), quiet_audit());
        svc.create(
            &RequestContext::new(domain::UserId::new()),
            &DepartmentContext::for_department(dept, None),
            new_asset(Some(category_id), Some(room_id)),
        )
        .await
        .unwrap();
    }
}
