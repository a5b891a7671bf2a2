//! Department Context Service - Selects, validates and clears the department
//! a session acts in

use std::sync::Arc;

use domain::{
    AuditBuilder, Department, DepartmentContext, DepartmentId, DomainError, MissingContextPolicy,
    UserId,
};
use tracing::{debug, info, instrument, warn};

use crate::{
    error::ApplicationError,
    ports::{AuditLogPort, DepartmentStore, SessionKey, SessionStorePort},
    request_context::RequestContext,
};

/// Deployment-wide scoping settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScopeSettings {
    /// Selecting this department disables scoping
    pub admin_department: Option<DepartmentId>,
    /// What reads return when no department is selected
    pub missing_policy: MissingContextPolicy,
}

impl ScopeSettings {
    /// The context for a session that selected `active`
    pub fn context_for(&self, active: Option<DepartmentId>) -> DepartmentContext {
        active
            .map_or_else(DepartmentContext::none, |d| {
                DepartmentContext::for_department(d, self.admin_department)
            })
            .with_missing_policy(self.missing_policy)
    }
}

/// Service holding the per-session department selection
pub struct DepartmentContextService {
    departments: Arc<dyn DepartmentStore>,
    sessions: Arc<dyn SessionStorePort>,
    audit_log: Arc<dyn AuditLogPort>,
    settings: ScopeSettings,
}

impl std::fmt::Debug for DepartmentContextService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DepartmentContextService")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl DepartmentContextService {
    pub fn new(
        departments: Arc<dyn DepartmentStore>,
        sessions: Arc<dyn SessionStorePort>,
        audit_log: Arc<dyn AuditLogPort>,
        settings: ScopeSettings,
    ) -> Self {
        Self {
            departments,
            sessions,
            audit_log,
            settings,
        }
    }

    pub const fn settings(&self) -> &ScopeSettings {
        &self.settings
    }

    /// Select `department_id` for the caller's session
    ///
    /// Fails with [`DomainError::NotAMember`] unless the caller belongs to the
    /// department. Only the session store is written.
    #[instrument(skip(self, ctx), fields(user_id = %ctx.user_id(), department_id = %department_id))]
    pub async fn select(
        &self,
        ctx: &RequestContext,
        department_id: DepartmentId,
    ) -> Result<DepartmentContext, ApplicationError> {
        let user_id = ctx.user_id();
        if !self.departments.is_member(department_id, user_id).await? {
            warn!("Department selection denied");
            self.audit_log
                .log(
                    &AuditBuilder::department_selection_denied(user_id, department_id)
                        .with_request_id(ctx.request_id()),
                )
                .await?;
            return Err(DomainError::NotAMember {
                user_id,
                department_id,
            }
            .into());
        }

        self.sessions
            .set_selection(ctx.session(), department_id)
            .await?;

        let context = self.settings.context_for(Some(department_id));
        info!(bypass = context.is_bypass_active(), "Department selected");
        self.audit_log
            .log(
                &AuditBuilder::department_selected(
                    user_id,
                    department_id,
                    context.is_bypass_active(),
                )
                .with_request_id(ctx.request_id()),
            )
            .await?;

        Ok(context)
    }

    /// The department selected in `session`, without re-validation
    #[instrument(skip(self))]
    pub async fn current(
        &self,
        session: &SessionKey,
    ) -> Result<Option<DepartmentId>, ApplicationError> {
        self.sessions.get_selection(session).await
    }

    /// True only if the session's selection is the admin department
    pub async fn is_bypass_active(&self, session: &SessionKey) -> Result<bool, ApplicationError> {
        let current = self.current(session).await?;
        Ok(self.settings.context_for(current).is_bypass_active())
    }

    /// Resolve the context for one request
    ///
    /// Membership is checked again; a selection whose membership has been
    /// revoked is cleared and the request continues without a department.
    #[instrument(skip(self, ctx), fields(user_id = %ctx.user_id()))]
    pub async fn establish(
        &self,
        ctx: &RequestContext,
    ) -> Result<DepartmentContext, ApplicationError> {
        let Some(selected) = self.sessions.get_selection(ctx.session()).await? else {
            return Ok(self.settings.context_for(None));
        };

        if self.departments.is_member(selected, ctx.user_id()).await? {
            debug!(department_id = %selected, "Department context established");
            return Ok(self.settings.context_for(Some(selected)));
        }

        warn!(department_id = %selected, "Clearing stale department selection");
        self.sessions.clear(ctx.session()).await?;
        self.audit_log
            .log(
                &AuditBuilder::stale_selection_cleared(ctx.user_id(), selected)
                    .with_request_id(ctx.request_id()),
            )
            .await?;
        Ok(self.settings.context_for(None))
    }

    /// Destroy the session's selection
    #[instrument(skip(self, ctx), fields(user_id = %ctx.user_id()))]
    pub async fn clear(
        &self,
        ctx: &RequestContext,
    ) -> Result<Option<DepartmentId>, ApplicationError> {
        let previous = self.sessions.clear(ctx.session()).await?;
        if previous.is_some() {
            info!("Department selection cleared");
            self.audit_log
                .log(
                    &AuditBuilder::context_cleared(ctx.user_id(), previous)
                        .with_request_id(ctx.request_id()),
                )
                .await?;
        }
        Ok(previous)
    }

    /// Departments the user may select
    #[instrument(skip(self))]
    pub async fn available_departments(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Department>, ApplicationError> {
        self.departments.departments_for_user(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use mockall::predicate::eq;

    use super::*;
    use crate::ports::{MockAuditLogPort, MockDepartmentStore, MockSessionStorePort};

    fn quiet_audit() -> MockAuditLogPort {
        let mut audit = MockAuditLogPort::new();
        audit.expect_log().returning(|_| Ok(()));
        audit
    }

    fn service(
        departments: MockDepartmentStore,
        sessions: MockSessionStorePort,
        audit: MockAuditLogPort,
        settings: ScopeSettings,
    ) -> DepartmentContextService {
        DepartmentContextService::new(
            Arc::new(departments),
            Arc::new(sessions),
            Arc::new(audit),
            settings,
        )
    }

    #[tokio::test]
    async fn select_stores_selection_for_member() {
        let dept = DepartmentId::new();
        let ctx = RequestContext::new(UserId::new());

        let mut departments = MockDepartmentStore::new();
        departments
            .expect_is_member()
            .with(eq(dept), eq(ctx.user_id()))
            .returning(|_, _| Ok(true));
        let mut sessions = MockSessionStorePort::new();
        sessions
            .expect_set_selection()
            .withf(move |_, d| *d == dept)
            .times(1)
            .returning(|_, _| Ok(()));

        let svc = service(departments, sessions, quiet_audit(), ScopeSettings::default());
        let context = svc.select(&ctx, dept).await.unwrap();

        assert_eq!(context.active_department(), Some(dept));
        assert!(!context.is_bypass_active());
    }

    #[tokio::test]
    async fn select_rejects_non_member_without_touching_session() {
        let dept = DepartmentId::new();
        let ctx = RequestContext::new(UserId::new());

        let mut departments = MockDepartmentStore::new();
        departments.expect_is_member().returning(|_, _| Ok(false));
        let mut sessions = MockSessionStorePort::new();
        sessions.expect_set_selection().never();
        let mut audit = MockAuditLogPort::new();
        audit
            .expect_log()
            .withf(|e| !e.success)
            .times(1)
            .returning(|_| Ok(()));

        let svc = service(departments, sessions, audit, ScopeSettings::default());
        let err = svc.select(&ctx, dept).await.unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::NotAMember { department_id, .. })
                if department_id == dept
        ));
    }

    #[tokio::test]
    async fn selecting_admin_department_activates_bypass() {
        let admin = DepartmentId::new();
        let ctx = RequestContext::new(UserId::new());

        let mut departments = MockDepartmentStore::new();
        departments.expect_is_member().returning(|_, _| Ok(true));
        let mut sessions = MockSessionStorePort::new();
        sessions.expect_set_selection().returning(|_, _| Ok(()));
        sessions
            .expect_get_selection()
            .returning(move |_| Ok(Some(admin)));

        let settings = ScopeSettings {
            admin_department: Some(admin),
            ..ScopeSettings::default()
        };
        let svc = service(departments, sessions, quiet_audit(), settings);

        assert!(svc.select(&ctx, admin).await.unwrap().is_bypass_active());
        assert!(svc.is_bypass_active(ctx.session()).await.unwrap());
    }

    #[tokio::test]
    async fn establish_without_selection_uses_missing_policy() {
        let mut sessions = MockSessionStorePort::new();
        sessions.expect_get_selection().returning(|_| Ok(None));
        let settings = ScopeSettings {
            missing_policy: MissingContextPolicy::Allow,
            ..ScopeSettings::default()
        };

        let svc = service(MockDepartmentStore::new(), sessions, quiet_audit(), settings);
        let context = svc
            .establish(&RequestContext::new(UserId::new()))
            .await
            .unwrap();

        assert!(!context.has_department());
        assert_eq!(context.missing_policy(), MissingContextPolicy::Allow);
    }

    #[tokio::test]
    async fn establish_clears_stale_selection() {
        let dept = DepartmentId::new();

        let mut departments = MockDepartmentStore::new();
        departments.expect_is_member().returning(|_, _| Ok(false));
        let mut sessions = MockSessionStorePort::new();
        sessions
            .expect_get_selection()
            .returning(move |_| Ok(Some(dept)));
        sessions
            .expect_clear()
            .times(1)
            .returning(move |_| Ok(Some(dept)));

        let svc = service(departments, sessions, quiet_audit(), ScopeSettings::default());
        let context = svc
            .establish(&RequestContext::new(UserId::new()))
            .await
            .unwrap();

        assert_eq!(context, DepartmentContext::none());
    }

    #[tokio::test]
    async fn establish_keeps_valid_selection() {
        let dept = DepartmentId::new();

        let mut departments = MockDepartmentStore::new();
        departments.expect_is_member().returning(|_, _| Ok(true));
        let mut sessions = MockSessionStorePort::new();
        sessions
            .expect_get_selection()
            .returning(move |_| Ok(Some(dept)));
        sessions.expect_clear().never();

        let svc = service(departments, sessions, quiet_audit(), ScopeSettings::default());
        let context = svc
            .establish(&RequestContext::new(UserId::new()))
            .await
            .unwrap();

        assert_eq!(context.active_department(), Some(dept));
    }

    #[tokio::test]
    async fn clear_without_selection_writes_no_audit() {
        let mut sessions = MockSessionStorePort::new();
        sessions.expect_clear().returning(|_| Ok(None));
        let mut audit = MockAuditLogPort::new();
        audit.expect_log().never();

        let svc = service(MockDepartmentStore::new(), sessions, audit, ScopeSettings::default());
        let previous = svc.clear(&RequestContext::new(UserId::new())).await.unwrap();

        assert!(previous.is_none());
    }

    #[tokio::test]
    async fn available_departments_come_from_membership() {
        let user = UserId::new();
        let labs = Department {
            id: DepartmentId::new(),
            name: "Laboratories".to_string(),
            code: "LABS".to_string(),
            created_at: Utc::now(),
        };
        let expected = vec![labs.clone()];

        let mut departments = MockDepartmentStore::new();
        departments
            .expect_departments_for_user()
            .with(eq(user))
            .returning(move |_| Ok(vec![labs.clone()]));

        let svc = service(
            departments,
            MockSessionStorePort::new(),
            quiet_audit(),
            ScopeSettings::default(),
        );

        assert_eq!(svc.available_departments(user).await.unwrap(), expected);
    }

    #[test]
    fn settings_context_carries_policy() {
        let settings = ScopeSettings {
            admin_department: None,
            missing_policy: MissingContextPolicy::Allow,
        };
        let context = settings.context_for(Some(DepartmentId::new()));
        assert_eq!(context.missing_policy(), MissingContextPolicy::Allow);
        assert!(!context.is_bypass_active());
    }
}
