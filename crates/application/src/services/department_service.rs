//! Department Service - Department and membership administration
//!
//! Every operation except the startup bootstrap requires the admin bypass.

use std::sync::Arc;

use domain::{
    AuditBuilder, AuditEntry, AuditEventType, Department, DepartmentContext, DepartmentId,
    NewDepartment, UserId,
};
use tracing::{info, instrument, warn};

use crate::{
    error::ApplicationError,
    ports::{AuditLogPort, DepartmentStore},
    request_context::RequestContext,
};

/// Service for department administration
pub struct DepartmentService {
    departments: Arc<dyn DepartmentStore>,
    audit_log: Arc<dyn AuditLogPort>,
}

impl std::fmt::Debug for DepartmentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DepartmentService").finish_non_exhaustive()
    }
}

impl DepartmentService {
    pub fn new(departments: Arc<dyn DepartmentStore>, audit_log: Arc<dyn AuditLogPort>) -> Self {
        Self {
            departments,
            audit_log,
        }
    }

    /// Make sure the admin department exists and has the given members
    ///
    /// Runs at startup, before any session exists.
    #[instrument(skip(self, members))]
    pub async fn ensure_admin_department(
        &self,
        code: &str,
        name: &str,
        members: &[UserId],
    ) -> Result<Department, ApplicationError> {
        let code = code.trim().to_ascii_uppercase();
        let department = match self.departments.get_by_code(&code).await? {
            Some(existing) => existing,
            None => {
                let department = Department::create(NewDepartment {
                    name: name.to_string(),
                    code,
                })?;
                self.departments.create(&department).await?;
                self.audit_log
                    .log(
                        &AuditEntry::success(AuditEventType::Administration, "create_department")
                            .with_actor("system")
                            .with_resource("department", department.id.to_string())
                            .with_details(&department.code),
                    )
                    .await?;
                info!(code = %department.code, "Admin department created");
                department
            },
        };

        for member in members {
            self.departments.add_member(department.id, *member).await?;
        }
        Ok(department)
    }

    #[instrument(skip(self, ctx, scope, input), fields(user_id = %ctx.user_id()))]
    pub async fn create(
        &self,
        ctx: &RequestContext,
        scope: &DepartmentContext,
        input: NewDepartment,
    ) -> Result<Department, ApplicationError> {
        self.require_bypass(ctx, scope, "create_department").await?;

        let department = Department::create(input)?;
        if self.departments.get_by_code(&department.code).await?.is_some() {
            return Err(ApplicationError::Conflict(format!(
                "department code {} is taken",
                department.code
            )));
        }
        self.departments.create(&department).await?;
        info!(code = %department.code, "Department created");

        self.audit_log
            .log(
                &AuditBuilder::department_created(ctx.user_id(), department.id, &department.code)
                    .with_department(scope.active_department())
                    .with_request_id(ctx.request_id()),
            )
            .await?;
        Ok(department)
    }

    #[instrument(skip(self, ctx, scope))]
    pub async fn get(
        &self,
        ctx: &RequestContext,
        scope: &DepartmentContext,
        id: DepartmentId,
    ) -> Result<Department, ApplicationError> {
        self.require_bypass(ctx, scope, "get_department").await?;
        self.departments
            .get(id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound(format!("department {id}")))
    }

    #[instrument(skip(self, ctx, scope))]
    pub async fn list(
        &self,
        ctx: &RequestContext,
        scope: &DepartmentContext,
    ) -> Result<Vec<Department>, ApplicationError> {
        self.require_bypass(ctx, scope, "list_departments").await?;
        self.departments.list().await
    }

    #[instrument(skip(self, ctx, scope), fields(user_id = %ctx.user_id()))]
    pub async fn add_member(
        &self,
        ctx: &RequestContext,
        scope: &DepartmentContext,
        department_id: DepartmentId,
        member: UserId,
    ) -> Result<(), ApplicationError> {
        self.require_bypass(ctx, scope, "add_member").await?;
        self.get(ctx, scope, department_id).await?;

        self.departments.add_member(department_id, member).await?;
        info!(%department_id, %member, "Member added");
        self.audit_log
            .log(
                &AuditBuilder::member_added(ctx.user_id(), department_id, member)
                    .with_department(scope.active_department())
                    .with_request_id(ctx.request_id()),
            )
            .await
    }

    /// Returns `NotFound` if the user was not a member
    #[instrument(skip(self, ctx, scope), fields(user_id = %ctx.user_id()))]
    pub async fn remove_member(
        &self,
        ctx: &RequestContext,
        scope: &DepartmentContext,
        department_id: DepartmentId,
        member: UserId,
    ) -> Result<(), ApplicationError> {
        self.require_bypass(ctx, scope, "remove_member").await?;

        if !self.departments.remove_member(department_id, member).await? {
            return Err(ApplicationError::NotFound(format!(
                "membership of {member} in {department_id}"
            )));
        }
        info!(%department_id, %member, "Member removed");
        self.audit_log
            .log(
                &AuditBuilder::member_removed(ctx.user_id(), department_id, member)
                    .with_department(scope.active_department())
                    .with_request_id(ctx.request_id()),
            )
            .await
    }

    /// Departments another user belongs to
    #[instrument(skip(self, ctx, scope))]
    pub async fn departments_for_user(
        &self,
        ctx: &RequestContext,
        scope: &DepartmentContext,
        user_id: UserId,
    ) -> Result<Vec<Department>, ApplicationError> {
        self.require_bypass(ctx, scope, "list_user_departments").await?;
        self.departments.departments_for_user(user_id).await
    }

    async fn require_bypass(
        &self,
        ctx: &RequestContext,
        scope: &DepartmentContext,
        action: &str,
    ) -> Result<(), ApplicationError> {
        if scope.is_bypass_active() {
            return Ok(());
        }
        warn!(action, "Admin operation without admin department");
        self.audit_log
            .log(
                &AuditBuilder::admin_required(ctx.user_id(), scope.active_department(), action)
                    .with_request_id(ctx.request_id()),
            )
            .await?;
        Err(ApplicationError::NotAuthorized(
            "the admin department must be selected".to_string(),
        ))
    }
}
