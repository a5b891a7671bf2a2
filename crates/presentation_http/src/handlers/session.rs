//! Session department handlers
//!
//! Selecting, inspecting and clearing the department a session acts in.
//! These routes run without the scope guard so a session can pick its
//! first department.

use application::RequestContext;
use axum::{Extension, Json, extract::State, http::StatusCode};
use domain::{DepartmentContext, DepartmentId, MissingContextPolicy};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{ApiError, ErrorResponse},
    handlers::departments::DepartmentResponse,
    state::AppState,
};

/// Select department request body
#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({"department_id": "0192b3f4-5c6d-7e8f-9a0b-1c2d3e4f5a6b"}))]
pub struct SelectDepartmentRequest {
    pub department_id: Uuid,
}

/// The department context of the current session
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionContextResponse {
    /// Selected department, absent when none is selected
    pub department_id: Option<Uuid>,
    /// True when the admin department is selected
    pub bypass: bool,
    /// Policy applied when no department is selected
    #[schema(value_type = String, example = "deny")]
    pub missing_policy: MissingContextPolicy,
}

impl From<DepartmentContext> for SessionContextResponse {
    fn from(scope: DepartmentContext) -> Self {
        Self {
            department_id: scope.active_department().map(|d| d.as_uuid()),
            bypass: scope.is_bypass_active(),
            missing_policy: scope.missing_policy(),
        }
    }
}

/// Departments the caller may select
#[utoipa::path(
    get,
    path = "/v1/session/departments",
    tag = "session",
    responses(
        (status = 200, description = "Selectable departments", body = Vec<DepartmentResponse>),
        (status = 401, description = "No upstream identity", body = ErrorResponse)
    ),
    security(("user_id" = []))
)]
#[instrument(skip(state, ctx))]
pub async fn available_departments(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<Vec<DepartmentResponse>>, ApiError> {
    let departments = state
        .context_service
        .available_departments(ctx.user_id())
        .await?;
    Ok(Json(departments.into_iter().map(Into::into).collect()))
}

/// The session's current department context
///
/// A selection whose membership was revoked is cleared before answering.
#[utoipa::path(
    get,
    path = "/v1/session/department",
    tag = "session",
    responses(
        (status = 200, description = "Current context", body = SessionContextResponse),
        (status = 401, description = "No upstream identity", body = ErrorResponse)
    ),
    security(("user_id" = []), ("session_id" = []))
)]
#[instrument(skip(state, ctx))]
pub async fn current_department(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<SessionContextResponse>, ApiError> {
    let scope = state.context_service.establish(&ctx).await?;
    Ok(Json(scope.into()))
}

/// Select the department the session acts in
#[utoipa::path(
    put,
    path = "/v1/session/department",
    tag = "session",
    request_body = SelectDepartmentRequest,
    responses(
        (status = 200, description = "Department selected", body = SessionContextResponse),
        (status = 403, description = "Caller is not a member", body = ErrorResponse)
    ),
    security(("user_id" = []), ("session_id" = []))
)]
#[instrument(skip(state, ctx, request))]
pub async fn select_department(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Json(request): Json<SelectDepartmentRequest>,
) -> Result<Json<SessionContextResponse>, ApiError> {
    let scope = state
        .context_service
        .select(&ctx, DepartmentId::from_uuid(request.department_id))
        .await?;
    Ok(Json(scope.into()))
}

/// Clear the session's selection
#[utoipa::path(
    delete,
    path = "/v1/session/department",
    tag = "session",
    responses((status = 204, description = "Selection cleared")),
    security(("user_id" = []), ("session_id" = []))
)]
#[instrument(skip(state, ctx))]
pub async fn clear_department(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<StatusCode, ApiError> {
    state.context_service.clear(&ctx).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_response_reports_bypass() {
        let admin = DepartmentId::new();
        let response = SessionContextResponse::from(DepartmentContext::for_department(
            admin,
            Some(admin),
        ));
        assert_eq!(response.department_id, Some(admin.as_uuid()));
        assert!(response.bypass);
    }

    #[test]
    fn empty_context_serializes_policy() {
        let response = SessionContextResponse::from(DepartmentContext::none());
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["department_id"], serde_json::Value::Null);
        assert_eq!(json["missing_policy"], "deny");
    }
}
