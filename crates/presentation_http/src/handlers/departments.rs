//! Department administration handlers
//!
//! Every endpoint requires the admin department to be the session's
//! selection; the service refuses everything else with 403.

use application::RequestContext;
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use domain::{Department, DepartmentContext, DepartmentId, NewDepartment, UserId};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{ApiError, ErrorResponse},
    middleware::ValidatedJson,
    state::AppState,
};

/// A department as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": "0192b3f4-5c6d-7e8f-9a0b-1c2d3e4f5a6b",
    "name": "Laboratories",
    "code": "LABS",
    "created_at": "2026-02-06T10:30:00Z"
}))]
pub struct DepartmentResponse {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
}

impl From<Department> for DepartmentResponse {
    fn from(department: Department) -> Self {
        Self {
            id: department.id.as_uuid(),
            name: department.name,
            code: department.code,
            created_at: department.created_at,
        }
    }
}

/// Create department request body
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({"name": "Laboratories", "code": "LABS"}))]
pub struct CreateDepartmentRequest {
    #[validate(length(min = 1, max = 120, message = "must be 1-120 characters"))]
    pub name: String,
    /// 2-10 letters or digits, stored upper-case
    #[validate(length(min = 2, max = 10, message = "must be 2-10 characters"))]
    pub code: String,
}

/// List all departments
#[utoipa::path(
    get,
    path = "/v1/departments",
    tag = "departments",
    responses(
        (status = 200, description = "All departments", body = Vec<DepartmentResponse>),
        (status = 403, description = "Admin department not selected", body = ErrorResponse)
    ),
    security(("user_id" = []))
)]
#[instrument(skip(state, ctx, scope))]
pub async fn list_departments(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Extension(scope): Extension<DepartmentContext>,
) -> Result<Json<Vec<DepartmentResponse>>, ApiError> {
    let departments = state.department_service.list(&ctx, &scope).await?;
    Ok(Json(departments.into_iter().map(Into::into).collect()))
}

/// Create a department
#[utoipa::path(
    post,
    path = "/v1/departments",
    tag = "departments",
    request_body = CreateDepartmentRequest,
    responses(
        (status = 201, description = "Department created", body = DepartmentResponse),
        (status = 400, description = "Invalid name or code", body = ErrorResponse),
        (status = 403, description = "Admin department not selected", body = ErrorResponse),
        (status = 409, description = "Code already taken", body = ErrorResponse)
    ),
    security(("user_id" = []))
)]
#[instrument(skip(state, ctx, scope, request))]
pub async fn create_department(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Extension(scope): Extension<DepartmentContext>,
    ValidatedJson(request): ValidatedJson<CreateDepartmentRequest>,
) -> Result<(StatusCode, Json<DepartmentResponse>), ApiError> {
    let department = state
        .department_service
        .create(
            &ctx,
            &scope,
            NewDepartment {
                name: request.name,
                code: request.code,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(department.into())))
}

/// Get one department
#[utoipa::path(
    get,
    path = "/v1/departments/{id}",
    tag = "departments",
    params(("id" = Uuid, Path, description = "Department id")),
    responses(
        (status = 200, description = "The department", body = DepartmentResponse),
        (status = 403, description = "Admin department not selected", body = ErrorResponse),
        (status = 404, description = "Unknown department", body = ErrorResponse)
    ),
    security(("user_id" = []))
)]
#[instrument(skip(state, ctx, scope))]
pub async fn get_department(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Extension(scope): Extension<DepartmentContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<DepartmentResponse>, ApiError> {
    let department = state
        .department_service
        .get(&ctx, &scope, DepartmentId::from_uuid(id))
        .await?;
    Ok(Json(department.into()))
}

/// Add a user to a department
#[utoipa::path(
    post,
    path = "/v1/departments/{id}/members/{user_id}",
    tag = "departments",
    params(
        ("id" = Uuid, Path, description = "Department id"),
        ("user_id" = Uuid, Path, description = "User to add")
    ),
    responses(
        (status = 204, description = "Member added"),
        (status = 403, description = "Admin department not selected", body = ErrorResponse),
        (status = 404, description = "Unknown department", body = ErrorResponse)
    ),
    security(("user_id" = []))
)]
#[instrument(skip(state, ctx, scope))]
pub async fn add_member(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Extension(scope): Extension<DepartmentContext>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    state
        .department_service
        .add_member(
            &ctx,
            &scope,
            DepartmentId::from_uuid(id),
            UserId::from_uuid(user_id),
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Remove a user from a department
///
/// The user's current selection of this department stops working on their
/// next request.
#[utoipa::path(
    delete,
    path = "/v1/departments/{id}/members/{user_id}",
    tag = "departments",
    params(
        ("id" = Uuid, Path, description = "Department id"),
        ("user_id" = Uuid, Path, description = "User to remove")
    ),
    responses(
        (status = 204, description = "Member removed"),
        (status = 403, description = "Admin department not selected", body = ErrorResponse),
        (status = 404, description = "User was not a member", body = ErrorResponse)
    ),
    security(("user_id" = []))
)]
#[instrument(skip(state, ctx, scope))]
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Extension(scope): Extension<DepartmentContext>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    state
        .department_service
        .remove_member(
            &ctx,
            &scope,
            DepartmentId::from_uuid(id),
            UserId::from_uuid(user_id),
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Departments another user belongs to
#[utoipa::path(
    get,
    path = "/v1/users/{user_id}/departments",
    tag = "departments",
    params(("user_id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "The user's departments", body = Vec<DepartmentResponse>),
        (status = 403, description = "Admin department not selected", body = ErrorResponse)
    ),
    security(("user_id" = []))
)]
#[instrument(skip(state, ctx, scope))]
pub async fn list_user_departments(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Extension(scope): Extension<DepartmentContext>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<DepartmentResponse>>, ApiError> {
    let departments = state
        .department_service
        .departments_for_user(&ctx, &scope, UserId::from_uuid(user_id))
        .await?;
    Ok(Json(departments.into_iter().map(Into::into).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn department_response_from_entity() {
        let department = Department::create(NewDepartment {
            name: "Laboratories".to_string(),
            code: "labs".to_string(),
        })
        .unwrap();
        let id = department.id.as_uuid();

        let response = DepartmentResponse::from(department);
        assert_eq!(response.id, id);
        assert_eq!(response.code, "LABS");
    }

    #[test]
    fn create_request_validation() {
        let ok = CreateDepartmentRequest {
            name: "Library".to_string(),
            code: "LIB".to_string(),
        };
        assert!(ok.validate().is_ok());

        let short_code = CreateDepartmentRequest {
            name: "Library".to_string(),
            code: "L".to_string(),
        };
        assert!(short_code.validate().is_err());
    }
}
