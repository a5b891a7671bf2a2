//! Sharing handlers
//!
//! Buildings, categories and assets can be shared with further departments.
//! The sharing set is always replaced as a whole.

use application::RequestContext;
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use domain::{DepartmentContext, DepartmentId, RecordId};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{ApiError, ErrorResponse},
    handlers::inventory::resolve_kind,
    state::AppState,
};

/// Replacement sharing set
#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({"departments": ["0192b3f4-5c6d-7e8f-9a0b-1c2d3e4f5a6b"]}))]
pub struct SyncSharesRequest {
    /// Departments the record is shared with; an empty list removes all shares
    pub departments: Vec<Uuid>,
}

/// The sharing set of one record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SharesResponse {
    pub id: Uuid,
    pub departments: Vec<Uuid>,
}

impl SharesResponse {
    fn new(id: RecordId, departments: &[DepartmentId]) -> Self {
        Self {
            id: id.as_uuid(),
            departments: departments.iter().map(DepartmentId::as_uuid).collect(),
        }
    }
}

/// Departments a visible record is shared with
#[utoipa::path(
    get,
    path = "/v1/{collection}/{id}/shares",
    tag = "sharing",
    params(
        ("collection" = String, Path, description = "buildings, categories or assets"),
        ("id" = Uuid, Path, description = "Record id")
    ),
    responses(
        (status = 200, description = "Current sharing set", body = SharesResponse),
        (status = 400, description = "Collection cannot be shared", body = ErrorResponse),
        (status = 404, description = "Missing or out of scope", body = ErrorResponse)
    ),
    security(("user_id" = []), ("session_id" = []))
)]
#[instrument(skip(state, scope))]
pub async fn list_shares(
    State(state): State<AppState>,
    Extension(scope): Extension<DepartmentContext>,
    Path((collection, id)): Path<(String, Uuid)>,
) -> Result<Json<SharesResponse>, ApiError> {
    let kind = resolve_kind(&collection)?;
    let id = RecordId::from_uuid(id);
    let departments = state.sharing_service.list_shares(kind, id, &scope).await?;
    Ok(Json(SharesResponse::new(id, &departments)))
}

/// Replace the sharing set of a visible record
#[utoipa::path(
    put,
    path = "/v1/{collection}/{id}/shares",
    tag = "sharing",
    params(
        ("collection" = String, Path, description = "buildings, categories or assets"),
        ("id" = Uuid, Path, description = "Record id")
    ),
    request_body = SyncSharesRequest,
    responses(
        (status = 200, description = "Stored sharing set", body = SharesResponse),
        (status = 400, description = "Collection cannot be shared", body = ErrorResponse),
        (status = 403, description = "Not the owning department", body = ErrorResponse),
        (status = 404, description = "Record or department not found", body = ErrorResponse)
    ),
    security(("user_id" = []), ("session_id" = []))
)]
#[instrument(skip(state, ctx, scope, request))]
pub async fn sync_shares(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Extension(scope): Extension<DepartmentContext>,
    Path((collection, id)): Path<(String, Uuid)>,
    Json(request): Json<SyncSharesRequest>,
) -> Result<Json<SharesResponse>, ApiError> {
    let kind = resolve_kind(&collection)?;
    let id = RecordId::from_uuid(id);
    let departments = request
        .departments
        .into_iter()
        .map(DepartmentId::from_uuid)
        .collect();
    let stored = state
        .sharing_service
        .sync_shares(&ctx, kind, id, departments, &scope)
        .await?;
    Ok(Json(SharesResponse::new(id, &stored)))
}
