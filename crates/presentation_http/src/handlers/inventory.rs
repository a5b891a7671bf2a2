//! Scoped inventory handlers
//!
//! One set of endpoints serves every record kind; the first path segment
//! names the collection (`buildings`, `assets`, ...). Records outside the
//! caller's department scope are reported as missing.

use application::{Pagination, RequestContext};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use domain::{
    DepartmentContext, DepartmentId, DomainError, InventoryItem, NewInventoryItem, RecordId,
    ScopedEntityKind,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    error::{ApiError, ErrorResponse},
    openapi::{InventoryRecordSchema, NewRecordSchema},
    state::AppState,
};

/// Resolve a collection path segment; unknown collections are 404
pub(crate) fn resolve_kind(collection: &str) -> Result<ScopedEntityKind, ApiError> {
    ScopedEntityKind::from_collection(collection).map_err(|e| match e {
        DomainError::UnknownKind(_) => ApiError::NotFound(format!("collection {collection}")),
        other => other.into(),
    })
}

/// List query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListQuery {
    /// Records to skip (default: 0)
    pub offset: Option<u32>,
    /// Maximum number of records, at most 200 (default: 50)
    pub limit: Option<u32>,
}

impl ListQuery {
    fn pagination(&self) -> Pagination {
        let default = Pagination::default();
        Pagination::new(
            self.offset.unwrap_or(default.offset),
            self.limit.unwrap_or(default.limit),
        )
    }
}

/// One page of visible records
#[derive(Debug, Serialize, ToSchema)]
pub struct PageResponse {
    #[schema(value_type = Vec<InventoryRecordSchema>)]
    pub items: Vec<InventoryItem>,
    /// Visible records in the whole collection
    pub total: u64,
    pub offset: u32,
    pub limit: u32,
}

/// Ownership transfer request body
#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({"department_id": "0192b3f4-5c6d-7e8f-9a0b-1c2d3e4f5a6b"}))]
pub struct TransferRequest {
    /// New owner; `null` leaves the record without an owner
    pub department_id: Option<Uuid>,
}

/// List visible records of a collection
#[utoipa::path(
    get,
    path = "/v1/{collection}",
    tag = "inventory",
    params(
        ("collection" = String, Path, description = "Collection, e.g. assets"),
        ListQuery
    ),
    responses(
        (status = 200, description = "Visible records, oldest first", body = PageResponse),
        (status = 404, description = "Unknown collection", body = ErrorResponse),
        (status = 428, description = "No department selected", body = ErrorResponse)
    ),
    security(("user_id" = []), ("session_id" = []))
)]
#[instrument(skip(state, scope))]
pub async fn list_records(
    State(state): State<AppState>,
    Extension(scope): Extension<DepartmentContext>,
    Path(collection): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PageResponse>, ApiError> {
    let kind = resolve_kind(&collection)?;
    let page = state
        .inventory_service
        .list(kind, &scope, query.pagination())
        .await?;

    Ok(Json(PageResponse {
        items: page.items,
        total: page.total,
        offset: page.offset,
        limit: page.limit,
    }))
}

/// Create a record in a collection
///
/// Without an explicit `department_id` the record is owned by the selected
/// department.
#[utoipa::path(
    post,
    path = "/v1/{collection}",
    tag = "inventory",
    params(("collection" = String, Path, description = "Collection, e.g. assets")),
    request_body = NewRecordSchema,
    responses(
        (status = 201, description = "Record created", body = InventoryRecordSchema),
        (status = 400, description = "Invalid record", body = ErrorResponse),
        (status = 404, description = "Unknown collection, owner or parent", body = ErrorResponse),
        (status = 428, description = "No department selected", body = ErrorResponse)
    ),
    security(("user_id" = []), ("session_id" = []))
)]
#[instrument(skip(state, ctx, scope, body))]
pub async fn create_record(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Extension(scope): Extension<DepartmentContext>,
    Path(collection): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<InventoryItem>), ApiError> {
    let kind = resolve_kind(&collection)?;
    let input = NewInventoryItem::from_json(kind, body)?;
    let item = state.inventory_service.create(&ctx, &scope, input).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Get one visible record
#[utoipa::path(
    get,
    path = "/v1/{collection}/{id}",
    tag = "inventory",
    params(
        ("collection" = String, Path, description = "Collection, e.g. assets"),
        ("id" = Uuid, Path, description = "Record id")
    ),
    responses(
        (status = 200, description = "The record", body = InventoryRecordSchema),
        (status = 404, description = "Missing or out of scope", body = ErrorResponse),
        (status = 428, description = "No department selected", body = ErrorResponse)
    ),
    security(("user_id" = []), ("session_id" = []))
)]
#[instrument(skip(state, scope))]
pub async fn get_record(
    State(state): State<AppState>,
    Extension(scope): Extension<DepartmentContext>,
    Path((collection, id)): Path<(String, Uuid)>,
) -> Result<Json<InventoryItem>, ApiError> {
    let kind = resolve_kind(&collection)?;
    let item = state
        .inventory_service
        .get(kind, RecordId::from_uuid(id), &scope)
        .await?;
    Ok(Json(item))
}

/// Move a visible record to another department
#[utoipa::path(
    put,
    path = "/v1/{collection}/{id}/department",
    tag = "inventory",
    params(
        ("collection" = String, Path, description = "Collection, e.g. assets"),
        ("id" = Uuid, Path, description = "Record id")
    ),
    request_body = TransferRequest,
    responses(
        (status = 200, description = "Record with its new owner", body = InventoryRecordSchema),
        (status = 403, description = "Not the owning department", body = ErrorResponse),
        (status = 404, description = "Record or department not found", body = ErrorResponse),
        (status = 428, description = "No department selected", body = ErrorResponse)
    ),
    security(("user_id" = []), ("session_id" = []))
)]
#[instrument(skip(state, ctx, scope, request))]
pub async fn transfer_record(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Extension(scope): Extension<DepartmentContext>,
    Path((collection, id)): Path<(String, Uuid)>,
    Json(request): Json<TransferRequest>,
) -> Result<Json<InventoryItem>, ApiError> {
    let kind = resolve_kind(&collection)?;
    let item = state
        .inventory_service
        .transfer(
            &ctx,
            kind,
            RecordId::from_uuid(id),
            request.department_id.map(DepartmentId::from_uuid),
            &scope,
        )
        .await?;
    Ok(Json(item))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_collections_resolve() {
        assert_eq!(resolve_kind("assets").unwrap(), ScopedEntityKind::Asset);
        assert_eq!(
            resolve_kind("sub-categories").unwrap(),
            ScopedEntityKind::SubCategory
        );
    }

    #[test]
    fn unknown_collection_is_not_found() {
        let err = resolve_kind("printers").unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn list_query_clamps_limit() {
        let query = ListQuery {
            offset: Some(10),
            limit: Some(10_000),
        };
        let pagination = query.pagination();
        assert_eq!(pagination.offset, 10);
        assert_eq!(pagination.limit, application::MAX_PAGE_SIZE);

        assert_eq!(ListQuery::default().pagination(), Pagination::default());
    }
}
