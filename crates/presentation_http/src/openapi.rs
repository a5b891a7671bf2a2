//! OpenAPI documentation module
//!
//! Provides OpenAPI 3.0 documentation for the inventory HTTP API.
//! Includes Swagger UI and ReDoc for interactive API exploration.

// Allow clippy warnings from macro-generated code in utoipa derive
#![allow(clippy::needless_for_each)]

use axum::{Router, response::Html, routing::get};
use chrono::{DateTime, Utc};
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable as RedocServable};
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use crate::{handlers, state::AppState};

/// OpenAPI documentation for the inventory API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Campus Inventory API",
        version = "0.1.0",
        description = "Department-scoped university asset inventory",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    tags(
        (name = "health", description = "Health check and readiness endpoints"),
        (name = "session", description = "Department selection of the current session"),
        (name = "inventory", description = "Department-scoped inventory records"),
        (name = "sharing", description = "Sharing buildings, categories and assets"),
        (name = "departments", description = "Department administration")
    ),
    paths(
        // Health endpoints
        handlers::health::health_check,
        handlers::health::readiness_check,
        // Session endpoints
        handlers::session::available_departments,
        handlers::session::current_department,
        handlers::session::select_department,
        handlers::session::clear_department,
        // Inventory endpoints
        handlers::inventory::list_records,
        handlers::inventory::create_record,
        handlers::inventory::get_record,
        handlers::inventory::transfer_record,
        handlers::statistics::statistics,
        // Sharing endpoints
        handlers::sharing::list_shares,
        handlers::sharing::sync_shares,
        // Department endpoints
        handlers::departments::list_departments,
        handlers::departments::create_department,
        handlers::departments::get_department,
        handlers::departments::add_member,
        handlers::departments::remove_member,
        handlers::departments::list_user_departments,
    ),
    components(
        schemas(
            handlers::health::HealthResponse,
            handlers::health::ReadinessResponse,
            handlers::health::DatabaseStatus,
            handlers::session::SelectDepartmentRequest,
            handlers::session::SessionContextResponse,
            handlers::inventory::ListQuery,
            handlers::inventory::PageResponse,
            handlers::inventory::TransferRequest,
            handlers::statistics::StatisticsResponse,
            handlers::sharing::SyncSharesRequest,
            handlers::sharing::SharesResponse,
            handlers::departments::DepartmentResponse,
            handlers::departments::CreateDepartmentRequest,
            crate::error::ErrorResponse,
            // Inventory record shapes (inline re-definitions for OpenAPI)
            InventoryRecordSchema,
            NewRecordSchema,
        )
    ),
    security(
        ("user_id" = []),
        ("session_id" = [])
    ),
    modifiers(&SecurityAddon)
)]
#[derive(Debug)]
pub struct ApiDoc;

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};

            use crate::middleware::{SESSION_ID_HEADER, USER_ID_HEADER};

            components.add_security_scheme(
                "user_id",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    USER_ID_HEADER,
                    "User id forwarded by the authenticating proxy",
                ))),
            );
            components.add_security_scheme(
                "session_id",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    SESSION_ID_HEADER,
                    "Client session key; defaults to the user id",
                ))),
            );
        }
    }
}

/// Fields shared by every inventory record, for OpenAPI
///
/// Kind-specific fields (`code`, `room_id`, `title`, ...) follow these.
#[derive(Debug, utoipa::ToSchema)]
#[schema(example = json!({
    "kind": "asset",
    "id": "0192b3f4-6a7b-7c8d-9e0f-1a2b3c4d5e6f",
    "name": "Oscilloscope",
    "code": "LABS-COMP-2026-0001",
    "room_id": "0192b3f4-5c6d-7e8f-9a0b-1c2d3e4f5a6b",
    "department_id": "0192b3f4-7d8e-7f90-a1b2-c3d4e5f6a7b8",
    "created_at": "2026-02-06T10:30:00Z"
}))]
#[allow(dead_code)]
pub struct InventoryRecordSchema {
    /// Singular record kind (`asset`, `sub_category`, ...)
    kind: String,
    id: Uuid,
    /// Owning department, absent for unowned records
    department_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

/// Record creation body for OpenAPI; accepted fields depend on the collection
#[derive(Debug, utoipa::ToSchema)]
#[schema(example = json!({
    "name": "Oscilloscope",
    "category_id": "0192b3f4-5c6d-7e8f-9a0b-1c2d3e4f5a6b",
    "room_id": "0192b3f4-6a7b-7c8d-9e0f-1a2b3c4d5e6f"
}))]
#[allow(dead_code)]
pub struct NewRecordSchema {
    /// Required for every collection except news
    name: Option<String>,
    /// News headline
    title: Option<String>,
    /// News text
    body: Option<String>,
    /// Building code, or category code used as asset code prefix
    code: Option<String>,
    location_id: Option<Uuid>,
    building_id: Option<Uuid>,
    level_id: Option<Uuid>,
    room_id: Option<Uuid>,
    category_id: Option<Uuid>,
    sub_category_id: Option<Uuid>,
    /// Owner; defaults to the selected department
    department_id: Option<Uuid>,
}

/// Create OpenAPI documentation routes
///
/// Adds the following routes:
/// - `/api-docs/openapi.json` - OpenAPI specification (used by Swagger UI)
/// - `/swagger-ui/*` - Swagger UI interactive documentation
/// - `/redoc` - ReDoc documentation
pub fn create_openapi_routes() -> Router<AppState> {
    let redoc = Redoc::with_url("/api-docs/openapi.json", ApiDoc::openapi());

    Router::new()
        .route("/redoc", get(|| async move { Html(redoc.to_html()) }))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_spec_is_valid() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_string_pretty(&doc).expect("Failed to serialize OpenAPI document");
        assert!(json.contains("Campus Inventory API"));
        assert!(json.contains("/health"));
        assert!(json.contains("/v1/session/department"));
        assert!(json.contains("/v1/{collection}/{id}/shares"));
    }

    #[test]
    fn openapi_has_all_tags() {
        let doc = ApiDoc::openapi();
        let tags: Vec<&str> = doc
            .tags
            .as_ref()
            .map(|t| t.iter().map(|tag| tag.name.as_str()).collect())
            .unwrap_or_default();

        for tag in ["health", "session", "inventory", "sharing", "departments"] {
            assert!(tags.contains(&tag), "missing tag {tag}");
        }
    }

    #[test]
    fn openapi_has_security_schemes() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("Missing components");
        let schemes = components.security_schemes;

        assert!(schemes.contains_key("user_id"));
        assert!(schemes.contains_key("session_id"));
    }
}
