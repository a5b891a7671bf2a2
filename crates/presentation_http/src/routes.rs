//! Route definitions

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::{
    handlers,
    middleware::{RequestIdLayer, UpstreamIdentityLayer, require_department},
    openapi,
    state::AppState,
};

/// Create the main router with all routes
///
/// Layers, from the outside in: request id, upstream identity (skipped for
/// health and docs), and the department guard on scoped routes.
pub fn create_router(state: AppState) -> Router {
    // Everything that reads or writes inventory needs a department context
    let scoped = Router::new()
        .route("/v1/statistics", get(handlers::statistics::statistics))
        // Department administration (admin department only)
        .route(
            "/v1/departments",
            get(handlers::departments::list_departments)
                .post(handlers::departments::create_department),
        )
        .route("/v1/departments/{id}", get(handlers::departments::get_department))
        .route(
            "/v1/departments/{id}/members/{user_id}",
            post(handlers::departments::add_member)
                .delete(handlers::departments::remove_member),
        )
        .route(
            "/v1/users/{user_id}/departments",
            get(handlers::departments::list_user_departments),
        )
        // Inventory collections
        .route(
            "/v1/{collection}",
            get(handlers::inventory::list_records).post(handlers::inventory::create_record),
        )
        .route("/v1/{collection}/{id}", get(handlers::inventory::get_record))
        .route(
            "/v1/{collection}/{id}/department",
            put(handlers::inventory::transfer_record),
        )
        .route(
            "/v1/{collection}/{id}/shares",
            get(handlers::sharing::list_shares).put(handlers::sharing::sync_shares),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_department,
        ));

    // Session routes pick the department, so they run unguarded
    let session = Router::new()
        .route(
            "/v1/session/departments",
            get(handlers::session::available_departments),
        )
        .route(
            "/v1/session/department",
            get(handlers::session::current_department)
                .put(handlers::session::select_department)
                .delete(handlers::session::clear_department),
        );

    let api = session.merge(scoped).layer(UpstreamIdentityLayer::new());

    Router::new()
        // Health and status endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .merge(api)
        .merge(openapi::create_openapi_routes())
        .layer(RequestIdLayer::new())
        .with_state(state)
}
