//! Department scope guard
//!
//! Resolves the session's department for every scoped route and stores the
//! resulting [`DepartmentContext`] as a request extension. Under the `deny`
//! policy a request without a selected department is refused with 428.

use application::RequestContext;
use axum::{
    Extension,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use domain::{DepartmentContext, MissingContextPolicy};
use tracing::{Span, debug, field};

use crate::{error::ApiError, state::AppState};

/// Middleware establishing the caller's department context
///
/// Install with `axum::middleware::from_fn_with_state` as a route layer on
/// the scoped routes. Requires [`RequestContext`] from the identity layer.
pub async fn require_department(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let scope = state.context_service.establish(&ctx).await?;

    if requires_selection(&scope) {
        debug!("Scoped route called without a department");
        return Err(ApiError::DepartmentSelectionRequired);
    }

    if let Some(department_id) = scope.active_department() {
        Span::current().record("department_id", field::display(department_id));
    }
    req.extensions_mut().insert(scope);
    Ok(next.run(req).await)
}

fn requires_selection(scope: &DepartmentContext) -> bool {
    !scope.has_department() && scope.missing_policy() == MissingContextPolicy::Deny
}

#[cfg(test)]
mod tests {
    use application::ScopeSettings;
    use axum::{Router, body::Body, http::StatusCode, middleware, routing::get};
    use domain::{DepartmentId, UserId};
    use infrastructure::{AppConfig, AsyncDatabase};
    use tower::ServiceExt;

    use super::*;
    use crate::middleware::identity::{SESSION_ID_HEADER, USER_ID_HEADER};

    async fn state(policy: MissingContextPolicy) -> AppState {
        let db = AsyncDatabase::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        let settings = ScopeSettings {
            admin_department: None,
            missing_policy: policy,
        };
        AppState::sqlite(&db, AppConfig::default(), settings)
    }

    async fn active(Extension(scope): Extension<DepartmentContext>) -> String {
        scope
            .active_department()
            .map_or_else(|| "none".to_string(), |d| d.to_string())
    }

    fn router(state: AppState) -> Router {
        Router::new()
            .route("/scoped", get(active))
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_department,
            ))
            .layer(crate::middleware::UpstreamIdentityLayer::new())
            .with_state(state)
    }

    fn scoped_request(user: UserId) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .uri("/scoped")
            .header(USER_ID_HEADER, user.to_string())
            .header(SESSION_ID_HEADER, "guard-test")
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn only_deny_without_department_requires_selection() {
        let department = DepartmentId::new();
        assert!(requires_selection(&DepartmentContext::none()));
        assert!(!requires_selection(
            &DepartmentContext::none().with_missing_policy(MissingContextPolicy::Allow)
        ));
        assert!(!requires_selection(&DepartmentContext::for_department(
            department, None
        )));
    }

    #[tokio::test]
    async fn deny_policy_without_selection_is_428() {
        let response = router(state(MissingContextPolicy::Deny).await)
            .oneshot(scoped_request(UserId::new()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PRECONDITION_REQUIRED);
    }

    #[tokio::test]
    async fn allow_policy_passes_without_department() {
        let response = router(state(MissingContextPolicy::Allow).await)
            .oneshot(scoped_request(UserId::new()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"none");
    }
}
