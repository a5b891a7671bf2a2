//! Upstream identity middleware
//!
//! Authentication happens in front of this service. The authenticator
//! forwards the user in `X-User-Id` and, optionally, the browser session in
//! `X-Session-Id`. This layer turns both into a [`RequestContext`] request
//! extension; requests without a valid user are rejected with 401.

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use application::{RequestContext, ports::SessionKey};
use axum::{
    extract::Request,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use domain::UserId;
use tower::{Layer, Service};
use tracing::{Span, debug, field};

use crate::{error::ApiError, middleware::RequestId};

/// Header carrying the authenticated user id
pub const USER_ID_HEADER: &str = "X-User-Id";

/// Header carrying the client session key
pub const SESSION_ID_HEADER: &str = "X-Session-Id";

/// Layer that requires an upstream-authenticated user
#[derive(Clone, Debug)]
pub struct UpstreamIdentityLayer {
    /// Path prefixes served without a user
    public_paths: Vec<String>,
}

impl Default for UpstreamIdentityLayer {
    fn default() -> Self {
        Self {
            public_paths: vec![
                "/health".to_string(),
                "/ready".to_string(),
                "/swagger-ui".to_string(),
                "/api-docs".to_string(),
                "/redoc".to_string(),
            ],
        }
    }
}

impl UpstreamIdentityLayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add paths that should be served without a user
    #[must_use]
    pub fn public_paths(mut self, paths: Vec<String>) -> Self {
        self.public_paths.extend(paths);
        self
    }
}

impl<S> Layer<S> for UpstreamIdentityLayer {
    type Service = UpstreamIdentity<S>;

    fn layer(&self, inner: S) -> Self::Service {
        UpstreamIdentity {
            inner,
            public_paths: self.public_paths.clone(),
        }
    }
}

/// Middleware service resolving the caller's identity
#[derive(Clone, Debug)]
pub struct UpstreamIdentity<S> {
    inner: S,
    public_paths: Vec<String>,
}

impl<S> Service<Request> for UpstreamIdentity<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let public_paths = self.public_paths.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let path = req.uri().path();
            if public_paths.iter().any(|p| path.starts_with(p.as_str())) {
                return inner.call(req).await;
            }

            let request_id = req.extensions().get::<RequestId>().map(RequestId::as_uuid);
            match request_context(req.headers(), request_id) {
                Ok(ctx) => {
                    Span::current().record("user_id", field::display(ctx.user_id()));
                    debug!(session = %ctx.session(), "Caller identified");
                    req.extensions_mut().insert(ctx);
                    inner.call(req).await
                },
                Err(err) => Ok(err.into_response()),
            }
        })
    }
}

/// Build the caller's context from the forwarded headers
///
/// Without `X-Session-Id` the user id doubles as the session key.
pub fn request_context(
    headers: &HeaderMap,
    request_id: Option<uuid::Uuid>,
) -> Result<RequestContext, ApiError> {
    let raw_user = headers
        .get(USER_ID_HEADER)
        .ok_or_else(|| ApiError::Unauthorized(format!("Missing {USER_ID_HEADER} header")))?
        .to_str()
        .map_err(|_| ApiError::Unauthorized(format!("Malformed {USER_ID_HEADER} header")))?;
    let user_id = UserId::parse(raw_user.trim())
        .map_err(|_| ApiError::Unauthorized(format!("Malformed {USER_ID_HEADER} header")))?;

    let mut ctx = RequestContext::new(user_id);
    if let Some(raw_session) = headers.get(SESSION_ID_HEADER) {
        let raw_session = raw_session
            .to_str()
            .map_err(|_| ApiError::BadRequest(format!("Malformed {SESSION_ID_HEADER} header")))?;
        let session = SessionKey::parse(raw_session)
            .map_err(|e| ApiError::BadRequest(format!("{SESSION_ID_HEADER}: {e}")))?;
        ctx = ctx.with_session(session);
    }
    if let Some(request_id) = request_id {
        ctx = ctx.with_request_id(request_id);
    }
    Ok(ctx)
}

#[cfg(test)]
mod tests {
    use axum::{Extension, Router, body::Body, http::StatusCode, routing::get};
    use tower::ServiceExt;

    use super::*;

    async fn whoami(Extension(ctx): Extension<RequestContext>) -> String {
        format!("{} {}", ctx.user_id(), ctx.session())
    }

    fn router() -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .route("/health", get(|| async { "ok" }))
            .layer(UpstreamIdentityLayer::new())
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn missing_user_is_unauthorized() {
        let response = router()
            .oneshot(Request::builder().uri("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn malformed_user_is_unauthorized() {
        let response = router()
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header(USER_ID_HEADER, "alice")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn session_defaults_to_user() {
        let user = UserId::new();
        let response = router()
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header(USER_ID_HEADER, user.to_string())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, format!("{user} {user}"));
    }

    #[tokio::test]
    async fn explicit_session_is_used() {
        let user = UserId::new();
        let response = router()
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header(USER_ID_HEADER, user.to_string())
                    .header(SESSION_ID_HEADER, "tab-7")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(body_text(response).await, format!("{user} tab-7"));
    }

    #[tokio::test]
    async fn public_paths_skip_identity() {
        let response = router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn request_id_is_propagated() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, UserId::new().to_string().parse().unwrap());
        let id = uuid::Uuid::new_v4();

        let ctx = request_context(&headers, Some(id)).unwrap();
        assert_eq!(ctx.request_id(), id);
    }
}
