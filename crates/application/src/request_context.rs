//! Request context for propagating caller identity and request metadata
//!
//! A `RequestContext` is built by the HTTP layer from the upstream
//! authenticator's headers and passed to every service method that records
//! who did something.
//!
//! # Examples
//!
//! ```
//! use application::RequestContext;
//! use domain::UserId;
//!
//! let user_id = UserId::new();
//! let ctx = RequestContext::new(user_id);
//!
//! assert_eq!(ctx.user_id(), user_id);
//! assert_eq!(ctx.session().as_str(), user_id.to_string());
//! ```

use chrono::{DateTime, Utc};
use domain::UserId;
use uuid::Uuid;

use crate::ports::SessionKey;

/// Caller identity and metadata for a single request
#[derive(Debug, Clone)]
pub struct RequestContext {
    user_id: UserId,
    session: SessionKey,
    request_id: Uuid,
    timestamp: DateTime<Utc>,
}

impl RequestContext {
    /// Context for `user_id`, whose session key is the user id itself
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            session: SessionKey::for_user(user_id),
            request_id: Uuid::new_v4(),
            timestamp: Utc::now(),
        }
    }

    /// Use an explicit session key
    #[must_use]
    pub fn with_session(mut self, session: SessionKey) -> Self {
        self.session = session;
        self
    }

    /// Correlate with an upstream request id
    ///
    /// ```
    /// use application::RequestContext;
    /// use domain::UserId;
    /// use uuid::Uuid;
    ///
    /// let request_id = Uuid::new_v4();
    /// let ctx = RequestContext::new(UserId::new()).with_request_id(request_id);
    /// assert_eq!(ctx.request_id(), request_id);
    /// ```
    #[must_use]
    pub const fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub const fn session(&self) -> &SessionKey {
        &self.session
    }

    #[must_use]
    pub const fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// When the request was received
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_creates_unique_request_id() {
        let user_id = UserId::new();
        let ctx1 = RequestContext::new(user_id);
        let ctx2 = RequestContext::new(user_id);

        assert_ne!(ctx1.request_id(), ctx2.request_id());
    }

    #[test]
    fn new_captures_current_timestamp() {
        let before = Utc::now();
        let ctx = RequestContext::new(UserId::new());
        let after = Utc::now();

        assert!(ctx.timestamp() >= before);
        assert!(ctx.timestamp() <= after);
    }

    #[test]
    fn explicit_session_overrides_user_session() {
        let session = SessionKey::parse("browser-tab-1").unwrap();
        let ctx = RequestContext::new(UserId::new()).with_session(session.clone());

        assert_eq!(ctx.session(), &session);
    }

    #[test]
    fn debug_format_contains_fields() {
        let ctx = RequestContext::new(UserId::new());
        let debug = format!("{ctx:?}");

        assert!(debug.contains("RequestContext"));
        assert!(debug.contains("user_id"));
        assert!(debug.contains("request_id"));
        assert!(debug.contains("session"));
    }
}
