//! Port for per-session department selections
//!
//! Selections live only as long as the session; they are never written to
//! the inventory database.

use std::fmt;

use async_trait::async_trait;
use domain::{DepartmentId, DomainError, UserId};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

const MAX_SESSION_KEY_LEN: usize = 128;

/// Opaque key identifying one client session
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey(String);

impl SessionKey {
    /// Parse a key supplied by the client
    ///
    /// Keys are 1-128 visible ASCII characters.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let raw = raw.trim();
        if raw.is_empty() || raw.len() > MAX_SESSION_KEY_LEN {
            return Err(DomainError::ValidationError(format!(
                "session key must be 1-{MAX_SESSION_KEY_LEN} characters"
            )));
        }
        if !raw.chars().all(|c| c.is_ascii_graphic()) {
            return Err(DomainError::ValidationError(
                "session key must be visible ASCII".to_string(),
            ));
        }
        Ok(Self(raw.to_string()))
    }

    /// The default session of a user that sent no session key
    pub fn for_user(user_id: UserId) -> Self {
        Self(user_id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Port for the session store holding the selected department
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SessionStorePort: Send + Sync {
    /// The department selected in `session`
    async fn get_selection(
        &self,
        session: &SessionKey,
    ) -> Result<Option<DepartmentId>, ApplicationError>;

    /// Store the selection, replacing any previous one
    async fn set_selection(
        &self,
        session: &SessionKey,
        department_id: DepartmentId,
    ) -> Result<(), ApplicationError>;

    /// Drop the selection, returning what was selected
    async fn clear(&self, session: &SessionKey) -> Result<Option<DepartmentId>, ApplicationError>;
}
