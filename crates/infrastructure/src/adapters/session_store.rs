//! In-memory session store adapter
//!
//! Keeps the selected department per session in process memory. Selections
//! are lost on restart, which ends every session's context.

use std::{collections::HashMap, sync::Arc};

use application::{
    error::ApplicationError,
    ports::{SessionKey, SessionStorePort},
};
use async_trait::async_trait;
use domain::DepartmentId;
use parking_lot::RwLock;
use tracing::debug;

/// Process-local implementation of [`SessionStorePort`]
///
/// Concurrent selections for one session resolve as last write wins.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    selections: Arc<RwLock<HashMap<SessionKey, DepartmentId>>>,
}

impl InMemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions with a selection
    #[must_use]
    pub fn len(&self) -> usize {
        self.selections.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selections.read().is_empty()
    }
}

#[async_trait]
impl SessionStorePort for InMemorySessionStore {
    async fn get_selection(
        &self,
        session: &SessionKey,
    ) -> Result<Option<DepartmentId>, ApplicationError> {
        Ok(self.selections.read().get(session).copied())
    }

    async fn set_selection(
        &self,
        session: &SessionKey,
        department_id: DepartmentId,
    ) -> Result<(), ApplicationError> {
        self.selections.write().insert(session.clone(), department_id);
        debug!(department_id = %department_id, "Stored department selection");
        Ok(())
    }

    async fn clear(&self, session: &SessionKey) -> Result<Option<DepartmentId>, ApplicationError> {
        Ok(self.selections.write().remove(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(raw: &str) -> SessionKey {
        SessionKey::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn selection_lifecycle() {
        let store = InMemorySessionStore::new();
        let session = key("session-a");
        let labs = DepartmentId::new();

        assert_eq!(store.get_selection(&session).await.unwrap(), None);
        store.set_selection(&session, labs).await.unwrap();
        assert_eq!(store.get_selection(&session).await.unwrap(), Some(labs));
        assert_eq!(store.clear(&session).await.unwrap(), Some(labs));
        assert_eq!(store.clear(&session).await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn sessions_are_independent() {
        let store = InMemorySessionStore::new();
        let labs = DepartmentId::new();
        let phys = DepartmentId::new();

        store.set_selection(&key("a"), labs).await.unwrap();
        store.set_selection(&key("b"), phys).await.unwrap();

        assert_eq!(store.get_selection(&key("a")).await.unwrap(), Some(labs));
        assert_eq!(store.get_selection(&key("b")).await.unwrap(), Some(phys));
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn last_write_wins_under_concurrency() {
        let store = InMemorySessionStore::new();
        let session = key("shared");
        let departments: Vec<DepartmentId> = (0..16).map(|_| DepartmentId::new()).collect();

        let handles: Vec<_> = departments
            .iter()
            .map(|&dept| {
                let store = store.clone();
                let session = session.clone();
                tokio::spawn(async move { store.set_selection(&session, dept).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let selected = store.get_selection(&session).await.unwrap().unwrap();
        assert!(departments.contains(&selected));
        assert_eq!(store.len(), 1);
    }
}
