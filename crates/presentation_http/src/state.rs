//! Application state shared across handlers

use std::sync::Arc;

use application::{
    DepartmentContextService, DepartmentService, InventoryService, ScopeSettings, SharingService,
    ports::DatabaseHealthPort,
};
use infrastructure::{
    AppConfig, AsyncDatabase, InMemorySessionStore, SqliteAuditLog, SqliteDatabaseHealth,
    SqliteDepartmentStore, SqliteInventoryStore, SqliteSharingStore,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Per-session department selection
    pub context_service: Arc<DepartmentContextService>,
    /// Scoped inventory records
    pub inventory_service: Arc<InventoryService>,
    /// Sharing relations of buildings, categories and assets
    pub sharing_service: Arc<SharingService>,
    /// Department administration
    pub department_service: Arc<DepartmentService>,
    /// Database readiness check
    pub database_health: Arc<dyn DatabaseHealthPort>,
    /// Application configuration
    pub config: Arc<AppConfig>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("settings", self.context_service.settings())
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Wire every service to the SQLite adapters and an in-memory session store
    pub fn sqlite(database: &AsyncDatabase, config: AppConfig, settings: ScopeSettings) -> Self {
        let pool = database.pool().clone();
        let departments = Arc::new(SqliteDepartmentStore::new(pool.clone()));
        let inventory = Arc::new(SqliteInventoryStore::new(pool.clone()));
        let sharing = Arc::new(SqliteSharingStore::new(pool.clone()));
        let audit_log = Arc::new(SqliteAuditLog::new(pool.clone()));

        Self {
            context_service: Arc::new(DepartmentContextService::new(
                departments.clone(),
                Arc::new(InMemorySessionStore::new()),
                audit_log.clone(),
                settings,
            )),
            inventory_service: Arc::new(InventoryService::new(
                inventory.clone(),
                departments.clone(),
                audit_log.clone(),
            )),
            sharing_service: Arc::new(SharingService::new(
                sharing,
                inventory,
                departments.clone(),
                audit_log.clone(),
            )),
            department_service: Arc::new(DepartmentService::new(departments, audit_log)),
            database_health: Arc::new(SqliteDatabaseHealth::new(pool)),
            config: Arc::new(config),
        }
    }
}
