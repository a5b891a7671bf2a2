//! Persistence module
//!
//! SQLite-based storage for departments, scoped inventory records, sharing
//! relations and the audit log.

pub mod async_connection;
pub mod audit_log;
pub mod database_health;
pub mod department_store;
pub mod error;
pub mod inventory_store;
mod rows;
pub mod scope_sql;
pub mod sharing_store;

pub use async_connection::{AsyncDatabase, AsyncDatabaseConfig, AsyncDatabaseError};
pub use audit_log::SqliteAuditLog;
pub use database_health::SqliteDatabaseHealth;
pub use department_store::SqliteDepartmentStore;
pub use inventory_store::SqliteInventoryStore;
pub use scope_sql::SqlFilter;
pub use sharing_store::SqliteSharingStore;
