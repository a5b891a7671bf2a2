//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer on top of SQLite and
//! process memory, and owns configuration loading and tracing setup.

pub mod adapters;
pub mod config;
pub mod persistence;
pub mod telemetry;
pub mod validation;

pub use adapters::InMemorySessionStore;
pub use config::{AppConfig, DatabaseConfig, Environment, ScopingConfig, ServerConfig};
pub use persistence::{
    AsyncDatabase, AsyncDatabaseConfig, AsyncDatabaseError, SqlFilter, SqliteAuditLog,
    SqliteDatabaseHealth, SqliteDepartmentStore, SqliteInventoryStore, SqliteSharingStore,
};
pub use telemetry::{DEFAULT_LOG_FILTER, LogFormat, TelemetryError, init_tracing};
pub use validation::{SecurityValidator, SecurityWarning, WarningSeverity};
