//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod audit_log;
mod database_health_port;
mod department_store;
mod inventory_store;
mod session_store;
mod sharing_store;

#[cfg(test)]
pub use audit_log::MockAuditLogPort;
pub use audit_log::{AuditLogPort, AuditQuery};
#[cfg(test)]
pub use database_health_port::MockDatabaseHealthPort;
pub use database_health_port::{DatabaseHealth, DatabaseHealthPort};
#[cfg(test)]
pub use department_store::MockDepartmentStore;
pub use department_store::DepartmentStore;
#[cfg(test)]
pub use inventory_store::MockInventoryStore;
pub use inventory_store::{InventoryStore, MAX_PAGE_SIZE, Page, Pagination};
#[cfg(test)]
pub use session_store::MockSessionStorePort;
pub use session_store::{SessionKey, SessionStorePort};
#[cfg(test)]
pub use sharing_store::MockSharingStore;
pub use sharing_store::SharingStore;
