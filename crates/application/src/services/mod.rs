//! Application services - Use case implementations

mod department_context_service;
mod department_service;
mod inventory_service;
mod sharing_service;

pub use department_context_service::{DepartmentContextService, ScopeSettings};
pub use department_service::DepartmentService;
pub use inventory_service::{InventoryService, InventoryStatistics, KindCount};
pub use sharing_service::SharingService;
