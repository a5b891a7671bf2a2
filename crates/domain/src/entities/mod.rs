//! Domain entities - Objects with identity and lifecycle

mod audit_entry;
mod department;
mod inventory;

pub use audit_entry::{AuditBuilder, AuditEntry, AuditEventType};
pub use department::{Department, NewDepartment};
pub use inventory::{
    Asset, Building, Category, InventoryItem, Level, Location, NewAsset, NewBuilding,
    NewCategory, NewInventoryItem, NewLevel, NewLocation, NewNews, NewRoom, NewSubCategory, News,
    Room, SubCategory,
};
