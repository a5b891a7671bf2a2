//! Domain layer for the campus inventory
//!
//! Contains the inventory entities, department scoping rules, value objects
//! and domain errors. This layer has no I/O and defines the ubiquitous
//! language shared by the outer layers.

pub mod entities;
pub mod errors;
pub mod scope;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use scope::{
    DepartmentContext, DepartmentOwned, MissingContextPolicy, Predicate, ScopeFacts,
    ScopedEntityKind, ShareKey, SharingRelation, VisibilityRule, resolve_filter,
};
pub use value_objects::*;
