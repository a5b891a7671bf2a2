//! Department scoping
//!
//! Everything needed to decide which inventory records a department may see:
//!
//! - [`DepartmentContext`] - the per-request view of the selected department
//! - [`DepartmentOwned`] - records that carry an owning department
//! - [`ScopedEntityKind`] / [`SharingRelation`] - the closed set of scoped
//!   record kinds and the join tables that widen their visibility
//! - [`Predicate`] - a storage-agnostic visibility condition
//! - [`resolve_filter`] - the single place where predicates are built
//!
//! Storage adapters translate a [`Predicate`] into their query language; they
//! never build department conditions themselves.

mod context;
mod kind;
mod predicate;
mod rules;

pub use context::{DepartmentContext, DepartmentOwned, MissingContextPolicy};
pub use kind::{ScopedEntityKind, SharingRelation};
pub use predicate::{Predicate, ScopeFacts, ShareKey};
pub use rules::{VisibilityRule, resolve_filter};
