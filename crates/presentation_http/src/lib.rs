//! Campus inventory HTTP presentation layer
//!
//! This crate provides the HTTP API: upstream identity, the per-session
//! department selection and the department-scoped inventory endpoints.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use middleware::{RequestIdLayer, UpstreamIdentityLayer, ValidatedJson};
pub use routes::create_router;
pub use state::AppState;
