//! HTTP middleware components
//!
//! Request correlation, upstream identity, the department scope guard and
//! body validation.

pub mod department_scope;
pub mod identity;
pub mod request_id;
pub mod validation;

pub use department_scope::require_department;
pub use identity::{SESSION_ID_HEADER, USER_ID_HEADER, UpstreamIdentity, UpstreamIdentityLayer};
pub use request_id::{REQUEST_ID_HEADER, RequestId, RequestIdLayer, RequestIdService};
pub use validation::ValidatedJson;
