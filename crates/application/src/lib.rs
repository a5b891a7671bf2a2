//! Application layer - Use cases and orchestration
//!
//! Contains the department context, inventory, sharing and administration
//! services together with the ports their adapters implement.

pub mod error;
pub mod ports;
pub mod request_context;
pub mod services;

pub use error::ApplicationError;
pub use ports::*;
pub use request_context::RequestContext;
pub use services::*;
