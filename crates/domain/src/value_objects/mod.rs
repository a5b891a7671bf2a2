//! Value Objects - Immutable, identity-less domain primitives

mod asset_code;
mod department_id;
mod record_id;
mod user_id;

pub use asset_code::{AssetCode, GENERAL_SEGMENT, ORPHAN_SEGMENT, validate_code_segment};
pub use department_id::DepartmentId;
pub use record_id::RecordId;
pub use user_id::UserId;
