//! Per-request department context
//!
//! # Examples
//!
//! ```
//! use domain::scope::DepartmentContext;
//! use domain::DepartmentId;
//!
//! let labs = DepartmentId::new();
//! let admin = DepartmentId::new();
//!
//! let context = DepartmentContext::for_department(labs, Some(admin));
//! assert_eq!(context.active_department(), Some(labs));
//! assert!(!context.is_bypass_active());
//!
//! let context = DepartmentContext::for_department(admin, Some(admin));
//! assert!(context.is_bypass_active());
//! ```

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{errors::DomainError, value_objects::DepartmentId};

/// What a read returns when no department has been selected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingContextPolicy {
    /// Nothing is visible
    #[default]
    Deny,
    /// Everything is visible
    Allow,
}

impl fmt::Display for MissingContextPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Deny => "deny",
            Self::Allow => "allow",
        })
    }
}

impl FromStr for MissingContextPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deny" => Ok(Self::Deny),
            "allow" => Ok(Self::Allow),
            other => Err(DomainError::ValidationError(format!(
                "unknown missing context policy '{other}'"
            ))),
        }
    }
}

/// The department a request acts in
///
/// Built once per request from the session selection and passed by value to
/// every scoped read and write. The bypass flag is derived, never set
/// directly: it holds exactly when the active department is the configured
/// admin department.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DepartmentContext {
    active: Option<DepartmentId>,
    bypass: bool,
    on_missing: MissingContextPolicy,
}

impl DepartmentContext {
    /// A context with no department selected
    pub const fn none() -> Self {
        Self {
            active: None,
            bypass: false,
            on_missing: MissingContextPolicy::Deny,
        }
    }

    /// A context acting in `active`
    ///
    /// `admin_department` is the configured admin department, if any.
    pub fn for_department(active: DepartmentId, admin_department: Option<DepartmentId>) -> Self {
        Self {
            active: Some(active),
            bypass: admin_department == Some(active),
            on_missing: MissingContextPolicy::Deny,
        }
    }

    /// Override the policy used when no department is active
    #[must_use]
    pub const fn with_missing_policy(mut self, policy: MissingContextPolicy) -> Self {
        self.on_missing = policy;
        self
    }

    /// The selected department
    pub const fn active_department(&self) -> Option<DepartmentId> {
        self.active
    }

    /// True when department scoping is disabled for this request
    pub const fn is_bypass_active(&self) -> bool {
        self.bypass
    }

    pub const fn missing_policy(&self) -> MissingContextPolicy {
        self.on_missing
    }

    pub const fn has_department(&self) -> bool {
        self.active.is_some()
    }
}

/// Records owned by at most one department
pub trait DepartmentOwned {
    /// The owning department, `None` for orphan records
    fn department_id(&self) -> Option<DepartmentId>;

    fn set_department_id(&mut self, department_id: Option<DepartmentId>);

    fn is_owned_by(&self, department_id: DepartmentId) -> bool {
        self.department_id() == Some(department_id)
    }

    /// Whether `context` may transfer the record or change its sharing set
    ///
    /// Only the owning department and the admin bypass qualify; a share
    /// grants visibility, not control. Orphans need the bypass.
    fn is_manageable_by(&self, context: &DepartmentContext) -> bool {
        context.is_bypass_active()
            || context
                .active_department()
                .is_some_and(|active| self.is_owned_by(active))
    }

    /// Fill an unset owner from the context's active department
    ///
    /// An explicit owner is kept. Without an active department the record
    /// stays an orphan. Returns whether the owner was changed.
    fn assign_default_department(&mut self, context: &DepartmentContext) -> bool {
        match (self.department_id(), context.active_department()) {
            (None, Some(active)) => {
                self.set_department_id(Some(active));
                true
            },
            _ => false,
        }
    }
}
