//! Department scoping configuration.

use domain::{MissingContextPolicy, UserId};
use serde::{Deserialize, Serialize};

/// Department scoping settings
///
/// When `admin_department_code` is set, the department with that code is
/// created on startup if missing, the listed `admin_users` become its
/// members, and selecting it disables scoping for the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopingConfig {
    /// Code of the designated admin department (`ADMIN`)
    #[serde(default)]
    pub admin_department_code: Option<String>,

    #[serde(default = "default_admin_department_name")]
    pub admin_department_name: String,

    /// User ids granted membership of the admin department on startup
    #[serde(default)]
    pub admin_users: Vec<String>,

    /// Visibility of scoped reads made without a selected department
    #[serde(default)]
    pub missing_context_policy: MissingContextPolicy,
}

fn default_admin_department_name() -> String {
    "Administration".to_string()
}

impl Default for ScopingConfig {
    fn default() -> Self {
        Self {
            admin_department_code: None,
            admin_department_name: default_admin_department_name(),
            admin_users: Vec::new(),
            missing_context_policy: MissingContextPolicy::default(),
        }
    }
}

impl ScopingConfig {
    /// Parse `admin_users`, failing on the first malformed id
    pub fn admin_user_ids(&self) -> Result<Vec<UserId>, String> {
        self.admin_users
            .iter()
            .map(|raw| {
                UserId::parse(raw).map_err(|e| format!("invalid admin user id '{raw}': {e}"))
            })
            .collect()
    }
}
