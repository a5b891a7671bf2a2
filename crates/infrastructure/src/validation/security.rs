//! Startup validation of the application configuration
//!
//! Critical findings in production prevent startup unless explicitly allowed
//! with `INVENTORY_ALLOW_INSECURE_CONFIG=true`.

use std::fmt;

use domain::MissingContextPolicy;

use crate::config::AppConfig;

/// Severity level for configuration findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WarningSeverity {
    Info,
    Warning,
    /// Must be addressed in production
    Critical,
}

impl fmt::Display for WarningSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// A configuration finding with severity and remedy
#[derive(Debug, Clone)]
pub struct SecurityWarning {
    pub severity: WarningSeverity,
    /// Short stable code (`CFG001`)
    pub code: &'static str,
    pub message: String,
    pub recommendation: &'static str,
}

impl SecurityWarning {
    #[must_use]
    pub fn new(
        severity: WarningSeverity,
        code: &'static str,
        message: impl Into<String>,
        recommendation: &'static str,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            recommendation,
        }
    }

    #[must_use]
    pub const fn is_critical(&self) -> bool {
        matches!(self.severity, WarningSeverity::Critical)
    }
}

impl fmt::Display for SecurityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} - {}",
            self.severity, self.code, self.message, self.recommendation
        )
    }
}

/// Validates the configuration before the server starts
#[derive(Debug, Clone, Copy, Default)]
pub struct SecurityValidator;

impl SecurityValidator {
    /// All findings, critical first
    #[must_use]
    pub fn validate(config: &AppConfig) -> Vec<SecurityWarning> {
        let mut warnings = Vec::new();
        let is_production = config.is_production();
        let escalate = |severity| {
            if is_production {
                WarningSeverity::Critical
            } else {
                severity
            }
        };

        if config.server.cors_enabled && config.server.allowed_origins.is_empty() {
            warnings.push(SecurityWarning::new(
                escalate(WarningSeverity::Info),
                "CFG001",
                "CORS is enabled with no origin restrictions",
                "Set server.allowed_origins to the inventory front-end origins",
            ));
        }

        if config.scoping.missing_context_policy == MissingContextPolicy::Allow {
            warnings.push(SecurityWarning::new(
                escalate(WarningSeverity::Warning),
                "CFG002",
                "Reads without a selected department return every department's records",
                "Use scoping.missing_context_policy = \"deny\"",
            ));
        }

        match &config.scoping.admin_department_code {
            None => warnings.push(SecurityWarning::new(
                WarningSeverity::Info,
                "CFG003",
                "No admin department configured; cross-department view is unavailable",
                "Set scoping.admin_department_code to enable the admin bypass",
            )),
            Some(_) if config.scoping.admin_users.is_empty() => {
                warnings.push(SecurityWarning::new(
                    WarningSeverity::Warning,
                    "CFG004",
                    "Admin department has no configured members",
                    "List admin user ids in scoping.admin_users",
                ));
            },
            Some(_) => {},
        }

        if let Err(e) = config.scoping.admin_user_ids() {
            warnings.push(SecurityWarning::new(
                WarningSeverity::Critical,
                "CFG005",
                e,
                "Admin users must be UUIDs",
            ));
        }

        if config.database.is_in_memory() && is_production {
            warnings.push(SecurityWarning::new(
                WarningSeverity::Warning,
                "CFG006",
                "In-memory database in production loses all data on restart",
                "Set database.path to a file",
            ));
        }

        warnings.sort_by(|a, b| b.severity.cmp(&a.severity));
        warnings
    }

    /// Whether startup must be refused
    #[must_use]
    pub fn should_block_startup(
        config: &AppConfig,
        warnings: &[SecurityWarning],
        allow_insecure: bool,
    ) -> bool {
        config.is_production()
            && warnings.iter().any(SecurityWarning::is_critical)
            && !allow_insecure
    }

    pub fn log_warnings(warnings: &[SecurityWarning]) {
        for warning in warnings {
            match warning.severity {
                WarningSeverity::Critical => {
                    tracing::error!(
                        code = warning.code,
                        message = %warning.message,
                        recommendation = warning.recommendation,
                        "Configuration issue"
                    );
                },
                WarningSeverity::Warning => {
                    tracing::warn!(
                        code = warning.code,
                        message = %warning.message,
                        recommendation = warning.recommendation,
                        "Configuration warning"
                    );
                },
                WarningSeverity::Info => {
                    tracing::info!(
                        code = warning.code,
                        message = %warning.message,
                        recommendation = warning.recommendation,
                        "Configuration notice"
                    );
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;

    fn secure_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.server.allowed_origins = vec!["https://inventory.example.edu".to_string()];
        config.scoping.admin_department_code = Some("ADMIN".to_string());
        config.scoping.admin_users = vec!["6f1c8e52-1d7e-4b8e-9a43-0f3a8f5d2c11".to_string()];
        config
    }

    fn production(mut config: AppConfig) -> AppConfig {
        config.environment = Environment::Production;
        config
    }

    fn codes(warnings: &[SecurityWarning]) -> Vec<&'static str> {
        warnings.iter().map(|w| w.code).collect()
    }

    #[test]
    fn secure_config_has_no_findings() {
        assert!(SecurityValidator::validate(&production(secure_config())).is_empty());
    }

    #[test]
    fn open_cors_is_critical_only_in_production() {
        let mut config = secure_config();
        config.server.allowed_origins.clear();

        let dev = SecurityValidator::validate(&config);
        assert_eq!(codes(&dev), vec!["CFG001"]);
        assert!(!dev[0].is_critical());

        let prod = SecurityValidator::validate(&production(config));
        assert!(prod[0].is_critical());
    }

    #[test]
    fn allow_policy_is_flagged() {
        let mut config = secure_config();
        config.scoping.missing_context_policy = MissingContextPolicy::Allow;
        let warnings = SecurityValidator::validate(&production(config));
        assert_eq!(codes(&warnings), vec!["CFG002"]);
        assert!(warnings[0].is_critical());
    }

    #[test]
    fn admin_department_checks() {
        let mut config = secure_config();
        config.scoping.admin_users.clear();
        assert_eq!(codes(&SecurityValidator::validate(&config)), vec!["CFG004"]);

        config.scoping.admin_department_code = None;
        assert_eq!(codes(&SecurityValidator::validate(&config)), vec!["CFG003"]);
    }

    #[test]
    fn malformed_admin_user_is_critical() {
        let mut config = secure_config();
        config.scoping.admin_users.push("bob".to_string());
        let warnings = SecurityValidator::validate(&config);
        assert_eq!(warnings[0].code, "CFG005");
        assert!(warnings[0].is_critical());
    }

    #[test]
    fn should_block_startup_only_in_production_with_critical() {
        let critical = vec![SecurityWarning::new(
            WarningSeverity::Critical,
            "TEST",
            "Test critical",
            "Fix it",
        )];
        let prod = production(AppConfig::default());

        assert!(SecurityValidator::should_block_startup(&prod, &critical, false));
        assert!(!SecurityValidator::should_block_startup(&prod, &critical, true));
        assert!(!SecurityValidator::should_block_startup(
            &AppConfig::default(),
            &critical,
            false
        ));
        assert!(!SecurityValidator::should_block_startup(&prod, &[], false));
    }

    #[test]
    fn warning_display_format() {
        let warning = SecurityWarning::new(
            WarningSeverity::Warning,
            "CFG004",
            "Test message",
            "Test recommendation",
        );
        assert_eq!(
            warning.to_string(),
            "[WARNING] CFG004: Test message - Test recommendation"
        );
    }

    #[test]
    fn severity_ordering() {
        assert!(WarningSeverity::Critical > WarningSeverity::Warning);
        assert!(WarningSeverity::Warning > WarningSeverity::Info);
    }
}
