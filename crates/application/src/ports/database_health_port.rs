//! Database health check port

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::Serialize;

use crate::error::ApplicationError;

/// Result of a database connectivity check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseHealth {
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Open connections in the pool
    pub pool_size: u32,
    pub response_time_ms: u64,
}

/// Port for database connectivity checks used by the readiness endpoint
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DatabaseHealthPort: Send + Sync {
    /// Lightweight reachability check (`SELECT 1`)
    async fn is_available(&self) -> bool;

    async fn check_health(&self) -> Result<DatabaseHealth, ApplicationError>;
}
