//! SQLite database health adapter
//!
//! Implements the `DatabaseHealthPort` on top of the sqlx pool.

use std::time::Instant;

use application::{
    error::ApplicationError,
    ports::{DatabaseHealth, DatabaseHealthPort},
};
use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::{debug, instrument, warn};

use super::error::map_sqlx_error;

/// SQLite database health adapter
#[derive(Debug, Clone)]
pub struct SqliteDatabaseHealth {
    pool: SqlitePool,
}

impl SqliteDatabaseHealth {
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DatabaseHealthPort for SqliteDatabaseHealth {
    #[instrument(skip(self))]
    async fn is_available(&self) -> bool {
        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Database health check failed");
                false
            },
        }
    }

    #[instrument(skip(self))]
    async fn check_health(&self) -> Result<DatabaseHealth, ApplicationError> {
        let start = Instant::now();

        let version: String = sqlx::query_scalar("SELECT sqlite_version()")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let response_time_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let pool_size = self.pool.size();

        debug!(
            version = %version,
            pool_size,
            response_time_ms,
            "Database health check passed"
        );

        Ok(DatabaseHealth {
            reachable: true,
            version: Some(format!("SQLite {version}")),
            pool_size,
            response_time_ms,
        })
    }
}
