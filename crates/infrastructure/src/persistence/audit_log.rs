//! SQLite audit log implementation
//!
//! Implements the `AuditLogPort` using sqlx for persistent audit logging.

use application::{
    error::ApplicationError,
    ports::{AuditLogPort, AuditQuery},
};
use async_trait::async_trait;
use domain::{AuditEntry, AuditEventType};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::{
    error::{corrupt, map_sqlx_error},
    rows::{format_timestamp, parse_optional, parse_timestamp},
};

const SELECT_COLUMNS: &str = "SELECT id, timestamp, event_type, actor, department_id, \
                              resource_type, resource_id, action, details, success, request_id \
                              FROM audit_log";

/// SQLite-based audit log implementation
#[derive(Debug, Clone)]
pub struct SqliteAuditLog {
    pool: SqlitePool,
}

impl SqliteAuditLog {
    /// Create a new SQLite audit log
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Row type for audit log queries
#[derive(sqlx::FromRow)]
struct AuditRow {
    id: i64,
    timestamp: String,
    event_type: String,
    actor: Option<String>,
    department_id: Option<String>,
    resource_type: Option<String>,
    resource_id: Option<String>,
    action: String,
    details: Option<String>,
    success: i32,
    request_id: Option<String>,
}

impl AuditRow {
    fn into_entry(self) -> Result<AuditEntry, ApplicationError> {
        let event_type: AuditEventType = self
            .event_type
            .parse()
            .map_err(|_| corrupt("event_type", &self.event_type))?;

        Ok(AuditEntry {
            id: Some(self.id),
            timestamp: parse_timestamp("timestamp", &self.timestamp)?,
            event_type,
            actor: self.actor,
            department_id: parse_optional("department_id", self.department_id.as_deref())?,
            resource_type: self.resource_type,
            resource_id: self.resource_id,
            action: self.action,
            details: self.details,
            success: self.success != 0,
            request_id: parse_optional("request_id", self.request_id.as_deref())?,
        })
    }
}

/// `WHERE` clause and binds for the filters set on `query`
fn filter_clause(query: &AuditQuery) -> (String, Vec<String>) {
    let mut sql = String::from(" WHERE 1 = 1");
    let mut binds: Vec<String> = Vec::new();

    if let Some(event_type) = query.event_type {
        sql.push_str(" AND event_type = ?");
        binds.push(event_type.to_string());
    }
    if let Some(ref actor) = query.actor {
        sql.push_str(" AND actor = ?");
        binds.push(actor.clone());
    }
    if let Some(department_id) = query.department_id {
        sql.push_str(" AND department_id = ?");
        binds.push(department_id.to_string());
    }
    if let Some(ref resource_type) = query.resource_type {
        sql.push_str(" AND resource_type = ?");
        binds.push(resource_type.clone());
    }
    if let Some(ref resource_id) = query.resource_id {
        sql.push_str(" AND resource_id = ?");
        binds.push(resource_id.clone());
    }
    if let Some(success) = query.success {
        sql.push_str(" AND success = ?");
        binds.push(i32::from(success).to_string());
    }

    (sql, binds)
}

#[async_trait]
impl AuditLogPort for SqliteAuditLog {
    #[instrument(skip(self, entry), fields(event_type = %entry.event_type, action = %entry.action))]
    async fn log(&self, entry: &AuditEntry) -> Result<(), ApplicationError> {
        sqlx::query(
            "INSERT INTO audit_log (timestamp, event_type, actor, department_id, resource_type, \
             resource_id, action, details, success, request_id)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(format_timestamp(entry.timestamp))
        .bind(entry.event_type.as_str())
        .bind(&entry.actor)
        .bind(entry.department_id.map(|id| id.to_string()))
        .bind(&entry.resource_type)
        .bind(&entry.resource_id)
        .bind(&entry.action)
        .bind(&entry.details)
        .bind(i32::from(entry.success))
        .bind(entry.request_id.map(|id| id.to_string()))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        debug!("Recorded audit entry");
        Ok(())
    }

    #[instrument(skip(self, query))]
    async fn query(&self, query: &AuditQuery) -> Result<Vec<AuditEntry>, ApplicationError> {
        let (clause, binds) = filter_clause(query);
        let mut sql = format!("{SELECT_COLUMNS}{clause} ORDER BY timestamp DESC, id DESC");
        if query.limit.is_some() {
            sql.push_str(" LIMIT ?");
        }

        let mut q = sqlx::query_as::<_, AuditRow>(&sql);
        for bind in &binds {
            q = q.bind(bind);
        }
        if let Some(limit) = query.limit {
            q = q.bind(i64::from(limit));
        }

        let rows: Vec<AuditRow> = q.fetch_all(&self.pool).await.map_err(map_sqlx_error)?;
        rows.into_iter().map(AuditRow::into_entry).collect()
    }

    #[instrument(skip(self, query))]
    async fn count(&self, query: &AuditQuery) -> Result<u64, ApplicationError> {
        let (clause, binds) = filter_clause(query);
        let sql = format!("SELECT COUNT(*) FROM audit_log{clause}");

        let mut q = sqlx::query_scalar::<_, i64>(&sql);
        for bind in &binds {
            q = q.bind(bind);
        }

        let count = q.fetch_one(&self.pool).await.map_err(map_sqlx_error)?;
        u64::try_from(count).map_err(|e| ApplicationError::Internal(e.to_string()))
    }
}
