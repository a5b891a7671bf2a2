//! SQLite sharing relation store
//!
//! One join table per [`SharingRelation`]. A sync replaces the whole set for
//! an entity inside a single transaction.

use application::{error::ApplicationError, ports::SharingStore};
use async_trait::async_trait;
use domain::{DepartmentId, RecordId, SharingRelation};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::{error::map_sqlx_error, rows::parse_column};

/// Table and entity column of a relation
const fn relation_table(relation: SharingRelation) -> (&'static str, &'static str) {
    match relation {
        SharingRelation::Category => ("category_department", "category_id"),
        SharingRelation::Building => ("building_department", "building_id"),
        SharingRelation::Asset => ("asset_department", "asset_id"),
    }
}

/// SQLite-based sharing store
#[derive(Debug, Clone)]
pub struct SqliteSharingStore {
    pool: SqlitePool,
}

impl SqliteSharingStore {
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SharingStore for SqliteSharingStore {
    #[instrument(skip(self, departments), fields(relation = %relation, count = departments.len()))]
    async fn replace(
        &self,
        relation: SharingRelation,
        entity_id: RecordId,
        departments: &[DepartmentId],
    ) -> Result<(), ApplicationError> {
        let (table, column) = relation_table(relation);
        let entity = entity_id.to_string();
        let delete = format!("DELETE FROM {table} WHERE {column} = ?");
        let insert = format!(
            "INSERT INTO {table} ({column}, department_id) VALUES (?, ?) ON CONFLICT DO NOTHING"
        );

        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        sqlx::query(&delete)
            .bind(&entity)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        for department in departments {
            sqlx::query(&insert)
                .bind(&entity)
                .bind(department.to_string())
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;

        debug!("Replaced sharing set");
        Ok(())
    }

    #[instrument(skip(self), fields(relation = %relation))]
    async fn list(
        &self,
        relation: SharingRelation,
        entity_id: RecordId,
    ) -> Result<Vec<DepartmentId>, ApplicationError> {
        let (table, column) = relation_table(relation);
        let sql =
            format!("SELECT department_id FROM {table} WHERE {column} = ? ORDER BY department_id");

        let rows: Vec<String> = sqlx::query_scalar(&sql)
            .bind(entity_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.iter()
            .map(|id| parse_column("department_id", id))
            .collect()
    }
}
