//! SQLite department store
//!
//! Departments and the membership table consulted on every selection.

use application::{error::ApplicationError, ports::DepartmentStore};
use async_trait::async_trait;
use chrono::Utc;
use domain::{Department, DepartmentId, UserId};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::{
    error::map_sqlx_error,
    rows::{format_timestamp, parse_column, parse_timestamp},
};

/// SQLite-based department store
#[derive(Debug, Clone)]
pub struct SqliteDepartmentStore {
    pool: SqlitePool,
}

impl SqliteDepartmentStore {
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct DepartmentRow {
    id: String,
    name: String,
    code: String,
    created_at: String,
}

impl DepartmentRow {
    fn into_department(self) -> Result<Department, ApplicationError> {
        Ok(Department {
            id: parse_column("id", &self.id)?,
            name: self.name,
            code: self.code,
            created_at: parse_timestamp("created_at", &self.created_at)?,
        })
    }
}

fn collect(rows: Vec<DepartmentRow>) -> Result<Vec<Department>, ApplicationError> {
    rows.into_iter().map(DepartmentRow::into_department).collect()
}

#[async_trait]
impl DepartmentStore for SqliteDepartmentStore {
    #[instrument(skip(self, department), fields(code = %department.code))]
    async fn create(&self, department: &Department) -> Result<(), ApplicationError> {
        sqlx::query("INSERT INTO departments (id, name, code, created_at) VALUES (?, ?, ?, ?)")
            .bind(department.id.to_string())
            .bind(&department.name)
            .bind(&department.code)
            .bind(format_timestamp(department.created_at))
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        debug!(department_id = %department.id, "Created department");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, id: DepartmentId) -> Result<Option<Department>, ApplicationError> {
        let row: Option<DepartmentRow> =
            sqlx::query_as("SELECT id, name, code, created_at FROM departments WHERE id = ?")
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        row.map(DepartmentRow::into_department).transpose()
    }

    #[instrument(skip(self))]
    async fn get_by_code(&self, code: &str) -> Result<Option<Department>, ApplicationError> {
        let row: Option<DepartmentRow> =
            sqlx::query_as("SELECT id, name, code, created_at FROM departments WHERE code = ?")
                .bind(code)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        row.map(DepartmentRow::into_department).transpose()
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Department>, ApplicationError> {
        let rows: Vec<DepartmentRow> =
            sqlx::query_as("SELECT id, name, code, created_at FROM departments ORDER BY code")
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        collect(rows)
    }

    #[instrument(skip(self))]
    async fn add_member(
        &self,
        department_id: DepartmentId,
        user_id: UserId,
    ) -> Result<(), ApplicationError> {
        sqlx::query(
            "INSERT INTO department_members (department_id, user_id, added_at)
             VALUES (?, ?, ?)
             ON CONFLICT (department_id, user_id) DO NOTHING",
        )
        .bind(department_id.to_string())
        .bind(user_id.to_string())
        .bind(format_timestamp(Utc::now()))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_member(
        &self,
        department_id: DepartmentId,
        user_id: UserId,
    ) -> Result<bool, ApplicationError> {
        let result =
            sqlx::query("DELETE FROM department_members WHERE department_id = ? AND user_id = ?")
                .bind(department_id.to_string())
                .bind(user_id.to_string())
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn is_member(
        &self,
        department_id: DepartmentId,
        user_id: UserId,
    ) -> Result<bool, ApplicationError> {
        let exists: i64 = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM department_members
                            WHERE department_id = ? AND user_id = ?)",
        )
        .bind(department_id.to_string())
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(exists != 0)
    }

    #[instrument(skip(self))]
    async fn departments_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Department>, ApplicationError> {
        let rows: Vec<DepartmentRow> = sqlx::query_as(
            "SELECT d.id, d.name, d.code, d.created_at
             FROM departments d
             JOIN department_members m ON m.department_id = d.id
             WHERE m.user_id = ?
             ORDER BY d.code",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        collect(rows)
    }
}

#[cfg(test)]
mod tests {
    use domain::NewDepartment;

    use super::*;
    use crate::persistence::AsyncDatabase;

    async fn setup() -> SqliteDepartmentStore {
        let db = AsyncDatabase::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        SqliteDepartmentStore::new(db.pool().clone())
    }

    fn department(code: &str) -> Department {
        Department::create(NewDepartment {
            name: format!("{code} department"),
            code: code.to_string(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn create_and_lookup() {
        let store = setup().await;
        let labs = department("LABS");
        store.create(&labs).await.unwrap();

        assert_eq!(store.get(labs.id).await.unwrap(), Some(labs.clone()));
        assert_eq!(store.get_by_code("LABS").await.unwrap(), Some(labs));
        assert!(store.get_by_code("NOPE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_code_conflicts() {
        let store = setup().await;
        store.create(&department("LABS")).await.unwrap();
        let result = store.create(&department("LABS")).await;
        assert!(matches!(result, Err(ApplicationError::Conflict(_))));
    }

    #[tokio::test]
    async fn list_is_ordered_by_code() {
        let store = setup().await;
        store.create(&department("PHYS")).await.unwrap();
        store.create(&department("ADMIN")).await.unwrap();

        let codes: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.code)
            .collect();
        assert_eq!(codes, vec!["ADMIN", "PHYS"]);
    }

    #[tokio::test]
    async fn membership_lifecycle() {
        let store = setup().await;
        let labs = department("LABS");
        store.create(&labs).await.unwrap();
        let user = UserId::new();

        assert!(!store.is_member(labs.id, user).await.unwrap());
        store.add_member(labs.id, user).await.unwrap();
        store.add_member(labs.id, user).await.unwrap();
        assert!(store.is_member(labs.id, user).await.unwrap());
        assert_eq!(store.departments_for_user(user).await.unwrap(), vec![labs.clone()]);

        assert!(store.remove_member(labs.id, user).await.unwrap());
        assert!(!store.remove_member(labs.id, user).await.unwrap());
        assert!(store.departments_for_user(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn member_of_unknown_department_is_rejected() {
        let store = setup().await;
        let result = store.add_member(DepartmentId::new(), UserId::new()).await;
        assert!(matches!(result, Err(ApplicationError::InvalidOperation(_))));
    }
}
