//! Shared error mapping for the sqlx persistence layer

use application::error::ApplicationError;

/// Map a sqlx error to an application-layer error
pub fn map_sqlx_error(e: sqlx::Error) -> ApplicationError {
    match e {
        sqlx::Error::RowNotFound => {
            ApplicationError::NotFound("Database record not found".to_string())
        },
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            ApplicationError::Conflict(db_err.message().to_string())
        },
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            ApplicationError::InvalidOperation("Referenced record does not exist".to_string())
        },
        sqlx::Error::Database(db_err) => {
            ApplicationError::Internal(format!("Database error: {db_err}"))
        },
        other => ApplicationError::Internal(format!("Database error: {other}")),
    }
}

/// Map a stored value that does not parse back into its domain type
pub fn corrupt(column: &str, value: &str) -> ApplicationError {
    ApplicationError::Internal(format!("Corrupt value in column {column}: {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::RowNotFound),
            ApplicationError::NotFound(_)
        ));
    }

    #[test]
    fn other_errors_are_internal() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolTimedOut),
            ApplicationError::Internal(_)
        ));
    }

    #[test]
    fn corrupt_names_column() {
        assert!(corrupt("department_id", "x").to_string().contains("department_id"));
    }
}
