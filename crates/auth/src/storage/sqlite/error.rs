//! SQLite error mapping.
//!
//! Maps `sqlx::Error` to `RepositoryError` from `gatehouse_core::storage`.

use gatehouse_core::storage::RepositoryError;

/// Maps a sqlx error to a RepositoryError.
///
/// # Error Mapping
///
/// - UNIQUE constraint → `RepositoryError::AlreadyExists`
/// - FOREIGN KEY constraint → `RepositoryError::InvalidData`
/// - Pool and I/O errors → `RepositoryError::ConnectionFailed`
/// - `RowNotFound` → `RepositoryError::NotFound`
/// - All other errors → `RepositoryError::QueryFailed`
pub fn map_sqlx_error(err: sqlx::Error, entity_type: &'static str, id: &str) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            RepositoryError::AlreadyExists {
                entity_type,
                id: id.to_string(),
            }
        }
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            RepositoryError::InvalidData(format!(
                "Foreign key constraint violation for {entity_type} {id}"
            ))
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            RepositoryError::ConnectionFailed(err.to_string())
        }
        sqlx::Error::RowNotFound => RepositoryError::NotFound {
            entity_type,
            id: id.to_string(),
        },
        _ => RepositoryError::QueryFailed(err.to_string()),
    }
}
