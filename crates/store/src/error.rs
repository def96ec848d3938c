use common::ParseEnumError;
use thiserror::Error;

/// Errors that can occur when interacting with the repository layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique column already holds the value being written.
    #[error("{entity} with this {field} already exists")]
    Conflict {
        entity: &'static str,
        field: &'static str,
    },

    /// A stored value could not be mapped back onto an entity.
    #[error("Corrupt row: {0}")]
    CorruptRow(#[from] ParseEnumError),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StoreError>;
