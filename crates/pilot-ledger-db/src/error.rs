//! Error types for the data layer.
//!
//! [`DbError`] wraps the underlying [`sqlx`] errors. Inside the store trait
//! implementations it is boxed into [`StoreError::Backend`] so the engine
//! never sees a database-specific type.

use pilot_ledger_core::StoreError;

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        Self::backend(err)
    }
}

/// Map a query failure into the engine's error type.
pub(crate) fn pg(err: sqlx::Error) -> StoreError {
    DbError::Postgres(err).into()
}
