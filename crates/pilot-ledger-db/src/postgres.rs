//! `PostgreSQL` pool for the ledger store.
//!
//! Queries are built at runtime (not compile-time checked) so the workspace
//! builds without a live database.

use pilot_ledger_core::config::DatabaseConfig;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use crate::error::DbError;
use crate::store::PgStore;

/// Shared connection pool behind every [`PgStore`] handed out.
#[derive(Clone)]
pub struct PostgresPool {
    pool: PgPool,
}

impl PostgresPool {
    /// Connect with the `database` section's URL and pool size, applying
    /// pending migrations first when `run_migrations` is set.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Config`] for an unparsable URL,
    /// [`DbError::Postgres`] when the server is unreachable, or
    /// [`DbError::Migration`] when a migration fails.
    pub async fn open(config: &DatabaseConfig) -> Result<Self, DbError> {
        let options: PgConnectOptions = config
            .url
            .parse()
            .map_err(|e: sqlx::Error| DbError::Config(format!("Invalid database URL: {e}")))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;
        tracing::info!(max_connections = config.max_connections, "Connected to PostgreSQL");

        let opened = Self { pool };
        if config.run_migrations {
            sqlx::migrate!("./migrations").run(&opened.pool).await?;
            tracing::info!("Ledger migrations applied");
        }
        Ok(opened)
    }

    /// A ledger store sharing this pool.
    pub fn store(&self) -> PgStore {
        PgStore::new(self.pool.clone())
    }

    /// Drain the pool on shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("PostgreSQL pool closed");
    }
}
