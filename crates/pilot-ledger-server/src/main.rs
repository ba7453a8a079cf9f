//! Server binary for the pilot ledger.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `pilot-ledger.yaml` (or `PILOT_LEDGER_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Build the bearer token table from `auth.tokens`
//! 4. Select the store: `PostgreSQL` when `database.url` is set, otherwise
//!    the in-memory store
//! 5. Serve the HTTP API until `Ctrl-C`

mod error;

use std::sync::Arc;

use pilot_ledger_api::{AppState, IdentityProvider, StaticTokens, start_server};
use pilot_ledger_core::config::{AppConfig, LoggingConfig};
use pilot_ledger_core::{MemoryStore, Store};
use pilot_ledger_db::PostgresPool;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::ServerError;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, database setup or the HTTP server
/// fails.
#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let config = AppConfig::load()?;
    init_logging(&config.logging)?;

    info!(
        host = config.server.host,
        port = config.server.port,
        tokens = config.auth.tokens.len(),
        "pilot-ledger starting"
    );

    let identity: Arc<dyn IdentityProvider> = Arc::new(StaticTokens::from_config(&config.auth));
    if config.auth.tokens.is_empty() {
        warn!("No auth tokens configured; every authenticated route will return 401");
    }

    if config.database.url.is_empty() {
        warn!("database.url is empty; using the in-memory store (data is lost on exit)");
        serve(&config, MemoryStore::new(), identity).await?;
        return Ok(());
    }

    let pool = PostgresPool::open(&config.database).await?;
    let result = serve(&config, pool.store(), identity).await;
    pool.close().await;
    result
}

async fn serve<S: Store>(
    config: &AppConfig,
    store: S,
    identity: Arc<dyn IdentityProvider>,
) -> Result<(), ServerError> {
    let state = Arc::new(AppState::new(store, identity));
    start_server(&config.server, state).await?;
    Ok(())
}

/// Install the global subscriber. `RUST_LOG` overrides `logging.level`.
fn init_logging(logging: &LoggingConfig) -> Result<(), ServerError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .map_err(|e| ServerError::Logging {
            message: format!("invalid log level {:?}: {e}", logging.level),
        })?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}
