//! Error types for the server binary.

/// Top-level error for the server binary.
///
/// Each variant wraps a subsystem error so `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: pilot_ledger_core::config::ConfigError,
    },

    /// Connecting to or migrating the database failed.
    #[error("database error: {source}")]
    Database {
        /// The underlying database error.
        #[from]
        source: pilot_ledger_db::DbError,
    },

    /// The HTTP server failed to bind or stopped with an error.
    #[error("http error: {source}")]
    Http {
        /// The underlying server error.
        #[from]
        source: pilot_ledger_api::ServerError,
    },

    /// The log filter directive could not be parsed.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the failure.
        message: String,
    },
}
