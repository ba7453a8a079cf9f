//! `PostgreSQL` persistence for the pilot ledger.
//!
//! [`PgStore`] implements every store trait from `pilot-ledger-core`, so the
//! replay engine and the log service run unchanged on top of it.
//!
//! # Modules
//!
//! - [`postgres`] -- Connection pool and migrations
//! - [`store`] -- [`PgStore`], the store trait implementations
//! - [`rows`] -- Row types and conversions to ledger types
//! - [`error`] -- Data layer error type

pub mod error;
pub mod postgres;
pub mod rows;
pub mod store;

// Re-export primary types for convenience.
pub use error::DbError;
pub use postgres::PostgresPool;
pub use store::PgStore;
