//! HTTP API for the pilot ledger.
//!
//! An Axum server exposing pilots, their session log, clocks, exotic gear,
//! corporations and reputation, plus campaign-wide views for game masters.
//! Every log mutation goes through [`pilot_ledger_core::LogService`], so a
//! pilot's derived state always equals the replay of its log.
//!
//! # Modules
//!
//! - [`auth`] -- Bearer identity and the [`auth::AuthUser`] extractor
//! - [`handlers`] -- Status, identity and pilot routes, shared helpers
//! - [`logs`] -- Log entry routes
//! - [`clocks`] -- Clock routes
//! - [`gear`] -- Exotic gear routes
//! - [`reputation`] -- Corporation and standing routes
//! - [`gm`] -- Campaign-wide GM views
//! - [`router`] -- Route table, CORS and tracing layers
//! - [`server`] -- Listener lifecycle
//! - [`state`] -- [`AppState`]
//! - [`error`] -- [`ApiError`] and its HTTP mapping
//!
//! [`AppState`]: state::AppState
//! [`ApiError`]: error::ApiError

pub mod auth;
pub mod clocks;
pub mod error;
pub mod gear;
pub mod gm;
pub mod handlers;
pub mod logs;
pub mod reputation;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use auth::{AuthUser, IdentityProvider, StaticTokens};
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use state::AppState;
