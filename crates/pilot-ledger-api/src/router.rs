//! Axum router construction for the ledger API.
//!
//! Assembles every route into a single [`Router`] with CORS and HTTP
//! tracing middleware.

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post, put};
use pilot_ledger_core::Store;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{clocks, gear, gm, handlers, logs, reputation};

/// Build the complete Axum router.
///
/// `cors_origins` lists the browser origins allowed to call the API. An
/// empty list, or one containing `*`, allows any origin.
pub fn build_router<S: Store>(state: Arc<AppState<S>>, cors_origins: &[String]) -> Router {
    Router::new()
        // Status
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/auth/me", get(handlers::me::<S>))
        // Pilots
        .route(
            "/pilots",
            get(handlers::list_pilots::<S>).post(handlers::create_pilot::<S>),
        )
        .route("/pilots/import", post(handlers::import_pilot::<S>))
        .route(
            "/pilots/{id}",
            get(handlers::get_pilot::<S>)
                .put(handlers::update_pilot::<S>)
                .delete(handlers::delete_pilot::<S>),
        )
        // Log entries
        .route(
            "/pilots/{id}/logs",
            get(logs::list_logs::<S>).post(logs::create_log::<S>),
        )
        .route(
            "/logs/{id}",
            get(logs::get_log::<S>)
                .put(logs::update_log::<S>)
                .delete(logs::delete_log::<S>),
        )
        .route("/logs/{id}/details", get(logs::log_details::<S>))
        // Clocks
        .route(
            "/pilots/{id}/clocks",
            get(clocks::list_clocks::<S>).post(clocks::create_clock::<S>),
        )
        .route(
            "/clocks/{id}",
            put(clocks::update_clock::<S>).delete(clocks::delete_clock::<S>),
        )
        .route("/clocks/{id}/tick", post(clocks::tick_clock::<S>))
        // Gear
        .route(
            "/pilots/{id}/gear",
            get(gear::list_gear::<S>).post(gear::create_gear::<S>),
        )
        .route(
            "/gear/{id}",
            put(gear::update_gear::<S>).delete(gear::delete_gear::<S>),
        )
        // Corporations and reputation
        .route(
            "/corporations",
            get(reputation::list_corporations::<S>).post(reputation::create_corporation::<S>),
        )
        .route(
            "/corporations/{id}",
            put(reputation::update_corporation::<S>).delete(reputation::delete_corporation::<S>),
        )
        .route(
            "/pilots/{id}/reputation",
            get(reputation::list_reputation::<S>).post(reputation::create_reputation::<S>),
        )
        .route(
            "/reputation/{id}",
            put(reputation::update_reputation::<S>).delete(reputation::delete_reputation::<S>),
        )
        // GM views
        .route("/gm/pilots", get(gm::list_all_pilots::<S>))
        .route("/gm/logs", get(gm::list_all_logs::<S>))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy for the configured origins.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(parsed)
}
