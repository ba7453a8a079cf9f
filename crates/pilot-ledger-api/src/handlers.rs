//! Status, identity and pilot endpoint handlers, plus shared helpers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Service banner |
//! | `GET` | `/health` | Liveness check |
//! | `GET` | `/auth/me` | The caller's profile |
//! | `GET` | `/pilots` | The caller's pilots |
//! | `POST` | `/pilots` | Create a pilot |
//! | `POST` | `/pilots/import` | Import a character log export (CSV body) |
//! | `GET` | `/pilots/{id}` | One pilot |
//! | `PUT` | `/pilots/{id}` | Edit the profile fields |
//! | `DELETE` | `/pilots/{id}` | Delete a pilot and everything it owns |
//!
//! A pilot owned by someone else is reported as not found.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use chrono::Utc;
use pilot_ledger_core::import::parse_al_csv;
use pilot_ledger_core::store::{PilotStore, UserStore};
use pilot_ledger_core::{Store, ll_clock_segments};
use pilot_ledger_types::{NewPilot, Pilot, PilotId, PilotUpdate, User};
use serde::Serialize;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

/// A pilot with the capacity of its current license-level clock.
#[derive(Debug, Clone, Serialize)]
pub struct PilotView {
    /// The stored pilot.
    #[serde(flatten)]
    pub pilot: Pilot,
    /// Segments on the clock for the pilot's current level.
    pub ll_clock_segments: i32,
}

impl From<Pilot> for PilotView {
    fn from(pilot: Pilot) -> Self {
        let ll_clock_segments = ll_clock_segments(pilot.license_level);
        Self {
            pilot,
            ll_clock_segments,
        }
    }
}

// ---------------------------------------------------------------------------
// GET / and GET /health
// ---------------------------------------------------------------------------

/// Service banner.
pub async fn index() -> Json<Value> {
    Json(serde_json::json!({
        "service": "pilot-ledger",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Liveness check.
pub async fn health() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// GET /auth/me
// ---------------------------------------------------------------------------

/// The caller's stored profile, registering it on first sight.
pub async fn me<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
) -> Result<Json<User>, ApiError> {
    let stored = register_user(&state, &user).await?;
    Ok(Json(stored))
}

// ---------------------------------------------------------------------------
// /pilots
// ---------------------------------------------------------------------------

/// The caller's pilots, newest first.
pub async fn list_pilots<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<PilotView>>, ApiError> {
    let pilots = state.store().list_pilots(Some(user.id)).await?;
    Ok(Json(pilots.into_iter().map(PilotView::from).collect()))
}

/// Create a pilot with zero-valued derived state.
pub async fn create_pilot<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Json(input): Json<NewPilot>,
) -> Result<Json<PilotView>, ApiError> {
    input.validate()?;
    register_user(&state, &user).await?;

    let mut pilot = Pilot::new(user.id, input.name);
    pilot.callsign = input.callsign;
    pilot.background = input.background;
    pilot.notes = input.notes;
    state.store().insert_pilot(&pilot).await?;

    info!(pilot_id = %pilot.id, user_id = %user.id, "Pilot created");
    Ok(Json(PilotView::from(pilot)))
}

/// One of the caller's pilots.
pub async fn get_pilot<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<PilotView>, ApiError> {
    let pilot = owned_pilot(&state, &user, PilotId::from(parse_uuid(&id)?)).await?;
    Ok(Json(PilotView::from(pilot)))
}

/// Edit profile fields. Derived fields cannot be set through this route.
pub async fn update_pilot<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(update): Json<PilotUpdate>,
) -> Result<Json<PilotView>, ApiError> {
    update.validate()?;
    let mut pilot = owned_pilot(&state, &user, PilotId::from(parse_uuid(&id)?)).await?;

    if let Some(name) = update.name {
        pilot.name = name;
    }
    if let Some(callsign) = update.callsign {
        pilot.callsign = Some(callsign);
    }
    if let Some(background) = update.background {
        pilot.background = Some(background);
    }
    if let Some(notes) = update.notes {
        pilot.notes = Some(notes);
    }
    pilot.updated_at = Utc::now();

    if !state.store().save_pilot_profile(&pilot).await? {
        return Err(ApiError::not_found("Pilot"));
    }
    Ok(Json(PilotView::from(pilot)))
}

/// Delete a pilot and everything it owns.
pub async fn delete_pilot<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let pilot = owned_pilot(&state, &user, PilotId::from(parse_uuid(&id)?)).await?;
    if !state.service.delete_pilot(pilot.id).await? {
        return Err(ApiError::not_found("Pilot"));
    }
    Ok(deleted("Pilot"))
}

/// Create a pilot from an Adventurers League character log export.
///
/// The request body is the raw CSV text. The pilot's derived state comes
/// from replaying the imported log, not from the export's totals.
pub async fn import_pilot<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    body: String,
) -> Result<Json<PilotView>, ApiError> {
    if body.trim().is_empty() {
        return Err(ApiError::BadRequest(String::from("empty CSV body")));
    }
    let imported = parse_al_csv(&body)?;
    register_user(&state, &user).await?;

    let pilot = state.service.import_pilot(user.id, imported).await?;
    Ok(Json(PilotView::from(pilot)))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a UUID path segment, returning [`ApiError::BadRequest`] on failure.
pub(crate) fn parse_uuid(s: &str) -> Result<Uuid, ApiError> {
    s.parse::<Uuid>()
        .map_err(|e| ApiError::BadRequest(format!("invalid UUID {s}: {e}")))
}

/// Load a pilot the caller owns. Anyone else's pilot is not found.
pub(crate) async fn owned_pilot<S: Store>(
    state: &AppState<S>,
    user: &User,
    id: PilotId,
) -> Result<Pilot, ApiError> {
    state
        .store()
        .get_pilot(id)
        .await?
        .filter(|pilot| pilot.user_id == user.id)
        .ok_or_else(|| ApiError::not_found("Pilot"))
}

/// Check that the caller may touch a resource hanging off `pilot_id`.
///
/// Campaign resources (no pilot) are GM-only. A resource whose pilot is
/// owned by someone else is forbidden.
pub(crate) async fn authorize_child<S: Store>(
    state: &AppState<S>,
    user: &User,
    pilot_id: Option<PilotId>,
) -> Result<(), ApiError> {
    let allowed = match pilot_id {
        Some(id) => state
            .store()
            .get_pilot(id)
            .await?
            .is_some_and(|pilot| pilot.user_id == user.id),
        None => user.is_gm,
    };
    if allowed {
        Ok(())
    } else {
        Err(ApiError::Forbidden(String::from("Not authorized")))
    }
}

/// Store the caller's profile and return the stored row.
pub(crate) async fn register_user<S: Store>(
    state: &AppState<S>,
    user: &User,
) -> Result<User, ApiError> {
    state.store().upsert_user(user).await?;
    Ok(state.store().get_user(user.id).await?.unwrap_or_else(|| user.clone()))
}

/// Standard body for a successful delete.
pub(crate) fn deleted(kind: &str) -> Json<Value> {
    Json(serde_json::json!({ "message": format!("{kind} deleted successfully") }))
}
