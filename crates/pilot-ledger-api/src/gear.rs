//! Exotic gear endpoints.
//!
//! Gear created here has no granting log entry. Gear gained or lost in a
//! session is recorded through the log instead, so deleting that entry
//! undoes it.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use chrono::Utc;
use pilot_ledger_core::Store;
use pilot_ledger_core::store::InventoryStore;
use pilot_ledger_types::{Gear, GearId, GearUpdate, NewGear, PilotId, User};
use serde_json::Value;
use validator::Validate;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::{authorize_child, deleted, owned_pilot, parse_uuid};
use crate::state::AppState;

/// Gear of one of the caller's pilots, held and lost alike.
pub async fn list_gear<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<Gear>>, ApiError> {
    let pilot = owned_pilot(&state, &user, PilotId::from(parse_uuid(&id)?)).await?;
    Ok(Json(state.store().list_gear(pilot.id).await?))
}

/// Add an item directly to a pilot's inventory.
pub async fn create_gear<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(input): Json<NewGear>,
) -> Result<Json<Gear>, ApiError> {
    input.validate()?;
    let pilot = owned_pilot(&state, &user, PilotId::from(parse_uuid(&id)?)).await?;

    let mut gear = Gear::new(pilot.id, input.name);
    gear.description = input.description;
    gear.notes = input.notes;
    state.store().insert_gear(&gear).await?;
    Ok(Json(gear))
}

/// Edit an item's name, description or notes.
pub async fn update_gear<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(update): Json<GearUpdate>,
) -> Result<Json<Gear>, ApiError> {
    update.validate()?;
    let mut gear = authorized_gear(&state, &user, &id).await?;

    if let Some(name) = update.name {
        gear.name = name;
    }
    if let Some(description) = update.description {
        gear.description = Some(description);
    }
    if let Some(notes) = update.notes {
        gear.notes = Some(notes);
    }
    gear.updated_at = Utc::now();

    if !state.store().save_gear(&gear).await? {
        return Err(ApiError::not_found("Gear"));
    }
    Ok(Json(gear))
}

/// Remove an item.
pub async fn delete_gear<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let gear = authorized_gear(&state, &user, &id).await?;
    if !state.service.delete_gear(gear.id).await? {
        return Err(ApiError::not_found("Gear"));
    }
    Ok(deleted("Gear"))
}

async fn authorized_gear<S: Store>(
    state: &AppState<S>,
    user: &User,
    id: &str,
) -> Result<Gear, ApiError> {
    let gear = state
        .store()
        .get_gear(GearId::from(parse_uuid(id)?))
        .await?
        .ok_or_else(|| ApiError::not_found("Gear"))?;
    authorize_child(state, user, Some(gear.pilot_id)).await?;
    Ok(gear)
}
