//! Clock endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use chrono::Utc;
use pilot_ledger_core::Store;
use pilot_ledger_core::store::ClockStore;
use pilot_ledger_types::{Clock, ClockId, ClockTick, ClockUpdate, NewClock, PilotId, User};
use serde_json::Value;
use tracing::info;
use validator::Validate;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::{authorize_child, deleted, owned_pilot, parse_uuid};
use crate::state::AppState;

/// Clocks of one of the caller's pilots.
pub async fn list_clocks<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<Clock>>, ApiError> {
    let pilot = owned_pilot(&state, &user, PilotId::from(parse_uuid(&id)?)).await?;
    Ok(Json(state.store().list_clocks(Some(pilot.id)).await?))
}

/// Create a personal clock. `segments` and `tick_amount` must be at least 1.
pub async fn create_clock<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(input): Json<NewClock>,
) -> Result<Json<Clock>, ApiError> {
    input.validate()?;
    let pilot = owned_pilot(&state, &user, PilotId::from(parse_uuid(&id)?)).await?;

    let clock = Clock::new(Some(pilot.id), input.name, input.segments, input.tick_amount);
    state.store().insert_clock(&clock).await?;
    info!(clock_id = %clock.id, pilot_id = %pilot.id, segments = clock.segments, "Clock created");
    Ok(Json(clock))
}

/// Edit a clock's definition.
///
/// The log is not replayed; only this clock's fill is refreshed so it stays
/// within the new capacity.
pub async fn update_clock<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(update): Json<ClockUpdate>,
) -> Result<Json<Clock>, ApiError> {
    update.validate()?;
    let mut clock = authorized_clock(&state, &user, &id).await?;

    if let Some(name) = update.name {
        clock.name = name;
    }
    if let Some(segments) = update.segments {
        clock.segments = segments;
    }
    if let Some(tick_amount) = update.tick_amount {
        clock.tick_amount = tick_amount;
    }
    clock.updated_at = Utc::now();

    state
        .service
        .save_clock(&clock)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Clock"))
}

/// Tick a clock outside the log. Negative ticks remove fill.
pub async fn tick_clock<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(tick): Json<ClockTick>,
) -> Result<Json<Clock>, ApiError> {
    let clock = authorized_clock(&state, &user, &id).await?;
    state
        .service
        .tick_clock(clock.id, tick.ticks)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Clock"))
}

/// Delete a clock and its progress links.
pub async fn delete_clock<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let clock = authorized_clock(&state, &user, &id).await?;
    if !state.service.delete_clock(clock.id).await? {
        return Err(ApiError::not_found("Clock"));
    }
    Ok(deleted("Clock"))
}

async fn authorized_clock<S: Store>(
    state: &AppState<S>,
    user: &User,
    id: &str,
) -> Result<Clock, ApiError> {
    let clock = state
        .store()
        .get_clock(ClockId::from(parse_uuid(id)?))
        .await?
        .ok_or_else(|| ApiError::not_found("Clock"))?;
    authorize_child(state, user, clock.pilot_id).await?;
    Ok(clock)
}
