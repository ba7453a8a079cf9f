//! Log entry endpoints.
//!
//! Every mutation goes through [`pilot_ledger_core::LogService`], which
//! holds the pilot's lock and replays the pilot before returning.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use pilot_ledger_core::Store;
use pilot_ledger_core::store::LogStore;
use pilot_ledger_types::{
    LogEntry, LogEntryDetails, LogEntryId, LogEntryUpdate, NewLogEntry, PilotId, User,
};
use serde_json::Value;
use validator::Validate;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::{authorize_child, deleted, owned_pilot, parse_uuid};
use crate::state::AppState;

/// Entries of one of the caller's pilots, newest first.
pub async fn list_logs<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<LogEntry>>, ApiError> {
    let pilot = owned_pilot(&state, &user, PilotId::from(parse_uuid(&id)?)).await?;
    Ok(Json(state.store().list_logs(pilot.id).await?))
}

/// Record a session with its side effects.
pub async fn create_log<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(input): Json<NewLogEntry>,
) -> Result<Json<LogEntryDetails>, ApiError> {
    input.validate()?;
    let pilot = owned_pilot(&state, &user, PilotId::from(parse_uuid(&id)?)).await?;
    state
        .service
        .create_log(pilot.id, input)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Pilot"))
}

/// One entry.
pub async fn get_log<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<LogEntry>, ApiError> {
    let entry = authorized_log(&state, &user, &id).await?;
    Ok(Json(entry))
}

/// One entry with everything it recorded.
pub async fn log_details<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<LogEntryDetails>, ApiError> {
    let entry = authorized_log(&state, &user, &id).await?;
    state
        .service
        .log_details(entry.id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Log entry"))
}

/// Edit an entry and replay its pilot.
pub async fn update_log<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(update): Json<LogEntryUpdate>,
) -> Result<Json<LogEntry>, ApiError> {
    let entry = authorized_log(&state, &user, &id).await?;
    state
        .service
        .update_log(entry.id, update)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Log entry"))
}

/// Delete an entry and replay its pilot.
pub async fn delete_log<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let entry = authorized_log(&state, &user, &id).await?;
    if !state.service.delete_log(entry.id).await? {
        return Err(ApiError::not_found("Log entry"));
    }
    Ok(deleted("Log entry"))
}

async fn authorized_log<S: Store>(
    state: &AppState<S>,
    user: &User,
    id: &str,
) -> Result<LogEntry, ApiError> {
    let entry = state
        .store()
        .get_log(LogEntryId::from(parse_uuid(id)?))
        .await?
        .ok_or_else(|| ApiError::not_found("Log entry"))?;
    authorize_child(state, user, Some(entry.pilot_id)).await?;
    Ok(entry)
}
