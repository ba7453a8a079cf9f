//! Corporation and reputation endpoints.
//!
//! Corporations are campaign-wide: any user may list them, only GMs may
//! change them. A standing's `reputation_value` is derived from its
//! `base_value` and the pilot's logged changes, so edits go through
//! [`pilot_ledger_core::LogService`] and replay the pilot.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use chrono::Utc;
use pilot_ledger_core::{OpenedStanding, Store};
use pilot_ledger_core::store::FactionStore;
use pilot_ledger_types::{
    Corporation, CorporationId, CorporationUpdate, NewCorporation, NewReputation, PilotId,
    Reputation, ReputationId, ReputationUpdate, User,
};
use serde::Serialize;
use serde_json::Value;
use tracing::info;
use validator::Validate;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::{authorize_child, deleted, owned_pilot, parse_uuid};
use crate::state::AppState;

/// A standing with the corporation's name.
#[derive(Debug, Clone, Serialize)]
pub struct ReputationView {
    /// The stored standing.
    #[serde(flatten)]
    pub reputation: Reputation,
    /// Name of the corporation, `"Unknown"` if it no longer resolves.
    pub corporation_name: String,
}

// ---------------------------------------------------------------------------
// /corporations
// ---------------------------------------------------------------------------

/// Every corporation, by name.
pub async fn list_corporations<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(_user): AuthUser,
) -> Result<Json<Vec<Corporation>>, ApiError> {
    Ok(Json(state.store().list_corporations().await?))
}

/// Create a corporation (GM only).
pub async fn create_corporation<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    auth: AuthUser,
    Json(input): Json<NewCorporation>,
) -> Result<Json<Corporation>, ApiError> {
    auth.require_gm()?;
    input.validate()?;

    let now = Utc::now();
    let corporation = Corporation {
        id: CorporationId::new(),
        name: input.name,
        description: input.description,
        created_at: now,
        updated_at: now,
    };
    state.store().insert_corporation(&corporation).await?;
    info!(corporation_id = %corporation.id, name = %corporation.name, "Corporation created");
    Ok(Json(corporation))
}

/// Edit a corporation (GM only).
pub async fn update_corporation<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(update): Json<CorporationUpdate>,
) -> Result<Json<Corporation>, ApiError> {
    auth.require_gm()?;
    update.validate()?;
    let mut corporation = state
        .store()
        .get_corporation(CorporationId::from(parse_uuid(&id)?))
        .await?
        .ok_or_else(|| ApiError::not_found("Corporation"))?;

    if let Some(name) = update.name {
        corporation.name = name;
    }
    if let Some(description) = update.description {
        corporation.description = Some(description);
    }
    corporation.updated_at = Utc::now();

    if !state.store().save_corporation(&corporation).await? {
        return Err(ApiError::not_found("Corporation"));
    }
    Ok(Json(corporation))
}

/// Delete a corporation with its standings and logged changes (GM only).
pub async fn delete_corporation<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    auth.require_gm()?;
    let id = CorporationId::from(parse_uuid(&id)?);
    if !state.store().delete_corporation(id).await? {
        return Err(ApiError::not_found("Corporation"));
    }
    info!(corporation_id = %id, "Corporation deleted");
    Ok(deleted("Corporation"))
}

// ---------------------------------------------------------------------------
// Standings
// ---------------------------------------------------------------------------

/// Standings of one of the caller's pilots, with corporation names.
pub async fn list_reputation<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<ReputationView>>, ApiError> {
    let pilot = owned_pilot(&state, &user, PilotId::from(parse_uuid(&id)?)).await?;
    let names: BTreeMap<CorporationId, String> = state
        .store()
        .list_corporations()
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    let views = state
        .store()
        .list_reputation(pilot.id)
        .await?
        .into_iter()
        .map(|reputation| ReputationView {
            corporation_name: names
                .get(&reputation.corporation_id)
                .cloned()
                .unwrap_or_else(|| String::from("Unknown")),
            reputation,
        })
        .collect();
    Ok(Json(views))
}

/// Open a standing with a corporation. A second standing with the same
/// corporation is a conflict; edit the existing one instead.
pub async fn create_reputation<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(input): Json<NewReputation>,
) -> Result<Json<Reputation>, ApiError> {
    let pilot = owned_pilot(&state, &user, PilotId::from(parse_uuid(&id)?)).await?;
    match state.service.open_standing(pilot.id, input).await? {
        OpenedStanding::Opened(standing) => Ok(Json(standing)),
        OpenedStanding::AlreadyOpen(existing) => Err(ApiError::Conflict(format!(
            "Reputation entry {} already exists for this corporation",
            existing.id
        ))),
        OpenedStanding::UnknownCorporation => Err(ApiError::not_found("Corporation")),
    }
}

/// Edit a standing's base value or notes.
pub async fn update_reputation<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(update): Json<ReputationUpdate>,
) -> Result<Json<Reputation>, ApiError> {
    let standing = authorized_standing(&state, &user, &id).await?;
    state
        .service
        .update_standing(standing.id, update)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Reputation entry"))
}

/// Remove a standing and the pilot's logged changes for its corporation.
pub async fn delete_reputation<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let standing = authorized_standing(&state, &user, &id).await?;
    if !state.service.delete_standing(standing.id).await? {
        return Err(ApiError::not_found("Reputation entry"));
    }
    Ok(deleted("Reputation entry"))
}

async fn authorized_standing<S: Store>(
    state: &AppState<S>,
    user: &User,
    id: &str,
) -> Result<Reputation, ApiError> {
    let standing = state
        .store()
        .get_reputation(ReputationId::from(parse_uuid(id)?))
        .await?
        .ok_or_else(|| ApiError::not_found("Reputation entry"))?;
    authorize_child(state, user, Some(standing.pilot_id)).await?;
    Ok(standing)
}
