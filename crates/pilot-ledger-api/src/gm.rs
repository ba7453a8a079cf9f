//! Campaign-wide views for game masters.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/gm/pilots` | Every pilot with its owner's name |
//! | `GET` | `/gm/logs` | Filtered, paged log listing across all pilots |

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use pilot_ledger_core::Store;
use pilot_ledger_core::store::{LogStore, PilotStore, UserStore};
use pilot_ledger_types::{
    LogEntry, LogFilter, LogType, Pilot, PilotId, ResourceDirection, User, UserId,
};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::{PilotView, parse_uuid};
use crate::state::AppState;

/// Largest page the log listing serves.
pub const MAX_LOG_PAGE: u32 = 200;

/// Page size when `limit` is omitted.
pub const DEFAULT_LOG_PAGE: u32 = 50;

/// Query parameters for `GET /gm/logs`.
#[derive(Debug, Default, Deserialize)]
pub struct GmLogsQuery {
    /// Only entries of this pilot.
    pub pilot_id: Option<String>,
    /// Only entries of this kind.
    pub log_type: Option<LogType>,
    /// `increase` or `decrease`.
    pub resource_direction: Option<ResourceDirection>,
    /// Only entries whose owner has this Discord id. Applied after paging.
    pub user_discord_id: Option<String>,
    /// Page size, `1..=200`.
    pub limit: Option<u32>,
    /// Page offset.
    pub offset: Option<u32>,
}

impl GmLogsQuery {
    /// Convert to a store filter, rejecting out-of-range paging.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::BadRequest`] for a bad `limit` or `pilot_id`.
    pub fn to_filter(&self) -> Result<LogFilter, ApiError> {
        let limit = self.limit.unwrap_or(DEFAULT_LOG_PAGE);
        if !(1..=MAX_LOG_PAGE).contains(&limit) {
            return Err(ApiError::BadRequest(format!(
                "limit must be between 1 and {MAX_LOG_PAGE}"
            )));
        }
        let pilot_id = self
            .pilot_id
            .as_deref()
            .map(parse_uuid)
            .transpose()?
            .map(PilotId::from);
        Ok(LogFilter {
            pilot_id,
            log_type: self.log_type,
            resource_direction: self.resource_direction,
            limit,
            offset: self.offset.unwrap_or(0),
        })
    }
}

/// A pilot with its owner's visible name.
#[derive(Debug, Clone, Serialize)]
pub struct GmPilotView {
    /// The pilot and its clock capacity.
    #[serde(flatten)]
    pub pilot: PilotView,
    /// Owner's display name or Discord username.
    pub owner_name: String,
}

/// A log entry with the pilot and owner it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct GmLogView {
    /// The entry.
    #[serde(flatten)]
    pub entry: LogEntry,
    /// Pilot name.
    pub pilot_name: String,
    /// Pilot callsign.
    pub pilot_callsign: Option<String>,
    /// Owner's Discord id.
    pub owner_discord_id: Option<String>,
    /// Owner's visible name.
    pub owner_name: String,
}

/// One page of the campaign log.
#[derive(Debug, Clone, Serialize)]
pub struct GmLogPage {
    /// Entries, newest first.
    pub logs: Vec<GmLogView>,
    /// Entries on this page.
    pub total: usize,
    /// Page size requested.
    pub limit: u32,
    /// Offset requested.
    pub offset: u32,
}

/// Every pilot, newest first, with its owner's name.
pub async fn list_all_pilots<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    auth: AuthUser,
) -> Result<Json<Vec<GmPilotView>>, ApiError> {
    auth.require_gm()?;
    let mut owners = OwnerCache::default();
    let mut views = Vec::new();
    for pilot in state.store().list_pilots(None).await? {
        let owner_name = owners
            .lookup(state.store(), Some(pilot.user_id))
            .await?
            .map_or_else(|| String::from("Unknown"), |u| u.visible_name().to_owned());
        views.push(GmPilotView {
            pilot: PilotView::from(pilot),
            owner_name,
        });
    }
    Ok(Json(views))
}

/// Campaign-wide log listing.
pub async fn list_all_logs<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    auth: AuthUser,
    Query(params): Query<GmLogsQuery>,
) -> Result<Json<GmLogPage>, ApiError> {
    auth.require_gm()?;
    let filter = params.to_filter()?;
    let entries = state.store().query_logs(&filter).await?;

    let mut pilots: BTreeMap<PilotId, Option<Pilot>> = BTreeMap::new();
    let mut owners = OwnerCache::default();
    let mut logs = Vec::with_capacity(entries.len());
    for entry in entries {
        if !pilots.contains_key(&entry.pilot_id) {
            let loaded = state.store().get_pilot(entry.pilot_id).await?;
            pilots.insert(entry.pilot_id, loaded);
        }
        let pilot = pilots.get(&entry.pilot_id).cloned().flatten();
        let owner = owners
            .lookup(state.store(), pilot.as_ref().map(|p| p.user_id))
            .await?;
        let owner_discord_id = owner.as_ref().and_then(|u| u.discord_id.clone());
        if let Some(wanted) = params.user_discord_id.as_deref()
            && owner_discord_id.as_deref() != Some(wanted)
        {
            continue;
        }
        logs.push(GmLogView {
            pilot_name: pilot
                .as_ref()
                .map_or_else(|| String::from("Unknown"), |p| p.name.clone()),
            pilot_callsign: pilot.and_then(|p| p.callsign),
            owner_name: owner
                .as_ref()
                .map_or_else(|| String::from("Unknown"), |u| u.visible_name().to_owned()),
            owner_discord_id,
            entry,
        });
    }

    Ok(Json(GmLogPage {
        total: logs.len(),
        logs,
        limit: filter.limit,
        offset: filter.offset,
    }))
}

/// Per-request memo of user lookups.
#[derive(Default)]
struct OwnerCache {
    users: BTreeMap<UserId, Option<User>>,
}

impl OwnerCache {
    async fn lookup<S: Store>(
        &mut self,
        store: &S,
        id: Option<UserId>,
    ) -> Result<Option<User>, ApiError> {
        let Some(id) = id else {
            return Ok(None);
        };
        if let Some(cached) = self.users.get(&id) {
            return Ok(cached.clone());
        }
        let loaded = store.get_user(id).await?;
        self.users.insert(id, loaded.clone());
        Ok(loaded)
    }
}
