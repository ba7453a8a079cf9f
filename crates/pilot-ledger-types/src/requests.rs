//! Input payloads for ledger mutations.
//!
//! These are the shapes accepted by the log mutation service and the HTTP
//! API. Boundary validation (`segments >= 1`, `tick_amount >= 1`, non-empty
//! names) is declared here with `validator` and enforced by the API before a
//! payload reaches the core.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use validator::Validate;

use crate::enums::{LogType, ResourceDirection};
use crate::ids::{ClockId, CorporationId, GearId, PilotId};
use crate::structs::{ClockProgress, Gear, LogEntry, ReputationChange};

const fn default_ticks() -> i32 {
    1
}

const fn default_tick_amount() -> i32 {
    1
}

// ---------------------------------------------------------------------------
// Pilots
// ---------------------------------------------------------------------------

/// Payload for creating a pilot.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NewPilot {
    /// Pilot name.
    #[validate(length(min = 1))]
    pub name: String,
    /// Callsign.
    #[serde(default)]
    pub callsign: Option<String>,
    /// Background.
    #[serde(default)]
    pub background: Option<String>,
    /// Notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update of a pilot's profile. Derived fields are not editable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PilotUpdate {
    /// New name.
    #[validate(length(min = 1))]
    #[serde(default)]
    pub name: Option<String>,
    /// New callsign.
    #[serde(default)]
    pub callsign: Option<String>,
    /// New background.
    #[serde(default)]
    pub background: Option<String>,
    /// New notes.
    #[serde(default)]
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Clocks
// ---------------------------------------------------------------------------

/// Payload for creating a clock.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NewClock {
    /// Clock name.
    #[validate(length(min = 1))]
    pub name: String,
    /// Total capacity.
    #[validate(range(min = 1))]
    pub segments: i32,
    /// Fill added per tick.
    #[validate(range(min = 1))]
    #[serde(default = "default_tick_amount")]
    pub tick_amount: i32,
}

/// Partial update of a clock definition. Never triggers a log replay.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ClockUpdate {
    /// New name.
    #[validate(length(min = 1))]
    #[serde(default)]
    pub name: Option<String>,
    /// New capacity.
    #[validate(range(min = 1))]
    #[serde(default)]
    pub segments: Option<i32>,
    /// New per-tick fill.
    #[validate(range(min = 1))]
    #[serde(default)]
    pub tick_amount: Option<i32>,
}

/// A direct tick applied to a clock outside the log.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ClockTick {
    /// Ticks to add (negative to remove).
    #[serde(default = "default_ticks")]
    pub ticks: i32,
}

// ---------------------------------------------------------------------------
// Log entries
// ---------------------------------------------------------------------------

/// Clock progress contributed by a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ClockProgressInput {
    /// Target clock.
    pub clock_id: ClockId,
    /// Ticks to apply.
    #[serde(default = "default_ticks")]
    pub ticks_applied: i32,
}

/// Gear obtained in a log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GearAcquiredInput {
    /// Item name.
    #[validate(length(min = 1))]
    pub name: String,
    /// Item description.
    #[serde(default)]
    pub description: Option<String>,
    /// Notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Existing gear lost in a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GearLostInput {
    /// The gear being lost.
    pub gear_id: GearId,
}

/// A reputation delta recorded in a log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ReputationChangeInput {
    /// Corporation affected.
    pub corporation_id: CorporationId,
    /// Signed delta.
    pub change_value: i32,
    /// Notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Payload for creating a log entry together with its side effects.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NewLogEntry {
    /// Session kind.
    pub log_type: LogType,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Manna change.
    #[serde(default)]
    pub manna_change: i64,
    /// Downtime change.
    #[serde(default)]
    pub downtime_change: i64,
    /// License-level ticks; clamped to `0..=25` on write.
    #[serde(default)]
    pub ll_clock_change: i32,
    /// Clock progress links.
    #[serde(default)]
    pub clock_progress: Vec<ClockProgressInput>,
    /// Gear obtained.
    #[validate(nested)]
    #[serde(default)]
    pub gear_acquired: Vec<GearAcquiredInput>,
    /// Gear lost.
    #[serde(default)]
    pub gear_lost: Vec<GearLostInput>,
    /// Reputation changes.
    #[serde(default)]
    pub reputation_changes: Vec<ReputationChangeInput>,
}

impl NewLogEntry {
    /// A bare entry with only resource changes and no side effects.
    pub const fn resources(
        log_type: LogType,
        manna_change: i64,
        downtime_change: i64,
        ll_clock_change: i32,
    ) -> Self {
        Self {
            log_type,
            description: None,
            manna_change,
            downtime_change,
            ll_clock_change,
            clock_progress: Vec::new(),
            gear_acquired: Vec::new(),
            gear_lost: Vec::new(),
            reputation_changes: Vec::new(),
        }
    }
}

/// Partial update of a log entry.
///
/// When `clock_progress` is present the entry's links are replaced wholesale
/// (delete-all-then-reinsert).
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LogEntryUpdate {
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// New manna change.
    #[serde(default)]
    pub manna_change: Option<i64>,
    /// New downtime change.
    #[serde(default)]
    pub downtime_change: Option<i64>,
    /// New license-level ticks; clamped to `0..=25` on write.
    #[serde(default)]
    pub ll_clock_change: Option<i32>,
    /// Replacement clock progress links.
    #[serde(default)]
    pub clock_progress: Option<Vec<ClockProgressInput>>,
}

/// A log entry with every side effect it recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LogEntryDetails {
    /// The entry itself.
    #[serde(flatten)]
    pub entry: LogEntry,
    /// Clock progress links.
    pub clock_progress: Vec<ClockProgress>,
    /// Gear granted by this entry.
    pub gear_acquired: Vec<Gear>,
    /// Gear lost in this entry.
    pub gear_lost: Vec<Gear>,
    /// Reputation changes recorded by this entry.
    pub reputation_changes: Vec<ReputationChange>,
}

/// Filter for the campaign-wide log listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LogFilter {
    /// Only entries of this pilot.
    pub pilot_id: Option<PilotId>,
    /// Only entries of this kind.
    pub log_type: Option<LogType>,
    /// Only entries whose resources moved in this direction.
    pub resource_direction: Option<ResourceDirection>,
    /// Page size.
    pub limit: u32,
    /// Page offset.
    pub offset: u32,
}

impl Default for LogFilter {
    fn default() -> Self {
        Self {
            pilot_id: None,
            log_type: None,
            resource_direction: None,
            limit: 50,
            offset: 0,
        }
    }
}

impl LogFilter {
    /// Whether an entry passes the pilot, type and direction filters.
    pub fn matches(&self, entry: &LogEntry) -> bool {
        if self.pilot_id.is_some_and(|id| id != entry.pilot_id) {
            return false;
        }
        if self.log_type.is_some_and(|t| t != entry.log_type) {
            return false;
        }
        match self.resource_direction {
            Some(ResourceDirection::Increase) => entry.manna_change > 0 || entry.downtime_change > 0,
            Some(ResourceDirection::Decrease) => entry.manna_change < 0 || entry.downtime_change < 0,
            None => true,
        }
    }
}

// ---------------------------------------------------------------------------
// Gear, corporations, reputation
// ---------------------------------------------------------------------------

/// Payload for adding gear directly (outside a log entry).
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NewGear {
    /// Item name.
    #[validate(length(min = 1))]
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update of a gear row.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GearUpdate {
    /// New name.
    #[validate(length(min = 1))]
    #[serde(default)]
    pub name: Option<String>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// New notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Payload for creating a corporation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NewCorporation {
    /// Name.
    #[validate(length(min = 1))]
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial update of a corporation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CorporationUpdate {
    /// New name.
    #[validate(length(min = 1))]
    #[serde(default)]
    pub name: Option<String>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Payload for opening a standing with a corporation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NewReputation {
    /// Corporation.
    pub corporation_id: CorporationId,
    /// Starting value.
    #[serde(default)]
    pub base_value: i32,
    /// Notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update of a standing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ReputationUpdate {
    /// New starting value.
    #[serde(default)]
    pub base_value: Option<i32>,
    /// New notes.
    #[serde(default)]
    pub notes: Option<String>,
}
