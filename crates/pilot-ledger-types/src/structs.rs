//! Core entity structs: the rows the ledger persists.
//!
//! Derived fields (pilot resources, clock fill, reputation value) are written
//! only by the recalculation engine in `pilot-ledger-core`. Everything else is
//! plain CRUD data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::LogType;
use crate::ids::{
    ClockId, CorporationId, GearId, LogEntryId, PilotId, ReputationChangeId, ReputationId, UserId,
};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// A user account. Identity is resolved by an external provider; this row
/// holds the profile the ledger needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct User {
    /// User id (matches the identity provider's subject).
    pub id: UserId,
    /// Discord account id, if linked.
    pub discord_id: Option<String>,
    /// Discord username, if linked.
    pub discord_username: Option<String>,
    /// Display name chosen by the user.
    pub display_name: Option<String>,
    /// Whether the user has game-master privileges.
    pub is_gm: bool,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Name shown to other users: display name, then Discord username.
    pub fn visible_name(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.discord_username.as_deref())
            .unwrap_or("Unknown")
    }
}

// ---------------------------------------------------------------------------
// Pilots
// ---------------------------------------------------------------------------

/// The replay-derived numeric state of a pilot.
///
/// Never authoritative on its own: it is always the result of replaying the
/// pilot's full log history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PilotResources {
    /// Sum of every log entry's manna change.
    pub manna: i64,
    /// Sum of every log entry's downtime change.
    pub downtime: i64,
    /// License level, 0 through 12.
    pub license_level: i32,
    /// Partial fill of the current license level's clock.
    pub ll_clock_progress: i32,
}

/// A pilot character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Pilot {
    /// Pilot id.
    pub id: PilotId,
    /// Owning user.
    pub user_id: UserId,
    /// Pilot name.
    pub name: String,
    /// Callsign, if any.
    pub callsign: Option<String>,
    /// Free-form background.
    pub background: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// License level, 0 through 12 (derived).
    pub license_level: i32,
    /// Partial fill of the current license level's clock (derived).
    pub ll_clock_progress: i32,
    /// Manna balance (derived, may be negative).
    pub manna: i64,
    /// Downtime balance (derived, may be negative).
    pub downtime: i64,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl Pilot {
    /// Build a fresh pilot with zero-valued derived state.
    pub fn new(user_id: UserId, name: String) -> Self {
        let now = Utc::now();
        Self {
            id: PilotId::new(),
            user_id,
            name,
            callsign: None,
            background: None,
            notes: None,
            license_level: 0,
            ll_clock_progress: 0,
            manna: 0,
            downtime: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// The derived fields as a single value.
    pub const fn resources(&self) -> PilotResources {
        PilotResources {
            manna: self.manna,
            downtime: self.downtime,
            license_level: self.license_level,
            ll_clock_progress: self.ll_clock_progress,
        }
    }

    /// Overwrite the derived fields.
    pub const fn apply_resources(&mut self, resources: PilotResources) {
        self.manna = resources.manna;
        self.downtime = resources.downtime;
        self.license_level = resources.license_level;
        self.ll_clock_progress = resources.ll_clock_progress;
    }
}

// ---------------------------------------------------------------------------
// Clocks
// ---------------------------------------------------------------------------

/// A capped, fillable progress clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Clock {
    /// Clock id.
    pub id: ClockId,
    /// Owning pilot; `None` for campaign-wide clocks.
    pub pilot_id: Option<PilotId>,
    /// Clock name.
    pub name: String,
    /// Total capacity (at least 1).
    pub segments: i32,
    /// Fill added per tick (at least 1).
    pub tick_amount: i32,
    /// Ticks applied directly, outside the log.
    pub manual_ticks: i32,
    /// Current fill, `0..=segments` (derived).
    pub filled: i32,
    /// Whether the clock is full (derived).
    pub is_completed: bool,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl Clock {
    /// Build an empty clock definition.
    pub fn new(pilot_id: Option<PilotId>, name: String, segments: i32, tick_amount: i32) -> Self {
        let now = Utc::now();
        Self {
            id: ClockId::new(),
            pilot_id,
            name,
            segments,
            tick_amount,
            manual_ticks: 0,
            filled: 0,
            is_completed: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One contribution of ticks from a log entry to a clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ClockProgress {
    /// The contributing log entry.
    pub log_entry_id: LogEntryId,
    /// The clock receiving ticks.
    pub clock_id: ClockId,
    /// Ticks contributed (may be negative).
    pub ticks_applied: i32,
}

// ---------------------------------------------------------------------------
// Log entries
// ---------------------------------------------------------------------------

/// One entry in a pilot's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LogEntry {
    /// Entry id.
    pub id: LogEntryId,
    /// Owning pilot.
    pub pilot_id: PilotId,
    /// Session kind.
    pub log_type: LogType,
    /// Free-form description.
    pub description: Option<String>,
    /// Manna gained or spent.
    pub manna_change: i64,
    /// Downtime gained or spent.
    pub downtime_change: i64,
    /// License-level clock ticks, already clamped to `0..=25`.
    pub ll_clock_change: i32,
    /// Row creation time (session date for imported entries).
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Gear, corporations, reputation
// ---------------------------------------------------------------------------

/// A piece of exotic gear held (or formerly held) by a pilot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Gear {
    /// Gear id.
    pub id: GearId,
    /// Owning pilot.
    pub pilot_id: PilotId,
    /// Item name.
    pub name: String,
    /// Item description.
    pub description: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Log entry that granted the item, if any.
    pub acquired_log_id: Option<LogEntryId>,
    /// Log entry in which the item was lost, if any.
    pub lost_log_id: Option<LogEntryId>,
    /// When the item was acquired.
    pub acquired_date: DateTime<Utc>,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl Gear {
    /// Build a gear row for a pilot.
    pub fn new(pilot_id: PilotId, name: String) -> Self {
        let now = Utc::now();
        Self {
            id: GearId::new(),
            pilot_id,
            name,
            description: None,
            notes: None,
            acquired_log_id: None,
            lost_log_id: None,
            acquired_date: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the item is still in the pilot's inventory.
    pub const fn is_held(&self) -> bool {
        self.lost_log_id.is_none()
    }
}

/// A faction pilots can earn standing with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Corporation {
    /// Corporation id.
    pub id: CorporationId,
    /// Corporation name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// A pilot's standing with one corporation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Reputation {
    /// Standing id.
    pub id: ReputationId,
    /// Pilot holding the standing.
    pub pilot_id: PilotId,
    /// Corporation the standing is with.
    pub corporation_id: CorporationId,
    /// Manually set starting value.
    pub base_value: i32,
    /// `base_value` plus every logged change (derived).
    pub reputation_value: i32,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl Reputation {
    /// Build a standing with the given base value.
    pub fn new(pilot_id: PilotId, corporation_id: CorporationId, base_value: i32) -> Self {
        let now = Utc::now();
        Self {
            id: ReputationId::new(),
            pilot_id,
            corporation_id,
            base_value,
            reputation_value: base_value,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A reputation delta recorded by a log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ReputationChange {
    /// Change id.
    pub id: ReputationChangeId,
    /// The log entry that recorded the change.
    pub log_entry_id: LogEntryId,
    /// Pilot whose standing changed.
    pub pilot_id: PilotId,
    /// Corporation the standing is with.
    pub corporation_id: CorporationId,
    /// Signed delta.
    pub change_value: i32,
    /// Free-form notes.
    pub notes: Option<String>,
}
