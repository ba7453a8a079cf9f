//! Row types and conversions between `PostgreSQL` rows and ledger types.

use chrono::{DateTime, Utc};
use pilot_ledger_core::StoreError;
use pilot_ledger_types::{
    Clock, ClockProgress, Corporation, Gear, LogEntry, LogType, Pilot, Reputation,
    ReputationChange, ResourceDirection, User,
};
use uuid::Uuid;

/// A row from the `users` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    /// User UUID.
    pub id: Uuid,
    /// Discord account id.
    pub discord_id: Option<String>,
    /// Discord username.
    pub discord_username: Option<String>,
    /// Display name.
    pub display_name: Option<String>,
    /// GM flag.
    pub is_gm: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id.into(),
            discord_id: row.discord_id,
            discord_username: row.discord_username,
            display_name: row.display_name,
            is_gm: row.is_gm,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A row from the `pilots` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PilotRow {
    /// Pilot UUID.
    pub id: Uuid,
    /// Owner UUID.
    pub user_id: Uuid,
    /// Name.
    pub name: String,
    /// Callsign.
    pub callsign: Option<String>,
    /// Background.
    pub background: Option<String>,
    /// Notes.
    pub notes: Option<String>,
    /// License level.
    pub license_level: i32,
    /// License clock progress.
    pub ll_clock_progress: i32,
    /// Manna.
    pub manna: i64,
    /// Downtime.
    pub downtime: i64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl From<PilotRow> for Pilot {
    fn from(row: PilotRow) -> Self {
        Self {
            id: row.id.into(),
            user_id: row.user_id.into(),
            name: row.name,
            callsign: row.callsign,
            background: row.background,
            notes: row.notes,
            license_level: row.license_level,
            ll_clock_progress: row.ll_clock_progress,
            manna: row.manna,
            downtime: row.downtime,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A row from the `clocks` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClockRow {
    /// Clock UUID.
    pub id: Uuid,
    /// Owning pilot, if any.
    pub pilot_id: Option<Uuid>,
    /// Name.
    pub name: String,
    /// Capacity.
    pub segments: i32,
    /// Fill per tick.
    pub tick_amount: i32,
    /// Manual ticks.
    pub manual_ticks: i32,
    /// Filled segments.
    pub filled: i32,
    /// Completion flag.
    pub is_completed: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl From<ClockRow> for Clock {
    fn from(row: ClockRow) -> Self {
        Self {
            id: row.id.into(),
            pilot_id: row.pilot_id.map(Into::into),
            name: row.name,
            segments: row.segments,
            tick_amount: row.tick_amount,
            manual_ticks: row.manual_ticks,
            filled: row.filled,
            is_completed: row.is_completed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A row from the `clock_progress` table.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct ClockProgressRow {
    /// Contributing log entry.
    pub log_entry_id: Uuid,
    /// Target clock.
    pub clock_id: Uuid,
    /// Ticks contributed.
    pub ticks_applied: i32,
}

impl From<ClockProgressRow> for ClockProgress {
    fn from(row: ClockProgressRow) -> Self {
        Self {
            log_entry_id: row.log_entry_id.into(),
            clock_id: row.clock_id.into(),
            ticks_applied: row.ticks_applied,
        }
    }
}

/// A row from the `log_entries` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LogEntryRow {
    /// Entry UUID.
    pub id: Uuid,
    /// Owning pilot.
    pub pilot_id: Uuid,
    /// `game` or `trade`.
    pub log_type: String,
    /// Description.
    pub description: Option<String>,
    /// Manna change.
    pub manna_change: i64,
    /// Downtime change.
    pub downtime_change: i64,
    /// License-level ticks.
    pub ll_clock_change: i32,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<LogEntryRow> for LogEntry {
    type Error = StoreError;

    fn try_from(row: LogEntryRow) -> Result<Self, Self::Error> {
        let log_type = LogType::parse(&row.log_type).ok_or_else(|| StoreError::Corrupt {
            table: "log_entries",
            message: format!("unknown log_type {:?} on {}", row.log_type, row.id),
        })?;
        Ok(Self {
            id: row.id.into(),
            pilot_id: row.pilot_id.into(),
            log_type,
            description: row.description,
            manna_change: row.manna_change,
            downtime_change: row.downtime_change,
            ll_clock_change: row.ll_clock_change,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Decode a batch of log rows.
pub fn log_entries(rows: Vec<LogEntryRow>) -> Result<Vec<LogEntry>, StoreError> {
    rows.into_iter().map(LogEntry::try_from).collect()
}

/// A row from the `exotic_gear` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GearRow {
    /// Gear UUID.
    pub id: Uuid,
    /// Owning pilot.
    pub pilot_id: Uuid,
    /// Name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Notes.
    pub notes: Option<String>,
    /// Granting entry.
    pub acquired_log_id: Option<Uuid>,
    /// Losing entry.
    pub lost_log_id: Option<Uuid>,
    /// Acquisition time.
    pub acquired_date: DateTime<Utc>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl From<GearRow> for Gear {
    fn from(row: GearRow) -> Self {
        Self {
            id: row.id.into(),
            pilot_id: row.pilot_id.into(),
            name: row.name,
            description: row.description,
            notes: row.notes,
            acquired_log_id: row.acquired_log_id.map(Into::into),
            lost_log_id: row.lost_log_id.map(Into::into),
            acquired_date: row.acquired_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A row from the `corporations` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CorporationRow {
    /// Corporation UUID.
    pub id: Uuid,
    /// Name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl From<CorporationRow> for Corporation {
    fn from(row: CorporationRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A row from the `reputation` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReputationRow {
    /// Standing UUID.
    pub id: Uuid,
    /// Pilot.
    pub pilot_id: Uuid,
    /// Corporation.
    pub corporation_id: Uuid,
    /// Base value.
    pub base_value: i32,
    /// Derived value.
    pub reputation_value: i32,
    /// Notes.
    pub notes: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl From<ReputationRow> for Reputation {
    fn from(row: ReputationRow) -> Self {
        Self {
            id: row.id.into(),
            pilot_id: row.pilot_id.into(),
            corporation_id: row.corporation_id.into(),
            base_value: row.base_value,
            reputation_value: row.reputation_value,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A row from the `reputation_changes` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReputationChangeRow {
    /// Change UUID.
    pub id: Uuid,
    /// Recording entry.
    pub log_entry_id: Uuid,
    /// Pilot.
    pub pilot_id: Uuid,
    /// Corporation.
    pub corporation_id: Uuid,
    /// Delta.
    pub change_value: i32,
    /// Notes.
    pub notes: Option<String>,
}

impl From<ReputationChangeRow> for ReputationChange {
    fn from(row: ReputationChangeRow) -> Self {
        Self {
            id: row.id.into(),
            log_entry_id: row.log_entry_id.into(),
            pilot_id: row.pilot_id.into(),
            corporation_id: row.corporation_id.into(),
            change_value: row.change_value,
            notes: row.notes,
        }
    }
}

/// Convert a [`ResourceDirection`] to the filter string used in queries.
pub const fn direction_to_db(direction: ResourceDirection) -> &'static str {
    match direction {
        ResourceDirection::Increase => "increase",
        ResourceDirection::Decrease => "decrease",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_row(log_type: &str) -> LogEntryRow {
        let now = Utc::now();
        LogEntryRow {
            id: Uuid::now_v7(),
            pilot_id: Uuid::now_v7(),
            log_type: log_type.to_owned(),
            description: None,
            manna_change: 3,
            downtime_change: -1,
            ll_clock_change: 2,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn log_row_decodes_known_types() {
        let entry = LogEntry::try_from(log_row("trade"));
        assert!(entry.is_ok_and(|e| e.log_type == LogType::Trade && e.manna_change == 3));
    }

    #[test]
    fn unknown_log_type_is_corrupt() {
        let entry = LogEntry::try_from(log_row("raid"));
        assert!(matches!(
            entry,
            Err(StoreError::Corrupt { table: "log_entries", .. })
        ));
    }

    #[test]
    fn directions_map_to_filter_strings() {
        assert_eq!(direction_to_db(ResourceDirection::Increase), "increase");
        assert_eq!(direction_to_db(ResourceDirection::Decrease), "decrease");
    }
}
