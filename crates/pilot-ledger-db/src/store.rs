//! `PostgreSQL` implementation of the ledger store traits.
//!
//! Every method is a single statement, so each one is atomic on its own.
//! Delete cascades are carried by the foreign keys in `0001_init.sql`:
//! removing a log entry drops its progress links, reputation changes and
//! the gear it granted, and `ON DELETE SET NULL` on `lost_log_id` returns
//! gear it marked as lost.

use pilot_ledger_core::ClockFill;
use pilot_ledger_core::store::{
    ClockStore, FactionStore, InventoryStore, LogStore, PilotStore, StoreError, UserStore,
};
use pilot_ledger_types::{
    Clock, ClockId, ClockProgress, Corporation, CorporationId, Gear, GearId, LogEntry, LogEntryId,
    LogFilter, LogType, Pilot, PilotId, PilotResources, Reputation, ReputationChange, ReputationId,
    User, UserId,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::pg;
use crate::rows::{
    ClockProgressRow, ClockRow, CorporationRow, GearRow, LogEntryRow, PilotRow,
    ReputationChangeRow, ReputationRow, UserRow, direction_to_db, log_entries,
};

/// Ledger store backed by a shared connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl PilotStore for PgStore {
    async fn list_pilots(&self, owner: Option<UserId>) -> Result<Vec<Pilot>, StoreError> {
        let rows = sqlx::query_as::<_, PilotRow>(
            r"SELECT id, user_id, name, callsign, background, notes, license_level,
                     ll_clock_progress, manna, downtime, created_at, updated_at
              FROM pilots
              WHERE ($1::UUID IS NULL OR user_id = $1)
              ORDER BY created_at DESC, id DESC",
        )
        .bind(owner.map(UserId::into_inner))
        .fetch_all(&self.pool)
        .await
        .map_err(pg)?;

        Ok(rows.into_iter().map(Pilot::from).collect())
    }

    async fn get_pilot(&self, id: PilotId) -> Result<Option<Pilot>, StoreError> {
        let row = sqlx::query_as::<_, PilotRow>(
            r"SELECT id, user_id, name, callsign, background, notes, license_level,
                     ll_clock_progress, manna, downtime, created_at, updated_at
              FROM pilots
              WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(pg)?;

        Ok(row.map(Pilot::from))
    }

    async fn insert_pilot(&self, pilot: &Pilot) -> Result<(), StoreError> {
        sqlx::query(
            r"INSERT INTO pilots (id, user_id, name, callsign, background, notes, license_level,
                                  ll_clock_progress, manna, downtime, created_at, updated_at)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(pilot.id.into_inner())
        .bind(pilot.user_id.into_inner())
        .bind(&pilot.name)
        .bind(&pilot.callsign)
        .bind(&pilot.background)
        .bind(&pilot.notes)
        .bind(pilot.license_level)
        .bind(pilot.ll_clock_progress)
        .bind(pilot.manna)
        .bind(pilot.downtime)
        .bind(pilot.created_at)
        .bind(pilot.updated_at)
        .execute(&self.pool)
        .await
        .map_err(pg)?;

        tracing::debug!(pilot_id = %pilot.id, "Inserted pilot");
        Ok(())
    }

    async fn save_pilot_profile(&self, pilot: &Pilot) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r"UPDATE pilots
              SET name = $2, callsign = $3, background = $4, notes = $5, updated_at = now()
              WHERE id = $1",
        )
        .bind(pilot.id.into_inner())
        .bind(&pilot.name)
        .bind(&pilot.callsign)
        .bind(&pilot.background)
        .bind(&pilot.notes)
        .execute(&self.pool)
        .await
        .map_err(pg)?;

        Ok(result.rows_affected() > 0)
    }

    async fn write_pilot_resources(
        &self,
        id: PilotId,
        resources: PilotResources,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r"UPDATE pilots
              SET manna = $2, downtime = $3, license_level = $4, ll_clock_progress = $5,
                  updated_at = now()
              WHERE id = $1",
        )
        .bind(id.into_inner())
        .bind(resources.manna)
        .bind(resources.downtime)
        .bind(resources.license_level)
        .bind(resources.ll_clock_progress)
        .execute(&self.pool)
        .await
        .map_err(pg)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_pilot(&self, id: PilotId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM pilots WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(pg)?;

        Ok(result.rows_affected() > 0)
    }
}

impl ClockStore for PgStore {
    async fn list_clocks(&self, pilot_id: Option<PilotId>) -> Result<Vec<Clock>, StoreError> {
        let rows = sqlx::query_as::<_, ClockRow>(
            r"SELECT id, pilot_id, name, segments, tick_amount, manual_ticks, filled,
                     is_completed, created_at, updated_at
              FROM clocks
              WHERE pilot_id IS NOT DISTINCT FROM $1
              ORDER BY created_at, id",
        )
        .bind(pilot_id.map(PilotId::into_inner))
        .fetch_all(&self.pool)
        .await
        .map_err(pg)?;

        Ok(rows.into_iter().map(Clock::from).collect())
    }

    async fn get_clock(&self, id: ClockId) -> Result<Option<Clock>, StoreError> {
        let row = sqlx::query_as::<_, ClockRow>(
            r"SELECT id, pilot_id, name, segments, tick_amount, manual_ticks, filled,
                     is_completed, created_at, updated_at
              FROM clocks
              WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(pg)?;

        Ok(row.map(Clock::from))
    }

    async fn insert_clock(&self, clock: &Clock) -> Result<(), StoreError> {
        sqlx::query(
            r"INSERT INTO clocks (id, pilot_id, name, segments, tick_amount, manual_ticks, filled,
                                  is_completed, created_at, updated_at)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(clock.id.into_inner())
        .bind(clock.pilot_id.map(PilotId::into_inner))
        .bind(&clock.name)
        .bind(clock.segments)
        .bind(clock.tick_amount)
        .bind(clock.manual_ticks)
        .bind(clock.filled)
        .bind(clock.is_completed)
        .bind(clock.created_at)
        .bind(clock.updated_at)
        .execute(&self.pool)
        .await
        .map_err(pg)?;

        Ok(())
    }

    async fn save_clock_definition(&self, clock: &Clock) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r"UPDATE clocks
              SET name = $2, segments = $3, tick_amount = $4, updated_at = now()
              WHERE id = $1",
        )
        .bind(clock.id.into_inner())
        .bind(&clock.name)
        .bind(clock.segments)
        .bind(clock.tick_amount)
        .execute(&self.pool)
        .await
        .map_err(pg)?;

        Ok(result.rows_affected() > 0)
    }

    async fn add_manual_ticks(&self, id: ClockId, delta: i32) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r"UPDATE clocks
              SET manual_ticks = manual_ticks + $2, updated_at = now()
              WHERE id = $1",
        )
        .bind(id.into_inner())
        .bind(delta)
        .execute(&self.pool)
        .await
        .map_err(pg)?;

        Ok(result.rows_affected() > 0)
    }

    async fn write_clock_fill(&self, id: ClockId, fill: ClockFill) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r"UPDATE clocks
              SET filled = $2, is_completed = $3, updated_at = now()
              WHERE id = $1",
        )
        .bind(id.into_inner())
        .bind(fill.filled)
        .bind(fill.is_completed)
        .execute(&self.pool)
        .await
        .map_err(pg)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_clock(&self, id: ClockId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM clocks WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(pg)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_progress_for_clock(
        &self,
        clock_id: ClockId,
    ) -> Result<Vec<ClockProgress>, StoreError> {
        let rows = sqlx::query_as::<_, ClockProgressRow>(
            r"SELECT log_entry_id, clock_id, ticks_applied
              FROM clock_progress
              WHERE clock_id = $1
              ORDER BY id",
        )
        .bind(clock_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(pg)?;

        Ok(rows.into_iter().map(ClockProgress::from).collect())
    }

    async fn list_progress_for_log(
        &self,
        log_id: LogEntryId,
    ) -> Result<Vec<ClockProgress>, StoreError> {
        let rows = sqlx::query_as::<_, ClockProgressRow>(
            r"SELECT log_entry_id, clock_id, ticks_applied
              FROM clock_progress
              WHERE log_entry_id = $1
              ORDER BY id",
        )
        .bind(log_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(pg)?;

        Ok(rows.into_iter().map(ClockProgress::from).collect())
    }

    async fn insert_progress(&self, progress: &ClockProgress) -> Result<(), StoreError> {
        sqlx::query(
            r"INSERT INTO clock_progress (log_entry_id, clock_id, ticks_applied)
              VALUES ($1, $2, $3)",
        )
        .bind(progress.log_entry_id.into_inner())
        .bind(progress.clock_id.into_inner())
        .bind(progress.ticks_applied)
        .execute(&self.pool)
        .await
        .map_err(pg)?;

        Ok(())
    }

    async fn delete_progress_for_log(&self, log_id: LogEntryId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM clock_progress WHERE log_entry_id = $1")
            .bind(log_id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(pg)?;

        Ok(result.rows_affected())
    }
}

impl LogStore for PgStore {
    async fn list_logs(&self, pilot_id: PilotId) -> Result<Vec<LogEntry>, StoreError> {
        let rows = sqlx::query_as::<_, LogEntryRow>(
            r"SELECT id, pilot_id, log_type, description, manna_change, downtime_change,
                     ll_clock_change, created_at, updated_at
              FROM log_entries
              WHERE pilot_id = $1
              ORDER BY created_at DESC, id DESC",
        )
        .bind(pilot_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(pg)?;

        log_entries(rows)
    }

    async fn query_logs(&self, filter: &LogFilter) -> Result<Vec<LogEntry>, StoreError> {
        let rows = sqlx::query_as::<_, LogEntryRow>(
            r"SELECT id, pilot_id, log_type, description, manna_change, downtime_change,
                     ll_clock_change, created_at, updated_at
              FROM log_entries
              WHERE ($1::UUID IS NULL OR pilot_id = $1)
                AND ($2::TEXT IS NULL OR log_type = $2)
                AND ($3::TEXT IS NULL
                     OR ($3 = 'increase' AND (manna_change > 0 OR downtime_change > 0))
                     OR ($3 = 'decrease' AND (manna_change < 0 OR downtime_change < 0)))
              ORDER BY created_at DESC, id DESC
              LIMIT $4 OFFSET $5",
        )
        .bind(filter.pilot_id.map(PilotId::into_inner))
        .bind(filter.log_type.map(LogType::as_str))
        .bind(filter.resource_direction.map(direction_to_db))
        .bind(i64::from(filter.limit))
        .bind(i64::from(filter.offset))
        .fetch_all(&self.pool)
        .await
        .map_err(pg)?;

        log_entries(rows)
    }

    async fn get_log(&self, id: LogEntryId) -> Result<Option<LogEntry>, StoreError> {
        let row = sqlx::query_as::<_, LogEntryRow>(
            r"SELECT id, pilot_id, log_type, description, manna_change, downtime_change,
                     ll_clock_change, created_at, updated_at
              FROM log_entries
              WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(pg)?;

        row.map(LogEntry::try_from).transpose()
    }

    async fn insert_log(&self, entry: &LogEntry) -> Result<(), StoreError> {
        sqlx::query(
            r"INSERT INTO log_entries (id, pilot_id, log_type, description, manna_change,
                                       downtime_change, ll_clock_change, created_at, updated_at)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(entry.id.into_inner())
        .bind(entry.pilot_id.into_inner())
        .bind(entry.log_type.as_str())
        .bind(&entry.description)
        .bind(entry.manna_change)
        .bind(entry.downtime_change)
        .bind(entry.ll_clock_change)
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .execute(&self.pool)
        .await
        .map_err(pg)?;

        tracing::debug!(log_id = %entry.id, pilot_id = %entry.pilot_id, "Inserted log entry");
        Ok(())
    }

    async fn save_log(&self, entry: &LogEntry) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r"UPDATE log_entries
              SET description = $2, manna_change = $3, downtime_change = $4,
                  ll_clock_change = $5, updated_at = now()
              WHERE id = $1",
        )
        .bind(entry.id.into_inner())
        .bind(&entry.description)
        .bind(entry.manna_change)
        .bind(entry.downtime_change)
        .bind(entry.ll_clock_change)
        .execute(&self.pool)
        .await
        .map_err(pg)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_log(&self, id: LogEntryId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM log_entries WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(pg)?;

        Ok(result.rows_affected() > 0)
    }
}

impl PgStore {
    async fn gear_where_log(&self, sql: &'static str, log_id: Uuid) -> Result<Vec<Gear>, StoreError> {
        let rows = sqlx::query_as::<_, GearRow>(sql)
            .bind(log_id)
            .fetch_all(&self.pool)
            .await
            .map_err(pg)?;

        Ok(rows.into_iter().map(Gear::from).collect())
    }
}

impl InventoryStore for PgStore {
    async fn list_gear(&self, pilot_id: PilotId) -> Result<Vec<Gear>, StoreError> {
        let rows = sqlx::query_as::<_, GearRow>(
            r"SELECT id, pilot_id, name, description, notes, acquired_log_id, lost_log_id,
                     acquired_date, created_at, updated_at
              FROM exotic_gear
              WHERE pilot_id = $1
              ORDER BY acquired_date, id",
        )
        .bind(pilot_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(pg)?;

        Ok(rows.into_iter().map(Gear::from).collect())
    }

    async fn get_gear(&self, id: GearId) -> Result<Option<Gear>, StoreError> {
        let row = sqlx::query_as::<_, GearRow>(
            r"SELECT id, pilot_id, name, description, notes, acquired_log_id, lost_log_id,
                     acquired_date, created_at, updated_at
              FROM exotic_gear
              WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(pg)?;

        Ok(row.map(Gear::from))
    }

    async fn insert_gear(&self, gear: &Gear) -> Result<(), StoreError> {
        sqlx::query(
            r"INSERT INTO exotic_gear (id, pilot_id, name, description, notes, acquired_log_id,
                                       lost_log_id, acquired_date, created_at, updated_at)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(gear.id.into_inner())
        .bind(gear.pilot_id.into_inner())
        .bind(&gear.name)
        .bind(&gear.description)
        .bind(&gear.notes)
        .bind(gear.acquired_log_id.map(LogEntryId::into_inner))
        .bind(gear.lost_log_id.map(LogEntryId::into_inner))
        .bind(gear.acquired_date)
        .bind(gear.created_at)
        .bind(gear.updated_at)
        .execute(&self.pool)
        .await
        .map_err(pg)?;

        Ok(())
    }

    async fn save_gear(&self, gear: &Gear) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r"UPDATE exotic_gear
              SET name = $2, description = $3, notes = $4, lost_log_id = $5, updated_at = now()
              WHERE id = $1",
        )
        .bind(gear.id.into_inner())
        .bind(&gear.name)
        .bind(&gear.description)
        .bind(&gear.notes)
        .bind(gear.lost_log_id.map(LogEntryId::into_inner))
        .execute(&self.pool)
        .await
        .map_err(pg)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_gear(&self, id: GearId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM exotic_gear WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(pg)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_gear_acquired_in(&self, log_id: LogEntryId) -> Result<Vec<Gear>, StoreError> {
        self.gear_where_log(
            r"SELECT id, pilot_id, name, description, notes, acquired_log_id, lost_log_id,
                     acquired_date, created_at, updated_at
              FROM exotic_gear
              WHERE acquired_log_id = $1
              ORDER BY acquired_date, id",
            log_id.into_inner(),
        )
        .await
    }

    async fn list_gear_lost_in(&self, log_id: LogEntryId) -> Result<Vec<Gear>, StoreError> {
        self.gear_where_log(
            r"SELECT id, pilot_id, name, description, notes, acquired_log_id, lost_log_id,
                     acquired_date, created_at, updated_at
              FROM exotic_gear
              WHERE lost_log_id = $1
              ORDER BY acquired_date, id",
            log_id.into_inner(),
        )
        .await
    }
}

impl FactionStore for PgStore {
    async fn list_corporations(&self) -> Result<Vec<Corporation>, StoreError> {
        let rows = sqlx::query_as::<_, CorporationRow>(
            r"SELECT id, name, description, created_at, updated_at
              FROM corporations
              ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(pg)?;

        Ok(rows.into_iter().map(Corporation::from).collect())
    }

    async fn get_corporation(&self, id: CorporationId) -> Result<Option<Corporation>, StoreError> {
        let row = sqlx::query_as::<_, CorporationRow>(
            r"SELECT id, name, description, created_at, updated_at
              FROM corporations
              WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(pg)?;

        Ok(row.map(Corporation::from))
    }

    async fn insert_corporation(&self, corporation: &Corporation) -> Result<(), StoreError> {
        sqlx::query(
            r"INSERT INTO corporations (id, name, description, created_at, updated_at)
              VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(corporation.id.into_inner())
        .bind(&corporation.name)
        .bind(&corporation.description)
        .bind(corporation.created_at)
        .bind(corporation.updated_at)
        .execute(&self.pool)
        .await
        .map_err(pg)?;

        Ok(())
    }

    async fn save_corporation(&self, corporation: &Corporation) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r"UPDATE corporations
              SET name = $2, description = $3, updated_at = now()
              WHERE id = $1",
        )
        .bind(corporation.id.into_inner())
        .bind(&corporation.name)
        .bind(&corporation.description)
        .execute(&self.pool)
        .await
        .map_err(pg)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_corporation(&self, id: CorporationId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM corporations WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(pg)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_reputation(&self, pilot_id: PilotId) -> Result<Vec<Reputation>, StoreError> {
        let rows = sqlx::query_as::<_, ReputationRow>(
            r"SELECT id, pilot_id, corporation_id, base_value, reputation_value, notes,
                     created_at, updated_at
              FROM reputation
              WHERE pilot_id = $1
              ORDER BY created_at, id",
        )
        .bind(pilot_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(pg)?;

        Ok(rows.into_iter().map(Reputation::from).collect())
    }

    async fn get_reputation(&self, id: ReputationId) -> Result<Option<Reputation>, StoreError> {
        let row = sqlx::query_as::<_, ReputationRow>(
            r"SELECT id, pilot_id, corporation_id, base_value, reputation_value, notes,
                     created_at, updated_at
              FROM reputation
              WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(pg)?;

        Ok(row.map(Reputation::from))
    }

    async fn insert_reputation(&self, reputation: &Reputation) -> Result<(), StoreError> {
        sqlx::query(
            r"INSERT INTO reputation (id, pilot_id, corporation_id, base_value, reputation_value,
                                      notes, created_at, updated_at)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(reputation.id.into_inner())
        .bind(reputation.pilot_id.into_inner())
        .bind(reputation.corporation_id.into_inner())
        .bind(reputation.base_value)
        .bind(reputation.reputation_value)
        .bind(&reputation.notes)
        .bind(reputation.created_at)
        .bind(reputation.updated_at)
        .execute(&self.pool)
        .await
        .map_err(pg)?;

        Ok(())
    }

    async fn save_reputation(&self, reputation: &Reputation) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r"UPDATE reputation
              SET base_value = $2, notes = $3, updated_at = now()
              WHERE id = $1",
        )
        .bind(reputation.id.into_inner())
        .bind(reputation.base_value)
        .bind(&reputation.notes)
        .execute(&self.pool)
        .await
        .map_err(pg)?;

        Ok(result.rows_affected() > 0)
    }

    async fn write_reputation_value(&self, id: ReputationId, value: i32) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r"UPDATE reputation
              SET reputation_value = $2, updated_at = now()
              WHERE id = $1",
        )
        .bind(id.into_inner())
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(pg)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_reputation(&self, id: ReputationId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM reputation WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(pg)?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_reputation_change(&self, change: &ReputationChange) -> Result<(), StoreError> {
        sqlx::query(
            r"INSERT INTO reputation_changes (id, log_entry_id, pilot_id, corporation_id,
                                              change_value, notes)
              VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(change.id.into_inner())
        .bind(change.log_entry_id.into_inner())
        .bind(change.pilot_id.into_inner())
        .bind(change.corporation_id.into_inner())
        .bind(change.change_value)
        .bind(&change.notes)
        .execute(&self.pool)
        .await
        .map_err(pg)?;

        Ok(())
    }

    async fn list_reputation_changes(
        &self,
        pilot_id: PilotId,
    ) -> Result<Vec<ReputationChange>, StoreError> {
        let rows = sqlx::query_as::<_, ReputationChangeRow>(
            r"SELECT id, log_entry_id, pilot_id, corporation_id, change_value, notes
              FROM reputation_changes
              WHERE pilot_id = $1
              ORDER BY id",
        )
        .bind(pilot_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(pg)?;

        Ok(rows.into_iter().map(ReputationChange::from).collect())
    }

    async fn delete_reputation_changes(
        &self,
        pilot_id: PilotId,
        corporation_id: CorporationId,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "DELETE FROM reputation_changes WHERE pilot_id = $1 AND corporation_id = $2",
        )
        .bind(pilot_id.into_inner())
        .bind(corporation_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(pg)?;

        Ok(result.rows_affected())
    }

    async fn list_reputation_changes_for_log(
        &self,
        log_id: LogEntryId,
    ) -> Result<Vec<ReputationChange>, StoreError> {
        let rows = sqlx::query_as::<_, ReputationChangeRow>(
            r"SELECT id, log_entry_id, pilot_id, corporation_id, change_value, notes
              FROM reputation_changes
              WHERE log_entry_id = $1
              ORDER BY id",
        )
        .bind(log_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(pg)?;

        Ok(rows.into_iter().map(ReputationChange::from).collect())
    }
}

impl UserStore for PgStore {
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"SELECT id, discord_id, discord_username, display_name, is_gm, created_at, updated_at
              FROM users
              WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(pg)?;

        Ok(row.map(User::from))
    }

    async fn upsert_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            r"INSERT INTO users (id, discord_id, discord_username, display_name, is_gm,
                                 created_at, updated_at)
              VALUES ($1, $2, $3, $4, $5, $6, $7)
              ON CONFLICT (id) DO UPDATE
              SET discord_id = EXCLUDED.discord_id,
                  discord_username = EXCLUDED.discord_username,
                  display_name = EXCLUDED.display_name,
                  is_gm = EXCLUDED.is_gm,
                  updated_at = now()",
        )
        .bind(user.id.into_inner())
        .bind(&user.discord_id)
        .bind(&user.discord_username)
        .bind(&user.display_name)
        .bind(user.is_gm)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(pg)?;

        Ok(())
    }
}
