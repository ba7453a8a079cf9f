//! Log mutation service.
//!
//! Every change to a pilot's log, every operation that writes derived
//! state, and every delete of a row the replay reads goes through
//! [`LogService`]. Each operation:
//!
//! 1. takes the pilot's [`PilotLocks`] scope,
//! 2. performs its writes,
//! 3. replays the pilot with [`Recalculator::recalculate_pilot`],
//!
//! and releases the scope only after the replay has been written, so two
//! concurrent mutations of one pilot can never publish a stale replay.
//!
//! Plain profile edits (names, notes, descriptions) and inserts of fresh
//! clocks or gear touch nothing the replay derives and go straight to the
//! store.
//!
//! Side-effect inputs that do not belong to the pilot are skipped with a
//! warning rather than rejected: progress on a clock the pilot does not
//! own, loss of gear the pilot does not hold, and reputation changes for an
//! unknown corporation.

use chrono::{DateTime, TimeDelta, Utc};
use pilot_ledger_types::{
    Clock, ClockId, ClockProgress, ClockProgressInput, Gear, GearId, LogEntry, LogEntryDetails,
    LogEntryId, LogEntryUpdate, LogType, NewLogEntry, NewReputation, Pilot, PilotId,
    Reputation, ReputationChange, ReputationChangeId, ReputationId, ReputationUpdate, UserId,
};
use tracing::{info, warn};

use crate::import::ImportedPilot;
use crate::locks::PilotLocks;
use crate::progression::{LicenseProgress, ll_clock_segments, ticks_for};
use crate::recalc::Recalculator;
use crate::store::{Store, StoreError};

/// Largest license-level tick count one log entry may carry.
pub const MAX_LL_CLOCK_CHANGE: i32 = 25;

/// Clamp a requested license-level tick count to what one entry may carry.
///
/// Applied once, when an entry is written. Replay never clamps again.
pub fn clamp_ll_clock_change(requested: i32) -> i32 {
    requested.clamp(0, MAX_LL_CLOCK_CHANGE)
}

/// Outcome of [`LogService::open_standing`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenedStanding {
    /// A new standing, after replay.
    Opened(Reputation),
    /// The pilot already holds this standing; nothing was written.
    AlreadyOpen(Reputation),
    /// The corporation does not exist.
    UnknownCorporation,
}

/// Serialized log mutations with replay.
#[derive(Debug, Clone)]
pub struct LogService<S> {
    engine: Recalculator<S>,
    locks: PilotLocks,
}

impl<S: Store> LogService<S> {
    /// Create a service over a store handle.
    pub fn new(store: S) -> Self {
        Self {
            engine: Recalculator::new(store),
            locks: PilotLocks::new(),
        }
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        self.engine.store()
    }

    // -----------------------------------------------------------------------
    // Log entries
    // -----------------------------------------------------------------------

    /// Record a log entry with its side effects and replay the pilot.
    ///
    /// Returns `None` if the pilot does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if any write fails.
    pub async fn create_log(
        &self,
        pilot_id: PilotId,
        input: NewLogEntry,
    ) -> Result<Option<LogEntryDetails>, StoreError> {
        let _guard = self.locks.acquire(Some(pilot_id)).await;
        let store = self.store();
        if store.get_pilot(pilot_id).await?.is_none() {
            return Ok(None);
        }

        let now = Utc::now();
        let entry = LogEntry {
            id: LogEntryId::new(),
            pilot_id,
            log_type: input.log_type,
            description: input.description,
            manna_change: input.manna_change,
            downtime_change: input.downtime_change,
            ll_clock_change: clamp_ll_clock_change(input.ll_clock_change),
            created_at: now,
            updated_at: now,
        };
        store.insert_log(&entry).await?;

        let clock_progress = self
            .link_progress(pilot_id, entry.id, &input.clock_progress)
            .await?;

        let mut gear_acquired = Vec::with_capacity(input.gear_acquired.len());
        for item in input.gear_acquired {
            let mut gear = Gear::new(pilot_id, item.name);
            gear.description = item.description;
            gear.notes = item.notes;
            gear.acquired_log_id = Some(entry.id);
            store.insert_gear(&gear).await?;
            gear_acquired.push(gear);
        }

        let mut gear_lost = Vec::with_capacity(input.gear_lost.len());
        for lost in input.gear_lost {
            match store.get_gear(lost.gear_id).await? {
                Some(mut gear) if gear.pilot_id == pilot_id && gear.is_held() => {
                    gear.lost_log_id = Some(entry.id);
                    store.save_gear(&gear).await?;
                    gear_lost.push(gear);
                }
                _ => warn!(
                    pilot_id = %pilot_id,
                    gear_id = %lost.gear_id,
                    "Skipping gear loss: not held by this pilot"
                ),
            }
        }

        let mut reputation_changes = Vec::with_capacity(input.reputation_changes.len());
        for change in input.reputation_changes {
            if store.get_corporation(change.corporation_id).await?.is_none() {
                warn!(
                    pilot_id = %pilot_id,
                    corporation_id = %change.corporation_id,
                    "Skipping reputation change: unknown corporation"
                );
                continue;
            }
            let row = ReputationChange {
                id: ReputationChangeId::new(),
                log_entry_id: entry.id,
                pilot_id,
                corporation_id: change.corporation_id,
                change_value: change.change_value,
                notes: change.notes,
            };
            store.insert_reputation_change(&row).await?;
            reputation_changes.push(row);
        }

        self.engine.recalculate_pilot(pilot_id).await?;

        info!(
            pilot_id = %pilot_id,
            log_id = %entry.id,
            log_type = %entry.log_type,
            clocks = clock_progress.len(),
            gear_acquired = gear_acquired.len(),
            gear_lost = gear_lost.len(),
            reputation_changes = reputation_changes.len(),
            "Log entry created"
        );

        Ok(Some(LogEntryDetails {
            entry,
            clock_progress,
            gear_acquired,
            gear_lost,
            reputation_changes,
        }))
    }

    /// Apply a partial update to a log entry and replay its pilot.
    ///
    /// A present `clock_progress` list replaces the entry's links wholesale.
    /// Returns `None` if the entry does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if any write fails.
    pub async fn update_log(
        &self,
        log_id: LogEntryId,
        update: LogEntryUpdate,
    ) -> Result<Option<LogEntry>, StoreError> {
        let Some(found) = self.store().get_log(log_id).await? else {
            return Ok(None);
        };
        let _guard = self.locks.acquire(Some(found.pilot_id)).await;
        // Re-read under the lock; the entry may have been deleted meanwhile.
        let Some(mut entry) = self.store().get_log(log_id).await? else {
            return Ok(None);
        };

        if let Some(description) = update.description {
            entry.description = Some(description);
        }
        if let Some(manna) = update.manna_change {
            entry.manna_change = manna;
        }
        if let Some(downtime) = update.downtime_change {
            entry.downtime_change = downtime;
        }
        if let Some(ll) = update.ll_clock_change {
            entry.ll_clock_change = clamp_ll_clock_change(ll);
        }
        entry.updated_at = Utc::now();
        self.store().save_log(&entry).await?;

        if let Some(progress) = update.clock_progress {
            self.store().delete_progress_for_log(log_id).await?;
            self.link_progress(entry.pilot_id, log_id, &progress).await?;
        }

        self.engine.recalculate_pilot(entry.pilot_id).await?;
        info!(pilot_id = %entry.pilot_id, log_id = %log_id, "Log entry updated");
        Ok(Some(entry))
    }

    /// Delete a log entry and replay its pilot.
    ///
    /// Gear the entry granted is deleted with it; gear it marked as lost is
    /// returned to the pilot's inventory. Returns `false` if the entry does
    /// not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if any write fails.
    pub async fn delete_log(&self, log_id: LogEntryId) -> Result<bool, StoreError> {
        let Some(found) = self.store().get_log(log_id).await? else {
            return Ok(false);
        };
        let _guard = self.locks.acquire(Some(found.pilot_id)).await;
        if !self.store().delete_log(log_id).await? {
            return Ok(false);
        }
        self.engine.recalculate_pilot(found.pilot_id).await?;
        info!(pilot_id = %found.pilot_id, log_id = %log_id, "Log entry deleted");
        Ok(true)
    }

    /// An entry with everything it recorded.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a read fails.
    pub async fn log_details(
        &self,
        log_id: LogEntryId,
    ) -> Result<Option<LogEntryDetails>, StoreError> {
        let store = self.store();
        let Some(entry) = store.get_log(log_id).await? else {
            return Ok(None);
        };
        Ok(Some(LogEntryDetails {
            clock_progress: store.list_progress_for_log(log_id).await?,
            gear_acquired: store.list_gear_acquired_in(log_id).await?,
            gear_lost: store.list_gear_lost_in(log_id).await?,
            reputation_changes: store.list_reputation_changes_for_log(log_id).await?,
            entry,
        }))
    }

    /// Insert progress links for clocks the pilot owns; skip the rest.
    async fn link_progress(
        &self,
        pilot_id: PilotId,
        log_id: LogEntryId,
        inputs: &[ClockProgressInput],
    ) -> Result<Vec<ClockProgress>, StoreError> {
        let mut linked = Vec::with_capacity(inputs.len());
        for input in inputs {
            let owned = self
                .store()
                .get_clock(input.clock_id)
                .await?
                .is_some_and(|clock| clock.pilot_id == Some(pilot_id));
            if !owned {
                warn!(
                    pilot_id = %pilot_id,
                    clock_id = %input.clock_id,
                    "Skipping clock progress: clock not owned by pilot"
                );
                continue;
            }
            let progress = ClockProgress {
                log_entry_id: log_id,
                clock_id: input.clock_id,
                ticks_applied: input.ticks_applied,
            };
            self.store().insert_progress(&progress).await?;
            linked.push(progress);
        }
        Ok(linked)
    }

    // -----------------------------------------------------------------------
    // Clocks, pilots, reputation
    // -----------------------------------------------------------------------

    /// Tick a clock outside the log, inside its owner's scope.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a read or write fails.
    pub async fn tick_clock(
        &self,
        clock_id: ClockId,
        delta: i32,
    ) -> Result<Option<Clock>, StoreError> {
        let Some(clock) = self.store().get_clock(clock_id).await? else {
            return Ok(None);
        };
        let _guard = self.locks.acquire(clock.pilot_id).await;
        self.engine.tick_clock(clock_id, delta).await
    }

    /// Save a clock's edited definition and refresh its fill.
    ///
    /// Definition edits never trigger a log replay; only this clock is
    /// recomputed so `filled` stays within the new capacity. Returns `None`
    /// if the clock no longer exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a read or write fails.
    pub async fn save_clock(&self, clock: &Clock) -> Result<Option<Clock>, StoreError> {
        let _guard = self.locks.acquire(clock.pilot_id).await;
        if !self.store().save_clock_definition(clock).await? {
            return Ok(None);
        }
        if self.engine.recalculate_clock(clock.id).await?.is_none() {
            return Ok(None);
        }
        self.store().get_clock(clock.id).await
    }

    /// Delete a clock and its progress links inside its owner's scope.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a read or the delete fails.
    pub async fn delete_clock(&self, clock_id: ClockId) -> Result<bool, StoreError> {
        let Some(clock) = self.store().get_clock(clock_id).await? else {
            return Ok(false);
        };
        let _guard = self.locks.acquire(clock.pilot_id).await;
        self.store().delete_clock(clock_id).await
    }

    /// Delete a gear item inside its pilot's scope.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a read or the delete fails.
    pub async fn delete_gear(&self, gear_id: GearId) -> Result<bool, StoreError> {
        let Some(gear) = self.store().get_gear(gear_id).await? else {
            return Ok(false);
        };
        let _guard = self.locks.acquire(Some(gear.pilot_id)).await;
        self.store().delete_gear(gear_id).await
    }

    /// Replay a pilot inside its scope.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a read or write fails.
    pub async fn recalculate(&self, pilot_id: PilotId) -> Result<Option<Pilot>, StoreError> {
        let _guard = self.locks.acquire(Some(pilot_id)).await;
        if self.engine.recalculate_pilot(pilot_id).await?.is_none() {
            return Ok(None);
        }
        self.store().get_pilot(pilot_id).await
    }

    /// Delete a pilot and everything it owns.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the delete fails.
    pub async fn delete_pilot(&self, pilot_id: PilotId) -> Result<bool, StoreError> {
        let _guard = self.locks.acquire(Some(pilot_id)).await;
        let deleted = self.store().delete_pilot(pilot_id).await?;
        if deleted {
            info!(pilot_id = %pilot_id, "Pilot deleted");
        }
        Ok(deleted)
    }

    /// Open a standing with a corporation and replay the pilot's reputation.
    ///
    /// A pilot holds at most one standing per corporation; a second open
    /// leaves the existing standing untouched and reports it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a read or write fails.
    pub async fn open_standing(
        &self,
        pilot_id: PilotId,
        input: NewReputation,
    ) -> Result<OpenedStanding, StoreError> {
        let _guard = self.locks.acquire(Some(pilot_id)).await;
        let store = self.store();
        if store.get_corporation(input.corporation_id).await?.is_none() {
            return Ok(OpenedStanding::UnknownCorporation);
        }
        let existing = store
            .list_reputation(pilot_id)
            .await?
            .into_iter()
            .find(|r| r.corporation_id == input.corporation_id);
        if let Some(standing) = existing {
            return Ok(OpenedStanding::AlreadyOpen(standing));
        }

        let mut standing = Reputation::new(pilot_id, input.corporation_id, input.base_value);
        standing.notes = input.notes;
        store.insert_reputation(&standing).await?;
        self.engine.recalculate_pilot(pilot_id).await?;
        info!(
            reputation_id = %standing.id,
            pilot_id = %pilot_id,
            corporation_id = %standing.corporation_id,
            "Standing opened"
        );
        let opened = store.get_reputation(standing.id).await?.unwrap_or(standing);
        Ok(OpenedStanding::Opened(opened))
    }

    /// Delete a standing together with the pilot's logged changes for that
    /// corporation, then replay the pilot's reputation.
    ///
    /// The changes go too, since the replay would otherwise reopen the
    /// standing from them. Returns `false` if the standing does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a read or write fails.
    pub async fn delete_standing(&self, id: ReputationId) -> Result<bool, StoreError> {
        let Some(found) = self.store().get_reputation(id).await? else {
            return Ok(false);
        };
        let _guard = self.locks.acquire(Some(found.pilot_id)).await;
        let store = self.store();
        if !store.delete_reputation(id).await? {
            return Ok(false);
        }
        let removed = store
            .delete_reputation_changes(found.pilot_id, found.corporation_id)
            .await?;
        self.engine.recalculate_pilot(found.pilot_id).await?;
        info!(
            reputation_id = %id,
            pilot_id = %found.pilot_id,
            changes_removed = removed,
            "Standing deleted"
        );
        Ok(true)
    }

    /// Edit a standing's base value or notes and replay its value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a read or write fails.
    pub async fn update_standing(
        &self,
        id: ReputationId,
        update: ReputationUpdate,
    ) -> Result<Option<Reputation>, StoreError> {
        let Some(found) = self.store().get_reputation(id).await? else {
            return Ok(None);
        };
        let _guard = self.locks.acquire(Some(found.pilot_id)).await;
        let Some(mut standing) = self.store().get_reputation(id).await? else {
            return Ok(None);
        };
        if let Some(base) = update.base_value {
            standing.base_value = base;
        }
        if let Some(notes) = update.notes {
            standing.notes = Some(notes);
        }
        self.store().save_reputation(&standing).await?;
        self.engine.recalculate_pilot(standing.pilot_id).await?;
        self.store().get_reputation(id).await
    }

    // -----------------------------------------------------------------------
    // Import
    // -----------------------------------------------------------------------

    /// Persist an imported character log as a new pilot owned by `owner`.
    ///
    /// The imported entries keep their session dates. The license state
    /// found in the notes is carried in as opening trade entries dated
    /// before the first session, each holding at most
    /// [`MAX_LL_CLOCK_CHANGE`] ticks, so the replayed level matches the
    /// export. Derived fields come from the replay, not the parsed totals.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if any write fails.
    pub async fn import_pilot(
        &self,
        owner: UserId,
        imported: ImportedPilot,
    ) -> Result<Pilot, StoreError> {
        let mut pilot = Pilot::new(owner, imported.name);
        pilot.callsign = imported.callsign;
        let _guard = self.locks.acquire(Some(pilot.id)).await;
        let store = self.store();
        store.insert_pilot(&pilot).await?;

        let now = Utc::now();
        let opened_at = imported
            .log_entries
            .iter()
            .filter_map(|e| e.date)
            .min()
            .unwrap_or(now);
        let opened_at = opened_at
            .checked_sub_signed(TimeDelta::seconds(1))
            .unwrap_or(opened_at);

        let opening_ticks = ticks_for(imported.license.level, imported.license.progress);
        for chunk in opening_chunks(opening_ticks) {
            let entry = opening_entry(pilot.id, chunk, imported.license, opened_at);
            store.insert_log(&entry).await?;
        }

        for row in &imported.log_entries {
            let created_at = row.date.unwrap_or(now);
            let entry = LogEntry {
                id: LogEntryId::new(),
                pilot_id: pilot.id,
                log_type: row.log_type,
                description: Some(row.description()),
                manna_change: row.manna_change,
                downtime_change: row.downtime_change,
                ll_clock_change: 0,
                created_at,
                updated_at: created_at,
            };
            store.insert_log(&entry).await?;
        }

        for item in imported.gear {
            let mut gear = Gear::new(pilot.id, item.name);
            gear.description = (!item.rarity.is_empty()).then(|| format!("Rarity: {}", item.rarity));
            gear.notes = (!item.notes.is_empty()).then_some(item.notes);
            store.insert_gear(&gear).await?;
        }

        if let Some(resources) = self.engine.recalculate_pilot(pilot.id).await? {
            pilot.apply_resources(resources);
        }

        info!(
            pilot_id = %pilot.id,
            logs = imported.log_entries.len(),
            license_level = pilot.license_level,
            manna = pilot.manna,
            "Pilot imported"
        );
        Ok(pilot)
    }
}

/// Split an opening tick total into entry-sized pieces.
fn opening_chunks(total: i64) -> Vec<i32> {
    let max = i64::from(MAX_LL_CLOCK_CHANGE);
    let mut remaining = total.max(0);
    let mut chunks = Vec::new();
    while remaining > 0 {
        let chunk = remaining.min(max);
        chunks.push(i32::try_from(chunk).unwrap_or(MAX_LL_CLOCK_CHANGE));
        remaining = remaining.saturating_sub(chunk);
    }
    chunks
}

fn opening_entry(
    pilot_id: PilotId,
    ticks: i32,
    license: LicenseProgress,
    at: DateTime<Utc>,
) -> LogEntry {
    LogEntry {
        id: LogEntryId::new(),
        pilot_id,
        log_type: LogType::Trade,
        description: Some(format!(
            "Imported license state LL{} ({}/{})",
            license.level,
            license.progress,
            ll_clock_segments(license.level)
        )),
        manna_change: 0,
        downtime_change: 0,
        ll_clock_change: ticks,
        created_at: at,
        updated_at: at,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::Utc;
    use pilot_ledger_types::{
        Corporation, CorporationId, GearAcquiredInput, GearLostInput, ReputationChangeInput,
    };

    use super::*;
    use crate::import::parse_al_csv;
    use crate::memory::MemoryStore;
    use crate::store::{ClockStore, FactionStore, InventoryStore, LogStore, PilotStore};

    async fn service_with_pilot() -> (LogService<MemoryStore>, Pilot) {
        let service = LogService::new(MemoryStore::new());
        let pilot = Pilot::new(UserId::new(), "Lee".to_owned());
        service.store().insert_pilot(&pilot).await.unwrap();
        (service, pilot)
    }

    async fn reputation_value(store: &MemoryStore, id: ReputationId) -> i32 {
        store.get_reputation(id).await.unwrap().unwrap().reputation_value
    }

    async fn pilot_now(service: &LogService<MemoryStore>, id: PilotId) -> Pilot {
        service.store().get_pilot(id).await.unwrap().unwrap()
    }

    #[test]
    fn clamp_bounds() {
        assert_eq!(clamp_ll_clock_change(999), 25);
        assert_eq!(clamp_ll_clock_change(-50), 0);
        assert_eq!(clamp_ll_clock_change(7), 7);
    }

    #[test]
    fn opening_chunks_respect_entry_cap() {
        assert_eq!(opening_chunks(0), Vec::<i32>::new());
        assert_eq!(opening_chunks(-3), Vec::<i32>::new());
        assert_eq!(opening_chunks(30), vec![25, 5]);
        assert_eq!(opening_chunks(50), vec![25, 25]);
    }

    #[tokio::test]
    async fn two_entries_replay_end_to_end() {
        let (service, pilot) = service_with_pilot().await;
        service
            .create_log(pilot.id, NewLogEntry::resources(LogType::Game, 10, 0, 2))
            .await
            .unwrap();
        service
            .create_log(pilot.id, NewLogEntry::resources(LogType::Trade, -3, 0, 1))
            .await
            .unwrap();

        let pilot = pilot_now(&service, pilot.id).await;
        assert_eq!(pilot.manna, 7);
        assert_eq!((pilot.license_level, pilot.ll_clock_progress), (1, 0));
    }

    #[tokio::test]
    async fn ll_change_is_clamped_when_written() {
        let (service, pilot) = service_with_pilot().await;
        let high = service
            .create_log(pilot.id, NewLogEntry::resources(LogType::Game, 0, 0, 999))
            .await
            .unwrap()
            .unwrap();
        let low = service
            .create_log(pilot.id, NewLogEntry::resources(LogType::Game, 0, 0, -50))
            .await
            .unwrap()
            .unwrap();
        let store = service.store();
        assert_eq!(store.get_log(high.entry.id).await.unwrap().unwrap().ll_clock_change, 25);
        assert_eq!(store.get_log(low.entry.id).await.unwrap().unwrap().ll_clock_change, 0);

        let update = LogEntryUpdate {
            ll_clock_change: Some(40),
            ..LogEntryUpdate::default()
        };
        let updated = service.update_log(low.entry.id, update).await.unwrap().unwrap();
        assert_eq!(updated.ll_clock_change, 25);
    }

    #[tokio::test]
    async fn missing_pilot_creates_nothing() {
        let service = LogService::new(MemoryStore::new());
        let created = service
            .create_log(PilotId::new(), NewLogEntry::resources(LogType::Game, 1, 1, 1))
            .await
            .unwrap();
        assert!(created.is_none());
        assert!(!service.delete_log(LogEntryId::new()).await.unwrap());
        assert!(
            service
                .update_log(LogEntryId::new(), LogEntryUpdate::default())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn delete_and_update_replay() {
        let (service, pilot) = service_with_pilot().await;
        let first = service
            .create_log(pilot.id, NewLogEntry::resources(LogType::Game, 10, 4, 3))
            .await
            .unwrap()
            .unwrap();
        service
            .create_log(pilot.id, NewLogEntry::resources(LogType::Game, 5, 1, 0))
            .await
            .unwrap();
        assert_eq!(pilot_now(&service, pilot.id).await.manna, 15);

        let update = LogEntryUpdate {
            manna_change: Some(-2),
            ..LogEntryUpdate::default()
        };
        service.update_log(first.entry.id, update).await.unwrap();
        let after_update = pilot_now(&service, pilot.id).await;
        assert_eq!(after_update.manna, 3);
        assert_eq!(after_update.license_level, 1);

        assert!(service.delete_log(first.entry.id).await.unwrap());
        let after_delete = pilot_now(&service, pilot.id).await;
        assert_eq!((after_delete.manna, after_delete.downtime), (5, 1));
        assert_eq!(after_delete.license_level, 0);
    }

    #[tokio::test]
    async fn progress_only_links_owned_clocks() {
        let (service, pilot) = service_with_pilot().await;
        let store = service.store();
        let own = Clock::new(Some(pilot.id), "Escape".to_owned(), 4, 1);
        let foreign = Clock::new(Some(PilotId::new()), "Theirs".to_owned(), 4, 1);
        store.insert_clock(&own).await.unwrap();
        store.insert_clock(&foreign).await.unwrap();

        let mut input = NewLogEntry::resources(LogType::Game, 0, 0, 0);
        input.clock_progress = vec![
            ClockProgressInput { clock_id: own.id, ticks_applied: 3 },
            ClockProgressInput { clock_id: foreign.id, ticks_applied: 3 },
        ];
        let details = service.create_log(pilot.id, input).await.unwrap().unwrap();
        assert_eq!(details.clock_progress.len(), 1);
        assert_eq!(store.get_clock(own.id).await.unwrap().unwrap().filled, 3);
        assert_eq!(store.get_clock(foreign.id).await.unwrap().unwrap().filled, 0);

        // Replacing the links rewrites the fill.
        let update = LogEntryUpdate {
            clock_progress: Some(vec![ClockProgressInput { clock_id: own.id, ticks_applied: 1 }]),
            ..LogEntryUpdate::default()
        };
        service.update_log(details.entry.id, update).await.unwrap();
        assert_eq!(store.get_clock(own.id).await.unwrap().unwrap().filled, 1);

        // Deleting the entry empties the clock.
        service.delete_log(details.entry.id).await.unwrap();
        assert_eq!(store.get_clock(own.id).await.unwrap().unwrap().filled, 0);
    }

    #[tokio::test]
    async fn manual_ticks_survive_replay() {
        let (service, pilot) = service_with_pilot().await;
        let clock = Clock::new(Some(pilot.id), "Escape".to_owned(), 6, 1);
        service.store().insert_clock(&clock).await.unwrap();

        let ticked = service.tick_clock(clock.id, 2).await.unwrap().unwrap();
        assert_eq!(ticked.filled, 2);

        let mut input = NewLogEntry::resources(LogType::Game, 0, 0, 0);
        input.clock_progress = vec![ClockProgressInput { clock_id: clock.id, ticks_applied: 1 }];
        service.create_log(pilot.id, input).await.unwrap();

        let stored = service.store().get_clock(clock.id).await.unwrap().unwrap();
        assert_eq!((stored.manual_ticks, stored.filled), (2, 3));
    }

    #[tokio::test]
    async fn gear_moves_with_the_log() {
        let (service, pilot) = service_with_pilot().await;
        let store = service.store();
        let rifle = Gear::new(pilot.id, "Old Rifle".to_owned());
        let theirs = Gear::new(PilotId::new(), "Not Yours".to_owned());
        store.insert_gear(&rifle).await.unwrap();
        store.insert_gear(&theirs).await.unwrap();

        let mut input = NewLogEntry::resources(LogType::Game, 0, 0, 0);
        input.gear_acquired = vec![GearAcquiredInput {
            name: "Nanite Swarm".to_owned(),
            description: None,
            notes: None,
        }];
        input.gear_lost = vec![
            GearLostInput { gear_id: rifle.id },
            GearLostInput { gear_id: theirs.id },
        ];
        let details = service.create_log(pilot.id, input).await.unwrap().unwrap();
        assert_eq!(details.gear_acquired.len(), 1);
        assert_eq!(details.gear_lost.len(), 1);
        assert!(!store.get_gear(rifle.id).await.unwrap().unwrap().is_held());
        assert!(store.get_gear(theirs.id).await.unwrap().unwrap().is_held());

        let fetched = service.log_details(details.entry.id).await.unwrap().unwrap();
        assert_eq!(fetched.gear_acquired, details.gear_acquired);

        service.delete_log(details.entry.id).await.unwrap();
        assert!(store.get_gear(rifle.id).await.unwrap().unwrap().is_held());
        let names: Vec<String> = store
            .list_gear(pilot.id)
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.name)
            .collect();
        assert_eq!(names, vec!["Old Rifle".to_owned()]);
    }

    #[tokio::test]
    async fn reputation_changes_replay_into_standings() {
        let (service, pilot) = service_with_pilot().await;
        let store = service.store();
        let corp = seed_corporation(store, "SSC").await;
        let standing = open(&service, pilot.id, corp.id, 2).await;

        let mut input = NewLogEntry::resources(LogType::Game, 0, 0, 0);
        input.reputation_changes = vec![
            ReputationChangeInput {
                corporation_id: corp.id,
                change_value: 3,
                notes: None,
            },
            ReputationChangeInput {
                corporation_id: CorporationId::new(),
                change_value: 9,
                notes: None,
            },
        ];
        let details = service.create_log(pilot.id, input).await.unwrap().unwrap();
        assert_eq!(details.reputation_changes.len(), 1);
        assert_eq!(reputation_value(store, standing.id).await, 5);

        let update = ReputationUpdate {
            base_value: Some(-1),
            notes: None,
        };
        service.update_standing(standing.id, update).await.unwrap();
        assert_eq!(reputation_value(store, standing.id).await, 2);

        service.delete_log(details.entry.id).await.unwrap();
        assert_eq!(reputation_value(store, standing.id).await, -1);
    }

    async fn seed_corporation(store: &MemoryStore, name: &str) -> Corporation {
        let now = Utc::now();
        let corp = Corporation {
            id: CorporationId::new(),
            name: name.to_owned(),
            description: None,
            created_at: now,
            updated_at: now,
        };
        store.insert_corporation(&corp).await.unwrap();
        corp
    }

    async fn open(
        service: &LogService<MemoryStore>,
        pilot_id: PilotId,
        corporation_id: CorporationId,
        base_value: i32,
    ) -> Reputation {
        let input = NewReputation {
            corporation_id,
            base_value,
            notes: None,
        };
        match service.open_standing(pilot_id, input).await.unwrap() {
            OpenedStanding::Opened(standing) => standing,
            other => panic!("standing not opened: {other:?}"),
        }
    }

    fn change(corporation_id: CorporationId, change_value: i32) -> NewLogEntry {
        let mut input = NewLogEntry::resources(LogType::Game, 0, 0, 0);
        input.reputation_changes = vec![ReputationChangeInput {
            corporation_id,
            change_value,
            notes: None,
        }];
        input
    }

    #[tokio::test]
    async fn deleted_standing_stays_deleted_after_replay() {
        let (service, pilot) = service_with_pilot().await;
        let store = service.store();
        let corp = seed_corporation(store, "Horus").await;
        service.create_log(pilot.id, change(corp.id, 4)).await.unwrap();

        let standings = store.list_reputation(pilot.id).await.unwrap();
        assert_eq!(standings.len(), 1);
        let standing = standings.first().unwrap();
        assert_eq!(standing.reputation_value, 4);

        assert!(service.delete_standing(standing.id).await.unwrap());
        assert!(!service.delete_standing(standing.id).await.unwrap());
        assert!(store.list_reputation_changes(pilot.id).await.unwrap().is_empty());

        service
            .create_log(pilot.id, NewLogEntry::resources(LogType::Trade, 1, 0, 0))
            .await
            .unwrap();
        assert!(store.list_reputation(pilot.id).await.unwrap().is_empty());
        assert_eq!(pilot_now(&service, pilot.id).await.manna, 1);
    }

    #[tokio::test]
    async fn delete_standing_keeps_other_corporations() {
        let (service, pilot) = service_with_pilot().await;
        let store = service.store();
        let kept = seed_corporation(store, "IPS-N").await;
        let dropped = seed_corporation(store, "Harrison Armory").await;
        let kept_standing = open(&service, pilot.id, kept.id, 1).await;
        let dropped_standing = open(&service, pilot.id, dropped.id, 1).await;
        service.create_log(pilot.id, change(kept.id, 2)).await.unwrap();
        service.create_log(pilot.id, change(dropped.id, 5)).await.unwrap();

        service.delete_standing(dropped_standing.id).await.unwrap();

        let changes = store.list_reputation_changes(pilot.id).await.unwrap();
        assert_eq!(changes.len(), 1);
        assert!(changes.iter().all(|c| c.corporation_id == kept.id));
        assert_eq!(reputation_value(store, kept_standing.id).await, 3);
    }

    #[tokio::test]
    async fn reopening_a_standing_changes_nothing() {
        let (service, pilot) = service_with_pilot().await;
        let store = service.store();
        let corp = seed_corporation(store, "Union Naval").await;
        let first = open(&service, pilot.id, corp.id, 3).await;

        let again = NewReputation {
            corporation_id: corp.id,
            base_value: 9,
            notes: Some("second try".to_owned()),
        };
        let outcome = service.open_standing(pilot.id, again).await.unwrap();
        assert!(
            matches!(outcome, OpenedStanding::AlreadyOpen(ref s) if s.id == first.id && s.base_value == 3)
        );
        assert_eq!(reputation_value(store, first.id).await, 3);
        assert_eq!(store.list_reputation(pilot.id).await.unwrap().len(), 1);

        let unknown = NewReputation {
            corporation_id: CorporationId::new(),
            base_value: 0,
            notes: None,
        };
        assert_eq!(
            service.open_standing(pilot.id, unknown).await.unwrap(),
            OpenedStanding::UnknownCorporation
        );
    }

    #[tokio::test]
    async fn clock_and_gear_writes_go_through_the_service() {
        let (service, pilot) = service_with_pilot().await;
        let store = service.store();
        let mut clock = Clock::new(Some(pilot.id), "Siege".to_owned(), 6, 1);
        store.insert_clock(&clock).await.unwrap();
        service.tick_clock(clock.id, 5).await.unwrap();

        clock.segments = 4;
        let saved = service.save_clock(&clock).await.unwrap().unwrap();
        assert_eq!((saved.segments, saved.filled, saved.is_completed), (4, 4, true));

        assert!(service.delete_clock(clock.id).await.unwrap());
        assert!(!service.delete_clock(clock.id).await.unwrap());
        assert!(service.save_clock(&clock).await.unwrap().is_none());

        let gear = Gear::new(pilot.id, "Flare Pistol".to_owned());
        store.insert_gear(&gear).await.unwrap();
        assert!(service.delete_gear(gear.id).await.unwrap());
        assert!(store.get_gear(gear.id).await.unwrap().is_none());
        assert!(!service.delete_gear(gear.id).await.unwrap());
    }

    #[tokio::test]
    async fn concurrent_creates_all_land() {
        let (service, pilot) = service_with_pilot().await;
        let mut handles = Vec::new();
        for _ in 0..16 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service
                    .create_log(pilot.id, NewLogEntry::resources(LogType::Game, 1, 1, 1))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        let pilot = pilot_now(&service, pilot.id).await;
        assert_eq!((pilot.manna, pilot.downtime), (16, 16));
        assert_eq!((pilot.license_level, pilot.ll_clock_progress), (5, 1));
    }

    #[tokio::test]
    async fn import_carries_license_level() {
        let text = "\
name
Ash \"Hex\"
CharacterLogEntry,Patrol,,2024-01-05 18:00:00 UTC,,,,12,2,,,,,,LL4 (1/3)
CharacterLogEntry,GMing,,2024-01-12 18:00:00 UTC,,,,-2,1,,,,,,
MAGIC ITEM,Ghost Cloak,Uncommon,,,,
";
        let imported = parse_al_csv(text).unwrap();
        let service = LogService::new(MemoryStore::new());
        let owner = UserId::new();
        let pilot = service.import_pilot(owner, imported).await.unwrap();

        assert_eq!(pilot.name, "Ash");
        assert_eq!(pilot.callsign.as_deref(), Some("Hex"));
        assert_eq!((pilot.manna, pilot.downtime), (10, 3));
        assert_eq!((pilot.license_level, pilot.ll_clock_progress), (4, 1));

        let logs = service.store().list_logs(pilot.id).await.unwrap();
        assert_eq!(logs.len(), 3);
        let oldest = logs.last().unwrap();
        assert_eq!(oldest.log_type, LogType::Trade);
        assert_eq!(oldest.ll_clock_change, 13);

        let gear = service.store().list_gear(pilot.id).await.unwrap();
        assert_eq!(
            gear.first().and_then(|g| g.description.clone()).as_deref(),
            Some("Rarity: Uncommon")
        );
        assert_eq!(service.store().list_pilots(Some(owner)).await.unwrap().len(), 1);
    }
}
