//! In-memory store.
//!
//! Backs the engine tests, the HTTP tests and local runs without a
//! database. Tables are ordered maps keyed by time-ordered ids behind one
//! [`RwLock`]; each trait method takes the lock once, so every call is
//! atomic the same way a single SQL statement is.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use pilot_ledger_types::{
    Clock, ClockId, ClockProgress, Corporation, CorporationId, Gear, GearId, LogEntry, LogEntryId,
    LogFilter, Pilot, PilotId, PilotResources, Reputation, ReputationChange, ReputationChangeId,
    ReputationId, User, UserId,
};
use tokio::sync::RwLock;

use crate::clock::ClockFill;
use crate::store::{
    ClockStore, FactionStore, InventoryStore, LogStore, PilotStore, StoreError, UserStore,
};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    pilots: BTreeMap<PilotId, Pilot>,
    clocks: BTreeMap<ClockId, Clock>,
    progress: Vec<ClockProgress>,
    logs: BTreeMap<LogEntryId, LogEntry>,
    gear: BTreeMap<GearId, Gear>,
    corporations: BTreeMap<CorporationId, Corporation>,
    reputation: BTreeMap<ReputationId, Reputation>,
    reputation_changes: BTreeMap<ReputationChangeId, ReputationChange>,
}

impl Tables {
    fn remove_log_cascade(&mut self, id: LogEntryId) -> bool {
        if self.logs.remove(&id).is_none() {
            return false;
        }
        self.progress.retain(|p| p.log_entry_id != id);
        self.reputation_changes.retain(|_, c| c.log_entry_id != id);
        self.gear.retain(|_, g| g.acquired_log_id != Some(id));
        let now = Utc::now();
        for gear in self.gear.values_mut() {
            if gear.lost_log_id == Some(id) {
                gear.lost_log_id = None;
                gear.updated_at = now;
            }
        }
        true
    }
}

/// A cheaply cloneable in-memory store. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T, K: Ord>(rows: &mut [T], key: impl Fn(&T) -> K) {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
}

fn to_usize(value: u32) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

// ---------------------------------------------------------------------------
// Pilots
// ---------------------------------------------------------------------------

impl PilotStore for MemoryStore {
    async fn list_pilots(&self, owner: Option<UserId>) -> Result<Vec<Pilot>, StoreError> {
        let tables = self.tables.read().await;
        let mut pilots: Vec<Pilot> = tables
            .pilots
            .values()
            .filter(|p| owner.is_none_or(|o| p.user_id == o))
            .cloned()
            .collect();
        newest_first(&mut pilots, |p| (p.created_at, p.id));
        Ok(pilots)
    }

    async fn get_pilot(&self, id: PilotId) -> Result<Option<Pilot>, StoreError> {
        Ok(self.tables.read().await.pilots.get(&id).cloned())
    }

    async fn insert_pilot(&self, pilot: &Pilot) -> Result<(), StoreError> {
        self.tables.write().await.pilots.insert(pilot.id, pilot.clone());
        Ok(())
    }

    async fn save_pilot_profile(&self, pilot: &Pilot) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables.pilots.get_mut(&pilot.id) else {
            return Ok(false);
        };
        row.name.clone_from(&pilot.name);
        row.callsign.clone_from(&pilot.callsign);
        row.background.clone_from(&pilot.background);
        row.notes.clone_from(&pilot.notes);
        row.updated_at = Utc::now();
        Ok(true)
    }

    async fn write_pilot_resources(
        &self,
        id: PilotId,
        resources: PilotResources,
    ) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables.pilots.get_mut(&id) else {
            return Ok(false);
        };
        row.apply_resources(resources);
        row.updated_at = Utc::now();
        Ok(true)
    }

    async fn delete_pilot(&self, id: PilotId) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.pilots.remove(&id).is_none() {
            return Ok(false);
        }
        let log_ids: Vec<LogEntryId> = tables
            .logs
            .values()
            .filter(|l| l.pilot_id == id)
            .map(|l| l.id)
            .collect();
        for log_id in log_ids {
            tables.remove_log_cascade(log_id);
        }
        let clock_ids: Vec<ClockId> = tables
            .clocks
            .values()
            .filter(|c| c.pilot_id == Some(id))
            .map(|c| c.id)
            .collect();
        for clock_id in &clock_ids {
            tables.clocks.remove(clock_id);
        }
        tables.progress.retain(|p| !clock_ids.contains(&p.clock_id));
        tables.gear.retain(|_, g| g.pilot_id != id);
        tables.reputation.retain(|_, r| r.pilot_id != id);
        tables.reputation_changes.retain(|_, c| c.pilot_id != id);
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Clocks
// ---------------------------------------------------------------------------

impl ClockStore for MemoryStore {
    async fn list_clocks(&self, pilot_id: Option<PilotId>) -> Result<Vec<Clock>, StoreError> {
        let tables = self.tables.read().await;
        let mut clocks: Vec<Clock> = tables
            .clocks
            .values()
            .filter(|c| c.pilot_id == pilot_id)
            .cloned()
            .collect();
        clocks.sort_by_key(|c| (c.created_at, c.id));
        Ok(clocks)
    }

    async fn get_clock(&self, id: ClockId) -> Result<Option<Clock>, StoreError> {
        Ok(self.tables.read().await.clocks.get(&id).cloned())
    }

    async fn insert_clock(&self, clock: &Clock) -> Result<(), StoreError> {
        self.tables.write().await.clocks.insert(clock.id, clock.clone());
        Ok(())
    }

    async fn save_clock_definition(&self, clock: &Clock) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables.clocks.get_mut(&clock.id) else {
            return Ok(false);
        };
        row.name.clone_from(&clock.name);
        row.segments = clock.segments;
        row.tick_amount = clock.tick_amount;
        row.updated_at = Utc::now();
        Ok(true)
    }

    async fn add_manual_ticks(&self, id: ClockId, delta: i32) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables.clocks.get_mut(&id) else {
            return Ok(false);
        };
        row.manual_ticks = row.manual_ticks.saturating_add(delta);
        row.updated_at = Utc::now();
        Ok(true)
    }

    async fn write_clock_fill(&self, id: ClockId, fill: ClockFill) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables.clocks.get_mut(&id) else {
            return Ok(false);
        };
        row.filled = fill.filled;
        row.is_completed = fill.is_completed;
        row.updated_at = Utc::now();
        Ok(true)
    }

    async fn delete_clock(&self, id: ClockId) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.clocks.remove(&id).is_none() {
            return Ok(false);
        }
        tables.progress.retain(|p| p.clock_id != id);
        Ok(true)
    }

    async fn list_progress_for_clock(
        &self,
        clock_id: ClockId,
    ) -> Result<Vec<ClockProgress>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .progress
            .iter()
            .filter(|p| p.clock_id == clock_id)
            .copied()
            .collect())
    }

    async fn list_progress_for_log(
        &self,
        log_id: LogEntryId,
    ) -> Result<Vec<ClockProgress>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .progress
            .iter()
            .filter(|p| p.log_entry_id == log_id)
            .copied()
            .collect())
    }

    async fn insert_progress(&self, progress: &ClockProgress) -> Result<(), StoreError> {
        self.tables.write().await.progress.push(*progress);
        Ok(())
    }

    async fn delete_progress_for_log(&self, log_id: LogEntryId) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.progress.len();
        tables.progress.retain(|p| p.log_entry_id != log_id);
        let removed = before.saturating_sub(tables.progress.len());
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }
}

// ---------------------------------------------------------------------------
// Log entries
// ---------------------------------------------------------------------------

impl LogStore for MemoryStore {
    async fn list_logs(&self, pilot_id: PilotId) -> Result<Vec<LogEntry>, StoreError> {
        let tables = self.tables.read().await;
        let mut logs: Vec<LogEntry> = tables
            .logs
            .values()
            .filter(|l| l.pilot_id == pilot_id)
            .cloned()
            .collect();
        newest_first(&mut logs, |l| (l.created_at, l.id));
        Ok(logs)
    }

    async fn query_logs(&self, filter: &LogFilter) -> Result<Vec<LogEntry>, StoreError> {
        let tables = self.tables.read().await;
        let mut logs: Vec<LogEntry> = tables
            .logs
            .values()
            .filter(|l| filter.matches(l))
            .cloned()
            .collect();
        newest_first(&mut logs, |l| (l.created_at, l.id));
        Ok(logs
            .into_iter()
            .skip(to_usize(filter.offset))
            .take(to_usize(filter.limit))
            .collect())
    }

    async fn get_log(&self, id: LogEntryId) -> Result<Option<LogEntry>, StoreError> {
        Ok(self.tables.read().await.logs.get(&id).cloned())
    }

    async fn insert_log(&self, entry: &LogEntry) -> Result<(), StoreError> {
        self.tables.write().await.logs.insert(entry.id, entry.clone());
        Ok(())
    }

    async fn save_log(&self, entry: &LogEntry) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables.logs.get_mut(&entry.id) else {
            return Ok(false);
        };
        row.description.clone_from(&entry.description);
        row.manna_change = entry.manna_change;
        row.downtime_change = entry.downtime_change;
        row.ll_clock_change = entry.ll_clock_change;
        row.updated_at = Utc::now();
        Ok(true)
    }

    async fn delete_log(&self, id: LogEntryId) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.remove_log_cascade(id))
    }
}

// ---------------------------------------------------------------------------
// Gear
// ---------------------------------------------------------------------------

impl InventoryStore for MemoryStore {
    async fn list_gear(&self, pilot_id: PilotId) -> Result<Vec<Gear>, StoreError> {
        let tables = self.tables.read().await;
        let mut gear: Vec<Gear> = tables
            .gear
            .values()
            .filter(|g| g.pilot_id == pilot_id)
            .cloned()
            .collect();
        gear.sort_by_key(|g| (g.acquired_date, g.id));
        Ok(gear)
    }

    async fn get_gear(&self, id: GearId) -> Result<Option<Gear>, StoreError> {
        Ok(self.tables.read().await.gear.get(&id).cloned())
    }

    async fn insert_gear(&self, gear: &Gear) -> Result<(), StoreError> {
        self.tables.write().await.gear.insert(gear.id, gear.clone());
        Ok(())
    }

    async fn save_gear(&self, gear: &Gear) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables.gear.get_mut(&gear.id) else {
            return Ok(false);
        };
        row.name.clone_from(&gear.name);
        row.description.clone_from(&gear.description);
        row.notes.clone_from(&gear.notes);
        row.lost_log_id = gear.lost_log_id;
        row.updated_at = Utc::now();
        Ok(true)
    }

    async fn delete_gear(&self, id: GearId) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.gear.remove(&id).is_some())
    }

    async fn list_gear_acquired_in(&self, log_id: LogEntryId) -> Result<Vec<Gear>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .gear
            .values()
            .filter(|g| g.acquired_log_id == Some(log_id))
            .cloned()
            .collect())
    }

    async fn list_gear_lost_in(&self, log_id: LogEntryId) -> Result<Vec<Gear>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .gear
            .values()
            .filter(|g| g.lost_log_id == Some(log_id))
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Corporations and reputation
// ---------------------------------------------------------------------------

impl FactionStore for MemoryStore {
    async fn list_corporations(&self) -> Result<Vec<Corporation>, StoreError> {
        let tables = self.tables.read().await;
        let mut corporations: Vec<Corporation> = tables.corporations.values().cloned().collect();
        corporations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(corporations)
    }

    async fn get_corporation(&self, id: CorporationId) -> Result<Option<Corporation>, StoreError> {
        Ok(self.tables.read().await.corporations.get(&id).cloned())
    }

    async fn insert_corporation(&self, corporation: &Corporation) -> Result<(), StoreError> {
        self.tables
            .write()
            .await
            .corporations
            .insert(corporation.id, corporation.clone());
        Ok(())
    }

    async fn save_corporation(&self, corporation: &Corporation) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables.corporations.get_mut(&corporation.id) else {
            return Ok(false);
        };
        row.name.clone_from(&corporation.name);
        row.description.clone_from(&corporation.description);
        row.updated_at = Utc::now();
        Ok(true)
    }

    async fn delete_corporation(&self, id: CorporationId) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.corporations.remove(&id).is_none() {
            return Ok(false);
        }
        tables.reputation.retain(|_, r| r.corporation_id != id);
        tables.reputation_changes.retain(|_, c| c.corporation_id != id);
        Ok(true)
    }

    async fn list_reputation(&self, pilot_id: PilotId) -> Result<Vec<Reputation>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .reputation
            .values()
            .filter(|r| r.pilot_id == pilot_id)
            .cloned()
            .collect())
    }

    async fn get_reputation(&self, id: ReputationId) -> Result<Option<Reputation>, StoreError> {
        Ok(self.tables.read().await.reputation.get(&id).cloned())
    }

    async fn insert_reputation(&self, reputation: &Reputation) -> Result<(), StoreError> {
        self.tables
            .write()
            .await
            .reputation
            .insert(reputation.id, reputation.clone());
        Ok(())
    }

    async fn save_reputation(&self, reputation: &Reputation) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables.reputation.get_mut(&reputation.id) else {
            return Ok(false);
        };
        row.base_value = reputation.base_value;
        row.notes.clone_from(&reputation.notes);
        row.updated_at = Utc::now();
        Ok(true)
    }

    async fn write_reputation_value(&self, id: ReputationId, value: i32) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables.reputation.get_mut(&id) else {
            return Ok(false);
        };
        row.reputation_value = value;
        row.updated_at = Utc::now();
        Ok(true)
    }

    async fn delete_reputation(&self, id: ReputationId) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.reputation.remove(&id).is_some())
    }

    async fn insert_reputation_change(&self, change: &ReputationChange) -> Result<(), StoreError> {
        self.tables
            .write()
            .await
            .reputation_changes
            .insert(change.id, change.clone());
        Ok(())
    }

    async fn list_reputation_changes(
        &self,
        pilot_id: PilotId,
    ) -> Result<Vec<ReputationChange>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .reputation_changes
            .values()
            .filter(|c| c.pilot_id == pilot_id)
            .cloned()
            .collect())
    }

    async fn delete_reputation_changes(
        &self,
        pilot_id: PilotId,
        corporation_id: CorporationId,
    ) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.reputation_changes.len();
        tables
            .reputation_changes
            .retain(|_, c| c.pilot_id != pilot_id || c.corporation_id != corporation_id);
        let removed = before.saturating_sub(tables.reputation_changes.len());
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }

    async fn list_reputation_changes_for_log(
        &self,
        log_id: LogEntryId,
    ) -> Result<Vec<ReputationChange>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .reputation_changes
            .values()
            .filter(|c| c.log_entry_id == log_id)
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

impl UserStore for MemoryStore {
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn upsert_user(&self, user: &User) -> Result<(), StoreError> {
        self.tables.write().await.users.insert(user.id, user.clone());
        Ok(())
    }
}
