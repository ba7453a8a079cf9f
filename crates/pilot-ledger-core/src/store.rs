//! Persistence seams for the ledger.
//!
//! The recalculation engine and the log mutation service are generic over
//! these traits. Two backends exist: [`crate::memory::MemoryStore`] for
//! tests and local runs, and the `PostgreSQL` store in `pilot-ledger-db`.
//!
//! # Contract
//!
//! - Every method is individually atomic; no method spans a transaction
//!   across calls. Callers serialize mutations of one pilot with
//!   [`crate::locks::PilotLocks`].
//! - Lookups of a missing row return `Ok(None)` (or `Ok(false)` for
//!   writes), never an error. [`StoreError`] is reserved for backend
//!   failures.
//! - Ids are generated by the caller; inserts never assign them.
//! - Deleting a pilot cascades to every dependent row. Deleting a log entry
//!   cascades to its progress links and reputation changes, deletes gear it
//!   granted, and restores gear it marked as lost.

use std::future::Future;

use pilot_ledger_types::{
    Clock, ClockId, ClockProgress, Corporation, CorporationId, Gear, GearId, LogEntry, LogEntryId,
    LogFilter, Pilot, PilotId, PilotResources, Reputation, ReputationChange, ReputationId, User,
    UserId,
};

use crate::clock::ClockFill;

/// A backend failure. Not-found is never reported through this type.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend rejected or failed the operation.
    #[error("store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A stored row could not be decoded.
    #[error("corrupt row in {table}: {message}")]
    Corrupt {
        /// Table holding the row.
        table: &'static str,
        /// What was wrong with it.
        message: String,
    },
}

impl StoreError {
    /// Wrap any backend error.
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }
}

/// Pilot rows.
pub trait PilotStore: Send + Sync {
    /// Pilots owned by `owner`, or every pilot when `owner` is `None`.
    /// Newest first.
    fn list_pilots(
        &self,
        owner: Option<UserId>,
    ) -> impl Future<Output = Result<Vec<Pilot>, StoreError>> + Send;

    /// One pilot.
    fn get_pilot(&self, id: PilotId)
    -> impl Future<Output = Result<Option<Pilot>, StoreError>> + Send;

    /// Insert a pilot row as given (derived fields included).
    fn insert_pilot(&self, pilot: &Pilot) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Overwrite the profile fields (name, callsign, background, notes).
    /// Derived fields are left untouched. Returns `false` if missing.
    fn save_pilot_profile(
        &self,
        pilot: &Pilot,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Overwrite the four derived fields. Returns `false` if missing.
    fn write_pilot_resources(
        &self,
        id: PilotId,
        resources: PilotResources,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Delete a pilot and everything hanging off it.
    fn delete_pilot(&self, id: PilotId) -> impl Future<Output = Result<bool, StoreError>> + Send;
}

/// Clock rows and their progress links.
pub trait ClockStore: Send + Sync {
    /// Clocks of a pilot, oldest first. `None` lists campaign clocks.
    fn list_clocks(
        &self,
        pilot_id: Option<PilotId>,
    ) -> impl Future<Output = Result<Vec<Clock>, StoreError>> + Send;

    /// One clock.
    fn get_clock(&self, id: ClockId)
    -> impl Future<Output = Result<Option<Clock>, StoreError>> + Send;

    /// Insert a clock row.
    fn insert_clock(&self, clock: &Clock) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Overwrite name, segments and tick amount. Returns `false` if missing.
    fn save_clock_definition(
        &self,
        clock: &Clock,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Atomically add `delta` to `manual_ticks`. Returns `false` if missing.
    fn add_manual_ticks(
        &self,
        id: ClockId,
        delta: i32,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Overwrite `filled` and `is_completed`. Returns `false` if missing.
    fn write_clock_fill(
        &self,
        id: ClockId,
        fill: ClockFill,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Delete a clock and its progress links.
    fn delete_clock(&self, id: ClockId) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Every progress link targeting a clock.
    fn list_progress_for_clock(
        &self,
        clock_id: ClockId,
    ) -> impl Future<Output = Result<Vec<ClockProgress>, StoreError>> + Send;

    /// Every progress link recorded by a log entry.
    fn list_progress_for_log(
        &self,
        log_id: LogEntryId,
    ) -> impl Future<Output = Result<Vec<ClockProgress>, StoreError>> + Send;

    /// Insert one progress link.
    fn insert_progress(
        &self,
        progress: &ClockProgress,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Delete every progress link of a log entry. Returns the count removed.
    fn delete_progress_for_log(
        &self,
        log_id: LogEntryId,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;
}

/// Log entry rows.
pub trait LogStore: Send + Sync {
    /// Entries of a pilot, newest first.
    fn list_logs(
        &self,
        pilot_id: PilotId,
    ) -> impl Future<Output = Result<Vec<LogEntry>, StoreError>> + Send;

    /// Campaign-wide listing, newest first, paged by the filter.
    fn query_logs(
        &self,
        filter: &LogFilter,
    ) -> impl Future<Output = Result<Vec<LogEntry>, StoreError>> + Send;

    /// One entry.
    fn get_log(
        &self,
        id: LogEntryId,
    ) -> impl Future<Output = Result<Option<LogEntry>, StoreError>> + Send;

    /// Insert an entry row.
    fn insert_log(&self, entry: &LogEntry) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Overwrite description and the three change fields. Returns `false`
    /// if missing.
    fn save_log(&self, entry: &LogEntry) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Delete an entry with the cascade described in the module docs.
    fn delete_log(&self, id: LogEntryId) -> impl Future<Output = Result<bool, StoreError>> + Send;
}

/// Exotic gear rows.
pub trait InventoryStore: Send + Sync {
    /// Gear of a pilot, held and lost alike, by acquisition date.
    fn list_gear(
        &self,
        pilot_id: PilotId,
    ) -> impl Future<Output = Result<Vec<Gear>, StoreError>> + Send;

    /// One item.
    fn get_gear(&self, id: GearId) -> impl Future<Output = Result<Option<Gear>, StoreError>> + Send;

    /// Insert a gear row.
    fn insert_gear(&self, gear: &Gear) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Overwrite every mutable column (including `lost_log_id`). Returns
    /// `false` if missing.
    fn save_gear(&self, gear: &Gear) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Delete one item.
    fn delete_gear(&self, id: GearId) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Gear granted by a log entry.
    fn list_gear_acquired_in(
        &self,
        log_id: LogEntryId,
    ) -> impl Future<Output = Result<Vec<Gear>, StoreError>> + Send;

    /// Gear lost in a log entry.
    fn list_gear_lost_in(
        &self,
        log_id: LogEntryId,
    ) -> impl Future<Output = Result<Vec<Gear>, StoreError>> + Send;
}

/// Corporations, standings and logged reputation changes.
pub trait FactionStore: Send + Sync {
    /// Every corporation, by name.
    fn list_corporations(&self) -> impl Future<Output = Result<Vec<Corporation>, StoreError>> + Send;

    /// One corporation.
    fn get_corporation(
        &self,
        id: CorporationId,
    ) -> impl Future<Output = Result<Option<Corporation>, StoreError>> + Send;

    /// Insert a corporation.
    fn insert_corporation(
        &self,
        corporation: &Corporation,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Overwrite name and description. Returns `false` if missing.
    fn save_corporation(
        &self,
        corporation: &Corporation,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Delete a corporation with its standings and changes.
    fn delete_corporation(
        &self,
        id: CorporationId,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Standings of a pilot.
    fn list_reputation(
        &self,
        pilot_id: PilotId,
    ) -> impl Future<Output = Result<Vec<Reputation>, StoreError>> + Send;

    /// One standing.
    fn get_reputation(
        &self,
        id: ReputationId,
    ) -> impl Future<Output = Result<Option<Reputation>, StoreError>> + Send;

    /// Insert a standing.
    fn insert_reputation(
        &self,
        reputation: &Reputation,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Overwrite `base_value` and notes. Returns `false` if missing.
    fn save_reputation(
        &self,
        reputation: &Reputation,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Overwrite the derived `reputation_value`. Returns `false` if missing.
    fn write_reputation_value(
        &self,
        id: ReputationId,
        value: i32,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Delete one standing.
    fn delete_reputation(
        &self,
        id: ReputationId,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Insert a logged change.
    fn insert_reputation_change(
        &self,
        change: &ReputationChange,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Every logged change of a pilot.
    fn list_reputation_changes(
        &self,
        pilot_id: PilotId,
    ) -> impl Future<Output = Result<Vec<ReputationChange>, StoreError>> + Send;

    /// Delete a pilot's logged changes for one corporation. Returns the
    /// number removed.
    fn delete_reputation_changes(
        &self,
        pilot_id: PilotId,
        corporation_id: CorporationId,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Changes recorded by one log entry.
    fn list_reputation_changes_for_log(
        &self,
        log_id: LogEntryId,
    ) -> impl Future<Output = Result<Vec<ReputationChange>, StoreError>> + Send;
}

/// User profiles.
pub trait UserStore: Send + Sync {
    /// One user.
    fn get_user(&self, id: UserId) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;

    /// Insert or refresh a user profile.
    fn upsert_user(&self, user: &User) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Everything the ledger needs from a backend.
///
/// Implemented automatically for any cheap-to-clone handle that implements
/// the individual store traits.
pub trait Store:
    PilotStore + ClockStore + LogStore + InventoryStore + FactionStore + UserStore + Clone + 'static
{
}

impl<T> Store for T where
    T: PilotStore
        + ClockStore
        + LogStore
        + InventoryStore
        + FactionStore
        + UserStore
        + Clone
        + 'static
{
}
