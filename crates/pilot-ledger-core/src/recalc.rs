//! The recalculation engine.
//!
//! Rebuilds every derived field of a pilot from its log. Nothing here is
//! incremental: pilot totals, license progress, clock fills and reputation
//! values are recomputed from scratch on every call, so the result depends
//! only on the set of stored rows and never on the order they were written.
//!
//! # Architecture
//!
//! ```text
//! recalculate_pilot(id)
//!     |
//!     +-- sum log entries ------> compute_license_level(total_ll, 0)
//!     |                               |
//!     |                               +--> write_pilot_resources
//!     |
//!     +-- for each clock -------> recalculate_clock
//!     |                               sum progress + manual ticks
//!     |                               +--> write_clock_fill
//!     |
//!     +-- reputation -----------> base_value + sum(change_value)
//!                                     +--> write_reputation_value
//! ```
//!
//! Missing pilots and clocks are silent no-ops (`Ok(None)`). The engine
//! takes no locks; callers that mutate the log hold the pilot's
//! [`crate::locks::PilotLocks`] scope across the mutation and the replay.

use std::collections::BTreeMap;

use pilot_ledger_types::{
    Clock, ClockId, CorporationId, PilotId, PilotResources, Reputation,
};
use tracing::debug;

use crate::clock::{ClockFill, fill_for};
use crate::progression::compute_license_level;
use crate::store::{Store, StoreError};

/// Replays pilot logs into derived state.
#[derive(Debug, Clone)]
pub struct Recalculator<S> {
    store: S,
}

impl<S: Store> Recalculator<S> {
    /// Create an engine over a store handle.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Rewrite every derived field of a pilot from its full log.
    ///
    /// Returns the freshly written resources, or `None` if the pilot does
    /// not exist. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if any read or write fails. Writes performed
    /// before the failure are kept; re-running converges.
    pub async fn recalculate_pilot(
        &self,
        pilot_id: PilotId,
    ) -> Result<Option<PilotResources>, StoreError> {
        if self.store.get_pilot(pilot_id).await?.is_none() {
            debug!(pilot_id = %pilot_id, "Recalculation skipped, pilot not found");
            return Ok(None);
        }

        let logs = self.store.list_logs(pilot_id).await?;
        let mut manna: i64 = 0;
        let mut downtime: i64 = 0;
        let mut ll_ticks: i64 = 0;
        for entry in &logs {
            manna = manna.saturating_add(entry.manna_change);
            downtime = downtime.saturating_add(entry.downtime_change);
            ll_ticks = ll_ticks.saturating_add(i64::from(entry.ll_clock_change));
        }

        let license = compute_license_level(ll_ticks, 0);
        let resources = PilotResources {
            manna,
            downtime,
            license_level: license.level,
            ll_clock_progress: license.progress,
        };
        self.store.write_pilot_resources(pilot_id, resources).await?;

        let clocks = self.store.list_clocks(Some(pilot_id)).await?;
        for clock in &clocks {
            self.refill(clock).await?;
        }

        let standings = self.replay_reputation(pilot_id).await?;

        debug!(
            pilot_id = %pilot_id,
            logs = logs.len(),
            clocks = clocks.len(),
            standings,
            manna,
            downtime,
            license_level = license.level,
            ll_clock_progress = license.progress,
            "Pilot recalculated"
        );

        Ok(Some(resources))
    }

    /// Rewrite one clock's fill from its progress links and manual ticks.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a read or write fails.
    pub async fn recalculate_clock(&self, clock_id: ClockId) -> Result<Option<ClockFill>, StoreError> {
        let Some(clock) = self.store.get_clock(clock_id).await? else {
            debug!(clock_id = %clock_id, "Clock recalculation skipped, clock not found");
            return Ok(None);
        };
        self.refill(&clock).await.map(Some)
    }

    /// Add `delta` manual ticks to a clock and refresh its fill.
    ///
    /// Pilot resources are never touched. Returns the updated clock, or
    /// `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a read or write fails.
    pub async fn tick_clock(&self, clock_id: ClockId, delta: i32) -> Result<Option<Clock>, StoreError> {
        if !self.store.add_manual_ticks(clock_id, delta).await? {
            return Ok(None);
        }
        if self.recalculate_clock(clock_id).await?.is_none() {
            return Ok(None);
        }
        self.store.get_clock(clock_id).await
    }

    async fn refill(&self, clock: &Clock) -> Result<ClockFill, StoreError> {
        let progress = self.store.list_progress_for_clock(clock.id).await?;
        let fill = fill_for(clock, &progress);
        self.store.write_clock_fill(clock.id, fill).await?;
        Ok(fill)
    }

    /// Rewrite every standing of a pilot as `base_value + sum(changes)`.
    ///
    /// A corporation that only appears through logged changes gets a new
    /// standing with base 0. Returns the number of standings written.
    async fn replay_reputation(&self, pilot_id: PilotId) -> Result<usize, StoreError> {
        let changes = self.store.list_reputation_changes(pilot_id).await?;
        let mut totals: BTreeMap<CorporationId, i32> = BTreeMap::new();
        for change in &changes {
            let total = totals.entry(change.corporation_id).or_insert(0);
            *total = total.saturating_add(change.change_value);
        }

        let standings = self.store.list_reputation(pilot_id).await?;
        let mut written: usize = 0;
        for standing in &standings {
            let delta = totals.remove(&standing.corporation_id).unwrap_or(0);
            let value = standing.base_value.saturating_add(delta);
            if value != standing.reputation_value {
                self.store.write_reputation_value(standing.id, value).await?;
            }
            written = written.saturating_add(1);
        }

        for (corporation_id, delta) in totals {
            if self.store.get_corporation(corporation_id).await?.is_none() {
                continue;
            }
            let mut standing = Reputation::new(pilot_id, corporation_id, 0);
            standing.reputation_value = delta;
            self.store.insert_reputation(&standing).await?;
            written = written.saturating_add(1);
        }

        Ok(written)
    }
}
