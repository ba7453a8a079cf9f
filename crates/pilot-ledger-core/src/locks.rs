//! Per-pilot mutual exclusion.
//!
//! A log mutation and the replay it triggers must not interleave with another
//! mutation of the same pilot, or the last writer of the derived fields could
//! publish a replay that misses the other mutation. [`PilotLocks`] hands out
//! one async mutex per pilot; holders of different pilots never contend.
//!
//! Campaign clocks (no owning pilot) share a single extra lock.

use std::collections::HashMap;
use std::sync::Arc;

use pilot_ledger_types::PilotId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Guard for one pilot's (or the campaign's) mutation scope.
pub type PilotGuard = OwnedMutexGuard<()>;

/// Registry of per-pilot async mutexes.
#[derive(Debug, Clone, Default)]
pub struct PilotLocks {
    pilots: Arc<Mutex<HashMap<PilotId, Arc<Mutex<()>>>>>,
    campaign: Arc<Mutex<()>>,
}

impl PilotLocks {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the scope of `pilot_id`, or the campaign scope for `None`.
    ///
    /// Waits until any other holder of the same scope releases it.
    pub async fn acquire(&self, pilot_id: Option<PilotId>) -> PilotGuard {
        let Some(id) = pilot_id else {
            return Arc::clone(&self.campaign).lock_owned().await;
        };

        let slot = {
            let mut pilots = self.pilots.lock().await;
            // Drop slots nobody is holding or waiting on.
            pilots.retain(|key, slot| *key == id || Arc::strong_count(slot) > 1);
            Arc::clone(pilots.entry(id).or_default())
        };
        slot.lock_owned().await
    }

    /// Number of pilot slots currently tracked.
    pub async fn tracked(&self) -> usize {
        self.pilots.lock().await.len()
    }
}
