//! Replay engine and log mutation path for the pilot ledger.
//!
//! A pilot's numeric state (manna, downtime, license level and progress,
//! clock fills, reputation values) is never edited directly. It is always
//! the replay of the pilot's log, recomputed in full after every log
//! mutation.
//!
//! # Modules
//!
//! - [`clock`] -- Clock fill from log ticks, manual ticks and tick amount.
//! - [`progression`] -- License level from a cumulative tick count.
//! - [`store`] -- Persistence traits the engine is generic over.
//! - [`memory`] -- In-memory [`store::Store`] implementation.
//! - [`locks`] -- Per-pilot async mutual exclusion.
//! - [`recalc`] -- [`Recalculator`]: full replay of one pilot.
//! - [`service`] -- [`LogService`]: locked log mutations, ticks and import.
//! - [`import`] -- Adventurers League CSV export parser.
//! - [`config`] -- Configuration loading from `pilot-ledger.yaml`.
//!
//! [`Recalculator`]: recalc::Recalculator
//! [`LogService`]: service::LogService

pub mod clock;
pub mod config;
pub mod import;
pub mod locks;
pub mod memory;
pub mod progression;
pub mod recalc;
pub mod service;
pub mod store;

pub use clock::{ClockFill, compute_clock_fill};
pub use memory::MemoryStore;
pub use progression::{LicenseProgress, compute_license_level, ll_clock_segments};
pub use recalc::Recalculator;
pub use service::{LogService, OpenedStanding};
pub use store::{Store, StoreError};
