//! Shared type definitions for the pilot ledger.
//!
//! This crate is the single source of truth for the rows and payloads used
//! across the workspace. Types flow to the web client as `TypeScript` via
//! `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for every entity identifier
//! - [`enums`] -- Log type and filter enums
//! - [`structs`] -- Persisted entities (pilots, clocks, log entries, gear, reputation)
//! - [`requests`] -- Mutation payloads with boundary validation

pub mod enums;
pub mod ids;
pub mod requests;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{LogType, ResourceDirection};
pub use ids::{
    ClockId, CorporationId, GearId, LogEntryId, PilotId, ReputationChangeId, ReputationId, UserId,
};
pub use requests::{
    ClockProgressInput, ClockTick, ClockUpdate, CorporationUpdate, GearAcquiredInput,
    GearLostInput, GearUpdate, LogEntryDetails, LogEntryUpdate, LogFilter, NewClock,
    NewCorporation, NewGear, NewLogEntry, NewPilot, NewReputation, PilotUpdate,
    ReputationChangeInput, ReputationUpdate,
};
pub use structs::{
    Clock, ClockProgress, Corporation, Gear, LogEntry, Pilot, PilotResources, Reputation,
    ReputationChange, User,
};
