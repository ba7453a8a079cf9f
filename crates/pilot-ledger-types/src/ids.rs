//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Every row in the ledger has a strongly-typed ID so a clock id can never be
//! passed where a pilot id is expected. `PostgreSQL` generates ids on insert;
//! the `new()` constructors exist for the in-memory store, tests and imports.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a user account (resolved from a bearer credential).
    UserId
}

define_id! {
    /// Unique identifier for a pilot.
    PilotId
}

define_id! {
    /// Unique identifier for a progress clock.
    ClockId
}

define_id! {
    /// Unique identifier for a log entry.
    LogEntryId
}

define_id! {
    /// Unique identifier for a piece of exotic gear.
    GearId
}

define_id! {
    /// Unique identifier for a corporation (faction).
    CorporationId
}

define_id! {
    /// Unique identifier for a pilot's standing with one corporation.
    ReputationId
}

define_id! {
    /// Unique identifier for a reputation change recorded by a log entry.
    ReputationChangeId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_bare_uuid() {
        let id = PilotId::new();
        let json = serde_json::to_string(&id).ok();
        assert_eq!(json, Some(format!("\"{}\"", id.into_inner())));
    }

    #[test]
    fn id_display_matches_uuid() {
        let id = ClockId::new();
        assert_eq!(id.to_string(), id.into_inner().to_string());
    }

    #[test]
    fn id_from_uuid_roundtrip() {
        let raw = Uuid::now_v7();
        let id = LogEntryId::from(raw);
        assert_eq!(Uuid::from(id), raw);
    }
}
