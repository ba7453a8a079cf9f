//! Enumeration types for the pilot ledger.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The kind of session a log entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum LogType {
    /// A played game session.
    Game,
    /// Downtime trading, GM credit, or any other non-session activity.
    Trade,
}

impl LogType {
    /// The lowercase name stored in the database and used on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Game => "game",
            Self::Trade => "trade",
        }
    }

    /// Parse the lowercase wire/database name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "game" => Some(Self::Game),
            "trade" => Some(Self::Trade),
            _ => None,
        }
    }
}

impl core::fmt::Display for LogType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sign filter for resource changes in the GM log view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ResourceDirection {
    /// Entries where manna or downtime went up.
    Increase,
    /// Entries where manna or downtime went down.
    Decrease,
}
