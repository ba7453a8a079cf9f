//! Adventurers League log import.
//!
//! Parses the CSV export of an AL character log into an [`ImportedPilot`].
//! The export layout is:
//!
//! ```text
//! row 1   name,race,class_and_levels,...          (header)
//! row 2   Lee "Bug",...                           (character)
//! row 3+  CharacterLogEntry,title,?,date,...,gp,downtime,...,notes
//!         MAGIC ITEM,name,rarity,location,table,result,notes
//! ```
//!
//! Column positions (zero-based) for log rows: title 1, date 3, gold 7
//! (read as manna), downtime 8, notes 14. Rows of any other type are
//! ignored, as are rows with fewer than two columns.
//!
//! Parsing is pure. Persisting the result is done by
//! [`crate::service::LogService::import_pilot`], which replays the imported
//! log instead of trusting the parsed totals.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use pilot_ledger_types::LogType;
use regex::Regex;

use crate::progression::LicenseProgress;

/// License level assumed when no note in the log mentions one.
pub const DEFAULT_STARTING_LEVEL: i32 = 2;

const COL_TITLE: usize = 1;
const COL_DATE: usize = 3;
const COL_GOLD: usize = 7;
const COL_DOWNTIME: usize = 8;
const COL_NOTES: usize = 14;

const COL_ITEM_NAME: usize = 1;
const COL_ITEM_RARITY: usize = 2;
const COL_ITEM_NOTES: usize = 6;

static CALLSIGN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r#""([^"]+)""#).ok());
static CALLSIGN_STRIP: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"\s*"[^"]+"\s*"#).ok());
static LL_LEVEL_UP: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"LL(\d+)\s*->\s*LL(\d+)").ok());
static LL_PROGRESS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"LL(\d+)\s*\((\d+)/(\d+)\s*->\s*(\d+)/(\d+)\)").ok());
static LL_STATE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"LL(\d+)\s*\((\d+)/(\d+)\)").ok());

/// Errors raised while parsing an export.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// The CSV could not be read.
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    /// The file has no character row.
    #[error("CSV too short: missing pilot data")]
    MissingPilotRow,
}

/// One parsed session or trade row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedLogEntry {
    /// Session title.
    pub title: String,
    /// Session date, when it parsed.
    pub date: Option<DateTime<Utc>>,
    /// Gold column, taken as manna.
    pub manna_change: i64,
    /// Downtime column.
    pub downtime_change: i64,
    /// Free-form notes.
    pub notes: String,
    /// `Trade` for GM-credit rows (titles starting with "gming"), else `Game`.
    pub log_type: LogType,
}

impl ImportedLogEntry {
    /// Title and notes joined the way they are stored as a description.
    pub fn description(&self) -> String {
        if self.notes.is_empty() {
            self.title.clone()
        } else {
            format!("{}\n{}", self.title, self.notes).trim().to_owned()
        }
    }
}

/// One parsed magic item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedGear {
    /// Item name.
    pub name: String,
    /// Rarity as written in the export.
    pub rarity: String,
    /// Item notes.
    pub notes: String,
}

/// A parsed character log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedPilot {
    /// Pilot name with any quoted nickname removed.
    pub name: String,
    /// The quoted nickname, if any.
    pub callsign: Option<String>,
    /// Last license state mentioned in the notes.
    pub license: LicenseProgress,
    /// Sum of the gold column.
    pub manna: i64,
    /// Sum of the downtime column.
    pub downtime: i64,
    /// Log rows in file order.
    pub log_entries: Vec<ImportedLogEntry>,
    /// Magic item rows in file order.
    pub gear: Vec<ImportedGear>,
}

/// Parse an AL log export.
///
/// # Errors
///
/// Returns [`ImportError::MissingPilotRow`] if the file has fewer than two
/// rows, or [`ImportError::Csv`] if the CSV is malformed.
pub fn parse_al_csv(text: &str) -> Result<ImportedPilot, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let rows = reader.records().collect::<Result<Vec<_>, _>>()?;
    let pilot_row = rows.get(1).ok_or(ImportError::MissingPilotRow)?;
    let raw_name = pilot_row.get(0).map(str::trim).unwrap_or_default();
    let (name, callsign) = split_callsign(raw_name);

    let mut license = LicenseProgress::new(DEFAULT_STARTING_LEVEL, 0);
    let mut manna: i64 = 0;
    let mut downtime: i64 = 0;
    let mut log_entries = Vec::new();
    let mut gear = Vec::new();

    for row in rows.iter().skip(2) {
        if row.len() < 2 {
            continue;
        }
        let cell = |index: usize| row.get(index).unwrap_or_default();

        match cell(0).trim() {
            "CharacterLogEntry" => {
                let title = cell(COL_TITLE).to_owned();
                let notes = cell(COL_NOTES).to_owned();
                let entry = ImportedLogEntry {
                    log_type: if title.to_lowercase().starts_with("gming") {
                        LogType::Trade
                    } else {
                        LogType::Game
                    },
                    date: parse_date(cell(COL_DATE)),
                    manna_change: parse_whole(cell(COL_GOLD)),
                    downtime_change: parse_whole(cell(COL_DOWNTIME)),
                    title,
                    notes,
                };

                manna = manna.saturating_add(entry.manna_change);
                downtime = downtime.saturating_add(entry.downtime_change);
                if let Some(state) = parse_ll_from_notes(&entry.notes) {
                    license = state;
                }
                log_entries.push(entry);
            }
            "MAGIC ITEM" => {
                let name = cell(COL_ITEM_NAME);
                if !name.is_empty() {
                    gear.push(ImportedGear {
                        name: name.to_owned(),
                        rarity: cell(COL_ITEM_RARITY).to_owned(),
                        notes: cell(COL_ITEM_NOTES).to_owned(),
                    });
                }
            }
            _ => {}
        }
    }

    Ok(ImportedPilot {
        name,
        callsign,
        license,
        manna,
        downtime,
        log_entries,
        gear,
    })
}

/// Read a license state annotation out of session notes.
///
/// Recognized forms, most specific first:
/// - `LL1 -> LL2 (2/3 -> 3/3)`: level up, progress resets to 0
/// - `LL2 (1/3 -> 2/3)`: progress moved, the right-hand value counts
/// - `LL3 (1/3)`: a plain state
pub fn parse_ll_from_notes(notes: &str) -> Option<LicenseProgress> {
    if notes.is_empty() {
        return None;
    }

    if let Some(caps) = LL_LEVEL_UP.as_ref().and_then(|re| re.captures(notes)) {
        let level = caps.get(2)?.as_str().parse().ok()?;
        return Some(LicenseProgress::new(level, 0));
    }

    if let Some(caps) = LL_PROGRESS.as_ref().and_then(|re| re.captures(notes)) {
        let level = caps.get(1)?.as_str().parse().ok()?;
        let progress = caps.get(4)?.as_str().parse().ok()?;
        return Some(LicenseProgress::new(level, progress));
    }

    let caps = LL_STATE.as_ref()?.captures(notes)?;
    let level = caps.get(1)?.as_str().parse().ok()?;
    let progress = caps.get(2)?.as_str().parse().ok()?;
    Some(LicenseProgress::new(level, progress))
}

fn split_callsign(raw: &str) -> (String, Option<String>) {
    let name = if raw.is_empty() { "Unknown Pilot" } else { raw };
    let callsign = CALLSIGN
        .as_ref()
        .and_then(|re| re.captures(name))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned());

    match (&callsign, CALLSIGN_STRIP.as_ref()) {
        (Some(_), Some(strip)) => (strip.replace_all(name, " ").trim().to_owned(), callsign),
        _ => (name.to_owned(), callsign),
    }
}

/// Largest magnitude a numeric cell may carry; exactly representable in `f64`.
const CELL_LIMIT: f64 = 9_000_000_000_000_000.0;

/// Integer part of a numeric cell; blanks and junk read as 0.
///
/// Cells are read as floats so exponent forms such as `1e3` count in full.
/// Values past [`CELL_LIMIT`] saturate.
// The clamp bounds the value well inside `i64`, so the cast is exact.
#[allow(clippy::cast_possible_truncation)]
fn parse_whole(cell: &str) -> i64 {
    match cell.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value.trunc().clamp(-CELL_LIMIT, CELL_LIMIT) as i64,
        _ => 0,
    }
}

fn parse_date(cell: &str) -> Option<DateTime<Utc>> {
    let trimmed = cell.trim().trim_end_matches("UTC").trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
