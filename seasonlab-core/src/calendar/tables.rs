//! Hardcoded decision-date tables and construction-time overrides.
//!
//! Tables hold raw `YYYY-MM-DD` strings. Nothing here is trusted: the engine
//! validates every entry when it is built, so a typo in a table surfaces at
//! construction naming the exact table and index.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::CalendarError;
use crate::domain::{CentralBank, EventType, Impact};

/// FOMC policy decision dates (second day of each two-day meeting).
pub const FOMC_DECISIONS: &[&str] = &[
    "2021-01-27", "2021-03-17", "2021-04-28", "2021-06-16",
    "2021-07-28", "2021-09-22", "2021-11-03", "2021-12-15",
    "2022-01-26", "2022-03-16", "2022-05-04", "2022-06-15",
    "2022-07-27", "2022-09-21", "2022-11-02", "2022-12-14",
    "2023-02-01", "2023-03-22", "2023-05-03", "2023-06-14",
    "2023-07-26", "2023-09-20", "2023-11-01", "2023-12-13",
    "2024-01-31", "2024-03-20", "2024-05-01", "2024-06-12",
    "2024-07-31", "2024-09-18", "2024-11-07", "2024-12-18",
    "2025-01-29", "2025-03-19", "2025-05-07", "2025-06-18",
    "2025-07-30", "2025-09-17", "2025-10-29", "2025-12-10",
    "2026-01-28", "2026-03-18", "2026-04-29", "2026-06-17",
    "2026-07-29", "2026-09-16", "2026-10-28", "2026-12-09",
];

/// ECB monetary policy decision dates.
pub const ECB_DECISIONS: &[&str] = &[
    "2023-02-02", "2023-03-16", "2023-05-04", "2023-06-15",
    "2023-07-27", "2023-09-14", "2023-10-26", "2023-12-14",
    "2024-01-25", "2024-03-07", "2024-04-11", "2024-06-06",
    "2024-07-18", "2024-09-12", "2024-10-17", "2024-12-12",
    "2025-01-30", "2025-03-06", "2025-04-17", "2025-06-05",
    "2025-07-24", "2025-09-11", "2025-10-30", "2025-12-18",
    "2026-02-05", "2026-03-19", "2026-04-30", "2026-06-11",
    "2026-07-23", "2026-09-10", "2026-10-29", "2026-12-17",
];

/// Bank of England MPC decision dates.
pub const BOE_DECISIONS: &[&str] = &[
    "2023-02-02", "2023-03-23", "2023-05-11", "2023-06-22",
    "2023-08-03", "2023-09-21", "2023-11-02", "2023-12-14",
    "2024-02-01", "2024-03-21", "2024-05-09", "2024-06-20",
    "2024-08-01", "2024-09-19", "2024-11-07", "2024-12-19",
    "2025-02-06", "2025-03-20", "2025-05-08", "2025-06-19",
    "2025-08-07", "2025-09-18", "2025-11-06", "2025-12-18",
    "2026-02-05", "2026-03-19", "2026-04-30", "2026-06-18",
    "2026-07-30", "2026-09-17", "2026-11-05", "2026-12-17",
];

/// Bank of Japan policy decision dates (Tokyo calendar).
pub const BOJ_DECISIONS: &[&str] = &[
    "2023-01-18", "2023-03-10", "2023-04-28", "2023-06-16",
    "2023-07-28", "2023-09-22", "2023-10-31", "2023-12-19",
    "2024-01-23", "2024-03-19", "2024-04-26", "2024-06-14",
    "2024-07-31", "2024-09-20", "2024-10-31", "2024-12-19",
    "2025-01-24", "2025-03-19", "2025-05-01", "2025-06-17",
    "2025-07-31", "2025-09-19", "2025-10-30", "2025-12-19",
    "2026-01-23", "2026-03-19", "2026-04-28", "2026-06-16",
    "2026-07-31", "2026-09-18", "2026-10-30", "2026-12-18",
];

/// US general election years covered by the election rule.
pub const ELECTION_YEARS: &[i32] = &[2016, 2018, 2020, 2022, 2024, 2026, 2028, 2030];

/// Raw rule tables fed to the engine.
///
/// `builtin()` is what production uses; tests build alternate tables to
/// exercise the engine without touching shared state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarTables {
    pub meetings: BTreeMap<CentralBank, Vec<String>>,
    pub election_years: Vec<i32>,
}

impl CalendarTables {
    pub fn builtin() -> Self {
        let to_owned = |dates: &[&str]| dates.iter().map(|d| d.to_string()).collect::<Vec<_>>();
        let mut meetings = BTreeMap::new();
        meetings.insert(CentralBank::Fed, to_owned(FOMC_DECISIONS));
        meetings.insert(CentralBank::Ecb, to_owned(ECB_DECISIONS));
        meetings.insert(CentralBank::Boe, to_owned(BOE_DECISIONS));
        meetings.insert(CentralBank::Boj, to_owned(BOJ_DECISIONS));
        Self {
            meetings,
            election_years: ELECTION_YEARS.to_vec(),
        }
    }
}

impl Default for CalendarTables {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Replacement meeting-date lists, one optional list per central bank.
///
/// A `Some` list replaces the built-in table for that bank entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeetingDateOverrides {
    #[serde(default)]
    pub fed: Option<Vec<String>>,
    #[serde(default)]
    pub ecb: Option<Vec<String>>,
    #[serde(default)]
    pub boe: Option<Vec<String>>,
    #[serde(default)]
    pub boj: Option<Vec<String>>,
}

impl MeetingDateOverrides {
    pub fn get(&self, bank: CentralBank) -> Option<&Vec<String>> {
        match bank {
            CentralBank::Fed => self.fed.as_ref(),
            CentralBank::Ecb => self.ecb.as_ref(),
            CentralBank::Boe => self.boe.as_ref(),
            CentralBank::Boj => self.boj.as_ref(),
        }
    }
}

/// A user-supplied event, as read from configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomEventSpec {
    pub date: String,
    pub name: String,
    #[serde(rename = "type", default = "default_custom_type")]
    pub event_type: EventType,
    pub impact: Impact,
    #[serde(default)]
    pub description: String,
}

fn default_custom_type() -> EventType {
    EventType::Custom
}

/// Construction-time overrides for the calendar rule engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalendarOverrides {
    #[serde(default)]
    pub meeting_dates: MeetingDateOverrides,
    #[serde(default)]
    pub custom_events: Vec<CustomEventSpec>,
}

/// Parse a strict `YYYY-MM-DD` date.
///
/// The value must re-format to exactly the same string, which rejects
/// unpadded components ("2024-3-5"), trailing text, and impossible days.
pub fn parse_calendar_date(table: &str, index: usize, value: &str) -> Result<NaiveDate, CalendarError> {
    let invalid = |reason: &str| CalendarError::InvalidDate {
        table: table.to_string(),
        index,
        value: value.to_string(),
        reason: reason.to_string(),
    };
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| invalid(&e.to_string()))?;
    if date.format("%Y-%m-%d").to_string() != value {
        return Err(invalid("not in canonical YYYY-MM-DD form"));
    }
    Ok(date)
}
