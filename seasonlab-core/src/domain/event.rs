//! Calendar events: the output unit of the calendar rule engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a calendar event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    Fomc,
    Ecb,
    Boe,
    Boj,
    Cpi,
    Nfp,
    OptionsExpiry,
    TripleWitching,
    EarningsSeason,
    GdpRelease,
    Election,
    DividendExDate,
    IndexRebalancing,
    Economic,
    Political,
    Custom,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Fomc => "fomc",
            EventType::Ecb => "ecb",
            EventType::Boe => "boe",
            EventType::Boj => "boj",
            EventType::Cpi => "cpi",
            EventType::Nfp => "nfp",
            EventType::OptionsExpiry => "options-expiry",
            EventType::TripleWitching => "triple-witching",
            EventType::EarningsSeason => "earnings-season",
            EventType::GdpRelease => "gdp-release",
            EventType::Election => "election",
            EventType::DividendExDate => "dividend-ex-date",
            EventType::IndexRebalancing => "index-rebalancing",
            EventType::Economic => "economic",
            EventType::Political => "political",
            EventType::Custom => "custom",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expected market impact of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    Medium,
    High,
}

impl Impact {
    /// High and medium impact events participate in combination detection.
    pub fn is_material(&self) -> bool {
        matches!(self, Impact::High | Impact::Medium)
    }
}

/// Central banks with hardcoded decision-date tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CentralBank {
    Fed,
    Ecb,
    Boe,
    Boj,
}

impl CentralBank {
    pub const ALL: [CentralBank; 4] = [
        CentralBank::Fed,
        CentralBank::Ecb,
        CentralBank::Boe,
        CentralBank::Boj,
    ];

    /// Short label used in extractor output ("FOMC", "ECB", ...).
    pub fn label(&self) -> &'static str {
        match self {
            CentralBank::Fed => "FOMC",
            CentralBank::Ecb => "ECB",
            CentralBank::Boe => "BoE",
            CentralBank::Boj => "BoJ",
        }
    }

    pub fn event_type(&self) -> EventType {
        match self {
            CentralBank::Fed => EventType::Fomc,
            CentralBank::Ecb => EventType::Ecb,
            CentralBank::Boe => EventType::Boe,
            CentralBank::Boj => EventType::Boj,
        }
    }

    pub fn impact(&self) -> Impact {
        match self {
            CentralBank::Fed | CentralBank::Ecb => Impact::High,
            CentralBank::Boe | CentralBank::Boj => Impact::Medium,
        }
    }
}

/// A single dated calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub date: NaiveDate,
    pub name: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub impact: Impact,
    #[serde(default)]
    pub description: String,
}

impl CalendarEvent {
    pub fn new(
        date: NaiveDate,
        name: impl Into<String>,
        event_type: EventType,
        impact: Impact,
        description: impl Into<String>,
    ) -> Self {
        Self {
            date,
            name: name.into(),
            event_type,
            impact,
            description: description.into(),
        }
    }

    /// Identity used for de-duplication across independently derived lists.
    pub fn dedup_key(&self) -> (String, NaiveDate) {
        (self.name.clone(), self.date)
    }
}
