//! Event buckets: day / week / baseline labels driven by the calendar engine.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::ExtractError;
use crate::calendar::CalendarRuleEngine;
use crate::time::utc_date;

/// Which event family an [`EventBucketExtractor`] reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventBucket {
    Fomc,
    OptionsExpiry,
    EarningsSeason,
    TripleWitching,
    GdpRelease,
    Election,
    IndexRebalancing,
    CpiDay,
    NfpDay,
}

impl EventBucket {
    pub const ALL: [EventBucket; 9] = [
        EventBucket::Fomc,
        EventBucket::OptionsExpiry,
        EventBucket::EarningsSeason,
        EventBucket::TripleWitching,
        EventBucket::GdpRelease,
        EventBucket::Election,
        EventBucket::IndexRebalancing,
        EventBucket::CpiDay,
        EventBucket::NfpDay,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EventBucket::Fomc => "fomc",
            EventBucket::OptionsExpiry => "options_expiry",
            EventBucket::EarningsSeason => "earnings_season",
            EventBucket::TripleWitching => "triple_witching",
            EventBucket::GdpRelease => "gdp_release",
            EventBucket::Election => "election",
            EventBucket::IndexRebalancing => "index_rebalancing",
            EventBucket::CpiDay => "cpi_day",
            EventBucket::NfpDay => "nfp_day",
        }
    }

    /// `(day, week, baseline)` labels. Single-day families have no week label.
    pub fn labels(&self) -> (&'static str, Option<&'static str>, &'static str) {
        match self {
            EventBucket::Fomc => ("FOMC-Day", Some("FOMC-Week"), "Non-FOMC-Week"),
            EventBucket::OptionsExpiry => ("OpEx-Day", Some("OpEx-Week"), "Non-OpEx"),
            EventBucket::EarningsSeason => ("Earnings-Season", None, "Off-Season"),
            EventBucket::TripleWitching => (
                "Triple-Witching-Day",
                Some("Triple-Witching-Week"),
                "Non-Triple-Witching",
            ),
            EventBucket::GdpRelease => ("GDP-Release-Day", Some("GDP-Release-Week"), "Non-GDP-Week"),
            EventBucket::Election => ("Election-Day", Some("Election-Window"), "Non-Election"),
            EventBucket::IndexRebalancing => (
                "Rebalancing-Day",
                Some("Rebalancing-Window"),
                "Non-Rebalancing",
            ),
            EventBucket::CpiDay => ("CPI-Day", None, "Non-CPI-Day"),
            EventBucket::NfpDay => ("NFP-Day", None, "Non-NFP-Day"),
        }
    }

    /// True when `label` is this family's "no event" bucket.
    pub fn is_baseline(&self, label: &str) -> bool {
        self.labels().2 == label
    }
}

/// Labels every timestamp with the event state of its UTC date.
#[derive(Debug, Clone)]
pub struct EventBucketExtractor {
    bucket: EventBucket,
    calendar: Arc<CalendarRuleEngine>,
}

impl EventBucketExtractor {
    pub fn new(bucket: EventBucket, calendar: Arc<CalendarRuleEngine>) -> Self {
        Self { bucket, calendar }
    }

    pub fn bucket(&self) -> EventBucket {
        self.bucket
    }

    pub fn extract(&self, ts: i64) -> Result<Option<String>, ExtractError> {
        let date = utc_date(ts)?;
        let cal = &self.calendar;
        let (on_day, in_week) = match self.bucket {
            EventBucket::Fomc => (cal.is_fomc_day(date), cal.is_fomc_week(date)),
            EventBucket::OptionsExpiry => (
                cal.is_options_expiry_day(date)?,
                cal.is_options_expiry_week(date)?,
            ),
            EventBucket::EarningsSeason => (cal.is_earnings_season(date), false),
            EventBucket::TripleWitching => (
                cal.is_triple_witching_day(date)?,
                cal.is_triple_witching_week(date)?,
            ),
            EventBucket::GdpRelease => (cal.is_gdp_release_day(date)?, cal.is_gdp_release_week(date)?),
            EventBucket::Election => (cal.is_election_day(date), cal.is_election_event_window(date)),
            EventBucket::IndexRebalancing => (
                cal.is_index_rebalancing_day(date)?,
                cal.is_index_rebalancing_window(date)?,
            ),
            EventBucket::CpiDay => (cal.is_cpi_release_day(date)?, false),
            EventBucket::NfpDay => (cal.is_nfp_release_day(date)?, false),
        };

        let (day, week, baseline) = self.bucket.labels();
        let label = match (on_day, in_week, week) {
            (true, _, _) => day,
            (false, true, Some(week)) => week,
            _ => baseline,
        };
        Ok(Some(label.to_string()))
    }
}
