//! Calendar buckets: pure timestamp → label classifiers.
//!
//! Hour-of-day and market-session read the Eastern wall clock; every other
//! bucket reads the UTC calendar date.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use super::{ExtractError, Granularity};
use crate::time::{days_in_month, is_weekend, utc_date, TimeContext};

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub const WEEKDAY_NAMES: [&str; 5] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

/// Eastern-time sessions as `[start, end)` minutes since local midnight.
pub const MARKET_SESSIONS: [(&str, u32, u32); 7] = [
    ("Pre-Market", 4 * 60, 9 * 60 + 30),
    ("Market-Open", 9 * 60 + 30, 10 * 60 + 30),
    ("Mid-Day", 10 * 60 + 30, 12 * 60),
    ("Lunch-Hour", 12 * 60, 13 * 60),
    ("Afternoon", 13 * 60, 15 * 60),
    ("Power-Hour", 15 * 60, 16 * 60),
    ("After-Hours", 16 * 60, 20 * 60),
];

/// Which calendar attribute a [`CalendarBucketExtractor`] reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarBucket {
    HourOfDay,
    MarketSession,
    Month,
    Quarter,
    Weekday,
    WeekPosition,
    DayOfMonth,
    WeekOfMonth,
    WeekOfYear,
}

impl CalendarBucket {
    pub fn name(&self) -> &'static str {
        match self {
            CalendarBucket::HourOfDay => "hour_of_day",
            CalendarBucket::MarketSession => "market_session",
            CalendarBucket::Month => "month",
            CalendarBucket::Quarter => "quarter",
            CalendarBucket::Weekday => "weekday",
            CalendarBucket::WeekPosition => "week_position",
            CalendarBucket::DayOfMonth => "day_of_month",
            CalendarBucket::WeekOfMonth => "week_of_month",
            CalendarBucket::WeekOfYear => "week_of_year",
        }
    }

    pub fn granularity(&self) -> Granularity {
        match self {
            CalendarBucket::HourOfDay | CalendarBucket::MarketSession => Granularity::Hourly,
            _ => Granularity::Daily,
        }
    }
}

/// Stateless calendar classifier.
#[derive(Debug, Clone, Copy)]
pub struct CalendarBucketExtractor {
    bucket: CalendarBucket,
    time: TimeContext,
}

impl CalendarBucketExtractor {
    pub fn new(bucket: CalendarBucket, time: TimeContext) -> Self {
        Self { bucket, time }
    }

    pub fn bucket(&self) -> CalendarBucket {
        self.bucket
    }

    pub fn extract(&self, ts: i64) -> Result<Option<String>, ExtractError> {
        let label = match self.bucket {
            CalendarBucket::HourOfDay => Some(hour_label(self.time.eastern_hour(ts)?)),
            CalendarBucket::MarketSession => {
                market_session(self.time.eastern_datetime(ts)?).map(str::to_string)
            }
            CalendarBucket::Month => Some(month_label(utc_date(ts)?).to_string()),
            CalendarBucket::Quarter => Some(quarter_label(utc_date(ts)?)),
            CalendarBucket::Weekday => weekday_label(utc_date(ts)?).map(str::to_string),
            CalendarBucket::WeekPosition => week_position_label(utc_date(ts)?),
            CalendarBucket::DayOfMonth => Some(format!("Day-{:02}", utc_date(ts)?.day())),
            CalendarBucket::WeekOfMonth => Some(format!("Week-{}", week_of_month(utc_date(ts)?))),
            CalendarBucket::WeekOfYear => Some(format!("W{:02}", utc_date(ts)?.iso_week().week())),
        };
        Ok(label)
    }
}

// ─── Label helpers ───────────────────────────────────────────────────

pub fn hour_label(hour: u32) -> String {
    format!("{hour:02}:00 ET")
}

/// Session containing an Eastern wall-clock time; `None` overnight and on weekends.
pub fn market_session(local: NaiveDateTime) -> Option<&'static str> {
    if is_weekend(local.date()) {
        return None;
    }
    let minutes = local.hour() * 60 + local.minute();
    MARKET_SESSIONS
        .iter()
        .find(|(_, start, end)| minutes >= *start && minutes < *end)
        .map(|(name, _, _)| *name)
}

pub fn month_label(date: NaiveDate) -> &'static str {
    MONTH_NAMES[date.month0() as usize]
}

pub fn quarter_label(date: NaiveDate) -> String {
    format!("Q{}", date.month0() / 3 + 1)
}

pub fn weekday_label(date: NaiveDate) -> Option<&'static str> {
    WEEKDAY_NAMES.get(date.weekday().num_days_from_monday() as usize).copied()
}

/// 1-based week of the month, counted in 7-day blocks from the 1st.
pub fn week_of_month(date: NaiveDate) -> u32 {
    (date.day() - 1) / 7 + 1
}

/// "First-Monday", "Last-Friday", or "Week{n}-{Day}"; weekends are unlabelled.
pub fn week_position_label(date: NaiveDate) -> Option<String> {
    let day = weekday_label(date)?;
    let n = week_of_month(date);
    if n == 1 {
        return Some(format!("First-{day}"));
    }
    if date.day() + 7 > days_in_month(date.year(), date.month()) {
        return Some(format!("Last-{day}"));
    }
    Some(format!("Week{n}-{day}"))
}

/// Natural ordering rank of a month/weekday/quarter label, if it is one.
pub fn natural_rank(label: &str) -> Option<usize> {
    if let Some(i) = MONTH_NAMES.iter().position(|m| *m == label) {
        return Some(i);
    }
    if let Some(i) = WEEKDAY_NAMES.iter().position(|d| *d == label) {
        return Some(i);
    }
    match label {
        "Q1" => Some(0),
        "Q2" => Some(1),
        "Q3" => Some(2),
        "Q4" => Some(3),
        _ => None,
    }
}
