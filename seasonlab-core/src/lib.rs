//! SeasonLab Core: calendar rules, time context, and period extractors.
//!
//! This crate answers two questions for any timestamp:
//! - which calendar and macro events surround it ([`calendar`])
//! - which seasonal or event bucket it belongs to ([`extract`])
//!
//! Time interpretation (UTC dates, DST-aware US-Eastern wall clock, week
//! bounds) lives in [`time`]. Aggregating returns into statistics is the
//! runner's job.

pub mod calendar;
pub mod domain;
pub mod extract;
pub mod time;

pub use calendar::{CalendarError, CalendarOverrides, CalendarRuleEngine};
pub use domain::{CalendarEvent, Candle, CentralBank, EventType, Impact, Timeframe};
pub use extract::{create_extractor, ExtractError, ExtractorContext, PeriodExtractor, PeriodType};
pub use time::{TimeContext, TimeError};
