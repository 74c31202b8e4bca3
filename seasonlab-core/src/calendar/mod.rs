//! Calendar rule engine: which macro and market events occur on a date.
//!
//! Two kinds of knowledge live here:
//! - hardcoded decision-date tables for four central banks ([`tables`])
//! - computed rule families: monthly releases, option expiries, GDP,
//!   index rebalancing, elections, holidays, earnings seasons ([`rules`])
//!
//! [`CalendarRuleEngine`] validates all of it at construction and answers
//! date queries afterwards without mutation.

pub mod engine;
pub mod rules;
pub mod tables;

use chrono::NaiveDate;

use crate::time::TimeError;

pub use engine::CalendarRuleEngine;
pub use rules::{GdpEstimate, Holiday, WalkDirection};
pub use tables::{CalendarOverrides, CalendarTables, CustomEventSpec, MeetingDateOverrides};

/// Errors raised by calendar construction and rule evaluation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalendarError {
    #[error("invalid date in {table}[{index}]: {value:?} ({reason})")]
    InvalidDate {
        table: String,
        index: usize,
        value: String,
        reason: String,
    },
    #[error("invalid custom event #{index}: {reason}")]
    InvalidCustomEvent { index: usize, reason: String },
    #[error("business-day walk from {start} exceeded {limit} steps")]
    BusinessDayWalkExceeded { start: NaiveDate, limit: u32 },
    #[error("no such month: {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },
    #[error("date arithmetic overflowed at {0}")]
    DateOverflow(NaiveDate),
    #[error(transparent)]
    Time(#[from] TimeError),
}
