//! Event windows: "T-N .. T+N" labels around recurring events.
//!
//! Qualifying event dates are materialized per `(event, year, symbol)` by
//! scanning every day of `year-1 ..= year+1` against the event predicate.
//! The scan is ~1,096 predicate calls, so results are cached in a shared
//! [`WindowScanCache`]. Readers never block each other; a miss takes the write
//! lock once and publishes an immutable `Arc<Vec<_>>`.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::{ExtractError, Granularity};
use crate::calendar::{CalendarError, CalendarRuleEngine};
use crate::domain::{CentralBank, Timeframe};
use crate::time::{is_weekend, utc_date};

/// Upper bound on days walked while measuring a trading-day offset.
pub const MAX_SCAN_DAYS: i64 = 1_096;

/// Event families that can anchor a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowEvent {
    Fomc,
    Ecb,
    Boe,
    Boj,
    Cpi,
    Nfp,
    Ism,
    OptionsExpiry,
    TripleWitching,
    GdpRelease,
    Election,
    IndexRebalancing,
    EarningsKickoff,
}

impl WindowEvent {
    pub fn default_prefix(&self) -> &'static str {
        match self {
            WindowEvent::Fomc => "FOMC",
            WindowEvent::Ecb => "ECB",
            WindowEvent::Boe => "BoE",
            WindowEvent::Boj => "BoJ",
            WindowEvent::Cpi => "CPI",
            WindowEvent::Nfp => "NFP",
            WindowEvent::Ism => "ISM",
            WindowEvent::OptionsExpiry => "OpEx",
            WindowEvent::TripleWitching => "TripleWitching",
            WindowEvent::GdpRelease => "GDP",
            WindowEvent::Election => "Election",
            WindowEvent::IndexRebalancing => "Rebalance",
            WindowEvent::EarningsKickoff => "Earnings",
        }
    }

    /// Whether the event occurs on `date`.
    pub fn occurs_on(&self, calendar: &CalendarRuleEngine, date: NaiveDate) -> Result<bool, CalendarError> {
        Ok(match self {
            WindowEvent::Fomc => calendar.is_central_bank_decision_day(CentralBank::Fed, date),
            WindowEvent::Ecb => calendar.is_central_bank_decision_day(CentralBank::Ecb, date),
            WindowEvent::Boe => calendar.is_central_bank_decision_day(CentralBank::Boe, date),
            WindowEvent::Boj => calendar.is_central_bank_decision_day(CentralBank::Boj, date),
            WindowEvent::Cpi => calendar.is_cpi_release_day(date)?,
            WindowEvent::Nfp => calendar.is_nfp_release_day(date)?,
            WindowEvent::Ism => calendar.is_ism_release_day(date)?,
            WindowEvent::OptionsExpiry => calendar.is_options_expiry_day(date)?,
            WindowEvent::TripleWitching => calendar.is_triple_witching_day(date)?,
            WindowEvent::GdpRelease => calendar.is_gdp_release_day(date)?,
            WindowEvent::Election => calendar.is_election_day(date),
            WindowEvent::IndexRebalancing => calendar.is_index_rebalancing_day(date)?,
            WindowEvent::EarningsKickoff => calendar.is_earnings_season_kickoff(date),
        })
    }
}

fn default_half_width() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

/// Window configuration. Every field has a default, so a bare
/// `{ event = "cpi" }` table is a complete config.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventWindowConfig {
    pub event: WindowEvent,
    #[serde(default = "default_half_width")]
    pub half_width: u32,
    #[serde(default)]
    pub timeframe: Timeframe,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default = "default_true")]
    pub skip_weekends: bool,
    #[serde(default = "default_true")]
    pub skip_holidays: bool,
    #[serde(default)]
    pub symbol: Option<String>,
}

impl EventWindowConfig {
    pub fn new(event: WindowEvent) -> Self {
        Self {
            event,
            half_width: default_half_width(),
            timeframe: Timeframe::Daily,
            prefix: None,
            skip_weekends: true,
            skip_holidays: true,
            symbol: None,
        }
    }

    pub fn fomc() -> Self {
        Self::new(WindowEvent::Fomc)
    }

    pub fn cpi() -> Self {
        Self::new(WindowEvent::Cpi)
    }

    pub fn nfp() -> Self {
        Self::new(WindowEvent::Nfp)
    }

    pub fn options_expiry() -> Self {
        Self::new(WindowEvent::OptionsExpiry).with_half_width(3)
    }

    pub fn with_half_width(mut self, half_width: u32) -> Self {
        self.half_width = half_width;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Plain calendar-day counting.
    pub fn calendar_days(mut self) -> Self {
        self.skip_weekends = false;
        self.skip_holidays = false;
        self
    }

    pub fn prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or_else(|| self.event.default_prefix())
    }

    /// Extractor name used in reports, e.g. `"fomc_window"`.
    pub fn name(&self) -> String {
        format!("{}_window", self.prefix().to_lowercase())
    }
}

// ─── Scan cache ──────────────────────────────────────────────────────

type ScanKey = (WindowEvent, i32, Option<String>);

/// Shared cache of materialized event dates.
#[derive(Debug, Default)]
pub struct WindowScanCache {
    entries: RwLock<HashMap<ScanKey, Arc<Vec<NaiveDate>>>>,
}

impl WindowScanCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, key: &ScanKey) -> Option<Arc<Vec<NaiveDate>>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn publish(&self, key: ScanKey, dates: Vec<NaiveDate>) -> Arc<Vec<NaiveDate>> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        // A racing writer may have published first; keep its copy.
        entries.entry(key).or_insert_with(|| Arc::new(dates)).clone()
    }
}

// ─── Extractor ───────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct EventWindowExtractor {
    config: EventWindowConfig,
    calendar: Arc<CalendarRuleEngine>,
    cache: Arc<WindowScanCache>,
}

impl EventWindowExtractor {
    pub fn new(
        config: EventWindowConfig,
        calendar: Arc<CalendarRuleEngine>,
        cache: Arc<WindowScanCache>,
    ) -> Self {
        Self {
            config,
            calendar,
            cache,
        }
    }

    pub fn config(&self) -> &EventWindowConfig {
        &self.config
    }

    pub fn granularity(&self) -> Granularity {
        match self.config.timeframe {
            Timeframe::Hourly => Granularity::Hourly,
            Timeframe::Daily => Granularity::Daily,
        }
    }

    /// Populate the cache for `years` before concurrent readers start.
    pub fn prewarm<I>(&self, years: I) -> Result<(), ExtractError>
    where
        I: IntoIterator<Item = i32>,
    {
        for year in years {
            self.candidates(year)?;
        }
        Ok(())
    }

    /// Event dates in `year-1 ..= year+1`, ascending.
    pub fn candidates(&self, year: i32) -> Result<Arc<Vec<NaiveDate>>, ExtractError> {
        let key = (self.config.event, year, self.config.symbol.clone());
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }

        let (Some(from), Some(to)) = (
            NaiveDate::from_ymd_opt(year - 1, 1, 1),
            NaiveDate::from_ymd_opt(year + 1, 12, 31),
        ) else {
            return Ok(Arc::new(Vec::new()));
        };

        let mut dates = Vec::new();
        for day in from.iter_days().take_while(|d| *d <= to) {
            if self.config.event.occurs_on(&self.calendar, day)? {
                dates.push(day);
            }
        }
        tracing::debug!(
            event = ?self.config.event,
            year,
            found = dates.len(),
            "event window scan cache miss"
        );
        Ok(self.cache.publish(key, dates))
    }

    fn counts(&self, date: NaiveDate) -> bool {
        !(self.config.skip_weekends && is_weekend(date))
            && !(self.config.skip_holidays && self.calendar.is_market_holiday(date))
    }

    /// Signed offset of `query` from `event`, if within the half-width.
    fn offset(&self, event: NaiveDate, query: NaiveDate) -> Option<i64> {
        let n = self.config.half_width as i64;
        let span = (query - event).num_days();
        if !self.config.skip_weekends && !self.config.skip_holidays {
            return (span.abs() <= n).then_some(span);
        }
        if span.abs() > MAX_SCAN_DAYS {
            return None;
        }

        let step: i64 = span.signum();
        let mut day = event;
        let mut count = 0i64;
        while day != query {
            day = if step > 0 { day.succ_opt()? } else { day.pred_opt()? };
            if self.counts(day) {
                count += 1;
                if count > n {
                    return None;
                }
            }
        }
        Some(step * count)
    }

    pub fn extract(&self, ts: i64) -> Result<Option<String>, ExtractError> {
        let query = utc_date(ts)?;
        let candidates = self.candidates(query.year())?;
        for &event in candidates.iter() {
            if let Some(offset) = self.offset(event, query) {
                return Ok(Some(window_label(self.config.prefix(), offset)));
            }
        }
        Ok(None)
    }
}

/// `"{prefix}-T+{n}"` / `"{prefix}-T-{n}"`, with `T+0` on the event itself.
pub fn window_label(prefix: &str, offset: i64) -> String {
    if offset < 0 {
        format!("{prefix}-T-{}", -offset)
    } else {
        format!("{prefix}-T+{offset}")
    }
}
