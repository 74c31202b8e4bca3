//! The calendar rule engine.

use chrono::{Datelike, Duration, NaiveDate};
use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::rules::{self, GdpEstimate};
use super::tables::{parse_calendar_date, CalendarOverrides, CalendarTables};
use super::CalendarError;
use crate::domain::{CalendarEvent, CentralBank, EventType, Impact};
use crate::time::week_bounds;

/// Single source of truth for "what happens on date D".
///
/// Built once from validated tables plus overrides, then read-only. Share it
/// behind an `Arc` across concurrent analyses.
#[derive(Debug, Clone)]
pub struct CalendarRuleEngine {
    meetings: BTreeMap<CentralBank, BTreeSet<NaiveDate>>,
    election_years: BTreeSet<i32>,
    custom_events: Vec<CalendarEvent>,
}

impl CalendarRuleEngine {
    /// Engine over the built-in tables with the given overrides.
    pub fn new(overrides: &CalendarOverrides) -> Result<Self, CalendarError> {
        Self::with_tables(&CalendarTables::builtin(), overrides)
    }

    /// Engine over the built-in tables, no overrides.
    pub fn builtin() -> Result<Self, CalendarError> {
        Self::new(&CalendarOverrides::default())
    }

    /// Engine over arbitrary tables. Every date is validated here; the first
    /// bad entry aborts construction.
    pub fn with_tables(
        tables: &CalendarTables,
        overrides: &CalendarOverrides,
    ) -> Result<Self, CalendarError> {
        let mut meetings = BTreeMap::new();
        for bank in CentralBank::ALL {
            let (source, raw) = match overrides.meeting_dates.get(bank) {
                Some(list) => ("override", list.as_slice()),
                None => (
                    "builtin",
                    tables.meetings.get(&bank).map(|v| v.as_slice()).unwrap_or(&[]),
                ),
            };
            let table = format!("{source}.{}", bank.label());
            let mut dates = BTreeSet::new();
            for (index, value) in raw.iter().enumerate() {
                dates.insert(parse_calendar_date(&table, index, value)?);
            }
            meetings.insert(bank, dates);
        }

        let mut custom_events = Vec::with_capacity(overrides.custom_events.len());
        for (index, spec) in overrides.custom_events.iter().enumerate() {
            let date = parse_calendar_date("custom_events", index, &spec.date)?;
            if spec.name.trim().is_empty() {
                return Err(CalendarError::InvalidCustomEvent {
                    index,
                    reason: "name is empty".into(),
                });
            }
            custom_events.push(CalendarEvent::new(
                date,
                spec.name.clone(),
                spec.event_type,
                spec.impact,
                spec.description.clone(),
            ));
        }
        custom_events.sort_by_key(|e| e.date);

        let engine = Self {
            meetings,
            election_years: tables.election_years.iter().copied().collect(),
            custom_events,
        };
        tracing::debug!(
            fomc = engine.meeting_count(CentralBank::Fed),
            ecb = engine.meeting_count(CentralBank::Ecb),
            boe = engine.meeting_count(CentralBank::Boe),
            boj = engine.meeting_count(CentralBank::Boj),
            custom = engine.custom_events.len(),
            "calendar rule engine constructed"
        );
        Ok(engine)
    }

    fn meeting_count(&self, bank: CentralBank) -> usize {
        self.meetings.get(&bank).map_or(0, |s| s.len())
    }

    // ─── Central banks ───────────────────────────────────────────────

    /// Validated decision dates for a bank, ascending.
    pub fn meeting_dates(&self, bank: CentralBank) -> impl Iterator<Item = NaiveDate> + '_ {
        self.meetings.get(&bank).into_iter().flat_map(|s| s.iter().copied())
    }

    pub fn is_central_bank_decision_day(&self, bank: CentralBank, date: NaiveDate) -> bool {
        self.meetings.get(&bank).is_some_and(|s| s.contains(&date))
    }

    /// False for a week cut off by the end of the representable date range.
    fn has_meeting_in_week(&self, bank: CentralBank, date: NaiveDate) -> bool {
        let Ok((monday, sunday)) = week_bounds(date) else {
            return false;
        };
        self.meetings
            .get(&bank)
            .is_some_and(|s| s.range(monday..=sunday).next().is_some())
    }

    pub fn is_fomc_day(&self, date: NaiveDate) -> bool {
        self.is_central_bank_decision_day(CentralBank::Fed, date)
    }

    pub fn is_fomc_week(&self, date: NaiveDate) -> bool {
        self.has_meeting_in_week(CentralBank::Fed, date)
    }

    /// Quarterly FOMC meetings publish the Summary of Economic Projections.
    pub fn has_dot_plot(meeting: NaiveDate) -> bool {
        matches!(meeting.month(), 3 | 6 | 9 | 12)
    }

    // ─── Day predicates ──────────────────────────────────────────────

    pub fn is_cpi_release_day(&self, date: NaiveDate) -> Result<bool, CalendarError> {
        rules::monthly_rule_hits(date, rules::cpi_release_date)
    }

    pub fn is_nfp_release_day(&self, date: NaiveDate) -> Result<bool, CalendarError> {
        rules::monthly_rule_hits(date, rules::nfp_release_date)
    }

    pub fn is_ism_release_day(&self, date: NaiveDate) -> Result<bool, CalendarError> {
        rules::monthly_rule_hits(date, rules::first_business_day)
    }

    /// Monthly expiry, including the quarterly (triple-witching) ones.
    pub fn is_options_expiry_day(&self, date: NaiveDate) -> Result<bool, CalendarError> {
        rules::monthly_rule_hits(date, rules::options_expiry_date)
    }

    pub fn is_triple_witching_day(&self, date: NaiveDate) -> Result<bool, CalendarError> {
        Ok(rules::triple_witching_date(date.year(), date.month())? == Some(date))
    }

    pub fn is_gdp_release_day(&self, date: NaiveDate) -> Result<bool, CalendarError> {
        Ok(self.gdp_estimate_on(date)?.is_some())
    }

    fn gdp_estimate_on(&self, date: NaiveDate) -> Result<Option<GdpEstimate>, CalendarError> {
        Ok(rules::gdp_release_dates(date.year())?
            .into_iter()
            .find(|(d, _)| *d == date)
            .map(|(_, e)| e))
    }

    pub fn is_election_day(&self, date: NaiveDate) -> bool {
        self.election_years.contains(&date.year()) && rules::election_day(date.year()) == Some(date)
    }

    pub fn is_russell_reconstitution_day(&self, date: NaiveDate) -> bool {
        rules::russell_reconstitution(date.year()) == Some(date)
    }

    /// Russell reconstitution or an S&P quarterly rebalance (triple witching).
    pub fn is_index_rebalancing_day(&self, date: NaiveDate) -> Result<bool, CalendarError> {
        Ok(self.is_russell_reconstitution_day(date) || self.is_triple_witching_day(date)?)
    }

    pub fn is_earnings_season(&self, date: NaiveDate) -> bool {
        rules::is_earnings_season(date)
    }

    pub fn is_earnings_season_kickoff(&self, date: NaiveDate) -> bool {
        rules::earnings_season_kickoffs(date.year()).contains(&date)
    }

    pub fn is_market_holiday(&self, date: NaiveDate) -> bool {
        rules::is_market_holiday(date)
    }

    pub fn is_trading_day(&self, date: NaiveDate) -> bool {
        rules::is_trading_day(date)
    }

    // ─── Week predicates ─────────────────────────────────────────────

    /// True if any day of the Monday..Sunday week containing `date` satisfies `pred`.
    fn any_in_week<F>(&self, date: NaiveDate, pred: F) -> Result<bool, CalendarError>
    where
        F: Fn(NaiveDate) -> Result<bool, CalendarError>,
    {
        let (monday, sunday) = week_bounds(date)?;
        for day in monday.iter_days().take_while(|d| *d <= sunday) {
            if pred(day)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn is_options_expiry_week(&self, date: NaiveDate) -> Result<bool, CalendarError> {
        self.any_in_week(date, |d| self.is_options_expiry_day(d))
    }

    pub fn is_triple_witching_week(&self, date: NaiveDate) -> Result<bool, CalendarError> {
        self.any_in_week(date, |d| self.is_triple_witching_day(d))
    }

    pub fn is_gdp_release_week(&self, date: NaiveDate) -> Result<bool, CalendarError> {
        self.any_in_week(date, |d| self.is_gdp_release_day(d))
    }

    pub fn is_index_rebalancing_window(&self, date: NaiveDate) -> Result<bool, CalendarError> {
        self.any_in_week(date, |d| self.is_index_rebalancing_day(d))
    }

    /// Election week or the week after it.
    pub fn is_election_event_window(&self, date: NaiveDate) -> bool {
        let Ok((monday, sunday)) = week_bounds(date) else {
            return false;
        };
        let from = monday.checked_sub_signed(Duration::days(7)).unwrap_or(NaiveDate::MIN);
        [from.year(), sunday.year()].into_iter().any(|year| {
            self.election_years.contains(&year)
                && rules::election_day(year).is_some_and(|e| e >= from && e <= sunday)
        })
    }

    // ─── Event enumeration ───────────────────────────────────────────

    /// Every event dated `date`, ordered high impact first.
    pub fn events_for_date(&self, date: NaiveDate) -> Result<Vec<CalendarEvent>, CalendarError> {
        let mut events = Vec::new();

        for bank in CentralBank::ALL {
            if self.is_central_bank_decision_day(bank, date) {
                let description = if bank == CentralBank::Fed && Self::has_dot_plot(date) {
                    "Federal Reserve policy decision with Summary of Economic Projections".to_string()
                } else {
                    format!("{} monetary policy decision", bank.label())
                };
                events.push(CalendarEvent::new(
                    date,
                    format!("{} Rate Decision", bank.label()),
                    bank.event_type(),
                    bank.impact(),
                    description,
                ));
            }
        }

        if self.is_cpi_release_day(date)? {
            events.push(CalendarEvent::new(
                date,
                "CPI Release",
                EventType::Cpi,
                Impact::High,
                "US consumer price index",
            ));
        }
        if self.is_nfp_release_day(date)? {
            events.push(CalendarEvent::new(
                date,
                "Non-Farm Payrolls",
                EventType::Nfp,
                Impact::High,
                "US employment situation report",
            ));
        }
        if self.is_ism_release_day(date)? {
            events.push(CalendarEvent::new(
                date,
                "ISM Manufacturing PMI",
                EventType::Economic,
                Impact::Medium,
                "First business day of the month",
            ));
        }

        if self.is_triple_witching_day(date)? {
            events.push(CalendarEvent::new(
                date,
                "Triple Witching",
                EventType::TripleWitching,
                Impact::High,
                "Quarterly expiry of stock options, index futures and index options",
            ));
            events.push(CalendarEvent::new(
                date,
                "S&P Quarterly Rebalance",
                EventType::IndexRebalancing,
                Impact::Medium,
                "S&P index rebalance effective at the quarterly expiry close",
            ));
        } else if self.is_options_expiry_day(date)? {
            events.push(CalendarEvent::new(
                date,
                "Monthly Options Expiry",
                EventType::OptionsExpiry,
                Impact::Medium,
                "Third-Friday equity options expiration",
            ));
        }

        if self.is_russell_reconstitution_day(date) {
            events.push(CalendarEvent::new(
                date,
                "Russell Reconstitution",
                EventType::IndexRebalancing,
                Impact::Medium,
                "Annual Russell index membership reconstitution",
            ));
        }

        if let Some(estimate) = self.gdp_estimate_on(date)? {
            let impact = if estimate == GdpEstimate::Advance {
                Impact::High
            } else {
                Impact::Medium
            };
            events.push(CalendarEvent::new(
                date,
                estimate.event_name(),
                EventType::GdpRelease,
                impact,
                "US quarterly GDP",
            ));
        }

        if self.is_election_day(date) {
            events.push(CalendarEvent::new(
                date,
                rules::election_name(date.year()),
                EventType::Election,
                Impact::High,
                "US general election",
            ));
        }

        if self.is_earnings_season_kickoff(date) {
            events.push(CalendarEvent::new(
                date,
                "Earnings Season Kickoff",
                EventType::EarningsSeason,
                Impact::Medium,
                "Large-cap bank earnings open the reporting season",
            ));
        }

        if let Some(name) = rules::holiday_name(date) {
            events.push(CalendarEvent::new(
                date,
                name,
                EventType::Economic,
                Impact::Low,
                "US equity markets closed",
            ));
        }

        events.extend(self.custom_events.iter().filter(|e| e.date == date).cloned());

        // Stable: ties keep rule order.
        events.sort_by(|a, b| b.impact.cmp(&a.impact));
        Ok(dedup_events(events))
    }

    /// Every event dated within `start..=end`, in date order.
    pub fn events_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        let mut out = Vec::new();
        let mut day = start;
        while day <= end {
            out.extend(self.events_for_date(day)?);
            day = day.succ_opt().ok_or(CalendarError::DateOverflow(day))?;
        }
        Ok(out)
    }

    /// Events dated within the Monday..Sunday week containing `date`.
    pub fn events_in_week(&self, date: NaiveDate) -> Result<Vec<CalendarEvent>, CalendarError> {
        let (monday, sunday) = week_bounds(date)?;
        self.events_in_range(monday, sunday)
    }

    pub fn custom_events(&self) -> &[CalendarEvent] {
        &self.custom_events
    }
}

/// Drop repeated `(name, date)` pairs, keeping the first occurrence.
pub fn dedup_events(events: Vec<CalendarEvent>) -> Vec<CalendarEvent> {
    let mut seen = HashSet::new();
    events
        .into_iter()
        .filter(|e| seen.insert(e.dedup_key()))
        .collect()
}
