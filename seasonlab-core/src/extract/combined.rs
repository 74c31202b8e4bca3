//! Combined-event weeks.
//!
//! A week with two or more material events is classified into one of a
//! closed set of combination types. Three or more high-impact events
//! short-circuit to [`CombinationType::MultipleHighImpact`]; otherwise the
//! first category pair of [`PRIORITY`] fully present in the week wins.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::ExtractError;
use crate::calendar::engine::dedup_events;
use crate::calendar::CalendarRuleEngine;
use crate::domain::{CalendarEvent, EventType, Impact};
use crate::time::{utc_date, week_bounds};

/// Coarse event category used for pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Fomc,
    OptionsExpiry,
    TripleWitching,
    Earnings,
    Cpi,
    Nfp,
    Gdp,
    Election,
    IndexRebalancing,
}

impl EventCategory {
    /// Category by event type, falling back to a case-insensitive name match.
    pub fn classify(event: &CalendarEvent) -> Option<Self> {
        match event.event_type {
            EventType::Fomc => return Some(EventCategory::Fomc),
            EventType::OptionsExpiry => return Some(EventCategory::OptionsExpiry),
            EventType::TripleWitching => return Some(EventCategory::TripleWitching),
            EventType::EarningsSeason => return Some(EventCategory::Earnings),
            EventType::Cpi => return Some(EventCategory::Cpi),
            EventType::Nfp => return Some(EventCategory::Nfp),
            EventType::GdpRelease => return Some(EventCategory::Gdp),
            EventType::Election => return Some(EventCategory::Election),
            EventType::IndexRebalancing => return Some(EventCategory::IndexRebalancing),
            _ => {}
        }

        let name = event.name.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| name.contains(n));
        if has(&["fomc", "fed "]) {
            Some(EventCategory::Fomc)
        } else if has(&["cpi", "inflation"]) {
            Some(EventCategory::Cpi)
        } else if has(&["payroll", "nfp"]) {
            Some(EventCategory::Nfp)
        } else if has(&["gdp"]) {
            Some(EventCategory::Gdp)
        } else if has(&["election"]) {
            Some(EventCategory::Election)
        } else if has(&["earnings"]) {
            Some(EventCategory::Earnings)
        } else if has(&["witching"]) {
            Some(EventCategory::TripleWitching)
        } else if has(&["expiry", "expiration"]) {
            Some(EventCategory::OptionsExpiry)
        } else if has(&["rebalanc", "reconstitution"]) {
            Some(EventCategory::IndexRebalancing)
        } else {
            None
        }
    }
}

/// Severity tier attached to a combination type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImpactTier {
    Elevated,
    High,
    VeryHigh,
    Extreme,
}

/// The closed set of combination labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombinationType {
    MultipleHighImpact,
    ElectionFomc,
    ElectionCpi,
    ElectionNfp,
    FomcTripleWitching,
    FomcNfp,
    FomcCpi,
    CpiNfp,
    TripleWitchingEarnings,
    FomcGdp,
    FomcEarnings,
    FomcOptionsExpiry,
    GdpCpi,
    CpiEarnings,
    NfpEarnings,
    GdpEarnings,
    IndexRebalancingEarnings,
}

impl CombinationType {
    pub fn label(&self) -> &'static str {
        match self {
            CombinationType::MultipleHighImpact => "Multiple-HighImpact-Week",
            CombinationType::ElectionFomc => "Election+FOMC-Week",
            CombinationType::ElectionCpi => "Election+CPI-Week",
            CombinationType::ElectionNfp => "Election+NFP-Week",
            CombinationType::FomcTripleWitching => "FOMC+TripleWitching-Week",
            CombinationType::FomcNfp => "FOMC+NFP-Week",
            CombinationType::FomcCpi => "FOMC+CPI-Week",
            CombinationType::CpiNfp => "CPI+NFP-Week",
            CombinationType::TripleWitchingEarnings => "TripleWitching+Earnings-Week",
            CombinationType::FomcGdp => "FOMC+GDP-Week",
            CombinationType::FomcEarnings => "FOMC+Earnings-Week",
            CombinationType::FomcOptionsExpiry => "FOMC+OptionsExpiry-Week",
            CombinationType::GdpCpi => "GDP+CPI-Week",
            CombinationType::CpiEarnings => "CPI+Earnings-Week",
            CombinationType::NfpEarnings => "NFP+Earnings-Week",
            CombinationType::GdpEarnings => "GDP+Earnings-Week",
            CombinationType::IndexRebalancingEarnings => "IndexRebalancing+Earnings-Week",
        }
    }

    /// Fixed `(tier, volatility multiplier)` per combination.
    pub fn profile(&self) -> (ImpactTier, f64) {
        use ImpactTier::*;
        match self {
            CombinationType::MultipleHighImpact => (Extreme, 2.5),
            CombinationType::ElectionFomc => (Extreme, 2.2),
            CombinationType::ElectionCpi => (Extreme, 2.0),
            CombinationType::ElectionNfp => (VeryHigh, 1.9),
            CombinationType::FomcTripleWitching => (Extreme, 2.0),
            CombinationType::FomcNfp => (VeryHigh, 1.8),
            CombinationType::FomcCpi => (VeryHigh, 1.8),
            CombinationType::CpiNfp => (VeryHigh, 1.6),
            CombinationType::TripleWitchingEarnings => (VeryHigh, 1.6),
            CombinationType::FomcGdp => (High, 1.5),
            CombinationType::FomcEarnings => (High, 1.5),
            CombinationType::FomcOptionsExpiry => (High, 1.4),
            CombinationType::GdpCpi => (High, 1.4),
            CombinationType::CpiEarnings => (Elevated, 1.3),
            CombinationType::NfpEarnings => (Elevated, 1.3),
            CombinationType::GdpEarnings => (Elevated, 1.25),
            CombinationType::IndexRebalancingEarnings => (Elevated, 1.2),
        }
    }

    pub fn tier(&self) -> ImpactTier {
        self.profile().0
    }

    pub fn multiplier(&self) -> f64 {
        self.profile().1
    }

    pub fn description(&self) -> &'static str {
        match self {
            CombinationType::MultipleHighImpact => "Three or more high-impact events in one week",
            CombinationType::ElectionFomc => "US election and FOMC decision in the same week",
            CombinationType::ElectionCpi => "US election and CPI release in the same week",
            CombinationType::ElectionNfp => "US election and payrolls report in the same week",
            CombinationType::FomcTripleWitching => "FOMC decision during triple-witching week",
            CombinationType::FomcNfp => "FOMC decision and payrolls report in the same week",
            CombinationType::FomcCpi => "FOMC decision and CPI release in the same week",
            CombinationType::CpiNfp => "CPI release and payrolls report in the same week",
            CombinationType::TripleWitchingEarnings => "Triple witching inside earnings season",
            CombinationType::FomcGdp => "FOMC decision and GDP release in the same week",
            CombinationType::FomcEarnings => "FOMC decision inside earnings season",
            CombinationType::FomcOptionsExpiry => "FOMC decision during monthly options expiry week",
            CombinationType::GdpCpi => "GDP release and CPI release in the same week",
            CombinationType::CpiEarnings => "CPI release inside earnings season",
            CombinationType::NfpEarnings => "Payrolls report inside earnings season",
            CombinationType::GdpEarnings => "GDP release inside earnings season",
            CombinationType::IndexRebalancingEarnings => "Index rebalancing inside earnings season",
        }
    }
}

impl fmt::Display for CombinationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Category pairs, most impactful first.
pub const PRIORITY: [(EventCategory, EventCategory, CombinationType); 16] = {
    use CombinationType as C;
    use EventCategory as E;
    [
        (E::Election, E::Fomc, C::ElectionFomc),
        (E::Election, E::Cpi, C::ElectionCpi),
        (E::Election, E::Nfp, C::ElectionNfp),
        (E::Fomc, E::TripleWitching, C::FomcTripleWitching),
        (E::Fomc, E::Nfp, C::FomcNfp),
        (E::Fomc, E::Cpi, C::FomcCpi),
        (E::Cpi, E::Nfp, C::CpiNfp),
        (E::TripleWitching, E::Earnings, C::TripleWitchingEarnings),
        (E::Fomc, E::Gdp, C::FomcGdp),
        (E::Fomc, E::Earnings, C::FomcEarnings),
        (E::Fomc, E::OptionsExpiry, C::FomcOptionsExpiry),
        (E::Gdp, E::Cpi, C::GdpCpi),
        (E::Cpi, E::Earnings, C::CpiEarnings),
        (E::Nfp, E::Earnings, C::NfpEarnings),
        (E::Gdp, E::Earnings, C::GdpEarnings),
        (E::IndexRebalancing, E::Earnings, C::IndexRebalancingEarnings),
    ]
};

/// A detected combination week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventCombination {
    pub combination_type: CombinationType,
    pub events: Vec<CalendarEvent>,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub tier: ImpactTier,
    pub multiplier: f64,
    pub description: String,
}

impl EventCombination {
    fn new(combination_type: CombinationType, events: Vec<CalendarEvent>, week: (NaiveDate, NaiveDate)) -> Self {
        let (tier, multiplier) = combination_type.profile();
        Self {
            combination_type,
            events,
            week_start: week.0,
            week_end: week.1,
            tier,
            multiplier,
            description: combination_type.description().to_string(),
        }
    }
}

/// Volatility multiplier for a combination.
///
/// Returns the fixed table value. Empirically fitted multipliers would plug in here.
pub fn synergy_multiplier(combination: &EventCombination) -> f64 {
    combination.combination_type.multiplier()
}

#[derive(Debug, Clone)]
pub struct CombinedEventExtractor {
    calendar: Arc<CalendarRuleEngine>,
}

impl CombinedEventExtractor {
    pub fn new(calendar: Arc<CalendarRuleEngine>) -> Self {
        Self { calendar }
    }

    /// Material events of the week containing `date`, plus an earnings-season
    /// marker when any day of the week is in season.
    pub fn week_events(&self, date: NaiveDate) -> Result<Vec<CalendarEvent>, ExtractError> {
        let week = week_bounds(date)?;
        let mut events: Vec<CalendarEvent> = self
            .calendar
            .events_in_range(week.0, week.1)?
            .into_iter()
            .filter(|e| e.impact.is_material())
            .collect();

        let has_earnings = events.iter().any(|e| e.event_type == EventType::EarningsSeason);
        if !has_earnings {
            let in_season = week
                .0
                .iter_days()
                .take_while(|d| *d <= week.1)
                .find(|d| self.calendar.is_earnings_season(*d));
            if let Some(day) = in_season {
                events.push(CalendarEvent::new(
                    day,
                    "Earnings Season",
                    EventType::EarningsSeason,
                    Impact::Medium,
                    "Quarterly earnings reporting season",
                ));
            }
        }
        Ok(dedup_events(events))
    }

    /// Combination for the week containing `date`, if any.
    pub fn detect(&self, date: NaiveDate) -> Result<Option<EventCombination>, ExtractError> {
        let week = week_bounds(date)?;
        let events = self.week_events(date)?;
        Ok(classify_week(events, week))
    }

    pub fn extract(&self, ts: i64) -> Result<Option<String>, ExtractError> {
        let date = utc_date(ts)?;
        Ok(self
            .detect(date)?
            .map(|c| c.combination_type.label().to_string()))
    }
}

/// Pure classification of one week's material events.
pub fn classify_week(
    events: Vec<CalendarEvent>,
    week: (NaiveDate, NaiveDate),
) -> Option<EventCombination> {
    if events.len() < 2 {
        return None;
    }

    let high = events.iter().filter(|e| e.impact == Impact::High).count();
    if high >= 3 {
        return Some(EventCombination::new(CombinationType::MultipleHighImpact, events, week));
    }

    let categorized: Vec<(Option<EventCategory>, &CalendarEvent)> = events
        .iter()
        .map(|e| (EventCategory::classify(e), e))
        .collect();

    for (a, b, combination) in PRIORITY {
        let first = categorized.iter().find(|(c, _)| *c == Some(a));
        let second = categorized.iter().find(|(c, _)| *c == Some(b));
        if let (Some((_, ea)), Some((_, eb))) = (first, second) {
            let members = vec![(*ea).clone(), (*eb).clone()];
            return Some(EventCombination::new(combination, members, week));
        }
    }
    None
}
