//! Period extractors: stateless `timestamp → label` classifiers.
//!
//! The family is closed: [`PeriodExtractor`] is an enum over every
//! classifier, [`PeriodType`] is its serializable tag, and
//! [`create_extractor`] builds one from a tag plus an [`ExtractorContext`].
//! Every `extract` call is pure and idempotent.

pub mod buckets;
pub mod combined;
pub mod decision_hour;
pub mod dividend;
pub mod events;
pub mod window;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::calendar::{CalendarError, CalendarRuleEngine};
use crate::domain::{CentralBank, Timeframe};
use crate::time::{TimeContext, TimeError};

pub use buckets::{CalendarBucket, CalendarBucketExtractor};
pub use combined::{
    classify_week, synergy_multiplier, CombinationType, CombinedEventExtractor, EventCategory,
    EventCombination, ImpactTier, PRIORITY,
};
pub use decision_hour::{AnnouncementSchedule, DecisionHourExtractor};
pub use dividend::{explain_dividend_window, DividendError, DividendExDateExtractor, ExDividendSource};
pub use events::{EventBucket, EventBucketExtractor};
pub use window::{EventWindowConfig, EventWindowExtractor, WindowEvent, WindowScanCache};

// ─── Error type ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExtractError {
    #[error(transparent)]
    Time(#[from] TimeError),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

// ─── Granularity ─────────────────────────────────────────────────────

/// Finest bar spacing an extractor needs to produce meaningful labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Hourly,
    Daily,
}

impl Granularity {
    pub fn supports(&self, timeframe: Timeframe) -> bool {
        match self {
            Granularity::Hourly => timeframe.is_intraday(),
            Granularity::Daily => true,
        }
    }
}

// ─── Period types ────────────────────────────────────────────────────

/// Serializable tag naming one extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodType {
    HourOfDay,
    MarketSession,
    Month,
    Quarter,
    Weekday,
    WeekPosition,
    DayOfMonth,
    WeekOfMonth,
    WeekOfYear,
    FomcWeek,
    OptionsExpiryWeek,
    EarningsSeason,
    TripleWitching,
    GdpRelease,
    Election,
    IndexRebalancing,
    CpiDay,
    NfpDay,
    FedDecisionHour,
    EcbDecisionHour,
    BoeDecisionHour,
    BojDecisionHour,
    FomcWindow,
    CpiWindow,
    NfpWindow,
    OptionsExpiryWindow,
    CombinedEvents,
    DividendExDate,
}

impl PeriodType {
    pub const ALL: [PeriodType; 28] = [
        PeriodType::HourOfDay,
        PeriodType::MarketSession,
        PeriodType::Month,
        PeriodType::Quarter,
        PeriodType::Weekday,
        PeriodType::WeekPosition,
        PeriodType::DayOfMonth,
        PeriodType::WeekOfMonth,
        PeriodType::WeekOfYear,
        PeriodType::FomcWeek,
        PeriodType::OptionsExpiryWeek,
        PeriodType::EarningsSeason,
        PeriodType::TripleWitching,
        PeriodType::GdpRelease,
        PeriodType::Election,
        PeriodType::IndexRebalancing,
        PeriodType::CpiDay,
        PeriodType::NfpDay,
        PeriodType::FedDecisionHour,
        PeriodType::EcbDecisionHour,
        PeriodType::BoeDecisionHour,
        PeriodType::BojDecisionHour,
        PeriodType::FomcWindow,
        PeriodType::CpiWindow,
        PeriodType::NfpWindow,
        PeriodType::OptionsExpiryWindow,
        PeriodType::CombinedEvents,
        PeriodType::DividendExDate,
    ];

    /// The default analysis set: calendar seasonality plus the event buckets.
    pub fn default_set() -> Vec<PeriodType> {
        vec![
            PeriodType::Month,
            PeriodType::Quarter,
            PeriodType::Weekday,
            PeriodType::WeekPosition,
            PeriodType::WeekOfMonth,
            PeriodType::DayOfMonth,
            PeriodType::HourOfDay,
            PeriodType::MarketSession,
            PeriodType::FomcWeek,
            PeriodType::OptionsExpiryWeek,
            PeriodType::EarningsSeason,
            PeriodType::TripleWitching,
        ]
    }

    fn calendar_bucket(&self) -> Option<CalendarBucket> {
        Some(match self {
            PeriodType::HourOfDay => CalendarBucket::HourOfDay,
            PeriodType::MarketSession => CalendarBucket::MarketSession,
            PeriodType::Month => CalendarBucket::Month,
            PeriodType::Quarter => CalendarBucket::Quarter,
            PeriodType::Weekday => CalendarBucket::Weekday,
            PeriodType::WeekPosition => CalendarBucket::WeekPosition,
            PeriodType::DayOfMonth => CalendarBucket::DayOfMonth,
            PeriodType::WeekOfMonth => CalendarBucket::WeekOfMonth,
            PeriodType::WeekOfYear => CalendarBucket::WeekOfYear,
            _ => return None,
        })
    }

    fn event_bucket(&self) -> Option<EventBucket> {
        Some(match self {
            PeriodType::FomcWeek => EventBucket::Fomc,
            PeriodType::OptionsExpiryWeek => EventBucket::OptionsExpiry,
            PeriodType::EarningsSeason => EventBucket::EarningsSeason,
            PeriodType::TripleWitching => EventBucket::TripleWitching,
            PeriodType::GdpRelease => EventBucket::GdpRelease,
            PeriodType::Election => EventBucket::Election,
            PeriodType::IndexRebalancing => EventBucket::IndexRebalancing,
            PeriodType::CpiDay => EventBucket::CpiDay,
            PeriodType::NfpDay => EventBucket::NfpDay,
            _ => return None,
        })
    }

    fn decision_bank(&self) -> Option<CentralBank> {
        match self {
            PeriodType::FedDecisionHour => Some(CentralBank::Fed),
            PeriodType::EcbDecisionHour => Some(CentralBank::Ecb),
            PeriodType::BoeDecisionHour => Some(CentralBank::Boe),
            PeriodType::BojDecisionHour => Some(CentralBank::Boj),
            _ => None,
        }
    }

    /// Window settings behind the built-in `*_window` period types.
    pub fn window_config(&self) -> Option<EventWindowConfig> {
        match self {
            PeriodType::FomcWindow => Some(EventWindowConfig::fomc()),
            PeriodType::CpiWindow => Some(EventWindowConfig::cpi()),
            PeriodType::NfpWindow => Some(EventWindowConfig::nfp()),
            PeriodType::OptionsExpiryWindow => Some(EventWindowConfig::options_expiry()),
            _ => None,
        }
    }
}

// ─── Context & factory ───────────────────────────────────────────────

/// Shared, read-only collaborators handed to every extractor.
///
/// The scan cache is tied to this context's calendar; build a new context
/// (and cache) for a different calendar.
#[derive(Debug, Clone)]
pub struct ExtractorContext {
    pub time: TimeContext,
    pub calendar: Arc<CalendarRuleEngine>,
    pub window_cache: Arc<WindowScanCache>,
    pub symbol: Option<String>,
}

impl ExtractorContext {
    pub fn new(calendar: Arc<CalendarRuleEngine>) -> Self {
        Self {
            time: TimeContext::default(),
            calendar,
            window_cache: Arc::new(WindowScanCache::new()),
            symbol: None,
        }
    }

    pub fn with_time(mut self, time: TimeContext) -> Self {
        self.time = time;
        self
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Window extractor over this context's calendar and cache.
    pub fn window(&self, mut config: EventWindowConfig) -> EventWindowExtractor {
        if config.symbol.is_none() {
            config.symbol = self.symbol.clone();
        }
        EventWindowExtractor::new(config, self.calendar.clone(), self.window_cache.clone())
    }
}

/// Build the extractor a [`PeriodType`] names.
pub fn create_extractor(period: PeriodType, ctx: &ExtractorContext) -> PeriodExtractor {
    if let Some(bucket) = period.calendar_bucket() {
        return PeriodExtractor::Calendar(CalendarBucketExtractor::new(bucket, ctx.time));
    }
    if let Some(bucket) = period.event_bucket() {
        return PeriodExtractor::Event(EventBucketExtractor::new(bucket, ctx.calendar.clone()));
    }
    if let Some(bank) = period.decision_bank() {
        return PeriodExtractor::DecisionHour(DecisionHourExtractor::new(
            bank,
            ctx.calendar.clone(),
            ctx.time,
        ));
    }
    if let Some(config) = period.window_config() {
        return PeriodExtractor::Window(ctx.window(config));
    }
    match period {
        PeriodType::CombinedEvents => {
            PeriodExtractor::Combined(CombinedEventExtractor::new(ctx.calendar.clone()))
        }
        _ => PeriodExtractor::DividendExDate(DividendExDateExtractor),
    }
}

// ─── The family ──────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum PeriodExtractor {
    Calendar(CalendarBucketExtractor),
    Event(EventBucketExtractor),
    DecisionHour(DecisionHourExtractor),
    Window(EventWindowExtractor),
    Combined(CombinedEventExtractor),
    DividendExDate(DividendExDateExtractor),
}

impl PeriodExtractor {
    /// Stable name used as the key in analysis results.
    pub fn name(&self) -> String {
        match self {
            PeriodExtractor::Calendar(e) => e.bucket().name().to_string(),
            PeriodExtractor::Event(e) => e.bucket().name().to_string(),
            PeriodExtractor::DecisionHour(e) => {
                format!("{}_decision_hour", e.bank().label().to_lowercase())
            }
            PeriodExtractor::Window(e) => e.config().name(),
            PeriodExtractor::Combined(_) => "combined_events".to_string(),
            PeriodExtractor::DividendExDate(_) => "dividend_ex_date".to_string(),
        }
    }

    pub fn granularity(&self) -> Granularity {
        match self {
            PeriodExtractor::Calendar(e) => e.bucket().granularity(),
            PeriodExtractor::DecisionHour(_) => Granularity::Hourly,
            PeriodExtractor::Window(e) => e.granularity(),
            PeriodExtractor::Event(_)
            | PeriodExtractor::Combined(_)
            | PeriodExtractor::DividendExDate(_) => Granularity::Daily,
        }
    }

    /// Event-driven extractors (as opposed to plain calendar buckets).
    pub fn is_event_based(&self) -> bool {
        !matches!(self, PeriodExtractor::Calendar(_))
    }

    pub fn extract(&self, ts: i64) -> Result<Option<String>, ExtractError> {
        match self {
            PeriodExtractor::Calendar(e) => e.extract(ts),
            PeriodExtractor::Event(e) => e.extract(ts),
            PeriodExtractor::DecisionHour(e) => e.extract(ts),
            PeriodExtractor::Window(e) => e.extract(ts),
            PeriodExtractor::Combined(e) => e.extract(ts),
            PeriodExtractor::DividendExDate(e) => Ok(e.extract(ts)),
        }
    }
}
