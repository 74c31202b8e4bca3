//! Analysis result bundle.

use serde::{Deserialize, Serialize};

use seasonlab_core::domain::Timeframe;
use seasonlab_core::extract::CalendarBucket;

use crate::config::ConfigId;
use crate::stats::BucketStatistics;

/// Current schema version for serialized results.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Statistics of one event-driven extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractorStats {
    pub extractor: String,
    pub buckets: Vec<BucketStatistics>,
}

/// Best or worst bucket of a family by average return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketExtreme {
    pub label: String,
    pub avg_return: f64,
    pub win_rate: f64,
    pub sample_size: usize,
}

impl From<&BucketStatistics> for BucketExtreme {
    fn from(stats: &BucketStatistics) -> Self {
        Self {
            label: stats.label.clone(),
            avg_return: stats.avg_return,
            win_rate: stats.win_rate,
            sample_size: stats.sample_size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilySummary {
    pub family: String,
    pub best: BucketExtreme,
    pub worst: BucketExtreme,
}

impl FamilySummary {
    /// Extremes among buckets with at least one finite return.
    pub fn from_buckets(family: impl Into<String>, buckets: &[BucketStatistics]) -> Option<Self> {
        let sampled = || buckets.iter().filter(|b| b.sample_size > 0);
        let best = sampled().max_by(|a, b| a.avg_return.total_cmp(&b.avg_return))?;
        let worst = sampled().min_by(|a, b| a.avg_return.total_cmp(&b.avg_return))?;
        Some(Self {
            family: family.into(),
            best: best.into(),
            worst: worst.into(),
        })
    }
}

/// Calendar bucket families reported in their own result field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Monthly,
    Quarterly,
    DayOfWeek,
    HourOfDay,
    MarketSession,
    WeekPosition,
    WeekOfMonth,
    DayOfMonth,
    WeekOfYear,
}

impl Family {
    pub fn name(&self) -> &'static str {
        match self {
            Family::Monthly => "monthly",
            Family::Quarterly => "quarterly",
            Family::DayOfWeek => "day_of_week",
            Family::HourOfDay => "hour_of_day",
            Family::MarketSession => "market_session",
            Family::WeekPosition => "week_position",
            Family::WeekOfMonth => "week_of_month",
            Family::DayOfMonth => "day_of_month",
            Family::WeekOfYear => "week_of_year",
        }
    }
}

impl From<CalendarBucket> for Family {
    fn from(bucket: CalendarBucket) -> Self {
        match bucket {
            CalendarBucket::Month => Family::Monthly,
            CalendarBucket::Quarter => Family::Quarterly,
            CalendarBucket::Weekday => Family::DayOfWeek,
            CalendarBucket::HourOfDay => Family::HourOfDay,
            CalendarBucket::MarketSession => Family::MarketSession,
            CalendarBucket::WeekPosition => Family::WeekPosition,
            CalendarBucket::WeekOfMonth => Family::WeekOfMonth,
            CalendarBucket::DayOfMonth => Family::DayOfMonth,
            CalendarBucket::WeekOfYear => Family::WeekOfYear,
        }
    }
}

/// Complete result of one symbol's analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub config_id: ConfigId,
    pub symbol: String,
    pub timeframe: Timeframe,
    pub bar_count: usize,
    /// Returns with a finite value.
    pub return_count: usize,

    pub monthly: Vec<BucketStatistics>,
    pub quarterly: Vec<BucketStatistics>,
    pub day_of_week: Vec<BucketStatistics>,
    pub hour_of_day: Vec<BucketStatistics>,
    pub market_session: Vec<BucketStatistics>,
    pub event_based: Vec<ExtractorStats>,
    pub week_position: Vec<BucketStatistics>,
    pub week_of_month: Vec<BucketStatistics>,
    pub day_of_month: Vec<BucketStatistics>,
    pub week_of_year: Vec<BucketStatistics>,
    pub named_patterns: Vec<BucketStatistics>,

    pub summary: Vec<FamilySummary>,
    pub insights: Vec<String>,
}

impl AnalysisResult {
    pub fn empty(symbol: impl Into<String>, config_id: ConfigId, timeframe: Timeframe) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            config_id,
            symbol: symbol.into(),
            timeframe,
            bar_count: 0,
            return_count: 0,
            monthly: Vec::new(),
            quarterly: Vec::new(),
            day_of_week: Vec::new(),
            hour_of_day: Vec::new(),
            market_session: Vec::new(),
            event_based: Vec::new(),
            week_position: Vec::new(),
            week_of_month: Vec::new(),
            day_of_month: Vec::new(),
            week_of_year: Vec::new(),
            named_patterns: Vec::new(),
            summary: Vec::new(),
            insights: Vec::new(),
        }
    }

    pub fn family(&self, family: Family) -> &[BucketStatistics] {
        match family {
            Family::Monthly => &self.monthly,
            Family::Quarterly => &self.quarterly,
            Family::DayOfWeek => &self.day_of_week,
            Family::HourOfDay => &self.hour_of_day,
            Family::MarketSession => &self.market_session,
            Family::WeekPosition => &self.week_position,
            Family::WeekOfMonth => &self.week_of_month,
            Family::DayOfMonth => &self.day_of_month,
            Family::WeekOfYear => &self.week_of_year,
        }
    }

    pub fn family_mut(&mut self, family: Family) -> &mut Vec<BucketStatistics> {
        match family {
            Family::Monthly => &mut self.monthly,
            Family::Quarterly => &mut self.quarterly,
            Family::DayOfWeek => &mut self.day_of_week,
            Family::HourOfDay => &mut self.hour_of_day,
            Family::MarketSession => &mut self.market_session,
            Family::WeekPosition => &mut self.week_position,
            Family::WeekOfMonth => &mut self.week_of_month,
            Family::DayOfMonth => &mut self.day_of_month,
            Family::WeekOfYear => &mut self.week_of_year,
        }
    }

    /// Event-extractor statistics by extractor name.
    pub fn event_stats(&self, extractor: &str) -> Option<&ExtractorStats> {
        self.event_based.iter().find(|s| s.extractor == extractor)
    }

    /// Best/worst bucket for every family and event extractor with data.
    pub fn summarize(&self) -> Vec<FamilySummary> {
        const CALENDAR: [Family; 9] = [
            Family::Monthly,
            Family::Quarterly,
            Family::DayOfWeek,
            Family::HourOfDay,
            Family::MarketSession,
            Family::WeekPosition,
            Family::WeekOfMonth,
            Family::DayOfMonth,
            Family::WeekOfYear,
        ];
        let mut summary: Vec<FamilySummary> = CALENDAR
            .iter()
            .filter_map(|f| FamilySummary::from_buckets(f.name(), self.family(*f)))
            .collect();
        summary.extend(
            self.event_based
                .iter()
                .filter_map(|s| FamilySummary::from_buckets(s.extractor.clone(), &s.buckets)),
        );
        summary.extend(FamilySummary::from_buckets("named_patterns", &self.named_patterns));
        summary
    }
}
