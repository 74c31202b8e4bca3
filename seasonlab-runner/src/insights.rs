//! Rule-based insights over an analysis result.
//!
//! Every family has fixed sample-size and win-rate (or consistency)
//! thresholds. Output order is fixed: event extractors, week position,
//! week of month, day of month, hour of day, market session, monthly,
//! quarterly, weekday, named patterns. Within a family, buckets keep their
//! natural order.

use seasonlab_core::extract::EventBucket;

use crate::result::{AnalysisResult, Family};
use crate::stats::BucketStatistics;

/// Thresholds for one bucket family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsightRule {
    /// Inclusive lower bound on the sample size.
    pub min_sample: usize,
    /// Win rate strictly above this is reported as strong.
    pub strong_win_rate: f64,
    /// Win rate strictly below this is reported as weak.
    pub weak_win_rate: f64,
    /// Inclusive lower bound on |avg_return|.
    pub min_abs_avg: f64,
}

impl InsightRule {
    const fn new(min_sample: usize, strong_win_rate: f64, weak_win_rate: f64) -> Self {
        Self {
            min_sample,
            strong_win_rate,
            weak_win_rate,
            min_abs_avg: 0.0,
        }
    }

    fn verdict(&self, stats: &BucketStatistics) -> Option<&'static str> {
        if stats.sample_size < self.min_sample || stats.avg_return.abs() < self.min_abs_avg {
            return None;
        }
        if stats.win_rate > self.strong_win_rate {
            Some("strong")
        } else if stats.win_rate < self.weak_win_rate {
            Some("weak")
        } else {
            None
        }
    }
}

pub const EVENT_RULE: InsightRule = InsightRule {
    min_abs_avg: 0.1,
    ..InsightRule::new(10, 60.0, 40.0)
};
pub const WEEK_POSITION_RULE: InsightRule = InsightRule::new(8, 60.0, 40.0);
pub const WEEK_OF_MONTH_RULE: InsightRule = InsightRule::new(15, 58.0, 42.0);
pub const DAY_OF_MONTH_RULE: InsightRule = InsightRule::new(8, 65.0, 35.0);
/// Intraday rules need more than 20 samples, hence 21.
pub const HOUR_RULE: InsightRule = InsightRule::new(21, 55.0, 45.0);
pub const SESSION_RULE: InsightRule = HOUR_RULE;
pub const QUARTER_RULE: InsightRule = InsightRule::new(20, 55.0, 45.0);

/// Month buckets are judged on consistency plus the sign of the average.
pub const MONTH_STRONG_CONSISTENCY: f64 = 60.0;
pub const MONTH_WEAK_CONSISTENCY: f64 = 40.0;

pub const WEEKDAY_MIN_SAMPLE: usize = 10;
pub const NAMED_PATTERN_MIN_SAMPLE: usize = 5;

/// All insights for a result, in reporting order.
pub fn generate_insights(result: &AnalysisResult) -> Vec<String> {
    let mut out = Vec::new();

    for extractor in &result.event_based {
        for stats in extractor.buckets.iter().filter(|b| !is_baseline(&b.label)) {
            if let Some(verdict) = EVENT_RULE.verdict(stats) {
                out.push(format!("{}: {}", extractor.extractor, describe(verdict, stats)));
            }
        }
    }

    let ruled = [
        (Family::WeekPosition, WEEK_POSITION_RULE),
        (Family::WeekOfMonth, WEEK_OF_MONTH_RULE),
        (Family::DayOfMonth, DAY_OF_MONTH_RULE),
        (Family::HourOfDay, HOUR_RULE),
        (Family::MarketSession, SESSION_RULE),
    ];
    for (family, rule) in ruled {
        push_ruled(&mut out, family, rule, result.family(family));
    }

    for stats in &result.monthly {
        if let Some(line) = month_insight(stats) {
            out.push(line);
        }
    }

    push_ruled(&mut out, Family::Quarterly, QUARTER_RULE, &result.quarterly);

    out.extend(weekday_insights(&result.day_of_week));

    for stats in result
        .named_patterns
        .iter()
        .filter(|s| s.sample_size >= NAMED_PATTERN_MIN_SAMPLE)
    {
        out.push(format!(
            "{}: {:+.2}% average daily return, {:.0}% win rate over {} days",
            stats.label, stats.avg_return, stats.win_rate, stats.sample_size
        ));
    }

    out
}

fn push_ruled(out: &mut Vec<String>, family: Family, rule: InsightRule, buckets: &[BucketStatistics]) {
    for stats in buckets {
        if let Some(verdict) = rule.verdict(stats) {
            out.push(format!("{}: {}", family.name(), describe(verdict, stats)));
        }
    }
}

fn describe(verdict: &str, stats: &BucketStatistics) -> String {
    format!(
        "{} is {} ({:.0}% win rate, {:+.2}% average, n={})",
        stats.label, verdict, stats.win_rate, stats.avg_return, stats.sample_size
    )
}

fn month_insight(stats: &BucketStatistics) -> Option<String> {
    let consistency = stats.consistency?;
    let verdict = if consistency > MONTH_STRONG_CONSISTENCY && stats.avg_return > 0.0 {
        "strong"
    } else if consistency < MONTH_WEAK_CONSISTENCY && stats.avg_return < 0.0 {
        "weak"
    } else {
        return None;
    };
    Some(format!(
        "monthly: {} is {} (positive in {:.0}% of years, {:+.2}% average)",
        stats.label, verdict, consistency, stats.avg_return
    ))
}

/// Best and worst weekday among those with enough samples.
fn weekday_insights(buckets: &[BucketStatistics]) -> Vec<String> {
    let eligible: Vec<&BucketStatistics> = buckets
        .iter()
        .filter(|b| b.sample_size >= WEEKDAY_MIN_SAMPLE)
        .collect();
    if eligible.len() < 2 {
        return Vec::new();
    }
    let best = eligible.iter().max_by(|a, b| a.avg_return.total_cmp(&b.avg_return));
    let worst = eligible.iter().min_by(|a, b| a.avg_return.total_cmp(&b.avg_return));
    match (best, worst) {
        (Some(best), Some(worst)) => vec![
            format!(
                "weekday: best day is {} ({:+.2}% average, {:.0}% win rate)",
                best.label, best.avg_return, best.win_rate
            ),
            format!(
                "weekday: worst day is {} ({:+.2}% average, {:.0}% win rate)",
                worst.label, worst.avg_return, worst.win_rate
            ),
        ],
        _ => Vec::new(),
    }
}

fn is_baseline(label: &str) -> bool {
    EventBucket::ALL.iter().any(|b| b.is_baseline(label))
}
