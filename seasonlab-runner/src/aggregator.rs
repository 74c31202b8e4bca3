//! Pattern aggregator: candles + extractors → bucket statistics + insights.
//!
//! One pass per extractor over the bar-over-bar returns. Return `i` is
//! labelled with the timestamp of the bar that closes it, so a Monday→Tuesday
//! move lands in the Tuesday bucket.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::Datelike;
use rayon::prelude::*;
use thiserror::Error;

use seasonlab_core::calendar::CalendarRuleEngine;
use seasonlab_core::domain::{is_strictly_ascending, Candle, Timeframe};
use seasonlab_core::extract::buckets::natural_rank;
use seasonlab_core::extract::{create_extractor, ExtractError, ExtractorContext, PeriodExtractor};
use seasonlab_core::time::utc_date;

use crate::config::{AnalysisConfig, ConfigError, ConfigId};
use crate::insights::generate_insights;
use crate::patterns::named_pattern_stats;
use crate::result::{AnalysisResult, ExtractorStats, Family};
use crate::stats::{bar_returns, pct_change, BucketStatistics, PeriodBucket};

/// Errors from an analysis run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("extractor error: {0}")]
    Extract(#[from] ExtractError),
    #[error("candles for '{symbol}' are not strictly ascending by timestamp")]
    UnorderedCandles { symbol: String },
}

/// Runs one configured set of extractors over candle series.
#[derive(Debug, Clone)]
pub struct PatternAggregator {
    symbol: String,
    config_id: ConfigId,
    timeframe: Timeframe,
    include_volatility: bool,
    extractors: Vec<PeriodExtractor>,
}

impl PatternAggregator {
    /// Build the calendar and every extractor the config names.
    pub fn new(config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        let calendar = Arc::new(config.build_calendar()?);
        let ctx = ExtractorContext::new(calendar).with_symbol(config.symbol.clone());
        Self::with_context(config, &ctx)
    }

    /// Build extractors over an existing context, sharing its calendar and
    /// scan cache.
    ///
    /// Hourly-granularity extractors are dropped when the config's timeframe
    /// is daily.
    pub fn with_context(config: &AnalysisConfig, ctx: &ExtractorContext) -> Result<Self, AnalysisError> {
        let candidates = config
            .periods
            .iter()
            .map(|p| create_extractor(*p, ctx))
            .chain(config.event_windows.iter().map(|w| PeriodExtractor::Window(ctx.window(w.clone()))));

        let mut extractors = Vec::new();
        for extractor in candidates {
            if extractor.granularity().supports(config.timeframe) {
                extractors.push(extractor);
            } else {
                tracing::warn!(
                    extractor = %extractor.name(),
                    timeframe = ?config.timeframe,
                    "skipping extractor that needs intraday bars"
                );
            }
        }

        Ok(Self {
            symbol: config.symbol.clone(),
            config_id: config.config_id()?,
            timeframe: config.timeframe,
            include_volatility: config.include_volatility,
            extractors,
        })
    }

    pub fn extractors(&self) -> &[PeriodExtractor] {
        &self.extractors
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Analyze one candle series.
    ///
    /// Fewer than two candles yield empty statistics for every extractor.
    pub fn analyze(&self, candles: &[Candle]) -> Result<AnalysisResult, AnalysisError> {
        if !is_strictly_ascending(candles) {
            return Err(AnalysisError::UnorderedCandles {
                symbol: self.symbol.clone(),
            });
        }

        let mut result = AnalysisResult::empty(&self.symbol, self.config_id.clone(), self.timeframe);
        result.bar_count = candles.len();

        let returns = bar_returns(candles);
        result.return_count = returns.iter().filter(|r| r.is_finite()).count();

        for extractor in &self.extractors {
            let buckets = self.bucket_statistics(extractor, candles, &returns)?;
            match extractor {
                PeriodExtractor::Calendar(e) => {
                    let family = Family::from(e.bucket());
                    let mut buckets = buckets;
                    if family == Family::Monthly {
                        apply_month_consistency(&mut buckets, candles);
                    }
                    *result.family_mut(family) = buckets;
                }
                _ => result.event_based.push(ExtractorStats {
                    extractor: extractor.name(),
                    buckets,
                }),
            }
        }

        if returns.is_empty() {
            // Named patterns and insights both need at least one return.
            return Ok(result);
        }

        result.named_patterns = named_pattern_stats(candles, self.include_volatility);
        result.summary = result.summarize();
        result.insights = generate_insights(&result);

        tracing::info!(
            symbol = %self.symbol,
            bars = result.bar_count,
            returns = result.return_count,
            extractors = self.extractors.len(),
            insights = result.insights.len(),
            "analysis complete"
        );
        Ok(result)
    }

    fn bucket_statistics(
        &self,
        extractor: &PeriodExtractor,
        candles: &[Candle],
        returns: &[f64],
    ) -> Result<Vec<BucketStatistics>, AnalysisError> {
        let mut buckets: HashMap<String, PeriodBucket> = HashMap::new();
        for (candle, ret) in candles.iter().skip(1).zip(returns) {
            let Some(label) = extractor.extract(candle.timestamp)? else {
                continue;
            };
            let year = utc_date(candle.timestamp).map_err(ExtractError::from)?.year();
            buckets
                .entry(label)
                .or_insert_with_key(|label| PeriodBucket::new(label.clone()))
                .push(*ret, year);
        }

        let mut stats: Vec<BucketStatistics> = buckets
            .values()
            .map(|b| b.statistics(self.include_volatility))
            .collect();
        stats.sort_by(|a, b| bucket_order(&a.label).cmp(&bucket_order(&b.label)));
        Ok(stats)
    }
}

/// Sort key: calendar names in calendar order, window offsets numerically,
/// everything else by label.
fn bucket_order(label: &str) -> (u8, i64, &str) {
    if let Some(rank) = natural_rank(label) {
        return (0, rank as i64, label);
    }
    if let Some(offset) = window_offset(label) {
        return (1, offset, label);
    }
    (2, 0, label)
}

/// Offset of a `"{prefix}-T{+|-}{n}"` label.
fn window_offset(label: &str) -> Option<i64> {
    let (_, tail) = label.rsplit_once("-T")?;
    if !tail.starts_with(['+', '-']) {
        return None;
    }
    tail.parse().ok()
}

/// Percentage of (month, year) pairs whose first→last close rose.
fn apply_month_consistency(buckets: &mut [BucketStatistics], candles: &[Candle]) {
    // (year, month0) -> (first close, last close)
    let mut spans: BTreeMap<(i32, u32), (f64, f64)> = BTreeMap::new();
    for candle in candles {
        let Some(date) = candle.utc_date() else {
            continue;
        };
        spans
            .entry((date.year(), date.month0()))
            .and_modify(|span| span.1 = candle.close)
            .or_insert((candle.close, candle.close));
    }

    let mut per_month: [(usize, usize); 12] = [(0, 0); 12];
    for ((_, month0), (first, last)) in &spans {
        let slot = &mut per_month[*month0 as usize];
        slot.0 += 1;
        if pct_change(*first, *last) > 0.0 {
            slot.1 += 1;
        }
    }

    for bucket in buckets.iter_mut() {
        let Some(month0) = natural_rank(&bucket.label).filter(|r| *r < 12) else {
            continue;
        };
        let (pairs, positive) = per_month[month0];
        if pairs > 0 {
            bucket.consistency = Some(positive as f64 / pairs as f64 * 100.0);
        }
    }
}

/// Analyze several symbols in parallel with one shared calendar.
///
/// Each entry's symbol replaces `config.symbol`. Window scans are cached per
/// symbol in a single shared cache.
pub fn analyze_many(
    config: &AnalysisConfig,
    inputs: &[(String, Vec<Candle>)],
) -> Result<Vec<AnalysisResult>, AnalysisError> {
    config.validate()?;
    let calendar: Arc<CalendarRuleEngine> = Arc::new(config.build_calendar()?);
    let base = ExtractorContext::new(calendar);

    inputs
        .par_iter()
        .map(|(symbol, candles)| {
            let mut symbol_config = config.clone();
            symbol_config.symbol = symbol.clone();
            let ctx = base.clone().with_symbol(symbol.clone());
            PatternAggregator::with_context(&symbol_config, &ctx)?.analyze(candles)
        })
        .collect()
}
