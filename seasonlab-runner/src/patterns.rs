//! Named seasonal patterns over daily returns.
//!
//! Each pattern is a date filter; its statistics are the average and win
//! rate of the daily returns that fall inside the filter. Intraday input is
//! first collapsed to the last close of each UTC day.

use chrono::{Datelike, NaiveDate};

use seasonlab_core::domain::Candle;

use crate::stats::{pct_change, BucketStatistics, PeriodBucket};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedPattern {
    /// December 24 through December 31.
    SantaRally,
    /// May through October.
    SellInMay,
    /// January.
    JanuaryEffect,
}

impl NamedPattern {
    pub const ALL: [NamedPattern; 3] = [
        NamedPattern::SantaRally,
        NamedPattern::SellInMay,
        NamedPattern::JanuaryEffect,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            NamedPattern::SantaRally => "Santa Rally",
            NamedPattern::SellInMay => "Sell in May",
            NamedPattern::JanuaryEffect => "January Effect",
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match self {
            NamedPattern::SantaRally => date.month() == 12 && date.day() >= 24,
            NamedPattern::SellInMay => (5..=10).contains(&date.month()),
            NamedPattern::JanuaryEffect => date.month() == 1,
        }
    }
}

/// Last close of every UTC day, in input order.
pub fn daily_closes(candles: &[Candle]) -> Vec<(NaiveDate, f64)> {
    let mut out: Vec<(NaiveDate, f64)> = Vec::new();
    for candle in candles {
        let Some(date) = candle.utc_date() else {
            continue;
        };
        match out.last_mut() {
            Some((last, close)) if *last == date => *close = candle.close,
            _ => out.push((date, candle.close)),
        }
    }
    out
}

/// Day-over-day returns, each dated by the later day.
pub fn daily_returns(candles: &[Candle]) -> Vec<(NaiveDate, f64)> {
    daily_closes(candles)
        .windows(2)
        .map(|w| (w[1].0, pct_change(w[0].1, w[1].1)))
        .collect()
}

/// Statistics for every named pattern, in [`NamedPattern::ALL`] order.
pub fn named_pattern_stats(candles: &[Candle], include_volatility: bool) -> Vec<BucketStatistics> {
    let returns = daily_returns(candles);
    NamedPattern::ALL
        .iter()
        .map(|pattern| {
            let mut bucket = PeriodBucket::new(pattern.label());
            for (date, ret) in returns.iter().filter(|(d, _)| pattern.contains(*d)) {
                bucket.push(*ret, date.year());
            }
            bucket.statistics(include_volatility)
        })
        .collect()
}
