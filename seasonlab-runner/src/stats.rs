//! Bucket statistics: pure functions over labelled returns.
//!
//! Returns are percentages. Non-finite returns stay in their bucket (the
//! label and year still count) but never reach a statistic.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use seasonlab_core::domain::Candle;

/// Summary of one bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketStatistics {
    pub label: String,
    /// Mean of finite returns, in percent.
    pub avg_return: f64,
    /// Share of finite returns strictly above zero, in percent.
    pub win_rate: f64,
    /// Number of finite returns.
    pub sample_size: usize,
    /// Population standard deviation, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volatility: Option<f64>,
    /// Calendar years that contributed at least one observation.
    pub years: Vec<i32>,
    /// Month buckets only: % of (month, year) pairs with a positive first→last close.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consistency: Option<f64>,
}

/// Returns collected under one label during a single extractor pass.
#[derive(Debug, Clone, Default)]
pub struct PeriodBucket {
    pub label: String,
    pub returns: Vec<f64>,
    pub years: BTreeSet<i32>,
}

impl PeriodBucket {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn push(&mut self, ret: f64, year: i32) {
        self.returns.push(ret);
        self.years.insert(year);
    }

    pub fn statistics(&self, include_volatility: bool) -> BucketStatistics {
        let finite: Vec<f64> = self.returns.iter().copied().filter(|r| r.is_finite()).collect();
        BucketStatistics {
            label: self.label.clone(),
            avg_return: mean(&finite),
            win_rate: win_rate(&finite),
            sample_size: finite.len(),
            volatility: include_volatility.then(|| population_std_dev(&finite)),
            years: self.years.iter().copied().collect(),
            consistency: None,
        }
    }
}

// ─── Return series ───────────────────────────────────────────────────

/// Percentage change from `from` to `to`; NaN when `from` is not a usable base.
pub fn pct_change(from: f64, to: f64) -> f64 {
    if !from.is_finite() || from == 0.0 {
        return f64::NAN;
    }
    (to - from) / from * 100.0
}

/// Bar-over-bar close returns, one per candle after the first.
///
/// Element `i` belongs to `candles[i + 1]`.
pub fn bar_returns(candles: &[Candle]) -> Vec<f64> {
    candles
        .windows(2)
        .map(|w| pct_change(w[0].close, w[1].close))
        .collect()
}

// ─── Scalar helpers ──────────────────────────────────────────────────

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Standard deviation with an `n` denominator.
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

pub fn win_rate(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().filter(|r| **r > 0.0).count() as f64 / values.len() as f64 * 100.0
}
