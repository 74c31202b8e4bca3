//! SeasonLab Runner: analysis configuration, aggregation, and insights.
//!
//! This crate builds on `seasonlab-core` to provide:
//! - TOML analysis configuration with a content-hash id
//! - Bar-over-bar return bucketing for every configured extractor
//! - Bucket statistics (average, win rate, volatility, month consistency)
//! - Named seasonal patterns and rule-based insights
//! - Parallel multi-symbol analysis

pub mod aggregator;
pub mod config;
pub mod insights;
pub mod patterns;
pub mod result;
pub mod stats;

pub use aggregator::{analyze_many, AnalysisError, PatternAggregator};
pub use config::{AnalysisConfig, ConfigError, ConfigId};
pub use insights::generate_insights;
pub use patterns::NamedPattern;
pub use result::{AnalysisResult, BucketExtreme, ExtractorStats, Family, FamilySummary};
pub use stats::{BucketStatistics, PeriodBucket};
