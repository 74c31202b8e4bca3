//! Criterion benchmarks for SeasonLab core hot paths.
//!
//! Benchmarks:
//! 1. Calendar queries (events_for_date, week predicates)
//! 2. Event-window scan (cold cache vs warm cache)
//! 3. Combined-event detection over a year of weeks
//! 4. Calendar bucket labelling over hourly timestamps

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;

use seasonlab_core::calendar::CalendarRuleEngine;
use seasonlab_core::extract::{
    create_extractor, CombinedEventExtractor, EventWindowConfig, ExtractorContext, PeriodType,
};
use seasonlab_core::time::date_to_millis;

// ── Helpers ──────────────────────────────────────────────────────────

fn engine() -> Arc<CalendarRuleEngine> {
    Arc::new(CalendarRuleEngine::builtin().unwrap())
}

fn daily_timestamps(n: usize) -> Vec<i64> {
    let base = chrono::NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
    (0..n)
        .map(|i| date_to_millis(base + chrono::Duration::days(i as i64)))
        .collect()
}

fn hourly_timestamps(n: usize) -> Vec<i64> {
    let base = date_to_millis(chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    (0..n as i64).map(|i| base + i * 3_600_000).collect()
}

// ── 1. Calendar queries ──────────────────────────────────────────────

fn bench_calendar_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("calendar_queries");
    let engine = engine();
    let dates: Vec<_> = (0..365)
        .map(|i| chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i))
        .collect();

    group.bench_function("events_for_date_365", |b| {
        b.iter(|| {
            for d in &dates {
                black_box(engine.events_for_date(*d).unwrap());
            }
        });
    });

    group.bench_function("week_predicates_365", |b| {
        b.iter(|| {
            for d in &dates {
                black_box(engine.is_fomc_week(*d));
                black_box(engine.is_options_expiry_week(*d).unwrap());
                black_box(engine.is_triple_witching_week(*d).unwrap());
            }
        });
    });

    group.finish();
}

// ── 2. Event-window scan ─────────────────────────────────────────────

fn bench_event_window(c: &mut Criterion) {
    let mut group = c.benchmark_group("event_window");
    let engine = engine();

    for (name, config) in [
        ("fomc", EventWindowConfig::fomc()),
        ("cpi", EventWindowConfig::cpi()),
        ("opex", EventWindowConfig::options_expiry()),
    ] {
        group.bench_with_input(BenchmarkId::new("cold_scan", name), &config, |b, config| {
            b.iter(|| {
                let ctx = ExtractorContext::new(engine.clone());
                let ex = ctx.window(config.clone());
                black_box(ex.candidates(2024).unwrap());
            });
        });
    }

    let ctx = ExtractorContext::new(engine.clone());
    let ex = ctx.window(EventWindowConfig::fomc());
    ex.prewarm(2021..=2026).unwrap();
    let ts = daily_timestamps(1000);
    group.bench_function("warm_extract_1000_days", |b| {
        b.iter(|| {
            for t in &ts {
                black_box(ex.extract(*t).unwrap());
            }
        });
    });

    group.finish();
}

// ── 3. Combined events ───────────────────────────────────────────────

fn bench_combined(c: &mut Criterion) {
    let ex = CombinedEventExtractor::new(engine());
    let mondays: Vec<_> = (0..52)
        .map(|w| chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::weeks(w))
        .collect();
    c.bench_function("combined_detect_52_weeks", |b| {
        b.iter(|| {
            for m in &mondays {
                black_box(ex.detect(*m).unwrap());
            }
        });
    });
}

// ── 4. Calendar buckets ──────────────────────────────────────────────

fn bench_buckets(c: &mut Criterion) {
    let mut group = c.benchmark_group("calendar_buckets");
    let ctx = ExtractorContext::new(engine());
    let ts = hourly_timestamps(24 * 252);

    for period in [PeriodType::HourOfDay, PeriodType::MarketSession, PeriodType::WeekPosition] {
        let ex = create_extractor(period, &ctx);
        group.bench_with_input(BenchmarkId::new("label", ex.name()), &ts, |b, ts| {
            b.iter(|| {
                for t in ts {
                    black_box(ex.extract(*t).unwrap());
                }
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_calendar_queries,
    bench_event_window,
    bench_combined,
    bench_buckets,
);
criterion_main!(benches);
