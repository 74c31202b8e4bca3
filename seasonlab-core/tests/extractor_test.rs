//! Integration tests for event windows, combined weeks and the dividend hook.

use chrono::{Duration, NaiveDate};
use std::sync::Arc;

use seasonlab_core::calendar::{CalendarOverrides, CalendarRuleEngine, CustomEventSpec};
use seasonlab_core::domain::{CentralBank, EventType, Impact};
use seasonlab_core::extract::{
    create_extractor, explain_dividend_window, CombinationType, CombinedEventExtractor,
    DividendError, EventWindowConfig, ExDividendSource, ExtractorContext, ImpactTier, PeriodType,
    PRIORITY,
};
use seasonlab_core::time::date_to_millis;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn ctx() -> ExtractorContext {
    ExtractorContext::new(Arc::new(CalendarRuleEngine::builtin().unwrap()))
}

/// The `n`-th trading day after `from`.
fn trading_days_after(engine: &CalendarRuleEngine, from: NaiveDate, n: u32) -> NaiveDate {
    let mut day = from;
    let mut count = 0;
    while count < n {
        day += Duration::days(1);
        if engine.is_trading_day(day) {
            count += 1;
        }
    }
    day
}

// ── Event windows ────────────────────────────────────────────────────

#[test]
fn fomc_window_t0_tn_and_beyond_for_every_meeting() {
    let ctx = ctx();
    let engine = ctx.calendar.clone();
    let window = ctx.window(EventWindowConfig::fomc());
    ctx.window(EventWindowConfig::fomc())
        .prewarm(2021..=2026)
        .unwrap();

    let meetings: Vec<NaiveDate> = engine
        .meeting_dates(CentralBank::Fed)
        .filter(|m| *m >= d(2022, 1, 1) && *m <= d(2025, 12, 31))
        .collect();
    for meeting in meetings {
        let at = |date: NaiveDate| window.extract(date_to_millis(date)).unwrap();
        assert_eq!(at(meeting).as_deref(), Some("FOMC-T+0"), "{meeting}");

        let t5 = trading_days_after(&engine, meeting, 5);
        assert_eq!(at(t5).as_deref(), Some("FOMC-T+5"), "{meeting}");

        let t6 = trading_days_after(&engine, meeting, 6);
        assert_eq!(at(t6), None, "{meeting}");
    }
}

#[test]
fn cpi_and_nfp_windows_use_their_release_rules() {
    let ctx = ctx();
    let cpi = create_extractor(PeriodType::CpiWindow, &ctx);
    let nfp = create_extractor(PeriodType::NfpWindow, &ctx);
    // CPI Wed 2024-03-13, NFP Fri 2024-03-08 is not a release (Mar 1 is).
    assert_eq!(
        cpi.extract(date_to_millis(d(2024, 3, 13))).unwrap().as_deref(),
        Some("CPI-T+0")
    );
    assert_eq!(
        cpi.extract(date_to_millis(d(2024, 3, 8))).unwrap().as_deref(),
        Some("CPI-T-3")
    );
    assert_eq!(
        nfp.extract(date_to_millis(d(2024, 3, 8))).unwrap().as_deref(),
        Some("NFP-T+5")
    );
    assert_eq!(
        nfp.extract(date_to_millis(d(2024, 2, 27))).unwrap().as_deref(),
        Some("NFP-T-3")
    );
}

#[test]
fn windows_share_the_context_cache() {
    let ctx = ctx().with_symbol("SPY");
    assert!(ctx.window_cache.is_empty());
    let a = create_extractor(PeriodType::FomcWindow, &ctx);
    let b = create_extractor(PeriodType::FomcWindow, &ctx);
    a.extract(date_to_millis(d(2024, 5, 1))).unwrap();
    let after_first = ctx.window_cache.len();
    b.extract(date_to_millis(d(2024, 8, 1))).unwrap();
    assert_eq!(ctx.window_cache.len(), after_first);
}

// ── Combined weeks ───────────────────────────────────────────────────

#[test]
fn election_plus_fomc_week() {
    let ex = create_extractor(PeriodType::CombinedEvents, &ctx());
    for day in 4..=10 {
        assert_eq!(
            ex.extract(date_to_millis(d(2024, 11, day))).unwrap().as_deref(),
            Some("Election+FOMC-Week"),
            "2024-11-{day:02}"
        );
    }
}

#[test]
fn three_high_impact_events_escalate_to_multiple() {
    // Week of 2024-01-29: GDP advance Tue, FOMC Wed, payrolls Fri 02-02.
    let ex = CombinedEventExtractor::new(Arc::new(CalendarRuleEngine::builtin().unwrap()));
    let combo = ex.detect(d(2024, 1, 31)).unwrap().unwrap();
    assert_eq!(combo.combination_type, CombinationType::MultipleHighImpact);
    assert_eq!(combo.tier, ImpactTier::Extreme);
    assert_eq!(combo.multiplier, 2.5);
    assert!(combo.events.iter().filter(|e| e.impact == Impact::High).count() >= 3);
}

#[test]
fn fomc_and_triple_witching_share_a_week() {
    // Week of 2024-09-16: FOMC Wed 09-18, triple witching Fri 09-20. CPI was 09-11.
    let ex = CombinedEventExtractor::new(Arc::new(CalendarRuleEngine::builtin().unwrap()));
    let combo = ex.detect(d(2024, 9, 16)).unwrap().unwrap();
    assert_eq!(combo.combination_type, CombinationType::FomcTripleWitching);
}

fn custom(date: &str, name: &str, event_type: EventType, impact: Impact) -> CustomEventSpec {
    CustomEventSpec {
        date: date.into(),
        name: name.into(),
        event_type,
        impact,
        description: String::new(),
    }
}

#[test]
fn every_combination_fires_in_some_week_2021_to_2026() {
    use CombinationType as C;
    // Rule-derived CPI and payrolls never share a week, and triple witching
    // never falls inside an earnings season. Those pairings come from
    // rescheduled releases or company reports supplied as custom events.
    let cases: Vec<(CombinationType, NaiveDate, Vec<CustomEventSpec>)> = vec![
        (C::MultipleHighImpact, d(2024, 1, 29), vec![]),
        (C::ElectionFomc, d(2024, 11, 4), vec![]),
        (C::ElectionCpi, d(2022, 11, 7), vec![]),
        (C::ElectionNfp, d(2026, 11, 2), vec![]),
        (C::FomcTripleWitching, d(2024, 9, 16), vec![]),
        (
            C::FomcNfp,
            d(2021, 1, 25),
            vec![custom("2021-01-29", "Delayed payrolls report", EventType::Nfp, Impact::High)],
        ),
        (C::FomcCpi, d(2024, 6, 10), vec![]),
        (
            C::CpiNfp,
            d(2021, 1, 11),
            vec![custom("2021-01-15", "Delayed payrolls report", EventType::Nfp, Impact::High)],
        ),
        (
            C::TripleWitchingEarnings,
            d(2024, 6, 17),
            vec![custom("2024-06-18", "ACME quarterly results", EventType::EarningsSeason, Impact::Medium)],
        ),
        (C::FomcGdp, d(2021, 4, 26), vec![]),
        (C::FomcEarnings, d(2022, 1, 24), vec![]),
        (
            C::FomcOptionsExpiry,
            d(2021, 2, 15),
            vec![custom("2021-02-17", "Unscheduled FOMC meeting", EventType::Fomc, Impact::High)],
        ),
        (
            C::GdpCpi,
            d(2021, 1, 11),
            vec![custom("2021-01-14", "Delayed GDP estimate", EventType::GdpRelease, Impact::High)],
        ),
        (C::CpiEarnings, d(2021, 1, 11), vec![]),
        (C::NfpEarnings, d(2021, 2, 1), vec![]),
        (
            C::GdpEarnings,
            d(2021, 1, 4),
            vec![custom("2021-01-07", "Delayed GDP estimate", EventType::GdpRelease, Impact::Medium)],
        ),
        (
            C::IndexRebalancingEarnings,
            d(2024, 6, 24),
            vec![custom("2024-06-27", "ACME quarterly results", EventType::EarningsSeason, Impact::Medium)],
        ),
    ];

    let mut expected: Vec<CombinationType> = PRIORITY.iter().map(|(_, _, c)| *c).collect();
    expected.push(C::MultipleHighImpact);
    for combination in &expected {
        assert!(cases.iter().any(|(c, _, _)| c == combination), "{combination}");
    }

    for (combination, monday, custom_events) in cases {
        let overrides = CalendarOverrides {
            custom_events,
            ..Default::default()
        };
        let ex = CombinedEventExtractor::new(Arc::new(CalendarRuleEngine::new(&overrides).unwrap()));
        let detected = ex.detect(monday).unwrap().map(|c| c.combination_type);
        assert_eq!(detected, Some(combination), "week of {monday}");
    }
}

#[test]
fn custom_high_impact_events_take_part() {
    let overrides = CalendarOverrides {
        custom_events: vec![
            CustomEventSpec {
                date: "2025-08-05".into(),
                name: "Tariff deadline".into(),
                event_type: EventType::Political,
                impact: Impact::High,
                description: String::new(),
            },
            CustomEventSpec {
                date: "2025-08-06".into(),
                name: "Treasury refunding".into(),
                event_type: EventType::Economic,
                impact: Impact::High,
                description: String::new(),
            },
        ],
        ..Default::default()
    };
    let ex = CombinedEventExtractor::new(Arc::new(CalendarRuleEngine::new(&overrides).unwrap()));
    // Week of 2025-08-04 also holds the BoE decision (medium) and earnings
    // season. Two uncategorized high events pair with nothing.
    assert!(ex.detect(d(2025, 8, 4)).unwrap().is_none());

    let mut overrides = overrides;
    overrides.custom_events.push(CustomEventSpec {
        date: "2025-08-07".into(),
        name: "Jackson Hole preview".into(),
        event_type: EventType::Custom,
        impact: Impact::High,
        description: String::new(),
    });
    let ex = CombinedEventExtractor::new(Arc::new(CalendarRuleEngine::new(&overrides).unwrap()));
    let combo = ex.detect(d(2025, 8, 4)).unwrap().unwrap();
    assert_eq!(combo.combination_type, CombinationType::MultipleHighImpact);
}

#[test]
fn quiet_week_has_no_combination() {
    // 2024-08-26..09-01: no macro releases, outside earnings season.
    let ex = CombinedEventExtractor::new(Arc::new(CalendarRuleEngine::builtin().unwrap()));
    assert!(ex.detect(d(2024, 8, 28)).unwrap().is_none());
}

// ── Dividend explainer ───────────────────────────────────────────────

struct FixedDividends {
    symbol: &'static str,
    dates: Vec<NaiveDate>,
}

impl ExDividendSource for FixedDividends {
    async fn ex_dividend_dates(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>, DividendError> {
        if symbol != self.symbol {
            return Err(DividendError::UnknownSymbol(symbol.to_string()));
        }
        Ok(self
            .dates
            .iter()
            .copied()
            .filter(|x| *x >= from && *x <= to)
            .collect())
    }
}

#[tokio::test]
async fn dividend_window_labels_nearest_ex_date() {
    let source = FixedDividends {
        symbol: "SPY",
        dates: vec![d(2024, 3, 15), d(2024, 6, 21)],
    };
    let label = explain_dividend_window(&source, "SPY", d(2024, 3, 15)).await.unwrap();
    assert_eq!(label.as_deref(), Some("ExDiv-T+0"));
    let label = explain_dividend_window(&source, "SPY", d(2024, 3, 12)).await.unwrap();
    assert_eq!(label.as_deref(), Some("ExDiv-T-3"));
    let label = explain_dividend_window(&source, "SPY", d(2024, 4, 15)).await.unwrap();
    assert_eq!(label, None);
}

#[tokio::test]
async fn dividend_source_errors_propagate() {
    let source = FixedDividends {
        symbol: "SPY",
        dates: vec![],
    };
    let err = explain_dividend_window(&source, "QQQ", d(2024, 3, 15)).await.unwrap_err();
    assert_eq!(err, DividendError::UnknownSymbol("QQQ".into()));
    let err = explain_dividend_window(&source, "SPY", NaiveDate::MAX).await.unwrap_err();
    assert_eq!(err, DividendError::OutOfRange(NaiveDate::MAX));
}
