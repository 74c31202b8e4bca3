//! Integration tests for the calendar rule engine and time context.

use chrono::{Datelike, NaiveDate, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::America::New_York;
use std::collections::BTreeMap;

use seasonlab_core::calendar::{CalendarOverrides, CalendarRuleEngine, CustomEventSpec, MeetingDateOverrides};
use seasonlab_core::domain::{CentralBank, EventType, Impact};
use seasonlab_core::time::TimeContext;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn engine() -> CalendarRuleEngine {
    CalendarRuleEngine::builtin().unwrap()
}

fn days(from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    from.iter_days().take_while(move |x| *x <= to)
}

// ── Registered dates produce events ──────────────────────────────────

#[test]
fn every_meeting_date_has_an_event_on_that_date() {
    let e = engine();
    for bank in CentralBank::ALL {
        let dates: Vec<NaiveDate> = e.meeting_dates(bank).collect();
        assert!(!dates.is_empty(), "{bank:?}");
        for date in dates {
            let events = e.events_for_date(date).unwrap();
            assert!(
                events.iter().any(|ev| ev.date == date && ev.event_type == bank.event_type()),
                "{bank:?} {date}"
            );
        }
    }
}

#[test]
fn every_computed_high_or_medium_date_has_an_event() {
    let e = engine();
    for date in days(d(2024, 1, 1), d(2026, 12, 31)) {
        let flagged = e.is_cpi_release_day(date).unwrap()
            || e.is_nfp_release_day(date).unwrap()
            || e.is_ism_release_day(date).unwrap()
            || e.is_options_expiry_day(date).unwrap()
            || e.is_gdp_release_day(date).unwrap()
            || e.is_index_rebalancing_day(date).unwrap()
            || e.is_election_day(date);
        if flagged {
            let events = e.events_for_date(date).unwrap();
            assert!(
                events.iter().any(|ev| ev.date == date && ev.impact.is_material()),
                "{date}"
            );
        }
    }
}

// ── Rule families ────────────────────────────────────────────────────

#[test]
fn ism_release_dates_2025() {
    let e = engine();
    assert!(e.is_ism_release_day(d(2025, 1, 2)).unwrap());
    assert!(!e.is_ism_release_day(d(2025, 1, 1)).unwrap());
    assert!(e.is_ism_release_day(d(2025, 9, 2)).unwrap());
    assert!(!e.is_ism_release_day(d(2025, 9, 1)).unwrap());
}

#[test]
fn triple_witching_fires_once_on_third_friday_of_quarter_months() {
    let e = engine();
    let mut hits: BTreeMap<(i32, u32), Vec<NaiveDate>> = BTreeMap::new();
    for date in days(d(2024, 1, 1), d(2026, 12, 31)) {
        if e.is_triple_witching_day(date).unwrap() {
            assert_eq!(date.weekday(), Weekday::Fri, "{date}");
            assert!((15..=21).contains(&date.day()), "{date}");
            hits.entry((date.year(), date.month())).or_default().push(date);
        }
    }
    let expected: Vec<(i32, u32)> = (2024..=2026)
        .flat_map(|y| [3, 6, 9, 12].map(|m| (y, m)))
        .collect();
    assert_eq!(hits.keys().copied().collect::<Vec<_>>(), expected);
    assert!(hits.values().all(|v| v.len() == 1), "{hits:?}");
}

#[test]
fn triple_witching_stays_on_a_holiday_third_friday() {
    let e = engine();
    // Juneteenth 2026 is the third Friday of June.
    assert!(e.is_market_holiday(d(2026, 6, 19)));
    assert!(e.is_triple_witching_day(d(2026, 6, 19)).unwrap());
    assert!(!e.is_triple_witching_day(d(2026, 6, 18)).unwrap());
    // The quarterly expiry is the triple-witching day, not a Thursday monthly one.
    assert!(e.is_options_expiry_day(d(2026, 6, 19)).unwrap());
    assert!(!e.is_options_expiry_day(d(2026, 6, 18)).unwrap());
    let names: Vec<String> = e
        .events_for_date(d(2026, 6, 19))
        .unwrap()
        .into_iter()
        .map(|ev| ev.name)
        .collect();
    assert!(names.iter().any(|n| n == "Triple Witching"), "{names:?}");
    assert!(names.iter().any(|n| n == "Juneteenth"), "{names:?}");
    let thursday = e.events_for_date(d(2026, 6, 18)).unwrap();
    assert!(thursday.iter().all(|ev| ev.event_type != EventType::OptionsExpiry));
}

#[test]
fn options_expiry_once_a_month() {
    let e = engine();
    let mut per_month: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    for date in days(d(2024, 1, 1), d(2026, 12, 31)) {
        if e.is_options_expiry_day(date).unwrap() {
            *per_month.entry((date.year(), date.month())).or_default() += 1;
        }
    }
    assert_eq!(per_month.len(), 36);
    assert!(per_month.values().all(|n| *n == 1), "{per_month:?}");
}

#[test]
fn eight_meetings_each_year_for_each_bank() {
    let e = engine();
    for bank in CentralBank::ALL {
        for year in 2023..=2026 {
            let n = e.meeting_dates(bank).filter(|m| m.year() == year).count();
            assert_eq!(n, 8, "{bank:?} {year}");
        }
    }
}

#[test]
fn events_in_range_is_date_ordered() {
    let events = engine().events_in_range(d(2024, 3, 1), d(2024, 3, 31)).unwrap();
    assert!(events.windows(2).all(|w| w[0].date <= w[1].date));
    assert!(events.iter().any(|e| e.event_type == EventType::Fomc));
    assert!(events.iter().any(|e| e.event_type == EventType::TripleWitching));
    assert!(events.iter().any(|e| e.name == "Good Friday"));
}

#[test]
fn overrides_and_custom_events_flow_through() {
    let overrides = CalendarOverrides {
        meeting_dates: MeetingDateOverrides {
            boj: Some(vec!["2027-01-22".into()]),
            ..Default::default()
        },
        custom_events: vec![CustomEventSpec {
            date: "2027-01-20".into(),
            name: "Inauguration".into(),
            event_type: EventType::Political,
            impact: Impact::Medium,
            description: "Presidential inauguration".into(),
        }],
    };
    let e = CalendarRuleEngine::new(&overrides).unwrap();
    assert_eq!(e.meeting_dates(CentralBank::Boj).collect::<Vec<_>>(), vec![d(2027, 1, 22)]);
    let events = e.events_in_week(d(2027, 1, 20)).unwrap();
    assert!(events.iter().any(|ev| ev.name == "Inauguration"));
    assert!(events.iter().any(|ev| ev.event_type == EventType::Boj));
}

// ── DST cross-check against the IANA zone ────────────────────────────

#[test]
fn computed_eastern_hour_matches_iana_new_york() {
    let ctx = TimeContext::default();
    let start = Utc.with_ymd_and_hms(2010, 1, 1, 0, 0, 0).unwrap().timestamp_millis();
    let end = Utc.with_ymd_and_hms(2031, 1, 1, 0, 0, 0).unwrap().timestamp_millis();
    // Every 7 hours for two decades hits every hour of day and both transitions.
    let step = 7 * 3_600_000;
    let mut ts = start;
    while ts < end {
        let expected = Utc
            .timestamp_millis_opt(ts)
            .unwrap()
            .with_timezone(&New_York);
        assert_eq!(ctx.eastern_hour(ts).unwrap(), expected.hour(), "ts={ts}");
        assert_eq!(ctx.eastern_date(ts).unwrap(), expected.date_naive(), "ts={ts}");
        ts += step;
    }
}

#[test]
fn transition_instants_match_iana_new_york() {
    let ctx = TimeContext::default();
    for year in 2015..=2030 {
        let (start, end) = ctx.dst_rule().transition_dates(year).unwrap();
        // 06:59 UTC / 07:00 UTC on the March transition day.
        let before = start.and_hms_opt(6, 59, 0).unwrap().and_utc().timestamp_millis();
        let after = start.and_hms_opt(7, 0, 0).unwrap().and_utc().timestamp_millis();
        for ts in [before, after] {
            let ny = Utc.timestamp_millis_opt(ts).unwrap().with_timezone(&New_York);
            assert_eq!(ctx.eastern_hour(ts).unwrap(), ny.hour(), "{year} start");
        }
        // 05:59 UTC / 06:00 UTC on the November transition day.
        let before = end.and_hms_opt(5, 59, 0).unwrap().and_utc().timestamp_millis();
        let after = end.and_hms_opt(6, 0, 0).unwrap().and_utc().timestamp_millis();
        for ts in [before, after] {
            let ny = Utc.timestamp_millis_opt(ts).unwrap().with_timezone(&New_York);
            assert_eq!(ctx.eastern_hour(ts).unwrap(), ny.hour(), "{year} end");
        }
    }
}
