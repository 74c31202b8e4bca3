//! Computed calendar rule families.
//!
//! Every function is a pure function of (year, month) or a date. Release-day
//! rules are "business-day adjusted": when the nominal date is a weekend or a
//! US market holiday it moves to the nearest business day in the direction
//! the publisher uses. The adjustment walk is bounded; exceeding the bound is
//! an invariant violation, not a data condition.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::CalendarError;
use crate::time::{is_weekend, last_weekday_of_month, nth_weekday_of_month, shift_days};

/// Maximum number of single-day steps any business-day walk may take.
pub const BUSINESS_DAY_WALK_LIMIT: u32 = 31;

/// Length of an earnings season window, counted from its kickoff date.
pub const EARNINGS_SEASON_DAYS: i64 = 35;

/// Months whose third Friday is a triple-witching day.
pub const QUARTERLY_EXPIRY_MONTHS: [u32; 4] = [3, 6, 9, 12];

// ─── Holidays ────────────────────────────────────────────────────────

/// A US market holiday (observed date).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: &'static str,
}

/// Easter Sunday (Gregorian), anonymous computus.
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15).rem_euclid(30);
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k).rem_euclid(7);
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

/// Saturday holidays are observed on Friday, Sunday holidays on Monday.
fn observed(date: NaiveDate) -> Option<NaiveDate> {
    match date.weekday() {
        Weekday::Sat => date.pred_opt(),
        Weekday::Sun => date.succ_opt(),
        _ => Some(date),
    }
}

/// Observed US market holidays for `year`, in calendar order.
///
/// New Year's Day falling on a Saturday is not observed (the exchange stays
/// open on the preceding Dec 31). Juneteenth is observed from 2022.
pub fn us_market_holidays(year: i32) -> Vec<Holiday> {
    let mut out = Vec::with_capacity(10);
    let mut push = |date: Option<NaiveDate>, name: &'static str| {
        if let Some(date) = date {
            out.push(Holiday { date, name });
        }
    };

    let new_year = NaiveDate::from_ymd_opt(year, 1, 1);
    push(
        new_year.filter(|d| d.weekday() != Weekday::Sat).and_then(observed),
        "New Year's Day",
    );
    push(nth_weekday_of_month(year, 1, Weekday::Mon, 3), "Martin Luther King Jr. Day");
    push(nth_weekday_of_month(year, 2, Weekday::Mon, 3), "Presidents' Day");
    push(
        easter_sunday(year).and_then(|e| e.checked_sub_signed(Duration::days(2))),
        "Good Friday",
    );
    push(last_weekday_of_month(year, 5, Weekday::Mon), "Memorial Day");
    if year >= 2022 {
        push(NaiveDate::from_ymd_opt(year, 6, 19).and_then(observed), "Juneteenth");
    }
    push(NaiveDate::from_ymd_opt(year, 7, 4).and_then(observed), "Independence Day");
    push(nth_weekday_of_month(year, 9, Weekday::Mon, 1), "Labor Day");
    push(nth_weekday_of_month(year, 11, Weekday::Thu, 4), "Thanksgiving Day");
    push(NaiveDate::from_ymd_opt(year, 12, 25).and_then(observed), "Christmas Day");

    out.sort_by_key(|h| h.date);
    out
}

/// Name of the market holiday observed on `date`, if any.
pub fn holiday_name(date: NaiveDate) -> Option<&'static str> {
    us_market_holidays(date.year())
        .into_iter()
        .find(|h| h.date == date)
        .map(|h| h.name)
}

pub fn is_market_holiday(date: NaiveDate) -> bool {
    holiday_name(date).is_some()
}

/// Neither a weekend nor a market holiday.
pub fn is_trading_day(date: NaiveDate) -> bool {
    !is_weekend(date) && !is_market_holiday(date)
}

// ─── Business-day adjustment ─────────────────────────────────────────

/// Direction of a business-day adjustment walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkDirection {
    Forward,
    Backward,
}

/// Move `date` to the nearest trading day in `direction` (inclusive).
pub fn adjust_to_business_day(
    date: NaiveDate,
    direction: WalkDirection,
) -> Result<NaiveDate, CalendarError> {
    let mut current = date;
    for _ in 0..BUSINESS_DAY_WALK_LIMIT {
        if is_trading_day(current) {
            return Ok(current);
        }
        let next = match direction {
            WalkDirection::Forward => current.succ_opt(),
            WalkDirection::Backward => current.pred_opt(),
        };
        current = next.ok_or(CalendarError::DateOverflow(current))?;
    }
    Err(CalendarError::BusinessDayWalkExceeded {
        start: date,
        limit: BUSINESS_DAY_WALK_LIMIT,
    })
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate, CalendarError> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(CalendarError::InvalidMonth { year, month })
}

fn nth_friday(year: i32, month: u32, n: u8) -> Result<NaiveDate, CalendarError> {
    nth_weekday_of_month(year, month, Weekday::Fri, n).ok_or(CalendarError::InvalidMonth { year, month })
}

// ─── Monthly release rules ───────────────────────────────────────────

/// First business day of the month (ISM manufacturing release).
pub fn first_business_day(year: i32, month: u32) -> Result<NaiveDate, CalendarError> {
    adjust_to_business_day(first_of_month(year, month)?, WalkDirection::Forward)
}

/// Non-farm payrolls: first Friday of the month, moved back to the previous
/// business day when that Friday is a holiday.
pub fn nfp_release_date(year: i32, month: u32) -> Result<NaiveDate, CalendarError> {
    adjust_to_business_day(nth_friday(year, month, 1)?, WalkDirection::Backward)
}

/// CPI: second Wednesday of the month (day 8..=14), moved forward past
/// holidays.
pub fn cpi_release_date(year: i32, month: u32) -> Result<NaiveDate, CalendarError> {
    let nominal = nth_weekday_of_month(year, month, Weekday::Wed, 2)
        .ok_or(CalendarError::InvalidMonth { year, month })?;
    adjust_to_business_day(nominal, WalkDirection::Forward)
}

/// Monthly equity options expiry: third Friday, or the business day before
/// it when the Friday is a holiday.
pub fn monthly_options_expiry(year: i32, month: u32) -> Result<NaiveDate, CalendarError> {
    adjust_to_business_day(nth_friday(year, month, 3)?, WalkDirection::Backward)
}

pub fn is_quarterly_expiry_month(month: u32) -> bool {
    QUARTERLY_EXPIRY_MONTHS.contains(&month)
}

/// Triple witching day for a quarterly expiry month, `None` otherwise.
///
/// Always the third Friday, with no holiday shift, so it stays on day
/// 15..=21 even when the exchange is closed that day.
pub fn triple_witching_date(year: i32, month: u32) -> Result<Option<NaiveDate>, CalendarError> {
    if !is_quarterly_expiry_month(month) {
        return Ok(None);
    }
    nth_friday(year, month, 3).map(Some)
}

/// Options expiry for any month: the triple-witching day in quarterly
/// months, the adjusted monthly expiry otherwise.
pub fn options_expiry_date(year: i32, month: u32) -> Result<NaiveDate, CalendarError> {
    match triple_witching_date(year, month)? {
        Some(date) => Ok(date),
        None => monthly_options_expiry(year, month),
    }
}

/// Whether a month-scoped rule lands on `date`.
///
/// Checks the neighbouring months too, since an adjusted release can cross a
/// month boundary (e.g. a holiday on Friday the 1st pushes NFP back into the
/// previous month).
pub fn monthly_rule_hits<F>(date: NaiveDate, rule: F) -> Result<bool, CalendarError>
where
    F: Fn(i32, u32) -> Result<NaiveDate, CalendarError>,
{
    let (y, m) = (date.year(), date.month());
    let prev = if m == 1 { (y - 1, 12) } else { (y, m - 1) };
    let next = if m == 12 { (y + 1, 1) } else { (y, m + 1) };
    for (year, month) in [prev, (y, m), next] {
        if rule(year, month)? == date {
            return Ok(true);
        }
    }
    Ok(false)
}

// ─── GDP ─────────────────────────────────────────────────────────────

/// Which of the three quarterly GDP estimates a release is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GdpEstimate {
    Advance,
    Second,
    Third,
}

impl GdpEstimate {
    pub const ALL: [GdpEstimate; 3] = [GdpEstimate::Advance, GdpEstimate::Second, GdpEstimate::Third];

    /// Days after quarter end at which the estimate is published.
    pub fn days_after_quarter_end(&self) -> i64 {
        match self {
            GdpEstimate::Advance => 30,
            GdpEstimate::Second => 60,
            GdpEstimate::Third => 90,
        }
    }

    pub fn event_name(&self) -> &'static str {
        match self {
            GdpEstimate::Advance => "GDP Advance Estimate",
            GdpEstimate::Second => "GDP Second Estimate",
            GdpEstimate::Third => "GDP Third Estimate",
        }
    }
}

fn quarter_end(year: i32, quarter: u32) -> Option<NaiveDate> {
    let month = quarter * 3;
    NaiveDate::from_ymd_opt(year, month, crate::time::days_in_month(year, month))
}

/// GDP releases published during `year`, in date order.
pub fn gdp_release_dates(year: i32) -> Result<Vec<(NaiveDate, GdpEstimate)>, CalendarError> {
    let mut quarter_ends = Vec::with_capacity(5);
    // Q3 and Q4 of the prior year still have estimates landing in `year`.
    for (y, q) in [(year - 1, 3), (year - 1, 4), (year, 1), (year, 2), (year, 3)] {
        if let Some(end) = quarter_end(y, q) {
            quarter_ends.push(end);
        }
    }
    let mut out = Vec::new();
    for end in quarter_ends {
        for estimate in GdpEstimate::ALL {
            let nominal = shift_days(end, estimate.days_after_quarter_end())?;
            let release = adjust_to_business_day(nominal, WalkDirection::Forward)?;
            if release.year() == year {
                out.push((release, estimate));
            }
        }
    }
    out.sort_by_key(|(d, _)| *d);
    Ok(out)
}

// ─── Annual rules ────────────────────────────────────────────────────

/// Russell reconstitution: last Friday of June.
pub fn russell_reconstitution(year: i32) -> Option<NaiveDate> {
    last_weekday_of_month(year, 6, Weekday::Fri)
}

/// US general election day: the Tuesday after the first Monday in November.
pub fn election_day(year: i32) -> Option<NaiveDate> {
    nth_weekday_of_month(year, 11, Weekday::Mon, 1).and_then(|d| d.succ_opt())
}

/// Presidential elections fall in years divisible by four; the rest are midterms.
pub fn election_name(year: i32) -> &'static str {
    if year % 4 == 0 {
        "Presidential Election"
    } else {
        "Midterm Election"
    }
}

/// Earnings season kickoff dates for `year`: the second Friday of
/// January, April, July, and October.
pub fn earnings_season_kickoffs(year: i32) -> Vec<NaiveDate> {
    [1, 4, 7, 10]
        .into_iter()
        .filter_map(|m| nth_weekday_of_month(year, m, Weekday::Fri, 2))
        .collect()
}

/// Inside one of the four earnings-season windows.
pub fn is_earnings_season(date: NaiveDate) -> bool {
    earnings_season_kickoffs(date.year())
        .into_iter()
        .any(|k| date >= k && (date - k).num_days() < EARNINGS_SEASON_DAYS)
}
