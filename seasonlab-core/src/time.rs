//! Time context: DST-aware US-Eastern resolution and week boundaries.
//!
//! All timestamps entering the core are milliseconds since the Unix epoch,
//! UTC. Calendar dates derived from them are UTC-normalized unless a function
//! says "eastern". The US daylight-saving rule is computed from the calendar
//! every time (second Sunday of March through first Sunday of November, both
//! transitions at 02:00 local), so fixed "2 PM Eastern" events land on the
//! correct UTC hour in every season.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

const MS_PER_DAY: i64 = 86_400_000;

/// Errors for timestamps that cannot be interpreted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimeError {
    #[error("timestamp {0} ms is outside the representable date range")]
    OutOfRange(i64),
    #[error("timestamp is not finite: {0}")]
    NonFinite(f64),
    #[error("timestamp {0} is not a whole number of milliseconds")]
    NotWholeMillis(f64),
    #[error("hour {0} is not a valid wall-clock hour")]
    InvalidHour(u32),
    #[error("date arithmetic overflowed at {0}")]
    DateOverflow(NaiveDate),
}

// ─── Date arithmetic ─────────────────────────────────────────────────

/// Number of days in the given month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    match (
        NaiveDate::from_ymd_opt(year, month, 1),
        NaiveDate::from_ymd_opt(ny, nm, 1),
    ) {
        (Some(first), Some(next)) => (next - first).num_days() as u32,
        _ => 0,
    }
}

/// The `n`-th (1-based) occurrence of `weekday` in a month.
///
/// Returns `None` when the month has fewer than `n` such weekdays.
pub fn nth_weekday_of_month(year: i32, month: u32, weekday: Weekday, n: u8) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
}

/// The last occurrence of `weekday` in a month.
pub fn last_weekday_of_month(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    let last = NaiveDate::from_ymd_opt(year, month, days_in_month(year, month))?;
    let back = (7 + last.weekday().num_days_from_monday() - weekday.num_days_from_monday()) % 7;
    last.checked_sub_signed(Duration::days(back as i64))
}

/// `date` moved by `days` (negative is earlier).
pub fn shift_days(date: NaiveDate, days: i64) -> Result<NaiveDate, TimeError> {
    date.checked_add_signed(Duration::days(days))
        .ok_or(TimeError::DateOverflow(date))
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Monday and Sunday of the ISO week containing `date`.
pub fn week_bounds(date: NaiveDate) -> Result<(NaiveDate, NaiveDate), TimeError> {
    let monday = shift_days(date, -(date.weekday().num_days_from_monday() as i64))?;
    Ok((monday, shift_days(monday, 6)?))
}

/// Midnight UTC of `date` in epoch milliseconds.
pub fn date_to_millis(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

/// Interpret epoch milliseconds as a UTC instant.
pub fn to_utc(ts: i64) -> Result<DateTime<Utc>, TimeError> {
    DateTime::<Utc>::from_timestamp_millis(ts).ok_or(TimeError::OutOfRange(ts))
}

/// UTC calendar date of a timestamp.
pub fn utc_date(ts: i64) -> Result<NaiveDate, TimeError> {
    to_utc(ts).map(|dt| dt.date_naive())
}

/// Convert a floating-point millisecond timestamp (as produced by some feeds)
/// into an integer timestamp. NaN, infinities, and fractional values are
/// rejected rather than rounded.
pub fn timestamp_from_f64(value: f64) -> Result<i64, TimeError> {
    if !value.is_finite() {
        return Err(TimeError::NonFinite(value));
    }
    if value.fract() != 0.0 {
        return Err(TimeError::NotWholeMillis(value));
    }
    // Saturating cast; anything that large fails the range check below.
    let ts = value as i64;
    to_utc(ts)?;
    Ok(ts)
}

// ─── DST rule ────────────────────────────────────────────────────────

/// A "n-th Sunday of month at local hour" daylight-saving rule.
///
/// The default is the US rule in force since 2007.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DstRule {
    pub start_month: u32,
    pub start_nth_sunday: u8,
    pub end_month: u32,
    pub end_nth_sunday: u8,
    /// Local wall-clock hour of both transitions.
    pub transition_hour: u32,
    /// Standard-time offset from UTC in hours (negative west of Greenwich).
    pub standard_offset_hours: i32,
}

impl Default for DstRule {
    fn default() -> Self {
        Self::us_eastern()
    }
}

impl DstRule {
    pub const fn us_eastern() -> Self {
        Self {
            start_month: 3,
            start_nth_sunday: 2,
            end_month: 11,
            end_nth_sunday: 1,
            transition_hour: 2,
            standard_offset_hours: -5,
        }
    }

    /// Local dates on which daylight time begins and ends in `year`.
    pub fn transition_dates(&self, year: i32) -> Option<(NaiveDate, NaiveDate)> {
        let start = nth_weekday_of_month(year, self.start_month, Weekday::Sun, self.start_nth_sunday)?;
        let end = nth_weekday_of_month(year, self.end_month, Weekday::Sun, self.end_nth_sunday)?;
        Some((start, end))
    }

    /// UTC instants at which daylight time begins and ends in `year`.
    ///
    /// The start transition happens at `transition_hour` standard time, the
    /// end transition at `transition_hour` daylight time.
    fn transition_instants(&self, year: i32) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let (start, end) = self.transition_dates(year)?;
        let at = |d: NaiveDate| d.and_hms_opt(self.transition_hour, 0, 0);
        let start_utc = at(start)?.checked_sub_signed(Duration::hours(self.standard_offset_hours as i64))?;
        let end_utc = at(end)?.checked_sub_signed(Duration::hours(self.standard_offset_hours as i64 + 1))?;
        Some((start_utc, end_utc))
    }

    /// Whether daylight time is in effect at a UTC instant.
    pub fn is_dst_at(&self, utc: DateTime<Utc>) -> bool {
        let naive = utc.naive_utc();
        match self.transition_instants(naive.year()) {
            Some((start, end)) => naive >= start && naive < end,
            None => false,
        }
    }

    /// Whether a local wall-clock time falls in daylight time.
    ///
    /// The repeated hour on the end date is resolved as daylight time.
    pub fn is_dst_local(&self, local: NaiveDateTime) -> bool {
        let Some((start, end)) = self.transition_dates(local.year()) else {
            return false;
        };
        let start_local = start.and_hms_opt(self.transition_hour, 0, 0);
        let end_local = end.and_hms_opt(self.transition_hour, 0, 0);
        match (start_local, end_local) {
            (Some(s), Some(e)) => local >= s && local < e,
            _ => false,
        }
    }

    /// UTC offset in hours at a UTC instant.
    pub fn offset_hours_at(&self, utc: DateTime<Utc>) -> i32 {
        if self.is_dst_at(utc) {
            self.standard_offset_hours + 1
        } else {
            self.standard_offset_hours
        }
    }
}

// ─── TimeContext ─────────────────────────────────────────────────────

/// DST-aware timestamp interpretation.
///
/// Immutable once built; share it freely between threads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeContext {
    dst: DstRule,
}

impl TimeContext {
    pub fn new(dst: DstRule) -> Self {
        Self { dst }
    }

    pub fn dst_rule(&self) -> &DstRule {
        &self.dst
    }

    /// Eastern local wall-clock time of a timestamp.
    pub fn eastern_datetime(&self, ts: i64) -> Result<NaiveDateTime, TimeError> {
        let utc = to_utc(ts)?;
        let offset = self.dst.offset_hours_at(utc);
        utc.naive_utc()
            .checked_add_signed(Duration::hours(offset as i64))
            .ok_or(TimeError::OutOfRange(ts))
    }

    /// Eastern local hour, 0..=23.
    pub fn eastern_hour(&self, ts: i64) -> Result<u32, TimeError> {
        self.eastern_datetime(ts).map(|dt| dt.hour())
    }

    /// Minutes since Eastern local midnight, 0..1440.
    pub fn eastern_minutes(&self, ts: i64) -> Result<u32, TimeError> {
        self.eastern_datetime(ts).map(|dt| dt.hour() * 60 + dt.minute())
    }

    /// Eastern local calendar date.
    pub fn eastern_date(&self, ts: i64) -> Result<NaiveDate, TimeError> {
        self.eastern_datetime(ts).map(|dt| dt.date())
    }

    /// UTC instant (epoch ms) of an Eastern wall-clock hour on `date`.
    pub fn eastern_to_utc(&self, date: NaiveDate, hour: u32) -> Result<i64, TimeError> {
        let local = date
            .and_hms_opt(hour, 0, 0)
            .ok_or(TimeError::InvalidHour(hour))?;
        let offset = if self.dst.is_dst_local(local) {
            self.dst.standard_offset_hours + 1
        } else {
            self.dst.standard_offset_hours
        };
        let utc = local
            .checked_sub_signed(Duration::hours(offset as i64))
            .ok_or(TimeError::DateOverflow(date))?;
        Ok(utc.and_utc().timestamp_millis())
    }

    /// Monday 00:00:00.000 UTC of the week containing `ts`.
    pub fn week_start(&self, ts: i64) -> Result<i64, TimeError> {
        let (monday, _) = week_bounds(utc_date(ts)?)?;
        Ok(date_to_millis(monday))
    }

    /// Sunday 23:59:59.999 UTC of the week containing `ts`.
    pub fn week_end(&self, ts: i64) -> Result<i64, TimeError> {
        let (_, sunday) = week_bounds(utc_date(ts)?)?;
        Ok(date_to_millis(sunday) + MS_PER_DAY - 1)
    }

    /// UTC calendar date as `YYYY-MM-DD`.
    pub fn iso_date(&self, ts: i64) -> Result<String, TimeError> {
        utc_date(ts).map(|d| d.format("%Y-%m-%d").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(y: i32, m: u32, d: u32, h: u32, min: u32) -> i64 {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
            .and_utc()
            .timestamp_millis()
    }

    #[test]
    fn transition_dates_2024() {
        let (start, end) = DstRule::us_eastern().transition_dates(2024).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 11, 3).unwrap());
    }

    #[test]
    fn fomc_announcement_hour_moves_with_season() {
        let ctx = TimeContext::default();
        // 2 PM Eastern: 19:00 UTC in winter, 18:00 UTC in summer.
        assert_eq!(ctx.eastern_hour(ms(2024, 1, 31, 19, 0)).unwrap(), 14);
        assert_eq!(ctx.eastern_hour(ms(2024, 7, 31, 18, 0)).unwrap(), 14);
    }

    #[test]
    fn dst_switches_at_two_am_local() {
        let ctx = TimeContext::default();
        // 2024-03-10 06:59 UTC = 01:59 EST; 07:00 UTC = 03:00 EDT.
        assert_eq!(ctx.eastern_hour(ms(2024, 3, 10, 6, 59)).unwrap(), 1);
        assert_eq!(ctx.eastern_hour(ms(2024, 3, 10, 7, 0)).unwrap(), 3);
        // 2024-11-03 05:59 UTC = 01:59 EDT; 06:00 UTC = 01:00 EST.
        assert_eq!(ctx.eastern_hour(ms(2024, 11, 3, 5, 59)).unwrap(), 1);
        assert_eq!(ctx.eastern_hour(ms(2024, 11, 3, 6, 0)).unwrap(), 1);
    }

    #[test]
    fn eastern_to_utc_inverts_eastern_hour() {
        let ctx = TimeContext::default();
        let d = NaiveDate::from_ymd_opt(2025, 6, 18).unwrap();
        let ts = ctx.eastern_to_utc(d, 14).unwrap();
        assert_eq!(ts, ms(2025, 6, 18, 18, 0));
        assert_eq!(ctx.eastern_hour(ts).unwrap(), 14);
        assert!(ctx.eastern_to_utc(d, 24).is_err());
    }

    #[test]
    fn week_bounds_monday_to_sunday() {
        let ctx = TimeContext::default();
        // Wednesday 2024-03-20 14:30 UTC
        let ts = ms(2024, 3, 20, 14, 30);
        let start = ctx.week_start(ts).unwrap();
        let end = ctx.week_end(ts).unwrap();
        assert_eq!(start, ms(2024, 3, 18, 0, 0));
        assert_eq!(end, ms(2024, 3, 25, 0, 0) - 1);
        assert!(start <= ts && ts <= end);
    }

    #[test]
    fn sunday_belongs_to_preceding_monday() {
        let ctx = TimeContext::default();
        let ts = ms(2024, 3, 24, 23, 0);
        assert_eq!(ctx.week_start(ts).unwrap(), ms(2024, 3, 18, 0, 0));
    }

    #[test]
    fn date_arithmetic_at_the_range_limits_is_an_error() {
        assert_eq!(shift_days(NaiveDate::MAX, 1), Err(TimeError::DateOverflow(NaiveDate::MAX)));
        assert_eq!(shift_days(NaiveDate::MIN, -1), Err(TimeError::DateOverflow(NaiveDate::MIN)));
        // The last representable day is a Tuesday; its week ends past it.
        assert!(week_bounds(NaiveDate::MAX).is_err());
        assert!(TimeContext::default().eastern_to_utc(NaiveDate::MAX, 23).is_err());

        let ctx = TimeContext::default();
        let last = NaiveDate::MAX.and_hms_opt(23, 0, 0).unwrap().and_utc().timestamp_millis();
        assert!(ctx.week_end(last).is_err());
    }

    #[test]
    fn iso_date_is_utc_normalized() {
        let ctx = TimeContext::default();
        // 23:30 UTC is still the same UTC day even though Eastern is earlier.
        assert_eq!(ctx.iso_date(ms(2024, 12, 31, 23, 30)).unwrap(), "2024-12-31");
    }

    #[test]
    fn rejects_unrepresentable_timestamps() {
        let ctx = TimeContext::default();
        assert!(matches!(ctx.eastern_hour(i64::MAX), Err(TimeError::OutOfRange(_))));
        assert!(ctx.week_start(i64::MIN).is_err());
    }

    #[test]
    fn float_timestamps_are_never_coerced() {
        assert!(matches!(timestamp_from_f64(f64::NAN), Err(TimeError::NonFinite(_))));
        assert!(matches!(timestamp_from_f64(f64::INFINITY), Err(TimeError::NonFinite(_))));
        assert!(matches!(timestamp_from_f64(1.5), Err(TimeError::NotWholeMillis(_))));
        assert_eq!(timestamp_from_f64(1_704_153_600_000.0).unwrap(), 1_704_153_600_000);
    }

    #[test]
    fn nth_and_last_weekday() {
        assert_eq!(
            nth_weekday_of_month(2024, 6, Weekday::Fri, 3),
            NaiveDate::from_ymd_opt(2024, 6, 21)
        );
        assert_eq!(
            last_weekday_of_month(2024, 6, Weekday::Fri),
            NaiveDate::from_ymd_opt(2024, 6, 28)
        );
        assert_eq!(nth_weekday_of_month(2024, 2, Weekday::Mon, 5), None);
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 12), 31);
    }
}
