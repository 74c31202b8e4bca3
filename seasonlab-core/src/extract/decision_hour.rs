//! Central-bank decision-hour extractors.
//!
//! Each bank announces at a fixed local hour. The announcement instant is
//! pinned to an Eastern wall-clock hour and converted to UTC through the DST
//! rule, so the window tracks the clock change. Hourly bars are labelled
//! relative to that instant:
//!
//! ```text
//!   [T - pre, T)          {Bank}-Pre-Announcement
//!   [T, T + 1h)           {Bank}-Announcement
//!   [T + 1h, T + 1h + post) {Bank}-Post-Announcement
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::ExtractError;
use crate::calendar::CalendarRuleEngine;
use crate::domain::CentralBank;
use crate::time::{shift_days, utc_date, TimeContext};

const MS_PER_HOUR: i64 = 3_600_000;

/// Where a bank's announcement lands on the Eastern clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnouncementSchedule {
    /// Eastern wall-clock hour of the announcement.
    pub eastern_hour: u32,
    /// Days between the table date and the Eastern announcement date.
    pub day_offset: i64,
    pub pre_hours: i64,
    pub post_hours: i64,
}

impl AnnouncementSchedule {
    /// Fed 14:00, ECB 08:00, BoE 07:00 Eastern; BoJ decisions dated in Tokyo
    /// come out around 23:00 Eastern on the previous day.
    pub fn for_bank(bank: CentralBank) -> Self {
        let (eastern_hour, day_offset) = match bank {
            CentralBank::Fed => (14, 0),
            CentralBank::Ecb => (8, 0),
            CentralBank::Boe => (7, 0),
            CentralBank::Boj => (23, -1),
        };
        Self {
            eastern_hour,
            day_offset,
            pre_hours: 4,
            post_hours: 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DecisionHourExtractor {
    bank: CentralBank,
    schedule: AnnouncementSchedule,
    calendar: Arc<CalendarRuleEngine>,
    time: TimeContext,
}

impl DecisionHourExtractor {
    pub fn new(bank: CentralBank, calendar: Arc<CalendarRuleEngine>, time: TimeContext) -> Self {
        Self {
            bank,
            schedule: AnnouncementSchedule::for_bank(bank),
            calendar,
            time,
        }
    }

    pub fn with_schedule(mut self, schedule: AnnouncementSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn bank(&self) -> CentralBank {
        self.bank
    }

    pub fn schedule(&self) -> AnnouncementSchedule {
        self.schedule
    }

    /// Only quarterly Fed meetings carry the dot plot; the day of month is irrelevant.
    pub fn has_dot_plot(&self, meeting: NaiveDate) -> bool {
        self.bank == CentralBank::Fed && CalendarRuleEngine::has_dot_plot(meeting)
    }

    /// UTC announcement instant (epoch ms) for a decision dated `meeting`.
    pub fn announcement_instant(&self, meeting: NaiveDate) -> Result<i64, ExtractError> {
        let local_day = shift_days(meeting, self.schedule.day_offset)?;
        Ok(self.time.eastern_to_utc(local_day, self.schedule.eastern_hour)?)
    }

    pub fn extract(&self, ts: i64) -> Result<Option<String>, ExtractError> {
        let date = utc_date(ts)?;
        // Any window touching `date` belongs to a decision at most two days away.
        for delta in -2..=2 {
            let Ok(meeting) = shift_days(date, delta) else {
                continue;
            };
            if !self.calendar.is_central_bank_decision_day(self.bank, meeting) {
                continue;
            }
            let instant = self.announcement_instant(meeting)?;
            if let Some(phase) = self.phase(ts - instant) {
                return Ok(Some(format!("{}-{phase}", self.bank.label())));
            }
        }
        Ok(None)
    }

    fn phase(&self, offset_ms: i64) -> Option<&'static str> {
        let pre = self.schedule.pre_hours * MS_PER_HOUR;
        let post = self.schedule.post_hours * MS_PER_HOUR;
        if (-pre..0).contains(&offset_ms) {
            Some("Pre-Announcement")
        } else if (0..MS_PER_HOUR).contains(&offset_ms) {
            Some("Announcement")
        } else if (MS_PER_HOUR..MS_PER_HOUR + post).contains(&offset_ms) {
            Some("Post-Announcement")
        } else {
            None
        }
    }
}
