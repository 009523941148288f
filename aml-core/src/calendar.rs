//! Business-day calendar and deadline arithmetic
//!
//! Regulatory deadlines count business days, not calendar days, and the
//! business day is determined in the jurisdiction's local time. The calendar
//! uses a fixed UTC offset per jurisdiction; submission deadlines are coarse
//! enough that daylight-saving drift does not change the due date.

use crate::config::CalendarConfig;
use crate::error::{Error, Result};
use chrono::{DateTime, Datelike, Duration, FixedOffset, Months, NaiveDate, Utc, Weekday};
use std::collections::HashSet;

/// Upper bound on the calendar-day walk when resolving a deadline
const MAX_DEADLINE_WALK_DAYS: i64 = 3_660;

/// Compiled regional business calendar
#[derive(Debug, Clone)]
pub struct BusinessCalendar {
    workdays: [bool; 7],
    holidays: HashSet<NaiveDate>,
    offset: FixedOffset,
}

impl BusinessCalendar {
    /// Compile a calendar, rejecting empty workweeks, unknown day names
    /// and out-of-range UTC offsets
    pub fn new(config: &CalendarConfig) -> Result<Self> {
        if config.workweek.is_empty() {
            return Err(Error::Configuration(
                "calendar workweek must name at least one day".to_string(),
            ));
        }

        let mut workdays = [false; 7];
        for name in &config.workweek {
            let day = parse_weekday(name)?;
            workdays[day.num_days_from_monday() as usize] = true;
        }

        let offset =
            FixedOffset::east_opt(config.utc_offset_minutes * 60).ok_or_else(|| {
                Error::Configuration(format!(
                    "utc offset {} minutes is out of range",
                    config.utc_offset_minutes
                ))
            })?;

        Ok(Self {
            workdays,
            holidays: config.holidays.iter().copied().collect(),
            offset,
        })
    }

    /// Whether `date` is a working day in this jurisdiction
    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        self.workdays[date.weekday().num_days_from_monday() as usize]
            && !self.holidays.contains(&date)
    }

    /// Local calendar date of an instant
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// Instant falling `business_days` business days after `start`,
    /// preserving the time of day
    ///
    /// The start day itself is never counted, so a deadline of one business
    /// day from a Friday lands on the following Monday. Zero business days
    /// returns `start` unchanged.
    pub fn deadline_after(
        &self,
        start: DateTime<Utc>,
        business_days: u32,
    ) -> Result<DateTime<Utc>> {
        if business_days == 0 {
            return Ok(start);
        }

        let mut date = self.local_date(start);
        let mut walked: i64 = 0;
        let mut counted: u32 = 0;
        while counted < business_days {
            date = date
                .succ_opt()
                .ok_or_else(|| Error::Configuration("deadline date out of range".to_string()))?;
            walked += 1;
            if walked > MAX_DEADLINE_WALK_DAYS {
                return Err(Error::Configuration(format!(
                    "cannot find {} business days within {} calendar days of {}",
                    business_days, MAX_DEADLINE_WALK_DAYS, start
                )));
            }
            if self.is_business_day(date) {
                counted += 1;
            }
        }

        Ok(start + Duration::days(walked))
    }
}

/// Instant falling `months` calendar months after `start`
///
/// Month-end dates clamp, so one month after 31 January is the last day
/// of February.
pub fn months_after(start: DateTime<Utc>, months: u32) -> Result<DateTime<Utc>> {
    start
        .checked_add_months(Months::new(months))
        .ok_or_else(|| Error::Configuration("review date out of range".to_string()))
}

fn parse_weekday(name: &str) -> Result<Weekday> {
    match name.to_ascii_lowercase().as_str() {
        "monday" => Ok(Weekday::Mon),
        "tuesday" => Ok(Weekday::Tue),
        "wednesday" => Ok(Weekday::Wed),
        "thursday" => Ok(Weekday::Thu),
        "friday" => Ok(Weekday::Fri),
        "saturday" => Ok(Weekday::Sat),
        "sunday" => Ok(Weekday::Sun),
        other => Err(Error::Configuration(format!(
            "unknown weekday {:?} in calendar workweek",
            other
        ))),
    }
}
