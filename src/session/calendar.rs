//! Calendar keys for work-time lookups

use chrono::{Datelike, Local, NaiveDate};

/// Source of "today" for date-keyed requests
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Today's date in the local time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always reports the same date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Query key of a weekly record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekKey {
    pub year: i32,
    pub week: u32,
}

/// `yyyy-MM-dd` key of a daily record
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Calendar year paired with the ISO-8601 week number.
///
/// Around New Year the two can disagree (2024-12-30 is week 1); the
/// backend is queried with the calendar year regardless.
pub fn week_key(date: NaiveDate) -> WeekKey {
    WeekKey {
        year: date.year(),
        week: date.iso_week().week(),
    }
}
