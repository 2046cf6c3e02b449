//! Month keys and due date normalization
//!
//! Paid status is tracked per calendar month, keyed by `YYYY-MM`. A bill's
//! nominal due day is pinned to a concrete date inside a month, clamped to the
//! month's last day when the nominal day does not exist (e.g. the 31st in
//! April lands on the 30th, the 30th in February on the 28th or 29th).

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Local, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Display format for due dates (`MM/DD/YYYY`)
pub const DUE_DATE_LABEL_FORMAT: &str = "%m/%d/%Y";

/// A calendar month, written `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    first_day: NaiveDate,
}

impl MonthKey {
    /// Create a month key from a year and a 1-based month
    pub fn new(year: i32, month: u32) -> Result<Self> {
        let invalid = || Error::InvalidMonth(format!("{:04}-{:02}", year, month));
        if !(1..=9999).contains(&year) {
            return Err(invalid());
        }
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first_day| Self { first_day })
            .ok_or_else(invalid)
    }

    /// The month containing `date`
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            first_day: date - Days::new(u64::from(date.day0())),
        }
    }

    /// The current month in local time
    pub fn current() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    /// Number of days in this month (leap-year aware)
    pub fn days_in_month(&self) -> u32 {
        let next = self.first_day + Months::new(1);
        (next - self.first_day).num_days() as u32
    }

    /// Concrete due date for a nominal day of month, clamped into this month
    pub fn due_date(&self, due_day: u32) -> NaiveDate {
        let day = due_day.clamp(1, self.days_in_month());
        self.first_day + Days::new(u64::from(day - 1))
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for MonthKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidMonth(s.to_string());

        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

impl TryFrom<String> for MonthKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.to_string()
    }
}

/// Human-readable label for a due date
pub fn due_date_label(date: NaiveDate) -> String {
    date.format(DUE_DATE_LABEL_FORMAT).to_string()
}
