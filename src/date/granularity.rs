//! Date granularities
//!
//! The calendar units a date expression can be anchored to. Each unit knows
//! how to floor an instant to the start of its period, how to find the start
//! of the following period, and how to print itself in ISO 8601 form.
//!
//! Weeks start on Sunday. All arithmetic is done in UTC.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Calendar unit a date value is anchored to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// A single calendar day
    Day,
    /// A Sunday-based calendar week
    Week,
    /// A calendar month
    Month,
    /// A calendar year
    Year,
}

impl Granularity {
    /// All granularities, finest first
    pub const ALL: [Granularity; 4] = [Self::Day, Self::Week, Self::Month, Self::Year];

    /// Single-letter code used by search engines for date math (`d`, `w`, `M`, `y`)
    pub fn code(&self) -> char {
        match self {
            Self::Day => 'd',
            Self::Week => 'w',
            Self::Month => 'M',
            Self::Year => 'y',
        }
    }

    /// Look up a granularity by its single-letter code
    pub fn from_code(code: char) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.code() == code)
    }

    /// Lowercase unit name (`day`, `week`, `month`, `year`)
    pub fn name(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// Whether two instants fall into the same period of this unit
    pub fn is_same(&self, d1: DateTime<Utc>, d2: DateTime<Utc>) -> bool {
        self.start(d1) == self.start(d2)
    }

    /// Floor an instant to the start of its period
    pub fn start(&self, date: DateTime<Utc>) -> DateTime<Utc> {
        let day = date.date_naive();
        let first = match self {
            Self::Day => day,
            Self::Week => day - Duration::days(day.weekday().num_days_from_sunday() as i64),
            Self::Month => day.with_day(1).unwrap_or(day),
            Self::Year => NaiveDate::from_ymd_opt(day.year(), 1, 1).unwrap_or(day),
        };
        midnight(first)
    }

    /// Start of the period following the one containing `date`
    pub fn start_of_next(&self, date: DateTime<Utc>) -> DateTime<Utc> {
        let start = self.start(date);
        match self {
            Self::Day => start + Duration::days(1),
            Self::Week => start + Duration::weeks(1),
            Self::Month => start.checked_add_months(Months::new(1)).unwrap_or(start),
            Self::Year => start.checked_add_months(Months::new(12)).unwrap_or(start),
        }
    }

    /// Shift an instant by `amount` units (negative values go back in time)
    pub fn shift(&self, date: DateTime<Utc>, amount: i32) -> DateTime<Utc> {
        let months = |n: i32| {
            if n >= 0 {
                date.checked_add_months(Months::new(n as u32))
            } else {
                date.checked_sub_months(Months::new(n.unsigned_abs()))
            }
            .unwrap_or(date)
        };
        match self {
            Self::Day => date + Duration::days(amount as i64),
            Self::Week => date + Duration::weeks(amount as i64),
            Self::Month => months(amount),
            Self::Year => months(amount * 12),
        }
    }

    /// ISO 8601 rendering at this unit's precision
    pub fn iso8601(&self, date: DateTime<Utc>) -> String {
        match self {
            Self::Day | Self::Week => date.format("%Y-%m-%d").to_string(),
            Self::Month => date.format("%Y-%m").to_string(),
            Self::Year => date.format("%Y").to_string(),
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Midnight UTC at the given calendar day
pub(crate) fn midnight(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}
