//! Calendar periods and half-open date ranges.
//!
//! Budgets are keyed by a [`Period`] (a year-month). Reports and queries use a
//! [`DateRange`], which is `[from, to)` in UTC but always computed from local
//! midnights in the chat's timezone.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// A calendar month, displayed and parsed as `YYYY-MM`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> ResultEngine<Self> {
        if !(1..=12).contains(&month) || !(1..=9999).contains(&year) {
            return Err(EngineError::InvalidPeriod(format!("{year:04}-{month:02}")));
        }
        Ok(Self { year, month })
    }

    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The period that contains `now` as seen from `tz`.
    #[must_use]
    pub fn current(now: DateTime<Utc>, tz: Tz) -> Self {
        Self::containing(now.with_timezone(&tz).date_naive())
    }

    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    #[must_use]
    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    #[must_use]
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// First day of the month.
    pub fn first_day(self) -> ResultEngine<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .ok_or_else(|| EngineError::InvalidPeriod(self.to_string()))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidPeriod(s.trim().to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || !(1..=2).contains(&month.len()) {
            return Err(invalid());
        }
        if !year.chars().chain(month.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

/// Start of the local day `date` in `tz`, converted to UTC.
///
/// When midnight does not exist (DST gap) the earliest valid instant of that
/// day is used.
pub fn local_midnight(date: NaiveDate, tz: Tz) -> ResultEngine<DateTime<Utc>> {
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| EngineError::InvalidPeriod(date.to_string()))?;
    let local = tz
        .from_local_datetime(&midnight)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
        .ok_or_else(|| EngineError::InvalidPeriod(date.to_string()))?;
    Ok(local.with_timezone(&Utc))
}

/// Half-open UTC range `[from, to)` with a human label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub label: String,
}

impl DateRange {
    /// The whole month `period` in `tz`.
    pub fn month(period: Period, tz: Tz) -> ResultEngine<Self> {
        Ok(Self {
            from: local_midnight(period.first_day()?, tz)?,
            to: local_midnight(period.next().first_day()?, tz)?,
            label: period.to_string(),
        })
    }

    /// The local day containing `now`.
    pub fn today(now: DateTime<Utc>, tz: Tz) -> ResultEngine<Self> {
        let day = now.with_timezone(&tz).date_naive();
        let next = day
            .succ_opt()
            .ok_or_else(|| EngineError::InvalidPeriod(day.to_string()))?;
        Ok(Self {
            from: local_midnight(day, tz)?,
            to: local_midnight(next, tz)?,
            label: day.to_string(),
        })
    }

    /// The ISO week (Monday to Sunday) containing `now`.
    pub fn this_week(now: DateTime<Utc>, tz: Tz) -> ResultEngine<Self> {
        let day = now.with_timezone(&tz).date_naive();
        let monday = day - Duration::days(i64::from(day.weekday().num_days_from_monday()));
        let next_monday = monday + Duration::days(7);
        Ok(Self {
            from: local_midnight(monday, tz)?,
            to: local_midnight(next_monday, tz)?,
            label: format!("week of {monday}"),
        })
    }

    /// The calendar year containing `now`.
    pub fn this_year(now: DateTime<Utc>, tz: Tz) -> ResultEngine<Self> {
        let year = now.with_timezone(&tz).year();
        let start = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| EngineError::InvalidPeriod(year.to_string()))?;
        let end = NaiveDate::from_ymd_opt(year + 1, 1, 1)
            .ok_or_else(|| EngineError::InvalidPeriod(year.to_string()))?;
        Ok(Self {
            from: local_midnight(start, tz)?,
            to: local_midnight(end, tz)?,
            label: year.to_string(),
        })
    }

    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.from <= instant && instant < self.to
    }
}

#[cfg(test)]
mod tests {
    use chrono_tz::{Europe::Rome, UTC};

    use super::*;

    #[test]
    fn period_parses_and_displays() {
        let period: Period = "2026-03".parse().unwrap();
        assert_eq!(period.year(), 2026);
        assert_eq!(period.month(), 3);
        assert_eq!(period.to_string(), "2026-03");
        assert_eq!("2026-3".parse::<Period>().unwrap().to_string(), "2026-03");
    }

    #[test]
    fn period_rejects_garbage() {
        for input in ["", "2026", "2026-13", "2026-00", "26-01", "2026/01", "abcd-01", "2026-+1"] {
            assert!(input.parse::<Period>().is_err(), "{input:?}");
        }
    }

    #[test]
    fn period_wraps_around_years() {
        let jan: Period = "2026-01".parse().unwrap();
        assert_eq!(jan.previous().to_string(), "2025-12");
        assert_eq!(jan.previous().next(), jan);
        let dec: Period = "2025-12".parse().unwrap();
        assert_eq!(dec.next().to_string(), "2026-01");
    }

    #[test]
    fn current_period_uses_local_time() {
        // 23:30 UTC on Jan 31st is already February in Rome.
        let now = Utc.with_ymd_and_hms(2026, 1, 31, 23, 30, 0).unwrap();
        assert_eq!(Period::current(now, UTC).to_string(), "2026-01");
        assert_eq!(Period::current(now, Rome).to_string(), "2026-02");
    }

    #[test]
    fn month_range_is_half_open_in_local_time() {
        let range = DateRange::month("2026-02".parse().unwrap(), Rome).unwrap();
        assert_eq!(range.from, Utc.with_ymd_and_hms(2026, 1, 31, 23, 0, 0).unwrap());
        assert_eq!(range.to, Utc.with_ymd_and_hms(2026, 2, 28, 23, 0, 0).unwrap());
        assert!(range.contains(range.from));
        assert!(!range.contains(range.to));
        assert_eq!(range.label, "2026-02");
    }

    #[test]
    fn week_starts_on_monday() {
        // 2026-10-16 is a Friday.
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
        let week = DateRange::this_week(now, UTC).unwrap();
        assert_eq!(week.from, Utc.with_ymd_and_hms(2026, 10, 12, 0, 0, 0).unwrap());
        assert_eq!(week.to, Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap());
    }

    #[test]
    fn today_and_year_ranges() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
        let today = DateRange::today(now, UTC).unwrap();
        assert!(today.contains(now));
        assert_eq!(today.to - today.from, Duration::days(1));

        let year = DateRange::this_year(now, UTC).unwrap();
        assert_eq!(year.label, "2026");
        assert!(year.contains(now));
    }
}
