//! Reporting periods
//!
//! All periods are half-open UTC intervals `[start, end)`. Calendar date
//! ranges from query strings are inclusive of their last day.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::types::DateRange;

/// Half-open UTC interval used to scope dashboard counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    /// The calendar month containing `now`
    pub fn month_containing(now: DateTime<Utc>) -> Self {
        let first = NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
            .unwrap_or_else(|| now.date_naive());
        let next = first.checked_add_months(Months::new(1)).unwrap_or(first);
        Self {
            start: day_start(first),
            end: day_start(next),
        }
    }

    /// The Sunday-to-Saturday week containing `now`
    pub fn week_containing(now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        let since_sunday = u64::from(today.weekday().num_days_from_sunday());
        let sunday = today.checked_sub_days(Days::new(since_sunday)).unwrap_or(today);
        let next_sunday = sunday.checked_add_days(Days::new(7)).unwrap_or(sunday);
        Self {
            start: day_start(sunday),
            end: day_start(next_sunday),
        }
    }

    /// Whole days from `range.start` through `range.end`
    pub fn from_range(range: &DateRange) -> Self {
        Self {
            start: day_start(range.start),
            end: day_after(range.end),
        }
    }

    /// Explicit `from`/`to` dates when `from` is given, otherwise the month
    /// containing `now`. A missing `to` means today.
    pub fn resolve(
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> Result<Self, &'static str> {
        match from {
            Some(start) => {
                let end = to.unwrap_or_else(|| now.date_naive());
                Ok(Self::from_range(&DateRange::new(start, end)?))
            }
            None => Ok(Self::month_containing(now)),
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

/// 00:00 UTC on `date`
pub fn day_start(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default())
}

/// 00:00 UTC on the day after `date`, the exclusive end of that day
pub fn day_after(date: NaiveDate) -> DateTime<Utc> {
    day_start(date.succ_opt().unwrap_or(date))
}
