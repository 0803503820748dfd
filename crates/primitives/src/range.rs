//! Inclusive calendar date ranges and epoch-day conversions.

use serde::{Deserialize, Serialize};

use crate::Date;

/// Days between 0001-01-01 (CE day 1) and 1970-01-01.
const UNIX_EPOCH_FROM_CE: i32 = 719_163;

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: Date,
    end: Date,
}

impl DateRange {
    /// Create a range covering `start..=end`.
    ///
    /// Returns `None` when `end` precedes `start`.
    #[must_use]
    pub fn new(start: Date, end: Date) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// First date of the range.
    #[must_use]
    pub const fn start(&self) -> Date {
        self.start
    }

    /// Last date of the range (inclusive).
    #[must_use]
    pub const fn end(&self) -> Date {
        self.end
    }

    /// Whether `date` falls inside the range.
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days covered, counting both ends.
    #[must_use]
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Days since 1970-01-01, the physical representation of a `Date` column.
#[must_use]
pub fn epoch_days(date: Date) -> i32 {
    use chrono::Datelike;
    date.num_days_from_ce() - UNIX_EPOCH_FROM_CE
}

/// Inverse of [`epoch_days`].
#[must_use]
pub fn from_epoch_days(days: i32) -> Option<Date> {
    Date::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_FROM_CE)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn range_rejects_reversed_bounds() {
        assert!(DateRange::new(date(2024, 2, 1), date(2024, 1, 1)).is_none());
    }

    #[test]
    fn range_is_inclusive() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        assert!(range.contains(date(2024, 1, 31)));
        assert!(!range.contains(date(2024, 2, 1)));
        assert_eq!(range.num_days(), 31);
    }

    #[test]
    fn epoch_day_round_trip() {
        assert_eq!(epoch_days(date(1970, 1, 1)), 0);
        assert_eq!(epoch_days(date(1970, 1, 2)), 1);
        let d = date(2023, 6, 30);
        assert_eq!(from_epoch_days(epoch_days(d)), Some(d));
    }
}
